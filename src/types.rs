use chrono::{DateTime, Utc};
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::*;
use crate::error::SmbiosError;

/// Numeric identifier of a firmware token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub u16);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

impl TokenId {
    /// Kind of the battery tokens this crate knows about
    pub fn kind(self) -> Option<TokenKind> {
        if ChargingMode::from_token(self).is_some() {
            Some(TokenKind::Boolean)
        } else if self == TOKEN_CUSTOM_CHARGE_START || self == TOKEN_CUSTOM_CHARGE_END {
            Some(TokenKind::ByteString)
        } else {
            None
        }
    }
}

/// How a token's value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Selected/not selected, changed by activation
    Boolean,
    /// Raw fixed-length payload
    ByteString,
}

/// Primary battery charging policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargingMode {
    PrimarilyAc,
    Adaptive,
    Custom,
    Standard,
    Express,
}

/// Charging modes and the boolean token backing each one, in firmware order
pub static MODE_TOKENS: [(ChargingMode, TokenId); 5] = [
    (ChargingMode::PrimarilyAc, TOKEN_MODE_PRIMARILY_AC),
    (ChargingMode::Adaptive, TOKEN_MODE_ADAPTIVE),
    (ChargingMode::Custom, TOKEN_MODE_CUSTOM),
    (ChargingMode::Standard, TOKEN_MODE_STANDARD),
    (ChargingMode::Express, TOKEN_MODE_EXPRESS),
];

impl ChargingMode {
    /// All modes in firmware order
    pub fn all() -> impl Iterator<Item = ChargingMode> {
        MODE_TOKENS.iter().map(|&(mode, _)| mode)
    }

    /// Token that selects this mode
    pub fn token(self) -> TokenId {
        match self {
            ChargingMode::PrimarilyAc => TOKEN_MODE_PRIMARILY_AC,
            ChargingMode::Adaptive => TOKEN_MODE_ADAPTIVE,
            ChargingMode::Custom => TOKEN_MODE_CUSTOM,
            ChargingMode::Standard => TOKEN_MODE_STANDARD,
            ChargingMode::Express => TOKEN_MODE_EXPRESS,
        }
    }

    /// Mode selected by `token`, if it is a mode token
    pub fn from_token(token: TokenId) -> Option<Self> {
        MODE_TOKENS
            .iter()
            .find(|&&(_, t)| t == token)
            .map(|&(mode, _)| mode)
    }

    /// Name used on the command surface
    pub fn as_str(self) -> &'static str {
        match self {
            ChargingMode::PrimarilyAc => "primarily_ac",
            ChargingMode::Adaptive => "adaptive",
            ChargingMode::Custom => "custom",
            ChargingMode::Standard => "standard",
            ChargingMode::Express => "express",
        }
    }
}

impl FromStr for ChargingMode {
    type Err = SmbiosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primarily_ac" => Ok(ChargingMode::PrimarilyAc),
            "adaptive" => Ok(ChargingMode::Adaptive),
            "custom" => Ok(ChargingMode::Custom),
            "standard" => Ok(ChargingMode::Standard),
            "express" => Ok(ChargingMode::Express),
            _ => Err(SmbiosError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for ChargingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Custom charge thresholds in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeInterval {
    pub start: u16,
    pub end: u16,
}

/// Express charge and charge disable bits, either as capabilities or as current state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub express_charging: bool,
    pub charge_disable: bool,
}

/// Express charge state of a single battery slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromPrimitive, IntoPrimitive)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ExpressChargeState {
    /// No battery installed in the slot
    Absent = 0,
    Standard = 1,
    Express = 2,
    /// Express charge for the current charge cycle only
    OneTimeExpress = 3,
    /// Battery present but cannot express charge
    Unsupported = 0xFF,
    /// Value the firmware contract does not define
    #[num_enum(catch_all)]
    Unknown(u8) = 4,
}

impl fmt::Display for ExpressChargeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressChargeState::Absent => f.write_str("absent"),
            ExpressChargeState::Standard => f.write_str("standard"),
            ExpressChargeState::Express => f.write_str("express"),
            ExpressChargeState::OneTimeExpress => f.write_str("one-time express"),
            ExpressChargeState::Unsupported => f.write_str("express charge not supported"),
            ExpressChargeState::Unknown(raw) => write!(f, "unknown ({:#04x})", raw),
        }
    }
}

/// One installed battery and its express charge state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatterySlot {
    pub index: u8,
    pub state: ExpressChargeState,
}

/// Decoded battery charging SMI response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargingStatus {
    pub timestamp: DateTime<Utc>,
    pub supported: FeatureFlags,
    pub enabled: FeatureFlags,
    pub batteries: Vec<BatterySlot>,
}

/// Primary charge configuration as stored by firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeConfig {
    pub mode: ChargingMode,
    /// Present only when `mode` is [`ChargingMode::Custom`]
    pub custom_interval: Option<ChargeInterval>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_names_map_both_ways() {
        for mode in ChargingMode::all() {
            assert_eq!(mode.as_str().parse::<ChargingMode>().unwrap(), mode);
            assert_eq!(ChargingMode::from_token(mode.token()), Some(mode));
        }
    }

    #[test]
    fn unknown_mode_name_is_rejected() {
        assert!(matches!(
            "turbo".parse::<ChargingMode>(),
            Err(SmbiosError::InvalidMode(name)) if name == "turbo"
        ));
    }

    #[test]
    fn interval_tokens_are_not_modes() {
        assert_eq!(ChargingMode::from_token(TOKEN_CUSTOM_CHARGE_START), None);
        assert_eq!(ChargingMode::from_token(TOKEN_CUSTOM_CHARGE_END), None);
    }

    #[test]
    fn known_tokens_have_a_kind() {
        assert_eq!(TOKEN_MODE_CUSTOM.kind(), Some(TokenKind::Boolean));
        assert_eq!(TOKEN_CUSTOM_CHARGE_END.kind(), Some(TokenKind::ByteString));
        assert_eq!(TokenId(0x0001).kind(), None);
    }

    #[test]
    fn express_state_bytes_convert_both_ways() {
        assert_eq!(ExpressChargeState::from(0xFFu8), ExpressChargeState::Unsupported);
        assert_eq!(ExpressChargeState::from(0x03u8), ExpressChargeState::OneTimeExpress);
        assert_eq!(ExpressChargeState::from(0x04u8), ExpressChargeState::Unknown(0x04));
        assert_eq!(ExpressChargeState::from(0xFEu8), ExpressChargeState::Unknown(0xFE));

        assert_eq!(u8::from(ExpressChargeState::Unsupported), 0xFF);
        assert_eq!(u8::from(ExpressChargeState::Absent), 0x00);
        assert_eq!(u8::from(ExpressChargeState::Unknown(0x05)), 0x05);
    }

    #[test]
    fn token_id_displays_as_hex() {
        assert_eq!(TokenId(0x0349).to_string(), "0x0349");
    }
}
