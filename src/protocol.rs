use chrono::Utc;
use log::{debug, info, warn};

use crate::codec::{decode_interval_bound, encode_interval_bound};
use crate::constants::*;
use crate::error::Result;
use crate::registers::{charge_disable_arg, BatteryStateRegister, ChargeRegister};
use crate::smi::{checked_call, SmiRequest, SmiResponse, SmiTransport};
use crate::token::TokenStore;
use crate::types::*;
use crate::validate::{validate_interval, validate_mode_selection};

/// Battery charging control for one command invocation.
///
/// Owns (or mutably borrows) the token store and the SMI transport for as
/// long as the command runs. Nothing read from firmware is cached between
/// calls.
pub struct Session<S: TokenStore, T: SmiTransport> {
    store: S,
    transport: T,
}

impl<S: TokenStore, T: SmiTransport> Session<S, T> {
    /// Open a session over a token store and an SMI transport
    pub fn new(store: S, transport: T) -> Self {
        debug!("Opening battery control session");
        Session { store, transport }
    }

    /// Currently selected primary charging mode
    pub fn charging_mode(&mut self) -> Result<ChargingMode> {
        let mut active = Vec::new();
        for &(mode, token) in MODE_TOKENS.iter() {
            if self.store.is_active(token)? {
                active.push(mode);
            }
        }
        let mode = validate_mode_selection(&active)?;
        debug!("Active charging mode: {}", mode);
        Ok(mode)
    }

    /// Select a primary charging mode.
    ///
    /// Only the target token is activated. Deselecting the other modes is
    /// left to the firmware, and the result is not read back.
    pub fn set_charging_mode(&mut self, mode: ChargingMode) -> Result<()> {
        info!("Setting charging mode to {}", mode);
        self.store.activate(mode.token())
    }

    /// Custom charge thresholds as stored, without validation
    pub fn custom_interval(&mut self) -> Result<ChargeInterval> {
        let start = self.store.read_bytes(TOKEN_CUSTOM_CHARGE_START, INTERVAL_BOUND_LEN)?;
        let end = self.store.read_bytes(TOKEN_CUSTOM_CHARGE_END, INTERVAL_BOUND_LEN)?;
        Ok(ChargeInterval {
            start: decode_interval_bound(&start)?,
            end: decode_interval_bound(&end)?,
        })
    }

    /// Validate and store custom charge thresholds.
    ///
    /// The two bounds are separate tokens written start first. There is no
    /// transaction: if the end write fails the new start stays in place, and
    /// if the start write fails the end is not touched.
    pub fn set_custom_interval(&mut self, start: u16, end: u16) -> Result<()> {
        let interval = validate_interval(start, end)?;
        info!("Setting custom charge interval to {}%..{}%", interval.start, interval.end);

        self.store
            .write_bytes(TOKEN_CUSTOM_CHARGE_START, &encode_interval_bound(interval.start))?;
        self.store
            .write_bytes(TOKEN_CUSTOM_CHARGE_END, &encode_interval_bound(interval.end))
            .map_err(|e| {
                warn!("Custom charge start written but end failed, thresholds are inconsistent");
                e
            })
    }

    /// Primary mode, plus the thresholds when the mode is custom
    pub fn primary_charge_config(&mut self) -> Result<ChargeConfig> {
        let mode = self.charging_mode()?;
        let custom_interval = match mode {
            ChargingMode::Custom => Some(self.custom_interval()?),
            _ => None,
        };
        Ok(ChargeConfig { mode, custom_interval })
    }

    fn battery_call(&mut self, arg1: u32, arg2: u32) -> Result<SmiResponse> {
        let request = SmiRequest::new(SMI_CLASS_BATTERY, SMI_SELECT_BATTERY_CHARGING, arg1, arg2);
        checked_call(&mut self.transport, request)
    }

    /// Express charge and charge disable capabilities and state
    pub fn charging_status(&mut self) -> Result<ChargingStatus> {
        let response = self.battery_call(BATTERY_ARG_GET, 0)?;
        let flags = ChargeRegister(response.reg2);
        let batteries = BatteryStateRegister(response.reg3);

        Ok(ChargingStatus {
            timestamp: Utc::now(),
            supported: flags.supported(),
            enabled: flags.enabled(),
            batteries: batteries.installed(),
        })
    }

    /// Turn charging off (`true`) or back on (`false`)
    pub fn set_charge_disable(&mut self, disable: bool) -> Result<()> {
        info!("Setting charge disable to {}", disable);
        self.battery_call(BATTERY_ARG_SET_CHARGE_DISABLE, charge_disable_arg(disable))?;
        Ok(())
    }

    /// Request an express charge state per battery slot
    pub fn set_express_charge(&mut self, states: [ExpressChargeState; BATTERY_SLOTS]) -> Result<()> {
        info!("Setting express charge states to {:?}", states);
        let packed = BatteryStateRegister::from_states(states);
        self.battery_call(BATTERY_ARG_SET_EXPRESS, packed.0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SmbiosError;
    use crate::mock::{SimulatedFirmware, END_LOCATION, MODE_LOCATION, START_LOCATION};
    use crate::token::SmiTokenStore;

    fn session(fw: &SimulatedFirmware) -> Session<SmiTokenStore<SimulatedFirmware>, SimulatedFirmware> {
        Session::new(SmiTokenStore::new(fw.token_table(), fw.clone()), fw.clone())
    }

    #[test]
    fn mode_change_is_visible_to_the_next_session() {
        let fw = SimulatedFirmware::new();
        session(&fw).set_charging_mode(ChargingMode::Adaptive).unwrap();
        assert_eq!(session(&fw).charging_mode().unwrap(), ChargingMode::Adaptive);
    }

    #[test]
    fn cleared_mode_location_means_no_mode() {
        let fw = SimulatedFirmware::new();
        fw.poke(MODE_LOCATION, 0);
        assert!(matches!(session(&fw).charging_mode(), Err(SmbiosError::NoModeActive)));
    }

    #[test]
    fn custom_interval_is_read_without_validation() {
        let fw = SimulatedFirmware::new();
        fw.poke(START_LOCATION, 10);
        fw.poke(END_LOCATION, 12);
        assert_eq!(
            session(&fw).custom_interval().unwrap(),
            ChargeInterval { start: 10, end: 12 }
        );
    }

    #[test]
    fn primary_config_includes_interval_only_for_custom() {
        let fw = SimulatedFirmware::new();
        let config = session(&fw).primary_charge_config().unwrap();
        assert_eq!(config.mode, ChargingMode::Standard);
        assert_eq!(config.custom_interval, None);

        let mut s = session(&fw);
        s.set_charging_mode(ChargingMode::Custom).unwrap();
        s.set_custom_interval(60, 80).unwrap();
        let config = s.primary_charge_config().unwrap();
        assert_eq!(config.mode, ChargingMode::Custom);
        assert_eq!(config.custom_interval, Some(ChargeInterval { start: 60, end: 80 }));
    }

    #[test]
    fn end_write_failure_leaves_new_start_in_place() {
        let fw = SimulatedFirmware::new();
        fw.lock_token(TOKEN_CUSTOM_CHARGE_END);

        let err = session(&fw).set_custom_interval(70, 95).unwrap_err();
        assert!(matches!(err, SmbiosError::ManipulationRejected { token, .. } if token == TOKEN_CUSTOM_CHARGE_END));
        assert_eq!(fw.peek(START_LOCATION), 70);
        assert_eq!(fw.peek(END_LOCATION), 90);
    }

    #[test]
    fn charge_disable_round_trips_through_status() {
        let fw = SimulatedFirmware::new();
        let mut s = session(&fw);
        s.set_charge_disable(true).unwrap();
        assert!(s.charging_status().unwrap().enabled.charge_disable);
        s.set_charge_disable(false).unwrap();
        assert!(!s.charging_status().unwrap().enabled.charge_disable);
    }

    #[test]
    fn express_request_updates_installed_batteries_only() {
        let fw = SimulatedFirmware::new();
        session(&fw)
            .set_express_charge([ExpressChargeState::Express; BATTERY_SLOTS])
            .unwrap();
        assert_eq!(
            fw.batteries(),
            [
                ExpressChargeState::Express,
                ExpressChargeState::Absent,
                ExpressChargeState::Absent,
                ExpressChargeState::Absent,
            ]
        );
        assert!(fw.enabled().express_charging);
    }

    #[test]
    fn status_lists_every_installed_slot() {
        let fw = SimulatedFirmware::new();
        fw.set_batteries([
            ExpressChargeState::Express,
            ExpressChargeState::Absent,
            ExpressChargeState::OneTimeExpress,
            ExpressChargeState::Unsupported,
        ]);
        fw.set_enabled(FeatureFlags {
            express_charging: true,
            charge_disable: true,
        });

        let status = session(&fw).charging_status().unwrap();
        assert_eq!(
            status.batteries,
            vec![
                BatterySlot {
                    index: 0,
                    state: ExpressChargeState::Express
                },
                BatterySlot {
                    index: 2,
                    state: ExpressChargeState::OneTimeExpress
                },
                BatterySlot {
                    index: 3,
                    state: ExpressChargeState::Unsupported
                },
            ]
        );
        assert!(status.enabled.express_charging);
        assert!(status.enabled.charge_disable);
    }

    #[test]
    fn unsupported_set_is_a_transport_error() {
        let fw = SimulatedFirmware::new();
        fw.set_capabilities(FeatureFlags::default());
        assert!(matches!(
            session(&fw).set_charge_disable(true),
            Err(SmbiosError::Transport { .. })
        ));
    }
}
