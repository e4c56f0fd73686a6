//! Typed views over the packed registers of the battery charging SMI.
//!
//! `reg2` carries two flag bytes: byte 0 lists what the platform supports,
//! byte 1 what is currently enabled. Both use the same layout (bit 0 express
//! charge, bit 1 charge disable). `reg3` carries one express charge state
//! byte per battery slot.

use bitfield::bitfield;

use crate::constants::BATTERY_SLOTS;
use crate::types::{BatterySlot, ExpressChargeState, FeatureFlags};

bitfield! {
    /// Feature flag byte shared by the capability and status halves of `reg2`
    #[derive(Copy, Clone, PartialEq, Eq)]
    struct FeatureByte(u8);
    impl Debug;
    bool, express_charging, _: 0;
    bool, charge_disable, _: 1;
}

bitfield! {
    /// Raw `reg2` of a battery charging response
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct ChargeRegister(u32);
    impl Debug;
    /// Supported feature flags
    pub u8, supported_bits, _: 7, 0;
    /// Current status flags
    pub u8, status_bits, _: 15, 8;
}

bitfield! {
    /// Raw `reg3` of a battery charging response, one byte per slot
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct BatteryStateRegister(u32);
    impl Debug;
    pub u8, slot0, set_slot0: 7, 0;
    pub u8, slot1, set_slot1: 15, 8;
    pub u8, slot2, set_slot2: 23, 16;
    pub u8, slot3, set_slot3: 31, 24;
}

/// Read bit 0 (express charge) and bit 1 (charge disable) as capabilities
pub fn decode_feature_bits(byte: u8) -> FeatureFlags {
    let bits = FeatureByte(byte);
    FeatureFlags {
        express_charging: bits.express_charging(),
        charge_disable: bits.charge_disable(),
    }
}

/// Read bit 0 (express charge enabled) and bit 1 (charging disabled) as status
pub fn decode_status_bits(byte: u8) -> FeatureFlags {
    decode_feature_bits(byte)
}

/// Map a slot byte onto an express charge state
pub fn decode_battery_state(byte: u8) -> ExpressChargeState {
    ExpressChargeState::from(byte)
}

impl ChargeRegister {
    /// What the platform can do
    pub fn supported(&self) -> FeatureFlags {
        decode_feature_bits(self.supported_bits())
    }

    /// What is currently in effect
    pub fn enabled(&self) -> FeatureFlags {
        decode_status_bits(self.status_bits())
    }
}

impl BatteryStateRegister {
    /// Pack per-slot states into a register value
    pub fn from_states(states: [ExpressChargeState; BATTERY_SLOTS]) -> Self {
        let mut reg = BatteryStateRegister(0);
        reg.set_slot0(states[0].into());
        reg.set_slot1(states[1].into());
        reg.set_slot2(states[2].into());
        reg.set_slot3(states[3].into());
        reg
    }

    /// Raw byte of slot `index`, `None` past the last slot
    pub fn raw_slot(&self, index: usize) -> Option<u8> {
        match index {
            0 => Some(self.slot0()),
            1 => Some(self.slot1()),
            2 => Some(self.slot2()),
            3 => Some(self.slot3()),
            _ => None,
        }
    }

    /// Decoded state of slot `index`
    pub fn state(&self, index: usize) -> Option<ExpressChargeState> {
        self.raw_slot(index).map(decode_battery_state)
    }

    /// Slots holding a non-zero state byte
    pub fn installed(&self) -> Vec<BatterySlot> {
        (0..BATTERY_SLOTS)
            .filter_map(|i| {
                let raw = self.raw_slot(i)?;
                (raw != 0).then(|| BatterySlot {
                    index: i as u8,
                    state: decode_battery_state(raw),
                })
            })
            .collect()
    }
}

/// Argument word for the "set charge disable" sub-function
pub fn charge_disable_arg(disable: bool) -> u32 {
    u32::from(disable)
}
