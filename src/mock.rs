//! In-memory firmware for tests and demos.
//!
//! Handles token read/write (classes 0/1) and battery charging (class 4,
//! select 12). Mode tokens share one location with distinct values, so
//! activating one mode deselects the others the way real firmware does.
//! Clones share state.

use log::debug;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::constants::*;
use crate::error::Result;
use crate::registers::BatteryStateRegister;
use crate::smi::{SmiRequest, SmiResponse, SmiTransport};
use crate::token::{TokenEntry, TokenTable};
use crate::types::{ChargingMode, ExpressChargeState, FeatureFlags, TokenId, MODE_TOKENS};

/// Location shared by all mode tokens
pub const MODE_LOCATION: u16 = 0x0440;

/// Location of the custom charge start token
pub const START_LOCATION: u16 = 0x0450;

/// Location of the custom charge end token
pub const END_LOCATION: u16 = 0x0452;

/// Status returned for calls the firmware does not implement
pub const STATUS_UNSUPPORTED: i32 = -1;

/// Status returned when a write is refused
pub const STATUS_DENIED: i32 = -2;

#[derive(Debug)]
struct State {
    table: TokenTable,
    memory: HashMap<u16, u32>,
    locked: HashSet<u16>,
    supported: FeatureFlags,
    enabled: FeatureFlags,
    batteries: [ExpressChargeState; BATTERY_SLOTS],
    battery_status: i32,
    calls: Vec<SmiRequest>,
}

/// Simulated firmware implementing [`SmiTransport`]
#[derive(Debug, Clone)]
pub struct SimulatedFirmware {
    state: Rc<RefCell<State>>,
}

impl Default for SimulatedFirmware {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedFirmware {
    /// Standard mode selected, interval 50..90, one express-capable battery
    pub fn new() -> Self {
        let mut table = TokenTable::new();
        for (value, &(_, token)) in (1u16..).zip(MODE_TOKENS.iter()) {
            table.insert(
                token,
                TokenEntry {
                    location: MODE_LOCATION,
                    value,
                },
            );
        }
        table.insert(
            TOKEN_CUSTOM_CHARGE_START,
            TokenEntry {
                location: START_LOCATION,
                value: 0,
            },
        );
        table.insert(
            TOKEN_CUSTOM_CHARGE_END,
            TokenEntry {
                location: END_LOCATION,
                value: 0,
            },
        );

        let mut memory = HashMap::new();
        let standard = table.entry(TOKEN_MODE_STANDARD).map(|e| e.value).unwrap_or_default();
        memory.insert(MODE_LOCATION, u32::from(standard));
        memory.insert(START_LOCATION, 50);
        memory.insert(END_LOCATION, 90);

        SimulatedFirmware {
            state: Rc::new(RefCell::new(State {
                table,
                memory,
                locked: HashSet::new(),
                supported: FeatureFlags {
                    express_charging: true,
                    charge_disable: true,
                },
                enabled: FeatureFlags::default(),
                batteries: [
                    ExpressChargeState::Standard,
                    ExpressChargeState::Absent,
                    ExpressChargeState::Absent,
                    ExpressChargeState::Absent,
                ],
                battery_status: 0,
                calls: Vec::new(),
            })),
        }
    }

    /// Token table describing this firmware's token layout
    pub fn token_table(&self) -> TokenTable {
        self.state.borrow().table.clone()
    }

    /// Refuse writes to the token's location
    pub fn lock_token(&self, token: TokenId) {
        let mut state = self.state.borrow_mut();
        if let Ok(entry) = state.table.entry(token) {
            state.locked.insert(entry.location);
        }
    }

    /// Overwrite a location directly, bypassing locks
    pub fn poke(&self, location: u16, value: u32) {
        self.state.borrow_mut().memory.insert(location, value);
    }

    /// Current raw value at a location
    pub fn peek(&self, location: u16) -> u32 {
        self.state.borrow().memory.get(&location).copied().unwrap_or(0)
    }

    /// Mode currently stored, if the mode location holds a known value
    pub fn mode(&self) -> Option<ChargingMode> {
        let state = self.state.borrow();
        let current = state.memory.get(&MODE_LOCATION).copied().unwrap_or(0);
        MODE_TOKENS
            .iter()
            .find(|&&(_, token)| {
                state
                    .table
                    .entry(token)
                    .map(|e| u32::from(e.value) == current)
                    .unwrap_or(false)
            })
            .map(|&(mode, _)| mode)
    }

    pub fn set_capabilities(&self, supported: FeatureFlags) {
        self.state.borrow_mut().supported = supported;
    }

    pub fn set_enabled(&self, enabled: FeatureFlags) {
        self.state.borrow_mut().enabled = enabled;
    }

    pub fn set_batteries(&self, batteries: [ExpressChargeState; BATTERY_SLOTS]) {
        self.state.borrow_mut().batteries = batteries;
    }

    pub fn batteries(&self) -> [ExpressChargeState; BATTERY_SLOTS] {
        self.state.borrow().batteries
    }

    pub fn enabled(&self) -> FeatureFlags {
        self.state.borrow().enabled
    }

    /// Make every battery charging call return `status`
    pub fn fail_battery_calls(&self, status: i32) {
        self.state.borrow_mut().battery_status = status;
    }

    /// Every request received so far
    pub fn calls(&self) -> Vec<SmiRequest> {
        self.state.borrow().calls.clone()
    }
}

fn flag_bits(flags: FeatureFlags) -> u32 {
    u32::from(flags.express_charging) | (u32::from(flags.charge_disable) << 1)
}

fn fail(status: i32) -> SmiResponse {
    SmiResponse {
        status,
        ..Default::default()
    }
}

impl State {
    fn token_read(&self, location: u32) -> SmiResponse {
        let value = u16::try_from(location)
            .ok()
            .and_then(|loc| self.memory.get(&loc).copied())
            .unwrap_or(0);
        SmiResponse {
            status: 0,
            reg2: value,
            reg3: 0,
        }
    }

    fn token_write(&mut self, location: u32, value: u32) -> SmiResponse {
        let Ok(location) = u16::try_from(location) else {
            return fail(STATUS_UNSUPPORTED);
        };
        if self.locked.contains(&location) {
            return fail(STATUS_DENIED);
        }
        self.memory.insert(location, value);
        SmiResponse::default()
    }

    fn battery(&mut self, arg1: u32, arg2: u32) -> SmiResponse {
        if self.battery_status != 0 {
            return fail(self.battery_status);
        }
        match arg1 {
            BATTERY_ARG_GET => SmiResponse {
                status: 0,
                reg2: flag_bits(self.supported) | (flag_bits(self.enabled) << 8),
                reg3: BatteryStateRegister::from_states(self.batteries).0,
            },
            BATTERY_ARG_SET_CHARGE_DISABLE if self.supported.charge_disable => {
                self.enabled.charge_disable = arg2 & 1 != 0;
                SmiResponse::default()
            }
            BATTERY_ARG_SET_EXPRESS if self.supported.express_charging => {
                let requested = BatteryStateRegister(arg2);
                for (i, slot) in self.batteries.iter_mut().enumerate() {
                    let installed = !matches!(slot, ExpressChargeState::Absent | ExpressChargeState::Unsupported);
                    if let (true, Some(state)) = (installed, requested.state(i)) {
                        if state != ExpressChargeState::Absent {
                            *slot = state;
                        }
                    }
                }
                self.enabled.express_charging = self.batteries.iter().any(|s| {
                    matches!(s, ExpressChargeState::Express | ExpressChargeState::OneTimeExpress)
                });
                SmiResponse::default()
            }
            _ => fail(STATUS_UNSUPPORTED),
        }
    }
}

impl SmiTransport for SimulatedFirmware {
    fn call(&mut self, request: SmiRequest) -> Result<SmiResponse> {
        let mut state = self.state.borrow_mut();
        state.calls.push(request);
        let response = match (request.class, request.select) {
            (SMI_CLASS_TOKEN_READ, SMI_SELECT_TOKEN_STD) => state.token_read(request.arg1),
            (SMI_CLASS_TOKEN_WRITE, SMI_SELECT_TOKEN_STD) => state.token_write(request.arg1, request.arg2),
            (SMI_CLASS_BATTERY, SMI_SELECT_BATTERY_CHARGING) => state.battery(request.arg1, request.arg2),
            _ => fail(STATUS_UNSUPPORTED),
        };
        debug!("Simulated firmware answered {:?} with {:?}", request, response);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_tokens_share_one_location() {
        let table = SimulatedFirmware::new().token_table();
        for (mode, token) in MODE_TOKENS {
            assert_eq!(table.entry(token).unwrap().location, MODE_LOCATION, "{}", mode);
        }
    }

    #[test]
    fn starts_in_standard_mode() {
        assert_eq!(SimulatedFirmware::new().mode(), Some(ChargingMode::Standard));
    }

    #[test]
    fn unknown_class_is_unsupported() {
        let mut fw = SimulatedFirmware::new();
        let resp = fw.call(SmiRequest::new(17, 2, 0, 0)).unwrap();
        assert_eq!(resp.status, STATUS_UNSUPPORTED);
        assert_eq!(fw.calls().len(), 1);
    }
}
