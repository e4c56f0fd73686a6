//! Command surface: one command per invocation, rendered for a terminal or
//! serialised, with errors mapped to exit codes.

use log::{debug, error};
use serde::Serialize;
use std::fmt;

use crate::error::Result;
use crate::protocol::Session;
use crate::smi::SmiTransport;
use crate::token::TokenStore;
use crate::types::*;

/// Exit code for a successful command
pub const EXIT_SUCCESS: i32 = 0;

/// A single battery control request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GetChargingState,
    GetPrimaryChargeConfig,
    SetChargingMode(ChargingMode),
    SetCustomInterval { start: u16, end: u16 },
}

/// Result of a successful command
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    ChargingState(ChargingStatus),
    PrimaryChargeConfig(ChargeConfig),
    ModeSet { mode: ChargingMode },
    IntervalSet { start: u16, end: u16 },
}

/// Run `command` in a fresh session that is released before returning
pub fn run<S: TokenStore, T: SmiTransport>(command: Command, store: S, transport: T) -> Result<Outcome> {
    let mut session = Session::new(store, transport);
    let result = match command {
        Command::GetChargingState => session.charging_status().map(Outcome::ChargingState),
        Command::GetPrimaryChargeConfig => session.primary_charge_config().map(Outcome::PrimaryChargeConfig),
        Command::SetChargingMode(mode) => session.set_charging_mode(mode).map(|()| Outcome::ModeSet { mode }),
        Command::SetCustomInterval { start, end } => session
            .set_custom_interval(start, end)
            .map(|()| Outcome::IntervalSet { start, end }),
    };
    drop(session);
    debug!("Closing battery control session");
    result
}

/// Print the outcome or the error and return the process exit code
pub fn report(result: &Result<Outcome>) -> i32 {
    match result {
        Ok(outcome) => {
            println!("{}", outcome);
            EXIT_SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            e.exit_code()
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

impl fmt::Display for ChargingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Express charge supported: {}", yes_no(self.supported.express_charging))?;
        writeln!(f, "Charge disable supported: {}", yes_no(self.supported.charge_disable))?;
        writeln!(f, "Express charge enabled: {}", yes_no(self.enabled.express_charging))?;
        write!(f, "Charging disabled: {}", yes_no(self.enabled.charge_disable))?;
        for slot in &self.batteries {
            write!(f, "\nBattery {}: {}", slot.index, slot.state)?;
        }
        Ok(())
    }
}

impl fmt::Display for ChargeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Charging mode: {}", self.mode)?;
        if let Some(interval) = self.custom_interval {
            write!(f, "\nCustom charge interval: {}% - {}%", interval.start, interval.end)?;
        }
        Ok(())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::ChargingState(status) => fmt::Display::fmt(status, f),
            Outcome::PrimaryChargeConfig(config) => fmt::Display::fmt(config, f),
            Outcome::ModeSet { mode } => write!(f, "Charging mode set to {}", mode),
            Outcome::IntervalSet { start, end } => write!(f, "Custom charge interval set to {}% - {}%", start, end),
        }
    }
}
