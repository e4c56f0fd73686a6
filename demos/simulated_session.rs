//! Simulated Session Example
//!
//! This example walks through the battery control commands against the
//! in-memory firmware from the `mock` feature:
//! - Interactive command selection
//! - Charging mode and custom interval changes
//! - Charging state report with JSON export
//!
//! Usage:
//!   cargo run --features mock --example simulated_session
//!
//! Set RUST_LOG environment variable to control logging:
//!   RUST_LOG=debug cargo run --features mock --example simulated_session

use inquire::{CustomType, Select};
use log::{error, info};
use smbios_battery::command::report;
use smbios_battery::mock::SimulatedFirmware;
use smbios_battery::{run, ChargingMode, Command, Result, SmiTokenStore};

const GET_STATE: &str = "Get charging state";
const GET_CONFIG: &str = "Get primary charge config";
const SET_MODE: &str = "Set charging mode";
const SET_INTERVAL: &str = "Set custom charge interval";
const QUIT: &str = "Quit";

fn prompt_error(e: inquire::InquireError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("Selection cancelled: {}", e))
}

/// Ask which command to run next, `None` to stop
fn select_command() -> Result<Option<Command>> {
    let choice = Select::new(
        "Select a command:",
        vec![GET_STATE, GET_CONFIG, SET_MODE, SET_INTERVAL, QUIT],
    )
    .prompt()
    .map_err(prompt_error)?;

    let command = match choice {
        GET_STATE => Command::GetChargingState,
        GET_CONFIG => Command::GetPrimaryChargeConfig,
        SET_MODE => {
            let modes: Vec<&str> = ChargingMode::all().map(ChargingMode::as_str).collect();
            let name = Select::new("Select a charging mode:", modes)
                .prompt()
                .map_err(prompt_error)?;
            Command::SetChargingMode(name.parse()?)
        }
        SET_INTERVAL => {
            let start = CustomType::<u16>::new("Start charging at (%):")
                .prompt()
                .map_err(prompt_error)?;
            let end = CustomType::<u16>::new("Stop charging at (%):")
                .prompt()
                .map_err(prompt_error)?;
            Command::SetCustomInterval { start, end }
        }
        _ => return Ok(None),
    };
    Ok(Some(command))
}

fn main() -> Result<()> {
    // Initialize logger with default info level if RUST_LOG is not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let firmware = SimulatedFirmware::new();
    info!("Simulated firmware ready with {} tokens", firmware.token_table().len());

    while let Some(command) = select_command()? {
        let store = SmiTokenStore::new(firmware.token_table(), firmware.clone());
        let result = run(command, store, firmware.clone());
        let code = report(&result);

        match &result {
            Ok(outcome) => match serde_json::to_string_pretty(outcome) {
                Ok(json) => println!("{}", json),
                Err(e) => error!("Could not serialise outcome: {}", e),
            },
            Err(_) => info!("Command would exit with code {}", code),
        }
    }

    info!("{} SMI calls issued", firmware.calls().len());
    Ok(())
}
