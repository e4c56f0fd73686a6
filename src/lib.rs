//! # SMBIOS Battery Library
//!
//! A Rust library for reading and changing the battery charging settings that
//! Dell firmware keeps in SMBIOS tokens, and for querying express charge state
//! through the battery charging SMI.
//!
//! ## Features
//!
//! - Read and select the primary charging mode (standard, express, adaptive, ...)
//! - Read and validate-then-write the custom charge interval
//! - Decode express charge capabilities and per-battery state
//! - Token access over the SMI calling interface, with a sysfs token table loader
//! - Optional simulated firmware for tests and demos (`mock` feature)
//!
//! The privileged call itself is supplied by the caller through
//! [`SmiTransport`].
//!
//! ## Example
//!
//! ```no_run
//! use smbios_battery::{ChargingMode, Session, SmiRequest, SmiResponse, SmiTokenStore, SmiTransport, TokenTable};
//!
//! struct Driver;
//!
//! impl SmiTransport for Driver {
//!     fn call(&mut self, _request: SmiRequest) -> smbios_battery::Result<SmiResponse> {
//!         unimplemented!("issue the SMI through the platform driver")
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SmiTokenStore::new(TokenTable::load_sysfs()?, Driver);
//!     let mut session = Session::new(store, Driver);
//!     session.set_charging_mode(ChargingMode::Adaptive)?;
//!     println!("Charging mode: {}", session.charging_mode()?);
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod command;
pub mod constants;
pub mod error;
pub mod protocol;
pub mod registers;
pub mod smi;
pub mod token;
pub mod types;
pub mod validate;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use command::{run, Command, Outcome};
pub use error::{ErrorCategory, RangeViolation, Result, SmbiosError};
pub use protocol::Session;
pub use smi::{SmiRequest, SmiResponse, SmiTransport};
pub use token::{SmiTokenStore, TokenEntry, TokenStore, TokenTable};
pub use types::*;
