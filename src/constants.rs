//! Protocol constants for Dell SMBIOS battery charging control.
//!
//! This module defines the token identifiers, SMI class/select codes and
//! interval limits that make up the fixed contract with the firmware.

use crate::types::TokenId;

/// Token selecting the "primarily AC use" charging mode
pub const TOKEN_MODE_PRIMARILY_AC: TokenId = TokenId(0x0341);

/// Token selecting the "adaptive" charging mode
pub const TOKEN_MODE_ADAPTIVE: TokenId = TokenId(0x0342);

/// Token selecting the "custom" charging mode
pub const TOKEN_MODE_CUSTOM: TokenId = TokenId(0x0343);

/// Token selecting the "standard" charging mode
pub const TOKEN_MODE_STANDARD: TokenId = TokenId(0x0346);

/// Token selecting the "express" charging mode
pub const TOKEN_MODE_EXPRESS: TokenId = TokenId(0x0347);

/// Custom charge interval start percentage (2-byte little-endian)
pub const TOKEN_CUSTOM_CHARGE_START: TokenId = TokenId(0x0349);

/// Custom charge interval end percentage (2-byte little-endian)
pub const TOKEN_CUSTOM_CHARGE_END: TokenId = TokenId(0x034A);

/// Payload width of the interval bound tokens
pub const INTERVAL_BOUND_LEN: usize = 2;

/// Lowest accepted custom charge start percentage
pub const CUSTOM_START_MIN: u16 = 50;

/// Highest accepted custom charge start percentage
pub const CUSTOM_START_MAX: u16 = 95;

/// Lowest accepted custom charge end percentage
pub const CUSTOM_END_MIN: u16 = 55;

/// Highest accepted custom charge end percentage
pub const CUSTOM_END_MAX: u16 = 100;

/// Minimum distance between start and end percentages
pub const CUSTOM_MIN_GAP: u16 = 5;

/// SMI class for standard token reads
pub const SMI_CLASS_TOKEN_READ: u16 = 0;

/// SMI class for standard token writes
pub const SMI_CLASS_TOKEN_WRITE: u16 = 1;

/// SMI select for standard (non battery/AC specific) token access
pub const SMI_SELECT_TOKEN_STD: u16 = 0;

/// SMI class for battery charging get/set
pub const SMI_CLASS_BATTERY: u16 = 4;

/// SMI select for battery charging get/set
pub const SMI_SELECT_BATTERY_CHARGING: u16 = 12;

/// Battery charging sub-function: read capabilities and state
pub const BATTERY_ARG_GET: u32 = 0;

/// Battery charging sub-function: set the charge disable flag
pub const BATTERY_ARG_SET_CHARGE_DISABLE: u32 = 1;

/// Battery charging sub-function: set per-battery express charge state
pub const BATTERY_ARG_SET_EXPRESS: u32 = 2;

/// Number of battery slots reported in the state register
pub const BATTERY_SLOTS: usize = 4;

/// Default location of the kernel's token export
pub const SYSFS_TOKEN_DIR: &str = "/sys/devices/platform/dell-smbios.0/tokens";
