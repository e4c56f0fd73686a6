//! Error types for SMBIOS token and SMI operations.

use crate::types::{ChargingMode, TokenId};
use thiserror::Error;

/// Result type alias for SMBIOS battery operations.
pub type Result<T> = std::result::Result<T, SmbiosError>;

/// Which custom charge interval constraint was broken.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeViolation {
    /// Start percentage outside 50..=95
    #[error("start {start}% is outside {min}..={max}")]
    StartOutOfRange {
        /// Rejected start value
        start: u16,
        /// Lowest accepted start
        min: u16,
        /// Highest accepted start
        max: u16,
    },

    /// End percentage outside 55..=100
    #[error("end {end}% is outside {min}..={max}")]
    EndOutOfRange {
        /// Rejected end value
        end: u16,
        /// Lowest accepted end
        min: u16,
        /// Highest accepted end
        max: u16,
    },

    /// End is not at least the minimum gap above start
    #[error("end {end}% must be at least {gap} above start {start}%")]
    GapTooSmall {
        /// Requested start
        start: u16,
        /// Requested end
        end: u16,
        /// Required gap
        gap: u16,
    },
}

/// Error types for battery charging control.
#[derive(Error, Debug)]
pub enum SmbiosError {
    /// Custom charge interval rejected before any write
    #[error("Invalid custom charge interval: {0}")]
    RangeViolation(#[from] RangeViolation),

    /// None of the charging mode tokens is active
    #[error("No charging mode is enabled")]
    NoModeActive,

    /// More than one charging mode token is active
    #[error("Multiple charging modes are enabled: {}", mode_list(.0))]
    MultipleModesActive(Vec<ChargingMode>),

    /// Charging mode name not recognised
    #[error("Invalid charging mode: {0}")]
    InvalidMode(String),

    /// Token id not present in the token table
    #[error("Token not found: {token}")]
    UnknownToken {
        /// Token that was looked up
        token: TokenId,
    },

    /// Token table could not be parsed
    #[error("Malformed token table: {0}")]
    MalformedTable(String),

    /// Token payload had an unexpected width
    #[error("Malformed token payload: expected {expected} bytes, got {actual}")]
    MalformedPayload {
        /// Expected payload length
        expected: usize,
        /// Received payload length
        actual: usize,
    },

    /// I/O error while reading the token table
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The store or firmware refused a token write
    #[error("Token {token} could not be changed: {reason}")]
    ManipulationRejected {
        /// Token being written
        token: TokenId,
        /// Reason reported by the store
        reason: String,
    },

    /// SMI call returned a non-zero status
    #[error("SMI call failed with status {status}")]
    Transport {
        /// Raw status register
        status: i32,
    },
}

fn mode_list(modes: &[ChargingMode]) -> String {
    modes
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Coarse error classes the command layer maps to exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Range, gap or exclusivity violated; nothing was written
    Validation,
    /// Token table malformed or token unknown
    Table,
    /// A write was rejected by the store or firmware
    Manipulation,
    /// The SMI call failed
    Transport,
}

impl ErrorCategory {
    /// Process exit code for this category
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCategory::Validation => 2,
            ErrorCategory::Transport => 3,
            ErrorCategory::Table => 4,
            ErrorCategory::Manipulation => 5,
        }
    }
}

impl SmbiosError {
    /// Category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            SmbiosError::RangeViolation(_)
            | SmbiosError::NoModeActive
            | SmbiosError::MultipleModesActive(_)
            | SmbiosError::InvalidMode(_) => ErrorCategory::Validation,
            SmbiosError::UnknownToken { .. }
            | SmbiosError::MalformedTable(_)
            | SmbiosError::MalformedPayload { .. }
            | SmbiosError::Io(_) => ErrorCategory::Table,
            SmbiosError::ManipulationRejected { .. } => ErrorCategory::Manipulation,
            SmbiosError::Transport { .. } => ErrorCategory::Transport,
        }
    }

    /// Shorthand for `self.category().exit_code()`
    pub fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiple_modes_message_names_each_mode() {
        let err = SmbiosError::MultipleModesActive(vec![ChargingMode::Standard, ChargingMode::Express]);
        assert_eq!(err.to_string(), "Multiple charging modes are enabled: standard, express");
    }

    #[test]
    fn categories_have_distinct_exit_codes() {
        let codes = [
            SmbiosError::NoModeActive.exit_code(),
            SmbiosError::MalformedTable("x".into()).exit_code(),
            SmbiosError::ManipulationRejected {
                token: TokenId(0x0346),
                reason: "locked".into(),
            }
            .exit_code(),
            SmbiosError::Transport { status: -1 }.exit_code(),
        ];
        assert_eq!(codes, [2, 4, 5, 3]);
    }

    #[test]
    fn range_violation_converts() {
        let err: SmbiosError = RangeViolation::GapTooSmall { start: 50, end: 54, gap: 5 }.into();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(
            err.to_string(),
            "Invalid custom charge interval: end 54% must be at least 5 above start 50%"
        );
    }
}
