//! Conversion between domain values and token payloads.
//!
//! Nothing here checks whether a value makes sense for the firmware; see
//! [`crate::validate`] for that.

use crate::constants::INTERVAL_BOUND_LEN;
use crate::error::{Result, SmbiosError};

/// Encode an interval bound as a 2-byte little-endian payload
pub fn encode_interval_bound(value: u16) -> [u8; INTERVAL_BOUND_LEN] {
    value.to_le_bytes()
}

/// Decode a 2-byte little-endian interval bound payload
pub fn decode_interval_bound(payload: &[u8]) -> Result<u16> {
    let bytes: [u8; INTERVAL_BOUND_LEN] = payload.try_into().map_err(|_| SmbiosError::MalformedPayload {
        expected: INTERVAL_BOUND_LEN,
        actual: payload.len(),
    })?;
    Ok(u16::from_le_bytes(bytes))
}

/// Widen a byte-string payload (at most 4 bytes) into the SMI value register
pub fn token_value_from_payload(payload: &[u8]) -> Result<u32> {
    if payload.len() > 4 {
        return Err(SmbiosError::MalformedPayload {
            expected: 4,
            actual: payload.len(),
        });
    }
    let mut bytes = [0u8; 4];
    bytes[..payload.len()].copy_from_slice(payload);
    Ok(u32::from_le_bytes(bytes))
}

/// Narrow an SMI value register to a `len`-byte payload
pub fn payload_from_token_value(value: u32, len: usize) -> Result<Vec<u8>> {
    let bytes = value.to_le_bytes();
    bytes
        .get(..len)
        .map(<[u8]>::to_vec)
        .ok_or(SmbiosError::MalformedPayload {
            expected: 4,
            actual: len,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_little_endian() {
        assert_eq!(encode_interval_bound(60), [0x3C, 0x00]);
        assert_eq!(encode_interval_bound(70), [0x46, 0x00]);
        assert_eq!(encode_interval_bound(0x1234), [0x34, 0x12]);
    }

    #[test]
    fn every_u16_survives_a_round_trip() {
        for x in 0..=u16::MAX {
            assert_eq!(decode_interval_bound(&encode_interval_bound(x)).unwrap(), x);
        }
    }

    #[test]
    fn wrong_width_payload_is_malformed() {
        assert!(matches!(
            decode_interval_bound(&[0x3C]),
            Err(SmbiosError::MalformedPayload { expected: 2, actual: 1 })
        ));
        assert!(decode_interval_bound(&[0x3C, 0, 0]).is_err());
    }

    #[test]
    fn payload_widens_into_value_register() {
        assert_eq!(token_value_from_payload(&[0x46, 0x00]).unwrap(), 70);
        assert_eq!(payload_from_token_value(70, 2).unwrap(), vec![0x46, 0x00]);
        assert!(token_value_from_payload(&[0; 5]).is_err());
        assert!(payload_from_token_value(0, 5).is_err());
    }
}
