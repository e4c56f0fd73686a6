//! Cross-token consistency rules, checked before anything is written.

use crate::constants::*;
use crate::error::{RangeViolation, Result, SmbiosError};
use crate::types::{ChargeInterval, ChargingMode};

/// Check a custom charge interval.
///
/// Constraints are evaluated in order (start range, end range, gap) and the
/// first one broken is reported.
pub fn validate_interval(start: u16, end: u16) -> Result<ChargeInterval> {
    if !(CUSTOM_START_MIN..=CUSTOM_START_MAX).contains(&start) {
        return Err(RangeViolation::StartOutOfRange {
            start,
            min: CUSTOM_START_MIN,
            max: CUSTOM_START_MAX,
        }
        .into());
    }
    if !(CUSTOM_END_MIN..=CUSTOM_END_MAX).contains(&end) {
        return Err(RangeViolation::EndOutOfRange {
            end,
            min: CUSTOM_END_MIN,
            max: CUSTOM_END_MAX,
        }
        .into());
    }
    if end < start + CUSTOM_MIN_GAP {
        return Err(RangeViolation::GapTooSmall {
            start,
            end,
            gap: CUSTOM_MIN_GAP,
        }
        .into());
    }
    Ok(ChargeInterval { start, end })
}

/// Resolve the single active charging mode
pub fn validate_mode_selection(active: &[ChargingMode]) -> Result<ChargingMode> {
    match active {
        [] => Err(SmbiosError::NoModeActive),
        [mode] => Ok(*mode),
        modes => Err(SmbiosError::MultipleModesActive(modes.to_vec())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(50, 55)]
    #[case(50, 100)]
    #[case(95, 100)]
    #[case(60, 70)]
    fn accepts_intervals_in_range(#[case] start: u16, #[case] end: u16) {
        assert_eq!(validate_interval(start, end).unwrap(), ChargeInterval { start, end });
    }

    #[rstest]
    #[case(49, 55, RangeViolation::StartOutOfRange { start: 49, min: 50, max: 95 })]
    #[case(96, 100, RangeViolation::StartOutOfRange { start: 96, min: 50, max: 95 })]
    #[case(50, 54, RangeViolation::EndOutOfRange { end: 54, min: 55, max: 100 })]
    #[case(60, 101, RangeViolation::EndOutOfRange { end: 101, min: 55, max: 100 })]
    #[case(60, 64, RangeViolation::GapTooSmall { start: 60, end: 64, gap: 5 })]
    #[case(90, 55, RangeViolation::GapTooSmall { start: 90, end: 55, gap: 5 })]
    fn rejects_first_broken_constraint(#[case] start: u16, #[case] end: u16, #[case] expected: RangeViolation) {
        match validate_interval(start, end) {
            Err(SmbiosError::RangeViolation(v)) => assert_eq!(v, expected),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn start_is_reported_before_end() {
        assert!(matches!(
            validate_interval(10, 200),
            Err(SmbiosError::RangeViolation(RangeViolation::StartOutOfRange { start: 10, .. }))
        ));
    }

    #[test]
    fn single_active_mode_resolves() {
        for mode in ChargingMode::all() {
            assert_eq!(validate_mode_selection(&[mode]).unwrap(), mode);
        }
    }

    #[test]
    fn no_active_mode_is_an_error() {
        assert!(matches!(validate_mode_selection(&[]), Err(SmbiosError::NoModeActive)));
    }

    #[test]
    fn every_combination_of_two_or_more_is_an_error() {
        let modes: Vec<ChargingMode> = ChargingMode::all().collect();
        for mask in 0u8..32 {
            let active: Vec<ChargingMode> = modes
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, &m)| m)
                .collect();
            match (active.len(), validate_mode_selection(&active)) {
                (0, Err(SmbiosError::NoModeActive)) => {}
                (1, Ok(mode)) => assert_eq!(mode, active[0]),
                (_, Err(SmbiosError::MultipleModesActive(found))) => assert_eq!(found, active),
                (n, other) => panic!("{} active modes gave {:?}", n, other),
            }
        }
    }
}
