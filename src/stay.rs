// Stay date ranges
// A stay covers the nights of [check_in, check_out): the guest leaves on the
// check-out date, so that night is never occupied.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected stay range
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("check-out {check_out} must be after check-in {check_in}")]
pub struct InvalidRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// Half-open date interval of a stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayRange {
    /// Build a range, rejecting empty or inverted stays
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, InvalidRange> {
        if check_out <= check_in {
            return Err(InvalidRange { check_in, check_out });
        }
        Ok(Self { check_in, check_out })
    }

    /// Number of nights, always >= 1
    pub fn nights(&self) -> i64 {
        self.check_out.signed_duration_since(self.check_in).num_days()
    }

    /// [a,b) and [c,d) overlap iff a < d and c < b.
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }
}

impl std::fmt::Display for StayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.check_in, self.check_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_rejects_empty_and_inverted_ranges() {
        assert!(StayRange::new(day(3), day(3)).is_err());
        assert!(StayRange::new(day(4), day(3)).is_err());
        assert!(StayRange::new(day(3), day(4)).is_ok());
    }

    #[test]
    fn test_nights_counts_calendar_days() {
        let stay = StayRange::new(day(1), day(4)).unwrap();
        assert_eq!(stay.nights(), 3);

        let across_month = StayRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 30).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 2).unwrap(),
        )
        .unwrap();
        assert_eq!(across_month.nights(), 3);
    }

    #[test]
    fn test_overlapping_stays() {
        let existing = StayRange::new(day(1), day(3)).unwrap();
        let request = StayRange::new(day(2), day(4)).unwrap();
        assert!(existing.overlaps(&request));
        assert!(request.overlaps(&existing));
    }

    #[test]
    fn test_back_to_back_stays_do_not_overlap() {
        let existing = StayRange::new(day(1), day(3)).unwrap();
        let request = StayRange::new(day(3), day(5)).unwrap();
        assert!(!existing.overlaps(&request));
        assert!(!request.overlaps(&existing));
    }

    #[test]
    fn test_enclosed_stay_overlaps() {
        let outer = StayRange::new(day(1), day(10)).unwrap();
        let inner = StayRange::new(day(4), day(5)).unwrap();
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(
            a in 1u32..20, len_a in 1u32..8,
            b in 1u32..20, len_b in 1u32..8,
        ) {
            let first = StayRange::new(day(a), day(a + len_a)).unwrap();
            let second = StayRange::new(day(b), day(b + len_b)).unwrap();
            prop_assert_eq!(first.overlaps(&second), second.overlaps(&first));
        }

        #[test]
        fn prop_overlap_matches_shared_night(
            a in 1u32..20, len_a in 1u32..8,
            b in 1u32..20, len_b in 1u32..8,
        ) {
            let first = StayRange::new(day(a), day(a + len_a)).unwrap();
            let second = StayRange::new(day(b), day(b + len_b)).unwrap();
            let shares_night = (a..a + len_a).any(|night| night >= b && night < b + len_b);
            prop_assert_eq!(first.overlaps(&second), shares_night);
        }
    }
}
