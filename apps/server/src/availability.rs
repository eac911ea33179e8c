//! Slot calculation for a single shop and date.
//!
//! All math happens on minutes-since-midnight integers; `HH:MM` strings only
//! exist at the edges (storage and API). Booked intervals are half-open
//! `[start, start+duration)`, so a slot may begin exactly where an
//! appointment ends.

/// Candidate grid step in minutes. This is the booking granularity exposed
/// to clients and is independent of the requested service duration.
pub const GRID_STEP_MIN: i64 = 30;

/// Duration assumed when the caller does not name a service duration.
pub const DEFAULT_DURATION_MIN: i64 = 30;

/// A half-open time-of-day range `[start_min, end_min)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_min: i64,
    pub end_min: i64,
}

impl TimeRange {
    pub fn new(start_min: i64, end_min: i64) -> Self {
        Self { start_min, end_min }
    }

    pub fn from_start_duration(start_min: i64, duration_min: i64) -> Self {
        Self {
            start_min,
            end_min: start_min + duration_min,
        }
    }

    /// Strict half-open overlap: touching endpoints do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start_min < other.end_min && self.end_min > other.start_min
    }
}

/// Parse a `HH:MM` (or `HH:MM:SS`, which the store may hand back) string
/// into minutes since midnight.
pub fn parse_hhmm(time: &str) -> Option<i64> {
    let mut parts = time.split(':');
    let hour: i64 = parts.next()?.parse().ok()?;
    let min: i64 = parts.next()?.parse().ok()?;
    if !(0..24).contains(&hour) || !(0..60).contains(&min) {
        return None;
    }
    Some(hour * 60 + min)
}

/// Format minutes since midnight as zero-padded `HH:MM`.
pub fn format_hhmm(minutes: i64) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// True if the candidate range overlaps any booked interval.
pub fn conflicts(candidate: TimeRange, booked: &[TimeRange]) -> bool {
    booked.iter().any(|b| candidate.overlaps(b))
}

/// Generate bookable start times for one day.
///
/// Working intervals arrive in store order; they are sorted by start (ties
/// by end) and then walked independently on the 30-minute grid, each grid
/// anchored at its interval's start. Intervals are not merged or
/// deduplicated — overlapping intervals are a caller-data problem and are
/// processed as given. A degenerate interval (start ≥ end) yields nothing.
pub fn compute_slots(working: &[TimeRange], booked: &[TimeRange], duration_min: i64) -> Vec<String> {
    let mut intervals = working.to_vec();
    intervals.sort_by_key(|iv| (iv.start_min, iv.end_min));

    let mut slots = Vec::new();
    for interval in &intervals {
        let mut current = interval.start_min;
        while current + duration_min <= interval.end_min {
            let candidate = TimeRange::from_start_duration(current, duration_min);
            if !conflicts(candidate, booked) {
                slots.push(format_hhmm(current));
            }
            current += GRID_STEP_MIN;
        }
    }
    slots
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &str, end: &str) -> TimeRange {
        TimeRange::new(parse_hhmm(start).unwrap(), parse_hhmm(end).unwrap())
    }

    fn booked(start: &str, duration_min: i64) -> TimeRange {
        TimeRange::from_start_duration(parse_hhmm(start).unwrap(), duration_min)
    }

    // ── parse_hhmm ──

    #[test]
    fn test_parse_basic() {
        assert_eq!(parse_hhmm("09:30"), Some(570));
    }

    #[test]
    fn test_parse_midnight() {
        assert_eq!(parse_hhmm("00:00"), Some(0));
    }

    #[test]
    fn test_parse_with_seconds() {
        assert_eq!(parse_hhmm("09:30:00"), Some(570));
    }

    #[test]
    fn test_parse_unpadded_hour() {
        assert_eq!(parse_hhmm("9:30"), Some(570));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_hhmm("garbage"), None);
    }

    #[test]
    fn test_parse_rejects_hour_24() {
        assert_eq!(parse_hhmm("24:00"), None);
    }

    #[test]
    fn test_parse_rejects_minute_60() {
        assert_eq!(parse_hhmm("10:60"), None);
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert_eq!(parse_hhmm("-1:30"), None);
    }

    #[test]
    fn test_parse_rejects_missing_minute() {
        assert_eq!(parse_hhmm("10"), None);
    }

    // ── format_hhmm ──

    #[test]
    fn test_format_zero_pads() {
        assert_eq!(format_hhmm(570), "09:30");
    }

    #[test]
    fn test_format_midnight() {
        assert_eq!(format_hhmm(0), "00:00");
    }

    #[test]
    fn test_format_evening() {
        assert_eq!(format_hhmm(19 * 60 + 5), "19:05");
    }

    // ── overlaps ──

    #[test]
    fn test_overlap_partial() {
        assert!(range("09:00", "10:00").overlaps(&range("09:30", "10:30")));
    }

    #[test]
    fn test_overlap_contained() {
        assert!(range("09:00", "12:00").overlaps(&range("10:00", "10:30")));
    }

    #[test]
    fn test_touching_end_is_not_overlap() {
        assert!(!range("09:00", "10:00").overlaps(&range("10:00", "11:00")));
    }

    #[test]
    fn test_touching_start_is_not_overlap() {
        assert!(!range("10:00", "11:00").overlaps(&range("09:00", "10:00")));
    }

    #[test]
    fn test_disjoint_no_overlap() {
        assert!(!range("09:00", "10:00").overlaps(&range("11:00", "12:00")));
    }

    // ── compute_slots ──

    #[test]
    fn test_no_intervals_no_slots() {
        assert!(compute_slots(&[], &[], 30).is_empty());
    }

    #[test]
    fn test_single_interval_free_day() {
        let slots = compute_slots(&[range("09:00", "11:00")], &[], 30);
        assert_eq!(slots, vec!["09:00", "09:30", "10:00", "10:30"]);
    }

    #[test]
    fn test_slot_must_fit_inside_interval() {
        // 60-minute service in a 09:00-10:30 window: only 09:00 and 09:30 fit.
        let slots = compute_slots(&[range("09:00", "10:30")], &[], 60);
        assert_eq!(slots, vec!["09:00", "09:30"]);
    }

    #[test]
    fn test_grid_step_independent_of_duration() {
        // 90-minute service still walks a 30-minute grid.
        let slots = compute_slots(&[range("08:00", "11:00")], &[], 90);
        assert_eq!(slots, vec!["08:00", "08:30", "09:00", "09:30"]);
    }

    #[test]
    fn test_booking_blocks_overlapping_candidates() {
        // Boundary case: 09:00-10:00 window, 09:00-09:30 taken,
        // 30-minute request → only 09:30 (slot ending exactly at the
        // interval end is allowed).
        let slots = compute_slots(
            &[range("09:00", "10:00")],
            &[booked("09:00", 30)],
            30,
        );
        assert_eq!(slots, vec!["09:30"]);
    }

    #[test]
    fn test_full_monday_scenario() {
        // 08:00-12:00 working, one 30-minute appointment at 08:30.
        let slots = compute_slots(
            &[range("08:00", "12:00")],
            &[booked("08:30", 30)],
            30,
        );
        assert_eq!(
            slots,
            vec!["08:00", "09:00", "09:30", "10:00", "10:30", "11:00", "11:30"]
        );
    }

    #[test]
    fn test_slot_starting_at_booking_end_allowed() {
        let slots = compute_slots(
            &[range("09:00", "11:00")],
            &[booked("09:00", 60)],
            30,
        );
        assert_eq!(slots, vec!["10:00", "10:30"]);
    }

    #[test]
    fn test_long_booking_shadows_grid() {
        // A 90-minute appointment at 09:00 blocks every 60-minute candidate
        // from 08:30 through 10:00; 08:00 ends exactly at 09:00 and stands.
        let slots = compute_slots(
            &[range("08:00", "12:00")],
            &[booked("09:00", 90)],
            60,
        );
        assert_eq!(slots, vec!["08:00", "10:30", "11:00"]);
    }

    #[test]
    fn test_split_day_intervals() {
        // Morning/afternoon split: grids anchor at each interval start.
        let slots = compute_slots(
            &[range("09:00", "11:00"), range("14:00", "15:00")],
            &[],
            60,
        );
        assert_eq!(slots, vec!["09:00", "09:30", "10:00", "14:00"]);
    }

    #[test]
    fn test_unsorted_intervals_are_sorted() {
        let slots = compute_slots(
            &[range("14:00", "15:00"), range("09:00", "10:00")],
            &[],
            30,
        );
        assert_eq!(slots, vec!["09:00", "09:30", "14:00", "14:30"]);
    }

    #[test]
    fn test_duplicate_intervals_both_processed() {
        let slots = compute_slots(
            &[range("09:00", "10:00"), range("09:00", "10:00")],
            &[],
            30,
        );
        assert_eq!(slots, vec!["09:00", "09:30", "09:00", "09:30"]);
    }

    #[test]
    fn test_degenerate_interval_yields_nothing() {
        assert!(compute_slots(&[range("10:00", "10:00")], &[], 30).is_empty());
        assert!(compute_slots(&[range("12:00", "09:00")], &[], 30).is_empty());
    }

    #[test]
    fn test_interval_shorter_than_duration() {
        assert!(compute_slots(&[range("09:00", "09:45")], &[], 60).is_empty());
    }

    #[test]
    fn test_off_grid_booking_still_blocks() {
        // An appointment at 09:15 conflicts with both the 09:00 and 09:30
        // candidates.
        let slots = compute_slots(
            &[range("09:00", "10:30")],
            &[booked("09:15", 30)],
            30,
        );
        assert_eq!(slots, vec!["10:00"]);
    }

    #[test]
    fn test_fully_booked_day() {
        let slots = compute_slots(
            &[range("09:00", "10:00")],
            &[booked("09:00", 60)],
            30,
        );
        assert!(slots.is_empty());
    }

    #[test]
    fn test_idempotent_for_same_inputs() {
        let working = [range("08:00", "12:00")];
        let taken = [booked("08:30", 30)];
        assert_eq!(
            compute_slots(&working, &taken, 30),
            compute_slots(&working, &taken, 30)
        );
    }

    #[test]
    fn test_every_slot_fits_and_is_conflict_free() {
        let working = [range("08:00", "13:00"), range("15:00", "18:30")];
        let taken = [booked("08:30", 45), booked("10:00", 90), booked("16:00", 30)];
        let duration = 45;
        for slot in compute_slots(&working, &taken, duration) {
            let start = parse_hhmm(&slot).unwrap();
            let candidate = TimeRange::from_start_duration(start, duration);
            assert!(
                working
                    .iter()
                    .any(|iv| start >= iv.start_min && candidate.end_min <= iv.end_min),
                "slot {} escapes the working intervals",
                slot
            );
            assert!(!conflicts(candidate, &taken), "slot {} collides", slot);
        }
    }
}
