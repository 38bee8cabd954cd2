use chrono::{DateTime, Duration, Utc};

use crate::models::Appointment;

/// Half-open interval overlap: appointments touching end-to-start do not
/// collide.
pub fn overlaps(
    start_a: DateTime<Utc>,
    minutes_a: i32,
    start_b: DateTime<Utc>,
    minutes_b: i32,
) -> bool {
    let end_a = start_a + Duration::minutes(minutes_a as i64);
    let end_b = start_b + Duration::minutes(minutes_b as i64);

    start_a < end_b && start_b < end_a
}

/// True if the requested slot collides with any live appointment in the list.
pub fn has_conflict(
    existing: &[Appointment],
    requested_start: DateTime<Utc>,
    requested_minutes: i32,
) -> bool {
    existing.iter().any(|appt| {
        overlaps(
            appt.scheduled_time,
            appt.duration_minutes,
            requested_start,
            requested_minutes,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, hour, minute, 0).unwrap()
    }

    #[test]
    fn overlapping_slots_collide() {
        assert!(overlaps(at(10, 0), 30, at(10, 15), 30));
        assert!(overlaps(at(10, 15), 30, at(10, 0), 30));
        assert!(overlaps(at(10, 0), 60, at(10, 15), 15));
    }

    #[test]
    fn adjacent_slots_do_not_collide() {
        assert!(!overlaps(at(10, 0), 30, at(10, 30), 30));
        assert!(!overlaps(at(10, 30), 30, at(10, 0), 30));
    }

    #[test]
    fn disjoint_slots_do_not_collide() {
        assert!(!overlaps(at(9, 0), 30, at(14, 0), 30));
    }
}
