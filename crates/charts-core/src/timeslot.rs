//! Time-slot classification.
//!
//! The service day is covered by a fixed, ordered set of half-open minute
//! intervals. The table is configuration, not derived from data — schedules
//! with different slot widths inject their own table.

use serde::{Deserialize, Serialize};

// ── TimeSlot ──────────────────────────────────────────────────────────────────

/// One half-open interval `[start_min, end_min)` of the service day, with a
/// stable label and display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub label: String,
    pub start_min: u32,
    pub end_min: u32,
    pub color: String,
}

impl TimeSlot {
    /// Whether `minutes` falls inside this slot (inclusive start,
    /// exclusive end).
    pub fn contains(&self, minutes: u32) -> bool {
        minutes >= self.start_min && minutes < self.end_min
    }
}

/// The default service-day table: hourly slots from 10:00 to 19:00.
pub fn default_time_slots() -> Vec<TimeSlot> {
    const HOURS: &[(u32, &str)] = &[
        (10, "#4A90E2"),
        (11, "#50C878"),
        (12, "#F5A623"),
        (13, "#E94B3C"),
        (14, "#9B59B6"),
        (15, "#1ABC9C"),
        (16, "#E67E22"),
        (17, "#34495E"),
        (18, "#7F8C8D"),
    ];
    HOURS
        .iter()
        .map(|&(hour, color)| TimeSlot {
            label: format!("{}:00-{}:00", hour, hour + 1),
            start_min: hour * 60,
            end_min: (hour + 1) * 60,
            color: color.to_string(),
        })
        .collect()
}

// ── Classification ────────────────────────────────────────────────────────────

/// Index of the first slot containing `minutes`, or `None` when the time
/// falls outside every slot ("unslotted").
pub fn slot_index_for_minutes(slots: &[TimeSlot], minutes: u32) -> Option<usize> {
    slots.iter().position(|s| s.contains(minutes))
}

/// The first slot containing `minutes`.
pub fn slot_for_minutes(slots: &[TimeSlot], minutes: u32) -> Option<&TimeSlot> {
    slot_index_for_minutes(slots, minutes).map(|i| &slots[i])
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_slots_cover_service_day_in_order() {
        let slots = default_time_slots();
        assert_eq!(slots.len(), 9);
        assert_eq!(slots[0].label, "10:00-11:00");
        assert_eq!(slots[8].label, "18:00-19:00");
        // Contiguous, ordered, non-overlapping.
        for pair in slots.windows(2) {
            assert_eq!(pair[0].end_min, pair[1].start_min);
        }
    }

    #[test]
    fn test_slot_boundaries_half_open() {
        let slots = default_time_slots();
        // 11:00 exactly belongs to the 11:00-12:00 slot, not 10:00-11:00.
        assert_eq!(slot_for_minutes(&slots, 11 * 60).unwrap().label, "11:00-12:00");
        assert_eq!(slot_for_minutes(&slots, 11 * 60 - 1).unwrap().label, "10:00-11:00");
    }

    #[test]
    fn test_unslotted_times() {
        let slots = default_time_slots();
        assert!(slot_for_minutes(&slots, 9 * 60 + 59).is_none());
        assert!(slot_for_minutes(&slots, 19 * 60).is_none());
        assert!(slot_for_minutes(&slots, 0).is_none());
    }

    #[test]
    fn test_every_minute_matches_at_most_one_slot() {
        let slots = default_time_slots();
        for minute in 0..1440u32 {
            let matching = slots.iter().filter(|s| s.contains(minute)).count();
            assert!(matching <= 1, "minute {} matched {} slots", minute, matching);
        }
    }

    #[test]
    fn test_custom_slot_table() {
        let slots = vec![TimeSlot {
            label: "all day".to_string(),
            start_min: 0,
            end_min: 1440,
            color: "#000000".to_string(),
        }];
        assert_eq!(slot_index_for_minutes(&slots, 0), Some(0));
        assert_eq!(slot_index_for_minutes(&slots, 1439), Some(0));
    }
}
