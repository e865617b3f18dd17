//! Chart data building.
//!
//! Turns aggregate mappings into deterministically ordered, chart-ready
//! descriptor sequences. Tutor/subject dimensions are sorted descending by
//! value with stable ties; the fixed time-slot dimension keeps configured
//! slot order and is zero-filled.

use charts_core::models::{ChartDatum, ChartDescriptor, ColorMode, SessionRow};
use charts_core::normalize::{duration_to_hours, time_to_minutes};
use charts_core::timeslot::{slot_index_for_minutes, TimeSlot};

use crate::aggregator::{average_by_key, count_by_key};

// ── Ordering ──────────────────────────────────────────────────────────────────

/// Convert `(name, value)` pairs into chart data sorted descending by value.
///
/// The sort is stable: equal values preserve the pairs' original order.
pub fn chart_data(pairs: Vec<(String, f64)>) -> Vec<ChartDatum> {
    let mut data: Vec<ChartDatum> = pairs
        .into_iter()
        .map(|(name, value)| ChartDatum { name, value })
        .collect();
    data.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    data
}

/// Sign-in counts per time slot, in configured slot order, zero-filled.
///
/// Unslotted rows (sign-in unparsable or outside every slot) are excluded
/// from this chart only.
pub fn slot_chart_data(rows: &[SessionRow], slots: &[TimeSlot]) -> Vec<ChartDatum> {
    let mut counts = vec![0u64; slots.len()];
    for row in rows {
        let Some(minutes) = time_to_minutes(&row.sign_in) else {
            continue;
        };
        if let Some(idx) = slot_index_for_minutes(slots, minutes) {
            counts[idx] += 1;
        }
    }
    slots
        .iter()
        .zip(counts)
        .map(|(slot, count)| ChartDatum {
            name: slot.label.clone(),
            value: count as f64,
        })
        .collect()
}

// ── Descriptor assembly ───────────────────────────────────────────────────────

fn counts_as_pairs(pairs: Vec<(String, u64)>) -> Vec<(String, f64)> {
    pairs.into_iter().map(|(k, v)| (k, v as f64)).collect()
}

/// Build the full descriptor set for one row scope.
///
/// Always emits the slot, tutor-count and subject-count charts; the two
/// average-hours charts are present only when the sheet resolved a duration
/// column. Ids are unique within the pass and stable across re-generation
/// with identical inputs.
pub fn build_session_charts(
    rows: &[SessionRow],
    label: &str,
    slots: &[TimeSlot],
    id_prefix: &str,
    has_duration: bool,
) -> Vec<ChartDescriptor> {
    let mut charts = Vec::with_capacity(5);

    charts.push(ChartDescriptor {
        id: format!("{}-timeslot", id_prefix),
        title: format!("Hourly Number of Students in {}", label),
        data: slot_chart_data(rows, slots),
        value_field: "students".to_string(),
        name_field: "timeSlot".to_string(),
        color_mode: ColorMode::TimeSlot,
    });

    let tutor_counts = count_by_key(rows, |r: &SessionRow| Some(r.tutor.clone()));
    charts.push(ChartDescriptor {
        id: format!("{}-tutor-count", id_prefix),
        title: format!("Tutor vs Number of Students in {}", label),
        data: chart_data(counts_as_pairs(tutor_counts.counts())),
        value_field: "students".to_string(),
        name_field: "tutor".to_string(),
        color_mode: ColorMode::Default,
    });

    let subject_counts = count_by_key(rows, |r: &SessionRow| Some(r.subject.clone()));
    charts.push(ChartDescriptor {
        id: format!("{}-subject-count", id_prefix),
        title: format!("Subject vs Number of Students in {}", label),
        data: chart_data(counts_as_pairs(subject_counts.counts())),
        value_field: "students".to_string(),
        name_field: "subject".to_string(),
        color_mode: ColorMode::Default,
    });

    if has_duration {
        let tutor_hours = average_by_key(
            rows,
            |r: &SessionRow| Some(r.tutor.clone()),
            |r| duration_to_hours(&r.duration),
        );
        charts.push(ChartDescriptor {
            id: format!("{}-tutor-avg-hours", id_prefix),
            title: format!("Average Tutoring Hours per Session by Tutor in {}", label),
            data: chart_data(tutor_hours.averages()),
            value_field: "avgHours".to_string(),
            name_field: "tutor".to_string(),
            color_mode: ColorMode::Default,
        });

        let subject_hours = average_by_key(
            rows,
            |r: &SessionRow| Some(r.subject.clone()),
            |r| duration_to_hours(&r.duration),
        );
        charts.push(ChartDescriptor {
            id: format!("{}-subject-avg-hours", id_prefix),
            title: format!("Average Tutoring Hours per Session by Subject in {}", label),
            data: chart_data(subject_hours.averages()),
            value_field: "avgHours".to_string(),
            name_field: "subject".to_string(),
            color_mode: ColorMode::Default,
        });
    }

    charts
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use charts_core::models::CellValue;
    use charts_core::timeslot::default_time_slots;

    fn row(sign_in: &str, tutor: &str, subject: &str, duration: Option<&str>) -> SessionRow {
        SessionRow {
            date: CellValue::Missing,
            sign_in: CellValue::Text(sign_in.to_string()),
            duration: duration
                .map(|d| CellValue::Text(d.to_string()))
                .unwrap_or_default(),
            tutor: tutor.to_string(),
            subject: subject.to_string(),
        }
    }

    // ── chart_data ordering ──────────────────────────────────────────────────

    #[test]
    fn test_chart_data_sorted_descending() {
        let data = chart_data(vec![
            ("Math".to_string(), 1.0),
            ("Physics".to_string(), 3.0),
            ("Chemistry".to_string(), 2.0),
        ]);
        let names: Vec<&str> = data.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Physics", "Chemistry", "Math"]);
    }

    #[test]
    fn test_chart_data_ties_keep_insertion_order() {
        let data = chart_data(vec![
            ("Math".to_string(), 2.0),
            ("Physics".to_string(), 2.0),
            ("Biology".to_string(), 5.0),
            ("Chemistry".to_string(), 2.0),
        ]);
        let names: Vec<&str> = data.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Biology", "Math", "Physics", "Chemistry"]);
    }

    #[test]
    fn test_chart_data_empty() {
        assert!(chart_data(vec![]).is_empty());
    }

    // ── slot_chart_data ──────────────────────────────────────────────────────

    #[test]
    fn test_slot_chart_fixed_order_zero_filled() {
        let slots = default_time_slots();
        let rows = vec![
            row("18:30", "Alice", "Math", None),
            row("10:45 AM", "Bob", "Physics", None),
            row("10:15", "Cara", "Math", None),
        ];
        let data = slot_chart_data(&rows, &slots);
        assert_eq!(data.len(), slots.len());
        // Order follows the slot table, not the counts.
        assert_eq!(data[0].name, "10:00-11:00");
        assert_eq!(data[0].value, 2.0);
        assert_eq!(data[8].name, "18:00-19:00");
        assert_eq!(data[8].value, 1.0);
        // Slots with no sign-ins stay present at zero.
        assert_eq!(data[3].value, 0.0);
    }

    #[test]
    fn test_slot_chart_excludes_unslotted_rows() {
        let slots = default_time_slots();
        let rows = vec![
            row("8:00", "Alice", "Math", None),
            row("not a time", "Bob", "Physics", None),
        ];
        let data = slot_chart_data(&rows, &slots);
        assert!(data.iter().all(|d| d.value == 0.0));
    }

    // ── build_session_charts ─────────────────────────────────────────────────

    #[test]
    fn test_build_charts_ids_and_titles() {
        let slots = default_time_slots();
        let rows = vec![row("10:45 AM", "Alice", "Math", Some("1:30"))];
        let charts = build_session_charts(&rows, "September 2024", &slots, "month", true);

        assert_eq!(charts.len(), 5);
        let ids: Vec<&str> = charts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "month-timeslot",
                "month-tutor-count",
                "month-subject-count",
                "month-tutor-avg-hours",
                "month-subject-avg-hours",
            ]
        );
        assert_eq!(
            charts[0].title,
            "Hourly Number of Students in September 2024"
        );
        assert_eq!(charts[0].color_mode, ColorMode::TimeSlot);
        assert_eq!(charts[1].color_mode, ColorMode::Default);
    }

    #[test]
    fn test_build_charts_without_duration_column() {
        let slots = default_time_slots();
        let rows = vec![row("10:45 AM", "Alice", "Math", None)];
        let charts = build_session_charts(&rows, "September 2024", &slots, "month", false);
        assert_eq!(charts.len(), 3);
        assert!(charts.iter().all(|c| !c.id.contains("avg-hours")));
    }

    #[test]
    fn test_build_charts_average_hours_values() {
        let slots = default_time_slots();
        let rows = vec![
            row("10:45 AM", "Alice", "Math", Some("1:30")),
            row("11:15", "Alice", "Physics", Some("0:45")),
            row("14:00", "Bob", "Math", None),
        ];
        let charts = build_session_charts(&rows, "Fall Semester 2024", &slots, "semester", true);

        let tutor_avg = &charts[3];
        assert_eq!(tutor_avg.data.len(), 1, "Bob has no duration values");
        assert_eq!(tutor_avg.data[0].name, "Alice");
        assert!((tutor_avg.data[0].value - 1.125).abs() < 1e-12);
    }

    #[test]
    fn test_build_charts_blank_groups_excluded() {
        let slots = default_time_slots();
        let rows = vec![
            row("10:45 AM", "", "Math", None),
            row("11:15", "Alice", "", None),
        ];
        let charts = build_session_charts(&rows, "September 2024", &slots, "month", false);
        assert_eq!(charts[1].data.len(), 1); // tutors: just Alice
        assert_eq!(charts[2].data.len(), 1); // subjects: just Math
    }

    #[test]
    fn test_build_charts_empty_rows_is_empty_result_not_error() {
        let slots = default_time_slots();
        let charts = build_session_charts(&[], "October 2024", &slots, "month", true);
        assert_eq!(charts.len(), 5);
        assert!(charts[0].data.iter().all(|d| d.value == 0.0));
        assert!(charts[1].data.is_empty());
        assert!(charts[3].data.is_empty());
    }
}
