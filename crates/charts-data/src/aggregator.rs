//! Grouped counting and averaging over filtered session rows.
//!
//! Two primitives, composed for every grouping dimension (tutor, subject,
//! time slot): count-by-key and average-by-key. Both are pure functions of
//! the row subset the record filter already produced.

use std::collections::HashMap;

// ── AggregateBucket ───────────────────────────────────────────────────────────

/// Per-key accumulator: an occurrence count plus a `(sum, n)` pair for
/// averaging. The average is derived on read and undefined while `n` is 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateBucket {
    pub count: u64,
    pub sum: f64,
    pub n: u64,
}

impl AggregateBucket {
    /// `sum / n`, or `None` when no value ever contributed.
    pub fn average(&self) -> Option<f64> {
        if self.n > 0 {
            Some(self.sum / self.n as f64)
        } else {
            None
        }
    }
}

// ── KeyedAggregates ───────────────────────────────────────────────────────────

/// Key → bucket mapping that remembers first-seen key order.
///
/// Iteration order is insertion order, which is what gives the chart
/// builder its stable tie-break: equal values keep the order in which their
/// keys first occurred in the data.
#[derive(Debug, Clone, Default)]
pub struct KeyedAggregates {
    order: Vec<String>,
    buckets: HashMap<String, AggregateBucket>,
}

impl KeyedAggregates {
    fn bucket_mut(&mut self, key: &str) -> &mut AggregateBucket {
        if !self.buckets.contains_key(key) {
            self.order.push(key.to_string());
        }
        self.buckets.entry(key.to_string()).or_default()
    }

    pub fn get(&self, key: &str) -> Option<&AggregateBucket> {
        self.buckets.get(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate `(key, bucket)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregateBucket)> {
        self.order
            .iter()
            .filter_map(|k| self.buckets.get(k).map(|b| (k.as_str(), b)))
    }

    /// `(key, count)` pairs in insertion order.
    pub fn counts(&self) -> Vec<(String, u64)> {
        self.iter().map(|(k, b)| (k.to_string(), b.count)).collect()
    }

    /// `(key, average)` pairs in insertion order. Keys with zero
    /// contributing values never appear.
    pub fn averages(&self) -> Vec<(String, f64)> {
        self.iter()
            .filter_map(|(k, b)| b.average().map(|avg| (k.to_string(), avg)))
            .collect()
    }
}

// ── Primitives ────────────────────────────────────────────────────────────────

/// A group key, already trimmed; blank keys exclude the row entirely.
fn clean_key(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}

/// Group rows by `key_fn` and count occurrences per key.
///
/// Rows whose key is blank or absent are excluded — they are never counted
/// under an empty-string key.
pub fn count_by_key<R>(rows: &[R], key_fn: impl Fn(&R) -> Option<String>) -> KeyedAggregates {
    let mut agg = KeyedAggregates::default();
    for row in rows {
        let Some(key) = clean_key(key_fn(row)) else {
            continue;
        };
        agg.bucket_mut(&key).count += 1;
    }
    agg
}

/// Group rows by `key_fn` and accumulate `(sum, n)` from `value_fn`.
///
/// A row contributes only when both its key and its extracted value are
/// present and the value is not NaN.
pub fn average_by_key<R>(
    rows: &[R],
    key_fn: impl Fn(&R) -> Option<String>,
    value_fn: impl Fn(&R) -> Option<f64>,
) -> KeyedAggregates {
    let mut agg = KeyedAggregates::default();
    for row in rows {
        let Some(key) = clean_key(key_fn(row)) else {
            continue;
        };
        let Some(value) = value_fn(row).filter(|v| !v.is_nan()) else {
            continue;
        };
        let bucket = agg.bucket_mut(&key);
        bucket.sum += value;
        bucket.n += 1;
    }
    agg
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        tutor: &'static str,
        hours: Option<f64>,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { tutor: "Alice", hours: Some(1.5) },
            Row { tutor: "Bob", hours: Some(2.0) },
            Row { tutor: "Alice", hours: Some(0.75) },
            Row { tutor: "", hours: Some(4.0) },
            Row { tutor: "Bob", hours: None },
        ]
    }

    // ── count_by_key ─────────────────────────────────────────────────────────

    #[test]
    fn test_count_groups_and_excludes_blank_keys() {
        let agg = count_by_key(&rows(), |r| Some(r.tutor.to_string()));
        assert_eq!(agg.len(), 2);
        assert_eq!(agg.get("Alice").unwrap().count, 2);
        assert_eq!(agg.get("Bob").unwrap().count, 2);
        assert!(agg.get("").is_none());
    }

    #[test]
    fn test_count_insertion_order() {
        let agg = count_by_key(&rows(), |r| Some(r.tutor.to_string()));
        let keys: Vec<&str> = agg.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_count_whitespace_key_excluded() {
        let data = vec![Row { tutor: "  ", hours: None }];
        let agg = count_by_key(&data, |r| Some(r.tutor.to_string()));
        assert!(agg.is_empty());
    }

    #[test]
    fn test_count_key_trimmed() {
        let agg = count_by_key(&[()], |_| Some("  Alice ".to_string()));
        assert_eq!(agg.get("Alice").unwrap().count, 1);
    }

    #[test]
    fn test_count_empty_rows() {
        let agg = count_by_key(&Vec::<Row>::new(), |r| Some(r.tutor.to_string()));
        assert!(agg.is_empty());
    }

    // ── average_by_key ───────────────────────────────────────────────────────

    #[test]
    fn test_average_sum_over_n() {
        let agg = average_by_key(&rows(), |r| Some(r.tutor.to_string()), |r| r.hours);
        // Alice: (1.5 + 0.75) / 2 = 1.125
        let alice = agg.get("Alice").unwrap();
        assert_eq!(alice.n, 2);
        assert!((alice.average().unwrap() - 1.125).abs() < 1e-12);
    }

    #[test]
    fn test_average_skips_missing_values() {
        let agg = average_by_key(&rows(), |r| Some(r.tutor.to_string()), |r| r.hours);
        // Bob has one None value; only the 2.0 contributes.
        let bob = agg.get("Bob").unwrap();
        assert_eq!(bob.n, 1);
        assert_eq!(bob.average(), Some(2.0));
    }

    #[test]
    fn test_average_skips_nan_values() {
        let data = vec![
            Row { tutor: "Cara", hours: Some(f64::NAN) },
            Row { tutor: "Cara", hours: Some(3.0) },
        ];
        let agg = average_by_key(&data, |r| Some(r.tutor.to_string()), |r| r.hours);
        assert_eq!(agg.get("Cara").unwrap().average(), Some(3.0));
    }

    #[test]
    fn test_average_key_with_no_values_absent_from_averages() {
        let data = vec![Row { tutor: "Dan", hours: None }];
        let agg = average_by_key(&data, |r| Some(r.tutor.to_string()), |r| r.hours);
        // The key never accumulated a value, so it is not in the averages.
        assert!(agg.averages().is_empty());
    }

    #[test]
    fn test_averages_preserve_insertion_order() {
        let agg = average_by_key(&rows(), |r| Some(r.tutor.to_string()), |r| r.hours);
        let keys: Vec<String> = agg.averages().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Alice", "Bob"]);
    }

    // ── AggregateBucket ──────────────────────────────────────────────────────

    #[test]
    fn test_bucket_average_undefined_at_zero_n() {
        assert_eq!(AggregateBucket::default().average(), None);
    }
}
