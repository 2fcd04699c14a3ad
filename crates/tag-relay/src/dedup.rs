//! Time-window duplicate suppression.

use crate::decoder::TagId;
use std::collections::HashMap;
use tracing::debug;

/// Default minimum spacing, in seconds, between two forwarded reads of a tag.
pub const DEFAULT_DEDUP_THRESHOLD_SECS: f64 = 5.0;

/// Remembers when each tag was last forwarded.
///
/// Entries are never evicted. The tag population is the physical inventory
/// on the course, so the map stays small for the life of the process.
#[derive(Debug, Clone)]
pub struct DuplicateFilter {
    threshold_secs: f64,
    last_seen: HashMap<TagId, f64>,
}

impl DuplicateFilter {
    pub fn new(threshold_secs: f64) -> Self {
        Self {
            threshold_secs,
            last_seen: HashMap::new(),
        }
    }

    pub fn threshold_secs(&self) -> f64 {
        self.threshold_secs
    }

    /// Decide whether a read of `id` at `now` (seconds) should go out.
    ///
    /// The first read of a tag always goes out. Only accepted reads move the
    /// window: a burst of duplicates is measured from the last forwarded
    /// read, not from the latest rejected one.
    pub fn should_forward(&mut self, id: &TagId, now: f64) -> bool {
        match self.last_seen(id) {
            Some(last) if now - last <= self.threshold_secs => {
                debug!(tag = %id, since_last = now - last, "duplicate read");
                false
            }
            _ => {
                self.last_seen.insert(id.clone(), now);
                true
            }
        }
    }

    /// Timestamp of the last forwarded read of `id`.
    pub fn last_seen(&self, id: &TagId) -> Option<f64> {
        self.last_seen.get(id).copied()
    }

    /// Number of distinct tags forwarded so far.
    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }
}

impl Default for DuplicateFilter {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_THRESHOLD_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(label: &str) -> TagId {
        TagId::from_bytes(label.as_bytes())
    }

    #[test]
    fn test_default_threshold() {
        let filter = DuplicateFilter::default();
        assert_eq!(filter.threshold_secs(), 5.0);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_window_measured_from_accepted_reads() {
        let mut filter = DuplicateFilter::new(5.0);
        let id = tag("0001");

        assert!(filter.should_forward(&id, 0.0));
        assert!(!filter.should_forward(&id, 3.0));
        assert!(filter.should_forward(&id, 6.0));
        assert!(!filter.should_forward(&id, 6.1));
        assert!(!filter.should_forward(&id, 10.9));
        assert!(filter.should_forward(&id, 11.1));
        assert_eq!(filter.last_seen(&id), Some(11.1));
    }

    #[test]
    fn test_first_read_always_forwards() {
        let mut filter = DuplicateFilter::new(5.0);
        assert!(filter.should_forward(&tag("0001"), 0.0));
        assert!(filter.should_forward(&tag("0002"), 1.0));
        assert!(filter.should_forward(&tag("0003"), 1_700_000_000.0));
        assert_eq!(filter.last_seen(&tag("0004")), None);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut filter = DuplicateFilter::new(5.0);
        let id = tag("0002");
        assert!(filter.should_forward(&id, 100.0));
        assert!(!filter.should_forward(&id, 105.0));
        assert!(filter.should_forward(&id, 105.001));
    }

    #[test]
    fn test_rejected_reads_do_not_move_window() {
        let mut filter = DuplicateFilter::new(5.0);
        let id = tag("0003");
        assert!(filter.should_forward(&id, 100.0));
        for i in 1..50 {
            assert!(!filter.should_forward(&id, 100.0 + i as f64 * 0.1));
        }
        assert_eq!(filter.last_seen(&id), Some(100.0));
        assert!(filter.should_forward(&id, 105.5));
    }

    #[test]
    fn test_tags_are_independent() {
        let mut filter = DuplicateFilter::new(5.0);
        assert!(filter.should_forward(&tag("0001"), 100.0));
        assert!(filter.should_forward(&tag("0002"), 100.5));
        assert!(!filter.should_forward(&tag("0001"), 101.0));
        assert!(!filter.should_forward(&tag("0002"), 101.0));
        assert_eq!(filter.len(), 2);
    }
}
