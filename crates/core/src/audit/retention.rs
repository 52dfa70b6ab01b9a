//! Bounded retention for audit entries.
//!
//! Audit logs grow without bound on frequently edited subjects; the cleanup
//! job keeps only the newest N entries per subject.

/// Default number of audit entries to keep per subject.
pub const DEFAULT_KEEP_COUNT: usize = 10;

/// Splits a subject's audit entries into (kept, expired).
///
/// `entries_newest_first` must be ordered newest first; the first
/// `keep_count` entries survive, the remainder are due for deletion.
pub fn split_retained<T>(entries_newest_first: Vec<T>, keep_count: usize) -> (Vec<T>, Vec<T>) {
    let mut kept = entries_newest_first;
    if kept.len() <= keep_count {
        return (kept, Vec::new());
    }
    let expired = kept.split_off(keep_count);
    (kept, expired)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_limit_keeps_everything() {
        let (kept, expired) = split_retained(vec![1, 2, 3], 10);
        assert_eq!(kept, vec![1, 2, 3]);
        assert!(expired.is_empty());
    }

    #[test]
    fn test_exactly_at_limit_keeps_everything() {
        let (kept, expired) = split_retained(vec![1, 2, 3], 3);
        assert_eq!(kept, vec![1, 2, 3]);
        assert!(expired.is_empty());
    }

    #[test]
    fn test_over_limit_expires_oldest() {
        let entries: Vec<i32> = (1..=15).collect();
        let (kept, expired) = split_retained(entries, DEFAULT_KEEP_COUNT);
        assert_eq!(kept, (1..=10).collect::<Vec<_>>());
        assert_eq!(expired, (11..=15).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_keep_count_expires_everything() {
        let (kept, expired) = split_retained(vec![1, 2], 0);
        assert!(kept.is_empty());
        assert_eq!(expired, vec![1, 2]);
    }
}
