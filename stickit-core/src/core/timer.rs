//! Single-slot scheduled tasks driven by an injected clock.
//!
//! The board never sleeps or spawns; delayed work (search debounce, touch
//! long-press, delete fade-out) is a [`Deadline`] polled from the host's
//! `tick(now)`. Scheduling again replaces whatever was pending.

/// Milliseconds on the host's monotonic clock (a DOM event `timeStamp`).
pub type Millis = u64;

/// At most one pending payload, due at a fixed instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Deadline<T> {
    pending: Option<(Millis, T)>,
}

impl<T> Default for Deadline<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> Deadline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `payload` for `now + delay`, dropping any earlier schedule.
    pub fn schedule(&mut self, now: Millis, delay: Millis, payload: T) {
        self.pending = Some((now.saturating_add(delay), payload));
    }

    /// Drops the pending payload, returning it if there was one.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due_at(&self) -> Option<Millis> {
        self.pending.as_ref().map(|(at, _)| *at)
    }

    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref().map(|(_, payload)| payload)
    }

    /// Takes the payload if it is due at or before `now`.
    pub fn fire(&mut self, now: Millis) -> Option<T> {
        match self.pending {
            Some((at, _)) if at <= now => self.cancel(),
            _ => None,
        }
    }
}

/// Several independent deadlines keyed by an id, each with one pending slot.
///
/// Used for per-note fade-outs, where more than one note may be leaving at once.
#[derive(Debug, Clone)]
pub struct DeadlineSet<K> {
    pending: Vec<(Millis, K)>,
}

impl<K> Default for DeadlineSet<K> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<K: PartialEq> DeadlineSet<K> {
    pub fn schedule(&mut self, now: Millis, delay: Millis, key: K) {
        self.pending.retain(|(_, k)| *k != key);
        self.pending.push((now.saturating_add(delay), key));
    }

    pub fn contains(&self, key: &K) -> bool {
        self.pending.iter().any(|(_, k)| k == key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest due time among the pending keys.
    pub fn next_due(&self) -> Option<Millis> {
        self.pending.iter().map(|(at, _)| *at).min()
    }

    /// Removes and returns every key due at or before `now`, earliest first.
    pub fn fire(&mut self, now: Millis) -> Vec<K> {
        self.pending.sort_by_key(|(at, _)| *at);
        let split = self.pending.partition_point(|(at, _)| *at <= now);
        self.pending.drain(..split).map(|(_, k)| k).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_only_when_due() {
        let mut d = Deadline::new();
        d.schedule(1_000, 300, "q");
        assert_eq!(d.fire(1_299), None);
        assert_eq!(d.fire(1_300), Some("q"));
        assert!(!d.is_pending());
    }

    #[test]
    fn test_reschedule_replaces_pending() {
        let mut d = Deadline::new();
        d.schedule(0, 300, "a");
        d.schedule(200, 300, "ab");
        assert_eq!(d.due_at(), Some(500));
        assert_eq!(d.fire(300), None);
        assert_eq!(d.fire(500), Some("ab"));
        assert_eq!(d.fire(10_000), None);
    }

    #[test]
    fn test_cancel() {
        let mut d = Deadline::new();
        d.schedule(0, 10, 7);
        assert_eq!(d.cancel(), Some(7));
        assert_eq!(d.fire(100), None);
    }

    #[test]
    fn test_deadline_set_fires_in_order() {
        let mut set = DeadlineSet::default();
        set.schedule(0, 300, "a");
        set.schedule(100, 300, "b");
        set.schedule(50, 1_000, "c");

        assert_eq!(set.fire(350), vec!["a"]);
        assert_eq!(set.fire(400), vec!["b"]);
        assert!(set.contains(&"c"));
        assert_eq!(set.len(), 1);
    }
}
