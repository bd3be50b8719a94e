use std::time::Duration;
use tokio::time::Instant;

/// Trailing-edge debounce: only the last value scheduled within the quiet
/// window is released, once the window has elapsed without a newer one.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self { window, pending: None }
    }

    /// Replace any pending value and restart the window at `now`.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    /// Drop the pending value without releasing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Release the pending value if its window has elapsed by `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((_, deadline)) if deadline <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(500);

    #[test]
    fn test_releases_after_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.schedule("coco", start);

        assert_eq!(debouncer.take_due(start + Duration::from_millis(499)), None);
        assert_eq!(debouncer.take_due(start + WINDOW), Some("coco"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_rapid_schedules_release_only_the_last() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);

        let typed = ["i", "in", "inc", "ince", "inception"];
        let mut released = Vec::new();
        for (i, text) in typed.iter().enumerate() {
            let now = start + Duration::from_millis(100 * i as u64);
            released.extend(debouncer.take_due(now));
            debouncer.schedule(*text, now);
        }
        let last_keystroke = start + Duration::from_millis(400);
        assert_eq!(debouncer.deadline(), Some(last_keystroke + WINDOW));
        released.extend(debouncer.take_due(last_keystroke + WINDOW));

        assert_eq!(released, vec!["inception"]);
    }

    #[test]
    fn test_cancel_discards_pending() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.schedule(1, start);
        assert_eq!(debouncer.cancel(), Some(1));
        assert_eq!(debouncer.take_due(start + WINDOW * 2), None);
        assert_eq!(debouncer.deadline(), None);
    }
}
