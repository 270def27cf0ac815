//! Keep only the latest request in a burst

/// Holds the most recent value until no newer one has arrived for `window`
/// seconds.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: f64,
    pending: Option<(T, f64)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: f64) -> Self {
        Self { window, pending: None }
    }

    /// Replace any pending value; restarts the quiet window
    pub fn request(&mut self, value: T, now: f64) {
        self.pending = Some((value, now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Release the pending value once the window has passed
    pub fn poll(&mut self, now: f64) -> Option<T> {
        match &self.pending {
            Some((_, at)) if now - at >= self.window => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_wins() {
        let mut d = Debouncer::new(0.25);
        d.request(1, 0.0);
        d.request(2, 0.1);
        d.request(3, 0.2);
        assert_eq!(d.poll(0.3), None);
        assert_eq!(d.poll(0.45), Some(3));
        assert!(!d.is_pending());
        assert_eq!(d.poll(1.0), None);
    }

    #[test]
    fn test_single_request() {
        let mut d = Debouncer::new(0.5);
        assert_eq!(d.poll(0.0), None);
        d.request("resize", 1.0);
        assert!(d.is_pending());
        assert_eq!(d.poll(1.5), Some("resize"));
    }
}
