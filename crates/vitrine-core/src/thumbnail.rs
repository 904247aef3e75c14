//! Delayed thumbnail capture for models that still show a placeholder.
//!
//! Selecting a model whose thumbnail is a placeholder schedules a capture
//! [`CAPTURE_DELAY`] later, giving the scene time to load and frame. A
//! newer selection replaces the pending capture.

use std::time::Duration;

/// Wait between selecting a model and capturing its thumbnail.
pub const CAPTURE_DELAY: Duration = Duration::from_millis(1200);

/// Path prefix of generated placeholder thumbnails.
pub const PLACEHOLDER_PATH: &str = "/placeholder.svg";

/// True when a model has no real thumbnail yet.
pub fn is_placeholder(thumbnail_url: Option<&str>) -> bool {
    match thumbnail_url {
        None => true,
        Some(url) => url.trim().is_empty() || url.starts_with(PLACEHOLDER_PATH),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending {
    model_id: String,
    due: Duration,
}

/// Single-slot capture timer. Times are elapsed durations from any fixed epoch.
#[derive(Debug, Clone, Default)]
pub struct CaptureScheduler {
    pending: Option<Pending>,
}

impl CaptureScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a capture of `model_id`, replacing any earlier one.
    pub fn schedule(&mut self, model_id: impl Into<String>, now: Duration) {
        self.pending = Some(Pending {
            model_id: model_id.into(),
            due: now + CAPTURE_DELAY,
        });
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending_model(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.model_id.as_str())
    }

    /// Take the pending capture once its delay has elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<String> {
        if self.pending.as_ref().is_some_and(|p| now >= p.due) {
            self.pending.take().map(|p| p.model_id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder(None));
        assert!(is_placeholder(Some("")));
        assert!(is_placeholder(Some(
            "/placeholder.svg?width=400&height=400&query=chair"
        )));
        assert!(!is_placeholder(Some("https://cdn.example/thumbnails/a.png")));
    }

    #[test]
    fn test_fires_after_delay() {
        let mut s = CaptureScheduler::new();
        s.schedule("m1", MS(100));
        assert_eq!(s.poll(MS(1299)), None);
        assert_eq!(s.poll(MS(1300)).as_deref(), Some("m1"));
        assert_eq!(s.poll(MS(5000)), None, "fires once");
    }

    #[test]
    fn test_reselect_replaces_pending() {
        let mut s = CaptureScheduler::new();
        s.schedule("m1", MS(0));
        s.schedule("m2", MS(1000));
        assert_eq!(s.poll(MS(1200)), None);
        assert_eq!(s.poll(MS(2200)).as_deref(), Some("m2"));
    }

    #[test]
    fn test_cancel() {
        let mut s = CaptureScheduler::new();
        s.schedule("m1", MS(0));
        s.cancel();
        assert_eq!(s.pending_model(), None);
        assert_eq!(s.poll(MS(10_000)), None);
    }
}
