//! Host-driven frame clock.
//!
//! The crate never owns a timer. The host passes its frame timestamp (in
//! milliseconds, e.g. from `requestAnimationFrame` or an `Instant` it keeps)
//! to `tick`, and the clock derives everything else from that.
//!
//! # Example
//!
//! ```ignore
//! use pixelflock::time::FrameClock;
//!
//! let mut clock = FrameClock::new();
//!
//! // In your frame callback:
//! clock.update(timestamp_ms);
//!
//! println!("Elapsed: {:.0}ms", clock.elapsed());
//! println!("Delta: {:.2}ms", clock.delta());
//! println!("FPS: {:.1}", clock.fps());
//! ```

/// Default interval between FPS estimates, in milliseconds.
const FPS_UPDATE_INTERVAL: f64 = 500.0;

/// Frame timing derived from host timestamps.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Timestamp of the first update.
    start: Option<f64>,
    /// Timestamp of the latest update.
    last: f64,
    /// Milliseconds since the previous update.
    delta: f64,
    /// Total updates.
    frame_count: u64,
    /// Last FPS estimate.
    fps: f32,
    /// Frame count at the last FPS estimate.
    fps_frame_count: u64,
    /// Timestamp of the last FPS estimate.
    fps_update_time: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: None,
            last: 0.0,
            delta: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: 0.0,
        }
    }

    /// Record a frame at `now`. Call once per frame.
    ///
    /// Timestamps that go backwards are treated as zero-length frames.
    pub fn update(&mut self, now: f64) {
        let first = self.start.is_none();
        if first {
            self.start = Some(now);
            self.last = now;
            self.fps_update_time = now;
        }
        let now = now.max(self.last);

        self.delta = now - self.last;
        self.last = now;
        self.frame_count += 1;
        if first {
            // The FPS window opens at the first frame, so it is not counted.
            self.fps_frame_count = self.frame_count;
        }

        let since = now - self.fps_update_time;
        if since >= FPS_UPDATE_INTERVAL {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = (frames as f64 * 1000.0 / since) as f32;
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }
    }

    /// Timestamp of the latest frame, or `None` before the first one.
    #[inline]
    pub fn now(&self) -> Option<f64> {
        self.start.map(|_| self.last)
    }

    /// Milliseconds since the first frame.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.start.map_or(0.0, |start| self.last - start)
    }

    /// Milliseconds since the previous frame.
    #[inline]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second, refreshed every half second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.now(), None);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_clock_update() {
        let mut clock = FrameClock::new();
        clock.update(1000.0);
        assert_eq!(clock.delta(), 0.0);
        assert_eq!(clock.now(), Some(1000.0));

        clock.update(1016.0);
        assert_eq!(clock.delta(), 16.0);
        assert_eq!(clock.elapsed(), 16.0);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn test_clock_backwards_timestamp() {
        let mut clock = FrameClock::new();
        clock.update(500.0);
        clock.update(400.0);
        assert_eq!(clock.delta(), 0.0);
        assert_eq!(clock.now(), Some(500.0));
    }

    #[test]
    fn test_clock_fps() {
        let mut clock = FrameClock::new();
        // 61 frames at 10ms spacing: 60 intervals over 600ms
        for i in 0..=60 {
            clock.update(i as f64 * 10.0);
        }
        assert!((clock.fps() - 100.0).abs() < 1.0, "fps = {}", clock.fps());
    }
}
