/// Typewriter effect for the card message
///
/// Characters appear one per interval from the moment typing starts. Typing
/// starts once per card; showing or hiding the message afterwards neither
/// restarts nor clears it.

use std::time::{Duration, Instant};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(40);

/// Number of characters typed after `elapsed`, capped at `len`
pub fn chars_after(elapsed: Duration, interval: Duration, len: usize) -> usize {
    if interval.is_zero() {
        return len;
    }
    let typed = elapsed.as_nanos() / interval.as_nanos();
    typed.min(len as u128) as usize
}

#[derive(Debug, Clone)]
pub struct Typewriter {
    message: String,
    len: usize,
    interval: Duration,
    started_at: Option<Instant>,
    shown: usize,
}

impl Typewriter {
    pub fn new(message: impl Into<String>, interval: Duration) -> Self {
        let message = message.into();
        Typewriter {
            len: message.chars().count(),
            message,
            interval,
            started_at: None,
            shown: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Begin typing from an empty line. Later calls are ignored.
    pub fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
            self.shown = 0;
        }
    }

    /// Advance to `now`; returns whether more text became visible
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(started_at) = self.started_at else {
            return false;
        };
        let shown = chars_after(now.saturating_duration_since(started_at), self.interval, self.len);
        let advanced = shown > self.shown;
        self.shown = self.shown.max(shown);
        advanced
    }

    /// Typing has begun and the message isn't complete yet
    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && !self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.shown >= self.len
    }

    /// The text typed so far
    pub fn text(&self) -> &str {
        match self.message.char_indices().nth(self.shown) {
            Some((end, _)) => &self.message[..end],
            None => &self.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Duration = Duration::from_millis(40);

    #[test]
    fn test_chars_after() {
        assert_eq!(chars_after(Duration::from_millis(120), T, 10), 3);
        assert_eq!(chars_after(Duration::from_millis(119), T, 10), 2);
        assert_eq!(chars_after(Duration::from_millis(400), T, 10), 10);
        assert_eq!(chars_after(Duration::from_secs(60), T, 10), 10);
        assert_eq!(chars_after(Duration::ZERO, T, 10), 0);
    }

    #[test]
    fn test_types_one_char_per_interval() {
        let t0 = Instant::now();
        let mut typewriter = Typewriter::new("0123456789", T);
        typewriter.start(t0);
        assert_eq!(typewriter.text(), "");

        assert!(typewriter.tick(t0 + Duration::from_millis(120)));
        assert_eq!(typewriter.text(), "012");
        assert!(typewriter.is_running());

        typewriter.tick(t0 + Duration::from_millis(400));
        assert_eq!(typewriter.text(), "0123456789");
        assert!(typewriter.is_complete());
        assert!(!typewriter.is_running());
    }

    #[test]
    fn test_nothing_typed_before_start() {
        let mut typewriter = Typewriter::new("hello", T);
        assert!(!typewriter.tick(Instant::now() + Duration::from_secs(1)));
        assert_eq!(typewriter.text(), "");
        assert!(!typewriter.is_running());
    }

    #[test]
    fn test_start_is_reveal_once() {
        let t0 = Instant::now();
        let mut typewriter = Typewriter::new("hello", T);
        typewriter.start(t0);
        typewriter.tick(t0 + Duration::from_millis(80));
        assert_eq!(typewriter.text(), "he");

        typewriter.start(t0 + Duration::from_millis(100));
        typewriter.tick(t0 + Duration::from_millis(120));
        assert_eq!(typewriter.text(), "hel");
    }

    #[test]
    fn test_multibyte_characters() {
        let t0 = Instant::now();
        let mut typewriter = Typewriter::new("❄️🎄ab", T);
        typewriter.start(t0);
        typewriter.tick(t0 + Duration::from_millis(120));
        assert_eq!(typewriter.text(), "❄️🎄");
    }
}
