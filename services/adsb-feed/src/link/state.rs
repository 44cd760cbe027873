//! Per-link lifecycle state and counters

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifecycle of a feed link
///
/// `Established` → `Streaming` → `Closing` → `Closed` on teardown, or
/// → `Failed` when the feed stream errors or ends on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Established,
    Streaming,
    Closing,
    Closed,
    Failed,
}

impl LinkState {
    /// Loop has exited and the connection is released
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Established => "established",
            Self::Streaming => "streaming",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Counters for a single link, shared between the read loop and its handle
#[derive(Debug, Default)]
pub struct LinkStats {
    lines_read: AtomicU64,
    framing_errors: AtomicU64,
    decode_errors: AtomicU64,
    forwarded: AtomicU64,
    forward_errors: AtomicU64,
}

impl LinkStats {
    pub fn record_line(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_framing_error(&self) {
        self.framing_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_forward_error(&self) {
        self.forward_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn lines_read(&self) -> u64 {
        self.lines_read.load(Ordering::Relaxed)
    }

    pub fn framing_errors(&self) -> u64 {
        self.framing_errors.load(Ordering::Relaxed)
    }

    pub fn decode_errors(&self) -> u64 {
        self.decode_errors.load(Ordering::Relaxed)
    }

    pub fn forwarded(&self) -> u64 {
        self.forwarded.load(Ordering::Relaxed)
    }

    pub fn forward_errors(&self) -> u64 {
        self.forward_errors.load(Ordering::Relaxed)
    }
}

impl fmt::Display for LinkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lines: {} | Framing errors: {} | Decode errors: {} | Forwarded: {} | Forward errors: {}",
            self.lines_read(),
            self.framing_errors(),
            self.decode_errors(),
            self.forwarded(),
            self.forward_errors()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(LinkState::Closed.is_terminal());
        assert!(LinkState::Failed.is_terminal());
        assert!(!LinkState::Streaming.is_terminal());
        assert!(!LinkState::Closing.is_terminal());
    }

    #[test]
    fn test_stats_summary() {
        let stats = LinkStats::default();
        stats.record_line();
        stats.record_line();
        stats.record_decode_error();
        stats.record_forwarded();
        assert_eq!(
            stats.to_string(),
            "Lines: 2 | Framing errors: 0 | Decode errors: 1 | Forwarded: 1 | Forward errors: 0"
        );
    }
}
