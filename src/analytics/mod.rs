use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DissectionStats {
    pub captures: u64,
    pub frames: u64,
    pub malformed_frames: u64,
    pub commands: u64,
    pub dispatches: u64,
    pub truncated_cdbs: u64,
}

static CAPTURES: AtomicU64 = AtomicU64::new(0);
static FRAMES: AtomicU64 = AtomicU64::new(0);
static MALFORMED_FRAMES: AtomicU64 = AtomicU64::new(0);
static COMMANDS: AtomicU64 = AtomicU64::new(0);
static DISPATCHES: AtomicU64 = AtomicU64::new(0);
static TRUNCATED_CDBS: AtomicU64 = AtomicU64::new(0);

pub fn inc_capture() {
    CAPTURES.fetch_add(1, Ordering::Relaxed);
}

pub fn add_frames(n: u64) {
    FRAMES.fetch_add(n, Ordering::Relaxed);
}

pub fn add_malformed_frames(n: u64) {
    MALFORMED_FRAMES.fetch_add(n, Ordering::Relaxed);
}

pub fn add_commands(n: u64) {
    COMMANDS.fetch_add(n, Ordering::Relaxed);
}

pub fn add_dispatches(n: u64) {
    DISPATCHES.fetch_add(n, Ordering::Relaxed);
}

pub fn add_truncated_cdbs(n: u64) {
    TRUNCATED_CDBS.fetch_add(n, Ordering::Relaxed);
}

pub fn snapshot() -> DissectionStats {
    DissectionStats {
        captures: CAPTURES.load(Ordering::Relaxed),
        frames: FRAMES.load(Ordering::Relaxed),
        malformed_frames: MALFORMED_FRAMES.load(Ordering::Relaxed),
        commands: COMMANDS.load(Ordering::Relaxed),
        dispatches: DISPATCHES.load(Ordering::Relaxed),
        truncated_cdbs: TRUNCATED_CDBS.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
pub(crate) fn reset_dissection_counts() {
    CAPTURES.store(0, Ordering::Relaxed);
    FRAMES.store(0, Ordering::Relaxed);
    MALFORMED_FRAMES.store(0, Ordering::Relaxed);
    COMMANDS.store(0, Ordering::Relaxed);
    DISPATCHES.store(0, Ordering::Relaxed);
    TRUNCATED_CDBS.store(0, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_across_captures() {
        reset_dissection_counts();
        inc_capture();
        add_frames(10);
        add_commands(3);
        add_dispatches(3);
        inc_capture();
        add_frames(5);
        add_malformed_frames(1);
        add_commands(1);
        add_truncated_cdbs(1);
        let stats = snapshot();
        assert_eq!(stats.captures, 2);
        assert_eq!(stats.frames, 15);
        assert_eq!(stats.malformed_frames, 1);
        assert_eq!(stats.commands, 4);
        assert_eq!(stats.dispatches, 3);
        assert_eq!(stats.truncated_cdbs, 1);
    }
}
