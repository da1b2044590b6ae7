// Boot log: fixed ring of progress lines recorded during bring-up.

use spin::Mutex;

const MAX_LOG_ENTRIES: usize = 64;

struct LogBuffer {
    entries: [Option<&'static str>; MAX_LOG_ENTRIES],
    count: usize,
}

static LOG: Mutex<LogBuffer> = Mutex::new(LogBuffer {
    entries: [None; MAX_LOG_ENTRIES],
    count: 0,
});

/// Record one boot-progress line. Entries past the ring capacity are
/// dropped, not wrapped.
pub fn log(message: &'static str) {
    let mut log = LOG.lock();
    if log.count < MAX_LOG_ENTRIES {
        let index = log.count;
        log.entries[index] = Some(message);
        log.count += 1;
    }
}

/// Number of recorded entries.
pub fn log_count() -> usize {
    LOG.lock().count
}

/// Entry at `index`, oldest first.
pub fn nth(index: usize) -> Option<&'static str> {
    LOG.lock().entries.get(index).copied().flatten()
}

/// Forget everything. Used when re-entering bring-up (tests).
pub fn clear() {
    let mut log = LOG.lock();
    log.entries = [None; MAX_LOG_ENTRIES];
    log.count = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test keeps the shared ring deterministic; nothing else in this
    // crate's unit suite touches it.
    #[test]
    fn test_log_records_in_order_and_clears() {
        clear();
        assert_eq!(log_count(), 0);
        log("terminal up");
        log("storage card initialized");
        assert_eq!(log_count(), 2);
        assert_eq!(nth(0), Some("terminal up"));
        assert_eq!(nth(1), Some("storage card initialized"));
        assert_eq!(nth(2), None);
        clear();
        assert_eq!(log_count(), 0);
        assert_eq!(nth(0), None);
    }
}
