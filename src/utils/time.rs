use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// return second
pub(crate) fn get_now_as_u64() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Rounds `secs` down to the start of its minute
pub(crate) fn truncate_to_minute(secs: u64) -> u64 {
    secs - secs % 60
}
