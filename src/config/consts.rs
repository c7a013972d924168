/// Pause applied to every stage after an unavailable-service event (5 seconds)
pub const DEFAULT_BACKOFF_MS: u64 = 5_000;
/// Buffered unavailable-service events before slow subscribers start lagging
pub const DEFAULT_EVENT_CAPACITY: usize = 64;
/// Field name used when an edge routes the whole message
pub const WHOLE_MESSAGE: &str = "";
