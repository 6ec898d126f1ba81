use crate::core::event::EventRecord;
use std::time::Duration;
use chrono::{DateTime, Utc};

/// Produces one kind of simulated event, one iteration at a time.
pub trait EventGenerator: Send {
    /// Short name used in diagnostics and run summaries.
    fn name(&self) -> &'static str;
    /// Runs one iteration at `now`; `None` means the iteration emits nothing.
    fn next_record(&mut self, now: DateTime<Utc>) -> Option<EventRecord>;
    /// Sleep before the next iteration.
    fn next_delay(&mut self) -> Duration;
}

/// Accepts records from any number of generator tasks.
pub trait RecordSink: Send + Sync {
    /// Writes a single record.
    fn emit(&self, record: &EventRecord) -> std::io::Result<()>;
    /// Flushes buffered data.
    fn flush(&self) -> std::io::Result<()>;
}
