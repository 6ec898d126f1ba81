use crate::core::event::{Action, EventRecord, SimulatedFailure};
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

pub const SERVICE_FAILED_MESSAGE: &str = "service failed";
pub const REQUEST_MESSAGE: &str = "request received";

pub fn build_service_failure(timestamp: DateTime<Utc>, service: &str, error: &str) -> EventRecord {
    EventRecord::error(timestamp, SERVICE_FAILED_MESSAGE)
        .with_field("service", service)
        .with_field("err", SimulatedFailure::new(error))
}

/// Values describing one simulated request.
#[derive(Debug, Clone)]
pub struct RequestFields<'a> {
    pub service: &'a str,
    pub status: u16,
    pub duration: Duration,
    pub handler: &'a str,
    pub trace_id: Uuid,
}

pub fn build_request(timestamp: DateTime<Utc>, request: RequestFields<'_>) -> EventRecord {
    EventRecord::info(timestamp, REQUEST_MESSAGE)
        .with_field("service", request.service)
        .with_field("action", Action::Request)
        .with_field("status", i64::from(request.status))
        .with_field("duration", request.duration)
        .with_field("handler", request.handler)
        .with_field("traceID", request.trace_id)
}
