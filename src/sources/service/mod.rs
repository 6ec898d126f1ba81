//! Service activity: simulated failures and request latencies.

mod generator;
mod templates;

pub use generator::{sample_duration, ServiceCallGenerator, ServiceFailureGenerator};
pub use templates::{build_request, build_service_failure, RequestFields};
