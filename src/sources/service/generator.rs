use super::templates::{build_request, build_service_failure, RequestFields};
use crate::core::event::EventRecord;
use crate::core::pool::{draw_raw_index, CategoryPool};
use crate::core::traits::EventGenerator;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use uuid::{Builder, Uuid};

const FAILURE_DELAY_SECS: (u64, u64) = (1, 10);
const CALL_DELAY_MAX_SECS: f64 = 3.0;

/// Emits a failure for a random service with a random error message.
pub struct ServiceFailureGenerator {
    rng: StdRng,
    pool: Arc<CategoryPool>,
}

impl ServiceFailureGenerator {
    pub const NAME: &'static str = "service_failure";

    pub fn new(pool: Arc<CategoryPool>, rng: StdRng) -> Self {
        Self { rng, pool }
    }
}

impl EventGenerator for ServiceFailureGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn next_record(&mut self, now: DateTime<Utc>) -> Option<EventRecord> {
        let error = self.pool.errors.pick(draw_raw_index(&mut self.rng));
        let service = self.pool.services.pick(draw_raw_index(&mut self.rng));
        Some(build_service_failure(now, service, error))
    }

    fn next_delay(&mut self) -> Duration {
        let (min, max) = FAILURE_DELAY_SECS;
        Duration::from_secs(self.rng.gen_range(min..=max))
    }
}

/// Emits a simulated request with a tiered latency and a trace id.
pub struct ServiceCallGenerator {
    rng: StdRng,
    pool: Arc<CategoryPool>,
}

impl ServiceCallGenerator {
    pub const NAME: &'static str = "service_call";

    pub fn new(pool: Arc<CategoryPool>, rng: StdRng) -> Self {
        Self { rng, pool }
    }

    fn trace_id(&mut self) -> Uuid {
        Builder::from_random_bytes(self.rng.gen()).into_uuid()
    }
}

impl EventGenerator for ServiceCallGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn next_record(&mut self, now: DateTime<Utc>) -> Option<EventRecord> {
        let trace_id = self.trace_id();
        let status = *self.pool.status_codes.pick(draw_raw_index(&mut self.rng));
        let service = self.pool.services.pick(draw_raw_index(&mut self.rng));
        let handler = self.pool.paths.pick(draw_raw_index(&mut self.rng));
        let roll = draw_raw_index(&mut self.rng);
        let duration = sample_duration(roll, &mut self.rng);
        Some(build_request(
            now,
            RequestFields {
                service,
                status,
                duration,
                handler,
                trace_id,
            },
        ))
    }

    fn next_delay(&mut self) -> Duration {
        Duration::from_secs_f64(CALL_DELAY_MAX_SECS * self.rng.gen::<f64>())
    }
}

/// Samples a request latency for the given roll.
///
/// Rolls divisible by 12 land in `[0, 5000ms]`, other rolls divisible by 6 in
/// `[0, 1000ms]`, everything else in `[0.01ms, 500ms]`.
pub fn sample_duration(roll: u64, rng: &mut impl Rng) -> Duration {
    let millis: f64 = if roll % 12 == 0 {
        rng.gen_range(0.0..=5000.0)
    } else if roll % 6 == 0 {
        rng.gen_range(0.0..=1000.0)
    } else {
        rng.gen_range(0.01..=500.0)
    };
    Duration::from_nanos((millis * 1_000_000.0).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::{FieldValue, Level};
    use chrono::TimeZone;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, 12).unwrap()
    }

    #[test]
    fn failure_records_are_error_level() {
        let pool = Arc::new(CategoryPool::default());
        let mut generator = ServiceFailureGenerator::new(pool.clone(), StdRng::seed_from_u64(1));
        for _ in 0..50 {
            let record = generator.next_record(now()).expect("always emits");
            assert_eq!(record.level, Level::Error);
            assert_eq!(record.message, "service failed");
            assert_eq!(record.field_names(), vec!["service", "err"]);
            let service = record.field("service").and_then(FieldValue::as_str).expect("service");
            assert!(pool.services.values().iter().any(|known| known == service));
            match record.field("err") {
                Some(FieldValue::Error(err)) => {
                    assert!(pool.errors.values().contains(&err.to_string()));
                }
                other => panic!("unexpected err field: {other:?}"),
            }
        }
    }

    #[test]
    fn failure_delay_is_between_one_and_ten_seconds() {
        let pool = Arc::new(CategoryPool::default());
        let mut generator = ServiceFailureGenerator::new(pool, StdRng::seed_from_u64(2));
        for _ in 0..500 {
            assert!((1..=10).contains(&generator.next_delay().as_secs()));
        }
    }

    #[test]
    fn request_records_follow_schema() {
        let pool = Arc::new(CategoryPool::default());
        let mut generator = ServiceCallGenerator::new(pool.clone(), StdRng::seed_from_u64(4));
        let mut trace_ids = std::collections::HashSet::new();
        for _ in 0..100 {
            let record = generator.next_record(now()).expect("always emits");
            assert_eq!(record.level, Level::Info);
            assert_eq!(record.message, "request received");
            assert_eq!(
                record.field_names(),
                vec!["service", "action", "status", "duration", "handler", "traceID"]
            );
            assert_eq!(record.field("action").and_then(FieldValue::as_str), Some("REQUEST"));
            let status = record.field("status").and_then(FieldValue::as_int).expect("status");
            assert!(pool.status_codes.values().contains(&(status as u16)));
            let duration = record
                .field("duration")
                .and_then(FieldValue::as_duration)
                .expect("duration");
            assert!(duration <= Duration::from_millis(5000));
            let handler = record.field("handler").and_then(FieldValue::as_str).expect("handler");
            assert!(pool.paths.values().iter().any(|path| path == handler));
            match record.field("traceID") {
                Some(FieldValue::TraceId(id)) => {
                    assert_eq!(id.get_version_num(), 4);
                    trace_ids.insert(*id);
                }
                other => panic!("unexpected traceID field: {other:?}"),
            }
        }
        assert_eq!(trace_ids.len(), 100);
    }

    #[test]
    fn duration_tiers_respect_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        for roll in 1..=500_u64 {
            for _ in 0..20 {
                let duration = sample_duration(roll, &mut rng);
                if roll % 12 == 0 {
                    assert!(duration <= Duration::from_millis(5000));
                } else if roll % 6 == 0 {
                    assert!(duration <= Duration::from_millis(1000));
                } else {
                    assert!(duration >= Duration::from_micros(10));
                    assert!(duration <= Duration::from_millis(500));
                }
            }
        }
    }

    #[test]
    fn long_tail_tier_exceeds_typical_range() {
        let mut rng = StdRng::seed_from_u64(21);
        let slowest = (0..500)
            .map(|_| sample_duration(12, &mut rng))
            .max()
            .expect("samples");
        assert!(slowest > Duration::from_millis(1000));
    }

    #[test]
    fn call_delay_is_fractional_below_three_seconds() {
        let pool = Arc::new(CategoryPool::default());
        let mut generator = ServiceCallGenerator::new(pool, StdRng::seed_from_u64(6));
        let delays: Vec<Duration> = (0..500).map(|_| generator.next_delay()).collect();
        assert!(delays.iter().all(|delay| *delay < Duration::from_secs(3)));
        assert!(delays.iter().any(|delay| delay.subsec_nanos() != 0));
    }
}
