use super::templates::{build_login_failure, build_login_success};
use crate::core::event::EventRecord;
use crate::core::pool::{draw_raw_index, CategoryPool};
use crate::core::traits::EventGenerator;
use chrono::{DateTime, Timelike, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

const FAILURE_DELAY_SECS: (u64, u64) = (1, 6);
const SUCCESS_DELAY_SECS: (u64, u64) = (1, 3);

/// Seconds of every minute during which successful logins are emitted.
const LOGIN_WINDOW_START: u32 = 40;
const LOGIN_WINDOW_END: u32 = 59;

/// Returns whether successful logins are emitted at `now`.
///
/// Active for seconds 40..=59 of every minute.
pub fn within_login_window(now: DateTime<Utc>) -> bool {
    (LOGIN_WINDOW_START..=LOGIN_WINDOW_END).contains(&now.second())
}

/// Emits a failed login for a random user, counting attempts per user.
pub struct LoginFailureGenerator {
    rng: StdRng,
    pool: Arc<CategoryPool>,
    attempts: Vec<u64>,
}

impl LoginFailureGenerator {
    pub const NAME: &'static str = "login_failure";

    pub fn new(pool: Arc<CategoryPool>, rng: StdRng) -> Self {
        let attempts = vec![0; pool.users.len()];
        Self { rng, pool, attempts }
    }

    /// Attempt counters indexed by user position.
    pub fn attempts(&self) -> &[u64] {
        &self.attempts
    }
}

impl EventGenerator for LoginFailureGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn next_record(&mut self, now: DateTime<Utc>) -> Option<EventRecord> {
        let position = self.pool.users.position(draw_raw_index(&mut self.rng));
        self.attempts[position] += 1;
        let user = &self.pool.users.values()[position];
        Some(build_login_failure(now, user, self.attempts[position]))
    }

    fn next_delay(&mut self) -> Duration {
        let (min, max) = FAILURE_DELAY_SECS;
        Duration::from_secs(self.rng.gen_range(min..=max))
    }
}

/// Emits successful logins, but only inside the activity window.
pub struct LoginSuccessGenerator {
    rng: StdRng,
    pool: Arc<CategoryPool>,
    logins: Vec<u64>,
}

impl LoginSuccessGenerator {
    pub const NAME: &'static str = "login_success";

    pub fn new(pool: Arc<CategoryPool>, rng: StdRng) -> Self {
        let logins = vec![0; pool.users.len()];
        Self { rng, pool, logins }
    }

    /// Login counters indexed by user position.
    pub fn logins(&self) -> &[u64] {
        &self.logins
    }
}

impl EventGenerator for LoginSuccessGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn next_record(&mut self, now: DateTime<Utc>) -> Option<EventRecord> {
        if !within_login_window(now) {
            return None;
        }
        let position = self.pool.users.position(draw_raw_index(&mut self.rng));
        self.logins[position] += 1;
        let user = &self.pool.users.values()[position];
        Some(build_login_success(now, user, self.logins[position]))
    }

    fn next_delay(&mut self) -> Duration {
        let (min, max) = SUCCESS_DELAY_SECS;
        Duration::from_secs(self.rng.gen_range(min..=max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::FieldValue;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn at_second(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, second).unwrap()
    }

    fn user_and_counter(record: &EventRecord, counter: &str) -> (String, i64) {
        let user = record
            .field("user")
            .and_then(FieldValue::as_str)
            .expect("user")
            .to_string();
        let value = record.field(counter).and_then(FieldValue::as_int).expect("counter");
        (user, value)
    }

    #[test]
    fn failed_attempts_count_up_per_user() {
        let pool = Arc::new(CategoryPool::default());
        let mut generator = LoginFailureGenerator::new(pool, StdRng::seed_from_u64(11));
        let mut seen: HashMap<String, Vec<i64>> = HashMap::new();

        for _ in 0..250 {
            let record = generator.next_record(at_second(5)).expect("always emits");
            assert_eq!(record.message, "user failed to log in");
            assert_eq!(record.field("action").and_then(FieldValue::as_str), Some("LOGIN"));
            assert_eq!(record.field("result").and_then(FieldValue::as_str), Some("FAILED"));
            let (user, attempt) = user_and_counter(&record, "attempt");
            seen.entry(user).or_default().push(attempt);
        }

        assert!(seen.len() > 1);
        for attempts in seen.values() {
            let expected: Vec<i64> = (1..=attempts.len() as i64).collect();
            assert_eq!(attempts, &expected);
        }
        assert_eq!(generator.attempts().iter().sum::<u64>(), 250);
    }

    #[test]
    fn failure_delay_is_whole_seconds_between_one_and_six() {
        let pool = Arc::new(CategoryPool::default());
        let mut generator = LoginFailureGenerator::new(pool, StdRng::seed_from_u64(3));
        for _ in 0..500 {
            let delay = generator.next_delay();
            assert_eq!(delay.subsec_nanos(), 0);
            assert!((1..=6).contains(&delay.as_secs()));
        }
    }

    #[test]
    fn login_window_covers_seconds_forty_to_fifty_nine() {
        for second in 0..60 {
            assert_eq!(within_login_window(at_second(second)), second >= 40);
        }
    }

    #[test]
    fn successes_only_inside_window() {
        let pool = Arc::new(CategoryPool::default());
        let mut generator = LoginSuccessGenerator::new(pool, StdRng::seed_from_u64(5));

        for second in 0..40 {
            assert!(generator.next_record(at_second(second)).is_none());
        }
        assert!(generator.logins().iter().all(|count| *count == 0));

        for second in 40..60 {
            let record = generator.next_record(at_second(second)).expect("in window");
            assert_eq!(record.message, "user successfully logged in");
            assert_eq!(record.field("result").and_then(FieldValue::as_str), Some("SUCCESS"));
        }
        assert_eq!(generator.logins().iter().sum::<u64>(), 20);
    }

    #[test]
    fn skipped_iterations_do_not_advance_login_counter() {
        let pool = Arc::new(CategoryPool::default());
        let mut generator = LoginSuccessGenerator::new(pool, StdRng::seed_from_u64(17));
        let mut seen: HashMap<String, Vec<i64>> = HashMap::new();

        for round in 0..120 {
            let second = if round % 3 == 0 { 45 } else { 10 };
            if let Some(record) = generator.next_record(at_second(second)) {
                let (user, login) = user_and_counter(&record, "login");
                seen.entry(user).or_default().push(login);
            }
        }

        assert_eq!(seen.values().map(Vec::len).sum::<usize>(), 40);
        for logins in seen.values() {
            let expected: Vec<i64> = (1..=logins.len() as i64).collect();
            assert_eq!(logins, &expected);
        }
    }

    #[test]
    fn success_delay_is_between_one_and_three_seconds() {
        let pool = Arc::new(CategoryPool::default());
        let mut generator = LoginSuccessGenerator::new(pool, StdRng::seed_from_u64(8));
        for _ in 0..300 {
            let secs = generator.next_delay().as_secs();
            assert!((1..=3).contains(&secs));
        }
    }
}
