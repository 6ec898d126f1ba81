use crate::core::event::{Action, EventRecord, LoginResult};
use chrono::{DateTime, Utc};

pub const LOGIN_FAILED_MESSAGE: &str = "user failed to log in";
pub const LOGIN_SUCCESS_MESSAGE: &str = "user successfully logged in";

pub fn build_login_failure(timestamp: DateTime<Utc>, user: &str, attempt: u64) -> EventRecord {
    EventRecord::info(timestamp, LOGIN_FAILED_MESSAGE)
        .with_field("user", user)
        .with_field("action", Action::Login)
        .with_field("result", LoginResult::Failed)
        .with_field("attempt", attempt)
}

pub fn build_login_success(timestamp: DateTime<Utc>, user: &str, login: u64) -> EventRecord {
    EventRecord::info(timestamp, LOGIN_SUCCESS_MESSAGE)
        .with_field("user", user)
        .with_field("action", Action::Login)
        .with_field("result", LoginResult::Success)
        .with_field("login", login)
}
