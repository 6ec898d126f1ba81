//! Login activity: failed attempts around the clock, successful logins inside
//! a recurring activity window.

mod generator;
mod templates;

pub use generator::{within_login_window, LoginFailureGenerator, LoginSuccessGenerator};
pub use templates::{build_login_failure, build_login_success};
