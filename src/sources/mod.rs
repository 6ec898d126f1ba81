pub mod login;
pub mod service;
