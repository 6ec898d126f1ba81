pub mod clock;
pub mod config;
pub mod event;
pub mod pool;
pub mod traits;
