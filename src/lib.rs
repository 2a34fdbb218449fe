pub mod api;
pub mod bridge;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod morse;
pub mod relay;
pub mod scheduler;
pub mod shutdown;
