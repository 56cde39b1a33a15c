pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notify;
pub mod otp;
pub mod state;

pub use app::app;
pub use config::AppConfig;
pub use state::AppState;

#[cfg(test)]
pub mod testing;
