// handlers/protected/auth/mod.rs - Account endpoints for a bearer-authenticated caller

pub mod update;
pub mod user_details;

pub use update::{update_email, update_phone, update_username};
pub use user_details::user_details;
