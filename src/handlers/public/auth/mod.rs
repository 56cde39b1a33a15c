// handlers/public/auth/mod.rs - Public authentication handlers
//
// Account creation and token acquisition. Nothing here requires a bearer token.

pub mod login;    // POST /login - password login
pub mod otp;      // POST /send-otp, /validate-otp - phone possession
pub mod password; // POST /forgot-password, /reset-password
pub mod register; // POST /register, /signup - account creation
pub mod sso;      // POST /login-with-sso, /register-with-sso
pub mod utils;

pub use login::login;
pub use otp::{send_otp, validate_otp};
pub use password::{forgot_password, reset_password};
pub use register::{register, signup};
pub use sso::{login_with_sso, register_with_sso};
