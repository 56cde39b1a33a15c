// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) -> Protected (bearer JWT). Routes are assembled in `app.rs`.

pub mod protected;
pub mod public;
pub mod types;
