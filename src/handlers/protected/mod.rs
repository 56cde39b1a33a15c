// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Security Level: JWT Authentication Required
// Middleware: `jwt_auth_middleware` verifies the token and injects `AuthUser`

pub mod auth;
