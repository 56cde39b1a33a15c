use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` whose rejections render as our 400 `Invalid request format`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
