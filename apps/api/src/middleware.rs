//! # ミドルウェア

pub mod auth;

pub use auth::{AuthPayload, AuthState, require_auth};
