//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - JWT token generation and validation
//! - The per-request authentication gate
//! - Social (OAuth2 authorization-code) login flows
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod login;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod session;
pub mod token;


pub use middleware::authentication_gate;
pub use routes::auth_routes;
