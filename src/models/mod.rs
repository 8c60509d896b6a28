//! Request and Response models for the user API
//!
//! This module defines the user record and the DTOs (Data Transfer Objects)
//! used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;
pub mod user;

// Re-export commonly used types
pub use requests::CreateUserRequest;
pub use responses::{HealthResponse, StatsResponse};
pub use user::User;
