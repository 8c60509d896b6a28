//! API Module
//!
//! HTTP handlers and routing for the user service.
//!
//! # Endpoints
//! - `GET /users` - List all users
//! - `POST /users` - Create a user
//! - `GET /users/:id` - Look up one user through the cache
//! - `GET /stats` - Get lookup and cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
