//! API Module
//!
//! HTTP handlers and routing for the cache admin REST API. The engine itself
//! is usable without it; this surface lets an operator inspect and tune a
//! running cache.
//!
//! # Endpoints
//! - `PUT /set`, `GET /get/:key`, `GET /has/:key`, `DELETE /del/:key`
//! - `GET /entry/:key`, `GET /keys`
//! - `POST /clear`, `POST /cleanup`
//! - `GET /stats`, `POST /stats/reset`
//! - `GET /config`, `PATCH /config`
//! - `GET /health`

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
