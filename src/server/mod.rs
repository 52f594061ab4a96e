//! HTTP server exposing the statistics API.
//!
//! - [`api`]: request/response types and route handlers

pub mod api;
