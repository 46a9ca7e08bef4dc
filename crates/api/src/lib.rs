//! HTTP API: configuration, routing, authentication and request/response
//! mapping for the product catalog service.

pub mod app;
pub mod authz;
pub mod config;
pub mod middleware;
