//! HTTP API: routing, bearer authentication, route guards and error mapping.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
