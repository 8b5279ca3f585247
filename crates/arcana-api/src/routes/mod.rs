//! HTTP routers, one per context.

pub mod health;
pub mod layouts;
pub mod readings;
pub mod sessions;
