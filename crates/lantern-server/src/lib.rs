pub mod batch;
pub mod bundle;
pub mod config;
pub mod context;
pub mod controller;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod registry;
pub mod routes;
pub mod search;
pub mod server;

pub use config::AppConfig;
pub use server::{LanternServer, ServerBuilder, build_app, build_app_with};
