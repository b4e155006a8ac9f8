pub mod chat;
pub mod client;
pub mod config;
pub mod directive;
pub mod emotion;
pub mod error;
pub mod server;
pub mod services;
pub mod session;
pub mod telemetry;

// Re-export specific items for convenient access
pub use client::ClientId;
pub use session::dispatcher::SessionDispatcher;
