// silowatch-api: Async Rust client for the silowatch farm backend

pub mod error;
pub mod models;
pub mod transport;

mod alerts;
mod client;
mod registration;

pub use client::BackendClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
