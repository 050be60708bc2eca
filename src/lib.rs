//! Read-only client for the NTNU IME course catalog API.

pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod mapping;
pub mod registry;
pub mod structs;
pub mod wire;

pub use crate::client::Client;
pub use crate::config::Settings;
pub use crate::error::{Error, Result};
pub use crate::fetch::{Endpoint, Fetch, HttpFetcher, Payload};
pub use crate::structs::*;
