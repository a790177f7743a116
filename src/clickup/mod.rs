//! ClickUp task fetching.
//!
//! Resolves a list or folder into task records over the v2 REST API, with a
//! bounded, timeout-escalating retry around every call.

pub mod client;
pub mod retry;
pub mod types;


pub use client::ClickUpClient;
pub use retry::RetryPolicy;
pub use types::*;
