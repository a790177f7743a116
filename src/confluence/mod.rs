//! Confluence publishing.
//!
//! Uploads the rendered chart as a page attachment, replacing a same-named
//! one, and rewrites the page body to display it.

pub mod client;
pub mod content;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::ConfluenceClient;
pub use types::*;
