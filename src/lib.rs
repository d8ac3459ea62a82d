//! Thumbalizr - client for the Thumbalizr screenshot API.
//!
//! This crate provides:
//! - A typed request builder for the API's query parameters
//! - A blocking client that interprets the `X-Thumbalizr-*` response headers
//! - Helpers to inspect and save the returned thumbnail
//!
//! Screenshots are rendered asynchronously by the service. A request for a
//! page that is not ready yet returns [`Status::Processing`]; callers poll
//! until the status changes.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::{thread, time::Duration};
//! use thumbalizr::{Client, Status};
//!
//! let client = Client::new("my-api-key").unwrap();
//! let mut shot = client.screenshot("https://www.rust-lang.org/");
//! for _ in 0..20 {
//!     if shot.status() != Status::Processing {
//!         break;
//!     }
//!     thread::sleep(Duration::from_secs(10));
//!     shot = client.screenshot("https://www.rust-lang.org/");
//! }
//!
//! if let Some(path) = shot.save(None).unwrap() {
//!     println!("saved to {}", path.display());
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod save;

// Re-export client types
pub use client::{
    Client, ClientBuilder, Encoding, Mode, Screenshot, ScreenshotOptions, ScreenshotSummary,
    Status, Thumbnail, build_url,
};

// Re-export errors
pub use error::{ThumbalizrError, ThumbalizrResult};

// Re-export save helpers
pub use save::default_filename;
