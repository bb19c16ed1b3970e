//! Application layer for Babel
//!
//! Generic runtime that serializes user, signaling and media inputs into one
//! dispatch queue for the [`babel_client::CallCoordinator`], and executes its
//! actions through a platform [`Driver`].
//!
//! # Components
//!
//! - [`Driver`]: Trait for platform-specific I/O (signaling, media, UI)
//! - [`Runtime`]: Generic orchestration loop using Driver
//! - [`ClientConfig`]: Account and transport settings

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod driver;
mod input;
mod runtime;

pub use config::{ClientConfig, DEFAULT_PORT, DEFAULT_RTP_PORT};
pub use driver::Driver;
pub use input::Input;
pub use runtime::Runtime;
