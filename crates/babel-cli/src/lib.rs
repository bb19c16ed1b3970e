//! Console frontend for Babel
//!
//! A thin shell over [`babel_app::Driver`]: line commands on stdin become
//! user intents (or, prefixed with `!`, signaling events), notifications are
//! printed to stdout, and media streams are UDP sockets. All orchestration
//! lives in the generic [`babel_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod command;
pub mod console;
pub mod media;

pub use babel_app::{ClientConfig, Driver, Input, Runtime};
pub use command::{CommandError, parse_line};
pub use console::{ConsoleDriver, ConsoleError};
pub use media::UdpMedia;
