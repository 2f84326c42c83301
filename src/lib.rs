#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
//! This project's goal is to fetch a page that needs a session cookie, taking the session
//! from the nearest `.env` file, with as little ceremony as possible.
//!
//! # Quick start
//! ```no_run
//! // .env, somewhere below or above the current directory:
//! //   SC=53616c7465645f5f...
//! let body = envfetch::fetch("https://adventofcode.com/2020/day/1/input")?;
//! # Ok::<(), envfetch::Error>(())
//! ```
//!
//! The environment file is searched first in the current directory and its
//! subdirectories, then in its ancestors. The value of `SC` is sent as
//! `Cookie: session=<SC>`. A missing value is sent empty; use
//! [`Fetcher::require_session`] to make it an error instead.
//!
//! The process environment is only read, never modified. Variables already set in the
//! process take precedence over the file unless [`Fetcher::override_process_env`] is set.
//!
//! Requests go through [`attohttpc`]. Redirections are followed by the [`Fetcher`] itself,
//! which sends the session cookie again only while the redirections stay on the same origin.
//!
//! # Features
//! * `charsets`: decode bodies in the charset announced by the server (default)
//! * `compress`: accept gzip and deflate bodies (default)
//! * `tls-native`: support https through the system TLS library (default)
//! * `tls-native-vendored`: build the TLS library from source

#[macro_use]
extern crate log;

pub mod env;
mod error;
mod fetch;
pub mod locate;

pub use crate::env::{Environment, Precedence};
pub use crate::error::{Error, ErrorKind, InvalidResponseKind, Result};
pub use crate::fetch::{fetch, Fetcher, DEFAULT_COOKIE_NAME, DEFAULT_SESSION_KEY};
pub use crate::locate::{find_env_file, Locator};

#[cfg(feature = "charsets")]
pub use attohttpc::charsets;
pub use attohttpc::{header, RequestBuilder, Response, StatusCode};
