//! # filum-core
//!
//! Safe model layer for the filum stream library. Everything that does not
//! require touching a file descriptor lives here: access-mode parsing, the
//! stream-state machine (buffering, EOF/error indicators, pushback), the
//! printf/scanf format engines, the error type, and the serialization
//! capability the typed persistence bridge is built on.
//!
//! The fd boundary (`filum-fd`) composes these pieces around a real OS
//! handle. No `unsafe` code is permitted in this crate.

#![deny(unsafe_code)]

pub mod error;
pub mod fmt;
pub mod mode;
pub mod scan;
pub mod serial;
pub mod stream;

pub use error::IoError;
pub use mode::{OpenFlags, SeekOrigin, open_flags_bits, parse_mode};
pub use stream::{BufPolicy, StreamState};
