//! # filum-fd
//!
//! The fd boundary of the filum stream library: a thin syscall veneer
//! and the [`File`] object that ties the safe stream model from
//! `filum-core` to a real file descriptor.
//!
//! All `unsafe` code in the workspace lives in this crate's `sys`
//! module; everything above it works with safe wrappers.

pub mod file;
mod sys;

pub use file::File;
pub use filum_core::error::IoError;
pub use filum_core::fmt::Arg;
pub use filum_core::mode::SeekOrigin;
pub use filum_core::scan::ScanValue;
pub use filum_core::serial::{Serial, SerialSink, SerialSource};
pub use filum_core::stream::BufPolicy;
