//! The `File` stream object.
//!
//! Wraps one exclusively-owned file descriptor and exposes four
//! capability groups: the open/close lifecycle, positional and
//! element-granular byte I/O, printf/scanf-style formatted I/O, and the
//! typed persistence bridge that hands this stream to a [`Serial`]
//! codec.
//!
//! The descriptor is opened on construction and closed on drop or
//! explicit [`File::close`]; every close path resets the handle before
//! reporting anything, so a failed close can never leave a dangling fd.
//! Operations on a closed `File` return [`IoError::NotOpen`] rather
//! than reaching the OS.
//!
//! The type is single-owner and unsynchronized; callers that share one
//! across threads must serialize access themselves.

use std::path::{Path, PathBuf};

use filum_core::error::IoError;
use filum_core::fmt::{self, Arg};
use filum_core::mode::{OpenFlags, SeekOrigin, open_flags_bits, parse_mode};
use filum_core::scan::{self, ScanSource, ScanValue};
use filum_core::serial::{Serial, SerialSink, SerialSource};
use filum_core::stream::{BufPolicy, DEFAULT_CAPACITY, StreamState};

use crate::sys::{self, RawFd};

/// A stream over one owned file descriptor.
#[derive(Debug)]
pub struct File {
    /// The handle; `None` iff closed.
    fd: Option<RawFd>,
    state: StreamState,
    /// Kept for error context.
    path: Option<PathBuf>,
}

impl File {
    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Open `path` with an fopen-style access mode (`"r"`, `"w+"`,
    /// `"ab"`, ...).
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<File, IoError> {
        let path = path.as_ref();
        let (fd, flags) = open_handle(path, mode)?;
        Ok(File {
            fd: Some(fd),
            state: StreamState::new(flags),
            path: Some(path.to_path_buf()),
        })
    }

    /// Redirect this `File` at a new target, closing the current handle
    /// first if one is open.
    ///
    /// The implicit close's verdict is deliberately discarded so it
    /// cannot mask a failure of the open itself; an explicit
    /// [`File::close`] beforehand surfaces it instead. On open failure
    /// the `File` is left closed.
    pub fn reopen(&mut self, path: impl AsRef<Path>, mode: &str) -> Result<(), IoError> {
        if self.fd.is_some() {
            let _ = self.shutdown();
        }
        let path = path.as_ref();
        let (fd, flags) = open_handle(path, mode)?;
        self.fd = Some(fd);
        self.state = StreamState::new(flags);
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Flush staged writes and close the handle.
    ///
    /// The handle is reset to empty before any verdict is reported;
    /// calling `close` again afterwards returns [`IoError::NotOpen`]
    /// without touching the OS.
    pub fn close(&mut self) -> Result<(), IoError> {
        self.shutdown()
    }

    /// Whether a live handle is held.
    pub fn is_open(&self) -> bool {
        self.fd.is_some()
    }

    /// The path this `File` was last opened at.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The raw descriptor, while open.
    pub fn as_raw_fd(&self) -> Option<i32> {
        self.fd
    }

    /// The open-mode flags of the live handle.
    pub fn flags(&self) -> Option<OpenFlags> {
        self.fd.map(|_| self.state.flags())
    }

    /// Close sequence shared by `close`, `reopen`, and drop: deliver
    /// staged writes, close the fd, reset the handle unconditionally,
    /// report the first failure.
    fn shutdown(&mut self) -> Result<(), IoError> {
        let Some(fd) = self.fd.take() else {
            return Err(IoError::NotOpen);
        };
        let pending = self.state.take_pending();
        self.state = StreamState::new(OpenFlags::default());

        let flushed = if pending.is_empty() {
            Ok(())
        } else {
            sys::write_all_fd(fd, &pending).map_err(|errno| IoError::Flush { errno })
        };
        let closed = sys::close_fd(fd).map_err(|errno| IoError::Close { errno });
        flushed.and(closed)
    }

    fn live_fd(&self) -> Result<RawFd, IoError> {
        self.fd.ok_or(IoError::NotOpen)
    }

    // -----------------------------------------------------------------------
    // Stream operations
    // -----------------------------------------------------------------------

    /// Reposition the cursor relative to `origin`. Staged writes are
    /// delivered and read-ahead is discarded before the move.
    pub fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<(), IoError> {
        let fd = self.live_fd()?;
        let pending = self.state.begin_seek();
        if !pending.is_empty() {
            sys::write_all_fd(fd, &pending).map_err(|errno| {
                self.state.set_error();
                IoError::Flush { errno }
            })?;
        }
        sys::seek_fd(fd, offset, origin.whence())
            .map(|_| ())
            .map_err(|errno| {
                self.state.set_error();
                IoError::Seek { errno }
            })
    }

    /// The logical cursor position: the OS cursor corrected for staged
    /// writes and unconsumed read-ahead.
    pub fn tell(&self) -> Result<i64, IoError> {
        let fd = self.live_fd()?;
        let os_pos = sys::seek_fd(fd, 0, SeekOrigin::Current.whence())
            .map_err(|errno| IoError::Tell { errno })?;
        Ok(os_pos + self.state.cursor_slack())
    }

    /// Deliver staged writes to the descriptor.
    pub fn flush(&mut self) -> Result<(), IoError> {
        let fd = self.live_fd()?;
        let pending = self.state.take_pending();
        if pending.is_empty() {
            return Ok(());
        }
        sys::write_all_fd(fd, &pending).map_err(|errno| {
            self.state.set_error();
            IoError::Flush { errno }
        })
    }

    /// Whether a read has hit end-of-file. Never fails; a closed `File`
    /// reports `false`.
    pub fn is_eof(&self) -> bool {
        self.fd.is_some() && self.state.is_eof()
    }

    /// Whether an operation has tripped the error indicator.
    pub fn is_error(&self) -> bool {
        self.fd.is_some() && self.state.is_error()
    }

    /// Clear the EOF and error indicators.
    pub fn clear_status(&mut self) {
        self.state.clear_status();
    }

    /// Seek to the start and clear the indicators.
    pub fn rewind(&mut self) -> Result<(), IoError> {
        self.seek(0, SeekOrigin::Start)?;
        self.state.clear_status();
        Ok(())
    }

    /// Change the write-staging policy. Refused (returning `false`)
    /// once any I/O has gone through the stream.
    pub fn set_buffering(&mut self, policy: BufPolicy, capacity: usize) -> bool {
        self.state.set_policy(policy, capacity)
    }

    /// Read one element of exactly `buf.len()` bytes.
    ///
    /// Returns the number of whole elements read: 1 when `buf` was
    /// filled, 0 when end-of-file intervened (bytes consumed up to that
    /// point stay consumed) or when `buf` is empty. Only an OS-level
    /// read failure is an error; running out of data is not.
    pub fn read_block(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        self.live_fd()?;
        if buf.is_empty() {
            return Ok(0);
        }
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.state.take_buffered(&mut buf[filled..]);
            if n > 0 {
                filled += n;
                continue;
            }
            if !self.refill()? {
                break;
            }
        }
        Ok(usize::from(filled == buf.len()))
    }

    /// Write one element of exactly `buf.len()` bytes.
    ///
    /// Returns the number of whole elements written: 1 on success, 0
    /// for an empty `buf` (not an error). Anything short of a full
    /// element fails with the short-write error.
    pub fn write_block(&mut self, buf: &[u8]) -> Result<usize, IoError> {
        let fd = self.live_fd()?;
        if buf.is_empty() {
            return Ok(0);
        }
        if let Some(payload) = self.state.stage_write(buf) {
            sys::write_all_fd(fd, &payload).map_err(|_| {
                self.state.set_error();
                IoError::Write {
                    written: 0,
                    expected: 1,
                }
            })?;
        }
        Ok(1)
    }

    /// Fetch more bytes from the descriptor into the read-ahead.
    /// Returns `false` at end-of-file (setting the indicator). Staged
    /// writes are delivered first so reads observe them.
    fn refill(&mut self) -> Result<bool, IoError> {
        let fd = self.live_fd()?;
        if self.state.has_pending() {
            let pending = self.state.take_pending();
            sys::write_all_fd(fd, &pending).map_err(|errno| {
                self.state.set_error();
                IoError::Flush { errno }
            })?;
        }
        let mut chunk = [0u8; DEFAULT_CAPACITY];
        match sys::read_fd(fd, &mut chunk) {
            Ok(0) => {
                self.state.set_eof();
                Ok(false)
            }
            Ok(n) => {
                self.state.stash_readahead(&chunk[..n]);
                Ok(true)
            }
            Err(errno) => {
                self.state.set_error();
                Err(IoError::Read { errno })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Formatted I/O
    // -----------------------------------------------------------------------

    /// Render a printf-style format string against `args` and write the
    /// result to the stream. Returns the byte count written.
    pub fn format_to(&mut self, format: &str, args: &[Arg<'_>]) -> Result<usize, IoError> {
        self.live_fd()?;
        let rendered = fmt::format(format.as_bytes(), args);
        if !rendered.is_empty() {
            self.write_block(&rendered)?;
        }
        Ok(rendered.len())
    }

    /// Parse scanf-style formatted text from the stream. The returned
    /// values are the matched fields, in order; a match failure stops
    /// the scan without error.
    pub fn scan_from(&mut self, format: &str) -> Result<Vec<ScanValue>, IoError> {
        scan::scan(self, format.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Typed persistence bridge
    // -----------------------------------------------------------------------

    /// Decode a value from this stream directly into `target`'s storage.
    /// The codec, not this stream, defines the byte layout.
    pub fn read_into<T: Serial + ?Sized>(&mut self, target: &mut T) -> Result<(), IoError> {
        target.decode(self)
    }

    /// Encode `source` onto this stream; the encoding is driven by
    /// `source`'s own type.
    pub fn write_from<T: Serial + ?Sized>(&mut self, source: &T) -> Result<(), IoError> {
        source.encode(self)
    }

    /// Allocate a fresh `T` and decode into it. Codec failures
    /// propagate unchanged.
    pub fn get<T: Serial + Default>(&mut self) -> Result<T, IoError> {
        let mut value = T::default();
        value.decode(self)?;
        Ok(value)
    }

    /// Encode `value` onto this stream.
    pub fn put<T: Serial + ?Sized>(&mut self, value: &T) -> Result<(), IoError> {
        value.encode(self)
    }
}

fn open_handle(path: &Path, mode: &str) -> Result<(RawFd, OpenFlags), IoError> {
    let flags = parse_mode(mode).ok_or_else(|| IoError::InvalidMode {
        mode: mode.to_string(),
    })?;
    let fd = sys::open_path(path, open_flags_bits(&flags))
        .map_err(|errno| IoError::open(path.display().to_string(), errno))?;
    Ok((fd, flags))
}

impl Drop for File {
    /// Closing on teardown must not panic; the close verdict is
    /// discarded but the handle is still reset and returned to the OS.
    fn drop(&mut self) {
        if self.fd.is_some() {
            let _ = self.shutdown();
        }
    }
}

// ---------------------------------------------------------------------------
// Capability impls
// ---------------------------------------------------------------------------

impl ScanSource for File {
    fn next_byte(&mut self) -> Result<Option<u8>, IoError> {
        let mut byte = [0u8; 1];
        Ok((self.read_block(&mut byte)? == 1).then_some(byte[0]))
    }

    fn unread_byte(&mut self, byte: u8) {
        // The scanner holds at most one byte of lookahead.
        let pushed = self.state.unread(byte);
        debug_assert!(pushed);
    }
}

impl SerialSource for File {
    fn pull(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        self.live_fd()?;
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let n = self.state.take_buffered(buf);
            if n > 0 {
                return Ok(n);
            }
            if !self.refill()? {
                return Ok(0);
            }
        }
    }
}

impl SerialSink for File {
    fn push(&mut self, data: &[u8]) -> Result<(), IoError> {
        if !data.is_empty() {
            self.write_block(data)?;
        }
        Ok(())
    }
}
