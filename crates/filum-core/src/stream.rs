//! Stream-state model.
//!
//! Tracks everything about an open stream that is not the descriptor
//! itself: the open-mode flags, the EOF and error indicators, staged
//! writes awaiting delivery, read-ahead bytes awaiting consumption, and
//! the scanner's one-byte pushback slot.
//!
//! The fd boundary owns the descriptor and drives this state: staging
//! methods hand back the byte payloads that must reach the OS, and the
//! refill method accepts bytes fetched from it. Keeping the model free of
//! OS calls keeps it testable without a filesystem.

use crate::mode::OpenFlags;

/// Default staging capacity, matching stdio's BUFSIZ.
pub const DEFAULT_CAPACITY: usize = 8192;

/// Write-staging policy, mirroring stdio's three buffering modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufPolicy {
    /// Deliver staged bytes when the capacity fills.
    Full,
    /// Deliver through the last newline, stage the remainder.
    Line,
    /// Deliver every write immediately.
    None,
}

/// State of one open stream.
///
/// Invariants:
/// - `rpos <= readahead.len()`
/// - `staged.len() <= capacity` between calls (Full policy)
/// - `pushback` holds at most one byte and only while reading
#[derive(Debug)]
pub struct StreamState {
    flags: OpenFlags,
    policy: BufPolicy,
    capacity: usize,
    eof: bool,
    error: bool,
    io_started: bool,
    /// Bytes accepted by writes but not yet delivered to the fd.
    staged: Vec<u8>,
    /// Bytes fetched from the fd but not yet consumed by reads.
    readahead: Vec<u8>,
    rpos: usize,
    /// Byte un-read by scan lookahead; consumed before the read-ahead.
    pushback: Option<u8>,
}

impl StreamState {
    /// Fresh state for a newly opened stream, fully buffered.
    pub fn new(flags: OpenFlags) -> Self {
        Self::with_policy(flags, BufPolicy::Full, DEFAULT_CAPACITY)
    }

    /// Fresh state with an explicit staging policy.
    pub fn with_policy(flags: OpenFlags, policy: BufPolicy, capacity: usize) -> Self {
        let capacity = match policy {
            BufPolicy::None => 0,
            _ => capacity.max(1),
        };
        Self {
            flags,
            policy,
            capacity,
            eof: false,
            error: false,
            io_started: false,
            staged: Vec::new(),
            readahead: Vec::new(),
            rpos: 0,
            pushback: None,
        }
    }

    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    pub fn is_readable(&self) -> bool {
        self.flags.readable
    }

    pub fn is_writable(&self) -> bool {
        self.flags.writable
    }

    pub fn policy(&self) -> BufPolicy {
        self.policy
    }

    // -----------------------------------------------------------------------
    // Indicators
    // -----------------------------------------------------------------------

    pub fn is_eof(&self) -> bool {
        self.eof
    }

    pub fn set_eof(&mut self) {
        self.eof = true;
    }

    pub fn is_error(&self) -> bool {
        self.error
    }

    pub fn set_error(&mut self) {
        self.error = true;
    }

    /// Clear both indicators (clearerr semantics).
    pub fn clear_status(&mut self) {
        self.eof = false;
        self.error = false;
    }

    // -----------------------------------------------------------------------
    // Staging policy
    // -----------------------------------------------------------------------

    /// Change the staging policy. Refused once any I/O has gone through
    /// this state (setvbuf semantics).
    pub fn set_policy(&mut self, policy: BufPolicy, capacity: usize) -> bool {
        if self.io_started {
            return false;
        }
        self.policy = policy;
        self.capacity = match policy {
            BufPolicy::None => 0,
            _ => capacity.max(1),
        };
        true
    }

    // -----------------------------------------------------------------------
    // Write side
    // -----------------------------------------------------------------------

    /// Accept bytes from a write and return the payload, if any, that the
    /// caller must deliver to the fd now.
    pub fn stage_write(&mut self, data: &[u8]) -> Option<Vec<u8>> {
        self.io_started = true;
        match self.policy {
            BufPolicy::None => {
                let mut out = core::mem::take(&mut self.staged);
                out.extend_from_slice(data);
                Some(out)
            }
            BufPolicy::Full => self.stage_full(data),
            BufPolicy::Line => {
                match data.iter().rposition(|&b| b == b'\n') {
                    Some(nl) => {
                        // Through the newline goes out; the tail is staged.
                        let mut out = core::mem::take(&mut self.staged);
                        out.extend_from_slice(&data[..=nl]);
                        let tail = &data[nl + 1..];
                        if let Some(mut overflow) = self.stage_full(tail) {
                            out.append(&mut overflow);
                        }
                        Some(out)
                    }
                    None => self.stage_full(data),
                }
            }
        }
    }

    fn stage_full(&mut self, data: &[u8]) -> Option<Vec<u8>> {
        if self.staged.len() + data.len() <= self.capacity {
            self.staged.extend_from_slice(data);
            None
        } else {
            let mut out = core::mem::take(&mut self.staged);
            out.extend_from_slice(data);
            Some(out)
        }
    }

    /// Drain the staged bytes for an explicit flush.
    pub fn take_pending(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.staged)
    }

    pub fn has_pending(&self) -> bool {
        !self.staged.is_empty()
    }

    // -----------------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------------

    /// Copy already-fetched bytes into `dst`, pushback first. Returns the
    /// count copied; zero means the caller must refill from the fd.
    pub fn take_buffered(&mut self, dst: &mut [u8]) -> usize {
        self.io_started = true;
        if dst.is_empty() {
            return 0;
        }
        let mut copied = 0;
        if let Some(b) = self.pushback.take() {
            dst[0] = b;
            copied = 1;
        }
        let avail = self.readahead.len() - self.rpos;
        let take = avail.min(dst.len() - copied);
        dst[copied..copied + take].copy_from_slice(&self.readahead[self.rpos..self.rpos + take]);
        self.rpos += take;
        copied + take
    }

    /// Bytes available without touching the fd (pushback included).
    pub fn readahead_len(&self) -> usize {
        usize::from(self.pushback.is_some()) + (self.readahead.len() - self.rpos)
    }

    /// Accept bytes fetched from the fd. Replaces the exhausted
    /// read-ahead; callers only refill when `take_buffered` came up empty.
    pub fn stash_readahead(&mut self, data: &[u8]) {
        self.io_started = true;
        self.readahead.clear();
        self.readahead.extend_from_slice(data);
        self.rpos = 0;
    }

    /// Push one byte back ahead of the read-ahead. Fails if the slot is
    /// occupied. Clears the EOF indicator (ungetc semantics).
    pub fn unread(&mut self, byte: u8) -> bool {
        if self.pushback.is_some() {
            return false;
        }
        self.pushback = Some(byte);
        self.eof = false;
        true
    }

    // -----------------------------------------------------------------------
    // Cursor accounting
    // -----------------------------------------------------------------------

    /// Discard the read side, clear EOF, and hand back staged writes that
    /// must reach the fd before the cursor moves.
    pub fn begin_seek(&mut self) -> Vec<u8> {
        self.pushback = None;
        self.readahead.clear();
        self.rpos = 0;
        self.eof = false;
        core::mem::take(&mut self.staged)
    }

    /// Correction from the OS cursor to the logical cursor: staged writes
    /// sit ahead of it, unconsumed read-ahead sits behind it.
    pub fn cursor_slack(&self) -> i64 {
        self.staged.len() as i64 - self.readahead_len() as i64
    }
}
