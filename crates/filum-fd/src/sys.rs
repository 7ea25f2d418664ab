//! Syscall veneer.
//!
//! Safe signatures over the handful of libc calls the stream needs.
//! Failures return the raw errno; the layer above decides which error
//! kind it becomes.

use std::ffi::CString;
use std::path::Path;

pub(crate) type RawFd = libc::c_int;

fn last_errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(libc::EIO)
}

/// open(2) relative to the current directory, creating with 0666.
pub(crate) fn open_path(path: &Path, flag_bits: i32) -> Result<RawFd, i32> {
    let Ok(cpath) = CString::new(path.as_os_str().as_encoded_bytes()) else {
        // Interior NUL can never name a real file.
        return Err(libc::EINVAL);
    };
    let fd = unsafe { libc::open(cpath.as_ptr(), flag_bits, 0o666 as libc::c_uint) };
    if fd < 0 { Err(last_errno()) } else { Ok(fd) }
}

pub(crate) fn close_fd(fd: RawFd) -> Result<(), i32> {
    let rc = unsafe { libc::close(fd) };
    if rc != 0 { Err(last_errno()) } else { Ok(()) }
}

/// read(2): `Ok(0)` is end-of-file.
pub(crate) fn read_fd(fd: RawFd, buf: &mut [u8]) -> Result<usize, i32> {
    let rc = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
    if rc < 0 { Err(last_errno()) } else { Ok(rc as usize) }
}

pub(crate) fn write_fd(fd: RawFd, buf: &[u8]) -> Result<usize, i32> {
    let rc = unsafe { libc::write(fd, buf.as_ptr().cast(), buf.len()) };
    if rc < 0 { Err(last_errno()) } else { Ok(rc as usize) }
}

/// write(2) until `buf` is fully delivered.
pub(crate) fn write_all_fd(fd: RawFd, buf: &[u8]) -> Result<(), i32> {
    let mut sent = 0;
    while sent < buf.len() {
        sent += write_fd(fd, &buf[sent..])?;
    }
    Ok(())
}

/// lseek(2); returns the resulting offset.
pub(crate) fn seek_fd(fd: RawFd, offset: i64, whence: i32) -> Result<i64, i32> {
    let rc = unsafe { libc::lseek(fd, offset as libc::off_t, whence) };
    if rc < 0 { Err(last_errno()) } else { Ok(rc as i64) }
}
