//! Integration tests: handle lifecycle.
//!
//! Open/close/reopen/drop transitions, the closed-file guard, and the
//! no-double-close property.

mod common;

use common::Scratch;
use filum_fd::{File, IoError, SeekOrigin};

#[test]
fn open_missing_file_for_read_fails_with_path_context() {
    let scratch = Scratch::new("missing");
    let err = File::open(scratch.path(), "r").unwrap_err();
    match &err {
        IoError::Open { path, .. } => {
            assert!(path.contains("filum_missing"));
        }
        other => panic!("expected Open error, got {other:?}"),
    }
    assert!(err.errno().is_some());
}

#[test]
fn open_for_write_then_read_back_succeeds() {
    let scratch = Scratch::new("create");
    let mut f = File::open(scratch.path(), "wb").unwrap();
    assert!(f.is_open());
    assert_eq!(f.write_block(b"payload").unwrap(), 1);
    f.close().unwrap();

    let mut f = File::open(scratch.path(), "rb").unwrap();
    let mut buf = [0u8; 7];
    assert_eq!(f.read_block(&mut buf).unwrap(), 1);
    assert_eq!(&buf, b"payload");
}

#[test]
fn invalid_mode_is_rejected_before_the_os() {
    let scratch = Scratch::new("badmode");
    let err = File::open(scratch.path(), "q").unwrap_err();
    assert!(matches!(err, IoError::InvalidMode { .. }));
    let err = File::open(scratch.path(), "rw").unwrap_err();
    assert!(matches!(err, IoError::InvalidMode { .. }));
}

#[test]
fn second_close_reports_not_open_without_touching_the_os() {
    let scratch = Scratch::new("dblclose");
    let mut f = File::open(scratch.path(), "w").unwrap();
    f.close().unwrap();
    assert!(!f.is_open());
    assert_eq!(f.close(), Err(IoError::NotOpen));
}

#[test]
fn operations_on_a_closed_file_are_guarded() {
    let scratch = Scratch::new("guarded");
    let mut f = File::open(scratch.path(), "w+").unwrap();
    f.close().unwrap();

    let mut buf = [0u8; 4];
    assert_eq!(f.read_block(&mut buf), Err(IoError::NotOpen));
    assert_eq!(f.write_block(b"x"), Err(IoError::NotOpen));
    assert_eq!(f.seek(0, SeekOrigin::Start), Err(IoError::NotOpen));
    assert_eq!(f.tell(), Err(IoError::NotOpen));
    assert_eq!(f.flush(), Err(IoError::NotOpen));
    assert!(!f.is_eof());
    assert_eq!(f.as_raw_fd(), None);
}

#[test]
fn drop_flushes_and_closes() {
    let scratch = Scratch::new("dropflush");
    {
        let mut f = File::open(scratch.path(), "w").unwrap();
        // Small write stays staged until the drop-time close.
        assert_eq!(f.write_block(b"staged bytes").unwrap(), 1);
    }
    let content = std::fs::read(scratch.path()).unwrap();
    assert_eq!(content, b"staged bytes");
}

#[test]
fn drop_after_close_is_a_no_op() {
    let scratch = Scratch::new("dropclosed");
    let mut f = File::open(scratch.path(), "w").unwrap();
    f.close().unwrap();
    drop(f);
}

#[test]
fn reopen_switches_targets_and_flushes_the_old_handle() {
    let first = Scratch::new("reopen_a");
    let second = Scratch::new("reopen_b");

    let mut f = File::open(first.path(), "w").unwrap();
    f.write_block(b"alpha").unwrap();
    f.reopen(second.path(), "w").unwrap();
    f.write_block(b"beta").unwrap();
    f.close().unwrap();

    assert_eq!(std::fs::read(first.path()).unwrap(), b"alpha");
    assert_eq!(std::fs::read(second.path()).unwrap(), b"beta");
}

#[test]
fn reopen_works_from_the_closed_state() {
    let scratch = Scratch::new("reopen_closed");
    let mut f = File::open(scratch.path(), "w").unwrap();
    f.write_block(b"x").unwrap();
    f.close().unwrap();

    f.reopen(scratch.path(), "r").unwrap();
    assert!(f.is_open());
    let mut buf = [0u8; 1];
    assert_eq!(f.read_block(&mut buf).unwrap(), 1);
    assert_eq!(&buf, b"x");
}

#[test]
fn failed_reopen_leaves_the_file_closed() {
    let scratch = Scratch::new("reopen_fail");
    let missing = Scratch::new("reopen_missing");
    let mut f = File::open(scratch.path(), "w").unwrap();

    let err = f.reopen(missing.path(), "r").unwrap_err();
    assert!(matches!(err, IoError::Open { .. }));
    assert!(!f.is_open());
}

#[test]
fn path_and_flags_reflect_the_live_handle() {
    let scratch = Scratch::new("meta");
    let mut f = File::open(scratch.path(), "w+b").unwrap();
    assert_eq!(f.path(), Some(scratch.path()));
    let flags = f.flags().unwrap();
    assert!(flags.readable && flags.writable && flags.binary);
    f.close().unwrap();
    assert_eq!(f.flags(), None);
}
