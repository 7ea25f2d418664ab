//! Integration tests: positional and element-granular byte I/O.

mod common;

use common::Scratch;
use filum_fd::{BufPolicy, File, IoError, SeekOrigin};

#[test]
fn element_round_trip_preserves_bytes() {
    let scratch = Scratch::new("roundtrip");
    let payload: Vec<u8> = (0u8..=255).collect();
    let element = 16;

    let mut f = File::open(scratch.path(), "wb").unwrap();
    for block in payload.chunks(element) {
        assert_eq!(f.write_block(block).unwrap(), 1);
    }
    f.close().unwrap();

    let mut f = File::open(scratch.path(), "rb").unwrap();
    let mut back = Vec::new();
    let mut block = vec![0u8; element];
    while f.read_block(&mut block).unwrap() == 1 {
        back.extend_from_slice(&block);
    }
    assert_eq!(back, payload);
}

#[test]
fn concrete_scenario_four_byte_int() {
    let scratch = Scratch::new("data_bin");
    let mut f = File::open(scratch.path(), "wb").unwrap();
    assert_eq!(f.write_block(&42i32.to_le_bytes()).unwrap(), 1);
    f.flush().unwrap();
    f.close().unwrap();

    let mut f = File::open(scratch.path(), "rb").unwrap();
    let mut buf = [0u8; 4];
    assert_eq!(f.read_block(&mut buf).unwrap(), 1);
    assert_eq!(i32::from_le_bytes(buf), 42);
}

#[test]
fn seek_then_tell_reports_the_offset() {
    let scratch = Scratch::new("seektell");
    let mut f = File::open(scratch.path(), "w+").unwrap();
    f.write_block(b"0123456789").unwrap();

    for k in [0i64, 3, 9, 10] {
        f.seek(k, SeekOrigin::Start).unwrap();
        assert_eq!(f.tell().unwrap(), k);
    }

    f.seek(-4, SeekOrigin::End).unwrap();
    assert_eq!(f.tell().unwrap(), 6);
    f.seek(2, SeekOrigin::Current).unwrap();
    assert_eq!(f.tell().unwrap(), 8);
}

#[test]
fn tell_accounts_for_staged_writes() {
    let scratch = Scratch::new("tellstage");
    let mut f = File::open(scratch.path(), "w").unwrap();
    f.write_block(b"abcde").unwrap();
    // Bytes are still staged, but the logical cursor is past them.
    assert_eq!(f.tell().unwrap(), 5);
}

#[test]
fn tell_accounts_for_read_ahead() {
    let scratch = Scratch::new("tellahead");
    std::fs::write(scratch.path(), b"0123456789").unwrap();

    let mut f = File::open(scratch.path(), "r").unwrap();
    let mut one = [0u8; 1];
    f.read_block(&mut one).unwrap();
    // The fd cursor has raced ahead into the read-ahead buffer.
    assert_eq!(f.tell().unwrap(), 1);
}

#[test]
fn seek_discards_read_ahead() {
    let scratch = Scratch::new("seekahead");
    std::fs::write(scratch.path(), b"abcdef").unwrap();

    let mut f = File::open(scratch.path(), "r").unwrap();
    let mut two = [0u8; 2];
    f.read_block(&mut two).unwrap();
    assert_eq!(&two, b"ab");

    f.seek(0, SeekOrigin::Start).unwrap();
    f.read_block(&mut two).unwrap();
    assert_eq!(&two, b"ab");
}

#[test]
fn eof_sets_only_when_a_read_runs_out() {
    let scratch = Scratch::new("eof");
    std::fs::write(scratch.path(), b"12345").unwrap();

    let mut f = File::open(scratch.path(), "r").unwrap();
    assert!(!f.is_eof());

    let mut block = [0u8; 5];
    assert_eq!(f.read_block(&mut block).unwrap(), 1);
    // The element completed exactly; the indicator is still unset.
    assert!(!f.is_eof());

    assert_eq!(f.read_block(&mut block).unwrap(), 0);
    assert!(f.is_eof());
}

#[test]
fn partial_element_at_eof_returns_zero_without_error() {
    let scratch = Scratch::new("partial");
    std::fs::write(scratch.path(), b"123456").unwrap();

    let mut f = File::open(scratch.path(), "r").unwrap();
    let mut block = [0u8; 4];
    assert_eq!(f.read_block(&mut block).unwrap(), 1);
    assert_eq!(f.read_block(&mut block).unwrap(), 0);
    assert!(f.is_eof());
}

#[test]
fn zero_size_elements_report_zero() {
    let scratch = Scratch::new("zerosize");
    let mut f = File::open(scratch.path(), "w+").unwrap();
    assert_eq!(f.write_block(b"").unwrap(), 0);
    let mut empty = [0u8; 0];
    assert_eq!(f.read_block(&mut empty).unwrap(), 0);
}

#[test]
fn flush_makes_staged_bytes_durable() {
    let scratch = Scratch::new("flush");
    let mut f = File::open(scratch.path(), "w").unwrap();
    f.write_block(b"durable").unwrap();
    assert_eq!(std::fs::read(scratch.path()).unwrap(), b"");

    f.flush().unwrap();
    assert_eq!(std::fs::read(scratch.path()).unwrap(), b"durable");
}

#[test]
fn unbuffered_policy_writes_through() {
    let scratch = Scratch::new("unbuffered");
    let mut f = File::open(scratch.path(), "w").unwrap();
    assert!(f.set_buffering(BufPolicy::None, 0));
    f.write_block(b"now").unwrap();
    assert_eq!(std::fs::read(scratch.path()).unwrap(), b"now");
}

#[test]
fn buffering_change_is_refused_after_io() {
    let scratch = Scratch::new("latevbuf");
    let mut f = File::open(scratch.path(), "w").unwrap();
    f.write_block(b"x").unwrap();
    assert!(!f.set_buffering(BufPolicy::Line, 64));
}

#[test]
fn rewind_returns_to_start_and_clears_eof() {
    let scratch = Scratch::new("rewind");
    std::fs::write(scratch.path(), b"ab").unwrap();

    let mut f = File::open(scratch.path(), "r").unwrap();
    let mut block = [0u8; 2];
    f.read_block(&mut block).unwrap();
    f.read_block(&mut block).unwrap();
    assert!(f.is_eof());

    f.rewind().unwrap();
    assert!(!f.is_eof());
    assert_eq!(f.tell().unwrap(), 0);
    assert_eq!(f.read_block(&mut block).unwrap(), 1);
    assert_eq!(&block, b"ab");
}

#[test]
fn reading_a_write_only_handle_is_an_os_read_failure() {
    let scratch = Scratch::new("wronly");
    let mut f = File::open(scratch.path(), "w").unwrap();
    let mut block = [0u8; 1];
    let err = f.read_block(&mut block).unwrap_err();
    assert!(matches!(err, IoError::Read { .. }));
    assert!(f.is_error());
    f.clear_status();
    assert!(!f.is_error());
}

#[test]
fn append_mode_extends_existing_content() {
    let scratch = Scratch::new("append");
    std::fs::write(scratch.path(), b"head:").unwrap();

    let mut f = File::open(scratch.path(), "a").unwrap();
    f.write_block(b"tail").unwrap();
    f.close().unwrap();
    assert_eq!(std::fs::read(scratch.path()).unwrap(), b"head:tail");
}

#[test]
fn write_then_read_through_update_mode() {
    let scratch = Scratch::new("update");
    let mut f = File::open(scratch.path(), "w+").unwrap();
    f.write_block(b"mixed access").unwrap();
    f.seek(0, SeekOrigin::Start).unwrap();

    let mut block = [0u8; 5];
    assert_eq!(f.read_block(&mut block).unwrap(), 1);
    assert_eq!(&block, b"mixed");
}
