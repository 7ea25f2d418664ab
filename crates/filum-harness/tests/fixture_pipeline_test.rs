//! Integration test: the fixture pipeline end to end.
//!
//! Builds the built-in suite, runs it against real files, and checks
//! the report that comes out — the executable form of the stream
//! contract's round-trip property.

use filum_harness::HarnessError;
use filum_harness::fixtures::{FixtureSet, RoundTripCase, hex_encode};
use filum_harness::report::RunReport;
use filum_harness::runner::Runner;

fn scratch_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("filum_harness_{tag}_{}", std::process::id()));
    let _ = std::fs::create_dir_all(&dir);
    dir
}

#[test]
fn builtin_suite_passes_end_to_end() {
    let dir = scratch_dir("builtin");
    let set = FixtureSet::builtin();
    let outcomes = Runner::new(&dir).run_set(&set).unwrap();

    let report = RunReport::new(&set.suite, "0", outcomes);
    assert!(report.all_passed(), "failures:\n{}", report.to_markdown());
    assert_eq!(report.total, set.cases.len());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn digests_match_on_both_legs() {
    let dir = scratch_dir("digests");
    let set = FixtureSet::builtin();
    let outcomes = Runner::new(&dir).run_set(&set).unwrap();

    for o in &outcomes {
        assert_eq!(o.digest_written, o.digest_read, "case {}", o.case_name);
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn malformed_fixture_surfaces_as_bad_fixture() {
    let dir = scratch_dir("badfix");
    let set = FixtureSet {
        version: "1".into(),
        suite: "broken".into(),
        cases: vec![RoundTripCase {
            name: "odd_hex".into(),
            payload_hex: "abc".into(),
            element_size: 1,
            write_mode: "wb".into(),
            read_mode: "rb".into(),
            notes: String::new(),
        }],
    };

    let err = Runner::new(&dir).run_set(&set).unwrap_err();
    assert!(matches!(err, HarnessError::BadFixture { .. }));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unreadable_mode_fails_the_case_not_the_run() {
    let dir = scratch_dir("badmode");
    let set = FixtureSet {
        version: "1".into(),
        suite: "mixed".into(),
        cases: vec![
            RoundTripCase {
                name: "read_leg_cannot_read".into(),
                payload_hex: hex_encode(b"data"),
                element_size: 4,
                write_mode: "wb".into(),
                // Write-only read leg: the read fails at the OS level.
                read_mode: "a".into(),
                notes: String::new(),
            },
            RoundTripCase {
                name: "healthy".into(),
                payload_hex: hex_encode(b"data"),
                element_size: 2,
                write_mode: "wb".into(),
                read_mode: "rb".into(),
                notes: String::new(),
            },
        ],
    };

    let outcomes = Runner::new(&dir).run_set(&set).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(!outcomes[0].passed);
    assert!(outcomes[0].detail.is_some());
    assert!(outcomes[1].passed);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn fixture_file_round_trips_through_disk() {
    let dir = scratch_dir("fixfile");
    let path = dir.join("fixtures.json");
    std::fs::write(&path, FixtureSet::builtin().to_json().unwrap()).unwrap();

    let set = FixtureSet::from_file(&path).unwrap();
    assert_eq!(set.suite, "round_trip");
    assert_eq!(set.cases.len(), FixtureSet::builtin().cases.len());

    let _ = std::fs::remove_dir_all(&dir);
}
