//! Fixture execution engine.
//!
//! Runs each round-trip case against a real file through
//! [`filum_fd::File`]: write the payload in element-size blocks, flush,
//! close, reopen, read the elements back, and compare SHA-256 digests
//! of both sides. Stream failures become failed case outcomes, not
//! harness errors, so one broken case never hides the rest.

use std::path::PathBuf;

use sha2::{Digest, Sha256};

use filum_fd::File;

use crate::HarnessError;
use crate::fixtures::{FixtureSet, RoundTripCase, hex_encode};

/// Result of one executed case.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CaseOutcome {
    pub case_name: String,
    pub passed: bool,
    /// SHA-256 of the payload written.
    pub digest_written: String,
    /// SHA-256 of the bytes read back.
    pub digest_read: String,
    /// Failure explanation, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Executes fixture sets in a scratch directory.
pub struct Runner {
    scratch_dir: PathBuf,
}

impl Runner {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Run every case in the set, in order.
    pub fn run_set(&self, set: &FixtureSet) -> Result<Vec<CaseOutcome>, HarnessError> {
        std::fs::create_dir_all(&self.scratch_dir)?;
        set.cases.iter().map(|case| self.run_case(case)).collect()
    }

    fn run_case(&self, case: &RoundTripCase) -> Result<CaseOutcome, HarnessError> {
        let payload = case.payload()?;
        let target = self
            .scratch_dir
            .join(format!("{}_{}.bin", case.name, std::process::id()));

        let verdict = round_trip(&target, case, &payload);
        let _ = std::fs::remove_file(&target);

        let (read_back, detail) = match verdict {
            Ok(bytes) => (bytes, None),
            Err(e) => (Vec::new(), Some(e.to_string())),
        };

        let digest_written = sha256_hex(&payload);
        let digest_read = sha256_hex(&read_back);
        let passed = detail.is_none() && digest_read == digest_written;

        Ok(CaseOutcome {
            case_name: case.name.clone(),
            passed,
            detail: detail.or_else(|| {
                (!passed).then(|| "read-back bytes differ from payload".to_string())
            }),
            digest_written,
            digest_read,
        })
    }
}

/// The two legs of a case; any stream error aborts the case.
fn round_trip(
    target: &std::path::Path,
    case: &RoundTripCase,
    payload: &[u8],
) -> Result<Vec<u8>, filum_fd::IoError> {
    let mut f = File::open(target, &case.write_mode)?;
    for block in payload.chunks(case.element_size) {
        f.write_block(block)?;
    }
    f.flush()?;
    f.close()?;

    let mut f = File::open(target, &case.read_mode)?;
    let mut back = Vec::with_capacity(payload.len());
    let mut block = vec![0u8; case.element_size];
    while f.read_block(&mut block)? == 1 {
        back.extend_from_slice(&block);
    }
    f.close()?;
    Ok(back)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex_encode(&Sha256::digest(bytes))
}
