//! Verification report rendering.
//!
//! A run's outcomes render two ways: a markdown summary for humans and
//! a JSON document for downstream tooling.

use serde::Serialize;

use crate::runner::CaseOutcome;

/// Aggregate of one verification run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub suite: String,
    pub timestamp: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub outcomes: Vec<CaseOutcome>,
}

impl RunReport {
    pub fn new(suite: &str, timestamp: &str, outcomes: Vec<CaseOutcome>) -> Self {
        let passed = outcomes.iter().filter(|o| o.passed).count();
        RunReport {
            suite: suite.to_string(),
            timestamp: timestamp.to_string(),
            total: outcomes.len(),
            passed,
            failed: outcomes.len() - passed,
            outcomes,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Markdown summary table with one row per case.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str(&format!("# Conformance report: {}\n\n", self.suite));
        md.push_str(&format!("- Run at: {}\n", self.timestamp));
        md.push_str(&format!(
            "- Cases: {} total, {} passed, {} failed\n\n",
            self.total, self.passed, self.failed
        ));
        md.push_str("| Case | Result | Detail |\n");
        md.push_str("|------|--------|--------|\n");
        for o in &self.outcomes {
            let result = if o.passed { "pass" } else { "FAIL" };
            let detail = o.detail.as_deref().unwrap_or("-");
            md.push_str(&format!("| {} | {} | {} |\n", o.case_name, result, detail));
        }
        md
    }
}
