//! Assertion helpers.

use sui_oracle_harness::{EventLog, ScenarioResult};

/// Assert that `result` failed with the error `code`.
pub fn assert_code<T: std::fmt::Debug>(result: ScenarioResult<T>, code: u64, context: &str) {
    match result {
        Ok(v) => panic!("{} should have failed but got: {:?}", context, v),
        Err(e) => assert_eq!(
            e.code(),
            code,
            "{}: expected error code {}, got {}",
            context,
            code,
            e
        ),
    }
}

/// Number of crash events in `log`.
pub fn crash_count(log: &EventLog) -> usize {
    log.snapshot().iter().filter(|e| e.is_crash()).count()
}
