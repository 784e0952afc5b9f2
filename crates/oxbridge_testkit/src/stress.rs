//! Lifecycle stress helpers.
//!
//! Drive many create/read/drop cycles through the SDK and report what the
//! mock saw, so tests can assert that every native allocation came back.

use crate::fixtures::{self, TEST_SALT};
use crate::mock::{self, Counters};
use oxbridge_sdk::{BlindIndexSearch, ConfigOptions, GroupId, Sdk, SdkConfig, SdkResult, UserId};
use std::thread;
use std::time::{Duration, Instant};

/// Configuration for churn runs.
#[derive(Debug, Clone)]
pub struct ChurnConfig {
    /// Cycles per thread.
    pub iterations: usize,
    /// Threads for concurrent runs.
    pub threads: usize,
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            iterations: 1_000,
            threads: 4,
        }
    }
}

/// Result of a churn run on one thread.
#[derive(Debug, Clone)]
pub struct ChurnReport {
    /// Cycles completed.
    pub iterations: usize,
    /// Group records drained from foreign vectors.
    pub records_drained: usize,
    /// Mock counters at the end of the run.
    pub counters: Counters,
    /// Wall time.
    pub duration: Duration,
}

impl ChurnReport {
    /// Total handle releases across entities.
    pub fn handles_released(&self) -> usize {
        self.counters.released.values().sum()
    }
}

fn cycle(sdk: &Sdk, i: usize) -> SdkResult<usize> {
    let user = UserId::new(sdk, &format!("user-{i}"))?;
    let _ = user.id();

    let group = GroupId::new(sdk, "eng-backend")?;
    let meta = sdk.group_metadata(&group)?;
    let _ = (meta.name(), meta.needs_rotation());

    let drained = sdk.list_groups("eng-")?;
    let listed = sdk.group_list("")?.groups()?;

    let config = SdkConfig::new(sdk, &ConfigOptions::new().timeout(None))?;
    let _ = config.max_entries();

    let search = BlindIndexSearch::new(sdk, TEST_SALT)?;
    let _ = search.tokenize_query("stress test", Some("tenant"))?;

    let _ = sdk.user_verify(&mock::jwt_for("alice"), None)?;

    Ok(drained.len() + listed.len())
}

/// Runs create/read/drop cycles against a freshly seeded mock on this thread.
///
/// Foreign vector buffers handed out by listing are released at the end.
pub fn handle_churn(config: &ChurnConfig) -> SdkResult<ChurnReport> {
    fixtures::seed();
    let sdk = fixtures::mock_sdk();
    let start = Instant::now();

    let mut records_drained = 0;
    for i in 0..config.iterations {
        records_drained += cycle(&sdk, i)?;
    }
    mock::release_list_buffers();

    Ok(ChurnReport {
        iterations: config.iterations,
        records_drained,
        counters: mock::counters(),
        duration: start.elapsed(),
    })
}

/// Runs [`handle_churn`] on `config.threads` threads at once.
///
/// Each thread has its own mock state.
pub fn concurrent_churn(config: &ChurnConfig) -> Vec<SdkResult<ChurnReport>> {
    let handles: Vec<_> = (0..config.threads)
        .map(|_| {
            let config = config.clone();
            thread::spawn(move || handle_churn(&config))
        })
        .collect();

    handles
        .into_iter()
        .map(|h| h.join().expect("churn thread panicked"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_churn_is_balanced() {
        let report = handle_churn(&ChurnConfig {
            iterations: 10,
            threads: 1,
        })
        .unwrap();
        assert_eq!(report.iterations, 10);
        assert_eq!(report.records_drained, 10 * (3 + 4));
        assert!(report.counters.is_balanced(), "{:?}", report.counters);
        assert_eq!(report.counters.foreign_vecs_outstanding, 0);
    }
}
