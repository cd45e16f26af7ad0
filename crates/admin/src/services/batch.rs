//! Best-effort bulk execution.
//!
//! Every id is attempted independently with bounded concurrency. Results are
//! collected per id; one failure never stops its siblings. If the caller's
//! cancellation future fires first, ids whose outcome is unknown are reported
//! as abandoned.

use std::collections::HashSet;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;

use futures::StreamExt;
use futures::stream;
use serde::Serialize;
use tracing::warn;

use crate::error::AppError;

/// Default number of requests in flight per bulk operation.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// A member of a batch that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure<K> {
    pub id: K,
    /// User-facing message (server text verbatim when available).
    pub message: String,
    pub retryable: bool,
}

/// Outcome of a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport<K, T = K> {
    pub succeeded: Vec<T>,
    pub failed: Vec<BatchFailure<K>>,
    /// Cancelled before the outcome was known; may or may not have applied.
    pub abandoned: Vec<K>,
}

impl<K, T> Default for BatchReport<K, T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            abandoned: Vec::new(),
        }
    }
}

impl<K, T> BatchReport<K, T> {
    /// Returns `true` if every member succeeded.
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty() && self.abandoned.is_empty()
    }

    /// Human summary, e.g. `"4 archived, 1 could not be archived"`.
    #[must_use]
    pub fn summary(&self, past_tense: &str) -> String {
        let mut parts = vec![format!("{} {past_tense}", self.succeeded.len())];
        if !self.failed.is_empty() {
            parts.push(format!(
                "{} could not be {past_tense}",
                self.failed.len()
            ));
        }
        if !self.abandoned.is_empty() {
            parts.push(format!(
                "{} cancelled before completing",
                self.abandoned.len()
            ));
        }
        parts.join(", ")
    }

    /// Transform successful outputs, keeping failures as they are.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> BatchReport<K, U> {
        BatchReport {
            succeeded: self.succeeded.into_iter().map(f).collect(),
            failed: self.failed,
            abandoned: self.abandoned,
        }
    }
}

/// Run `op` for every id with at most `limit` calls in flight.
///
/// Duplicate ids are attempted once. Results arrive in completion order.
pub async fn run<K, T, I, F, Fut, C>(ids: I, limit: usize, cancel: C, op: F) -> BatchReport<K, T>
where
    K: Copy + Eq + Hash + Display,
    I: IntoIterator<Item = K>,
    F: Fn(K) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
    C: Future<Output = ()>,
{
    let mut seen = HashSet::new();
    let ids: Vec<K> = ids.into_iter().filter(|id| seen.insert(*id)).collect();

    let mut report = BatchReport::default();
    let mut settled: HashSet<K> = HashSet::with_capacity(ids.len());

    {
        let mut results = stream::iter(ids.iter().copied())
            .map(|id| {
                let call = op(id);
                async move { (id, call.await) }
            })
            .buffer_unordered(limit.max(1));
        let mut cancel = std::pin::pin!(cancel);

        loop {
            tokio::select! {
                biased;
                () = &mut cancel => {
                    warn!(pending = ids.len() - settled.len(), "Bulk operation cancelled");
                    break;
                }
                next = results.next() => match next {
                    Some((id, Ok(value))) => {
                        settled.insert(id);
                        report.succeeded.push(value);
                    }
                    Some((id, Err(err))) => {
                        warn!(%id, error = %err, "Bulk member failed");
                        settled.insert(id);
                        report.failed.push(BatchFailure {
                            id,
                            message: err.user_message(),
                            retryable: err.is_retryable(),
                        });
                    }
                    None => break,
                },
            }
        }
    }

    report.abandoned = ids.into_iter().filter(|id| !settled.contains(id)).collect();
    report
}
