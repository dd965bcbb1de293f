//! Bounded retry for transient storage failures
//!
//! Applied at the ledger/store boundary only. Errors that are not
//! transient (not-found, invalid-state, constraint violations) pass
//! through on the first attempt.

use huddle_common::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(50);

/// Run a storage operation, retrying transient failures with doubling
/// backoff.
pub async fn with_backoff<T, F, Fut>(op_name: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = INITIAL_BACKOFF;
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < MAX_ATTEMPTS => {
                warn!(
                    "{op_name} failed (attempt {attempt}/{MAX_ATTEMPTS}), retrying in {:?}: {err}",
                    backoff
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
