use crate::error::StoreError;
use std::{thread, time::Duration};
use tracing::warn;

/// Retry an idempotent operation with linear backoff of
/// `100 ms * attempt_number`.
///
/// Only transient failures retry; logic errors surface immediately.
/// Non-idempotent writes must not go through here.
pub fn execute_with_retry<T, F>(mut operation: F, max_retries: u32) -> Result<T, StoreError>
where
    F: FnMut() -> Result<T, StoreError>,
{
    let mut attempt = 0u32;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_retries && e.is_transient() => {
                attempt += 1;
                warn!(attempt, error = %e, "retrying transient store failure");
                thread::sleep(Duration::from_millis(100 * attempt as u64));
            }
            Err(e) => return Err(e),
        }
    }
}
