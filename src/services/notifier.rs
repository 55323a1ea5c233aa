//! Post-commit propagation of posted sales to the accounting subsystem.
//!
//! The notification is strictly best-effort: by the time it runs the sale
//! is committed, and no notification outcome may affect it. Fixed-delay
//! retry is acceptable at accounting-notification volume; reuse at higher
//! volume calls for bounded exponential backoff and a shutdown token.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// Maximum delivery attempts per posted sale.
pub const MAX_ATTEMPTS: u32 = 3;

/// Fixed wait between failed attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Caller-supplied hook invoked with `(sale_id, posted_at)` after commit.
pub type PostSaleHook =
    Arc<dyn Fn(i32, DateTime<Utc>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Downstream accounting integration point. The journal subsystem consumes
/// posted sales through this interface; the engine never depends on its
/// internals.
pub trait AccountingNotifier: Send + Sync {
    fn sale_posted(
        &self,
        sale_id: i32,
        posted_at: DateTime<Utc>,
    ) -> BoxFuture<'static, anyhow::Result<()>>;
}

/// Adapts an [`AccountingNotifier`] into the hook shape the posting engine
/// takes.
pub fn hook_from_notifier(notifier: Arc<dyn AccountingNotifier>) -> PostSaleHook {
    Arc::new(move |sale_id, posted_at| notifier.sale_posted(sale_id, posted_at))
}

/// Delivers the posted-sale notification with bounded retries.
///
/// Failures are logged and swallowed. The returned future resolves only
/// after the retry loop finishes, so callers observe a quiet period rather
/// than a background task, but the result is `()` regardless of outcome.
pub async fn notify_sale_posted(hook: &PostSaleHook, sale_id: i32, posted_at: DateTime<Utc>) {
    for attempt in 1..=MAX_ATTEMPTS {
        match hook(sale_id, posted_at).await {
            Ok(()) => return,
            Err(err) if attempt < MAX_ATTEMPTS => {
                warn!(
                    sale_id,
                    attempt,
                    error = %err,
                    "posted-sale notification failed; retrying"
                );
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(err) => {
                error!(
                    sale_id,
                    attempt,
                    error = %err,
                    "posted-sale notification failed; giving up"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn failing_hook(attempts: Arc<AtomicU32>) -> PostSaleHook {
        Arc::new(move |_, _| {
            attempts.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { anyhow::bail!("accounting offline") })
        })
    }

    #[tokio::test(start_paused = true)]
    async fn failing_hook_is_attempted_three_times_with_fixed_spacing() {
        let attempts = Arc::new(AtomicU32::new(0));
        let hook = failing_hook(attempts.clone());

        let started = tokio::time::Instant::now();
        notify_sale_posted(&hook, 7, Utc::now()).await;

        assert_eq!(attempts.load(Ordering::SeqCst), MAX_ATTEMPTS);
        // two waits between three attempts
        assert_eq!(started.elapsed(), RETRY_DELAY * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_retrying_after_first_success() {
        let attempts = Arc::new(AtomicU32::new(0));
        let hook: PostSaleHook = {
            let attempts = attempts.clone();
            Arc::new(move |_, _| {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                Box::pin(async move {
                    if n == 0 {
                        anyhow::bail!("first attempt fails")
                    }
                    Ok(())
                })
            })
        };

        let started = tokio::time::Instant::now();
        notify_sale_posted(&hook, 7, Utc::now()).await;

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(started.elapsed(), RETRY_DELAY);
    }
}
