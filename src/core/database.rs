use crate::core::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::future::Future;
use std::time::Duration;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
}

/// Create the connection pool, retrying with a fixed delay.
///
/// This is the only place in the service that retries: request handlers fail
/// fast and the caller aborts startup once the attempts are exhausted.
pub async fn connect_with_retry(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    retry_with_fixed_backoff(
        config.connect_max_retries,
        config.connect_retry_delay,
        || create_pool(config),
    )
    .await
}

pub async fn retry_with_fixed_backoff<T, E, F, Fut>(
    max_attempts: u32,
    delay: Duration,
    mut op: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts => {
                tracing::warn!(
                    "Failed to connect to database (attempt {}/{}): {}",
                    attempt,
                    max_attempts,
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(
                    "Max retries reached, failed to connect to database after {} attempts: {}",
                    max_attempts,
                    e
                );
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);

        let result: Result<&str, String> =
            retry_with_fixed_backoff(5, Duration::from_millis(1), || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(format!("refused #{}", n))
                    } else {
                        Ok("connected")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("connected"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), String> =
            retry_with_fixed_backoff(4, Duration::from_millis(1), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("refused".to_string()) }
            })
            .await;

        assert_eq!(result, Err("refused".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_retry_zero_attempts_still_tries_once() {
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = retry_with_fixed_backoff(0, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("refused".to_string()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
