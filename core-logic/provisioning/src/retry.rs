//! Track errors and successes to back off retries of external calls.
use std::time::Duration;

use provisioner_conf::RegistrationRetryConf;
use provisioner_context::Context;
use provisioner_errors::AppError;
use provisioner_errors::AppResult;

use crate::telemetry::REGISTRATION_RETRY;

/// Track failures to incrementally delay retries.
///
/// The interface of the [`Backoff`] object is intended for use in retry loops:
/// when an attempt fails call [`Backoff::retry`] and stop looping if it returns an error.
pub struct Backoff {
    delay: Duration,
    max_delay: Duration,
    max_retries: u16,
    multiplier: u32,
    seen: u16,
}

impl Backoff {
    /// Initialise a new backoff engine.
    pub fn new(conf: &RegistrationRetryConf) -> Backoff {
        Backoff {
            delay: conf.start_delay(),
            max_delay: conf.max_delay(),
            max_retries: conf.max_retries,
            multiplier: conf.multiplier,
            seen: 0,
        }
    }

    /// An attempt failed and the next one needs to be delayed appropriately.
    ///
    /// When too many attempts failed the error is reported back to fail properly.
    /// Otherwise the function sleeps for an incrementally longer period, up to a configured max.
    pub async fn retry(&mut self, context: &Context, error: AppError) -> AppResult<()> {
        self.seen += 1;
        if self.seen > self.max_retries {
            return Err(error);
        }

        REGISTRATION_RETRY.inc();
        let error = anyhow::Error::from(error);
        slog::warn!(
            context.logger, "Attempt failed, will retry";
            "attempt" => self.seen,
            "max_retries" => self.max_retries,
            replisdk::utils::error::slog::ErrorAttributes::from(&error),
        );
        tokio::time::sleep(self.delay).await;
        self.delay = std::cmp::min(self.delay * self.multiplier, self.max_delay);
        Ok(())
    }

    /// Number of failed attempts seen so far.
    #[cfg(test)]
    pub fn failures(&self) -> u16 {
        self.seen
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use provisioner_conf::RegistrationRetryConf;
    use provisioner_context::Context;
    use provisioner_errors::AppError;

    use super::Backoff;

    fn conf(max_retries: u16) -> RegistrationRetryConf {
        RegistrationRetryConf {
            max_delay_ms: 4,
            max_retries,
            multiplier: 2,
            start_delay_ms: 1,
        }
    }

    #[tokio::test]
    async fn retries_until_bound() {
        let context = Context::fixture();
        let mut backoff = Backoff::new(&conf(2));
        backoff
            .retry(&context, AppError::internal("first"))
            .await
            .expect("first retry allowed");
        backoff
            .retry(&context, AppError::internal("second"))
            .await
            .expect("second retry allowed");
        let error = backoff
            .retry(&context, AppError::internal("third"))
            .await
            .expect_err("retries to be exhausted");
        assert_eq!(error.message(), "third");
        assert_eq!(backoff.failures(), 3);
    }

    #[tokio::test]
    async fn delay_is_capped() {
        let context = Context::fixture();
        let mut backoff = Backoff::new(&conf(10));
        for _ in 0..5 {
            backoff
                .retry(&context, AppError::internal("error"))
                .await
                .expect("retry allowed");
        }
        assert_eq!(backoff.delay, Duration::from_millis(4));
    }

    #[tokio::test]
    async fn zero_retries_fail_immediately() {
        let context = Context::fixture();
        let mut backoff = Backoff::new(&conf(0));
        let result = backoff.retry(&context, AppError::internal("error")).await;
        assert!(result.is_err());
    }
}
