//! Bounded retry policy used by [`remove_any`](crate::fs_op::remove::remove_any).
//!
//! A policy makes `retries` attempts, sleeping `interval` after each
//! failure, and then one final attempt. What happens when that final
//! attempt fails is decided by [`Exhaustion`]: the error is either handed
//! back to the caller or logged and absorbed.

use std::fmt::Display;
use std::thread;
use std::time::Duration;

use serde::Deserialize;

/// Number of attempts made before the final one on hosts where file
/// handles may be held open by scanners or indexers.
pub const LOCKED_HANDLE_RETRIES: u32 = 100;

/// Pause between attempts on such hosts.
pub const LOCKED_HANDLE_INTERVAL: Duration = Duration::from_millis(10);

/// What to do once every attempt has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exhaustion {
    /// Return the last error to the caller.
    Propagate,
    /// Log the last error at debug level and report [`RetryOutcome::GaveUp`].
    Suppress,
}

/// Result of running an operation under a policy that did not propagate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    /// The operation succeeded on attempt number `attempts` (1-based).
    Succeeded { attempts: u32 },
    /// Every attempt failed and the policy suppressed the error.
    GaveUp { attempts: u32 },
}

impl RetryOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, RetryOutcome::Succeeded { .. })
    }

    pub fn attempts(&self) -> u32 {
        match *self {
            RetryOutcome::Succeeded { attempts } | RetryOutcome::GaveUp { attempts } => attempts,
        }
    }
}

/// Explicit retry policy: attempt count, pause length and the
/// suppress-vs-propagate decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryPolicy {
    /// Attempts made before the final one. Zero means a single attempt.
    pub retries: u32,
    #[serde(with = "millis", rename = "interval_ms")]
    pub interval: Duration,
    pub on_exhausted: Exhaustion,
}

impl RetryPolicy {
    /// One attempt, errors go straight back to the caller.
    pub const fn single_attempt() -> Self {
        RetryPolicy {
            retries: 0,
            interval: Duration::ZERO,
            on_exhausted: Exhaustion::Propagate,
        }
    }

    /// 100 attempts 10ms apart plus a final one, never failing.
    pub const fn locked_handles() -> Self {
        RetryPolicy {
            retries: LOCKED_HANDLE_RETRIES,
            interval: LOCKED_HANDLE_INTERVAL,
            on_exhausted: Exhaustion::Suppress,
        }
    }

    /// The policy appropriate for the platform this binary was built for.
    pub const fn for_host() -> Self {
        if cfg!(windows) {
            Self::locked_handles()
        } else {
            Self::single_attempt()
        }
    }

    /// Upper bound on how many times `op` will be invoked.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Run `op` under this policy, sleeping with `std::thread::sleep`.
    pub fn run<E, F>(&self, op: F) -> Result<RetryOutcome, E>
    where
        E: Display,
        F: FnMut() -> Result<(), E>,
    {
        self.run_with_sleep(op, thread::sleep)
    }

    /// Same as [`run`](Self::run) with an injectable sleep.
    pub fn run_with_sleep<E, F, S>(&self, mut op: F, mut sleep: S) -> Result<RetryOutcome, E>
    where
        E: Display,
        F: FnMut() -> Result<(), E>,
        S: FnMut(Duration),
    {
        for attempt in 1..=self.retries {
            match op() {
                Ok(()) => return Ok(RetryOutcome::Succeeded { attempts: attempt }),
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "attempt failed, retrying");
                    sleep(self.interval);
                }
            }
        }

        let attempts = self.max_attempts();
        match op() {
            Ok(()) => Ok(RetryOutcome::Succeeded { attempts }),
            Err(e) => match self.on_exhausted {
                Exhaustion::Propagate => Err(e),
                Exhaustion::Suppress => {
                    tracing::debug!(attempts, error = %e, "giving up after final attempt");
                    Ok(RetryOutcome::GaveUp { attempts })
                }
            },
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::for_host()
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
