//! Wall-clock deadline threaded through long-running loops

use std::time::{Duration, Instant};

use crate::IntegralError;

/// Request-scoped deadline. `None` means no time limit.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    /// Start the clock now
    pub fn new(limit: Option<Duration>) -> Self {
        Deadline {
            started: Instant::now(),
            limit,
        }
    }

    pub fn unlimited() -> Self {
        Deadline::new(None)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn is_expired(&self) -> bool {
        self.limit.is_some_and(|limit| self.elapsed() >= limit)
    }

    /// Fail with `Timeout` once the limit has passed
    #[inline]
    pub fn check(&self) -> Result<(), IntegralError> {
        if self.is_expired() {
            Err(IntegralError::Timeout {
                elapsed: self.elapsed(),
            })
        } else {
            Ok(())
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Deadline::unlimited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_unlimited_never_expires() {
        assert!(Deadline::unlimited().check().is_ok());
    }

    #[test]
    fn test_zero_limit_expires_immediately() {
        let deadline = Deadline::new(Some(Duration::ZERO));
        let err = deadline.check().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn test_generous_limit() {
        let deadline = Deadline::new(Some(Duration::from_secs(3600)));
        assert!(!deadline.is_expired());
    }
}
