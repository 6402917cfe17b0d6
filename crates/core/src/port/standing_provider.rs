// Account/Session Provider Port
// reason: async-trait, the real source is a remote API
use crate::domain::AccountSnapshot;
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while fetching a standing snapshot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Standing source unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed standing payload: {0}")]
    Malformed(String),
}

/// Source of the member's current account record
///
/// Implementations:
/// - JsonFileStandingProvider (infra-snapshot): reads a JSON snapshot file
/// - mocks::MockStandingProvider: scripted responses for tests
#[async_trait]
pub trait StandingProvider: Send + Sync {
    /// Fetch the latest snapshot
    ///
    /// # Errors
    /// - ProviderError::Unavailable if the source cannot be reached
    /// - ProviderError::Malformed if the payload cannot be decoded
    async fn fetch(&self) -> Result<AccountSnapshot, ProviderError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays queued responses, then repeats the last one
    pub struct MockStandingProvider {
        responses: Arc<Mutex<VecDeque<Result<AccountSnapshot, ProviderError>>>>,
        last: Arc<Mutex<Result<AccountSnapshot, ProviderError>>>,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockStandingProvider {
        pub fn new(snapshot: AccountSnapshot) -> Self {
            Self::scripted(vec![Ok(snapshot)])
        }

        pub fn scripted(responses: Vec<Result<AccountSnapshot, ProviderError>>) -> Self {
            let last = responses
                .last()
                .cloned()
                .unwrap_or_else(|| Err(ProviderError::Unavailable("no response".to_string())));
            Self {
                responses: Arc::new(Mutex::new(responses.into_iter().collect())),
                last: Arc::new(Mutex::new(last)),
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl StandingProvider for MockStandingProvider {
        async fn fetch(&self) -> Result<AccountSnapshot, ProviderError> {
            *self.call_count.lock().unwrap() += 1;
            match self.responses.lock().unwrap().pop_front() {
                Some(response) => response,
                None => self.last.lock().unwrap().clone(),
            }
        }
    }
}
