// Port Layer - Interfaces for external collaborators

pub mod standing_provider;
pub mod time_provider;

// Re-exports
pub use standing_provider::{ProviderError, StandingProvider};
pub use time_provider::{FixedTimeProvider, SystemTimeProvider, TimeProvider};
