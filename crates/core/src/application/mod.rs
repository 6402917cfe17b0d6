// Application Layer - Use cases over the billing domain

pub mod estimator;
pub mod member_card;
pub mod refresh;

// Re-exports
pub use estimator::EstimatorService;
pub use member_card::MemberCard;
pub use refresh::{
    teardown_channel, LiveEstimate, LiveEstimateRefresher, RefreshExit, StandingPoller,
    TeardownToken, ViewHandle,
};
