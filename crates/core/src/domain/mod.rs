// Domain Layer - Pure billing logic and value types

pub mod error;
pub mod estimate;
pub mod play_log;
pub mod rate;
pub mod session;
pub mod vip;

// Re-exports
pub use error::DomainError;
pub use estimate::{estimate, format_yuan, CostEstimate, SessionCostEstimator};
pub use play_log::{PlayLog, UNCLOSED_LABEL};
pub use rate::{base_cost, billable_hours, RateTier, TierCharge, TieredRateTable};
pub use session::{
    parse_timestamp, AccountSnapshot, AccountStanding, ElapsedDuration, Session, SessionStatus,
    UNDER_ONE_MINUTE_LABEL,
};
pub use vip::{
    combined_discount, discount_factor, discount_label, next_level_threshold, vip_level,
    VipProgress, MAX_VIP_LEVEL,
};
