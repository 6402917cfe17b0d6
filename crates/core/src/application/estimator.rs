// Estimator Service - clock-aware entry point for display surfaces

use std::sync::Arc;

use tracing::debug;

use crate::domain::{
    parse_timestamp, AccountSnapshot, AccountStanding, CostEstimate, Session,
    SessionCostEstimator, TieredRateTable,
};
use crate::error::Result;
use crate::port::TimeProvider;

/// Shared by every surface that shows a cost, so none re-derives the formula
pub struct EstimatorService {
    estimator: SessionCostEstimator,
    time_provider: Arc<dyn TimeProvider>,
}

impl EstimatorService {
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self::with_table(TieredRateTable::venue(), time_provider)
    }

    pub fn with_table(table: TieredRateTable, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            estimator: SessionCostEstimator::new(table),
            time_provider,
        }
    }

    pub fn estimator(&self) -> &SessionCostEstimator {
        &self.estimator
    }

    pub fn now_millis(&self) -> i64 {
        self.time_provider.now_millis()
    }

    /// Estimate for the member's open session, `None` when not in venue
    pub fn estimate_snapshot(&self, snapshot: &AccountSnapshot) -> Result<Option<CostEstimate>> {
        let now = self.time_provider.now_millis();
        let Some(session) = snapshot.session_at(now) else {
            debug!(user_id = ?snapshot.user_id, "Member not in venue, no estimate");
            return Ok(None);
        };
        let standing = snapshot.standing()?;
        let estimate = self.estimator.estimate(&session, &standing)?;

        debug!(
            user_id = ?snapshot.user_id,
            billable_hours = estimate.billable_hours,
            amount_due = estimate.amount_due,
            "Live estimate computed"
        );
        Ok(Some(estimate))
    }

    /// Estimate from a raw entry timestamp (form field / CLI arg) against now
    pub fn estimate_raw(&self, enter: &str, standing: &AccountStanding) -> Result<CostEstimate> {
        let enter_ms = parse_timestamp("enterTimestamp", enter)?;
        let session = Session::new(enter_ms, self.time_provider.now_millis());
        Ok(self.estimator.estimate(&session, standing)?)
    }
}
