// Session Cost Estimator

use serde::{Deserialize, Serialize};

use super::error::Result;
use super::rate::{billable_hours, TieredRateTable};
use super::session::{AccountStanding, Session};
use super::vip::{discount_factor, vip_level};

/// Result of one estimate; always replaced wholesale, never patched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    pub elapsed_label: String,
    pub amount_due: f64,
    pub billable_hours: u32,
    pub base_cost: f64,
    pub vip_level: u8,
    pub vip_factor: f64,
}

impl CostEstimate {
    /// Amount as displayed, e.g. `"￥24.00"`
    pub fn display_amount(&self) -> String {
        format_yuan(self.amount_due)
    }
}

/// Format a currency amount with two decimals
pub fn format_yuan(amount: f64) -> String {
    format!("￥{:.2}", amount)
}

/// Pure estimator over a rate table
///
/// Holds no state besides the table, so it can be shared freely.
#[derive(Debug, Clone, Default)]
pub struct SessionCostEstimator {
    table: TieredRateTable,
}

impl SessionCostEstimator {
    pub fn new(table: TieredRateTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &TieredRateTable {
        &self.table
    }

    /// Estimate the amount due for `session` under `standing`
    ///
    /// `amount_due = base_cost(ceil(hours)) * vip_factor * account_multiplier`,
    /// unrounded. Clock skew clamps elapsed time to zero.
    pub fn estimate(&self, session: &Session, standing: &AccountStanding) -> Result<CostEstimate> {
        // Re-validate: the fields are public and may have been built by hand.
        let standing = AccountStanding::new(
            standing.lifetime_consumption,
            standing.account_discount_multiplier,
        )?;

        let elapsed_ms = session.elapsed_ms();
        let hours = billable_hours(elapsed_ms);
        let base_cost = self.table.base_cost(hours);
        let level = vip_level(standing.lifetime_consumption);
        let vip_factor = discount_factor(level);
        let amount_due = base_cost * vip_factor * standing.account_discount_multiplier;

        Ok(CostEstimate {
            elapsed_label: session.elapsed().label(),
            amount_due,
            billable_hours: hours,
            base_cost,
            vip_level: level,
            vip_factor,
        })
    }
}

/// Estimate under the venue rate table
pub fn estimate(session: &Session, standing: &AccountStanding) -> Result<CostEstimate> {
    SessionCostEstimator::default().estimate(session, standing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::domain::session::UNDER_ONE_MINUTE_LABEL;

    const T: i64 = 1_700_000_000_000;
    const MINUTE: i64 = 60_000;
    const HOUR: i64 = 60 * MINUTE;

    #[test]
    fn test_two_and_a_half_hours_full_price() {
        let session = Session::new(T, T + 2 * HOUR + 30 * MINUTE);
        let result = estimate(&session, &AccountStanding::full_price()).unwrap();

        assert_eq!(result.billable_hours, 3);
        assert_eq!(result.base_cost, 24.0);
        assert_eq!(result.vip_factor, 1.0);
        assert_eq!(result.amount_due, 24.0);
        assert_eq!(result.display_amount(), "￥24.00");
        assert_eq!(result.elapsed_label, "2小时 30分钟");
    }

    #[test]
    fn test_clock_skew_is_free_not_error() {
        let session = Session::new(T, T - 10 * MINUTE);
        let result = estimate(&session, &AccountStanding::full_price()).unwrap();

        assert_eq!(result.billable_hours, 0);
        assert_eq!(result.amount_due, 0.0);
        assert_eq!(result.elapsed_label, UNDER_ONE_MINUTE_LABEL);
    }

    #[test]
    fn test_vip_and_account_discount_stack() {
        let session = Session::new(T, T + 10 * HOUR);
        let standing = AccountStanding::new(2500.0, 0.9).unwrap();
        let result = estimate(&session, &standing).unwrap();

        assert_eq!(result.vip_level, 50);
        assert_eq!(result.base_cost, 62.0);
        assert!((result.amount_due - 41.85).abs() < 1e-9);
        assert_eq!(result.display_amount(), "￥41.85");
    }

    #[test]
    fn test_hand_built_standing_is_revalidated() {
        let session = Session::new(T, T + HOUR);
        let standing = AccountStanding {
            lifetime_consumption: 0.0,
            account_discount_multiplier: f64::NAN,
        };
        assert!(matches!(
            estimate(&session, &standing),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_estimate_is_idempotent() {
        let session = Session::new(T, T + 7 * HOUR + 1);
        let standing = AccountStanding::new(333.0, 0.8).unwrap();
        let estimator = SessionCostEstimator::default();

        let first = estimator.estimate(&session, &standing).unwrap();
        let second = estimator.estimate(&session, &standing).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_extreme_elapsed_saturates_instead_of_panicking() {
        let session = Session::new(0, i64::MAX);
        let result = estimate(&session, &AccountStanding::full_price()).unwrap();

        assert_eq!(result.billable_hours, u32::MAX);
        assert_eq!(result.amount_due, 42.0 + f64::from(u32::MAX - 6) * 5.0);
        assert_eq!(result.elapsed_label, "106751991167天 7小时 12分钟");
    }
}
