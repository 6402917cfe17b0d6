// Member Card - projection behind the user card surface

use serde::Serialize;

use crate::application::estimator::EstimatorService;
use crate::domain::{
    combined_discount, discount_label, format_yuan, AccountSnapshot, CostEstimate, VipProgress,
};
use crate::error::Result;

/// Everything the member card shows, computed in one place
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberCard {
    pub user_id: Option<String>,
    pub nickname: Option<String>,
    pub vip: VipProgress,
    pub combined_discount: f64,
    pub discount_label: String,
    pub balance: Option<f64>,
    pub play_count: Option<u32>,
    pub in_venue: bool,
    pub live_estimate: Option<CostEstimate>,
}

impl MemberCard {
    pub fn project(snapshot: &AccountSnapshot, service: &EstimatorService) -> Result<Self> {
        let standing = snapshot.standing()?;
        let vip = VipProgress::for_consumption(standing.lifetime_consumption);
        let combined = combined_discount(vip.level, standing.account_discount_multiplier);
        let live_estimate = service.estimate_snapshot(snapshot)?;

        Ok(Self {
            user_id: snapshot.user_id.clone(),
            nickname: snapshot.nickname.clone(),
            vip,
            combined_discount: combined,
            discount_label: discount_label(combined),
            balance: snapshot.balance,
            play_count: snapshot.play_count,
            in_venue: snapshot.status().is_in_venue(),
            live_estimate,
        })
    }

    pub fn balance_label(&self) -> String {
        format_yuan(self.balance.unwrap_or(0.0))
    }

    /// `"120/150 RMB"`, or `"6000/Max RMB"` at the top level
    pub fn progress_label(&self) -> String {
        match self.vip.next_threshold {
            Some(threshold) => format!("{}/{} RMB", self.vip.consumption, threshold),
            None => format!("{}/Max RMB", self.vip.consumption),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::FixedTimeProvider;
    use std::sync::Arc;

    const T: i64 = 1_700_000_000_000;

    fn service() -> EstimatorService {
        EstimatorService::new(Arc::new(FixedTimeProvider::new(T + 3_600_000)))
    }

    #[test]
    fn test_card_for_member_in_venue() {
        let snapshot = AccountSnapshot {
            user_id: Some("10001".to_string()),
            nickname: Some("maimai".to_string()),
            enter_timestamp: Some(T),
            consumption: Some(120.0),
            discount: Some(1.0),
            balance: Some(88.5),
            play_count: Some(12),
        };
        let card = MemberCard::project(&snapshot, &service()).unwrap();

        assert_eq!(card.vip.level, 2);
        assert!(card.in_venue);
        assert_eq!(card.discount_label, "9.9折");
        assert_eq!(card.balance_label(), "￥88.50");
        assert_eq!(card.progress_label(), "120/150 RMB");
        assert!(card.live_estimate.is_some());
    }

    #[test]
    fn test_card_free_account_not_in_venue() {
        let snapshot = AccountSnapshot {
            consumption: Some(6000.0),
            discount: Some(0.0),
            ..Default::default()
        };
        let card = MemberCard::project(&snapshot, &service()).unwrap();

        assert_eq!(card.discount_label, "免费");
        assert_eq!(card.progress_label(), "6000/Max RMB");
        assert!(!card.in_venue);
        assert!(card.live_estimate.is_none());
    }
}
