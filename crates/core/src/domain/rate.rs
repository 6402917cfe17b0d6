// Tiered hourly rate table

use serde::{Deserialize, Serialize};

/// Milliseconds in one billable hour
pub const MILLIS_PER_HOUR: i64 = 3_600_000;

/// One pricing tier: every hour index in `from_hour..=to_hour` costs `rate`
///
/// `to_hour = None` means the tier is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTier {
    pub from_hour: u32,
    pub to_hour: Option<u32>,
    pub rate: f64,
}

impl RateTier {
    fn covers(&self, hour: u32) -> bool {
        hour >= self.from_hour && self.to_hour.map_or(true, |to| hour <= to)
    }
}

/// Charge for the hours of a session that fell into one tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierCharge {
    pub from_hour: u32,
    pub to_hour: u32,
    pub hours: u32,
    pub rate: f64,
    pub subtotal: f64,
}

/// Hour-indexed tiered pricing
///
/// Hour `h` (1-based) is charged at the rate of the first tier covering it.
/// The venue table is 8/hour for hours 1-3, 6/hour for hours 4-6 and
/// 5/hour for every hour after the sixth, with no further break at hour 10.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TieredRateTable {
    tiers: Vec<RateTier>,
}

impl Default for TieredRateTable {
    fn default() -> Self {
        Self::venue()
    }
}

impl TieredRateTable {
    /// The lounge's published table
    pub fn venue() -> Self {
        Self {
            tiers: vec![
                RateTier {
                    from_hour: 1,
                    to_hour: Some(3),
                    rate: 8.0,
                },
                RateTier {
                    from_hour: 4,
                    to_hour: Some(6),
                    rate: 6.0,
                },
                RateTier {
                    from_hour: 7,
                    to_hour: None,
                    rate: 5.0,
                },
            ],
        }
    }

    pub fn tiers(&self) -> &[RateTier] {
        &self.tiers
    }

    /// Rate charged for the 1-based hour index `hour`
    pub fn rate_for_hour(&self, hour: u32) -> f64 {
        self.tiers
            .iter()
            .find(|tier| tier.covers(hour))
            .or_else(|| self.tiers.last())
            .map_or(0.0, |tier| tier.rate)
    }

    /// Cumulative base cost for `billable_hours` whole hours
    ///
    /// Each tier contributes `rate * hours-in-tier`, so the result does not
    /// depend on iterating hour by hour.
    pub fn base_cost(&self, billable_hours: u32) -> f64 {
        self.breakdown(billable_hours)
            .iter()
            .map(|charge| charge.subtotal)
            .sum()
    }

    /// Per-tier split of `billable_hours`; empty for zero hours
    pub fn breakdown(&self, billable_hours: u32) -> Vec<TierCharge> {
        let mut charges = Vec::new();
        if billable_hours == 0 {
            return charges;
        }

        for tier in &self.tiers {
            if tier.from_hour > billable_hours {
                break;
            }
            let to_hour = tier
                .to_hour
                .map_or(billable_hours, |to| to.min(billable_hours));
            // Inverted tiers (to < from) cover no hours.
            let Some(span) = to_hour.checked_sub(tier.from_hour) else {
                continue;
            };
            let hours = span.saturating_add(1);
            charges.push(TierCharge {
                from_hour: tier.from_hour,
                to_hour,
                hours,
                rate: tier.rate,
                subtotal: f64::from(hours) * tier.rate,
            });
        }

        charges
    }
}

/// Round elapsed milliseconds up to whole billable hours
///
/// Negative input (clock skew) counts as zero.
pub fn billable_hours(elapsed_ms: i64) -> u32 {
    if elapsed_ms <= 0 {
        return 0;
    }
    let mut hours = elapsed_ms / MILLIS_PER_HOUR;
    if elapsed_ms % MILLIS_PER_HOUR != 0 {
        hours += 1;
    }
    u32::try_from(hours).unwrap_or(u32::MAX)
}

/// Base cost under the venue table
pub fn base_cost(billable_hours: u32) -> f64 {
    TieredRateTable::venue().base_cost(billable_hours)
}
