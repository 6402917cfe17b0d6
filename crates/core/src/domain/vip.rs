// VIP Model - lifetime consumption to discount factor

use serde::Serialize;

/// Spend (currency units) per VIP level
pub const SPEND_PER_LEVEL: f64 = 50.0;

/// Highest reachable VIP level
pub const MAX_VIP_LEVEL: u8 = 100;

/// Discount earned per level (0.5 percentage points)
pub const DISCOUNT_PER_LEVEL: f64 = 0.005;

/// VIP level for a lifetime spend
///
/// `floor(consumption / 50)` clamped to `[0, 100]`. Negative or NaN spend
/// counts as zero.
pub fn vip_level(lifetime_consumption: f64) -> u8 {
    if lifetime_consumption.is_nan() || lifetime_consumption <= 0.0 {
        return 0;
    }
    let level = (lifetime_consumption / SPEND_PER_LEVEL).floor();
    if level >= f64::from(MAX_VIP_LEVEL) {
        MAX_VIP_LEVEL
    } else {
        level as u8
    }
}

/// Price multiplier for a VIP level: 1.0 at level 0 down to 0.5 at level 100
pub fn discount_factor(vip_level: u8) -> f64 {
    let level = vip_level.min(MAX_VIP_LEVEL);
    1.0 - f64::from(level) * DISCOUNT_PER_LEVEL
}

/// Spend needed to reach the next level; `None` at the top level
pub fn next_level_threshold(vip_level: u8) -> Option<f64> {
    if vip_level >= MAX_VIP_LEVEL {
        None
    } else {
        Some(f64::from(vip_level + 1) * SPEND_PER_LEVEL)
    }
}

/// Progress toward the next level as shown on the member card
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VipProgress {
    pub level: u8,
    pub consumption: f64,
    pub next_threshold: Option<f64>,
    /// 0..=100
    pub percent: f64,
}

impl VipProgress {
    pub fn for_consumption(lifetime_consumption: f64) -> Self {
        let consumption = if lifetime_consumption > 0.0 {
            lifetime_consumption
        } else {
            0.0
        };
        let level = vip_level(consumption);
        let next_threshold = next_level_threshold(level);
        let percent = match next_threshold {
            Some(threshold) => (consumption / threshold * 100.0).min(100.0),
            None => 100.0,
        };

        Self {
            level,
            consumption,
            next_threshold,
            percent,
        }
    }

    pub fn is_max(&self) -> bool {
        self.next_threshold.is_none()
    }
}

/// VIP factor combined with the account's own multiplier
pub fn combined_discount(vip_level: u8, account_multiplier: f64) -> f64 {
    discount_factor(vip_level) * account_multiplier
}

/// Member-facing label for a combined discount
///
/// `0` is free ("免费"), anything in (0, 1) is shown in tenths ("8.0折"),
/// everything else is "无折扣".
pub fn discount_label(combined: f64) -> String {
    if combined == 0.0 {
        "免费".to_string()
    } else if combined > 0.0 && combined < 1.0 {
        format!("{:.1}折", combined * 10.0)
    } else {
        "无折扣".to_string()
    }
}
