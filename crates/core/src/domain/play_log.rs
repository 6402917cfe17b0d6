// Play Log - historical visits

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};

use super::error::Result;
use super::estimate::{CostEstimate, SessionCostEstimator};
use super::session::{AccountStanding, ElapsedDuration, Session};

/// Sentinel the remote API writes when a visit was never closed
pub const UNCLOSED_SENTINEL: i64 = -1;

/// Shown instead of duration/cost for visits that were never closed
pub const UNCLOSED_LABEL: &str = "未正确离店";

/// Venue local time (Asia/Shanghai, UTC+8, no DST)
const VENUE_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// One recorded visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayLog {
    pub id: i64,
    pub user_id: String,
    pub enter_time: i64,
    pub exit_time: i64,
    pub cost: f64,
}

impl PlayLog {
    /// True when exit or cost carry the `-1` sentinel
    pub fn is_unclosed(&self) -> bool {
        self.exit_time == UNCLOSED_SENTINEL || self.cost == UNCLOSED_SENTINEL as f64
    }

    /// Closed interval of this visit; `None` for unclosed visits
    pub fn session(&self) -> Option<Session> {
        if self.is_unclosed() {
            None
        } else {
            Some(Session::new(self.enter_time, self.exit_time))
        }
    }

    pub fn duration(&self) -> Option<ElapsedDuration> {
        self.session().map(|session| session.elapsed())
    }

    /// Duration column text (`"2小时30分钟0秒"` or the unclosed label)
    pub fn duration_label(&self) -> String {
        self.duration()
            .map(|duration| duration.log_label())
            .unwrap_or_else(|| UNCLOSED_LABEL.to_string())
    }

    /// Cost column text, two decimals
    pub fn cost_label(&self) -> String {
        if self.is_unclosed() {
            UNCLOSED_LABEL.to_string()
        } else {
            format!("{:.2}", self.cost)
        }
    }

    /// What the engine would charge for this visit under `standing`
    pub fn projected_cost(
        &self,
        estimator: &SessionCostEstimator,
        standing: &AccountStanding,
    ) -> Result<Option<CostEstimate>> {
        self.session()
            .map(|session| estimator.estimate(&session, standing))
            .transpose()
    }

    pub fn enter_local(&self) -> Option<DateTime<FixedOffset>> {
        to_venue_time(self.enter_time)
    }

    /// `None` for unclosed visits
    pub fn exit_local(&self) -> Option<DateTime<FixedOffset>> {
        if self.exit_time == UNCLOSED_SENTINEL {
            None
        } else {
            to_venue_time(self.exit_time)
        }
    }
}

/// Epoch milliseconds in venue local time
pub fn to_venue_time(epoch_ms: i64) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(VENUE_UTC_OFFSET_SECS)?;
    offset.timestamp_millis_opt(epoch_ms).single()
}
