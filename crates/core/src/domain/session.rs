// Session Domain Model

use serde::{Deserialize, Serialize};

use super::error::{DomainError, Result};

const MILLIS_PER_SECOND: i64 = 1000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Label shown when less than a whole minute has elapsed
pub const UNDER_ONE_MINUTE_LABEL: &str = "不到1分钟";

/// Parse a raw epoch-millisecond timestamp
///
/// Rejects empty and non-integer input instead of defaulting to zero.
pub fn parse_timestamp(field: &str, raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid(format!("missing {}", field)));
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| DomainError::invalid(format!("{} must be a valid number: {:?}", field, raw)))
}

/// An open interval in the venue, `enter_ms` to a reference "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub enter_ms: i64,
    pub reference_ms: i64,
}

impl Session {
    pub fn new(enter_ms: i64, reference_ms: i64) -> Self {
        Self {
            enter_ms,
            reference_ms,
        }
    }

    /// Build from raw text inputs (form fields, CLI args)
    pub fn parse(enter: &str, reference: &str) -> Result<Self> {
        Ok(Self::new(
            parse_timestamp("enterTimestamp", enter)?,
            parse_timestamp("referenceTimestamp", reference)?,
        ))
    }

    /// Elapsed milliseconds, clamped to zero on clock skew
    pub fn elapsed_ms(&self) -> i64 {
        self.reference_ms.saturating_sub(self.enter_ms).max(0)
    }

    pub fn elapsed(&self) -> ElapsedDuration {
        ElapsedDuration::from_millis(self.elapsed_ms())
    }
}

/// Mixed-radix breakdown of an elapsed duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ElapsedDuration {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl ElapsedDuration {
    pub fn from_millis(ms: i64) -> Self {
        let ms = ms.max(0);
        Self {
            days: ms / MILLIS_PER_DAY,
            hours: (ms % MILLIS_PER_DAY) / MILLIS_PER_HOUR,
            minutes: (ms % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE,
            seconds: (ms % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND,
        }
    }

    /// Live-session label: `"{d}天 {h}小时 {m}分钟"` with zero units omitted
    pub fn label(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if self.days > 0 {
            parts.push(format!("{}天", self.days));
        }
        if self.hours > 0 {
            parts.push(format!("{}小时", self.hours));
        }
        if self.minutes > 0 {
            parts.push(format!("{}分钟", self.minutes));
        }

        if parts.is_empty() {
            UNDER_ONE_MINUTE_LABEL.to_string()
        } else {
            parts.join(" ")
        }
    }

    /// Play-log label: once a larger unit is shown every smaller one is too,
    /// and seconds are always shown (`"1天0小时5分钟3秒"`)
    pub fn log_label(&self) -> String {
        let mut out = String::new();
        let show_days = self.days > 0;
        let show_hours = show_days || self.hours > 0;
        let show_minutes = show_hours || self.minutes > 0;

        if show_days {
            out.push_str(&format!("{}天", self.days));
        }
        if show_hours {
            out.push_str(&format!("{}小时", self.hours));
        }
        if show_minutes {
            out.push_str(&format!("{}分钟", self.minutes));
        }
        out.push_str(&format!("{}秒", self.seconds));
        out
    }
}

/// Read-only snapshot of an account's billing inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccountStanding {
    pub lifetime_consumption: f64,
    /// In `[0, 1]`; `1.0` means no account discount
    pub account_discount_multiplier: f64,
}

impl AccountStanding {
    /// Validate and normalise raw values
    ///
    /// Non-finite values and multipliers outside `[0, 1]` are rejected;
    /// negative consumption is treated as zero.
    pub fn new(lifetime_consumption: f64, account_discount_multiplier: f64) -> Result<Self> {
        if !lifetime_consumption.is_finite() {
            return Err(DomainError::invalid(format!(
                "consumption must be a finite number, got {}",
                lifetime_consumption
            )));
        }
        if !account_discount_multiplier.is_finite()
            || !(0.0..=1.0).contains(&account_discount_multiplier)
        {
            return Err(DomainError::invalid(format!(
                "discount must be within [0, 1], got {}",
                account_discount_multiplier
            )));
        }

        Ok(Self {
            lifetime_consumption: lifetime_consumption.max(0.0),
            account_discount_multiplier,
        })
    }

    /// New member: no spend, no account discount
    pub fn full_price() -> Self {
        Self {
            lifetime_consumption: 0.0,
            account_discount_multiplier: 1.0,
        }
    }
}

/// Whether the member is currently inside the venue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    NotInVenue,
    InVenue { enter_ms: i64 },
}

impl SessionStatus {
    pub fn from_enter_timestamp(enter: Option<i64>) -> Self {
        match enter {
            Some(enter_ms) => SessionStatus::InVenue { enter_ms },
            None => SessionStatus::NotInVenue,
        }
    }

    pub fn is_in_venue(&self) -> bool {
        matches!(self, SessionStatus::InVenue { .. })
    }
}

/// Account record as supplied by the remote account/session provider
///
/// Fields are optional on the wire; validation happens in
/// [`AccountSnapshot::standing`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub enter_timestamp: Option<i64>,
    #[serde(default)]
    pub consumption: Option<f64>,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub play_count: Option<u32>,
}

impl AccountSnapshot {
    pub fn status(&self) -> SessionStatus {
        SessionStatus::from_enter_timestamp(self.enter_timestamp)
    }

    pub fn standing(&self) -> Result<AccountStanding> {
        let consumption = self
            .consumption
            .ok_or_else(|| DomainError::invalid("missing consumption"))?;
        let discount = self
            .discount
            .ok_or_else(|| DomainError::invalid("missing discount"))?;
        AccountStanding::new(consumption, discount)
    }

    /// Session against `now_ms`, or `None` when not in venue
    pub fn session_at(&self, now_ms: i64) -> Option<Session> {
        self.enter_timestamp
            .map(|enter_ms| Session::new(enter_ms, now_ms))
    }
}
