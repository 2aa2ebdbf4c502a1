use chrono::Utc;
use serde_json::Value;

use super::RemainingTime;
use crate::config::WidgetConfig;

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Source of "now", so frozen time can be used in tests.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl FixedClock {
    pub fn at_seconds(seconds: i64) -> Self {
        Self(seconds.saturating_mul(MS_PER_SECOND))
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// Break the time left until `expiration` (Unix seconds) into whole units and
/// pick a label from the largest non-zero one.
///
/// A missing expiration counts as "now", so it renders as expired.
pub fn compute_remaining(
    expiration: Option<i64>,
    config: &WidgetConfig,
    clock: &dyn Clock,
) -> RemainingTime {
    let now_ms = clock.now_millis();
    let expiration_ms = expiration
        .map(|secs| secs.saturating_mul(MS_PER_SECOND))
        .unwrap_or(now_ms);
    let remaining_ms = expiration_ms.saturating_sub(now_ms);

    // integer division truncates toward zero for negative values too
    let seconds = remaining_ms / MS_PER_SECOND;
    let minutes = remaining_ms / MS_PER_MINUTE;
    let hours = remaining_ms / MS_PER_HOUR;
    let days = remaining_ms / MS_PER_DAY;

    let human_readable = if seconds < 1 {
        config.expired_message.clone()
    } else if days > 0 {
        in_units(days, "day")
    } else if hours > 0 {
        in_units(hours, "hour")
    } else if minutes > 0 {
        in_units(minutes, "minute")
    } else {
        in_units(seconds, "second")
    };

    RemainingTime {
        seconds,
        minutes,
        hours,
        days,
        human_readable,
    }
}

fn in_units(count: i64, unit: &str) -> String {
    format!("In {} {}{}", count, unit, if count != 1 { "s" } else { "" })
}

/// Read an `expiration` attribute. Numbers and numeric strings are accepted,
/// everything else is `None`.
///
/// Expirations are whole Unix seconds, so fractional values are truncated
/// here. A label can therefore run up to one second ahead of a fractional
/// expiration: `now + 60.5` read at `now + 0.2` shows "In 59 seconds".
pub fn parse_expiration(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}
