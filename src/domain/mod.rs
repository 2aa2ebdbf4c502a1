use std::sync::{Arc, Mutex, MutexGuard};

pub mod errors;
pub mod time;

pub use errors::TargetError;

// ==================================================
// REMAINING TIME
// ==================================================

/// Time left until a target expires, recomputed every tick.
///
/// Each unit is the whole number of that unit left, truncated toward zero
/// independently of the others (so 3725s is 62 minutes and 1 hour).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemainingTime {
    pub seconds: i64,
    pub minutes: i64,
    pub hours: i64,
    pub days: i64,
    pub human_readable: String,
}

impl RemainingTime {
    pub fn is_expired(&self) -> bool {
        self.seconds < 1
    }

    /// Expiring within `window_secs` but not expired yet
    pub fn is_urgent(&self, window_secs: i64) -> bool {
        self.seconds > 0 && self.seconds < window_secs
    }
}

// ==================================================
// TARGETS
// ==================================================

/// Something that shows an expiration countdown.
///
/// The monitor only reads `expiration` and replaces the displayed text.
pub trait Target {
    fn id(&self) -> &str;

    /// Unix seconds, or `None` when the host value is not a number
    fn expiration(&self) -> Option<i64>;

    fn render(&mut self, text: &str) -> Result<(), TargetError>;
}

/// Shared handle to a piece of text. Clones see the same text, so a host can
/// hand one clone to the monitor and keep another for display.
#[derive(Debug, Clone)]
pub struct Label {
    id: String,
    expiration: Option<i64>,
    text: Arc<Mutex<String>>,
}

impl Label {
    pub fn new(id: impl Into<String>, expiration: Option<i64>) -> Self {
        Self {
            id: id.into(),
            expiration,
            text: Arc::new(Mutex::new(String::new())),
        }
    }

    pub fn text(&self) -> String {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        // a panicked writer cannot leave a half-written String behind
        self.text.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Target for Label {
    fn id(&self) -> &str {
        &self.id
    }

    fn expiration(&self) -> Option<i64> {
        self.expiration
    }

    fn render(&mut self, text: &str) -> Result<(), TargetError> {
        let mut current = self.lock();
        current.clear();
        current.push_str(text);
        Ok(())
    }
}
