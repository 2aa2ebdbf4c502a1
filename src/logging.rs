use crate::domain::TargetError;
use crate::monitor::PollMode;
use log::{debug, info, warn};
use std::time::Duration;

pub fn log_start(targets: usize) {
    info!("⏳ Countdown monitor starting with {} target(s)", targets);
}

pub fn log_stop() {
    info!("🛑 Countdown monitor stopped");
}

pub fn log_mode_change(mode: PollMode, interval: Duration) {
    match mode {
        PollMode::Urgent => info!("⏰ Target expiring within a minute, polling every {:?}", interval),
        PollMode::Relaxed => info!("😴 Nothing urgent, polling every {:?}", interval),
    }
}

pub fn log_render_failure(err: &TargetError) {
    warn!("⚠️ {}", err);
}

pub fn log_tick(rendered: usize, expired: usize, next: Duration) {
    debug!(
        "🔁 Rendered {} target(s), {} expired, next tick in {:?}",
        rendered, expired, next
    );
}
