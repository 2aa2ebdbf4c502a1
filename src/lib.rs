pub mod config;
pub mod domain;
pub mod logging;
pub mod monitor;
pub mod targets;

pub use config::{Config, PollingConfig, WidgetConfig};
pub use domain::time::{compute_remaining, Clock, FixedClock, SystemClock};
pub use domain::{Label, RemainingTime, Target, TargetError};
pub use monitor::{CountdownMonitor, MonitorHandle, PollMode, TickReport};
