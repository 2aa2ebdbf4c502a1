use responsive_timestamps::*;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use config::Args;
use log::info;
use targets::load_targets;

// ===============================
// TERMINAL OUTPUT
// ===============================
fn print_report(report: &TickReport, urgent_window_secs: i64) {
    let header = match report.mode {
        PollMode::Urgent => format!("── urgent, next update in {:?} ──", report.next_interval),
        PollMode::Relaxed => format!("── next update in {:?} ──", report.next_interval),
    };
    println!("{}", header.dimmed());

    for (id, time) in &report.rendered {
        let text = if time.is_expired() {
            time.human_readable.red()
        } else if time.is_urgent(urgent_window_secs) {
            time.human_readable.yellow().bold()
        } else {
            time.human_readable.green()
        };
        println!("{}: {}", id.bold(), text);
    }

    for id in &report.failed {
        println!("{}: {}", id.bold(), "could not be updated".red());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args = Args::parse();
    let config = Config::load(&args.config)?
        .with_env_overrides()
        .with_args(&args);

    // ===============================
    // TARGETS
    // ===============================
    let labels = load_targets(&args.targets)?;
    info!("📋 Loaded {} target(s) from {}", labels.len(), args.targets.display());

    let window = config.polling.urgent_window_secs;
    let mut monitor = CountdownMonitor::new(labels, &config);

    if args.once {
        let report = monitor.tick();
        print_report(&report, window);
        return Ok(());
    }

    // ===============================
    // MAIN LOOP
    // ===============================
    let handle = monitor.start(move |report| print_report(report, window));

    tokio::signal::ctrl_c().await?;
    info!("👋 Shutting down");

    handle.stop().await?;
    Ok(())
}
