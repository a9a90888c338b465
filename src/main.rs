//! ==============================================================================
//! main.rs - weather panel host entry point
//! ==============================================================================
//!
//! purpose:
//!     single-task control loop. every pass it consults the scheduler and, in
//!     order, possibly refreshes the cloud session, possibly runs a full
//!     acquisition cycle (acquire -> forward -> display), and possibly appends
//!     a pressure history point.
//!
//! failure policy:
//!     any acquisition-stage failure marks the session invalid and arms the
//!     short retry trigger; the next attempt re-authenticates first. telemetry
//!     failure is best-effort and only flips the status indicator color.
//!
//! relationships:
//!     - uses: sched.rs (when to act), session.rs / acquire.rs (cloud calls),
//!       telemetry.rs (bulk update), display.rs (panel refresh)
//!
//! ==============================================================================

use anyhow::Result;
use std::time::{Duration, Instant};

use weatherpanel_host::acquire::acquire;
use weatherpanel_host::cloud::CloudClient;
use weatherpanel_host::config::PanelConfig;
use weatherpanel_host::display::{update_panel, ConsoleSink, DisplaySink};
use weatherpanel_host::domain::PanelContext;
use weatherpanel_host::sched::{Intervals, Scheduler};
use weatherpanel_host::session::authenticate;
use weatherpanel_host::telemetry::TelemetryClient;
use weatherpanel_host::timefmt;

/// outer loop pass period; every scheduled action is checked once per tick
const TICK: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<()> {
    println!("===========================================================");
    println!("  Weather Panel Host");
    println!("===========================================================");

    let config = PanelConfig::load_or_default();
    config.print_summary();

    let cloud = CloudClient::new(config.cloud.base_url.clone(), config.settling_delay());
    let telemetry = TelemetryClient::new(
        config.telemetry.base_url.clone(),
        config.telemetry.channel_id,
        config.telemetry.write_api_key.clone(),
    );
    let mut sink = ConsoleSink;
    let mut ctx = PanelContext::default();
    let mut sched = Scheduler::new(Instant::now(), Intervals::from_config(&config.intervals));

    println!("[RUNTIME] Starting control loop");
    loop {
        let now = Instant::now();

        // session refresh: on its own long cadence, and forced before any
        // cycle attempt while the session is flagged invalid
        if sched.token_refresh_due(now) || (sched.cycle_due(now) && !ctx.session.valid) {
            match authenticate(&cloud, &config.cloud.email, &config.cloud.password).await {
                Ok(session) => {
                    println!("[SESSION] Authenticated");
                    ctx.session = session;
                    sched.note_token_refreshed(now);
                }
                Err(e) => {
                    println!("[SESSION] ⚠ {}", e);
                    ctx.last_cycle_ok = false;
                    ctx.status_text = format!("Login failed: {}", e);
                    // push the refresh deadline out too; the armed retry plus
                    // the invalid-session check above re-authenticates at the
                    // retry cadence, not once per tick
                    sched.note_token_refreshed(now);
                    sched.note_cycle_failure(now);
                    update_panel(&mut sink, &ctx, &config.thresholds);
                }
            }
        }

        if ctx.session.valid && sched.cycle_due(now) {
            match acquire(&cloud, &ctx.session, &config.cloud.sensors, &mut ctx.readings).await {
                Ok(()) => {
                    ctx.last_cycle_ok = true;
                    ctx.status_text = match timefmt::to_local_display(&timefmt::now_observed()) {
                        Ok(clock) => format!("Updated {}", clock),
                        Err(_) => "Updated".to_string(),
                    };
                    sched.note_cycle_success(now);

                    // best-effort mirror; result only colors the status line
                    ctx.last_forward_ok = telemetry.forward(&ctx.readings).await;
                    if !ctx.last_forward_ok {
                        println!("[TELEMETRY] ⚠ Bulk update not acknowledged");
                    }
                }
                Err(e) => {
                    println!("[ACQUIRE] ⚠ {}", e);
                    ctx.last_cycle_ok = false;
                    ctx.session.invalidate();
                    ctx.status_text = e.status_text();
                    sched.note_cycle_failure(now);
                }
            }
            update_panel(&mut sink, &ctx, &config.thresholds);
        }

        if sched.chart_due(now) && ctx.last_cycle_ok {
            if let Some(pressure) = ctx.readings.slot(0).pressure_inhg {
                sink.append_pressure_point(pressure);
            }
            sched.note_chart_done(now);
        }

        tokio::time::sleep(TICK).await;
    }
}
