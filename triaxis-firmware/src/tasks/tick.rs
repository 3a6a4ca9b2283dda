//! Telemetry and safety tick
//!
//! A fixed 1 ms ticker, independent of every axis's step rate. Current
//! sampling and averaging cadences are enforced by the telemetry itself
//! from wall-clock time; leak sensors are polled every
//! `poll_interval_ms`.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use triaxis_core::config::ControllerConfig;
use triaxis_core::safety::{LeakMonitor, LeakStatus};
use triaxis_core::telemetry::CurrentTelemetry;
use triaxis_hal_rp2040::{CurrentSenseAdc, RpInput};

use crate::channels::{LEAK_FLAGS, TELEMETRY};

/// Tick interval in milliseconds
pub const TICK_INTERVAL_MS: u64 = 1;

/// Leak sensor lines on the board
pub const LEAK_SENSORS: usize = 3;

#[embassy_executor::task]
pub async fn tick_task(
    mut adc: CurrentSenseAdc<'static>,
    leak_pins: [RpInput<'static>; LEAK_SENSORS],
    config: ControllerConfig,
) {
    info!("Tick task started");

    let mut telemetry = CurrentTelemetry::new(config.current, config.telemetry);
    let mut leaks = LeakMonitor::<LEAK_SENSORS>::new(&config.leak);
    let poll_interval_ms = config.leak.poll_interval_ms as u64;

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    let start = Instant::now();
    let mut last_poll_ms = 0u64;

    loop {
        ticker.next().await;
        let elapsed = start.elapsed();

        if let Err(e) = telemetry.on_tick(elapsed.as_micros(), &mut adc, &TELEMETRY) {
            warn!("Current sample failed: {:?}", e);
        }

        let now_ms = elapsed.as_millis();
        if now_ms - last_poll_ms < poll_interval_ms {
            continue;
        }
        last_poll_ms = now_ms;

        if let Some(status) = leaks.poll(&leak_pins) {
            LEAK_FLAGS.store(leaks.mask());
            match status {
                LeakStatus::Dry => info!("Leak cleared"),
                LeakStatus::Leak { mask } => warn!("Leak detected: mask={:b}", mask),
            }
        }
    }
}
