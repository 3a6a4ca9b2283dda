//! Triaxis - Three-Axis Stepper Controller Firmware
//!
//! Main firmware binary for RP2040-based pump controllers. Three
//! step/direction axes are driven from a framed serial protocol while
//! per-axis current and leak sensors are sampled in the background.
//!
//! Executors, highest priority first:
//! - SWI_IRQ_1: per-axis step tasks
//! - SWI_IRQ_0: telemetry and leak tick
//! - thread mode: serial command handling

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use triaxis_core::command::{AxisIo, CommandHandler};
use triaxis_core::config::ControllerConfig;
use triaxis_core::scheduler::StepScheduler;
use triaxis_hal_rp2040::{CurrentSenseAdc, RpInput, RpOutput};
use triaxis_protocol::AxisId;

use crate::channels::{AXES, STEP_TIMERS, TELEMETRY};

mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_MED: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

#[interrupt]
unsafe fn SWI_IRQ_0() {
    EXECUTOR_MED.on_interrupt()
}

#[entry]
fn main() -> ! {
    info!("Triaxis firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = ControllerConfig::default();
    if let Err(e) = config.validate() {
        error!("Invalid controller configuration: {:?}", e);
    }
    info!(
        "Motion: {} steps/rev, {} RPM default, ramp {} ms",
        config.motion.steps_per_rev,
        config.motion.default_rpm,
        (config.motion.ramp_time_s * 1000.0) as u32
    );

    // Host link on UART0 (GPIO0 TX, GPIO1 RX), 115200 baud default
    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 64]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    info!("UART initialized for host communication");

    // Direction low (forward), enable high (de-energised)
    let io = [
        AxisIo {
            timer: &STEP_TIMERS[0],
            direction: RpOutput::new(Output::new(p.PIN_3, Level::Low)),
            enable: RpOutput::new(Output::new(p.PIN_4, Level::High)),
        },
        AxisIo {
            timer: &STEP_TIMERS[1],
            direction: RpOutput::new(Output::new(p.PIN_6, Level::Low)),
            enable: RpOutput::new(Output::new(p.PIN_7, Level::High)),
        },
        AxisIo {
            timer: &STEP_TIMERS[2],
            direction: RpOutput::new(Output::new(p.PIN_9, Level::Low)),
            enable: RpOutput::new(Output::new(p.PIN_10, Level::High)),
        },
    ];
    let handler = CommandHandler::new(&AXES, &TELEMETRY, config.motion, io);
    info!("Axes configured");

    // Current sensors on ADC0..2, leak sensors pulled up on GPIO11..13
    let adc = CurrentSenseAdc::new(
        Adc::new_blocking(p.ADC, AdcConfig::default()),
        [
            Channel::new_pin(p.PIN_26, Pull::None),
            Channel::new_pin(p.PIN_27, Pull::None),
            Channel::new_pin(p.PIN_28, Pull::None),
        ],
    );
    let leak_pins = [
        RpInput::new(Input::new(p.PIN_11, Pull::Up)),
        RpInput::new(Input::new(p.PIN_12, Pull::Up)),
        RpInput::new(Input::new(p.PIN_13, Pull::Up)),
    ];

    // Step generation preempts everything else
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    let scheduler = StepScheduler::new(config.motion);
    high.spawn(tasks::step_task(
        AxisId::AXIS_1,
        &STEP_TIMERS[0],
        RpOutput::new(Output::new(p.PIN_2, Level::Low)),
        scheduler,
    ))
    .unwrap();
    high.spawn(tasks::step_task(
        AxisId::AXIS_2,
        &STEP_TIMERS[1],
        RpOutput::new(Output::new(p.PIN_5, Level::Low)),
        scheduler,
    ))
    .unwrap();
    high.spawn(tasks::step_task(
        AxisId::AXIS_3,
        &STEP_TIMERS[2],
        RpOutput::new(Output::new(p.PIN_8, Level::Low)),
        scheduler,
    ))
    .unwrap();

    interrupt::SWI_IRQ_0.set_priority(Priority::P3);
    let med = EXECUTOR_MED.start(interrupt::SWI_IRQ_0);
    med.spawn(tasks::tick_task(adc, leak_pins, config)).unwrap();

    info!("All interrupt tasks spawned, firmware running");

    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(tasks::serial_task(rx, tx, handler)).unwrap();
    })
}
