//! Field-station firmware for the RP2350 reference board
//!
//! Wires the real hardware into the station and runs the two tasks: a
//! 3-second tick that drives the measurements, and a telemetry task that
//! ships finished reports out over UART.
//!
//! Pin map:
//! - PIN_10..12  counter address lines A/B/C
//! - PIN_13      counter data (multiplexer output)
//! - PIN_14      counter reset, PIN_15 counter enable (active low)
//! - PIN_16..18  short / sense / charger-isolation relay coils
//! - PIN_26      wind vane potentiometer (ADC0)
//! - I2C0        PIN_5 SCL / PIN_4 SDA, INA220 power monitor
//! - I2C1        PIN_7 SCL / PIN_6 SDA, BME280 environment sensor
//! - UART0 TX    PIN_0, 115200 Bd to the collector

#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_probe as _;

use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, I2C1, UART0};
use embassy_rp::uart::{self, UartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Delay, Duration, Ticker};

use boreas_rp::adapters::ina220;
use boreas_rp::{
    AdcVane, Bme280Environment, Clock, DavisWindSense, ElectricalConfig, ElectricalSequencer,
    EmbassyClock, GpioRelayBank, Ina220Monitor, RotationCounter, Station, StationConfig,
    StationReport, TelemetryLink, UartTelemetry, TICK_PERIOD_MS,
};

/// Identity of this station on the collector line.
const DEVICE_ID: u16 = 1;

/// Shunt resistor on the INA220, milliohms.
const SHUNT_MILLIOHMS: i32 = 10;

type BlockingI2c0 = I2c<'static, I2C0, i2c::Blocking>;
type BlockingI2c1 = I2c<'static, I2C1, i2c::Blocking>;
type FieldWind =
    DavisWindSense<Output<'static>, Input<'static>, Delay, AdcVane<'static>, EmbassyClock>;
type FieldStation = Station<
    FieldWind,
    Bme280Environment<BlockingI2c1>,
    Ina220Monitor<BlockingI2c0>,
    GpioRelayBank<'static>,
>;

/// Finished reports on their way to the UART.
static REPORTS: Channel<CriticalSectionRawMutex, StationReport, 4> = Channel::new();

#[embassy_executor::task]
async fn station_task(mut station: FieldStation) {
    let clock = EmbassyClock;
    station.init(clock.now_us());
    let mut ticker = Ticker::every(Duration::from_millis(TICK_PERIOD_MS));
    loop {
        ticker.next().await;
        if let Some(report) = station.tick(clock.now_us()) {
            defmt::info!(
                "report: wind {} cm/s from {} ddeg (gust {}), {} ddegC, aux {} mV, faults {=u16:#x}",
                report.wind.speed_cm_s,
                report.wind.direction_ddeg,
                report.wind.gust_cm_s,
                report.environment.temperature_dc,
                report.electrical.aux_mv,
                report.faulted.bits(),
            );
            if REPORTS.try_send(report).is_err() {
                defmt::warn!("report queue full, dropping");
            }
        }
    }
}

#[embassy_executor::task]
async fn telemetry_task(mut link: UartTelemetry<'static, UART0>) {
    loop {
        let report = REPORTS.receive().await;
        if let Err(error) = link.send_report(&report).await {
            defmt::warn!("telemetry send failed: {}", error);
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    defmt::info!("boreas field station {} up", DEVICE_ID);

    // Wind: rotation counter behind the multiplexer, vane on the ADC.
    // The enable line starts high so the counter holds until init.
    let counter = RotationCounter::new(
        Output::new(p.PIN_10, Level::Low),
        Output::new(p.PIN_11, Level::Low),
        Output::new(p.PIN_12, Level::Low),
        Output::new(p.PIN_14, Level::Low),
        Output::new(p.PIN_15, Level::High),
        Input::new(p.PIN_13, Pull::Down),
        Delay,
    );
    let vane = AdcVane::new(
        Adc::new_blocking(p.ADC, adc::Config::default()),
        adc::Channel::new_pin(p.PIN_26, Pull::None),
    );
    let wind = DavisWindSense::new(counter, vane, EmbassyClock);

    let environment = Bme280Environment::new(I2c::new_blocking(
        p.I2C1,
        p.PIN_7,
        p.PIN_6,
        i2c::Config::default(),
    ));

    let monitor = Ina220Monitor::new(
        I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c::Config::default()),
        ina220::DEFAULT_ADDRESS,
        SHUNT_MILLIOHMS,
    );
    let relays = GpioRelayBank::new(
        Output::new(p.PIN_16, Level::Low),
        Output::new(p.PIN_17, Level::Low),
        Output::new(p.PIN_18, Level::Low),
    );
    let electrical = ElectricalSequencer::new(monitor, relays, ElectricalConfig::FULL);

    let station = Station::new(StationConfig::full(DEVICE_ID), wind, environment, electrical);

    let mut uart_config = uart::Config::default();
    uart_config.baudrate = 115_200;
    let link = UartTelemetry::new(UartTx::new(p.UART0, p.PIN_0, p.DMA_CH0, uart_config));

    spawner.must_spawn(station_task(station));
    spawner.must_spawn(telemetry_task(link));
}
