//! Adapters - concrete implementations of ports
//!
//! Adapters connect the domain to the outside world by implementing
//! the port traits. Everything in here is specific to the RP2350 board
//! build: embassy-rp peripherals plus the sensor drivers they feed.
//!
//! # Available Adapters
//!
//! - **ina220**: INA220 power monitor via I2C, triggered conversions
//! - **relay_gpio**: measurement relay coils on push-pull GPIO
//! - **vane_adc**: potentiometer wind vane on the onboard ADC
//! - **bme280_env**: BME280 temperature/pressure/humidity via I2C
//! - **uart_link**: COBS-framed station reports over UART
//! - **embassy_clock**: monotonic microsecond time base

pub mod bme280_env;
pub mod embassy_clock;
pub mod ina220;
pub mod relay_gpio;
pub mod uart_link;
pub mod vane_adc;

pub use bme280_env::Bme280Environment;
pub use embassy_clock::EmbassyClock;
pub use ina220::Ina220Monitor;
pub use relay_gpio::GpioRelayBank;
pub use uart_link::UartTelemetry;
pub use vane_adc::AdcVane;
