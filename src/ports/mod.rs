//! Ports (interfaces) defining the boundaries of the station
//!
//! Ports are traits that define how the measurement logic touches the world.
//! They keep the domain independent of specific hardware.
//!
//! # Hexagonal Architecture
//!
//! In hexagonal architecture, ports define the "holes" in the hexagon where
//! adapters plug in:
//!
//! - **PowerMonitor**: triggered voltage/current conversions (INA220, mock)
//! - **RelayBank**: the contacts rerouting the panel under test
//! - **WindVane** / **WindSense**: vane angle input and the whole instrument
//! - **EnvironmentSensor**: temperature, pressure, humidity
//! - **Clock**: monotonic microseconds
//! - **TelemetryLink**: report uplink (UART, mock)

pub mod clock;
pub mod environment;
pub mod power_monitor;
pub mod relays;
pub mod telemetry;
pub mod wind;

pub use clock::Clock;
pub use environment::{EnvironmentError, EnvironmentSensor};
pub use power_monitor::{PowerMonitor, PowerMonitorError};
pub use relays::{Relay, RelayBank, RelayError};
pub use telemetry::{TelemetryError, TelemetryLink};
pub use wind::{VaneError, WindError, WindSense, WindVane};
