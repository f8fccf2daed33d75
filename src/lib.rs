//! Boreas Field-Station Firmware Core
//!
//! This library provides a hexagonal architecture for a periodic
//! environmental station: wind from a Davis anemometer behind a hardware
//! rotation counter, ambient conditions from a BME280, and relay-sequenced
//! electrical measurements of the panel and the auxiliary supply. Readings
//! aggregate over a one-minute interval and leave the station as
//! COBS-framed reports.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                                 │
//! │  - IntervalAccumulator, WindAggregator, EnvironmentAggregator   │
//! │  - ElectricalSequencer: relay-dwell measurement state machine   │
//! │  - Rotation-rate and unit conversions                           │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Ports (Traits)                               │
//! │  - WindSense, EnvironmentSensor: subsystem sampling             │
//! │  - PowerMonitor, RelayBank: the electrical bench                │
//! │  - Clock, TelemetryLink: time base and report shipping          │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Drivers & Adapters                           │
//! │  - RotationCounter, DavisWindSense: embedded-hal drivers        │
//! │  - Ina220Monitor, GpioRelayBank, AdcVane (feature "rp")         │
//! │  - Bme280Environment, UartTelemetry, EmbassyClock (feature "rp")│
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Benefits
//!
//! - **Tick driven** - one scheduler tick samples every healthy subsystem
//!   and steps the electrical sequencer without blocking on relay dwell
//! - **Testable** - ports allow mocking the bench, the counter pins and time
//! - **Fail-soft** - a faulted subsystem latches, reports zeros and leaves
//!   the others running until it is reinitialized

#![cfg_attr(not(feature = "std"), no_std)]

// ============================================================================
// Wire format (shared between station and collector)
// ============================================================================

pub mod report;

pub use report::{
    ElectricalRecord, EnvironmentRecord, ReportError, StationReport, SubsystemMask, WindRecord,
    MAX_FRAME_LEN,
};

// ============================================================================
// Hexagonal Architecture
// ============================================================================

/// Domain layer - pure measurement logic
pub mod domain;

/// Ports - traits defining boundaries
pub mod ports;

/// Bit-serial rotation-counter driver
pub mod counter;

/// Davis anemometer acquisition over the counter and the vane
pub mod davis;

/// Tick-driven orchestration of the subsystems
pub mod station;

/// Adapters - RP2350 hardware implementations
#[cfg(feature = "rp")]
pub mod adapters;

// Re-export key domain types
pub use domain::{
    ElectricalAverages, ElectricalConfig, ElectricalFault, ElectricalSequencer,
    EnvironmentAggregator, EnvironmentAverages, EnvironmentSample, IntervalAccumulator, Progress,
    WindAggregator, WindAverages, WindSample,
};

// Re-export key port traits
pub use ports::{
    Clock, EnvironmentSensor, PowerMonitor, RelayBank, TelemetryLink, WindSense, WindVane,
};

// Re-export the drivers and the station front
pub use counter::RotationCounter;
pub use davis::DavisWindSense;
pub use station::{Station, StationConfig, DEFAULT_TICKS_PER_REPORT, TICK_PERIOD_MS};

// Re-export adapters
#[cfg(feature = "rp")]
pub use adapters::{
    AdcVane, Bme280Environment, EmbassyClock, GpioRelayBank, Ina220Monitor, UartTelemetry,
};
