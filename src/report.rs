//! Station report wire format
//!
//! One report per averaging interval travels from the station to the
//! collector. Reports are serialized with `postcard` and COBS-framed so the
//! collector can resynchronize on the zero delimiter after line noise.
//!
//! All three subsystem records are always present on the wire; the
//! `configured` and `faulted` masks say which of them carry live data.

use serde::{Deserialize, Serialize};

use crate::domain::electrical::ElectricalAverages;
use crate::domain::environment::EnvironmentAverages;
use crate::domain::wind::WindAverages;

/// Upper bound on an encoded report frame, COBS overhead included.
pub const MAX_FRAME_LEN: usize = 96;

/// Framing error at the telemetry boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum ReportError {
    /// The report did not fit the frame buffer.
    Encode,
    /// The frame did not decode to a report.
    Decode,
}

impl core::fmt::Display for ReportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReportError::Encode => f.write_str("report does not fit the frame buffer"),
            ReportError::Decode => f.write_str("frame does not decode to a report"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ReportError {}

/// Bit set naming the station subsystems in the control word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, defmt::Format)]
pub struct SubsystemMask(pub u16);

impl SubsystemMask {
    pub const EMPTY: Self = Self(0);
    /// Anemometer and vane.
    pub const WIND: Self = Self(1 << 8);
    /// Temperature, pressure and humidity sensing.
    pub const ENVIRONMENT: Self = Self(1 << 9);
    /// Relay-sequenced electrical measurements.
    pub const ELECTRICAL: Self = Self(1 << 10);
    /// The telemetry link itself.
    pub const REPORTING: Self = Self(1 << 12);

    /// Raw control-word bits.
    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl Default for SubsystemMask {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl core::ops::BitOr for SubsystemMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Averaged wind interval as reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, defmt::Format)]
pub struct WindRecord {
    /// Mean speed over the interval, cm/s.
    pub speed_cm_s: i32,
    /// Most frequent direction over the interval, deci-degrees from north.
    pub direction_ddeg: i32,
    /// Peak speed seen in the interval, cm/s.
    pub gust_cm_s: i32,
}

impl From<WindAverages> for WindRecord {
    fn from(averages: WindAverages) -> Self {
        Self {
            speed_cm_s: averages.speed_cm_s,
            direction_ddeg: averages.direction_ddeg,
            gust_cm_s: averages.gust_cm_s,
        }
    }
}

/// Averaged ambient conditions as reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, defmt::Format)]
pub struct EnvironmentRecord {
    /// Air temperature, deci-degrees Celsius.
    pub temperature_dc: i32,
    /// Barometric pressure, deci-hectopascals.
    pub pressure_dhpa: i32,
    /// Relative humidity, deci-percent.
    pub humidity_dpct: i32,
}

impl From<EnvironmentAverages> for EnvironmentRecord {
    fn from(averages: EnvironmentAverages) -> Self {
        Self {
            temperature_dc: averages.temperature_dc,
            pressure_dhpa: averages.pressure_dhpa,
            humidity_dpct: averages.humidity_dpct,
        }
    }
}

/// Averaged electrical interval as reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, defmt::Format)]
pub struct ElectricalRecord {
    /// Auxiliary supply voltage, millivolts.
    pub aux_mv: i32,
    /// Panel open-circuit voltage, millivolts.
    pub open_circuit_mv: i32,
    /// Panel short-circuit current, milliamps.
    pub short_circuit_ma: i32,
}

impl From<ElectricalAverages> for ElectricalRecord {
    fn from(averages: ElectricalAverages) -> Self {
        Self {
            aux_mv: averages.aux_mv,
            open_circuit_mv: averages.open_circuit_mv,
            short_circuit_ma: averages.short_circuit_ma,
        }
    }
}

/// One averaging interval from one station.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, defmt::Format)]
pub struct StationReport {
    /// Station identity on a shared collector line.
    pub device_id: u16,
    /// Subsystems this station is fitted with.
    pub configured: SubsystemMask,
    /// Subsystems currently latched faulted.
    pub faulted: SubsystemMask,
    pub wind: WindRecord,
    pub environment: EnvironmentRecord,
    pub electrical: ElectricalRecord,
}

impl StationReport {
    /// Serialize into `buf` and return the COBS frame, delimiter included.
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a [u8], ReportError> {
        postcard::to_slice_cobs(self, buf)
            .map(|frame| &*frame)
            .map_err(|_| ReportError::Encode)
    }

    /// Decode one COBS frame back into a report.
    ///
    /// The frame is decoded in place, so the buffer contents are consumed.
    pub fn from_frame(frame: &mut [u8]) -> Result<Self, ReportError> {
        postcard::from_bytes_cobs(frame).map_err(|_| ReportError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> StationReport {
        StationReport {
            device_id: 7,
            configured: SubsystemMask::WIND | SubsystemMask::ELECTRICAL | SubsystemMask::REPORTING,
            faulted: SubsystemMask::WIND,
            wind: WindRecord {
                speed_cm_s: 0,
                direction_ddeg: 0,
                gust_cm_s: 0,
            },
            environment: EnvironmentRecord {
                temperature_dc: -125,
                pressure_dhpa: 10132,
                humidity_dpct: 473,
            },
            electrical: ElectricalRecord {
                aux_mv: 12801,
                open_circuit_mv: 19502,
                short_circuit_ma: 1347,
            },
        }
    }

    #[test]
    fn mask_algebra_tracks_subsystems() {
        let mut mask = SubsystemMask::WIND | SubsystemMask::ENVIRONMENT;
        assert!(mask.contains(SubsystemMask::WIND));
        assert!(!mask.contains(SubsystemMask::ELECTRICAL));
        mask.insert(SubsystemMask::ELECTRICAL);
        mask.remove(SubsystemMask::WIND);
        assert_eq!(mask.bits(), (1 << 9) | (1 << 10));
        mask.remove(SubsystemMask::ENVIRONMENT | SubsystemMask::ELECTRICAL);
        assert!(mask.is_empty());
    }

    #[test]
    fn report_survives_the_wire() {
        let report = sample_report();
        let mut buf = [0u8; MAX_FRAME_LEN];
        let frame_len = report.encode(&mut buf).unwrap().len();
        assert!(frame_len <= MAX_FRAME_LEN);
        let decoded = StationReport::from_frame(&mut buf[..frame_len]).unwrap();
        assert_eq!(decoded, report);
    }

    #[test]
    fn encode_rejects_a_short_buffer() {
        let mut buf = [0u8; 4];
        assert_eq!(sample_report().encode(&mut buf), Err(ReportError::Encode));
    }
}
