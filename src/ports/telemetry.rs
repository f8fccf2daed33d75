//! Telemetry port - shipping finished reports off the station
//!
//! The station hands over one encoded report per interval and does not care
//! what carries it (UART in the field units). Delivery guarantees are the
//! receiver's problem; a failed send is logged and the report dropped.

use crate::report::StationReport;

/// Error type for telemetry operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum TelemetryError {
    /// The report did not fit the frame buffer.
    EncodeFailed,
    /// The transport refused the frame.
    SendFailed,
}

/// Port for the report uplink.
pub trait TelemetryLink {
    /// Encode and transmit one report.
    fn send_report(
        &mut self,
        report: &StationReport,
    ) -> impl core::future::Future<Output = Result<(), TelemetryError>>;
}
