//! UART telemetry adapter
//!
//! This adapter implements the TelemetryLink port over a DMA-driven UART
//! transmitter. Reports go out as COBS frames, so the collector can resync
//! on the zero delimiter whatever state the line was in.

use embassy_rp::uart::{Async, Instance, UartTx};

use crate::ports::telemetry::{TelemetryError, TelemetryLink};
use crate::report::{StationReport, MAX_FRAME_LEN};

/// UART telemetry adapter
///
/// Transmit-only: the station talks, the collector listens.
pub struct UartTelemetry<'d, T: Instance> {
    tx: UartTx<'d, T, Async>,
}

impl<'d, T: Instance> UartTelemetry<'d, T> {
    pub fn new(tx: UartTx<'d, T, Async>) -> Self {
        Self { tx }
    }
}

impl<T: Instance> TelemetryLink for UartTelemetry<'_, T> {
    async fn send_report(&mut self, report: &StationReport) -> Result<(), TelemetryError> {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let frame = report
            .encode(&mut buf)
            .map_err(|_| TelemetryError::EncodeFailed)?;
        self.tx
            .write(frame)
            .await
            .map_err(|_| TelemetryError::SendFailed)
    }
}
