//! Domain layer - pure measurement logic independent of hardware
//!
//! Everything in here is deterministic over its inputs: sample reduction,
//! unit conversion and the relay measurement cycle. Hardware access only
//! enters through the port traits the sequencer is generic over.

pub mod accumulator;
pub mod electrical;
pub mod environment;
pub mod speed;
pub mod wind;

pub use accumulator::IntervalAccumulator;
pub use electrical::{
    ElectricalAverages, ElectricalConfig, ElectricalFault, ElectricalSequencer, Progress,
    SequencerState, SwitchTimer,
};
pub use environment::{EnvironmentAggregator, EnvironmentAverages, EnvironmentSample};
pub use speed::{speed_cm_s, RateError};
pub use wind::{DirectionHistogram, GustTracker, WindAggregator, WindAverages, WindSample};
