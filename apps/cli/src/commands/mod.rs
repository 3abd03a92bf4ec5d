//! 命令定义和实现

pub mod config;
pub mod query;
pub mod ramp;
pub mod scalar;
pub mod synth;
pub mod upload;

pub use config::ConfigCommand;
pub use query::GetCommand;
pub use ramp::RampCommand;
pub use scalar::{SetAmpCommand, SetIntervalCommand, SetPhaseCommand};
pub use synth::SynthCommand;
pub use upload::{Kind, UploadCommand};
