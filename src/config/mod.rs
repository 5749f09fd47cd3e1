//! Configuration management for the demonstrations

pub mod settings;

pub use settings::{
    Backend, CliOverrides, DigitsConfig, OutputConfig, OutputFormat, PigeonholeConfig,
    PigeonholeEncoding, RiverConfig, Settings, SweepConfig,
};
