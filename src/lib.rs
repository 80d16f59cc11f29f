#![forbid(unsafe_code)]

pub mod batcher;
pub mod config;
pub mod datamodel;
pub mod engine;
pub mod error;
pub mod exposition;
pub mod labels;
pub mod matcher;
pub mod measurement;
pub mod presets;
pub mod provider;
pub mod status;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
