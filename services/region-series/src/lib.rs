//! Region Series Library
//!
//! Reads gridded model output, masks it with a region boundary and writes
//! the regional mean of every time step as a CSV time series.

pub mod config;
pub mod discovery;
pub mod output;
pub mod pipeline;
pub mod readers;
