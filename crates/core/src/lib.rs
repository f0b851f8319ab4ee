//! bandblur-core: distributed grayscale image smoothing
//!
//! This library provides the core components for a pipeline that:
//! - Loads a bitmap image into a grayscale raster
//! - Partitions its rows into bands across a fixed set of workers
//! - Ships each band to its worker over a blocking point-to-point transport
//! - Smooths each band with a fixed 3x3 kernel
//! - Gathers the processed bands and writes the result back out
//!
//! # Architecture
//!
//! The system is designed around clear module boundaries:
//! - `raster`: in-memory grayscale pixel grid
//! - `bmp`: bitmap file decoding/encoding
//! - `partition`: row-band assignment across workers
//! - `band`: the band unit of work and its wire format
//! - `convolve`: the fixed smoothing kernel and filter
//! - `transport`: blocking rank-to-rank message passing
//! - `pipeline`: coordinator and worker role strategies
//! - `metrics`: observable run behavior
//!
//! # Design Principles
//!
//! - **No panics**: all fallible operations return structured errors
//! - **Exclusive ownership**: pixel data crosses role boundaries by
//!   value; no memory is shared between ranks
//! - **Fail fast**: any error aborts the run; there is no partial output
//! - **Explicit geometry**: every band frame carries its own dimensions,
//!   so a worker never guesses what it was handed

pub mod band;
pub mod bmp;
pub mod convolve;
pub mod error;
pub mod metrics;
pub mod partition;
pub mod pipeline;
pub mod raster;
pub mod transport;

// Re-export commonly used types
pub use error::{Error, Result};
