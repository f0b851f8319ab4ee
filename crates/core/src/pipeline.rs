//! Role-based pipeline: distribute, filter, gather.
//!
//! Every group member runs the same program and branches once, at
//! startup, on its rank: rank 0 becomes the coordinator, every other
//! rank a worker. The two roles are explicit strategies behind a common
//! [`Role`] trait so each can be driven and tested on its own.
//!
//! # Coordinator protocol (rank 0)
//!
//! 1. Decode the source image. A decode failure aborts the run before
//!    any band is sent; no partial processing, no output file.
//! 2. Plan the partition for `group_size - 1` workers.
//! 3. Cut each worker's band out of the raster and send its wire frame.
//! 4. Receive processed bands back in strict rank order, blocking on
//!    each rank before moving to the next. Correctness doesn't depend on
//!    completion order (every band is uniquely addressed); the order is
//!    the reproduced scheme.
//! 5. Splice each returned band over the original rows in place.
//! 6. Encode, persist, and print a confirmation naming the output file.
//!
//! # Worker protocol (rank >= 1)
//!
//! Receive one band frame (its header carries the geometry; a worker
//! never learns the full image dimensions), smooth it, send it back.

use crate::band::Band;
use crate::bmp;
use crate::convolve::{smooth_band, Kernel, SMOOTHING_KERNEL};
use crate::error::{BandError, ConfigError, Result};
use crate::metrics::PipelineMetrics;
use crate::partition;
use crate::transport::{Transport, COORDINATOR_RANK};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A pipeline role, selected once by rank at startup.
pub trait Role {
    /// Run this role to completion over the given transport.
    fn run(&mut self, transport: &mut dyn Transport) -> Result<()>;
}

/// Select the role for a rank.
///
/// The rank and group size come from whoever formed the group; the
/// paths are only meaningful for rank 0.
pub fn role_for(rank: usize, source: &Path, dest: &Path) -> Box<dyn Role> {
    if rank == COORDINATOR_RANK {
        Box::new(CoordinatorRole::new(source, dest))
    } else {
        Box::new(WorkerRole::new())
    }
}

/// Rank 0: owns the full image, distributes bands, gathers results.
pub struct CoordinatorRole {
    source: PathBuf,
    dest: PathBuf,
    metrics: PipelineMetrics,
}

impl CoordinatorRole {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            dest: dest.as_ref().to_path_buf(),
            metrics: PipelineMetrics::new(),
        }
    }

    /// Counters for the last run.
    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }
}

impl Role for CoordinatorRole {
    fn run(&mut self, transport: &mut dyn Transport) -> Result<()> {
        let worker_count = transport.group_size() - 1;

        // Fail fast: nothing has been sent yet, so a bad image aborts
        // the whole group with no partial processing.
        let mut raster = bmp::read_file(&self.source)?;
        self.metrics.image_width = raster.width();
        self.metrics.image_height = raster.height();

        let assignment = partition::plan(raster.height(), worker_count)?;
        if assignment.rows_per_worker() == 0 {
            return Err(ConfigError::WorkersExceedRows {
                workers: worker_count,
                height: raster.height(),
            }
            .into());
        }

        let leftover = assignment.leftover_rows();
        self.metrics.rows_assigned = (assignment.rows_per_worker() * worker_count) as u64;
        self.metrics.rows_leftover = leftover.len() as u64;

        info!(
            width = raster.width(),
            height = raster.height(),
            workers = worker_count,
            rows_per_worker = assignment.rows_per_worker(),
            leftover_rows = leftover.len(),
            "distributing bands"
        );

        // Distribute: one band per worker, in identity order.
        for spec in assignment.bands() {
            let band = Band::from_raster(&raster, spec.start_row, spec.rows)?;
            let frame = band.to_wire();
            self.metrics.bands_dispatched += 1;
            self.metrics.bytes_dispatched += frame.len() as u64;
            debug!(worker = spec.worker, rows = spec.rows, "band dispatched");
            transport.send(spec.worker, frame)?;
        }

        // Gather in rank order and splice each band back in place.
        for spec in assignment.bands() {
            let frame = transport.receive(spec.worker)?;
            self.metrics.bands_gathered += 1;
            self.metrics.bytes_gathered += frame.len() as u64;

            let band = Band::from_wire(&frame)?;
            if band.start_row != spec.start_row
                || band.rows != spec.rows
                || band.width != raster.width()
            {
                return Err(BandError::UnexpectedGeometry {
                    expected_start: spec.start_row,
                    expected_rows: spec.rows,
                    actual_start: band.start_row,
                    actual_rows: band.rows,
                }
                .into());
            }
            debug!(worker = spec.worker, rows = band.rows, "band gathered");
            raster.write_rows(band.start_row, band.pixels())?;
        }

        bmp::write_file(&self.dest, &raster)?;
        self.metrics.complete();

        println!("Image saved as {}", self.dest.display());
        Ok(())
    }
}

/// Rank >= 1: filters exactly one band and sees nothing else.
pub struct WorkerRole {
    coordinator: usize,
    kernel: Kernel,
}

impl WorkerRole {
    pub fn new() -> Self {
        Self {
            coordinator: COORDINATOR_RANK,
            kernel: SMOOTHING_KERNEL,
        }
    }
}

impl Default for WorkerRole {
    fn default() -> Self {
        Self::new()
    }
}

impl Role for WorkerRole {
    fn run(&mut self, transport: &mut dyn Transport) -> Result<()> {
        let frame = transport.receive(self.coordinator)?;
        let mut band = Band::from_wire(&frame)?;
        debug!(
            rank = transport.rank(),
            start_row = band.start_row,
            rows = band.rows,
            width = band.width,
            "band received"
        );

        smooth_band(&mut band, &self.kernel);

        transport.send(self.coordinator, band.to_wire())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, TransferError};
    use crate::raster::RasterImage;
    use crate::transport::form_group;

    fn checkered_raster(width: usize, height: usize) -> RasterImage {
        let pixels: Vec<u8> = (0..width * height)
            .map(|i| if (i / width + i % width) % 2 == 0 { 200 } else { 40 })
            .collect();
        RasterImage::from_pixels(width, height, pixels).unwrap()
    }

    #[test]
    fn test_worker_round_trip() {
        let mut group = form_group(2);
        let mut worker_end = group.pop().unwrap();
        let mut coord_end = group.pop().unwrap();

        let worker = std::thread::spawn(move || WorkerRole::new().run(&mut worker_end));

        let band = Band::new(10, 6, 4, vec![128; 24]).unwrap();
        coord_end.send(1, band.to_wire()).unwrap();

        let frame = coord_end.receive(1).unwrap();
        let returned = Band::from_wire(&frame).unwrap();
        worker.join().unwrap().unwrap();

        // Geometry preserved; uniform input is a fixed point of the kernel.
        assert_eq!(returned.start_row, 10);
        assert_eq!(returned.rows, 4);
        assert_eq!(returned.width, 6);
        assert_eq!(returned.pixels(), band.pixels());
    }

    #[test]
    fn test_coordinator_full_run() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.bmp");
        let dest = dir.path().join("out.bmp");

        let raster = checkered_raster(8, 6);
        bmp::write_file(&source, &raster).unwrap();

        let mut group = form_group(3);
        let worker_ends = group.split_off(1);
        let mut coord_end = group.pop().unwrap();

        let workers: Vec<_> = worker_ends
            .into_iter()
            .map(|mut end| std::thread::spawn(move || WorkerRole::new().run(&mut end)))
            .collect();

        let mut coordinator = CoordinatorRole::new(&source, &dest);
        coordinator.run(&mut coord_end).unwrap();
        for worker in workers {
            worker.join().unwrap().unwrap();
        }

        let output = bmp::read_file(&dest).unwrap();
        assert_eq!(output.width(), 8);
        assert_eq!(output.height(), 6);

        let metrics = coordinator.metrics();
        assert_eq!(metrics.bands_dispatched, 2);
        assert_eq!(metrics.bands_gathered, 2);
        assert_eq!(metrics.rows_assigned, 6);
        assert_eq!(metrics.rows_leftover, 0);
    }

    #[test]
    fn test_decode_failure_aborts_before_distribution() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bmp");

        let mut group = form_group(2);
        let mut worker_end = group.pop().unwrap();
        let mut coord_end = group.pop().unwrap();

        let mut coordinator = CoordinatorRole::new(dir.path().join("missing.bmp"), &dest);
        let result = coordinator.run(&mut coord_end);
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(!dest.exists());

        // Dropping the coordinator's endpoint is the group abort: the
        // worker's blocking receive fails instead of hanging.
        drop(coord_end);
        let result = WorkerRole::new().run(&mut worker_end);
        assert!(matches!(
            result,
            Err(Error::Transfer(TransferError::Disconnected { rank: 0 }))
        ));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.bmp");
        bmp::write_file(&source, &checkered_raster(4, 4)).unwrap();

        // A group of one has no workers at all.
        let mut group = form_group(1);
        let mut coord_end = group.pop().unwrap();

        let mut coordinator = CoordinatorRole::new(&source, dir.path().join("out.bmp"));
        let result = coordinator.run(&mut coord_end);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::ZeroWorkers))
        ));
    }

    #[test]
    fn test_more_workers_than_rows_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.bmp");
        bmp::write_file(&source, &checkered_raster(4, 2)).unwrap();

        let mut group = form_group(4);
        let mut coord_end = group.remove(0);

        let mut coordinator = CoordinatorRole::new(&source, dir.path().join("out.bmp"));
        let result = coordinator.run(&mut coord_end);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::WorkersExceedRows {
                workers: 3,
                height: 2
            }))
        ));
    }

    #[test]
    fn test_role_selection() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.bmp");
        let dest = dir.path().join("out.bmp");
        bmp::write_file(&source, &checkered_raster(6, 4)).unwrap();

        let mut group = form_group(2);
        let mut worker_end = group.pop().unwrap();
        let mut coord_end = group.pop().unwrap();

        let worker = std::thread::spawn(move || role_for(1, &source, &dest).run(&mut worker_end));

        let source = dir.path().join("in.bmp");
        let dest = dir.path().join("out.bmp");
        role_for(0, &source, &dest).run(&mut coord_end).unwrap();
        worker.join().unwrap().unwrap();

        assert!(dest.exists());
    }
}
