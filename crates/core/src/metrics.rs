//! Metrics collection and reporting for a pipeline run.
//!
//! Collected by the coordinator as it distributes and gathers bands,
//! printed by the application at the end of a run. Single-threaded by
//! design: only rank 0 ever owns a `PipelineMetrics`.

use std::time::{Duration, Instant};

/// Counters for one coordinator run.
#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    // === Image ===
    /// Source image width in pixels
    pub image_width: usize,

    /// Source image height in pixels
    pub image_height: usize,

    // === Distribution ===
    /// Bands sent to workers
    pub bands_dispatched: u64,

    /// Band frame bytes sent
    pub bytes_dispatched: u64,

    // === Gather ===
    /// Processed bands received back
    pub bands_gathered: u64,

    /// Band frame bytes received
    pub bytes_gathered: u64,

    // === Coverage ===
    /// Rows assigned to workers
    pub rows_assigned: u64,

    /// Remainder rows never assigned (stay unfiltered)
    pub rows_leftover: u64,
}

impl PipelineMetrics {
    /// Create new metrics with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            image_width: 0,
            image_height: 0,
            bands_dispatched: 0,
            bytes_dispatched: 0,
            bands_gathered: 0,
            bytes_gathered: 0,
            rows_assigned: 0,
            rows_leftover: 0,
        }
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Fraction of image rows that were filtered by some worker.
    pub fn coverage(&self) -> f64 {
        let total = self.rows_assigned + self.rows_leftover;
        if total == 0 {
            0.0
        } else {
            self.rows_assigned as f64 / total as f64
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Run Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!("Image: {}x{}", self.image_width, self.image_height);
        println!();
        println!("Bands dispatched: {}", self.bands_dispatched);
        println!("Bytes dispatched: {}", self.bytes_dispatched);
        println!("Bands gathered: {}", self.bands_gathered);
        println!("Bytes gathered: {}", self.bytes_gathered);
        println!();
        println!("Rows assigned: {}", self.rows_assigned);
        println!("Rows leftover (unfiltered): {}", self.rows_leftover);
        println!("Coverage: {:.1}%", self.coverage() * 100.0);
        println!();
    }

    /// Export metrics as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             image_width={}\n\
             image_height={}\n\
             bands_dispatched={}\n\
             bytes_dispatched={}\n\
             bands_gathered={}\n\
             bytes_gathered={}\n\
             rows_assigned={}\n\
             rows_leftover={}\n",
            self.duration().as_millis(),
            self.image_width,
            self.image_height,
            self.bands_dispatched,
            self.bytes_dispatched,
            self.bands_gathered,
            self.bytes_gathered,
            self.rows_assigned,
            self.rows_leftover,
        )
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = PipelineMetrics::new();
        assert!(metrics.end_time.is_none());
        assert!(metrics.duration().as_millis() < 100);
    }

    #[test]
    fn test_coverage() {
        let mut metrics = PipelineMetrics::new();
        metrics.rows_assigned = 100;
        metrics.rows_leftover = 1;

        assert!((metrics.coverage() - 100.0 / 101.0).abs() < 1e-9);
    }

    #[test]
    fn test_coverage_empty() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.coverage(), 0.0);
    }

    #[test]
    fn test_export_text() {
        let mut metrics = PipelineMetrics::new();
        metrics.image_width = 64;
        metrics.image_height = 48;
        metrics.bands_dispatched = 4;

        let text = metrics.export_text();
        assert!(text.contains("image_width=64"));
        assert!(text.contains("image_height=48"));
        assert!(text.contains("bands_dispatched=4"));
    }
}
