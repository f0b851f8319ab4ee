//! Configuration for the bandblur application.
//!
//! Handles parsing command-line arguments and generating sensible defaults
//! (including randomized defaults that are reproducible with a seed).
//!
//! # Philosophy
//!
//! The tool should work with ZERO arguments, using intelligent defaults.
//! All defaults are printed so runs are reproducible.

use std::path::PathBuf;

/// Complete configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct Config {
    // === Files ===
    /// Input image path (None = generate sample)
    pub input_file: Option<PathBuf>,

    /// Output image path
    pub output_file: PathBuf,

    // === Group ===
    /// Number of worker ranks (group size is workers + 1)
    pub workers: usize,

    // === Sample generation ===
    /// Seed for the generated sample image
    pub seed: u64,

    /// Width of the generated sample image
    pub sample_width: usize,

    /// Height of the generated sample image
    pub sample_height: usize,

    // === Behavior ===
    /// Whether to print detailed config
    pub print_config: bool,

    /// Whether to print the metrics summary
    pub print_metrics: bool,
}

impl Config {
    /// Parse configuration from command-line arguments.
    ///
    /// If no input file is provided, a sample image is generated using a
    /// time-based seed. If --seed is provided, that seed is used instead
    /// (fully deterministic).
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut input_file: Option<PathBuf> = None;
        let mut output_file: Option<PathBuf> = None;
        let mut workers: Option<usize> = None;
        let mut seed: Option<u64> = None;
        let mut sample_width: Option<usize> = None;
        let mut sample_height: Option<usize> = None;
        let mut print_config = false;
        let mut print_metrics = true;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--in" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--in requires a path".to_string());
                    }
                    input_file = Some(PathBuf::from(&args[i]));
                }
                "--out" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--out requires a path".to_string());
                    }
                    output_file = Some(PathBuf::from(&args[i]));
                }
                "--workers" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--workers requires a number".to_string());
                    }
                    workers = Some(args[i].parse().map_err(|_| "invalid workers")?);
                }
                "--seed" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--seed requires a number".to_string());
                    }
                    seed = Some(args[i].parse().map_err(|_| "invalid seed")?);
                }
                "--width" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--width requires a number".to_string());
                    }
                    sample_width = Some(args[i].parse().map_err(|_| "invalid width")?);
                }
                "--height" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--height requires a number".to_string());
                    }
                    sample_height = Some(args[i].parse().map_err(|_| "invalid height")?);
                }
                "--print-config" => {
                    print_config = true;
                }
                "--no-metrics" => {
                    print_metrics = false;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                _ => {
                    return Err(format!("unknown argument: {}", args[i]));
                }
            }
            i += 1;
        }

        // Determine seed (explicit or time-based)
        let seed = seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_millis() as u64
        });

        Ok(Config {
            input_file,
            output_file: output_file.unwrap_or_else(|| PathBuf::from("./smoothed.bmp")),
            workers: workers.unwrap_or(4),
            seed,
            sample_width: sample_width.unwrap_or(256),
            sample_height: sample_height.unwrap_or(256),
            print_config,
            print_metrics,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        println!(
            "Input file:  {}",
            self.input_file
                .as_ref()
                .map_or("(generate sample)".to_string(), |p| p
                    .display()
                    .to_string())
        );
        println!("Output file: {}", self.output_file.display());
        println!();
        println!("Workers: {} (group size {})", self.workers, self.workers + 1);
        println!();
        println!("=== Sample Generation ===");
        println!("Seed: {}", self.seed);
        println!(
            "Sample size: {}x{}",
            self.sample_width, self.sample_height
        );
        println!();
    }
}

fn print_help() {
    println!("bandblur: distributed grayscale image smoothing");
    println!();
    println!("USAGE:");
    println!("    bandblur [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --in <PATH>        Input bitmap (default: generate sample)");
    println!("    --out <PATH>       Output bitmap (default: ./smoothed.bmp)");
    println!();
    println!("    --workers <N>      Worker ranks (default: 4)");
    println!();
    println!("    --seed <N>         Seed for the generated sample image");
    println!("    --width <N>        Generated sample width (default: 256)");
    println!("    --height <N>       Generated sample height (default: 256)");
    println!();
    println!("    --print-config     Print resolved configuration");
    println!("    --no-metrics       Don't print the run summary");
    println!("    --help, -h         Print this help");
    println!();
    println!("EXAMPLES:");
    println!("    bandblur                                # Smooth a generated sample");
    println!("    bandblur --seed 42 --workers 2          # Deterministic sample, 2 workers");
    println!("    bandblur --in photo.bmp --out soft.bmp  # Smooth a specific image");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_args(&[]).unwrap();
        assert!(config.input_file.is_none());
        assert_eq!(config.output_file, PathBuf::from("./smoothed.bmp"));
        assert_eq!(config.workers, 4);
        assert_eq!(config.sample_width, 256);
        assert_eq!(config.sample_height, 256);
        assert!(config.print_metrics);
        assert!(!config.print_config);
    }

    #[test]
    fn test_explicit_values() {
        let config = Config::from_args(&args(&[
            "--in",
            "a.bmp",
            "--out",
            "b.bmp",
            "--workers",
            "7",
            "--seed",
            "42",
            "--width",
            "100",
            "--height",
            "80",
            "--no-metrics",
        ]))
        .unwrap();

        assert_eq!(config.input_file, Some(PathBuf::from("a.bmp")));
        assert_eq!(config.output_file, PathBuf::from("b.bmp"));
        assert_eq!(config.workers, 7);
        assert_eq!(config.seed, 42);
        assert_eq!(config.sample_width, 100);
        assert_eq!(config.sample_height, 80);
        assert!(!config.print_metrics);
    }

    #[test]
    fn test_missing_value() {
        assert!(Config::from_args(&args(&["--workers"])).is_err());
        assert!(Config::from_args(&args(&["--in"])).is_err());
    }

    #[test]
    fn test_unknown_argument() {
        let result = Config::from_args(&args(&["--bogus"]));
        assert!(result.is_err());
    }
}
