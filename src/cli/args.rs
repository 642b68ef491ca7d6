use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skyaqi-processor")]
#[command(about = "Sky image / air-quality dataset construction pipeline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Suppress progress bars")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download sky images per district from the configured sources
    Acquire {
        #[arg(short, long, help = "Raw image pool directory", default_value = "datasets/images")]
        output_dir: PathBuf,

        #[arg(
            long,
            help = "Fingerprint store path [default: <output-dir>/downloaded_progress.txt]"
        )]
        fingerprint_file: Option<PathBuf>,

        #[arg(short, long, default_value = "1000", help = "Images per source per district")]
        target: usize,

        #[arg(
            short,
            long,
            help = "Districts to acquire (defaults to all 25 Seoul districts)"
        )]
        district: Vec<String>,

        #[arg(long, help = "Flickr API key (repeatable, rotated round-robin)")]
        flickr_key: Vec<String>,

        #[arg(long, help = "Unsplash API key (repeatable, rotated round-robin)")]
        unsplash_key: Vec<String>,

        #[arg(long, default_value = "false", help = "Disable the scraped web search source")]
        skip_websearch: bool,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Fetch one air-quality snapshot per Seoul district from AQICN
    FetchAqi {
        #[arg(short, long, help = "AQICN API token")]
        token: String,

        #[arg(
            short,
            long,
            default_value = "datasets/mappings/aqi_data.csv",
            help = "Output AQI table"
        )]
        output_file: PathBuf,
    },

    /// Deduplicate the raw pool and keep heuristically-detected sky images
    Filter {
        #[arg(short, long, default_value = "datasets/images")]
        input_dir: PathBuf,

        #[arg(short, long, default_value = "datasets/filtered_images")]
        output_dir: PathBuf,

        #[arg(
            long,
            help = "Fingerprint store path [default: <output-dir>/filtered_progress.txt]"
        )]
        fingerprint_file: Option<PathBuf>,

        #[arg(long, default_value = "0.30", help = "Minimum blue-pixel fraction")]
        blue_threshold: f64,

        #[arg(long, default_value = "0.10", help = "Minimum white-pixel fraction")]
        cloud_threshold: f64,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Expand the filtered pool with geometric and blended variants
    Augment {
        #[arg(short, long, default_value = "datasets/filtered_images")]
        input_dir: PathBuf,

        #[arg(short, long, default_value = "datasets/augmented_images")]
        output_dir: PathBuf,

        #[arg(long, default_value = "0", help = "Seed for partner and cut-point choice")]
        seed: u64,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Join pooled images with the AQI table into a mapping file
    Map {
        #[arg(short, long, help = "Image pools to scan", default_values = [
            "datasets/filtered_images",
            "datasets/augmented_images",
        ])]
        pool: Vec<PathBuf>,

        #[arg(short, long, default_value = "datasets/mappings/aqi_data.csv")]
        aqi_file: PathBuf,

        #[arg(
            short,
            long,
            default_value = "datasets/mappings/sky_aqi_mapping.csv",
            help = "Output mapping file"
        )]
        output_file: PathBuf,

        #[arg(
            long,
            help = "Fail when the dropped fraction of scanned images exceeds this ratio"
        )]
        max_drop_ratio: Option<f64>,
    },

    /// Restrict an existing mapping to images still present in a pool
    RefreshMapping {
        #[arg(short, long, default_value = "datasets/mappings/sky_aqi_mapping.csv")]
        mapping_file: PathBuf,

        #[arg(short, long, default_value = "datasets/filtered_images")]
        pool: PathBuf,

        #[arg(
            short,
            long,
            default_value = "datasets/mappings/filtered_sky_aqi_mapping.csv"
        )]
        output_file: PathBuf,
    },

    /// Materialize the train/validation/test arrays from the mapping file
    Prepare {
        #[arg(short, long, default_value = "datasets/mappings/sky_aqi_mapping.csv")]
        mapping_file: PathBuf,

        #[arg(short, long, help = "Pools searched for image bytes, in priority order", default_values = [
            "datasets/filtered_images",
            "datasets/augmented_images",
        ])]
        pool: Vec<PathBuf>,

        #[arg(short, long, default_value = "datasets/prepared_data")]
        output_dir: PathBuf,

        #[arg(long, default_value = "42", help = "Split shuffle seed")]
        seed: u64,

        #[arg(long, default_value = "false", help = "Also write a combined dataset.npz archive")]
        archive: bool,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },
}
