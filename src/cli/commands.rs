use crate::cli::args::{Cli, Commands};
use crate::dedup::FingerprintStore;
use crate::error::{PipelineError, Result};
use crate::fetchers::{AqicnClient, FlickrSource, ImageSource, UnsplashSource, WebSearchSource};
use crate::models::AqiRecord;
use crate::processors::{
    AcquisitionStage, AqiJoiner, AugmentationStage, DatasetMaterializer, FilteringStage,
    SkyClassifier,
};
use crate::readers::{AqiReader, MappingReader};
use crate::utils::constants::{
    FILTER_FINGERPRINT_FILE, FINGERPRINT_FILE, SEOUL_DISTRICTS, SEOUL_DISTRICT_COORDS,
};
use crate::utils::progress::ProgressReporter;
use crate::writers::{DatasetWriter, MappingWriter};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub async fn run(cli: Cli) -> Result<()> {
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .ok();

    let quiet = cli.quiet;

    match cli.command {
        Commands::Acquire {
            output_dir,
            fingerprint_file,
            target,
            district,
            flickr_key,
            unsplash_key,
            skip_websearch,
            max_workers,
        } => {
            let mut sources: Vec<Arc<dyn ImageSource>> = Vec::new();
            if !flickr_key.is_empty() {
                sources.push(Arc::new(FlickrSource::new(flickr_key)?));
            }
            if !unsplash_key.is_empty() {
                sources.push(Arc::new(UnsplashSource::new(unsplash_key)?));
            }
            if !skip_websearch {
                sources.push(Arc::new(WebSearchSource::new()));
            }
            if sources.is_empty() {
                return Err(PipelineError::Config(
                    "no image sources configured; provide API keys or enable web search"
                        .to_string(),
                ));
            }

            let districts: Vec<String> = if district.is_empty() {
                SEOUL_DISTRICTS.iter().map(|d| d.to_string()).collect()
            } else {
                district
            };

            let store_path = fingerprint_file
                .unwrap_or_else(|| output_dir.join(FINGERPRINT_FILE));
            let mut store = FingerprintStore::load(&store_path)?;

            println!("Acquiring sky images...");
            println!("Output pool: {}", output_dir.display());
            println!(
                "Sources: {}, Districts: {}, Target per task: {}",
                sources.len(),
                districts.len(),
                target
            );

            let total_tasks = (sources.len() * districts.len()) as u64;
            let progress = ProgressReporter::new(total_tasks, "Acquiring images...", quiet);

            let stage = AcquisitionStage::new(max_workers);
            let report = stage
                .run(
                    &sources,
                    &districts,
                    target,
                    &output_dir,
                    &mut store,
                    Some(&progress),
                )
                .await?;

            progress.finish_with_message(&format!("Accepted {} images", report.total_accepted()));
            println!("\n{}", report.summary());
        }

        Commands::FetchAqi { token, output_file } => {
            println!("Fetching AQI snapshots for {} districts...", SEOUL_DISTRICT_COORDS.len());

            let client = AqicnClient::new(token);
            let records = client.fetch_stations(&SEOUL_DISTRICT_COORDS).await;

            if records.is_empty() {
                return Err(PipelineError::MissingData(
                    "no AQI records could be fetched".to_string(),
                ));
            }

            write_aqi_table(&records, &output_file)?;
            println!(
                "Wrote {} AQI records to {}",
                records.len(),
                output_file.display()
            );
        }

        Commands::Filter {
            input_dir,
            output_dir,
            fingerprint_file,
            blue_threshold,
            cloud_threshold,
            max_workers,
        } => {
            println!("Filtering sky images...");
            println!("Input pool: {}", input_dir.display());
            println!("Output pool: {}", output_dir.display());

            let store_path = fingerprint_file
                .unwrap_or_else(|| output_dir.join(FILTER_FINGERPRINT_FILE));
            let mut store = FingerprintStore::load(&store_path)?;

            let progress = ProgressReporter::new_spinner("Filtering images...", quiet);

            let stage = FilteringStage::new(max_workers)
                .with_classifier(SkyClassifier::with_thresholds(blue_threshold, cloud_threshold));
            let report = stage.run(&input_dir, &output_dir, &mut store, Some(&progress))?;

            progress.finish_with_message(&format!("Kept {} sky images", report.accepted));
            println!("\n{}", report.summary());
        }

        Commands::Augment {
            input_dir,
            output_dir,
            seed,
            max_workers,
        } => {
            println!("Augmenting filtered images...");
            println!("Input pool: {}", input_dir.display());
            println!("Output pool: {}", output_dir.display());

            let progress = ProgressReporter::new_spinner("Augmenting images...", quiet);

            let stage = AugmentationStage::new(max_workers).with_seed(seed);
            let report = stage.run(&input_dir, &output_dir, Some(&progress))?;

            progress.finish_with_message(&format!("Wrote {} variants", report.written));
            println!("\n{}", report.summary());
        }

        Commands::Map {
            pool,
            aqi_file,
            output_file,
            max_drop_ratio,
        } => {
            println!("Joining images with AQI data...");
            println!("AQI table: {}", aqi_file.display());

            let aqi_records = AqiReader::new().read_records(&aqi_file)?;
            println!("AQI data loaded: {} rows", aqi_records.len());

            let pools: Vec<&Path> = pool.iter().map(|p| p.as_path()).collect();
            let joiner = AqiJoiner::new().with_max_drop_ratio(max_drop_ratio);
            let (rows, report) = joiner.join(&pools, &aqi_records)?;

            MappingWriter::new().write_rows(&rows, &output_file)?;
            println!("Mapping saved to {}", output_file.display());
            println!("\n{}", report.summary());
        }

        Commands::RefreshMapping {
            mapping_file,
            pool,
            output_file,
        } => {
            println!("Refreshing mapping against {}", pool.display());

            let rows = MappingReader::new().read_rows(&mapping_file)?;
            let (kept, removed) = AqiJoiner::new().refresh_mapping(rows, &pool)?;

            MappingWriter::new().write_rows(&kept, &output_file)?;
            println!(
                "Kept {} rows, removed {}. Saved to {}",
                kept.len(),
                removed,
                output_file.display()
            );
        }

        Commands::Prepare {
            mapping_file,
            pool,
            output_dir,
            seed,
            archive,
            max_workers,
        } => {
            println!("Preparing dataset...");
            println!("Mapping file: {}", mapping_file.display());

            let rows = MappingReader::new().read_rows(&mapping_file)?;
            println!("Mapping file loaded with {} rows", rows.len());

            let progress =
                ProgressReporter::new(rows.len() as u64, "Materializing dataset...", quiet);

            let pools: Vec<&Path> = pool.iter().map(|p| p.as_path()).collect();
            let materializer = DatasetMaterializer::new(max_workers).with_seed(seed);
            let dataset = materializer.materialize(&rows, &pools, Some(&progress))?;

            progress.finish_with_message("Materialization complete");

            let writer = DatasetWriter::new();
            writer.write_splits(
                &dataset.train,
                &dataset.validation,
                &dataset.test,
                &output_dir,
            )?;

            if archive {
                let archive_path = output_dir.join("dataset.npz");
                writer.write_archive(
                    &dataset.corpus_images,
                    &dataset.corpus_labels,
                    &archive_path,
                )?;
                println!("Archive saved to {}", archive_path.display());
            }

            println!("\n{}", dataset.report.summary());
            println!("Data preparation complete!");
        }
    }

    Ok(())
}

/// Write the fetched AQI records as the CSV table the joiner consumes.
fn write_aqi_table(records: &[AqiRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "Station",
        "Latitude",
        "Longitude",
        "PM2.5",
        "PM10",
        "Dominant Pollutant",
        "Timestamp",
        "Temperature",
        "Humidity",
    ])?;

    for record in records {
        let number = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        writer.write_record([
            record.station.as_str(),
            &record.latitude.to_string(),
            &record.longitude.to_string(),
            &number(record.pm25),
            &number(record.pm10),
            record.dominant_pollutant.as_deref().unwrap_or(""),
            &record
                .timestamp
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            &number(record.temperature),
            &number(record.humidity),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
