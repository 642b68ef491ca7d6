use anyhow::Result;
use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use skyaqi_processor::dedup::FingerprintStore;
use skyaqi_processor::models::AqiRecord;
use skyaqi_processor::processors::{
    AqiJoiner, AugmentationStage, DatasetMaterializer, FilteringStage,
};
use skyaqi_processor::readers::{AqiReader, MappingReader};
use skyaqi_processor::writers::{DatasetWriter, MappingWriter};

fn write_sky_image(dir: &Path, name: &str, rgb: [u8; 3]) {
    RgbImage::from_pixel(32, 32, Rgb(rgb)).save(dir.join(name)).unwrap();
}

fn aqi_record(station: &str, pm25: f64) -> AqiRecord {
    AqiRecord::new(
        station.to_string(),
        37.5,
        127.0,
        Some(pm25),
        Some(pm25 + 20.0),
        Some("pm25".to_string()),
        None,
        Some(21.0),
        Some(40.0),
    )
}

#[test]
fn test_join_and_materialize_three_districts() -> Result<()> {
    let dir = TempDir::new()?;
    let filtered = dir.path().join("filtered_images");
    fs::create_dir_all(&filtered)?;

    write_sky_image(&filtered, "flickr_Gangnam-gu_sky_0.jpg", [30, 120, 220]);
    write_sky_image(&filtered, "unsplash_Mapo-gu_sky_0.jpg", [250, 250, 250]);
    write_sky_image(&filtered, "google_Jongno-gu_sky_0.jpg", [90, 140, 230]);

    let aqi = vec![
        aqi_record("Gangnam-gu, Seoul", 55.0),
        aqi_record("Mapo-gu, Seoul", 31.0),
        aqi_record("Jongno-gu, Seoul", 47.0),
    ];

    // Exactly one mapping row per image
    let (rows, report) = AqiJoiner::new().join(&[&filtered], &aqi)?;
    assert_eq!(rows.len(), 3);
    assert_eq!(report.mapped, 3);
    assert_eq!(report.dropped(), 0);

    // The mapping survives a CSV round trip
    let mapping_path = dir.path().join("mappings").join("sky_aqi_mapping.csv");
    MappingWriter::new().write_rows(&rows, &mapping_path)?;
    let reloaded = MappingReader::new().read_rows(&mapping_path)?;
    assert_eq!(reloaded.len(), 3);

    // Three samples allocate (2, 0, 1) under the pinned rounding rule
    let dataset = DatasetMaterializer::new(2).materialize(&reloaded, &[&filtered], None)?;
    assert_eq!(dataset.train.len(), 2);
    assert_eq!(dataset.validation.len(), 0);
    assert_eq!(dataset.test.len(), 1);
    assert_eq!(
        dataset.train.len() + dataset.validation.len() + dataset.test.len(),
        dataset.report.valid_pairs
    );

    // All six arrays land on disk
    let prepared = dir.path().join("prepared_data");
    DatasetWriter::new().write_splits(
        &dataset.train,
        &dataset.validation,
        &dataset.test,
        &prepared,
    )?;
    for name in [
        "x_train.npy",
        "y_train.npy",
        "x_val.npy",
        "y_val.npy",
        "x_test.npy",
        "y_test.npy",
    ] {
        assert!(prepared.join(name).exists(), "{} missing", name);
    }

    Ok(())
}

#[test]
fn test_filter_augment_map_prepare_flow() -> Result<()> {
    let dir = TempDir::new()?;
    let raw = dir.path().join("images");
    let filtered = dir.path().join("filtered_images");
    let augmented = dir.path().join("augmented_images");
    fs::create_dir_all(&raw)?;

    // Three districts of sky, one obvious non-sky, one corrupt file
    write_sky_image(&raw, "flickr_Gangnam-gu_sky_00000.jpg", [30, 120, 220]);
    write_sky_image(&raw, "flickr_Mapo-gu_sky_00000.jpg", [250, 250, 250]);
    write_sky_image(&raw, "flickr_Jongno-gu_sky_00000.jpg", [60, 140, 235]);
    write_sky_image(&raw, "flickr_Guro-gu_sky_00000.jpg", [40, 160, 40]);
    fs::write(raw.join("flickr_Jung-gu_sky_00000.jpg"), b"corrupt")?;

    // Filter: sky-only, dedup store persisted
    let store_path = filtered.join("filtered_progress.txt");
    let mut store = FingerprintStore::load(&store_path)?;
    let filter_report = FilteringStage::new(2).run(&raw, &filtered, &mut store, None)?;
    assert_eq!(filter_report.accepted, 3);
    assert_eq!(filter_report.rejected, 1);
    assert_eq!(filter_report.decode_failures, 1);

    // Filtering again changes nothing (dedup invariant)
    let mut store = FingerprintStore::load(&store_path)?;
    let rerun = FilteringStage::new(2).run(&raw, &filtered, &mut store, None)?;
    assert_eq!(rerun.accepted, 0);
    let filtered_count = fs::read_dir(&filtered)
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .path()
                .extension()
                .map(|x| x == "jpg")
                .unwrap_or(false)
        })
        .count();
    assert_eq!(filtered_count, 3);

    // Augment: deterministic variants, idempotent on re-run
    let stage = AugmentationStage::new(2).with_seed(7);
    let augment_report = stage.run(&filtered, &augmented, None)?;
    assert!(augment_report.written >= 3 * 7);
    let second = stage.run(&filtered, &augmented, None)?;
    assert_eq!(second.written, 0);

    // Map across both pools
    let aqi = vec![
        aqi_record("Gangnam-gu, Seoul", 55.0),
        aqi_record("Mapo-gu, Seoul", 31.0),
        aqi_record("Jongno-gu, Seoul", 47.0),
    ];
    let (rows, join_report) = AqiJoiner::new().join(&[&filtered, &augmented], &aqi)?;
    assert_eq!(join_report.no_district, 0);
    assert!(rows.len() >= 3);

    // Prepare: split partitions all resolvable pairs
    let dataset =
        DatasetMaterializer::new(2).materialize(&rows, &[&filtered, &augmented], None)?;
    assert_eq!(
        dataset.train.len() + dataset.validation.len() + dataset.test.len(),
        dataset.report.valid_pairs
    );
    assert_eq!(dataset.report.valid_pairs, rows.len());

    Ok(())
}

#[test]
fn test_prepare_reads_aqi_table_from_disk() -> Result<()> {
    let dir = TempDir::new()?;
    let aqi_path = dir.path().join("aqi_data.csv");
    fs::write(
        &aqi_path,
        "Station,Latitude,Longitude,PM2.5,PM10,Dominant Pollutant,Timestamp,Temperature,Humidity\n\
         \"Gangnam-gu, Seoul\",37.517562,127.047282,55,80,pm25,2024-11-28T14:00:00+09:00,21,40\n\
         \"Mapo-gu, Seoul\",37.554682,126.910072,31,45,pm10,2024-11-28T14:00:00+09:00,20,43\n",
    )?;

    let records = AqiReader::new().read_records(&aqi_path)?;
    assert_eq!(records.len(), 2);
    assert!(records[0].matches_district("Gangnam-gu"));
    assert_eq!(records[1].pm25, Some(31.0));

    Ok(())
}
