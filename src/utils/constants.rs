/// Image file extensions accepted by the pipeline
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Default file names
pub const FINGERPRINT_FILE: &str = "downloaded_progress.txt";
pub const FILTER_FINGERPRINT_FILE: &str = "filtered_progress.txt";
pub const AQI_DATA_FILE: &str = "aqi_data.csv";
pub const MAPPING_FILE: &str = "sky_aqi_mapping.csv";

/// Default pool directory names
pub const RAW_POOL_DIR: &str = "images";
pub const FILTERED_POOL_DIR: &str = "filtered_images";
pub const AUGMENTED_POOL_DIR: &str = "augmented_images";
pub const PREPARED_DATA_DIR: &str = "prepared_data";

/// Sky classifier thresholds
pub const DEFAULT_BLUE_THRESHOLD: f64 = 0.30;
pub const DEFAULT_CLOUD_THRESHOLD: f64 = 0.10;

/// Fingerprint digest resolution (square edge, pixels)
pub const FINGERPRINT_EDGE: u32 = 128;

/// Materializer target resolution (square edge, pixels)
pub const TARGET_EDGE: u32 = 128;

/// Split ratios: train takes 70%, remainder splits into validation/test
pub const TRAIN_RATIO: f64 = 0.70;

/// Default split seed
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Minimum valid samples required before a split is defined
pub const MIN_SPLIT_SAMPLES: usize = 3;

/// Search tag combined with each district query and embedded in pool names
pub const QUERY_TAG: &str = "sky";

/// Augmentation rotation angles (degrees)
pub const ROTATION_ANGLES: [f32; 4] = [15.0, -15.0, 30.0, -30.0];

/// Mixing weight applied to the primary image in alpha blending
pub const BLEND_ALPHA: f32 = 0.2;

/// Per-page result sizes requested from keyed search APIs
pub const FLICKR_PAGE_SIZE: u32 = 500;
pub const UNSPLASH_PAGE_SIZE: u32 = 30;
pub const WEBSEARCH_PAGE_SIZE: u32 = 30;

/// Seoul districts covered by the acquisition and AQI stages
pub const SEOUL_DISTRICTS: [&str; 25] = [
    "Gangnam-gu",
    "Songpa-gu",
    "Jongno-gu",
    "Seocho-gu",
    "Mapo-gu",
    "Yongsan-gu",
    "Nowon-gu",
    "Gwangjin-gu",
    "Dongjak-gu",
    "Geumcheon-gu",
    "Guro-gu",
    "Yangcheon-gu",
    "Gangseo-gu",
    "Seodaemun-gu",
    "Eunpyeong-gu",
    "Jungnang-gu",
    "Seongdong-gu",
    "Dongdaemun-gu",
    "Gangbuk-gu",
    "Dobong-gu",
    "Jung-gu",
    "Gwanak-gu",
    "Gangdong-gu",
    "Yeongdeungpo-gu",
    "Seongbuk-gu",
];

/// District coordinates used by the AQI fetcher (name, latitude, longitude)
pub const SEOUL_DISTRICT_COORDS: [(&str, f64, f64); 25] = [
    ("Gangnam-gu, Seoul", 37.517562, 127.047282),
    ("Songpa-gu, Seoul", 37.502685, 127.112315),
    ("Jongno-gu, Seoul", 37.572025, 126.979367),
    ("Seocho-gu, Seoul", 37.483577, 127.032718),
    ("Mapo-gu, Seoul", 37.554682, 126.910072),
    ("Yongsan-gu, Seoul", 37.531100, 126.981748),
    ("Nowon-gu, Seoul", 37.654916, 127.056622),
    ("Gwangjin-gu, Seoul", 37.538520, 127.082124),
    ("Dongjak-gu, Seoul", 37.512398, 126.939627),
    ("Geumcheon-gu, Seoul", 37.456872, 126.895961),
    ("Guro-gu, Seoul", 37.495403, 126.887549),
    ("Yangcheon-gu, Seoul", 37.517018, 126.866831),
    ("Gangseo-gu, Seoul", 37.566283, 126.849548),
    ("Seodaemun-gu, Seoul", 37.582577, 126.935203),
    ("Eunpyeong-gu, Seoul", 37.617612, 126.922700),
    ("Jungnang-gu, Seoul", 37.595658, 127.093246),
    ("Seongdong-gu, Seoul", 37.563940, 127.036667),
    ("Dongdaemun-gu, Seoul", 37.574495, 127.040544),
    ("Gangbuk-gu, Seoul", 37.639723, 127.011302),
    ("Dobong-gu, Seoul", 37.665860, 127.031767),
    ("Jung-gu, Seoul", 37.557353, 126.994370),
    ("Gwanak-gu, Seoul", 37.478396, 126.951462),
    ("Gangdong-gu, Seoul", 37.530125, 127.123760),
    ("Yeongdeungpo-gu, Seoul", 37.524086, 126.896568),
    ("Seongbuk-gu, Seoul", 37.589169, 127.016448),
];
