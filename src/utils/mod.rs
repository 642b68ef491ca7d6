pub mod constants;
pub mod filename;
pub mod progress;

pub use filename::{extract_district, has_image_extension, pool_filename};
pub use progress::ProgressReporter;
