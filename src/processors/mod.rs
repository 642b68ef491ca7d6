pub mod acquisition;
pub mod augmentation;
pub mod filtering;
pub mod joiner;
pub mod materializer;
pub mod sky_classifier;

pub use acquisition::AcquisitionStage;
pub use augmentation::AugmentationStage;
pub use filtering::FilteringStage;
pub use joiner::AqiJoiner;
pub use materializer::{DatasetMaterializer, MaterializedDataset};
pub use sky_classifier::SkyClassifier;
