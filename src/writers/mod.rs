pub mod dataset_writer;
pub mod mapping_writer;

pub use dataset_writer::{DatasetSplit, DatasetWriter};
pub use mapping_writer::MappingWriter;
