pub mod aqi_reader;
pub mod mapping_reader;
pub mod pool;

pub use aqi_reader::AqiReader;
pub use mapping_reader::MappingReader;
pub use pool::{list_pool, pool_filenames};
