pub mod aqi;
pub mod mapping;
pub mod report;

pub use aqi::AqiRecord;
pub use mapping::MappingRow;
pub use report::{
    AcquisitionReport, AugmentReport, FilterReport, JoinReport, PrepareReport, TaskReport,
};
