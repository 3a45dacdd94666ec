//! Common utilities and types for studyviz

pub mod dataset;
pub mod error;
pub mod logging;
pub mod reference;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

// Re-export commonly used types
pub use dataset::{columns, Cell, Dataset, DatasetLoader, InputFormat, StudyRecord};
pub use error::{Result, StudyVizError};
pub use logging::{init_logging, LoggingConfig};
pub use reference::{default_system_improvements, SystemImprovement};
