pub mod aggregation;
pub mod cleaning;
pub mod dates;
pub mod etl;
pub mod prompts;
pub mod session;

pub use crate::domain::model::{CleanOutcome, CleanedTable, MediaRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage, TextGenerator};
pub use crate::utils::error::Result;
