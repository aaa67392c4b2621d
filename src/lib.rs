pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{openrouter::OpenRouterClient, storage::LocalStorage};
pub use app::pipelines::ReportPipeline;
pub use self::core::{cleaning::clean, etl::DashboardEngine, session::Session};
pub use domain::model::{CleanOutcome, CleanedTable, ModelChoice};
pub use domain::views::ChartKind;
pub use utils::error::{DashboardError, Result};
