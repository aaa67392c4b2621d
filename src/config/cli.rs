use crate::adapters::openrouter::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECONDS,
};
use crate::domain::model::ModelChoice;
use crate::domain::ports::ConfigProvider;
use crate::domain::views::ChartKind;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "media-intel")]
#[command(about = "Media intelligence dashboard for CSV exports, with optional AI insights")]
pub struct CliConfig {
    /// CSV export with Date, Platform, Sentiment, Location, Engagements, Media Type columns
    pub input: String,

    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, value_enum, default_value = "mistral-instruct")]
    pub model: ModelChoice,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "Print the dashboard without writing the report bundle")]
    pub no_export: bool,

    #[arg(long, help = "Generate an overall campaign recommendation")]
    pub recommend: bool,

    #[arg(long, value_enum, value_delimiter = ',')]
    pub insights: Vec<ChartKind>,

    #[arg(long, help = "Generate insights for every chart")]
    pub all_insights: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn model(&self) -> ModelChoice {
        self.model
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn campaign_recommendation(&self) -> bool {
        self.recommend
    }

    fn chart_insights(&self) -> &[ChartKind] {
        if self.all_insights {
            &ChartKind::ALL
        } else {
            &self.insights
        }
    }

    fn export_report(&self) -> bool {
        !self.no_export
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_file_extension("input", &self.input, &["csv"])?;
        validate_url("base_url", &self.base_url)?;
        validate_path("output_path", &self.output_path)?;
        validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        validate_positive_number("max_tokens", u64::from(self.max_tokens), 1)?;
        validate_range("temperature", self.temperature, 0.0, 2.0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::try_parse_from(["media-intel", "media.csv"]).unwrap();

        assert_eq!(config.model(), ModelChoice::MistralInstruct);
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.max_tokens(), 500);
        assert!(config.export_report());
        assert!(config.chart_insights().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_insight_list_and_model() {
        let config = CliConfig::try_parse_from([
            "media-intel",
            "media.csv",
            "--model",
            "deepseek-r1",
            "--insights",
            "sentiment,media-types",
            "--no-export",
        ])
        .unwrap();

        assert_eq!(config.model(), ModelChoice::DeepseekR1);
        assert_eq!(
            config.chart_insights(),
            &[ChartKind::Sentiment, ChartKind::MediaTypes]
        );
        assert!(!config.export_report());
    }

    #[test]
    fn test_all_insights_overrides_list() {
        let config =
            CliConfig::try_parse_from(["media-intel", "media.csv", "--all-insights"]).unwrap();
        assert_eq!(config.chart_insights().len(), 5);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = CliConfig::try_parse_from(["media-intel", "media.txt"]).unwrap();
        assert!(config.validate().is_err());

        let config =
            CliConfig::try_parse_from(["media-intel", "media.csv", "--temperature", "3.5"])
                .unwrap();
        assert!(config.validate().is_err());

        let config =
            CliConfig::try_parse_from(["media-intel", "media.csv", "--base-url", "ftp://x"])
                .unwrap();
        assert!(config.validate().is_err());
    }
}
