use crate::adapters::openrouter::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECONDS,
};
use crate::domain::model::ModelChoice;
use crate::domain::ports::ConfigProvider;
use crate::domain::views::ChartKind;
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_path, validate_positive_number, validate_range,
    validate_required_field, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub input: InputConfig,
    pub ai: Option<AiConfig>,
    pub actions: Option<ActionsConfig>,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: Option<ModelChoice>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionsConfig {
    pub campaign_recommendation: Option<bool>,
    pub chart_insights: Option<Vec<ChartKind>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub export: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern is valid"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DashboardError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DashboardError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPENROUTER_API_KEY})；未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    fn ai(&self) -> Option<&AiConfig> {
        self.ai.as_ref()
    }

    fn actions(&self) -> Option<&ActionsConfig> {
        self.actions.as_ref()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().is_some_and(|m| m.enabled)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        let input = validate_required_field("input.path", &self.input.path)?;
        validate_file_extension("input.path", input, &["csv"])?;
        validate_path("output.path", &self.output.path)?;
        validate_url("ai.base_url", self.base_url())?;
        validate_positive_number("ai.timeout_seconds", self.request_timeout_seconds(), 1)?;
        validate_positive_number("ai.max_tokens", u64::from(self.max_tokens()), 1)?;
        validate_range("ai.temperature", self.temperature(), 0.0, 2.0)?;
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        self.input.path.as_deref().unwrap_or("")
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn api_key(&self) -> Option<&str> {
        self.ai().and_then(|ai| ai.api_key.as_deref())
    }

    fn base_url(&self) -> &str {
        self.ai()
            .and_then(|ai| ai.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    fn model(&self) -> ModelChoice {
        self.ai().and_then(|ai| ai.model).unwrap_or_default()
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.ai()
            .and_then(|ai| ai.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn temperature(&self) -> f32 {
        self.ai()
            .and_then(|ai| ai.temperature)
            .unwrap_or(DEFAULT_TEMPERATURE)
    }

    fn max_tokens(&self) -> u32 {
        self.ai()
            .and_then(|ai| ai.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS)
    }

    fn campaign_recommendation(&self) -> bool {
        self.actions()
            .and_then(|a| a.campaign_recommendation)
            .unwrap_or(false)
    }

    fn chart_insights(&self) -> &[ChartKind] {
        self.actions()
            .and_then(|a| a.chart_insights.as_deref())
            .unwrap_or(&[])
    }

    fn export_report(&self) -> bool {
        self.output.export.unwrap_or(true)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::usable_api_key;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[input]
path = "exports/media.csv"

[ai]
model = "gemini-flash"
temperature = 0.2

[actions]
campaign_recommendation = true
chart_insights = ["sentiment", "media_types"]

[output]
path = "./report"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.input_path(), "exports/media.csv");
        assert_eq!(config.model(), ModelChoice::GeminiFlash);
        assert_eq!(config.temperature(), 0.2);
        assert_eq!(config.max_tokens(), DEFAULT_MAX_TOKENS);
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert!(config.campaign_recommendation());
        assert_eq!(
            config.chart_insights(),
            &[ChartKind::Sentiment, ChartKind::MediaTypes]
        );
        assert!(config.export_report());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MEDIA_INTEL_TEST_KEY", "sk-test-123");

        let toml_content = r#"
[input]
path = "media.csv"

[ai]
api_key = "${MEDIA_INTEL_TEST_KEY}"

[output]
path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api_key(), Some("sk-test-123"));

        std::env::remove_var("MEDIA_INTEL_TEST_KEY");
    }

    #[test]
    fn test_unset_env_var_leaves_ai_disabled() {
        let toml_content = r#"
[input]
path = "media.csv"

[ai]
api_key = "${MEDIA_INTEL_SURELY_UNSET_VAR}"

[output]
path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(usable_api_key(config.api_key()), None);
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[input]

[ai]
base_url = "invalid-url"

[output]
path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(DashboardError::MissingConfigError { .. })
        ));

        let mut config = config;
        config.input.path = Some("media.csv".to_string());
        assert!(matches!(
            config.validate(),
            Err(DashboardError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let toml_content = r#"
[input]
path = "media.csv"

[ai]
model = "gpt-17"

[output]
path = "./output"
"#;

        assert!(TomlConfig::from_toml_str(toml_content).is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[input]
path = "media.csv"

[output]
path = "./output"
export = false

[monitoring]
enabled = true
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert!(!config.export_report());
        assert!(config.monitoring_enabled());
        assert!(!config.json_logs());
    }
}
