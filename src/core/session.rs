//! The per-user session: owns the current cleaned table, the AI handle, and
//! the chosen model. Handlers never fail outward; every problem comes back as
//! a [`StatusMessage`].

use crate::core::aggregation::{
    engagement_trend, media_type_mix, platform_engagements, sentiment_breakdown,
    summary_statistics, top_locations,
};
use crate::core::cleaning::clean;
use crate::core::prompts::{campaign_prompt, chart_description, chart_insight_prompt};
use crate::domain::model::{CleanOutcome, CleanedTable, ModelChoice};
use crate::domain::ports::TextGenerator;
use crate::domain::report::{ChartPanel, PanelState};
use crate::domain::status::StatusMessage;
use crate::domain::views::{ChartData, ChartKind, SummaryStatistics};
use crate::utils::error::{DashboardError, Result};
use std::sync::Arc;

pub struct Session {
    table: Option<CleanedTable>,
    generator: Option<Arc<dyn TextGenerator>>,
    model: ModelChoice,
}

impl Session {
    pub fn new(model: ModelChoice) -> Self {
        Self {
            table: None,
            generator: None,
            model,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn set_generator(&mut self, generator: Option<Arc<dyn TextGenerator>>) {
        self.generator = generator;
    }

    pub fn set_model(&mut self, model: ModelChoice) {
        self.model = model;
    }

    pub fn model(&self) -> ModelChoice {
        self.model
    }

    pub fn table(&self) -> Option<&CleanedTable> {
        self.table.as_ref()
    }

    pub fn ai_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// Replaces the current table with the result of cleaning `raw_bytes`.
    ///
    /// A failed or empty upload leaves the session without a table.
    pub fn upload(&mut self, raw_bytes: &[u8]) -> Vec<StatusMessage> {
        self.table = None;

        let outcome = match clean(raw_bytes) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("❌ Upload rejected: {}", e);
                return vec![StatusMessage::error(e.user_friendly_message())];
            }
        };

        let report = outcome.report();
        let mut statuses = vec![StatusMessage::success(format!(
            "CSV file uploaded successfully! {} rows detected.",
            report.rows_read
        ))];
        statuses.extend(
            report
                .warnings
                .iter()
                .map(|w| StatusMessage::warning(w.to_string())),
        );

        match outcome {
            CleanOutcome::Cleaned(table) => {
                tracing::info!("✅ Data cleaning complete: {} valid rows", table.len());
                statuses.push(StatusMessage::success(format!(
                    "Data cleaning complete! {} valid rows processed.",
                    table.len()
                )));
                self.table = Some(table);
            }
            CleanOutcome::Empty(_) => {
                tracing::warn!("No valid rows survived cleaning");
                statuses.push(StatusMessage::warning(
                    "No valid data found after cleaning. Please check your CSV file format and 'Date' column.",
                ));
            }
        }

        statuses
    }

    /// 清除目前的表（例如使用者移除檔案）
    pub fn clear(&mut self) {
        self.table = None;
    }

    pub fn chart_panel(&self, kind: ChartKind) -> Option<ChartPanel> {
        let table = self.table.as_ref()?;

        let state = match kind.required_column() {
            Some(column) if !table.has_column(column) => {
                PanelState::Unavailable(StatusMessage::warning(kind.missing_column_message()))
            }
            _ => PanelState::Ready(chart_data(kind, table)),
        };

        Some(ChartPanel { kind, state })
    }

    /// 全部五張圖；沒有資料時回傳空集合
    pub fn chart_panels(&self) -> Vec<ChartPanel> {
        ChartKind::ALL
            .into_iter()
            .filter_map(|kind| self.chart_panel(kind))
            .collect()
    }

    pub fn summary(&self) -> Option<SummaryStatistics> {
        self.table.as_ref().map(summary_statistics)
    }

    fn generator(&self) -> Result<&Arc<dyn TextGenerator>> {
        self.generator.as_ref().ok_or(DashboardError::AiUnavailable)
    }

    pub async fn request_chart_insight(&self, kind: ChartKind) -> Result<String> {
        let generator = self.generator()?;
        let table = self.table.as_ref().ok_or_else(|| {
            DashboardError::NoData("chart insights need an uploaded table".into())
        })?;

        let prompt = chart_insight_prompt(kind, &chart_description(kind, table));
        tracing::debug!("Requesting insights for {} with {}", kind, self.model);
        generator.generate(&prompt, self.model).await
    }

    pub async fn request_campaign_recommendation(&self) -> Result<String> {
        let generator = self.generator()?;
        let summary = self.summary().ok_or_else(|| {
            DashboardError::NoData("a campaign recommendation needs an uploaded table".into())
        })?;

        tracing::debug!("Requesting campaign recommendation with {}", self.model);
        generator.generate(&campaign_prompt(&summary), self.model).await
    }

    /// "Generate insight" handler for one chart panel.
    pub async fn chart_insight(&self, kind: ChartKind) -> StatusMessage {
        match self.chart_panel(kind) {
            None => {
                return StatusMessage::info(
                    "Upload a CSV and ensure data cleaning is complete to enable AI capabilities.",
                )
            }
            Some(ChartPanel {
                state: PanelState::Unavailable(warning),
                ..
            }) => return warning,
            Some(_) => {}
        }

        if !self.ai_enabled() {
            return StatusMessage::info(
                "Enter API key and select model to generate AI insights for this chart.",
            );
        }

        match self.request_chart_insight(kind).await {
            Ok(text) => StatusMessage::success(text),
            Err(e) => {
                tracing::error!("❌ Insight generation for {} failed: {}", kind, e);
                StatusMessage::error(e.user_friendly_message())
            }
        }
    }

    /// "Generate campaign recommendation" handler.
    pub async fn campaign_recommendation(&self) -> StatusMessage {
        if self.table.is_none() {
            return StatusMessage::info(
                "Upload a CSV and ensure data cleaning is complete to enable AI capabilities.",
            );
        }
        if !self.ai_enabled() {
            return StatusMessage::info(
                "Please enter your OpenRouter API Key to enable AI capabilities.",
            );
        }

        match self.request_campaign_recommendation().await {
            Ok(text) => StatusMessage::success(text),
            Err(e) => {
                tracing::error!("❌ Campaign recommendation failed: {}", e);
                StatusMessage::error(e.user_friendly_message())
            }
        }
    }
}

fn chart_data(kind: ChartKind, table: &CleanedTable) -> ChartData {
    match kind {
        ChartKind::Sentiment => ChartData::Categorical(sentiment_breakdown(table)),
        ChartKind::Trend => ChartData::Temporal(engagement_trend(table)),
        ChartKind::Platforms => ChartData::Categorical(platform_engagements(table)),
        ChartKind::MediaTypes => ChartData::Categorical(media_type_mix(table)),
        ChartKind::Locations => ChartData::Categorical(top_locations(table)),
    }
}
