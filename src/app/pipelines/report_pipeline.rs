use crate::adapters::openrouter::OpenRouterClient;
use crate::adapters::report_archive::{build_report_archive, REPORT_FILE};
use crate::app::render::render_dashboard;
use crate::core::session::Session;
use crate::domain::ports::{ConfigProvider, Pipeline, Storage, TextGenerator};
use crate::domain::report::{ChartInsight, DashboardReport};
use crate::utils::error::Result;
use std::path::Path;
use std::sync::Arc;

/// Reads one CSV export, builds the dashboard, runs the requested AI actions,
/// and writes the report bundle.
pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) generator: Option<Arc<dyn TextGenerator>>,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let generator = OpenRouterClient::from_config(&config)?
            .map(|client| Arc::new(client) as Arc<dyn TextGenerator>);

        if generator.is_none() {
            tracing::info!("No API key configured, AI capabilities disabled");
        }

        Ok(Self {
            storage,
            config,
            generator,
        })
    }

    /// 測試或其他服務可換上自己的文字生成器
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    fn session(&self) -> Session {
        let mut session = Session::new(self.config.model());
        session.set_generator(self.generator.clone());
        session
    }

    fn report_path(&self) -> String {
        Path::new(self.config.output_path())
            .join(REPORT_FILE)
            .to_string_lossy()
            .into_owned()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<u8>> {
        let input = self.config.input_path();
        tracing::debug!("Reading upload from: {}", input);
        let bytes = self.storage.read_file(input).await?;
        tracing::debug!("Read {} bytes", bytes.len());
        Ok(bytes)
    }

    async fn transform(&self, raw: Vec<u8>) -> Result<DashboardReport> {
        let mut session = self.session();
        let statuses = session.upload(&raw);

        let mut report = DashboardReport {
            model: session.model(),
            statuses,
            panels: session.chart_panels(),
            summary: session.summary(),
            table: session.table().cloned(),
            recommendation: None,
            insights: Vec::new(),
        };

        if !report.has_data() {
            return Ok(report);
        }

        if self.config.campaign_recommendation() {
            tracing::info!("Generating campaign recommendation...");
            report.recommendation = Some(session.campaign_recommendation().await);
        }

        for &kind in self.config.chart_insights() {
            tracing::info!("Generating insights for {}...", kind);
            let status = session.chart_insight(kind).await;
            report.insights.push(ChartInsight { kind, status });
        }

        Ok(report)
    }

    async fn load(&self, report: &DashboardReport) -> Result<Option<String>> {
        if !self.config.export_report() {
            tracing::debug!("Report export disabled");
            return Ok(None);
        }

        let archive = build_report_archive(report, &render_dashboard(report))?;
        let path = self.report_path();
        tracing::debug!("Writing report bundle ({} bytes) to {}", archive.len(), path);
        self.storage.write_file(&path, &archive).await?;

        Ok(Some(path))
    }
}
