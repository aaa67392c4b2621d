use crate::domain::ports::Pipeline;
use crate::domain::report::DashboardReport;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: DashboardReport,
    /// 匯出的報告路徑；停用匯出時為 `None`
    pub output_path: Option<String>,
}

pub struct DashboardEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> DashboardEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn monitor(&self) -> &SystemMonitor {
        &self.monitor
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("Starting dashboard build...");

        // Extract
        let raw = self.pipeline.extract().await?;
        tracing::info!("Read {} bytes of CSV", raw.len());
        self.monitor.log_stats("Extract");

        // Transform
        let report = self.pipeline.transform(raw).await?;
        match &report.table {
            Some(table) => tracing::info!(
                "Built {} chart panels from {} rows",
                report.panels.len(),
                table.len()
            ),
            None => tracing::warn!("No data to chart"),
        }
        self.monitor.log_stats("Transform");

        // Load
        let output_path = self.pipeline.load(&report).await?;
        if let Some(path) = &output_path {
            tracing::info!("Report saved to: {}", path);
        }
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(RunOutcome {
            report,
            output_path,
        })
    }
}
