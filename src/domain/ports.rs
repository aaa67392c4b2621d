use crate::domain::model::ModelChoice;
use crate::domain::report::DashboardReport;
use crate::domain::views::ChartKind;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn base_url(&self) -> &str;
    fn model(&self) -> ModelChoice;
    fn request_timeout_seconds(&self) -> u64;
    fn temperature(&self) -> f32;
    fn max_tokens(&self) -> u32;
    fn campaign_recommendation(&self) -> bool;
    fn chart_insights(&self) -> &[ChartKind];
    fn export_report(&self) -> bool;
}

/// 外部文字生成服務（AI 協作者）
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, model: ModelChoice) -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<u8>>;
    async fn transform(&self, raw: Vec<u8>) -> Result<DashboardReport>;
    async fn load(&self, report: &DashboardReport) -> Result<Option<String>>;
}
