use crate::domain::model::{CleanedTable, ModelChoice};
use crate::domain::status::StatusMessage;
use crate::domain::views::{ChartData, ChartKind, SummaryStatistics};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum PanelState {
    Ready(ChartData),
    /// 缺欄位時以警告取代圖表
    Unavailable(StatusMessage),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPanel {
    pub kind: ChartKind,
    pub state: PanelState,
}

impl ChartPanel {
    pub fn data(&self) -> Option<&ChartData> {
        match &self.state {
            PanelState::Ready(data) => Some(data),
            PanelState::Unavailable(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.data().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartInsight {
    pub kind: ChartKind,
    pub status: StatusMessage,
}

/// Everything one dashboard run produced, ready to render or export.
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub model: ModelChoice,
    pub statuses: Vec<StatusMessage>,
    pub table: Option<CleanedTable>,
    pub panels: Vec<ChartPanel>,
    pub summary: Option<SummaryStatistics>,
    pub recommendation: Option<StatusMessage>,
    pub insights: Vec<ChartInsight>,
}

impl DashboardReport {
    pub fn has_data(&self) -> bool {
        self.table.is_some()
    }

    /// AI 成功產生的文字（推薦與圖表洞察）
    pub fn has_ai_output(&self) -> bool {
        self.recommendation
            .as_ref()
            .is_some_and(StatusMessage::is_success)
            || self.insights.iter().any(|i| i.status.is_success())
    }

    pub fn panel(&self, kind: ChartKind) -> Option<&ChartPanel> {
        self.panels.iter().find(|p| p.kind == kind)
    }
}
