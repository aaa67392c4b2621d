use crate::domain::model::CleanedTable;
use crate::domain::report::DashboardReport;
use crate::utils::error::{DashboardError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_FILE: &str = "media_report.zip";
pub const CLEANED_CSV: &str = "cleaned_data.csv";
pub const AGGREGATES_JSON: &str = "aggregates.json";
pub const DASHBOARD_TXT: &str = "dashboard.txt";
pub const INSIGHTS_MD: &str = "insights.md";

/// 清理後的資料轉回 CSV（正規化欄位名稱）
pub fn cleaned_csv(table: &CleanedTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "date",
        "platform",
        "sentiment",
        "location",
        "engagements",
        "media_type",
    ])?;

    for record in table.records() {
        let date = record.date.format("%Y-%m-%d %H:%M:%S").to_string();
        let engagements = record.engagements.to_string();
        writer.write_record([
            date.as_str(),
            record.platform.as_deref().unwrap_or(""),
            record.sentiment.as_deref().unwrap_or(""),
            record.location.as_deref().unwrap_or(""),
            engagements.as_str(),
            record.media_type.as_deref().unwrap_or(""),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| DashboardError::IoError(e.into_error()))
}

pub fn aggregates_json(report: &DashboardReport) -> Result<String> {
    let value = serde_json::json!({
        "model": report.model.model_id(),
        "statuses": report.statuses,
        "cleaning": report.table.as_ref().map(CleanedTable::report),
        "panels": report.panels,
        "summary": report.summary,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

/// AI 成功產生的內容；沒有就不輸出這個檔案
pub fn insights_markdown(report: &DashboardReport) -> Option<String> {
    if !report.has_ai_output() {
        return None;
    }

    let mut sections = vec![format!("# AI Insights ({})", report.model)];
    if let Some(recommendation) = report.recommendation.as_ref().filter(|s| s.is_success()) {
        sections.push(format!(
            "## Overall Campaign Recommendation\n\n{}",
            recommendation.text.trim()
        ));
    }
    for insight in report.insights.iter().filter(|i| i.status.is_success()) {
        sections.push(format!(
            "## {}\n\nTop 3 Insights:\n\n{}",
            insight.kind.title(),
            insight.status.text.trim()
        ));
    }

    Some(sections.join("\n\n") + "\n")
}

pub fn build_report_archive(report: &DashboardReport, dashboard_text: &str) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file::<_, ()>(DASHBOARD_TXT, FileOptions::default())?;
    zip.write_all(dashboard_text.as_bytes())?;

    zip.start_file::<_, ()>(AGGREGATES_JSON, FileOptions::default())?;
    zip.write_all(aggregates_json(report)?.as_bytes())?;

    if let Some(table) = &report.table {
        zip.start_file::<_, ()>(CLEANED_CSV, FileOptions::default())?;
        zip.write_all(&cleaned_csv(table)?)?;
    }

    if let Some(markdown) = insights_markdown(report) {
        zip.start_file::<_, ()>(INSIGHTS_MD, FileOptions::default())?;
        zip.write_all(markdown.as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
