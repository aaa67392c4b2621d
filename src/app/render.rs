use crate::domain::report::{ChartPanel, DashboardReport, PanelState};
use crate::domain::views::{AggregateView, ChartData};
use std::fmt::{Display, Write};

const BAR_WIDTH: u64 = 40;

fn bar(value: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    // 非零值至少畫一格；用 u128 避免大數相乘溢位
    let width = (u128::from(value) * u128::from(BAR_WIDTH)).div_ceil(u128::from(max));
    "█".repeat(width as usize)
}

fn render_view<K: Clone + Display>(out: &mut String, view: &AggregateView<K>) {
    let labels: Vec<String> = view.entries.iter().map(|e| e.key.to_string()).collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let max = view.max_value();

    for (label, entry) in labels.iter().zip(&view.entries) {
        let _ = writeln!(
            out,
            "  {:<width$}  {:>8}  {}",
            label,
            entry.value,
            bar(entry.value, max),
            width = label_width
        );
    }
}

pub fn render_panel(panel: &ChartPanel) -> String {
    let mut out = format!("── {} ──\n", panel.kind.title());
    match &panel.state {
        PanelState::Ready(ChartData::Categorical(view)) => render_view(&mut out, view),
        PanelState::Ready(ChartData::Temporal(view)) => render_view(&mut out, view),
        PanelState::Unavailable(status) => {
            let _ = writeln!(out, "  {}", status);
        }
    }
    out
}

/// 整份儀表板的文字版
pub fn render_dashboard(report: &DashboardReport) -> String {
    let mut out = String::from("Interactive Media Intelligence Dashboard\n\n");

    for status in &report.statuses {
        let _ = writeln!(out, "{}", status);
    }

    if let Some(summary) = &report.summary {
        let _ = writeln!(out, "\nTotal entries: {}", summary.total_rows);
        if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
            let _ = writeln!(out, "Date range: {} to {}", first, last);
        }
    }

    for panel in &report.panels {
        out.push('\n');
        out.push_str(&render_panel(panel));
    }

    if let Some(recommendation) = &report.recommendation {
        let _ = write!(out, "\n── Overall Campaign Recommendation ──\n{}\n", recommendation);
    }

    for insight in &report.insights {
        let _ = write!(
            out,
            "\n── Insights: {} ──\n{}\n",
            insight.kind.title(),
            insight.status
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::Session;
    use crate::domain::model::ModelChoice;
    use crate::domain::views::ChartKind;

    fn report(csv: &str) -> DashboardReport {
        let mut session = Session::new(ModelChoice::default());
        let statuses = session.upload(csv.as_bytes());
        DashboardReport {
            model: session.model(),
            statuses,
            panels: session.chart_panels(),
            summary: session.summary(),
            table: session.table().cloned(),
            recommendation: None,
            insights: vec![],
        }
    }

    #[test]
    fn test_bar_scales_to_max() {
        assert_eq!(bar(10, 10).chars().count(), 40);
        assert_eq!(bar(1, 1000).chars().count(), 1);
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(0, 0), "");
        assert_eq!(bar(u64::MAX, u64::MAX).chars().count(), 40);
        assert_eq!(bar(u64::MAX / 2, u64::MAX).chars().count(), 20);
    }

    #[test]
    fn test_dashboard_shows_panels_and_warnings() {
        let text = render_dashboard(&report(
            "Date,Platform,Engagements\n2024-01-01,Twitter,10\n2024-01-02,Facebook,5\n",
        ));

        assert!(text.contains("── Platform Engagements ──"));
        assert!(text.contains("Twitter"));
        assert!(text.contains("Sentiment column not found"));
        assert!(text.contains("Date range: 2024-01-01 to 2024-01-02"));
    }

    #[test]
    fn test_render_panel_lists_every_entry() {
        let r = report("Date,Media Type\n2024-01-01,Video\n2024-01-02,Video\n2024-01-03,Image\n");
        let panel = r.panel(ChartKind::MediaTypes).unwrap();
        let text = render_panel(panel);

        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(1).unwrap().contains("Video"));
    }
}
