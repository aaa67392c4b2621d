use crate::core::aggregation::{
    engagement_trend, media_type_mix, platform_engagements, sentiment_breakdown, top_locations,
    TOP_LIMIT,
};
use crate::domain::model::CleanedTable;
use crate::domain::views::{ChartKind, SummaryStatistics};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 每張圖給 AI 的資料描述
pub fn chart_description(kind: ChartKind, table: &CleanedTable) -> String {
    match kind {
        ChartKind::Sentiment => format!(
            "Sentiment distribution: {}",
            sentiment_breakdown(table).describe()
        ),
        ChartKind::Trend => {
            // 只送頭尾樣本，避免整段時間序列塞進 prompt
            let trend = engagement_trend(table);
            format!(
                "Engagement data over time (sample):\n{}\n...\n{}",
                trend.head(TOP_LIMIT).describe_rows(),
                trend.tail(TOP_LIMIT).describe_rows()
            )
        }
        ChartKind::Platforms => format!(
            "Platform engagements: {}",
            platform_engagements(table).describe()
        ),
        ChartKind::MediaTypes => format!(
            "Media type distribution: {}",
            media_type_mix(table).describe()
        ),
        ChartKind::Locations => format!(
            "Top 5 locations by engagement: {}",
            top_locations(table).describe()
        ),
    }
}

pub fn chart_insight_prompt(kind: ChartKind, description: &str) -> String {
    format!(
        "Given the following data for a \"{}\" chart:\n{}\n\n\
         Provide 3 concise and actionable insights based on this data. Format them as a bulleted list.",
        kind.title(),
        description
    )
}

pub fn data_summary(summary: &SummaryStatistics) -> String {
    let date_range = match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => format!(
            "{} to {}",
            first.format(DATE_FORMAT),
            last.format(DATE_FORMAT)
        ),
        _ => "unknown".to_string(),
    };

    format!(
        "Overall Data Summary:\n\
         Total entries: {}\n\
         Date range: {}\n\n\
         Sentiment Breakdown:\n{}\n\n\
         Top 5 Platforms by Engagements:\n{}\n\n\
         Top 5 Media Types by Count:\n{}\n\n\
         Top 5 Locations by Engagements:\n{}\n\n\
         Engagement trend (first 5 and last 5 dates):\n{}\n...\n{}",
        summary.total_rows,
        date_range,
        summary.sentiment.describe(),
        summary.top_platforms.describe(),
        summary.top_media_types.describe(),
        summary.top_locations.describe(),
        summary.trend_head.describe(),
        summary.trend_tail.describe()
    )
}

pub fn campaign_prompt(summary: &SummaryStatistics) -> String {
    format!(
        "Analyze the following media intelligence data. Based on the sentiment breakdown, \
         engagement trends, platform performance, media type mix, and top locations, provide a \
         concise campaign recommendation.\n\
         The recommendation should clearly state 'What's Working' and 'What Needs to be Improved' \
         to optimize future media strategies. Focus on actionable advice.\n\n\
         {}\n\n\
         Campaign Recommendation:",
        data_summary(summary)
    )
}
