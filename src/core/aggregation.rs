//! Derived views over a [`CleanedTable`].
//!
//! Every function here is pure and recomputes from the table on each call.
//! Descending sorts break ties by key ascending, with the missing bucket last.
//! Engagement sums saturate at `u64::MAX`.

use crate::domain::model::{CleanedTable, MediaRecord};
use crate::domain::views::{
    AggregateEntry, AggregateView, Bucket, CategoryView, SummaryStatistics, TrendView,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub const TOP_LIMIT: usize = 5;

fn count_by<F>(table: &CleanedTable, key: F) -> BTreeMap<Bucket, u64>
where
    F: Fn(&MediaRecord) -> Option<&str>,
{
    let mut groups = BTreeMap::new();
    for record in table.records() {
        *groups.entry(Bucket::from_value(key(record))).or_insert(0) += 1;
    }
    groups
}

fn sum_by<F>(table: &CleanedTable, key: F) -> BTreeMap<Bucket, u64>
where
    F: Fn(&MediaRecord) -> Option<&str>,
{
    let mut groups = BTreeMap::new();
    for record in table.records() {
        let sum = groups.entry(Bucket::from_value(key(record))).or_insert(0u64);
        *sum = sum.saturating_add(record.engagements);
    }
    groups
}

fn by_key(groups: BTreeMap<Bucket, u64>) -> Vec<AggregateEntry<Bucket>> {
    groups
        .into_iter()
        .map(|(key, value)| AggregateEntry { key, value })
        .collect()
}

/// 依數值遞減；BTreeMap 已按鍵排序，穩定排序保留鍵的次序作為平手規則
fn by_value_desc(groups: BTreeMap<Bucket, u64>) -> Vec<AggregateEntry<Bucket>> {
    let mut entries = by_key(groups);
    entries.sort_by(|a, b| b.value.cmp(&a.value));
    entries
}

fn top(mut entries: Vec<AggregateEntry<Bucket>>, limit: usize) -> Vec<AggregateEntry<Bucket>> {
    entries.truncate(limit);
    entries
}

pub fn sentiment_breakdown(table: &CleanedTable) -> CategoryView {
    let groups = count_by(table, |r| r.sentiment.as_deref());
    AggregateView::new("Sentiment Breakdown", by_value_desc(groups))
}

/// 依日期（去掉時間）加總互動數，日期遞增
pub fn engagement_trend(table: &CleanedTable) -> TrendView {
    let mut groups: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in table.records() {
        let sum = groups.entry(record.date.date()).or_insert(0u64);
        *sum = sum.saturating_add(record.engagements);
    }
    let entries = groups
        .into_iter()
        .map(|(key, value)| AggregateEntry { key, value })
        .collect();
    AggregateView::new("Engagement Trend", entries)
}

pub fn platform_engagements(table: &CleanedTable) -> CategoryView {
    let groups = sum_by(table, |r| r.platform.as_deref());
    AggregateView::new("Platform Engagements", by_key(groups))
}

pub fn media_type_mix(table: &CleanedTable) -> CategoryView {
    let groups = count_by(table, |r| r.media_type.as_deref());
    AggregateView::new("Media Type Mix", by_value_desc(groups))
}

pub fn top_locations(table: &CleanedTable) -> CategoryView {
    let groups = sum_by(table, |r| r.location.as_deref());
    AggregateView::new("Top Locations", top(by_value_desc(groups), TOP_LIMIT))
}

/// Statistics for the campaign prompt; every view is trimmed to its top five.
pub fn summary_statistics(table: &CleanedTable) -> SummaryStatistics {
    let trend = engagement_trend(table);
    let platforms = sum_by(table, |r| r.platform.as_deref());

    SummaryStatistics {
        total_rows: table.len(),
        first_date: table.records().iter().map(|r| r.date.date()).min(),
        last_date: table.records().iter().map(|r| r.date.date()).max(),
        sentiment: sentiment_breakdown(table).head(TOP_LIMIT),
        top_platforms: AggregateView::new(
            "Top Platforms by Engagements",
            top(by_value_desc(platforms), TOP_LIMIT),
        ),
        top_media_types: media_type_mix(table).head(TOP_LIMIT),
        top_locations: top_locations(table),
        trend_head: trend.head(TOP_LIMIT),
        trend_tail: trend.tail(TOP_LIMIT),
    }
}
