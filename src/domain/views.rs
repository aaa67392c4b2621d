use crate::domain::model::Column;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 分類鍵。缺值自成一組，排序時在所有具名值之後。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum Bucket {
    Named(String),
    Missing,
}

impl Bucket {
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some(v) => Bucket::Named(v.to_string()),
            None => Bucket::Missing,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Named(name) => f.write_str(name),
            Bucket::Missing => f.write_str("(missing)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateEntry<K> {
    pub key: K,
    pub value: u64,
}

/// An ordered derived view: category or date mapped to a count or an engagement sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateView<K> {
    pub name: &'static str,
    pub entries: Vec<AggregateEntry<K>>,
}

impl<K: Clone + fmt::Display> AggregateView<K> {
    pub fn new(name: &'static str, entries: Vec<AggregateEntry<K>>) -> Self {
        Self { name, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.value).fold(0, u64::saturating_add)
    }

    pub fn max_value(&self) -> u64 {
        self.entries.iter().map(|e| e.value).max().unwrap_or(0)
    }

    pub fn value_of(&self, key: &K) -> Option<u64>
    where
        K: PartialEq,
    {
        self.entries.iter().find(|e| &e.key == key).map(|e| e.value)
    }

    /// 前 n 筆（保持原本順序）
    pub fn head(&self, n: usize) -> Self {
        Self::new(self.name, self.entries.iter().take(n).cloned().collect())
    }

    /// 後 n 筆（保持原本順序）
    pub fn tail(&self, n: usize) -> Self {
        let skip = self.entries.len().saturating_sub(n);
        Self::new(self.name, self.entries.iter().skip(skip).cloned().collect())
    }

    /// `{Twitter: 10, Facebook: 4}`
    pub fn describe(&self) -> String {
        let body = self
            .entries
            .iter()
            .map(|e| format!("{}: {}", e.key, e.value))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{{}}}", body)
    }

    /// One `key value` line per entry, used for table-like prompt samples.
    pub fn describe_rows(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{} {}", e.key, e.value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub type CategoryView = AggregateView<Bucket>;
pub type TrendView = AggregateView<NaiveDate>;

/// The five chart panels of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Sentiment,
    Trend,
    Platforms,
    MediaTypes,
    Locations,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Sentiment,
        ChartKind::Trend,
        ChartKind::Platforms,
        ChartKind::MediaTypes,
        ChartKind::Locations,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Sentiment => "Sentiment Breakdown",
            ChartKind::Trend => "Engagement Trend Over Time",
            ChartKind::Platforms => "Platform Engagements",
            ChartKind::MediaTypes => "Media Type Mix",
            ChartKind::Locations => "Top 5 Locations by Engagement",
        }
    }

    /// 畫這張圖一定要有的欄位（日期與互動數在清理後必定存在）
    pub fn required_column(self) -> Option<Column> {
        match self {
            ChartKind::Sentiment => Some(Column::Sentiment),
            ChartKind::Trend => None,
            ChartKind::Platforms => Some(Column::Platform),
            ChartKind::MediaTypes => Some(Column::MediaType),
            ChartKind::Locations => Some(Column::Location),
        }
    }

    pub fn missing_column_message(self) -> String {
        let column = match self.required_column() {
            Some(column) => column.display_name(),
            None => "Date or Engagements",
        };
        format!(
            "{} column not found in the uploaded CSV. Cannot generate {} chart.",
            column,
            self.title()
        )
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChartData {
    Categorical(CategoryView),
    Temporal(TrendView),
}

/// Overall statistics handed to the AI as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryStatistics {
    pub total_rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub sentiment: CategoryView,
    pub top_platforms: CategoryView,
    pub top_media_types: CategoryView,
    pub top_locations: CategoryView,
    pub trend_head: TrendView,
    pub trend_tail: TrendView,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> CategoryView {
        AggregateView::new(
            "test",
            vec![
                AggregateEntry {
                    key: Bucket::Named("Twitter".into()),
                    value: 10,
                },
                AggregateEntry {
                    key: Bucket::Missing,
                    value: 4,
                },
            ],
        )
    }

    #[test]
    fn test_missing_bucket_sorts_after_named() {
        assert!(Bucket::Named("zzz".into()) < Bucket::Missing);
        assert!(Bucket::Named("A".into()) < Bucket::Named("B".into()));
    }

    #[test]
    fn test_describe_includes_missing_bucket() {
        assert_eq!(view().describe(), "{Twitter: 10, (missing): 4}");
        assert_eq!(view().total(), 14);
    }

    #[test]
    fn test_head_and_tail() {
        let v = view();
        assert_eq!(v.head(1).entries[0].value, 10);
        assert_eq!(v.tail(1).entries[0].key, Bucket::Missing);
        assert_eq!(v.tail(10).len(), 2);
    }

    #[test]
    fn test_missing_bucket_serializes_as_null() {
        let json = serde_json::to_value(&view()).unwrap();
        assert_eq!(json["entries"][1]["key"], serde_json::Value::Null);
        assert_eq!(json["entries"][0]["key"], "Twitter");
    }
}
