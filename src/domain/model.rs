use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// 上傳檔案中可辨識的欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Date,
    Platform,
    Sentiment,
    Location,
    Engagements,
    MediaType,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Date,
        Column::Platform,
        Column::Sentiment,
        Column::Location,
        Column::Engagements,
        Column::MediaType,
    ];

    /// 正規化後的欄位名稱
    pub fn normalized_name(self) -> &'static str {
        match self {
            Column::Date => "date",
            Column::Platform => "platform",
            Column::Sentiment => "sentiment",
            Column::Location => "location",
            Column::Engagements => "engagements",
            Column::MediaType => "media_type",
        }
    }

    /// 使用者在 CSV 標頭看到的名稱
    pub fn display_name(self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Platform => "Platform",
            Column::Sentiment => "Sentiment",
            Column::Location => "Location",
            Column::Engagements => "Engagements",
            Column::MediaType => "Media Type",
        }
    }

    pub fn from_normalized(name: &str) -> Option<Column> {
        Column::ALL
            .into_iter()
            .find(|column| column.normalized_name() == name)
    }
}

/// One row as it came out of the CSV reader: header text paired with cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub fields: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }
}

/// A raw row after header normalization and type coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub date: Option<NaiveDateTime>,
    pub engagements: u64,
    pub platform: Option<String>,
    pub sentiment: Option<String>,
    pub location: Option<String>,
    pub media_type: Option<String>,
}

impl NormalizedRecord {
    /// 日期無法解析的列回傳 `None`
    pub fn into_media_record(self) -> Option<MediaRecord> {
        let date = self.date?;
        Some(MediaRecord {
            date,
            engagements: self.engagements,
            platform: self.platform,
            sentiment: self.sentiment,
            location: self.location,
            media_type: self.media_type,
        })
    }
}

/// A cleaned row. The date is always resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaRecord {
    pub date: NaiveDateTime,
    pub engagements: u64,
    pub platform: Option<String>,
    pub sentiment: Option<String>,
    pub location: Option<String>,
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CleaningWarning {
    MissingColumn { column: Column },
    DuplicateColumn { normalized: String, ignored_header: String },
}

impl fmt::Display for CleaningWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleaningWarning::MissingColumn {
                column: Column::Engagements,
            } => write!(
                f,
                "'Engagements' column not found. Some charts may not display correctly."
            ),
            CleaningWarning::MissingColumn {
                column: Column::Date,
            } => write!(f, "'Date' column not found. No rows can be dated."),
            CleaningWarning::MissingColumn { column } => write!(
                f,
                "'{}' column not found. Charts that need it will be unavailable.",
                column.display_name()
            ),
            CleaningWarning::DuplicateColumn {
                normalized,
                ignored_header,
            } => write!(
                f,
                "Column '{}' duplicates '{}' after normalization and was ignored.",
                ignored_header, normalized
            ),
        }
    }
}

/// 清理過程的統計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub warnings: Vec<CleaningWarning>,
}

impl CleaningReport {
    pub fn rows_kept(&self) -> usize {
        self.rows_read - self.rows_dropped
    }

    pub fn has_missing_column(&self, column: Column) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, CleaningWarning::MissingColumn { column: c } if *c == column))
    }
}

/// The validated table for one upload. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedTable {
    records: Vec<MediaRecord>,
    columns: BTreeSet<Column>,
    report: CleaningReport,
}

impl CleanedTable {
    pub(crate) fn new(
        records: Vec<MediaRecord>,
        columns: BTreeSet<Column>,
        report: CleaningReport,
    ) -> Self {
        Self {
            records,
            columns,
            report,
        }
    }

    pub fn records(&self) -> &[MediaRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 標頭中實際出現的欄位
    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn report(&self) -> &CleaningReport {
        &self.report
    }

    pub fn total_engagements(&self) -> u64 {
        self.records
            .iter()
            .map(|r| r.engagements)
            .fold(0, u64::saturating_add)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanOutcome {
    Cleaned(CleanedTable),
    /// 清理後沒有任何一列：不是錯誤，只是沒有資料
    Empty(CleaningReport),
}

impl CleanOutcome {
    pub fn report(&self) -> &CleaningReport {
        match self {
            CleanOutcome::Cleaned(table) => table.report(),
            CleanOutcome::Empty(report) => report,
        }
    }

    pub fn table(&self) -> Option<&CleanedTable> {
        match self {
            CleanOutcome::Cleaned(table) => Some(table),
            CleanOutcome::Empty(_) => None,
        }
    }

    pub fn into_table(self) -> Option<CleanedTable> {
        match self {
            CleanOutcome::Cleaned(table) => Some(table),
            CleanOutcome::Empty(_) => None,
        }
    }
}

/// 可選用的遠端模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ModelChoice {
    #[default]
    MistralInstruct,
    GeminiFlash,
    DeepseekR1,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 3] = [
        ModelChoice::MistralInstruct,
        ModelChoice::GeminiFlash,
        ModelChoice::DeepseekR1,
    ];

    pub fn model_id(self) -> &'static str {
        match self {
            ModelChoice::MistralInstruct => "mistralai/mistral-7b-instruct",
            ModelChoice::GeminiFlash => "google/gemini-2.0-flash-exp:free",
            ModelChoice::DeepseekR1 => "deepseek/deepseek-r1-distill-llama-70b:free",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ModelChoice::MistralInstruct => "Mistral 7B Instruct",
            ModelChoice::GeminiFlash => "Google Gemini-2.0-flash",
            ModelChoice::DeepseekR1 => "Deepseek-r1",
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.model_id())
    }
}
