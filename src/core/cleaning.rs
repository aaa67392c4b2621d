//! Ingestion and cleaning of an uploaded media export.
//!
//! `clean` turns raw CSV bytes into a [`CleanedTable`]: headers are normalized,
//! `date` and `engagements` are coerced per cell, and undated rows are dropped.
//! Every other column passes through untouched.

use crate::core::dates::parse_date_cell;
use crate::domain::model::{
    CleanOutcome, CleanedTable, CleaningReport, CleaningWarning, Column, NormalizedRecord,
    RawRecord,
};
use crate::utils::error::{DashboardError, Result};
use std::collections::{BTreeMap, HashSet};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// The parsed upload before any coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
}

/// 每個已辨識欄位在列中的位置；正規化後重複的標頭以第一個為準
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnIndex {
    positions: BTreeMap<Column, usize>,
}

impl ColumnIndex {
    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions.get(&column).copied()
    }

    pub fn contains(&self, column: Column) -> bool {
        self.positions.contains_key(&column)
    }
}

/// 欄位名稱正規化：去頭尾空白、轉小寫、空白換成底線
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// 引號只在欄位開頭才算開啟；`""` 為跳脫的引號
fn has_unterminated_quote(bytes: &[u8]) -> bool {
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut iter = bytes.iter().peekable();

    while let Some(&byte) = iter.next() {
        if in_quotes {
            if byte == b'"' {
                if iter.peek() == Some(&&b'"') {
                    iter.next();
                } else {
                    in_quotes = false;
                }
            }
            at_field_start = false;
            continue;
        }

        if byte == b'"' && at_field_start {
            in_quotes = true;
        }
        at_field_start = matches!(byte, b',' | b'\n' | b'\r');
    }

    in_quotes
}

/// 解析 CSV，第一列為標頭
pub fn parse_raw(raw_bytes: &[u8]) -> Result<RawTable> {
    let bytes = raw_bytes.strip_prefix(UTF8_BOM).unwrap_or(raw_bytes);

    // csv 讀到檔尾仍在引號內時不會報錯，會把後面所有列吞進同一格
    if has_unterminated_quote(bytes) {
        return Err(DashboardError::parse(
            "unbalanced quoting: EOF inside quoted field",
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DashboardError::parse(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(DashboardError::parse("No columns to parse from file"));
    }

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| DashboardError::parse(format!("line {}: {}", index + 2, e)))?;

        // 短列補空字串，多出來的儲存格忽略
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(RawRecord::new(fields));
    }

    Ok(RawTable { headers, rows })
}

/// Resolves where each recognized column sits. First header wins on collisions.
pub fn resolve_columns(headers: &[String]) -> (ColumnIndex, Vec<CleaningWarning>) {
    let mut index = ColumnIndex::default();
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();

    for (position, header) in headers.iter().enumerate() {
        let normalized = normalize_column_name(header);
        if !seen.insert(normalized.clone()) {
            if Column::from_normalized(&normalized).is_some() {
                warnings.push(CleaningWarning::DuplicateColumn {
                    normalized,
                    ignored_header: header.clone(),
                });
            }
            continue;
        }
        if let Some(column) = Column::from_normalized(&normalized) {
            index.positions.insert(column, position);
        }
    }

    for column in Column::ALL {
        if !index.contains(column) {
            warnings.push(CleaningWarning::MissingColumn { column });
        }
    }

    (index, warnings)
}

fn field<'a>(raw: &'a RawRecord, index: &ColumnIndex, column: Column) -> Option<&'a str> {
    let position = index.position(column)?;
    raw.fields.get(position).map(|(_, value)| value.as_str())
}

fn text_field(raw: &RawRecord, index: &ColumnIndex, column: Column) -> Option<String> {
    field(raw, index, column)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}

/// 非負整數；小數無條件捨去，其餘一律為 0
pub fn parse_engagements(cell: &str) -> u64 {
    let value = cell.trim();
    if let Ok(n) = value.parse::<u64>() {
        return n;
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 => f.trunc() as u64,
        _ => 0,
    }
}

/// Normalizes one row. Only the row's own cells are consulted; `index` comes
/// from the header and is resolved once per upload.
pub fn normalize_record(raw: &RawRecord, index: &ColumnIndex) -> NormalizedRecord {
    NormalizedRecord {
        date: field(raw, index, Column::Date).and_then(parse_date_cell),
        engagements: field(raw, index, Column::Engagements)
            .map(parse_engagements)
            .unwrap_or(0),
        platform: text_field(raw, index, Column::Platform),
        sentiment: text_field(raw, index, Column::Sentiment),
        location: text_field(raw, index, Column::Location),
        media_type: text_field(raw, index, Column::MediaType),
    }
}

/// Parses, normalizes, and filters an upload.
///
/// Returns `CleanOutcome::Empty` when no dated row survives; that is "no data",
/// not an error. Only unreadable input fails.
pub fn clean(raw_bytes: &[u8]) -> Result<CleanOutcome> {
    let raw = parse_raw(raw_bytes)?;
    let (index, warnings) = resolve_columns(&raw.headers);

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    let rows_read = raw.rows.len();
    let records: Vec<_> = raw
        .rows
        .iter()
        .map(|row| normalize_record(row, &index))
        .filter_map(NormalizedRecord::into_media_record)
        .collect();

    let report = CleaningReport {
        rows_read,
        rows_dropped: rows_read - records.len(),
        warnings,
    };

    tracing::debug!(
        "Cleaned {} rows: {} kept, {} dropped",
        report.rows_read,
        report.rows_kept(),
        report.rows_dropped
    );

    if records.is_empty() {
        return Ok(CleanOutcome::Empty(report));
    }

    let columns = Column::ALL
        .into_iter()
        .filter(|&column| index.contains(column))
        .collect();
    Ok(CleanOutcome::Cleaned(CleanedTable::new(records, columns, report)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Date,Platform,Sentiment,Location,Engagements,Media Type";

    fn cleaned(csv: &str) -> CleanedTable {
        match clean(csv.as_bytes()).unwrap() {
            CleanOutcome::Cleaned(table) => table,
            CleanOutcome::Empty(_) => panic!("expected rows"),
        }
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("Media Type"), "media_type");
        assert_eq!(normalize_column_name(" Engagements "), "engagements");
        assert_eq!(normalize_column_name("DATE"), "date");
    }

    #[test]
    fn test_non_numeric_engagements_become_zero() {
        let csv = format!(
            "{}\n2024-01-01,Twitter,Positive,NYC,10,Video\n2024-01-02,Twitter,Negative,LA,not_a_number,Image\n",
            HEADER
        );
        let table = cleaned(&csv);

        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0].engagements, 10);
        assert_eq!(table.records()[1].engagements, 0);
        assert!(table.report().warnings.is_empty());
    }

    #[test]
    fn test_parse_engagements() {
        assert_eq!(parse_engagements("42"), 42);
        assert_eq!(parse_engagements(" 7 "), 7);
        assert_eq!(parse_engagements("12.9"), 12);
        assert_eq!(parse_engagements("-5"), 0);
        assert_eq!(parse_engagements(""), 0);
        assert_eq!(parse_engagements("NaN"), 0);
        assert_eq!(parse_engagements("inf"), 0);
    }

    #[test]
    fn test_undated_row_is_dropped() {
        let csv = format!(
            "{}\n2024-01-01,Twitter,Positive,NYC,10,Video\ngarbage,Facebook,Neutral,LA,5,Image\n2024-01-03,Instagram,Positive,SF,3,Text\n",
            HEADER
        );
        let table = cleaned(&csv);

        assert_eq!(table.len(), 2);
        assert_eq!(table.report().rows_read, 3);
        assert_eq!(table.report().rows_dropped, 1);
        assert_eq!(table.records()[1].platform.as_deref(), Some("Instagram"));
    }

    #[test]
    fn test_missing_engagements_column_warns() {
        let csv = "Date,Platform\n2024-01-01,Twitter\n2024-01-02,Facebook\n";
        let table = cleaned(csv);

        assert!(table.records().iter().all(|r| r.engagements == 0));
        assert!(table.report().has_missing_column(Column::Engagements));
        assert!(!table.has_column(Column::Engagements));
    }

    #[test]
    fn test_header_only_is_empty_not_error() {
        let outcome = clean(format!("{}\n", HEADER).as_bytes()).unwrap();
        assert!(matches!(outcome, CleanOutcome::Empty(ref r) if r.rows_read == 0));
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        assert!(matches!(clean(b""), Err(DashboardError::Parse { .. })));
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let bytes = b"Date,Platform\n2024-01-01,\xFF\xFE\n";
        assert!(matches!(clean(bytes), Err(DashboardError::Parse { .. })));
    }

    #[test]
    fn test_bom_and_mixed_case_headers() {
        let csv = "\u{feff}DATE, platform ,MEDIA TYPE\n2024-01-01,Twitter,Video\n";
        let table = cleaned(csv);

        assert!(table.has_column(Column::Date));
        assert!(table.has_column(Column::Platform));
        assert!(table.has_column(Column::MediaType));
        assert_eq!(table.records()[0].media_type.as_deref(), Some("Video"));
    }

    #[test]
    fn test_duplicate_column_first_wins() {
        let csv = "Date,Media Type,media type\n2024-01-01,Video,Image\n";
        let table = cleaned(csv);

        assert_eq!(table.records()[0].media_type.as_deref(), Some("Video"));
        assert!(table.report().warnings.iter().any(|w| matches!(
            w,
            CleaningWarning::DuplicateColumn { normalized, .. } if normalized == "media_type"
        )));
    }

    #[test]
    fn test_empty_cells_are_missing_values() {
        let csv = format!("{}\n2024-01-01,,Positive,,4,\n", HEADER);
        let table = cleaned(&csv);
        let record = &table.records()[0];

        assert_eq!(record.platform, None);
        assert_eq!(record.location, None);
        assert_eq!(record.media_type, None);
        assert_eq!(record.sentiment.as_deref(), Some("Positive"));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let csv = format!("{}\n2024-01-01,Twitter\n", HEADER);
        let table = cleaned(&csv);

        assert_eq!(table.records()[0].engagements, 0);
        assert_eq!(table.records()[0].sentiment, None);
    }

    #[test]
    fn test_missing_date_column_yields_empty() {
        let outcome = clean(b"Platform,Engagements\nTwitter,10\n").unwrap();
        match outcome {
            CleanOutcome::Empty(report) => {
                assert_eq!(report.rows_dropped, 1);
                assert!(report.has_missing_column(Column::Date));
            }
            CleanOutcome::Cleaned(_) => panic!("rows without a date column must not survive"),
        }
    }

    #[test]
    fn test_unbalanced_quote_is_parse_error() {
        let csv = "Date,Platform,Engagements\n2024-01-01,\"Twitter,10\n2024-01-02,Facebook,5\n";
        match clean(csv.as_bytes()) {
            Err(DashboardError::Parse { message }) => assert!(message.contains("unbalanced quoting")),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_quoted_fields_and_literal_quotes_parse() {
        let csv = "Date,Platform,Location,Engagements\n\
                   2024-01-01,\"Twitter, Inc\",\"The \"\"Big\"\" Apple\",3\n\
                   2024-01-02,Facebook,5\" screen,4\n";
        let table = cleaned(csv);

        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0].platform.as_deref(), Some("Twitter, Inc"));
        assert_eq!(
            table.records()[0].location.as_deref(),
            Some("The \"Big\" Apple")
        );
        assert_eq!(table.records()[1].location.as_deref(), Some("5\" screen"));
    }

    #[test]
    fn test_column_index_resolved_from_header() {
        let headers: Vec<String> = ["Author", "media type", "DATE", "Media Type"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let (index, _) = resolve_columns(&headers);

        assert_eq!(index.position(Column::Date), Some(2));
        assert_eq!(index.position(Column::MediaType), Some(1));
        assert_eq!(index.position(Column::Platform), None);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let csv = "Date,Author,Engagements\n2024-01-01,Jane,3\n";
        let table = cleaned(csv);
        assert_eq!(table.total_engagements(), 3);
    }
}
