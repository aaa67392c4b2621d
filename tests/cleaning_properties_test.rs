use media_intel::core::aggregation::{
    engagement_trend, media_type_mix, platform_engagements, sentiment_breakdown, top_locations,
    TOP_LIMIT,
};
use media_intel::domain::model::{CleaningWarning, Column};
use media_intel::{clean, CleanOutcome, CleanedTable};

const PLATFORMS: [&str; 5] = ["Twitter", "Instagram", "Facebook", "TikTok", ""];
const SENTIMENTS: [&str; 4] = ["Positive", "Negative", "Neutral", ""];
const LOCATIONS: [&str; 9] = [
    "Jakarta", "Bandung", "Surabaya", "Medan", "Bali", "Makassar", "Semarang", "Bogor", "",
];
const MEDIA_TYPES: [&str; 4] = ["Video", "Image", "Text", ""];
const DATES: [&str; 7] = [
    "2024-01-01",
    "2024-01-02 09:30:00",
    "01/03/2024",
    "2024-01-04T12:00:00Z",
    "garbage",
    "",
    "2024-01-05",
];
const ENGAGEMENTS: [&str; 8] = ["10", "0", "not_a_number", "250", "-4", "3.9", "", "1e2"];

/// 簡單的線性同餘產生器，讓測試資料可重現
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.next() % items.len()]
    }
}

fn generated_csv(seed: u64, rows: usize) -> String {
    let mut rng = Lcg(seed);
    let mut csv = String::from("Date,Platform,Sentiment,Location,Engagements,Media Type\n");
    for _ in 0..rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            rng.pick(&DATES),
            rng.pick(&PLATFORMS),
            rng.pick(&SENTIMENTS),
            rng.pick(&LOCATIONS),
            rng.pick(&ENGAGEMENTS),
            rng.pick(&MEDIA_TYPES),
        ));
    }
    csv
}

fn cleaned(csv: &str) -> CleanedTable {
    clean(csv.as_bytes())
        .unwrap()
        .into_table()
        .expect("generated data should keep at least one row")
}

#[test]
fn test_clean_is_idempotent() {
    for seed in 0..20 {
        let csv = generated_csv(seed, 60);
        let first = clean(csv.as_bytes()).unwrap();
        let second = clean(csv.as_bytes()).unwrap();
        assert_eq!(first.table(), second.table(), "seed {}", seed);
        assert_eq!(first.report(), second.report(), "seed {}", seed);
    }
}

#[test]
fn test_rows_are_kept_or_dropped_never_lost() {
    for seed in 0..20 {
        let table = cleaned(&generated_csv(seed, 80));
        let report = table.report();
        assert_eq!(report.rows_read, 80);
        assert_eq!(report.rows_kept() + report.rows_dropped, report.rows_read);
        assert_eq!(table.len(), report.rows_kept());
    }
}

#[test]
fn test_count_conservation() {
    for seed in 0..20 {
        let table = cleaned(&generated_csv(seed, 80));
        assert_eq!(sentiment_breakdown(&table).total(), table.len() as u64);
        assert_eq!(media_type_mix(&table).total(), table.len() as u64);
    }
}

#[test]
fn test_sum_conservation() {
    for seed in 0..20 {
        let table = cleaned(&generated_csv(seed, 80));
        let total = table.total_engagements();
        assert_eq!(platform_engagements(&table).total(), total);
        assert_eq!(engagement_trend(&table).total(), total);
    }
}

#[test]
fn test_top_locations_bound() {
    for seed in 0..20 {
        let table = cleaned(&generated_csv(seed, 120));
        let top = top_locations(&table);
        assert!(top.len() <= TOP_LIMIT);

        // 和完整的加總比較：被排除的值不可大於保留的最小值
        let mut all: std::collections::HashMap<Option<String>, u64> =
            std::collections::HashMap::new();
        for record in table.records() {
            *all.entry(record.location.clone()).or_insert(0) += record.engagements;
        }
        let kept_min = top.entries.iter().map(|e| e.value).min().unwrap_or(0);
        let kept: Vec<String> = top.entries.iter().map(|e| e.key.to_string()).collect();
        for (location, value) in &all {
            let label = location.clone().unwrap_or_else(|| "(missing)".to_string());
            if !kept.contains(&label) {
                assert!(*value <= kept_min, "seed {}: {} excluded", seed, label);
            }
        }
        assert!(top
            .entries
            .windows(2)
            .all(|pair| pair[0].value >= pair[1].value));
    }
}

#[test]
fn test_scenario_non_numeric_engagements() {
    let table = cleaned(
        "Date,Platform,Sentiment,Location,Engagements,Media Type\n\
         2024-01-01,Twitter,Positive,NYC,10,Video\n\
         2024-01-02,Twitter,Negative,LA,not_a_number,Image\n",
    );

    assert_eq!(table.len(), 2);
    assert_eq!(table.records()[1].engagements, 0);
    assert_eq!(platform_engagements(&table).describe(), "{Twitter: 10}");
}

#[test]
fn test_scenario_unparseable_date_drops_one_row() {
    let valid = "Date,Platform,Engagements\n2024-01-01,Twitter,1\n2024-01-02,Instagram,2\n";
    let with_garbage =
        "Date,Platform,Engagements\n2024-01-01,Twitter,1\ngarbage,Facebook,9\n2024-01-02,Instagram,2\n";

    let base = cleaned(valid);
    let dropped = cleaned(with_garbage);

    assert_eq!(dropped.len(), dropped.report().rows_read - 1);
    assert_eq!(dropped.records(), base.records());
    assert_eq!(dropped.report().rows_dropped, 1);
}

#[test]
fn test_scenario_missing_engagements_column() {
    let outcome = clean(b"Date,Platform\n2024-01-01,Twitter\n2024-01-02,Facebook\n").unwrap();

    assert!(outcome.report().warnings.contains(&CleaningWarning::MissingColumn {
        column: Column::Engagements
    }));
    let table = outcome.into_table().unwrap();
    assert!(table.records().iter().all(|r| r.engagements == 0));
    assert_eq!(platform_engagements(&table).total(), 0);
    assert_eq!(engagement_trend(&table).len(), 2);
}

#[test]
fn test_scenario_header_only_is_empty_not_error() {
    let outcome =
        clean(b"Date,Platform,Sentiment,Location,Engagements,Media Type\n").unwrap();

    assert!(matches!(outcome, CleanOutcome::Empty(_)));
    assert_eq!(outcome.report().rows_read, 0);
}
