use anyhow::Context;
use clap::Parser;
use media_intel::app::render::render_dashboard;
use media_intel::domain::ports::ConfigProvider;
use media_intel::utils::error::ErrorSeverity;
use media_intel::utils::validation::usable_api_key;
use media_intel::utils::{logger, validation::Validate};
use media_intel::{clean, CleanOutcome, DashboardEngine, LocalStorage, ReportPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-dashboard")]
#[command(about = "Media intelligence dashboard driven by a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "dashboard.toml")]
    config: String,

    /// Override the CSV path from the config
    #[arg(short, long)]
    input: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Clean the CSV and report what would run, without AI calls or export
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    logger::init_logger(args.verbose, config.json_logs());
    tracing::info!("🚀 Starting TOML-based dashboard");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 套用命令列覆蓋設定
    if let Some(input) = args.input.clone() {
        tracing::info!("🔧 Input overridden to: {}", input);
        config.input.path = Some(input);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No AI calls or export will occur");
        return perform_dry_run(&config).await;
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(".".to_string());
    let pipeline = ReportPipeline::new(storage, config).context("failed to set up AI client")?;
    let engine = DashboardEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(outcome) => {
            println!("{}", render_dashboard(&outcome.report));
            if let Some(path) = outcome.output_path {
                println!("📁 Report saved to: {}", path);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Dashboard build failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Input: {}", config.input_path());
    println!("  Output: {}", config.output_path());
    println!("  Export: {}", config.export_report());
    println!("  Model: {}", config.model());
    println!(
        "  AI: {}",
        if usable_api_key(config.api_key()).is_some() {
            "enabled"
        } else {
            "disabled (no API key)"
        }
    );
    println!("  Campaign Recommendation: {}", config.campaign_recommendation());

    if !config.chart_insights().is_empty() {
        let charts: Vec<&str> = config.chart_insights().iter().map(|k| k.title()).collect();
        println!("  Chart Insights: {}", charts.join(", "));
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");
    println!();

    let bytes = tokio::fs::read(config.input_path())
        .await
        .with_context(|| format!("failed to read {}", config.input_path()))?;

    match clean(&bytes) {
        Ok(outcome) => {
            let report = outcome.report();
            println!("🧹 Cleaning:");
            println!("  Rows read: {}", report.rows_read);
            println!("  Rows kept: {}", report.rows_kept());
            println!("  Rows dropped (undated): {}", report.rows_dropped);
            for warning in &report.warnings {
                println!("  ⚠️ {}", warning);
            }
            if let CleanOutcome::Empty(_) = outcome {
                println!("  ⚠️ No valid data found after cleaning");
            }
        }
        Err(e) => println!("  ❌ {}", e.user_friendly_message()),
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
