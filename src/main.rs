use clap::Parser;
use rank_tracker::app::{report::ReportFormat, seed};
use rank_tracker::core::metrics;
use rank_tracker::utils::error::{ErrorSeverity, RankError};
use rank_tracker::utils::{logger, validation::Validate};
use rank_tracker::{
    AutoTracker, CliConfig, LocalStorage, RankRegistry, ReportWriter, SimulatedRankChecker,
    TrackerConfig, TracingListener,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting rank-tracker");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ rank-tracker failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

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

    Ok(())
}

async fn run(cli: &CliConfig) -> Result<(), RankError> {
    // 載入配置
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            TrackerConfig::from_file(path)?
        }
        None => TrackerConfig::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");

    let mut registry = RankRegistry::new();
    registry.subscribe(Arc::new(TracingListener));

    if cli.demo || config.businesses.is_empty() {
        seed::seed_demo_data(&mut registry)?;
    }
    let added = seed::seed_from_config(&mut registry, &config.businesses)?;
    if added > 0 {
        tracing::info!("🏢 Added {} businesses from config", added);
    }
    registry.set_tracking(config.tracking.enabled);

    let checker = match config.tracking.seed {
        Some(seed) => SimulatedRankChecker::seeded(
            config.tracking.min_position,
            config.tracking.max_position,
            seed,
        )?,
        None => SimulatedRankChecker::new(
            config.tracking.min_position,
            config.tracking.max_position,
        )?,
    };
    let tracker = AutoTracker::new(checker, config.tracking_interval())
        .track_all_businesses(config.track_all_businesses());

    tracing::info!(
        "⏱️ Running {} tracking rounds every {:?}",
        cli.ticks,
        tracker.interval()
    );
    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    let summary = tracker
        .run_until(&mut registry, Some(cli.ticks), shutdown)
        .await;
    tracing::info!(
        "📊 {} rounds, {} checks recorded, {} failed",
        summary.ticks,
        summary.checked,
        summary.failed
    );

    print_summary(&registry);

    if let Some(report) = &config.report {
        let formats = ReportFormat::parse_all(&report.formats)?;
        let writer = ReportWriter::new(LocalStorage::new(report.output_path.clone()))
            .with_alignment(config.align_options());
        let written = writer.export(&registry, &formats).await?;
        println!("📁 {} report files saved to: {}", written.len(), report.output_path);
    }

    Ok(())
}

fn print_summary(registry: &RankRegistry) {
    for business in registry.list_businesses() {
        let rollup = metrics::rollup(business.keywords());
        let marker = if registry.selected_business_id() == Some(business.id()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {} ({}) - {} keywords, {} ranked ({}%), {} in top 10, {} improving, avg #{}",
            marker,
            business.name(),
            business.domain(),
            rollup.total_keywords,
            rollup.ranked_keywords,
            rollup.ranked_percentage(),
            rollup.top_ten_rankings,
            rollup.improving_keywords,
            rollup.average_position
        );

        for keyword in business.keywords() {
            let summary = metrics::summarize_keyword(keyword);
            let current = summary
                .current_position
                .map(|p| format!("#{}", p))
                .unwrap_or_else(|| "Not ranked".to_string());
            let recent: Vec<String> = keyword
                .tracking_history()
                .recent(5)
                .iter()
                .map(|o| o.position.to_string())
                .collect();
            println!(
                "    {:<28} {:>10}  {:<14} [{}] best {} avg {} ({} checks) recent [{}]",
                summary.term,
                current,
                metrics::describe_change(summary.current_position, summary.previous_position),
                summary.tier,
                summary.best_position.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
                summary.average_position.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
                summary.checks_recorded,
                recent.join(", ")
            );
        }
    }
}
