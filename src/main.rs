use anyhow::Context;
use clap::Parser;
use fdc_etl::core::extract::SourceMap;
use fdc_etl::utils::{logger, validation::Validate};
use fdc_etl::{
    CliConfig, EtlConfig, EtlEngine, EtlError, FdcPipeline, LoadSummary, PipelineSettings,
    RunReport,
};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose, cli.json_logs);

    tracing::info!("🚀 Starting fdc-etl");
    tracing::info!("📁 Loading configuration from: {}", cli.config.display());
    tracing::debug!("CLI config: {:?}", cli);

    let config = cli
        .resolve()
        .and_then(|config| config.validate().map(|_| config));
    let config = match config {
        Ok(config) => config,
        Err(e) => fail(e),
    };

    // Every entity must have a source before anything is read.
    let settings = match PipelineSettings::from_config(&config) {
        Ok(settings) => settings,
        Err(e) => fail(e),
    };

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &settings.sources);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No data will be read or written");
        return Ok(());
    }

    if config.monitoring {
        tracing::info!("🔍 System monitoring enabled");
    }

    let engine = EtlEngine::new_with_monitoring(FdcPipeline::new(settings), config.monitoring);

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ ETL process completed successfully!");
            println!("✅ ETL process completed successfully!");
            println!(
                "📁 {} rows loaded into {}",
                report.loaded.rows_inserted(),
                report.loaded.database.display()
            );

            if let Some(path) = &cli.report {
                write_report(path, &report)?;
                println!("📝 Run report written to {}", path.display());
            }
        }
        Err(e) => fail(e),
    }

    Ok(())
}

fn fail(e: EtlError) -> ! {
    tracing::error!(
        "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code())
}

fn write_report(path: &Path, report: &RunReport<LoadSummary>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("serializing run report")?;
    std::fs::write(path, json)
        .with_context(|| format!("writing run report to {}", path.display()))?;
    Ok(())
}

fn display_config_summary(config: &EtlConfig, sources: &SourceMap) {
    println!("📋 Configuration Summary:");
    println!("  Pipeline: {}", config.name);
    println!("  Database: {}", config.database_path);
    println!("  Batch size: {}", config.batch_size);
    println!("  Sources:");
    for (entity, path) in sources.iter() {
        println!("    {:<14} {}", entity.as_str(), path.display());
    }
    println!();
}
