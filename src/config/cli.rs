use super::input_locations::DEFAULT_LOCATIONS_FILE;
use super::EtlConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "fdc-etl")]
#[command(about = "Load a USDA FoodData Central CSV export into SQLite")]
pub struct CliConfig {
    /// TOML configuration, or a key=value input locations file
    #[arg(short, long, default_value = DEFAULT_LOCATIONS_FILE)]
    pub config: PathBuf,

    /// Override the database path from the configuration
    #[arg(long)]
    pub database: Option<String>,

    /// Override the number of rows committed per transaction
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log CPU and memory usage at each phase
    #[arg(long)]
    pub monitor: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Validate configuration and resolve sources without running
    #[arg(long)]
    pub dry_run: bool,
}

impl CliConfig {
    /// Reads the configuration file and applies command-line overrides.
    pub fn resolve(&self) -> Result<EtlConfig> {
        let mut config = EtlConfig::from_file(&self.config)?;

        if let Some(database) = &self.database {
            tracing::info!("🔧 Database path overridden to: {}", database);
            config = config.with_database_path(database.clone());
        }
        if let Some(batch_size) = self.batch_size {
            tracing::info!("🔧 Batch size overridden to: {}", batch_size);
            config = config.with_batch_size(batch_size);
        }
        if self.monitor {
            config = config.with_monitoring(true);
        }

        Ok(config)
    }
}
