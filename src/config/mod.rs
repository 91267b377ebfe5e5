pub mod toml_config;

pub use toml_config::{BusinessSeed, TrackerConfig, TrackingScope};

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "rank-tracker")]
#[command(about = "Track search ranking positions for client businesses")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Load the demo businesses and their ranking history
    #[arg(long)]
    pub demo: bool,

    /// Number of tracking rounds to run before printing the summary
    #[arg(long, default_value = "3")]
    pub ticks: u64,

    /// Override the tracking interval from the config file
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Seed for the simulated rank checker
    #[arg(long)]
    pub seed: Option<u64>,

    /// Turn automatic tracking on even if the config file leaves it off
    #[arg(long)]
    pub track: bool,

    /// Track every business instead of only the selected one
    #[arg(long)]
    pub all_businesses: bool,

    /// Write CSV/JSON reports to this directory
    #[arg(long)]
    pub export_dir: Option<String>,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 命令列參數覆蓋設定檔
    pub fn apply_overrides(&self, config: &mut TrackerConfig) {
        if let Some(interval_ms) = self.interval_ms {
            config.tracking.interval_ms = interval_ms;
        }
        if let Some(seed) = self.seed {
            config.tracking.seed = Some(seed);
        }
        if self.all_businesses {
            config.tracking.scope = TrackingScope::All;
        }
        if let Some(dir) = &self.export_dir {
            let formats = config
                .report
                .as_ref()
                .map(|r| r.formats.clone())
                .unwrap_or_else(|| vec!["csv".to_string(), "json".to_string()]);
            config.report = Some(toml_config::ReportConfig {
                output_path: dir.clone(),
                formats,
            });
        }
        if self.track {
            config.tracking.enabled = true;
        }
    }
}
