use crate::config::AppConfig;
use crate::utils::error::Result;
use clap::Parser;

/// 兩個執行檔共用的參數
#[derive(Debug, Clone, Default, Parser)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Company directory endpoint (overrides config file)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Quiet period before a tax ID lookup, in milliseconds
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// HTTP request timeout, in seconds
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Ignore lookup responses that arrive after a newer lookup was issued
    #[arg(long)]
    pub discard_stale_responses: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliArgs {
    /// 載入配置檔後套用命令列覆蓋
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.lookup.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.lookup.timeout_seconds = Some(timeout);
        }
        if self.discard_stale_responses {
            config.lookup.discard_stale_responses = Some(true);
        }
        if let Some(delay) = self.debounce_ms {
            config.debounce.delay_ms = Some(delay);
        }

        Ok(config)
    }
}
