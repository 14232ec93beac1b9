//! Global options layered over the config file

use std::path::PathBuf;

use clap::Args;
use countrypop::config::{AppConfig, Profile};
use countrypop::types::Result;

/// Options shared by every subcommand
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Upstream source line-up
    #[arg(long, value_enum, global = true, env = "COUNTRYPOP_PROFILE")]
    pub profile: Option<Profile>,

    /// Upstream request timeout in seconds
    #[arg(long, value_name = "SECS", global = true, env = "COUNTRYPOP_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Cache lifetime in seconds
    #[arg(long, value_name = "SECS", global = true, env = "COUNTRYPOP_CACHE_TTL")]
    pub cache_ttl: Option<u64>,

    /// Only list countries with a known population
    #[arg(long, global = true)]
    pub require_population: bool,

    /// Fetch supplement sources one after another
    #[arg(long, global = true)]
    pub sequential: bool,

    /// Config file (default: ~/.countrypop/config.json)
    #[arg(long, value_name = "PATH", global = true, env = "COUNTRYPOP_CONFIG")]
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Load the config file and apply flag overrides on top
    pub fn resolve(&self) -> Result<AppConfig> {
        let config = AppConfig::load(self.config.as_deref())?;
        self.apply(config)
    }

    fn apply(&self, mut config: AppConfig) -> Result<AppConfig> {
        if let Some(profile) = self.profile {
            config.profile = profile;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = timeout;
        }
        if let Some(ttl) = self.cache_ttl {
            config.cache_ttl_secs = Some(ttl);
        }
        if self.require_population {
            config.require_population = true;
        }
        if self.sequential {
            config.parallel_fanout = false;
        }
        config.validate()?;
        Ok(config)
    }
}
