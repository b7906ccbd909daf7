//! Config module contains the initial static parameters of the app

use std::env;

use config_crate::{Config as RawConfig, ConfigError, Environment, File};

/// Basic settings - server, database and vendor verification
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: Server,
    pub vendor: Vendor,
}

/// Server settings
#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    pub host: String,
    pub port: String,
    pub database: String,
    pub thread_count: usize,
}

/// Third-party coupon verification endpoint settings
#[derive(Debug, Deserialize, Clone)]
pub struct Vendor {
    pub api_url: String,
    pub verify_path: String,
    pub timeout_ms: u64,
}

impl Config {
    /// Creates config from base.toml, which can be overwritten by
    /// config/<env>.toml, where env is one of development, test, production.
    /// After that it could be overwritten by environment variables like
    /// DATABASE_URL and VENDOR_API_URL.
    pub fn new() -> Result<Self, ConfigError> {
        let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let mut s = RawConfig::new();
        s.merge(File::with_name("config/base"))?;
        s.merge(File::with_name(&format!("config/{}", env)).required(false))?;

        // Env variables with BILLING prefix, e.g. BILLING_HOST
        s.merge(Environment::with_prefix("BILLING"))?;

        if let Ok(database_url) = env::var("DATABASE_URL") {
            s.set("server.database", database_url)?;
        }
        if let Ok(api_url) = env::var("VENDOR_API_URL") {
            s.set("vendor.api_url", api_url)?;
        }
        if let Ok(verify_path) = env::var("VENDOR_VERIFY_PATH") {
            s.set("vendor.verify_path", verify_path)?;
        }
        if let Ok(timeout_ms) = env::var("VENDOR_TIMEOUT_MS") {
            s.set("vendor.timeout_ms", timeout_ms)?;
        }

        s.try_into()
    }
}
