use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail};
use config::{Config, File, FileFormat};
use serde::Deserialize;
use url::Url;

use crate::format::DEFAULT_FORMAT;

const DEFAULT_CONFIG_PATH: &str = "settings.yml";
const DATABASE_URL_ENV: &str = "DATABASE_URL";
const FORMAT_ENV: &str = "OBSERVER_FORMAT";
const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

#[derive(Debug)]
pub struct Settings {
    pub database_url: Url,
    /// Format whose courses the observer maintains
    pub format: String,
    pub cache_enabled: bool,
    pub cache_capacity: u64,
    /// Options the format stores per section
    pub section_options: Vec<String>,
    pub section_defaults: HashMap<String, String>,
}

#[derive(Deserialize)]
struct FileConfig {
    format: String,
    cache_enabled: bool,
    cache_capacity: u64,
    #[serde(default)]
    section_options: Vec<String>,
    #[serde(default)]
    section_defaults: HashMap<String, String>,
    db_name: Option<String>,
    db_host: Option<String>,
    db_port: Option<u16>,
    db_user: Option<String>,
    db_pass: Option<String>,
}

impl FileConfig {
    fn database_url(&self) -> Result<Url> {
        let (Some(name), Some(host), Some(port), Some(user), Some(pass)) = (
            &self.db_name,
            &self.db_host,
            self.db_port,
            &self.db_user,
            &self.db_pass,
        ) else {
            bail!("{DATABASE_URL_ENV} is not set and the config file has no complete db_* section");
        };

        let url_str = format!("postgres://{user}:{pass}@{host}:{port}/{name}");
        Url::parse(&url_str).context("Failed to build database url from config file")
    }
}

fn build_config<S>(source: S) -> Result<FileConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = Config::builder()
        .set_default("format", DEFAULT_FORMAT)?
        .set_default("cache_enabled", true)?
        .set_default("cache_capacity", DEFAULT_CACHE_CAPACITY)?
        .add_source(source)
        .build()
        .map_err(|_| anyhow!("Failed to read config file"))?;

    settings
        .try_deserialize::<FileConfig>()
        .map_err(|e| anyhow!("Failed to deserialize config file: {e}"))
}

/// Try to parse env variable. If it's not set, return None. If it's invalid, treat it as an error.
fn try_from_env<T, F>(env_var: &str, f: F) -> Result<Option<T>>
where
    F: FnOnce(String) -> Result<T>,
{
    match std::env::var(env_var) {
        Ok(raw) => {
            let val = f(raw).map_err(|_| anyhow!("Failed to parse {}", env_var))?;
            Ok(Some(val))
        }
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(_) => bail!("Could not read {env_var} from env"),
    }
}

fn resolve(
    config: FileConfig,
    database_url_opt: Option<Url>,
    format_opt: Option<String>,
) -> Result<Settings> {
    let database_url = match database_url_opt {
        Some(url) => url,
        None => {
            tracing::warn!("{DATABASE_URL_ENV} is not set, using value from {DEFAULT_CONFIG_PATH}");
            config.database_url()?
        }
    };

    let format = format_opt.unwrap_or(config.format);
    if format.is_empty() {
        bail!("format must not be empty");
    }

    Ok(Settings {
        database_url,
        format,
        cache_enabled: config.cache_enabled,
        cache_capacity: config.cache_capacity,
        section_options: config.section_options,
        section_defaults: config.section_defaults,
    })
}

/// Load configuration from the config file, with env overriding the database url and format.
/// The config file is optional when `DATABASE_URL` is set.
pub fn load() -> Result<Settings> {
    let database_url_opt: Option<Url> = try_from_env(DATABASE_URL_ENV, |env_str| {
        Url::parse(&env_str).map_err(|e| e.into())
    })?;

    let format_opt: Option<String> = try_from_env(FORMAT_ENV, Ok)?;

    let config = build_config(File::with_name(DEFAULT_CONFIG_PATH).required(false))?;

    resolve(config, database_url_opt, format_opt)
}

/// Parse settings from YAML text, ignoring the environment
pub fn from_yaml(yaml: &str) -> Result<Settings> {
    let config = build_config(File::from_str(yaml, FileFormat::Yaml))?;
    resolve(config, None, None)
}
