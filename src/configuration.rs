use std::path::Path;

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

const BASE_CONFIGURATION: &str = include_str!("../configuration/base.yaml");
const LOCAL_CONFIGURATION: &str = "patent-fetcher";
const ENV_PREFIX: &str = "PATENT";

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub portal: PortalSettings,
    pub browser: BrowserSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PortalSettings {
    pub base_url: String,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RenderBackend {
    WebDriver,
    Http,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BrowserSettings {
    pub backend: RenderBackend,
    pub webdriver_url: String,
    pub headless: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub poll_interval_ms: u64,
    pub marker_selector: String,
    pub user_agent: String,
}

/// Layers the embedded defaults, an optional YAML file and `PATENT_*`
/// environment variables, in that order.
///
/// Without an explicit path, `./patent-fetcher.{yaml,toml,json}` is picked up
/// when present. An explicit path must exist.
pub fn get_configuration(config_file: Option<&Path>) -> Result<Settings, ConfigError> {
    let builder = match config_file {
        Some(path) => base_builder().add_source(File::from(path)),
        None => base_builder().add_source(File::with_name(LOCAL_CONFIGURATION).required(false)),
    };

    builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize::<Settings>()
}

fn base_builder() -> ConfigBuilder<DefaultState> {
    Config::builder().add_source(File::from_str(BASE_CONFIGURATION, FileFormat::Yaml))
}
