//! Printable view of a translated session configuration

use std::collections::BTreeMap;
use std::path::PathBuf;

use application::services::{ProvisionedAsset, TranslatedConfig};
use domain::entities::{FeatureSet, NetworkPolicy};
use serde::Serialize;
use serde_json::Value;

/// Output encoding for the `translate` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Toml,
}

#[derive(Debug, Serialize)]
pub struct AssetLine {
    pub slot: String,
    pub file: &'static str,
    pub url: String,
}

/// Everything the engine would be built from, minus the client secret
#[derive(Debug, Serialize)]
pub struct TranslationReport {
    pub features: FeatureSet,
    pub network_policy: NetworkPolicy,
    pub properties: BTreeMap<String, Value>,
    pub assets: Vec<AssetLine>,
}

impl TranslationReport {
    pub fn new(translated: &TranslatedConfig) -> Self {
        let assets = translated
            .asset_requests
            .iter()
            .map(|request| AssetLine {
                slot: request.slot.to_string(),
                file: request.name(),
                url: request.url.clone(),
            })
            .collect();

        Self {
            features: translated.features,
            network_policy: translated.network_policy,
            properties: translated.configuration.properties(),
            assets,
        }
    }

    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        let rendered = match format {
            OutputFormat::Json => serde_json::to_string_pretty(self)?,
            OutputFormat::Toml => toml::to_string_pretty(self)?,
        };
        Ok(rendered)
    }
}

/// Result of the `provision` command, one line per model
#[derive(Debug, Serialize)]
pub struct ProvisionReport {
    pub cache_dir: PathBuf,
    pub models: BTreeMap<String, PathBuf>,
}

impl ProvisionReport {
    pub fn new(cache_dir: PathBuf, assets: &[ProvisionedAsset]) -> Self {
        let models = assets
            .iter()
            .map(|asset| (asset.slot.to_string(), asset.path.clone()))
            .collect();
        Self { cache_dir, models }
    }
}
