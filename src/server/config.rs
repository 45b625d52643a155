use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_FILE_PATTERNS, DEFAULT_MAX_EXPANSION_DEPTH, MAKEFILE_LANGUAGE_ID,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MakefileLspConfig {
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeatureConfig {
    #[serde(default = "true_bool")]
    pub hover: bool,
    #[serde(default = "true_bool")]
    pub definition: bool,
    #[serde(default = "true_bool")]
    pub document_symbols: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    #[serde(default = "default_max_expansion_depth")]
    pub max_expansion_depth: usize,
    /// Re-scan the unsaved buffer on every edit. When off, edits only fill
    /// missing entries and positions stay as of the last save.
    #[serde(default = "true_bool")]
    pub reindex_on_change: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_file_patterns")]
    pub file_patterns: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            hover: true,
            definition: true,
            document_symbols: true,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_expansion_depth: DEFAULT_MAX_EXPANSION_DEPTH,
            reindex_on_change: true,
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            file_patterns: default_file_patterns(),
        }
    }
}

impl MakefileLspConfig {
    /// Whether a document should be handled as a build file.
    pub fn is_build_file(&self, path: &Path, language_id: Option<&str>) -> bool {
        if language_id == Some(MAKEFILE_LANGUAGE_ID) {
            return true;
        }
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        self.workspace.file_patterns.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|p| p.matches(file_name))
                .unwrap_or(false)
        })
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<MakefileLspConfig>>,

    init_settings: Arc<RwLock<Option<serde_json::Value>>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(MakefileLspConfig::default())),
            init_settings: Arc::new(RwLock::new(None)),
        }
    }

    pub fn get_config(&self) -> Arc<RwLock<MakefileLspConfig>> {
        self.config.clone()
    }

    /// Point-in-time copy of the current configuration.
    pub async fn snapshot(&self) -> MakefileLspConfig {
        self.config.read().await.clone()
    }

    pub async fn features(&self) -> FeatureConfig {
        self.config.read().await.features.clone()
    }

    pub async fn set_init_settings(&self, settings: Option<serde_json::Value>) {
        let mut lock = self.init_settings.write().await;
        *lock = settings;
    }

    /// Defaults, overlaid by the client's initialization options, overlaid
    /// by the workspace config file.
    pub async fn load_from_workspace(&self, root: &Path) -> Result<MakefileLspConfig, String> {
        let mut config_json = serde_json::to_value(MakefileLspConfig::default())
            .map_err(|e| format!("Failed to serialize defaults: {}", e))?;

        {
            let init_settings = self.init_settings.read().await;
            if let Some(settings) = init_settings.as_ref() {
                merge_json(&mut config_json, settings);
            }
        }

        let config_path = root.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            let toml_content = fs::read_to_string(&config_path)
                .map_err(|e| format!("Failed to read config: {}", e))?;

            let toml_value: toml::Value = toml::from_str(&toml_content)
                .map_err(|e| format!("Failed to parse config: {}", e))?;
            let toml_json = toml_to_json(&toml_value);

            merge_json(&mut config_json, &toml_json);
        }

        let config: MakefileLspConfig = serde_json::from_value(config_json)
            .map_err(|e| format!("Failed to deserialize merged config: {}", e))?;

        let mut lock = self.config.write().await;
        *lock = config.clone();

        Ok(config)
    }

    pub async fn update(&self, new_config: MakefileLspConfig) {
        let mut lock = self.config.write().await;
        *lock = new_config;
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn toml_to_json(toml: &toml::Value) -> serde_json::Value {
    match toml {
        toml::Value::String(s) => serde_json::Value::String(s.clone()),
        toml::Value::Integer(i) => serde_json::Value::Number((*i).into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        toml::Value::Boolean(b) => serde_json::Value::Bool(*b),
        toml::Value::Array(arr) => serde_json::Value::Array(arr.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
    }
}

fn merge_json(base: &mut serde_json::Value, overlay: &serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                if overlay_val.is_null() {
                    continue;
                }
                match base_map.get_mut(key) {
                    Some(base_val) => merge_json(base_val, overlay_val),
                    None => {
                        base_map.insert(key.clone(), overlay_val.clone());
                    }
                }
            }
        }
        (base, overlay) => {
            if !overlay.is_null() {
                *base = overlay.clone();
            }
        }
    }
}

fn true_bool() -> bool {
    true
}

fn default_max_expansion_depth() -> usize {
    DEFAULT_MAX_EXPANSION_DEPTH
}

fn default_file_patterns() -> Vec<String> {
    DEFAULT_FILE_PATTERNS.iter().map(|s| s.to_string()).collect()
}
