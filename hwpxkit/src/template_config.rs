//! Template configuration for HWPX templates
//!
//! A template directory holds the blank `.hwpx` plus two configuration files:
//! `template.json` (this module) and `field_map.json` ([`crate::field_map`]).
//! Files are JSON; a `.toml` file with the same fields is accepted too.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// File name of the template configuration inside a template directory
pub const TEMPLATE_FILE: &str = "template.json";

/// Template definition from `template.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Template name (e.g., "cloud_integrated")
    pub name: String,

    /// Free-form description shown to whoever maintains the template
    #[serde(default)]
    pub description: String,

    /// Index of the table whose cells the field map addresses
    #[serde(default)]
    pub cover_table_index: usize,

    /// Whole-text substitutions performed by the automation engine
    #[serde(default)]
    pub replacements: Vec<Replacement>,
}

/// One find-and-replace rule driven by input data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// Literal text to find in the document
    pub find: String,

    /// Dotted path into the input data (e.g., "사업명" or "수행기간.개발시작")
    pub data_key: String,

    /// Optional pattern with `{field}` placeholders filled from the object at the
    /// first segment of `data_key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            description: String::new(),
            cover_table_index: 0,
            replacements: Vec::new(),
        }
    }
}

impl TemplateConfig {
    /// Load template configuration from a `.json` or `.toml` file
    ///
    /// # Parameters
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(TemplateConfig)` - Successfully loaded template configuration
    /// * `Err(ConfigError)` - Error reading or parsing the file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        load_file(path.as_ref())
    }

    /// Load `template.json` from a template directory
    ///
    /// A directory without one gets [`TemplateConfig::default`]: cover table 0 and
    /// no replacements.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        match find_config_file(dir, TEMPLATE_FILE) {
            Some(path) => Self::load(path),
            None => {
                log::info!(
                    "No {} in {}, using defaults",
                    TEMPLATE_FILE,
                    dir.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// Write the configuration as pretty JSON (or TOML for a `.toml` path)
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        save_file(path.as_ref(), self)
    }
}

/// Build the ordered find/replace pairs for a template from input data
///
/// Without `format`, the value at `data_key` is used when it is a non-empty
/// scalar. With `format`, the first segment of `data_key` must resolve to an
/// object and every placeholder must be present in it, otherwise the rule is
/// skipped.
pub fn build_replacements(data: &Value, config: &TemplateConfig) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for rule in &config.replacements {
        let replace = match &rule.format {
            Some(pattern) => {
                let parent = rule.data_key.split('.').next().unwrap_or_default();
                match data.get(parent) {
                    Some(Value::Object(fields)) => fill_placeholders(pattern, fields),
                    _ => None,
                }
            }
            None => crate::field_map::resolve_path(data, &rule.data_key)
                .and_then(crate::field_map::scalar_text),
        };

        match replace {
            Some(replace) => pairs.push((rule.find.clone(), replace)),
            None => log::debug!("Skipping replacement for '{}'", rule.find),
        }
    }
    pairs
}

fn placeholder_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}"))
        .as_ref()
        .ok()
}

/// `"{시작} ~ {종료}"` filled from an object; `{{` and `}}` are literal braces
fn fill_placeholders(pattern: &str, fields: &serde_json::Map<String, Value>) -> Option<String> {
    let regex = placeholder_pattern()?;
    let mut out = String::with_capacity(pattern.len());
    let mut last = 0;
    for caps in regex.captures_iter(pattern) {
        let whole = caps.get(0)?;
        out.push_str(&pattern[last..whole.start()]);
        match caps.get(1) {
            Some(name) => {
                let value = fields.get(name.as_str())?;
                out.push_str(&display_value(value));
            }
            None => out.push_str(&whole.as_str()[..1]),
        }
        last = whole.end();
    }
    out.push_str(&pattern[last..]);
    Some(out)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Errors that can occur when loading or saving configuration files
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error on {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}", path = .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("TOML parse error in {path}: {source}", path = .path.display())]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("TOML serialization error for {path}: {source}", path = .path.display())]
    TomlWrite {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    #[error("Configuration file not found: {path}", path = .0.display())]
    MissingFile(PathBuf),

    #[error("Invalid column '{column}' in list '{list}': expected a non-negative integer")]
    InvalidColumn { list: String, column: String },

    #[error("Table index {index} out of range ({count} tables in document)")]
    TableIndexOutOfRange { index: usize, count: usize },
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"))
}

/// `dir/<name>`, or its `.toml` sibling, whichever exists first
pub(crate) fn find_config_file(dir: &Path, name: &str) -> Option<PathBuf> {
    let json = dir.join(name);
    if json.is_file() {
        return Some(json);
    }
    let toml = json.with_extension("toml");
    toml.is_file().then_some(toml)
}

/// Read a configuration file, picking the format from its extension
pub(crate) fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if is_toml(path) {
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Write a configuration file, picking the format from its extension
pub(crate) fn save_file<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let content = if is_toml(path) {
        toml::to_string_pretty(value).map_err(|source| ConfigError::TomlWrite {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        let mut json = serde_json::to_string_pretty(value).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        json.push('\n');
        json
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(replacements: Vec<Replacement>) -> TemplateConfig {
        TemplateConfig {
            name: "cloud".to_string(),
            replacements,
            ..TemplateConfig::default()
        }
    }

    fn rule(find: &str, data_key: &str, format: Option<&str>) -> Replacement {
        Replacement {
            find: find.to_string(),
            data_key: data_key.to_string(),
            format: format.map(str::to_string),
        }
    }

    #[test]
    fn test_template_config_parsing() {
        let json_content = r#"{
  "name": "cloud_integrated",
  "description": "클라우드 통합 양식",
  "cover_table_index": 0,
  "replacements": [
    { "find": "OOO 사업", "data_key": "사업명" },
    { "find": "'26.6.30 ~ '27.6.30", "data_key": "수행기간._개발", "format": "{개발시작} ~ {개발종료}" }
  ]
}"#;
        let config: TemplateConfig = serde_json::from_str(json_content).unwrap();
        assert_eq!(config.name, "cloud_integrated");
        assert_eq!(config.replacements.len(), 2);
        assert_eq!(config.replacements[0].format, None);
        assert_eq!(
            config.replacements[1].format.as_deref(),
            Some("{개발시작} ~ {개발종료}")
        );
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: TemplateConfig = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert_eq!(config.cover_table_index, 0);
        assert!(config.replacements.is_empty());
    }

    #[test]
    fn test_build_replacements_plain_and_formatted() {
        let data = json!({
            "사업명": "스마트 공장",
            "수행기간": { "개발시작": "'26.6.30", "개발종료": "'27.6.30", "개월": 12 },
            "빈값": ""
        });
        let config = config(vec![
            rule("OOO", "사업명", None),
            rule("PERIOD", "수행기간._개발", Some("{개발시작} ~ {개발종료} ({개월}개월)")),
            rule("EMPTY", "빈값", None),
            rule("MISSING", "없는키", None),
            rule("BAD", "수행기간", Some("{없는필드}")),
        ]);

        let pairs = build_replacements(&data, &config);
        assert_eq!(
            pairs,
            vec![
                ("OOO".to_string(), "스마트 공장".to_string()),
                ("PERIOD".to_string(), "'26.6.30 ~ '27.6.30 (12개월)".to_string()),
            ]
        );
    }

    #[test]
    fn test_fill_placeholders_literal_braces() {
        let fields = json!({ "a": "x" });
        let fields = fields.as_object().unwrap();
        assert_eq!(
            fill_placeholders("{{{a}}}", fields).as_deref(),
            Some("{x}")
        );
    }

    #[test]
    fn test_load_from_dir_without_file_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = TemplateConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config, TemplateConfig::default());
    }

    #[test]
    fn test_save_and_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.toml");
        let original = config(vec![rule("A", "b", Some("{c}"))]);
        original.save(&path).unwrap();
        assert_eq!(TemplateConfig::load(&path).unwrap(), original);
        assert_eq!(TemplateConfig::load_from_dir(dir.path()).unwrap(), original);
    }
}
