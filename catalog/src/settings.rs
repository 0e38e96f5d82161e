//! `[catalog]` section of skiffle.toml

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Catalog build configuration.
///
/// Relative paths are resolved against the builder's base directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// File listing one project name per line
    #[serde(default = "default_project_list")]
    pub project_list: PathBuf,
    /// Directory holding the project checkouts
    #[serde(default = "default_projects_root")]
    pub projects_root: PathBuf,
    /// Per-project directory scanned for assets
    #[serde(default = "default_sounds_dir")]
    pub sounds_dir: String,
    /// Recognized extensions, in the order their files are listed
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_max_label_length")]
    pub max_label_length: usize,
    /// Prepended to `<project>/<sounds_dir>/<file>` to form each locator
    #[serde(default = "default_asset_prefix")]
    pub asset_prefix: String,
    /// Generated page
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Custom Handlebars template (default: built-in)
    #[serde(default)]
    pub template: Option<PathBuf>,
}

fn default_project_list() -> PathBuf {
    PathBuf::from("../perennial/data/active-repos")
}
fn default_projects_root() -> PathBuf {
    PathBuf::from("..")
}
fn default_sounds_dir() -> String {
    "sounds".to_string()
}
fn default_extensions() -> Vec<String> {
    vec!["mp3".to_string(), "wav".to_string()]
}
fn default_max_label_length() -> usize {
    25
}
fn default_asset_prefix() -> String {
    "../../".to_string()
}
fn default_output() -> PathBuf {
    PathBuf::from("html/sound-board.html")
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            project_list: default_project_list(),
            projects_root: default_projects_root(),
            sounds_dir: default_sounds_dir(),
            extensions: default_extensions(),
            max_label_length: default_max_label_length(),
            asset_prefix: default_asset_prefix(),
            output: default_output(),
            template: None,
        }
    }
}
