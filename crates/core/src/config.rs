use std::path::{Path, PathBuf};

use crate::catalog::IdPolicy;
use crate::describe::DEFAULT_TEMPLATE;

/// Where a workbench keeps its files and how it names images.
#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub scene_dir_name: String,
    pub manual_file_name: String,
    pub id_policy: IdPolicy,
    pub description_template: String,
}

impl Config {
    /// Default layout rooted at `root`: `root/scenes/` and `root/saved_manual.json`.
    pub fn at(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_id_policy(mut self, policy: IdPolicy) -> Self {
        self.id_policy = policy;
        self
    }

    pub fn with_description_template(mut self, template: impl Into<String>) -> Self {
        self.description_template = template.into();
        self
    }

    pub fn scene_dir(&self) -> PathBuf {
        self.root.join(&self.scene_dir_name)
    }

    pub fn manual_path(&self) -> PathBuf {
        self.root.join(&self.manual_file_name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            scene_dir_name: "scenes".to_string(),
            manual_file_name: "saved_manual.json".to_string(),
            id_policy: IdPolicy::default(),
            description_template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}
