//! Asset registry seam used by the batch driver.
//!
//! The registry enumerates asset metadata, loads objects on demand and saves
//! modified blueprints back to their packages.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ValidatorError;
use crate::model::{AssetData, Blueprint, LoadedObject, parse_blueprint, write_blueprint};

pub trait AssetRegistry: Sync {
    fn assets(&self) -> Vec<AssetData>;

    fn load(&self, asset: &AssetData) -> Result<LoadedObject, ValidatorError>;

    fn save(&mut self, blueprint: &Blueprint) -> Result<(), ValidatorError>;
}

/// Selects which registry assets a batch action runs over.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    /// Object-path prefixes; empty matches every path.
    pub path_prefixes: Vec<String>,
    pub blueprints_only: bool,
}

impl AssetFilter {
    pub fn matches(&self, asset: &AssetData) -> bool {
        if self.blueprints_only && asset.asset_class != "Blueprint" {
            return false;
        }
        self.path_prefixes.is_empty()
            || self
                .path_prefixes
                .iter()
                .any(|prefix| asset.object_path.starts_with(prefix.as_str()))
    }

    pub fn select(&self, registry: &dyn AssetRegistry) -> Vec<AssetData> {
        registry
            .assets()
            .into_iter()
            .filter(|asset| self.matches(asset))
            .collect()
    }
}

/// Registry backed by a directory tree of exported blueprint `*.json` files.
#[derive(Debug, Clone)]
pub struct DirectoryRegistry {
    root: PathBuf,
    files: BTreeMap<String, PathBuf>,
}

impl DirectoryRegistry {
    /// Scan `root` recursively. Files that fail to parse are skipped with a warning.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ValidatorError> {
        let root = root.into();
        let mut files = BTreeMap::new();
        scan_dir(&root, &mut files)?;
        tracing::info!(root = %root.display(), assets = files.len(), "asset registry scanned");
        Ok(DirectoryRegistry { root, files })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_for(&self, object_path: &str) -> Result<&PathBuf, ValidatorError> {
        self.files
            .get(object_path)
            .ok_or_else(|| ValidatorError::MissingAsset(object_path.to_string()))
    }
}

fn scan_dir(dir: &Path, files: &mut BTreeMap<String, PathBuf>) -> Result<(), ValidatorError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ValidatorError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| ValidatorError::io(dir, e))?.path();
        if path.is_dir() {
            scan_dir(&path, files)?;
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        match read_blueprint(&path) {
            Ok(blueprint) => {
                files.insert(blueprint.path, path);
            }
            Err(e) => tracing::warn!(file = %path.display(), error = %e, "skipping unreadable asset"),
        }
    }
    Ok(())
}

fn read_blueprint(path: &Path) -> Result<Blueprint, ValidatorError> {
    let json = std::fs::read_to_string(path).map_err(|e| ValidatorError::io(path, e))?;
    parse_blueprint(&json)
}

impl AssetRegistry for DirectoryRegistry {
    fn assets(&self) -> Vec<AssetData> {
        self.files
            .keys()
            .map(|object_path| AssetData {
                object_path: object_path.clone(),
                asset_class: "Blueprint".into(),
                is_top_level: true,
            })
            .collect()
    }

    fn load(&self, asset: &AssetData) -> Result<LoadedObject, ValidatorError> {
        let file = self.file_for(&asset.object_path)?;
        Ok(LoadedObject::Blueprint(read_blueprint(file)?))
    }

    fn save(&mut self, blueprint: &Blueprint) -> Result<(), ValidatorError> {
        let file = self.file_for(&blueprint.path)?;
        let json = write_blueprint(blueprint)?;
        std::fs::write(file, json).map_err(|e| ValidatorError::io(file, e))
    }
}

/// Registry holding already-loaded objects, keyed by object path.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    objects: BTreeMap<String, (AssetData, LoadedObject)>,
    saved: Vec<String>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_blueprint(&mut self, blueprint: Blueprint) {
        let asset = blueprint.asset_data();
        self.objects
            .insert(asset.object_path.clone(), (asset, LoadedObject::Blueprint(blueprint)));
    }

    pub fn insert_other(&mut self, object_path: &str, class_name: &str) {
        let asset = AssetData {
            object_path: object_path.to_string(),
            asset_class: class_name.to_string(),
            is_top_level: true,
        };
        self.objects.insert(
            object_path.to_string(),
            (asset, LoadedObject::Other { class_name: class_name.to_string() }),
        );
    }

    pub fn blueprint(&self, object_path: &str) -> Option<&Blueprint> {
        self.objects.get(object_path).and_then(|(_, obj)| obj.as_blueprint())
    }

    /// Object paths passed to `save`, in call order.
    pub fn saved(&self) -> &[String] {
        &self.saved
    }
}

impl AssetRegistry for MemoryRegistry {
    fn assets(&self) -> Vec<AssetData> {
        self.objects.values().map(|(asset, _)| asset.clone()).collect()
    }

    fn load(&self, asset: &AssetData) -> Result<LoadedObject, ValidatorError> {
        self.objects
            .get(&asset.object_path)
            .map(|(_, obj)| obj.clone())
            .ok_or_else(|| ValidatorError::MissingAsset(asset.object_path.clone()))
    }

    fn save(&mut self, blueprint: &Blueprint) -> Result<(), ValidatorError> {
        let Some((_, object)) = self.objects.get_mut(&blueprint.path) else {
            return Err(ValidatorError::MissingAsset(blueprint.path.clone()));
        };
        *object = LoadedObject::Blueprint(blueprint.clone());
        self.saved.push(blueprint.path.clone());
        Ok(())
    }
}
