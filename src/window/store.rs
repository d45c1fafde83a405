use std::path::{Path, PathBuf};

use crate::errors::TinderResult;
use crate::window::types::Region;

/// JSON file holding the last detected region.
#[derive(Debug, Clone)]
pub struct RegionStore {
    path: PathBuf,
}

impl RegionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when nothing has been persisted yet.
    pub fn load(&self) -> TinderResult<Option<Region>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let region: Region = serde_json::from_str(&content)?;
        tracing::info!(path = %self.path.display(), "loaded window region");
        Ok(Some(region))
    }

    pub fn save(&self, region: &Region) -> TinderResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(region)?;
        std::fs::write(&self.path, content)?;
        tracing::debug!(path = %self.path.display(), "saved window region");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_region_loads_back_equal() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegionStore::new(dir.path().join("nested").join("window_config.json"));
        let region = Region {
            x: 4,
            y: 28,
            width: 1280,
            height: 720,
            title: "RuneLite - Player".into(),
        };

        store.save(&region).unwrap();
        assert_eq!(store.load().unwrap(), Some(region));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegionStore::new(dir.path().join("window_config.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn file_layout_uses_plain_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("window_config.json");
        std::fs::write(
            &path,
            r#"{"x": 1, "y": 2, "width": 3, "height": 4, "title": "RuneLite"}"#,
        )
        .unwrap();
        let region = RegionStore::new(&path).load().unwrap().unwrap();
        assert_eq!((region.x, region.y, region.width, region.height), (1, 2, 3, 4));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("window_config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(RegionStore::new(&path).load().is_err());
    }
}
