use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use sevterm_core::{AssetLoader, AssetSpec, Texture};
use tokio::task;
use tracing::{debug, warn};

use crate::source::decode_texture;

#[derive(Debug, Clone)]
pub enum Asset {
    Texture(Arc<Texture>),
    Bytes(Arc<Vec<u8>>),
    Provided,
}

pub struct FsAssetLoader {
    root: PathBuf,
    assets: Mutex<HashMap<String, Asset>>,
}

impl FsAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            assets: Mutex::new(HashMap::new()),
        }
    }

    pub fn provide(&self, key: impl Into<String>) {
        self.assets.lock().insert(key.into(), Asset::Provided);
    }

    pub fn get(&self, key: &str) -> Option<Asset> {
        self.assets.lock().get(key).cloned()
    }

    pub fn texture(&self, key: &str) -> Option<Arc<Texture>> {
        match self.get(key)? {
            Asset::Texture(texture) => Some(texture),
            _ => None,
        }
    }

    async fn load_one(&self, spec: &AssetSpec) -> Result<Asset> {
        let path = self.root.join(&spec.path);
        task::spawn_blocking(move || -> Result<Asset> {
            let bytes =
                fs::read(&path).with_context(|| format!("failed to read asset {:?}", path))?;
            let is_raster = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
                .unwrap_or(false);
            if is_raster {
                Ok(Asset::Texture(Arc::new(decode_texture(&bytes)?)))
            } else {
                Ok(Asset::Bytes(Arc::new(bytes)))
            }
        })
        .await
        .context("asset load task panicked")?
    }
}

#[async_trait]
impl AssetLoader for FsAssetLoader {
    async fn load_assets(&self, assets: &[AssetSpec]) -> Result<()> {
        let mut failed = Vec::new();
        for spec in assets {
            if self.is_ready(&spec.key) {
                continue;
            }
            match self.load_one(spec).await {
                Ok(asset) => {
                    debug!(key = %spec.key, path = %spec.path, "asset loaded");
                    self.assets.lock().insert(spec.key.clone(), asset);
                }
                Err(err) => {
                    warn!(key = %spec.key, "asset load failed: {err:#}");
                    failed.push(spec.key.as_str());
                }
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("failed to load assets: {}", failed.join(", ")))
        }
    }

    fn is_ready(&self, key: &str) -> bool {
        self.assets.lock().contains_key(key)
    }
}
