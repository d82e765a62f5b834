use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sevterm_core::{ImageSource, Texture};
use tokio::task;
use ureq::{Agent, AgentBuilder, Error as UreqError};

const MAX_DOWNLOAD_BYTES: u64 = 16 * 1024 * 1024;

pub struct DecodingImageSource {
    base_dir: PathBuf,
    agent: Agent,
}

impl DecodingImageSource {
    pub fn new(base_dir: impl Into<PathBuf>, http_timeout: Duration) -> Self {
        let agent = AgentBuilder::new()
            .timeout_connect(http_timeout)
            .timeout_read(http_timeout)
            .build();
        Self {
            base_dir: base_dir.into(),
            agent,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn resolve_path(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    async fn fetch_bytes(&self, reference: &str) -> Result<Vec<u8>> {
        if let Some(payload) = reference.strip_prefix("data:") {
            return decode_data_uri(payload);
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            let agent = self.agent.clone();
            let url = reference.to_owned();
            return task::spawn_blocking(move || download(&agent, &url))
                .await
                .context("download task panicked")?;
        }
        let path = self.resolve_path(reference);
        task::spawn_blocking(move || {
            fs::read(&path).with_context(|| format!("failed to read image file {:?}", path))
        })
        .await
        .context("file read task panicked")?
    }
}

#[async_trait]
impl ImageSource for DecodingImageSource {
    async fn load(&self, reference: &str) -> Result<Texture> {
        let bytes = self.fetch_bytes(reference).await?;
        task::spawn_blocking(move || decode_texture(&bytes))
            .await
            .context("decode task panicked")?
    }
}

pub fn decode_texture(bytes: &[u8]) -> Result<Texture> {
    let image = image::load_from_memory(bytes).context("failed to decode image data")?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Texture {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

fn decode_data_uri(payload: &str) -> Result<Vec<u8>> {
    let (meta, data) = payload
        .split_once(',')
        .ok_or_else(|| anyhow!("data URI has no payload separator"))?;
    if !meta.ends_with(";base64") {
        bail!("only base64 data URIs are supported (got {meta:?})");
    }
    let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(cleaned)
        .context("data URI payload is not valid base64")
}

fn download(agent: &Agent, url: &str) -> Result<Vec<u8>> {
    let response = match agent.get(url).call() {
        Ok(response) => response,
        Err(UreqError::Status(code, _)) => {
            return Err(anyhow!("GET {} failed with HTTP status {}", url, code));
        }
        Err(err) => {
            return Err(anyhow!("GET {} failed: {}", url, err));
        }
    };
    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_DOWNLOAD_BYTES)
        .read_to_end(&mut bytes)
        .with_context(|| format!("failed to read response body from {}", url))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat};
    use sevterm_core::Document;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::new_rgba8(width, height);
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn source(base_dir: &Path) -> DecodingImageSource {
        DecodingImageSource::new(base_dir, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn decodes_base64_data_uri() {
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(3, 2)));
        let texture = source(Path::new(".")).load(&uri).await.unwrap();
        assert_eq!((texture.width, texture.height), (3, 2));
        assert_eq!(texture.pixels.len(), 3 * 2 * 4);
    }

    #[tokio::test]
    async fn decodes_builtin_inline_logo() {
        let reference = Document::terminal().entry(3, 1).unwrap().image(0).unwrap();
        let texture = source(Path::new(".")).load(reference).await.unwrap();
        assert!(texture.width > 0 && texture.height > 0);
    }

    #[tokio::test]
    async fn loads_relative_files_from_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sprites")).unwrap();
        fs::write(dir.path().join("sprites/logo.png"), png_bytes(5, 4)).unwrap();

        let texture = source(dir.path()).load("sprites/logo.png").await.unwrap();
        assert_eq!((texture.width, texture.height), (5, 4));
    }

    #[tokio::test]
    async fn reports_missing_and_corrupt_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let source = source(dir.path());
        assert!(source.load("sprites/absent.png").await.is_err());
        assert!(source.load("data:image/png;base64,!!!").await.is_err());
        assert!(source.load("data:text/plain,hello").await.is_err());

        fs::write(dir.path().join("broken.png"), b"not an image").unwrap();
        assert!(source.load("broken.png").await.is_err());
    }
}
