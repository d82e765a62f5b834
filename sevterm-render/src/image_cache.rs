use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use sevterm_core::{ImageSource, Texture};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("image reference is empty")]
    EmptyReference,
    #[error("failed to load image {reference}: {message}")]
    Load { reference: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Pending,
    Loading,
    Ready,
    Failed,
}

type Outcome = Result<Arc<Texture>, ImageError>;

struct CacheSlot {
    status: Mutex<ImageStatus>,
    outcome: OnceCell<Outcome>,
}

impl CacheSlot {
    fn new() -> Self {
        Self {
            status: Mutex::new(ImageStatus::Pending),
            outcome: OnceCell::new(),
        }
    }
}

pub struct ImageCache {
    source: Arc<dyn ImageSource>,
    slots: Mutex<HashMap<String, Arc<CacheSlot>>>,
    loads: AtomicUsize,
}

impl ImageCache {
    pub fn new(source: Arc<dyn ImageSource>) -> Self {
        Self {
            source,
            slots: Mutex::new(HashMap::new()),
            loads: AtomicUsize::new(0),
        }
    }

    #[instrument(skip_all, fields(reference = short(reference)))]
    pub async fn resolve(&self, reference: &str) -> Outcome {
        if reference.is_empty() {
            return Err(ImageError::EmptyReference);
        }
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(
                slots
                    .entry(reference.to_owned())
                    .or_insert_with(|| Arc::new(CacheSlot::new())),
            )
        };
        slot.outcome
            .get_or_init(|| self.load(&slot, reference))
            .await
            .clone()
    }

    async fn load(&self, slot: &CacheSlot, reference: &str) -> Outcome {
        *slot.status.lock() = ImageStatus::Loading;
        self.loads.fetch_add(1, Ordering::SeqCst);
        match self.source.load(reference).await {
            Ok(texture) => {
                debug!(width = texture.width, height = texture.height, "image ready");
                *slot.status.lock() = ImageStatus::Ready;
                Ok(Arc::new(texture))
            }
            Err(err) => {
                warn!("image load failed: {err:#}");
                *slot.status.lock() = ImageStatus::Failed;
                Err(ImageError::Load {
                    reference: short(reference).to_owned(),
                    message: format!("{err:#}"),
                })
            }
        }
    }

    pub fn status(&self, reference: &str) -> Option<ImageStatus> {
        self.slots
            .lock()
            .get(reference)
            .map(|slot| *slot.status.lock())
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// data: URIs run to kilobytes; keep logs and errors readable.
fn short(reference: &str) -> &str {
    const LIMIT: usize = 64;
    match reference.char_indices().nth(LIMIT) {
        Some((end, _)) => &reference[..end],
        None => reference,
    }
}
