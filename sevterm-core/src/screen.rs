use std::time::Duration;

use anyhow::Result;
use tokio::time::{sleep, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSpec {
    pub key: String,
    pub path: String,
}

impl AssetSpec {
    pub fn new(key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
        }
    }
}

#[async_trait::async_trait]
pub trait AssetLoader: Send + Sync {
    async fn load_assets(&self, assets: &[AssetSpec]) -> Result<()>;

    fn is_ready(&self, key: &str) -> bool;
}

#[async_trait::async_trait]
pub trait Screen: Send {
    async fn preload(&mut self, assets: &dyn AssetLoader) -> Result<()>;

    fn on_enter(&mut self);

    fn on_exit(&mut self);

    fn on_tick(&mut self, dt: f32);
}

pub async fn wait_until<F>(check: F, poll: Duration, timeout: Duration) -> bool
where
    F: Fn() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(poll).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn wait_until_returns_once_ready() {
        let polls = AtomicUsize::new(0);
        let ready = wait_until(
            || polls.fetch_add(1, Ordering::SeqCst) >= 3,
            Duration::from_millis(1),
            Duration::from_secs(5),
        )
        .await;
        assert!(ready);
        assert_eq!(polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn wait_until_gives_up_after_timeout() {
        let ready = wait_until(|| false, Duration::from_millis(1), Duration::from_millis(10)).await;
        assert!(!ready);
    }
}
