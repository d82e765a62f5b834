pub mod config;
pub mod document;
pub mod layout;
pub mod localization;
pub mod marquee;
pub mod metrics;
pub mod navigation;
pub mod screen;
pub mod scroll;
pub mod terminal;

use serde::{Deserialize, Serialize};

pub use config::{ConfigError, ImageFitConfig, ScreenConfig};
pub use document::{Document, Entry, Section, ENTRY_SLOTS, IMAGE_SLOTS, SECTION_COUNT};
pub use layout::{fit_image, ImagePlacement, Rect, ScreenLayout};
pub use localization::{Language, LanguageContext, LocaleError, LocalizationKey, LocalizationTable};
pub use marquee::{LabelExtent, MarqueeAnimator, MarqueeConfig, MarqueeState};
pub use metrics::{MonospaceMetrics, TextMetrics};
pub use navigation::{NavigationState, Navigator, Transition};
pub use screen::{wait_until, AssetLoader, AssetSpec, Screen};
pub use scroll::{ScrollEngine, ScrollGeometry, ScrollState};
pub use terminal::{
    HoverState, ImageNode, InputEvent, LabelNode, SceneNodes, ScreenEvent, TerminalScreen,
    TextBlockNode, FONT_ASSET, ICON_ATLAS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    #[default]
    Pointer,
    Touch,
}

impl DeviceClass {
    pub fn is_touch(self) -> bool {
        matches!(self, DeviceClass::Touch)
    }
}

#[derive(Debug, Clone)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageTarget {
    pub section: usize,
    pub entry: usize,
    pub slot: usize,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub target: ImageTarget,
    pub reference: String,
}

#[async_trait::async_trait]
pub trait ImageSource: Send + Sync {
    async fn load(&self, reference: &str) -> anyhow::Result<Texture>;
}
