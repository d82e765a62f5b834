use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use crate::config::ScreenConfig;
use crate::document::{Document, Entry, ENTRY_SLOTS, IMAGE_SLOTS, SECTION_COUNT};
use crate::layout::{fit_image, ImagePlacement, ScreenLayout};
use crate::localization::{Language, LanguageContext, LocaleError, LocalizationKey};
use crate::marquee::{LabelExtent, MarqueeAnimator};
use crate::metrics::TextMetrics;
use crate::navigation::{NavigationState, Navigator, Transition};
use crate::screen::{wait_until, AssetLoader, AssetSpec, Screen};
use crate::scroll::ScrollEngine;
use crate::{ImageRequest, ImageTarget, Texture};

pub const ICON_ATLAS: &str = "icons";
pub const FONT_ASSET: &str = "font:sevastopol";
const FONT_POLL: Duration = Duration::from_millis(50);
const FONT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    SectionPressed(usize),
    EntryPressed(usize),
    SectionHover(Option<usize>),
    EntryHover(Option<usize>),
    ThumbDown { y: f32 },
    ViewportDown { y: f32 },
    PointerMove { y: f32 },
    PointerUp,
    ViewportEnter,
    ViewportLeave,
    Wheel { delta_y: f32 },
    ImagePressed(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    SelectionChanged(NavigationState),
    ContentRefreshed { generation: u64 },
    OpenLink(String),
    LanguageChanged(Language),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelNode {
    pub text: String,
    pub width: f32,
    pub offset: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBlockNode {
    pub text: String,
    pub extent: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ImageNode {
    pub visible: bool,
    pub reference: Option<String>,
    pub texture: Option<Arc<Texture>>,
    pub placement: Option<ImagePlacement>,
}

#[derive(Debug, Clone, Default)]
pub struct SceneNodes {
    pub header: LabelNode,
    pub folders_heading: LabelNode,
    pub section_labels: [LabelNode; SECTION_COUNT],
    pub entry_labels: [LabelNode; ENTRY_SLOTS],
    pub body: TextBlockNode,
    pub images: [ImageNode; IMAGE_SLOTS],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoverState {
    pub section: Option<usize>,
    pub entry: Option<usize>,
}

pub struct TerminalScreen {
    document: &'static Document,
    language: Arc<LanguageContext>,
    metrics: Arc<dyn TextMetrics>,
    config: ScreenConfig,
    layout: ScreenLayout,
    navigator: Navigator,
    scroll: ScrollEngine,
    marquee: MarqueeAnimator,
    nodes: SceneNodes,
    generation: u64,
    pending_images: Vec<ImageRequest>,
    events: Arc<Mutex<Vec<ScreenEvent>>>,
    hover: HoverState,
    active: bool,
}

impl TerminalScreen {
    pub fn new(
        document: &'static Document,
        language: Arc<LanguageContext>,
        metrics: Arc<dyn TextMetrics>,
        config: ScreenConfig,
    ) -> Result<Self> {
        let navigator = Navigator::new(document)?;
        let layout = ScreenLayout::new(&config);
        let scroll = ScrollEngine::new(layout.scroll_geometry(), config.device);
        let marquee = MarqueeAnimator::new(config.marquee);
        let mut screen = Self {
            document,
            language,
            metrics,
            config,
            layout,
            navigator,
            scroll,
            marquee,
            nodes: SceneNodes::default(),
            generation: 0,
            pending_images: Vec::new(),
            events: Arc::new(Mutex::new(Vec::new())),
            hover: HoverState::default(),
            active: false,
        };
        screen.refresh_labels();
        screen.refresh_content();
        Ok(screen)
    }

    pub fn events(&self) -> Arc<Mutex<Vec<ScreenEvent>>> {
        Arc::clone(&self.events)
    }

    pub fn nodes(&self) -> &SceneNodes {
        &self.nodes
    }

    pub fn scroll(&self) -> &ScrollEngine {
        &self.scroll
    }

    pub fn marquee(&self) -> &MarqueeAnimator {
        &self.marquee
    }

    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    pub fn document(&self) -> &'static Document {
        self.document
    }

    pub fn language(&self) -> &Arc<LanguageContext> {
        &self.language
    }

    pub fn navigation(&self) -> NavigationState {
        self.navigator.state()
    }

    pub fn current_entry(&self) -> Option<&'static Entry> {
        self.navigator.current_entry()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn hover(&self) -> HoverState {
        self.hover
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn connector_height(&self) -> f32 {
        let state = self.navigator.state();
        self.layout.connector_height(state.section, state.entry)
    }

    pub fn select_section(&mut self, index: usize) -> Transition {
        let transition = self.navigator.select_section(index);
        self.apply_transition(transition)
    }

    pub fn select_entry(&mut self, index: usize) -> Transition {
        let transition = self.navigator.select_entry(index);
        self.apply_transition(transition)
    }

    pub fn next_section(&mut self) -> Transition {
        let transition = self.navigator.next_section();
        self.apply_transition(transition)
    }

    pub fn next_entry(&mut self) -> Transition {
        let transition = self.navigator.next_entry();
        self.apply_transition(transition)
    }

    pub fn previous_entry(&mut self) -> Transition {
        let transition = self.navigator.previous_entry();
        self.apply_transition(transition)
    }

    fn apply_transition(&mut self, transition: Transition) -> Transition {
        match transition {
            Transition::Unchanged => return transition,
            Transition::SectionChanged { .. } => {
                self.marquee.reset();
                self.refresh_entry_labels();
            }
            Transition::EntryChanged { .. } => {}
        }
        self.refresh_content();
        self.events
            .lock()
            .push(ScreenEvent::SelectionChanged(self.navigator.state()));
        transition
    }

    pub fn refresh_content(&mut self) {
        self.generation += 1;
        let state = self.navigator.state();
        let entry = self.navigator.current_entry();

        let text = entry
            .map(|entry| self.language.resolve(entry.body))
            .unwrap_or_default();
        let extent = self
            .metrics
            .block_height(&text, self.layout.word_wrap_width());
        self.nodes.body = TextBlockNode { text, extent };

        self.pending_images.clear();
        for slot in 0..IMAGE_SLOTS {
            let reference = entry.and_then(|entry| entry.image(slot));
            self.nodes.images[slot] = ImageNode {
                reference: reference.map(str::to_string),
                ..ImageNode::default()
            };
            if let Some(reference) = reference {
                self.pending_images.push(ImageRequest {
                    target: ImageTarget {
                        section: state.section,
                        entry: state.entry,
                        slot,
                        generation: self.generation,
                    },
                    reference: reference.to_string(),
                });
            }
        }

        self.scroll.reset(extent);
        debug!(
            section = state.section,
            entry = state.entry,
            generation = self.generation,
            extent,
            "content refreshed"
        );
        self.events.lock().push(ScreenEvent::ContentRefreshed {
            generation: self.generation,
        });
    }

    pub fn take_image_requests(&mut self) -> Vec<ImageRequest> {
        std::mem::take(&mut self.pending_images)
    }

    pub fn apply_image<E: Display>(
        &mut self,
        target: ImageTarget,
        result: Result<Arc<Texture>, E>,
    ) -> bool {
        let state = self.navigator.state();
        if target.generation != self.generation
            || target.section != state.section
            || target.entry != state.entry
        {
            debug!(?target, current = self.generation, "discarding stale image");
            return false;
        }
        let Some(node) = self.nodes.images.get_mut(target.slot) else {
            return false;
        };
        match result {
            Ok(texture) => {
                node.texture = Some(texture);
                node.visible = true;
            }
            Err(err) => {
                warn!(
                    reference = node.reference.as_deref().unwrap_or_default(),
                    "image unavailable: {err}"
                );
                node.texture = None;
                node.visible = false;
            }
        }
        self.layout_images();
        true
    }

    fn layout_images(&mut self) {
        let mut above = self.nodes.body.extent;
        let mut bottom = above;
        for node in &mut self.nodes.images {
            node.placement = match (&node.texture, node.visible) {
                (Some(texture), true) => fit_image(
                    texture.width,
                    texture.height,
                    self.layout.panel_width(),
                    above,
                    self.layout.image_center_x(),
                    &self.config.images,
                ),
                _ => None,
            };
            if let Some(placement) = node.placement {
                above = placement.bottom();
                bottom = bottom.max(placement.bottom());
            }
        }
        self.scroll.set_content_extent(bottom);
    }

    pub fn content_extent(&self) -> f32 {
        self.scroll.state().content_extent
    }

    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::SectionPressed(index) => self.select_section(index).is_change(),
            InputEvent::EntryPressed(index) => self.select_entry(index).is_change(),
            InputEvent::SectionHover(index) => {
                let index = index.filter(|&i| i < SECTION_COUNT);
                std::mem::replace(&mut self.hover.section, index) != index
            }
            InputEvent::EntryHover(index) => {
                let index = index.filter(|&i| i < ENTRY_SLOTS);
                std::mem::replace(&mut self.hover.entry, index) != index
            }
            InputEvent::ThumbDown { y } => self.scroll.press_thumb(y),
            InputEvent::ViewportDown { y } => self.scroll.press_content(y),
            InputEvent::PointerMove { y } => self.scroll.pointer_move(y),
            InputEvent::PointerUp => {
                let held = self.scroll.is_thumb_held() || self.scroll.is_content_held();
                self.scroll.release();
                held
            }
            InputEvent::ViewportEnter => {
                self.scroll.pointer_enter();
                false
            }
            InputEvent::ViewportLeave => {
                self.scroll.pointer_leave();
                false
            }
            InputEvent::Wheel { delta_y } => self.scroll.wheel(delta_y),
            InputEvent::ImagePressed(slot) => {
                let visible = self
                    .nodes
                    .images
                    .get(slot)
                    .map_or(false, |node| node.visible);
                visible && self.open_link().is_some()
            }
        }
    }

    pub fn scroll_by(&mut self, delta_y: f32) -> bool {
        self.scroll.nudge(delta_y)
    }

    pub fn open_link(&mut self) -> Option<String> {
        let link = self.navigator.current_entry()?.link?.to_string();
        debug!(%link, "open link requested");
        self.events.lock().push(ScreenEvent::OpenLink(link.clone()));
        Some(link)
    }

    pub fn cycle_language(&mut self) -> Language {
        let next = self.language.active_language().toggle();
        self.language.set_active(next);
        self.on_language_changed(next);
        next
    }

    pub fn set_locale(&mut self, locale: &str) -> Result<Language, LocaleError> {
        let language = self.language.set_language(locale)?;
        self.on_language_changed(language);
        Ok(language)
    }

    fn on_language_changed(&mut self, language: Language) {
        self.refresh_labels();
        self.refresh_content();
        self.events
            .lock()
            .push(ScreenEvent::LanguageChanged(language));
    }

    pub fn resize(&mut self, width: f32, height: f32, metrics: Arc<dyn TextMetrics>) {
        self.config = self.config.clone().with_viewport(width, height);
        self.layout = ScreenLayout::new(&self.config);
        self.metrics = metrics;
        self.scroll.set_geometry(self.layout.scroll_geometry());
        self.refresh_labels();
        self.nodes.body.extent = self
            .metrics
            .block_height(&self.nodes.body.text, self.layout.word_wrap_width());
        self.layout_images();
        debug!(width, height, "screen resized");
    }

    fn refresh_labels(&mut self) {
        self.nodes.header = self.label(self.language.resolve(LocalizationKey::PersonalTerminal));
        self.nodes.folders_heading = self.label(self.language.resolve(LocalizationKey::Folders));
        for (index, section) in self.document.sections().iter().enumerate() {
            self.nodes.section_labels[index] = self.label(self.language.resolve(section.name));
        }
        self.refresh_entry_labels();
    }

    fn refresh_entry_labels(&mut self) {
        let section = self.navigator.state().section;
        for index in 0..ENTRY_SLOTS {
            let text = self
                .document
                .entry(section, index)
                .map(|entry| self.language.resolve(entry.title))
                .unwrap_or_default();
            let mut label = self.label(text);
            label.offset = self.marquee.offset(index);
            self.nodes.entry_labels[index] = label;
        }
    }

    fn label(&self, text: String) -> LabelNode {
        LabelNode {
            width: self.metrics.label_width(&text),
            text,
            offset: self.config.marquee.margin,
        }
    }

    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        let container_width = self.layout.entry_label_width();
        let extents: [LabelExtent; ENTRY_SLOTS] = std::array::from_fn(|index| LabelExtent {
            label_width: self.nodes.entry_labels[index].width,
            container_width,
        });
        if !self.marquee.tick(dt, &extents) {
            return false;
        }
        for (index, label) in self.nodes.entry_labels.iter_mut().enumerate() {
            label.offset = self.marquee.offset(index);
        }
        true
    }
}

#[async_trait::async_trait]
impl Screen for TerminalScreen {
    #[instrument(skip_all)]
    async fn preload(&mut self, assets: &dyn AssetLoader) -> Result<()> {
        let mut specs = vec![AssetSpec::new(FONT_ASSET, "fonts/Sevastopol.ttf")];
        if self.layout.is_portrait() {
            specs.push(AssetSpec::new(ICON_ATLAS, "sprites/Icons.png"));
        }
        if let Err(err) = assets.load_assets(&specs).await {
            warn!("asset preload incomplete: {err:#}");
        }
        if !wait_until(|| assets.is_ready(FONT_ASSET), FONT_POLL, FONT_TIMEOUT).await {
            warn!("font {FONT_ASSET} not ready, continuing with fallback metrics");
        }
        debug!("terminal preload settled");
        Ok(())
    }

    fn on_enter(&mut self) {
        self.active = true;
        self.refresh_labels();
        debug!(state = ?self.navigator.state(), "terminal entered");
    }

    fn on_exit(&mut self) {
        self.active = false;
        self.scroll.release();
        self.pending_images.clear();
        debug!("terminal exited");
    }

    fn on_tick(&mut self, dt: f32) {
        self.tick(dt);
    }
}
