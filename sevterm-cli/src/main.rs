use std::env;
use std::fs;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::cursor;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{self, Clear, ClearType};
use directories::ProjectDirs;
use sevterm_core::{
    DeviceClass, Document, ImageTarget, Language, LanguageContext, Screen, ScreenConfig,
    ScreenEvent, TerminalScreen, Texture, FONT_ASSET, IMAGE_SLOTS,
};
use sevterm_render::{DecodingImageSource, FsAssetLoader, ImageCache, ImageError};
use sevterm_tty::{CellMapper, DrawParams, EventMapper, HitMap, KittyRenderer, Painter, UiEvent};
use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{prelude::*, EnvFilter};
use url::Url;

const CELL_WIDTH: f32 = 10.0;
const CELL_HEIGHT: f32 = 20.0;
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Parser)]
#[command(
    name = "sevterm",
    version,
    about = "Personal terminal screen for kitty-compatible terminals"
)]
struct Args {
    /// Configuration file (defaults to config.toml in the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Locale to start in, e.g. en_GB or ja_JP
    #[arg(short, long)]
    locale: Option<String>,

    /// Scroll by dragging the text instead of the scrollbar
    #[arg(long)]
    touch: bool,

    /// Directory containing the assets/ folder
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Skip loading entry images
    #[arg(long)]
    no_images: bool,

    /// Write the effective configuration to the config path and exit
    #[arg(long)]
    write_config: bool,
}

struct RawModeGuard;

impl RawModeGuard {
    fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = crossterm::execute!(stdout, DisableMouseCapture, cursor::Show);
    }
}

struct Loaded {
    target: ImageTarget,
    result: Result<Arc<Texture>, ImageError>,
}

enum LoopAction {
    Continue,
    ContinueRedraw,
    Quit,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let project_dirs = ProjectDirs::from("dev", "sevterm", "sevterm")
        .ok_or_else(|| anyhow!("unable to resolve platform data directories"))?;
    let _log_guard = init_logging(&project_dirs)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| project_dirs.config_dir().join("config.toml"));
    let mut config = ScreenConfig::load_or_default(&config_path)
        .with_context(|| format!("failed to load config {:?}", config_path))?;
    if args.touch {
        config = config.with_device(DeviceClass::Touch);
    }
    if args.write_config {
        config.save(&config_path)?;
        println!("wrote {}", config_path.display());
        return Ok(());
    }

    let language = Arc::new(LanguageContext::new(Language::English, config.device));
    for locale in locale_candidates(&args, &config) {
        if language.set_language(&locale).is_ok() {
            break;
        }
    }
    info!(language = ?language.active_language(), device = ?config.device, "starting");

    let (columns, rows) = terminal::size().context("failed to query terminal size")?;
    let (scene_width, scene_height) = scene_for(&config, columns, rows);
    let cells = CellMapper::new(columns, rows, scene_width, scene_height);
    let mut screen = TerminalScreen::new(
        Document::terminal(),
        language,
        Arc::new(cells.metrics()),
        config.with_viewport(scene_width, scene_height),
    )?;

    let assets = FsAssetLoader::new(args.root.join("assets"));
    assets.provide(FONT_ASSET);
    screen.preload(&assets).await?;

    let source = DecodingImageSource::new(&args.root, HTTP_TIMEOUT);
    let cache = Arc::new(ImageCache::new(Arc::new(source)));
    let (loaded_tx, mut loaded_rx) = mpsc::unbounded_channel();

    let _raw = RawModeGuard::new()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, cursor::Hide, EnableMouseCapture)?;

    let mut app = App {
        mapper: EventMapper::new(cells),
        painter: Painter::new(cells),
        renderer: KittyRenderer::new(stdout),
        cache,
        loaded_tx,
        load_images: !args.no_images,
        transmitted: Default::default(),
        status: None,
        screen,
    };
    app.screen.on_enter();
    app.dispatch_images();
    app.redraw()?;

    let frame = Duration::from_secs_f32(app.screen.config().frame_seconds());
    let mut ticker = interval(frame);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_tick = Instant::now();

    loop {
        let mut dirty = false;
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let dt = (now - last_tick).as_secs_f32() * 60.0;
                last_tick = now;
                dirty |= app.screen.tick(dt);

                match app.drain_input()? {
                    LoopAction::Quit => break,
                    LoopAction::ContinueRedraw => dirty = true,
                    LoopAction::Continue => {}
                }
            }
            Some(loaded) = loaded_rx.recv() => {
                dirty |= app.screen.apply_image(loaded.target, loaded.result);
            }
        }
        if dirty {
            app.redraw()?;
        }
    }

    app.screen.on_exit();
    app.renderer.delete_all()?;
    {
        let mut writer = app.renderer.writer();
        crossterm::execute!(&mut writer, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    }
    debug!(cached_images = app.cache.len(), "shutdown");
    Ok(())
}

struct App {
    screen: TerminalScreen,
    mapper: EventMapper,
    painter: Painter,
    renderer: KittyRenderer<Stdout>,
    cache: Arc<ImageCache>,
    loaded_tx: mpsc::UnboundedSender<Loaded>,
    load_images: bool,
    transmitted: [Option<Arc<Texture>>; IMAGE_SLOTS],
    status: Option<String>,
}

impl App {
    fn drain_input(&mut self) -> Result<LoopAction> {
        let mut action = LoopAction::Continue;
        while event::poll(Duration::ZERO)? {
            let raw = event::read()?;
            self.mapper.set_hit_map(HitMap::from_screen(&self.screen));
            for ui_event in self.mapper.map_event(raw) {
                match self.handle_event(ui_event)? {
                    LoopAction::Quit => return Ok(LoopAction::Quit),
                    LoopAction::ContinueRedraw => action = LoopAction::ContinueRedraw,
                    LoopAction::Continue => {}
                }
            }
        }
        if self.drain_screen_events() {
            action = LoopAction::ContinueRedraw;
        }
        self.dispatch_images();
        Ok(action)
    }

    fn handle_event(&mut self, event: UiEvent) -> Result<LoopAction> {
        let changed = match event {
            UiEvent::Input(input) => self.screen.handle_input(input),
            UiEvent::NextSection => self.screen.next_section().is_change(),
            UiEvent::NextEntry => self.screen.next_entry().is_change(),
            UiEvent::PreviousEntry => self.screen.previous_entry().is_change(),
            UiEvent::ScrollBy(delta) => self.screen.scroll_by(delta),
            UiEvent::CycleLanguage => {
                self.screen.cycle_language();
                true
            }
            UiEvent::OpenLink => {
                self.screen.open_link();
                false
            }
            UiEvent::Resize { columns, rows } => {
                self.resize(columns, rows)?;
                true
            }
            UiEvent::Quit => return Ok(LoopAction::Quit),
            UiEvent::None => false,
        };
        Ok(if changed {
            LoopAction::ContinueRedraw
        } else {
            LoopAction::Continue
        })
    }

    fn drain_screen_events(&mut self) -> bool {
        let events = std::mem::take(&mut *self.screen.events().lock());
        let mut redraw = false;
        for event in events {
            match event {
                ScreenEvent::OpenLink(link) => {
                    self.status = Some(hand_off_link(&link));
                    redraw = true;
                }
                ScreenEvent::LanguageChanged(language) => {
                    info!(?language, "language changed");
                    redraw = true;
                }
                ScreenEvent::SelectionChanged(state) => {
                    debug!(?state, "selection changed");
                    self.status = None;
                }
                ScreenEvent::ContentRefreshed { .. } => redraw = true,
            }
        }
        redraw
    }

    fn dispatch_images(&mut self) {
        let requests = self.screen.take_image_requests();
        if !self.load_images {
            return;
        }
        for request in requests {
            let cache = Arc::clone(&self.cache);
            let tx = self.loaded_tx.clone();
            tokio::spawn(async move {
                let result = cache.resolve(&request.reference).await;
                let _ = tx.send(Loaded {
                    target: request.target,
                    result,
                });
            });
        }
    }

    fn resize(&mut self, columns: u16, rows: u16) -> Result<()> {
        let (width, height) = scene_for(self.screen.config(), columns, rows);
        let cells = CellMapper::new(columns, rows, width, height);
        self.screen.resize(width, height, Arc::new(cells.metrics()));
        self.mapper.set_cell_mapper(cells);
        self.painter = Painter::new(cells);
        self.transmitted = Default::default();
        self.renderer.delete_all()?;
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        self.renderer.begin_sync_update()?;
        self.renderer.clear_placements()?;
        self.renderer.clear_all()?;
        let images = self.painter.paint(self.renderer.writer(), &self.screen)?;

        for cell in images {
            let image_id = cell.slot as u32 + 1;
            let params =
                DrawParams::clamped(cell.column, cell.row, cell.columns.into(), cell.rows.into());
            let known = self.transmitted[cell.slot]
                .as_ref()
                .is_some_and(|texture| Arc::ptr_eq(texture, &cell.texture));
            if known {
                self.renderer.place(image_id, params)?;
            } else if let Err(err) = self.renderer.draw(image_id, &cell.texture, params) {
                warn!(slot = cell.slot, "failed to draw image: {err:#}");
            } else {
                self.transmitted[cell.slot] = Some(cell.texture);
            }
        }

        if let Some(status) = &self.status {
            let row = self.painter.cells().rows().saturating_sub(1);
            draw_status_line(self.renderer.writer(), row, status)?;
        }
        self.renderer.end_sync_update()?;
        Ok(())
    }
}

fn locale_candidates(args: &Args, config: &ScreenConfig) -> Vec<String> {
    let mut candidates = Vec::new();
    candidates.extend(args.locale.clone());
    for var in ["LC_ALL", "LANG"] {
        if let Ok(value) = env::var(var) {
            if !value.is_empty() && value != "C" && value != "POSIX" {
                candidates.push(value);
            }
        }
    }
    candidates.push(config.default_locale.clone());
    candidates
}

fn scene_for(config: &ScreenConfig, columns: u16, rows: u16) -> (f32, f32) {
    config
        .clone()
        .with_viewport(
            f32::from(columns) * CELL_WIDTH,
            f32::from(rows) * CELL_HEIGHT,
        )
        .scene_size()
}

fn hand_off_link(link: &str) -> String {
    let url = match Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        Ok(url) => {
            warn!(%link, scheme = url.scheme(), "refusing to open link");
            return format!("unsupported link: {link}");
        }
        Err(err) => {
            warn!(%link, "invalid link: {err}");
            return format!("invalid link: {link}");
        }
    };
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(url.as_str())) {
        Ok(()) => {
            info!(%url, "link copied to clipboard");
            format!("copied {url}")
        }
        Err(err) => {
            warn!(%url, "clipboard unavailable: {err}");
            format!("open {url}")
        }
    }
}

fn draw_status_line(writer: &mut impl Write, row: u16, status: &str) -> Result<()> {
    crossterm::queue!(
        writer,
        cursor::MoveTo(0, row),
        Clear(ClearType::CurrentLine),
        SetAttribute(Attribute::Reverse),
        Print(format!(" {status} ")),
        SetAttribute(Attribute::Reset)
    )?;
    Ok(())
}

fn init_logging(project_dirs: &ProjectDirs) -> Result<WorkerGuard> {
    let log_dir = project_dirs.data_local_dir().join("logs");
    fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, "sevterm.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout belongs to the painter.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!(err))?;

    Ok(guard)
}
