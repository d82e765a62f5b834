use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use sevterm_core::{
    DeviceClass, InputEvent, MonospaceMetrics, Rect, ScreenLayout, TerminalScreen, ENTRY_SLOTS,
    IMAGE_SLOTS, SECTION_COUNT,
};

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Input(InputEvent),
    NextSection,
    NextEntry,
    PreviousEntry,
    ScrollBy(f32),
    CycleLanguage,
    OpenLink,
    Resize { columns: u16, rows: u16 },
    Quit,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMapper {
    columns: u16,
    rows: u16,
    scale_x: f32,
    scale_y: f32,
}

impl CellMapper {
    pub fn new(columns: u16, rows: u16, scene_width: f32, scene_height: f32) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        Self {
            columns,
            rows,
            scale_x: scene_width / f32::from(columns),
            scale_y: scene_height / f32::from(rows),
        }
    }

    pub fn for_layout(columns: u16, rows: u16, layout: &ScreenLayout) -> Self {
        Self::new(columns, rows, layout.width(), layout.height())
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn scale_x(&self) -> f32 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f32 {
        self.scale_y
    }

    pub fn metrics(&self) -> MonospaceMetrics {
        MonospaceMetrics::new(self.scale_x, self.scale_y)
    }

    pub fn to_scene(&self, column: u16, row: u16) -> (f32, f32) {
        (
            (f32::from(column) + 0.5) * self.scale_x,
            (f32::from(row) + 0.5) * self.scale_y,
        )
    }

    pub fn column(&self, x: f32) -> i32 {
        (x / self.scale_x).floor() as i32
    }

    pub fn row(&self, y: f32) -> i32 {
        (y / self.scale_y).floor() as i32
    }

    pub fn cells(&self, rect: Rect) -> Option<(u16, u16, u16, u16)> {
        let left = self.column(rect.x).max(0);
        let top = self.row(rect.y).max(0);
        let right = self.column(rect.right()).min(i32::from(self.columns));
        let bottom = self.row(rect.bottom()).min(i32::from(self.rows));
        if right <= left || bottom <= top {
            return None;
        }
        Some((
            left as u16,
            top as u16,
            (right - left) as u16,
            (bottom - top) as u16,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Section(usize),
    Entry(usize),
    Thumb,
    Image(usize),
    Viewport,
    Nothing,
}

impl HitTarget {
    fn in_viewport(self) -> bool {
        matches!(self, HitTarget::Thumb | HitTarget::Image(_) | HitTarget::Viewport)
    }
}

#[derive(Debug, Clone)]
pub struct HitMap {
    sections: [Option<Rect>; SECTION_COUNT],
    entries: [Option<Rect>; ENTRY_SLOTS],
    viewport: Rect,
    thumb: Option<Rect>,
    images: [Option<Rect>; IMAGE_SLOTS],
}

impl HitMap {
    pub fn from_screen(screen: &TerminalScreen) -> Self {
        let layout = screen.layout();
        let state = screen.scroll().state();
        let viewport = layout.text_area();
        let section = screen.navigation().section;
        let document = screen.document();

        let sections = std::array::from_fn(|i| layout.section_box(i));
        let entries = std::array::from_fn(|i| {
            document
                .entry(section, i)
                .and_then(|_| layout.entry_row(i))
        });
        let thumb = match screen.scroll().device() {
            DeviceClass::Pointer => Some(layout.thumb_rect(state.thumb_offset)),
            DeviceClass::Touch => None,
        };
        let images = std::array::from_fn(|slot| {
            let node = &screen.nodes().images[slot];
            let placement = node.placement.filter(|_| node.visible)?;
            Some(Rect::new(
                viewport.x + placement.x_center - placement.width / 2.0,
                layout.content_to_scene_y(state.content_offset, placement.top),
                placement.width,
                placement.height,
            ))
        });

        Self {
            sections,
            entries,
            viewport,
            thumb,
            images,
        }
    }

    pub fn hit(&self, x: f32, y: f32) -> HitTarget {
        if self.viewport.contains(x, y) {
            if self.thumb.map_or(false, |thumb| thumb.contains(x, y)) {
                return HitTarget::Thumb;
            }
            if let Some(slot) = self
                .images
                .iter()
                .position(|rect| rect.map_or(false, |rect| rect.contains(x, y)))
            {
                return HitTarget::Image(slot);
            }
            return HitTarget::Viewport;
        }
        if let Some(index) = self
            .sections
            .iter()
            .position(|rect| rect.map_or(false, |rect| rect.contains(x, y)))
        {
            return HitTarget::Section(index);
        }
        if let Some(index) = self
            .entries
            .iter()
            .position(|rect| rect.map_or(false, |rect| rect.contains(x, y)))
        {
            return HitTarget::Entry(index);
        }
        HitTarget::Nothing
    }
}

#[derive(Debug)]
pub struct EventMapper {
    mapper: CellMapper,
    hit_map: Option<HitMap>,
    hover: HitTarget,
    pressed_image: Option<usize>,
}

impl EventMapper {
    pub const WHEEL_STEP: f32 = 100.0;
    pub const PAGE_STEP: f32 = 400.0;

    pub fn new(mapper: CellMapper) -> Self {
        Self {
            mapper,
            hit_map: None,
            hover: HitTarget::Nothing,
            pressed_image: None,
        }
    }

    pub fn set_cell_mapper(&mut self, mapper: CellMapper) {
        self.mapper = mapper;
    }

    pub fn set_hit_map(&mut self, hit_map: HitMap) {
        self.hit_map = Some(hit_map);
    }

    pub fn map_event(&mut self, event: Event) -> Vec<UiEvent> {
        match event {
            Event::Key(key) => vec![self.map_key(key)],
            Event::Mouse(mouse) => self.map_mouse(mouse),
            Event::Resize(columns, rows) => vec![UiEvent::Resize { columns, rows }],
            _ => vec![UiEvent::None],
        }
    }

    fn map_key(&mut self, key: KeyEvent) -> UiEvent {
        if key.kind == KeyEventKind::Release {
            return UiEvent::None;
        }
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
                UiEvent::Quit
            }
            (KeyCode::Char(c @ '1'..='4'), _) => {
                let index = c as usize - '1' as usize;
                UiEvent::Input(InputEvent::SectionPressed(index))
            }
            (KeyCode::Tab, _) => UiEvent::NextSection,
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, KeyModifiers::NONE) => {
                UiEvent::NextEntry
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, KeyModifiers::NONE) => {
                UiEvent::PreviousEntry
            }
            (KeyCode::Char('J'), _) | (KeyCode::Down, KeyModifiers::SHIFT) => {
                UiEvent::ScrollBy(Self::WHEEL_STEP)
            }
            (KeyCode::Char('K'), _) | (KeyCode::Up, KeyModifiers::SHIFT) => {
                UiEvent::ScrollBy(-Self::WHEEL_STEP)
            }
            (KeyCode::PageDown, _) | (KeyCode::Char(' '), _) => UiEvent::ScrollBy(Self::PAGE_STEP),
            (KeyCode::PageUp, _) => UiEvent::ScrollBy(-Self::PAGE_STEP),
            (KeyCode::Char('l'), _) => UiEvent::CycleLanguage,
            (KeyCode::Enter, _) | (KeyCode::Char('o'), _) => UiEvent::OpenLink,
            (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => UiEvent::Quit,
            _ => UiEvent::None,
        }
    }

    fn map_mouse(&mut self, mouse: MouseEvent) -> Vec<UiEvent> {
        let (x, y) = self.mapper.to_scene(mouse.column, mouse.row);
        let target = self
            .hit_map
            .as_ref()
            .map_or(HitTarget::Nothing, |map| map.hit(x, y));

        let mut events = self.update_hover(target);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => match target {
                HitTarget::Section(index) => {
                    events.push(UiEvent::Input(InputEvent::SectionPressed(index)))
                }
                HitTarget::Entry(index) => {
                    events.push(UiEvent::Input(InputEvent::EntryPressed(index)))
                }
                HitTarget::Thumb => events.push(UiEvent::Input(InputEvent::ThumbDown { y })),
                HitTarget::Image(slot) => {
                    self.pressed_image = Some(slot);
                    events.push(UiEvent::Input(InputEvent::ViewportDown { y }));
                }
                HitTarget::Viewport => events.push(UiEvent::Input(InputEvent::ViewportDown { y })),
                HitTarget::Nothing => {}
            },
            MouseEventKind::Drag(MouseButton::Left) => {
                events.push(UiEvent::Input(InputEvent::PointerMove { y }));
            }
            MouseEventKind::Up(MouseButton::Left) => {
                events.push(UiEvent::Input(InputEvent::PointerUp));
                if let Some(slot) = self.pressed_image.take() {
                    if target == HitTarget::Image(slot) {
                        events.push(UiEvent::Input(InputEvent::ImagePressed(slot)));
                    }
                }
            }
            MouseEventKind::ScrollDown => events.push(UiEvent::Input(InputEvent::Wheel {
                delta_y: Self::WHEEL_STEP,
            })),
            MouseEventKind::ScrollUp => events.push(UiEvent::Input(InputEvent::Wheel {
                delta_y: -Self::WHEEL_STEP,
            })),
            _ => {}
        }
        if events.is_empty() {
            events.push(UiEvent::None);
        }
        events
    }

    fn update_hover(&mut self, target: HitTarget) -> Vec<UiEvent> {
        let previous = std::mem::replace(&mut self.hover, target);
        let mut events = Vec::new();
        if previous == target {
            return events;
        }
        match (previous.in_viewport(), target.in_viewport()) {
            (false, true) => events.push(UiEvent::Input(InputEvent::ViewportEnter)),
            (true, false) => events.push(UiEvent::Input(InputEvent::ViewportLeave)),
            _ => {}
        }
        if let HitTarget::Image(slot) = previous {
            if self.pressed_image == Some(slot) && target != previous {
                self.pressed_image = None;
            }
        }
        let section = |t: HitTarget| match t {
            HitTarget::Section(i) => Some(i),
            _ => None,
        };
        let entry = |t: HitTarget| match t {
            HitTarget::Entry(i) => Some(i),
            _ => None,
        };
        if section(previous) != section(target) {
            events.push(UiEvent::Input(InputEvent::SectionHover(section(target))));
        }
        if entry(previous) != entry(target) {
            events.push(UiEvent::Input(InputEvent::EntryHover(entry(target))));
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crossterm::event::KeyEventState;
    use sevterm_core::{Document, Language, LanguageContext, ScreenConfig};

    fn screen(device: DeviceClass) -> TerminalScreen {
        TerminalScreen::new(
            Document::terminal(),
            Arc::new(LanguageContext::new(Language::English, device)),
            Arc::new(MonospaceMetrics::default()),
            ScreenConfig::default().with_device(device),
        )
        .unwrap()
    }

    fn mapper_for(screen: &TerminalScreen) -> EventMapper {
        let cells = CellMapper::for_layout(72, 64, screen.layout());
        let mut mapper = EventMapper::new(cells);
        mapper.set_hit_map(HitMap::from_screen(screen));
        mapper
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn cell_at(cells: &CellMapper, x: f32, y: f32) -> (u16, u16) {
        (cells.column(x) as u16, cells.row(y) as u16)
    }

    #[test]
    fn cell_mapper_round_trips_cell_centres() {
        let cells = CellMapper::new(72, 64, 720.0, 1280.0);
        assert_eq!(cells.to_scene(0, 0), (5.0, 10.0));
        let (x, y) = cells.to_scene(10, 20);
        assert_eq!((cells.column(x), cells.row(y)), (10, 20));
        assert_eq!(cells.metrics().advance, 10.0);
        assert_eq!(cells.cells(Rect::new(-50.0, -50.0, 10.0, 10.0)), None);
        assert_eq!(
            cells.cells(Rect::new(700.0, 0.0, 100.0, 20.0)),
            Some((70, 0, 2, 1))
        );
    }

    #[test]
    fn keys_map_to_navigation() {
        let screen = screen(DeviceClass::Pointer);
        let mut mapper = mapper_for(&screen);
        assert_eq!(
            mapper.map_event(key(KeyCode::Char('3'))),
            vec![UiEvent::Input(InputEvent::SectionPressed(2))]
        );
        assert_eq!(mapper.map_event(key(KeyCode::Tab)), vec![UiEvent::NextSection]);
        assert_eq!(mapper.map_event(key(KeyCode::Down)), vec![UiEvent::NextEntry]);
        assert_eq!(mapper.map_event(key(KeyCode::Char('k'))), vec![UiEvent::PreviousEntry]);
        assert_eq!(
            mapper.map_event(key(KeyCode::PageDown)),
            vec![UiEvent::ScrollBy(EventMapper::PAGE_STEP)]
        );
        assert_eq!(mapper.map_event(key(KeyCode::Char('q'))), vec![UiEvent::Quit]);
        assert_eq!(mapper.map_event(key(KeyCode::Char('z'))), vec![UiEvent::None]);
    }

    #[test]
    fn clicks_resolve_against_layout() {
        let screen = screen(DeviceClass::Pointer);
        let mut mapper = mapper_for(&screen);
        let cells = mapper.mapper;

        let row_rect = screen.layout().entry_row(1).unwrap();
        let (column, row) = cell_at(&cells, row_rect.x + 10.0, row_rect.y + 30.0);
        let events = mapper.map_event(mouse(MouseEventKind::Down(MouseButton::Left), column, row));
        assert!(events.contains(&UiEvent::Input(InputEvent::EntryHover(Some(1)))));
        assert_eq!(
            events.last(),
            Some(&UiEvent::Input(InputEvent::EntryPressed(1)))
        );

        let section_rect = screen.layout().section_box(2).unwrap();
        let (column, row) = cell_at(&cells, section_rect.x + 10.0, section_rect.y + 20.0);
        let events = mapper.map_event(mouse(MouseEventKind::Down(MouseButton::Left), column, row));
        assert_eq!(
            events.last(),
            Some(&UiEvent::Input(InputEvent::SectionPressed(2)))
        );
    }

    #[test]
    fn wheel_over_viewport_enters_first() {
        let screen = screen(DeviceClass::Pointer);
        let mut mapper = mapper_for(&screen);
        let cells = mapper.mapper;
        let area = screen.layout().text_area();
        let (column, row) = cell_at(&cells, area.x + 50.0, area.y + 100.0);

        let events = mapper.map_event(mouse(MouseEventKind::ScrollDown, column, row));
        assert_eq!(
            events,
            vec![
                UiEvent::Input(InputEvent::ViewportEnter),
                UiEvent::Input(InputEvent::Wheel {
                    delta_y: EventMapper::WHEEL_STEP
                }),
            ]
        );

        let events = mapper.map_event(mouse(MouseEventKind::Moved, 0, 0));
        assert_eq!(events, vec![UiEvent::Input(InputEvent::ViewportLeave)]);
    }

    #[test]
    fn thumb_press_only_on_pointer_devices() {
        let pointer = screen(DeviceClass::Pointer);
        let mut mapper = mapper_for(&pointer);
        let cells = mapper.mapper;
        let thumb = pointer.layout().thumb_rect(0.0);
        let (column, row) = cell_at(&cells, thumb.x + 1.0, thumb.y + 40.0);
        let events = mapper.map_event(mouse(MouseEventKind::Down(MouseButton::Left), column, row));
        assert!(matches!(
            events.last(),
            Some(UiEvent::Input(InputEvent::ThumbDown { .. }))
        ));

        let touch = screen(DeviceClass::Touch);
        let mut mapper = mapper_for(&touch);
        let thumb = touch.layout().thumb_rect(0.0);
        let (column, row) = cell_at(&cells, thumb.x + 1.0, thumb.y + 40.0);
        let events = mapper.map_event(mouse(MouseEventKind::Down(MouseButton::Left), column, row));
        assert!(matches!(
            events.last(),
            Some(UiEvent::Input(InputEvent::ViewportDown { .. }))
        ));
    }

    #[test]
    fn drag_and_release_emit_pointer_events() {
        let screen = screen(DeviceClass::Pointer);
        let mut mapper = mapper_for(&screen);
        let events = mapper.map_event(mouse(MouseEventKind::Drag(MouseButton::Left), 0, 0));
        assert!(matches!(
            events.last(),
            Some(UiEvent::Input(InputEvent::PointerMove { .. }))
        ));
        let events = mapper.map_event(mouse(MouseEventKind::Up(MouseButton::Left), 0, 0));
        assert_eq!(events, vec![UiEvent::Input(InputEvent::PointerUp)]);
    }
}
