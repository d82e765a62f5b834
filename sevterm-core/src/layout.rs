use crate::config::{ImageFitConfig, ScreenConfig};
use crate::document::{ENTRY_SLOTS, SECTION_COUNT};
use crate::scroll::ScrollGeometry;

const PANEL_WIDTH_FRACTION: f32 = 0.6;
const PANEL_HEIGHT_FRACTION: f32 = 0.65;
const PANEL_INSET: f32 = 25.0;
const ENTRY_TOP_FRACTION: f32 = 0.09;
const ENTRY_PITCH: f32 = 105.0;
const ENTRY_HEIGHT: f32 = 70.0;
const SECTION_TOP_FRACTION: f32 = 0.25;
const SECTION_PITCH: f32 = 208.0;
const SECTION_LEFT: f32 = 50.0;
const POINTER_SCROLLBAR_WIDTH: f32 = 20.0;
const TOUCH_SCROLLBAR_WIDTH: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub x_center: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ImagePlacement {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

pub fn fit_image(
    intrinsic_width: u32,
    intrinsic_height: u32,
    available: f32,
    above: f32,
    x_center: f32,
    config: &ImageFitConfig,
) -> Option<ImagePlacement> {
    if intrinsic_width == 0 || intrinsic_height == 0 {
        return None;
    }
    let natural = intrinsic_width as f32;
    let width = (config.max_width_fraction * available).min(natural.max(config.min_width));
    if width <= 0.0 {
        return None;
    }
    let height = width * intrinsic_height as f32 / natural;
    Some(ImagePlacement {
        x_center,
        top: above + config.margin,
        width,
        height,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenLayout {
    width: f32,
    height: f32,
    portrait: bool,
    scrollbar_width: f32,
    thumb_extent: f32,
}

impl ScreenLayout {
    pub fn new(config: &ScreenConfig) -> Self {
        let (width, height) = config.scene_size();
        let scrollbar_width = if config.device.is_touch() {
            TOUCH_SCROLLBAR_WIDTH
        } else {
            POINTER_SCROLLBAR_WIDTH
        };
        Self {
            width,
            height,
            portrait: height > width,
            scrollbar_width,
            thumb_extent: config.thumb_extent,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn is_portrait(&self) -> bool {
        self.portrait
    }

    pub fn scrollbar_width(&self) -> f32 {
        self.scrollbar_width
    }

    pub fn panel_width(&self) -> f32 {
        self.width * PANEL_WIDTH_FRACTION
    }

    pub fn header(&self) -> Rect {
        Rect::new(PANEL_INSET, PANEL_INSET, self.width - 2.0 * PANEL_INSET, 40.0)
    }

    pub fn folders_heading(&self) -> Rect {
        Rect::new(
            SECTION_LEFT,
            self.height * SECTION_TOP_FRACTION,
            self.section_box_size().0,
            40.0,
        )
    }

    fn section_box_size(&self) -> (f32, f32) {
        if self.portrait {
            (75.0, 75.0)
        } else {
            (400.0, 188.0)
        }
    }

    pub fn section_box(&self, index: usize) -> Option<Rect> {
        if index >= SECTION_COUNT {
            return None;
        }
        let (width, height) = self.section_box_size();
        let y = self.height * SECTION_TOP_FRACTION + 45.0 + index as f32 * SECTION_PITCH;
        Some(Rect::new(SECTION_LEFT, y, width, height))
    }

    pub fn entry_row(&self, index: usize) -> Option<Rect> {
        if index >= ENTRY_SLOTS {
            return None;
        }
        Some(Rect::new(
            self.width - self.panel_width() - PANEL_INSET,
            self.height * ENTRY_TOP_FRACTION + index as f32 * ENTRY_PITCH,
            self.panel_width(),
            ENTRY_HEIGHT,
        ))
    }

    pub fn entry_label_width(&self) -> f32 {
        self.panel_width() - 30.0
    }

    pub fn text_panel(&self) -> Rect {
        let width = self.panel_width();
        let height = self.height * PANEL_HEIGHT_FRACTION;
        Rect::new(
            self.width - PANEL_INSET - width,
            self.height - PANEL_INSET - height,
            width,
            height,
        )
    }

    pub fn text_area(&self) -> Rect {
        let panel = self.text_panel();
        Rect::new(
            panel.x + 5.0,
            panel.y + 35.0,
            panel.width - 10.0,
            panel.height - 40.0,
        )
    }

    pub fn word_wrap_width(&self) -> f32 {
        self.panel_width() - 30.0 - self.scrollbar_width
    }

    pub fn image_center_x(&self) -> f32 {
        (self.text_area().width - self.scrollbar_width) / 2.0
    }

    pub fn viewport_extent(&self) -> f32 {
        self.text_area().height
    }

    pub fn top_offset(&self) -> f32 {
        -(self.height * PANEL_HEIGHT_FRACTION) + 45.0
    }

    pub fn content_to_scene_y(&self, content_offset: f32, y: f32) -> f32 {
        self.text_panel().bottom() + content_offset + y
    }

    pub fn scroll_geometry(&self) -> ScrollGeometry {
        ScrollGeometry {
            top_offset: self.top_offset(),
            viewport_extent: self.viewport_extent(),
            thumb_extent: self.thumb_extent,
        }
    }

    pub fn scrollbar_track(&self) -> Rect {
        let area = self.text_area();
        Rect::new(
            area.right() - self.scrollbar_width,
            area.y,
            self.scrollbar_width,
            area.height,
        )
    }

    pub fn thumb_rect(&self, thumb_offset: f32) -> Rect {
        let track = self.scrollbar_track();
        Rect::new(
            track.x,
            track.y + thumb_offset,
            track.width,
            self.thumb_extent.min(track.height),
        )
    }

    pub fn connector_height(&self, section: usize, entry: usize) -> f32 {
        let box_height = self.section_box_size().1;
        (self.height * SECTION_TOP_FRACTION + 40.0 + box_height * 0.5)
            - (self.height * ENTRY_TOP_FRACTION + 35.0)
            - ENTRY_PITCH * entry as f32
            + SECTION_PITCH * section as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeviceClass;

    fn layout(device: DeviceClass) -> ScreenLayout {
        ScreenLayout::new(&ScreenConfig::default().with_device(device))
    }

    #[test]
    fn viewport_minimums_apply() {
        let layout = ScreenLayout::new(&ScreenConfig::default().with_viewport(100.0, 100.0));
        assert_eq!(layout.width(), 640.0);
        assert_eq!(layout.height(), 1280.0);
        assert!(layout.is_portrait());
    }

    #[test]
    fn panel_geometry() {
        let layout = layout(DeviceClass::Pointer);
        let panel = layout.text_panel();
        assert!((panel.width - 432.0).abs() < 1e-3);
        assert!((panel.height - 832.0).abs() < 1e-3);
        assert!((panel.right() - 695.0).abs() < 1e-3);
        assert!((panel.bottom() - 1255.0).abs() < 1e-3);

        let geometry = layout.scroll_geometry();
        assert!((geometry.viewport_extent - 792.0).abs() < 1e-3);
        assert!((geometry.top_offset + 787.0).abs() < 1e-3);
        assert_eq!(geometry.thumb_extent, 200.0);
        assert!((layout.word_wrap_width() - 382.0).abs() < 1e-3);
    }

    #[test]
    fn top_of_content_sits_inside_text_area() {
        let layout = layout(DeviceClass::Pointer);
        let y = layout.content_to_scene_y(layout.top_offset(), 0.0);
        let area = layout.text_area();
        assert!(y >= area.y && y < area.bottom());
    }

    #[test]
    fn touch_narrows_scrollbar() {
        assert_eq!(layout(DeviceClass::Touch).scrollbar_width(), 5.0);
        assert_eq!(layout(DeviceClass::Pointer).scrollbar_width(), 20.0);
    }

    #[test]
    fn rows_and_boxes_are_bounded() {
        let layout = layout(DeviceClass::Pointer);
        assert!(layout.entry_row(2).is_some());
        assert!(layout.entry_row(3).is_none());
        assert!(layout.section_box(3).is_some());
        assert!(layout.section_box(4).is_none());
        let first = layout.entry_row(0).unwrap();
        let second = layout.entry_row(1).unwrap();
        assert!((second.y - first.y - 105.0).abs() < 1e-3);
        assert!(first.contains(first.x + 1.0, first.y + 1.0));
        assert!(!first.contains(first.x - 1.0, first.y + 1.0));
    }

    #[test]
    fn connector_spans_section_to_entry() {
        let layout = layout(DeviceClass::Pointer);
        // Portrait: (1280*0.25 + 40 + 37.5) - (1280*0.09 + 35)
        assert!((layout.connector_height(0, 0) - 247.3).abs() < 1e-2);
        assert!((layout.connector_height(1, 2) - (247.3 - 210.0 + 208.0)).abs() < 1e-2);
    }

    #[test]
    fn images_scale_within_bounds() {
        let config = ImageFitConfig::default();
        let small = fit_image(90, 45, 432.0, 300.0, 200.0, &config).unwrap();
        assert_eq!(small.width, 180.0);
        assert_eq!(small.height, 90.0);
        assert_eq!(small.top, 330.0);
        assert_eq!(small.bottom(), 420.0);

        let large = fit_image(1000, 500, 432.0, 0.0, 200.0, &config).unwrap();
        assert!((large.width - 345.6).abs() < 1e-3);
        assert!((large.height - 172.8).abs() < 1e-3);

        assert!(fit_image(0, 10, 432.0, 0.0, 0.0, &config).is_none());
    }
}
