use crate::DeviceClass;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollGeometry {
    pub top_offset: f32,
    pub viewport_extent: f32,
    pub thumb_extent: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub content_offset: f32,
    pub thumb_offset: f32,
    pub content_extent: f32,
    pub viewport_extent: f32,
    pub thumb_extent: f32,
    pub top_offset: f32,
}

impl ScrollState {
    fn at_top(geometry: ScrollGeometry, content_extent: f32) -> Self {
        Self {
            content_offset: geometry.top_offset,
            thumb_offset: 0.0,
            content_extent: content_extent.max(0.0),
            viewport_extent: geometry.viewport_extent,
            thumb_extent: geometry.thumb_extent,
            top_offset: geometry.top_offset,
        }
    }

    pub fn thumb_track_max(&self) -> f32 {
        (self.viewport_extent - self.thumb_extent - 1.0).max(0.0)
    }

    pub fn content_travel(&self) -> f32 {
        (self.content_extent - self.viewport_extent).max(0.0)
    }

    pub fn min_content_offset(&self) -> f32 {
        self.top_offset - self.content_travel()
    }

    pub fn fraction_from_thumb(&self) -> f32 {
        let track = self.thumb_track_max();
        if track <= 0.0 {
            return 0.0;
        }
        (self.thumb_offset / track).clamp(0.0, 1.0)
    }

    pub fn fraction_from_content(&self) -> f32 {
        let travel = self.content_travel();
        if travel <= 0.0 {
            return 0.0;
        }
        ((self.top_offset - self.content_offset) / travel).clamp(0.0, 1.0)
    }

    // Content position is authoritative: the thumb track can collapse while the
    // content still has travel left.
    pub fn fraction(&self) -> f32 {
        self.fraction_from_content()
    }

    fn apply_fraction(&mut self, fraction: f32) {
        let travel = self.content_travel();
        let fraction = if travel > 0.0 && fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.thumb_offset = fraction * self.thumb_track_max();
        self.content_offset = self.top_offset - fraction * travel;
    }

    fn clamp_content(&self, offset: f32) -> f32 {
        offset.clamp(self.min_content_offset(), self.top_offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Thumb { pointer: f32, thumb: f32 },
    Content { pointer: f32, content: f32 },
}

#[derive(Debug, Clone)]
pub struct ScrollEngine {
    state: ScrollState,
    device: DeviceClass,
    pointer_over: bool,
    leave_pending: bool,
    drag: Option<Drag>,
}

impl ScrollEngine {
    pub fn new(geometry: ScrollGeometry, device: DeviceClass) -> Self {
        Self {
            state: ScrollState::at_top(geometry, 0.0),
            device,
            pointer_over: false,
            leave_pending: false,
            drag: None,
        }
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    pub fn fraction(&self) -> f32 {
        self.state.fraction()
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn is_thumb_held(&self) -> bool {
        matches!(self.drag, Some(Drag::Thumb { .. }))
    }

    pub fn is_content_held(&self) -> bool {
        matches!(self.drag, Some(Drag::Content { .. }))
    }

    pub fn is_pointer_over(&self) -> bool {
        self.pointer_over
    }

    pub fn reset(&mut self, content_extent: f32) {
        let geometry = self.geometry();
        self.state = ScrollState::at_top(geometry, content_extent);
        self.release();
    }

    pub fn reset_to_top(&mut self) {
        self.state.apply_fraction(0.0);
        self.release();
    }

    pub fn set_content_extent(&mut self, content_extent: f32) {
        let fraction = self.state.fraction();
        self.state.content_extent = content_extent.max(0.0);
        self.state.apply_fraction(fraction);
        self.rebase_drag();
    }

    pub fn set_geometry(&mut self, geometry: ScrollGeometry) {
        let fraction = self.state.fraction();
        self.state.top_offset = geometry.top_offset;
        self.state.viewport_extent = geometry.viewport_extent;
        self.state.thumb_extent = geometry.thumb_extent;
        self.state.apply_fraction(fraction);
        self.rebase_drag();
    }

    pub fn scroll_to_fraction(&mut self, fraction: f32) -> bool {
        let before = self.state;
        self.state.apply_fraction(fraction);
        before != self.state
    }

    pub fn pointer_enter(&mut self) {
        self.pointer_over = true;
        self.leave_pending = false;
    }

    // Leaving the viewport ends a content drag. A held thumb keeps tracking
    // and the leave takes effect on release.
    pub fn pointer_leave(&mut self) {
        if self.is_thumb_held() {
            self.leave_pending = true;
            return;
        }
        self.pointer_over = false;
        self.drag = None;
    }

    pub fn press_thumb(&mut self, pointer_y: f32) -> bool {
        if self.device.is_touch() {
            return false;
        }
        self.pointer_over = true;
        self.drag = Some(Drag::Thumb {
            pointer: pointer_y,
            thumb: self.state.thumb_offset,
        });
        true
    }

    pub fn press_content(&mut self, pointer_y: f32) -> bool {
        self.pointer_over = true;
        if !self.device.is_touch() || self.is_thumb_held() {
            return false;
        }
        self.drag = Some(Drag::Content {
            pointer: pointer_y,
            content: self.state.content_offset,
        });
        true
    }

    pub fn pointer_move(&mut self, pointer_y: f32) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let before = self.state;
        match drag {
            Drag::Thumb { pointer, thumb } => {
                let track = self.state.thumb_track_max();
                let position = (thumb + (pointer_y - pointer)).clamp(0.0, track);
                let fraction = if track > 0.0 { position / track } else { 0.0 };
                self.state.apply_fraction(fraction);
            }
            Drag::Content { pointer, content } => {
                let position = self.state.clamp_content(content + (pointer_y - pointer));
                self.set_content_offset(position);
            }
        }
        before != self.state
    }

    pub fn release(&mut self) {
        self.drag = None;
        if std::mem::take(&mut self.leave_pending) {
            self.pointer_over = false;
        }
    }

    pub fn wheel(&mut self, delta_y: f32) -> bool {
        if !self.pointer_over || self.drag.is_some() {
            return false;
        }
        self.nudge(delta_y)
    }

    pub fn nudge(&mut self, delta_y: f32) -> bool {
        if !delta_y.is_finite() {
            return false;
        }
        let before = self.state;
        let position = self.state.clamp_content(self.state.content_offset - delta_y);
        self.set_content_offset(position);
        before != self.state
    }

    fn set_content_offset(&mut self, offset: f32) {
        let travel = self.state.content_travel();
        let fraction = if travel > 0.0 {
            (self.state.top_offset - offset) / travel
        } else {
            0.0
        };
        self.state.apply_fraction(fraction);
    }

    fn geometry(&self) -> ScrollGeometry {
        ScrollGeometry {
            top_offset: self.state.top_offset,
            viewport_extent: self.state.viewport_extent,
            thumb_extent: self.state.thumb_extent,
        }
    }

    // Re-anchor an active drag so the next move continues from the current offsets.
    fn rebase_drag(&mut self) {
        self.drag = match self.drag {
            Some(Drag::Thumb { pointer, thumb }) => {
                let moved = self.state.thumb_offset - thumb;
                Some(Drag::Thumb {
                    pointer: pointer + moved,
                    thumb: self.state.thumb_offset,
                })
            }
            Some(Drag::Content { pointer, content }) => {
                let moved = self.state.content_offset - content;
                Some(Drag::Content {
                    pointer: pointer + moved,
                    content: self.state.content_offset,
                })
            }
            None => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOP: f32 = -787.0;

    fn geometry() -> ScrollGeometry {
        ScrollGeometry {
            top_offset: TOP,
            viewport_extent: 792.0,
            thumb_extent: 200.0,
        }
    }

    fn engine(device: DeviceClass, content: f32) -> ScrollEngine {
        let mut engine = ScrollEngine::new(geometry(), device);
        engine.reset(content);
        engine
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-3, "{a} != {b}");
    }

    fn assert_consistent(engine: &ScrollEngine) {
        let state = engine.state();
        assert_close(state.fraction_from_thumb(), state.fraction_from_content());
        assert!(state.thumb_offset >= 0.0 && state.thumb_offset <= state.thumb_track_max());
        assert!(state.content_offset <= state.top_offset);
        assert!(state.content_offset >= state.min_content_offset());
    }

    #[test]
    fn thumb_released_outside_viewport_disables_wheel() {
        let mut engine = engine(DeviceClass::Pointer, 2000.0);
        engine.pointer_enter();
        assert!(engine.press_thumb(0.0));
        engine.pointer_leave();
        assert!(engine.is_pointer_over());
        assert!(engine.pointer_move(50.0));
        engine.release();

        let before = engine.state().content_offset;
        assert!(!engine.is_pointer_over());
        assert!(!engine.wheel(100.0));
        assert_eq!(engine.state().content_offset, before);

        engine.pointer_enter();
        assert!(engine.press_thumb(0.0));
        engine.pointer_leave();
        engine.pointer_enter();
        engine.release();
        assert!(engine.is_pointer_over());
        assert!(engine.wheel(100.0));
    }

    #[test]
    fn derived_extents() {
        let engine = engine(DeviceClass::Pointer, 2000.0);
        let state = engine.state();
        assert_close(state.thumb_track_max(), 591.0);
        assert_close(state.content_travel(), 1208.0);
        assert_close(state.content_offset, TOP);
        assert_close(state.thumb_offset, 0.0);
    }

    #[test]
    fn thumb_drag_drives_content() {
        let mut engine = engine(DeviceClass::Pointer, 2000.0);
        engine.pointer_enter();
        assert!(engine.press_thumb(100.0));

        assert!(engine.pointer_move(100.0 + 591.0 / 2.0));
        assert_close(engine.fraction(), 0.5);
        assert_close(engine.state().content_offset, TOP - 604.0);
        assert_consistent(&engine);

        engine.pointer_move(5000.0);
        assert_close(engine.state().thumb_offset, 591.0);
        assert_close(engine.state().content_offset, TOP - 1208.0);

        engine.pointer_move(-5000.0);
        assert_close(engine.state().thumb_offset, 0.0);
        assert_close(engine.state().content_offset, TOP);
        engine.release();
        assert!(!engine.pointer_move(300.0));
    }

    #[test]
    fn content_drag_drives_thumb_on_touch() {
        let mut engine = engine(DeviceClass::Touch, 2000.0);
        assert!(!engine.press_thumb(0.0));
        assert!(engine.press_content(500.0));

        // Dragging upwards pulls the content up, i.e. scrolls towards the bottom.
        engine.pointer_move(500.0 - 302.0);
        assert_close(engine.fraction(), 0.25);
        assert_close(engine.state().thumb_offset, 591.0 * 0.25);
        assert_consistent(&engine);

        engine.pointer_move(2000.0);
        assert_close(engine.fraction(), 0.0);
        assert_close(engine.state().content_offset, TOP);
    }

    #[test]
    fn pointer_devices_do_not_drag_content() {
        let mut engine = engine(DeviceClass::Pointer, 2000.0);
        assert!(!engine.press_content(500.0));
        assert!(!engine.pointer_move(100.0));
        assert_close(engine.fraction(), 0.0);
    }

    #[test]
    fn wheel_requires_hover_and_clamps() {
        let mut engine = engine(DeviceClass::Pointer, 2000.0);
        assert!(!engine.wheel(100.0));

        engine.pointer_enter();
        assert!(engine.wheel(100.0));
        assert_close(engine.state().content_offset, TOP - 100.0);
        assert_consistent(&engine);

        for _ in 0..40 {
            engine.wheel(100.0);
        }
        assert_close(engine.state().content_offset, TOP - 1208.0);
        assert_close(engine.fraction(), 1.0);
        assert_close(engine.state().thumb_offset, 591.0);

        engine.pointer_leave();
        assert!(!engine.wheel(-100.0));
    }

    #[test]
    fn wheel_is_ignored_while_thumb_held() {
        let mut engine = engine(DeviceClass::Pointer, 2000.0);
        engine.pointer_enter();
        engine.press_thumb(0.0);
        assert!(!engine.wheel(100.0));
        assert_close(engine.fraction(), 0.0);
    }

    #[test]
    fn held_thumb_survives_pointer_leave() {
        let mut engine = engine(DeviceClass::Pointer, 2000.0);
        engine.press_thumb(0.0);
        engine.pointer_leave();
        assert!(engine.is_thumb_held());
        assert!(engine.pointer_move(100.0));
    }

    #[test]
    fn channels_agree_on_fraction_for_mixed_sequences() {
        let mut engine = engine(DeviceClass::Pointer, 3100.0);
        engine.pointer_enter();
        let steps: [(u8, f32); 8] = [
            (0, 37.0),
            (1, 120.0),
            (0, -250.0),
            (1, -12.5),
            (0, 410.0),
            (1, 333.0),
            (0, 90.0),
            (1, -700.0),
        ];
        for (channel, amount) in steps {
            if channel == 0 {
                let start = engine.state().thumb_offset;
                engine.press_thumb(start);
                engine.pointer_move(start + amount);
                engine.release();
            } else {
                engine.wheel(amount);
            }
            assert_consistent(&engine);
            let state = engine.state();
            assert_close(state.thumb_offset, state.fraction_from_content() * state.thumb_track_max());
        }
    }

    #[test]
    fn short_content_never_moves() {
        for device in [DeviceClass::Pointer, DeviceClass::Touch] {
            let mut engine = engine(device, 400.0);
            engine.pointer_enter();
            engine.wheel(250.0);
            engine.press_thumb(10.0);
            engine.pointer_move(400.0);
            engine.release();
            engine.press_content(10.0);
            engine.pointer_move(-400.0);
            engine.release();
            engine.nudge(-90.0);

            let state = engine.state();
            assert_eq!(state.content_offset, TOP);
            assert_eq!(state.thumb_offset, 0.0);
            assert_eq!(engine.fraction(), 0.0);
            assert!(state.content_offset.is_finite());
        }
    }

    #[test]
    fn collapsed_track_guards_division() {
        let mut engine = ScrollEngine::new(
            ScrollGeometry {
                top_offset: 0.0,
                viewport_extent: 150.0,
                thumb_extent: 200.0,
            },
            DeviceClass::Pointer,
        );
        engine.reset(1000.0);
        engine.press_thumb(0.0);
        engine.pointer_move(80.0);
        assert_eq!(engine.state().thumb_offset, 0.0);
        assert_eq!(engine.state().content_offset, 0.0);
        engine.release();

        engine.pointer_enter();
        engine.wheel(100.0);
        assert_eq!(engine.state().thumb_offset, 0.0);
        assert_close(engine.state().content_offset, -100.0);
    }

    #[test]
    fn growing_content_keeps_fraction() {
        let mut engine = engine(DeviceClass::Pointer, 2000.0);
        engine.scroll_to_fraction(0.5);
        engine.set_content_extent(3000.0);
        assert_close(engine.fraction(), 0.5);
        assert_consistent(&engine);

        engine.set_content_extent(100.0);
        assert_eq!(engine.fraction(), 0.0);
        assert_close(engine.state().content_offset, TOP);
    }

    #[test]
    fn reset_returns_to_top_and_drops_drag() {
        let mut engine = engine(DeviceClass::Pointer, 2000.0);
        engine.press_thumb(0.0);
        engine.pointer_move(200.0);
        engine.reset(1500.0);
        assert!(!engine.is_thumb_held());
        assert_eq!(engine.fraction(), 0.0);
        assert_eq!(engine.state().thumb_offset, 0.0);
        assert_eq!(engine.state().content_offset, TOP);
    }
}
