use serde::{Deserialize, Serialize};

use crate::document::ENTRY_SLOTS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarqueeConfig {
    pub rate: f32,
    pub threshold: f32,
    pub margin: f32,
    pub hold: f32,
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            rate: 0.33,
            threshold: 15.0,
            margin: 15.0,
            hold: 55.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarqueeState {
    pub progress: f32,
    pub offset: f32,
}

impl MarqueeState {
    fn resting(margin: f32) -> Self {
        Self {
            progress: 0.0,
            offset: margin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LabelExtent {
    pub label_width: f32,
    pub container_width: f32,
}

impl LabelExtent {
    pub fn overflows(&self) -> bool {
        self.label_width > self.container_width
    }
}

#[derive(Debug, Clone)]
pub struct MarqueeAnimator {
    config: MarqueeConfig,
    lanes: [MarqueeState; ENTRY_SLOTS],
}

impl MarqueeAnimator {
    pub fn new(config: MarqueeConfig) -> Self {
        Self {
            config,
            lanes: [MarqueeState::resting(config.margin); ENTRY_SLOTS],
        }
    }

    pub fn config(&self) -> &MarqueeConfig {
        &self.config
    }

    pub fn lanes(&self) -> &[MarqueeState; ENTRY_SLOTS] {
        &self.lanes
    }

    pub fn offset(&self, lane: usize) -> f32 {
        self.lanes
            .get(lane)
            .map_or(self.config.margin, |state| state.offset)
    }

    pub fn reset(&mut self) {
        self.lanes = [MarqueeState::resting(self.config.margin); ENTRY_SLOTS];
    }

    pub fn tick(&mut self, dt: f32, extents: &[LabelExtent]) -> bool {
        if !dt.is_finite() || dt <= 0.0 {
            return false;
        }
        let config = self.config;
        let mut moved = false;
        for (lane, extent) in self.lanes.iter_mut().zip(extents) {
            let before = *lane;
            Self::advance(&config, lane, dt, extent);
            moved |= before.offset != lane.offset;
        }
        moved
    }

    fn advance(config: &MarqueeConfig, lane: &mut MarqueeState, dt: f32, extent: &LabelExtent) {
        if !extent.overflows() {
            *lane = MarqueeState::resting(config.margin);
            return;
        }
        lane.progress += config.rate * dt;

        let elapsed = lane.progress - config.threshold;
        if elapsed <= 0.0 {
            return;
        }
        let overflow = extent.container_width - extent.label_width;
        lane.offset = (overflow - config.margin).max(config.margin - elapsed);

        if elapsed > overflow.abs() + config.hold {
            *lane = MarqueeState::resting(config.margin);
        }
    }
}

impl Default for MarqueeAnimator {
    fn default() -> Self {
        Self::new(MarqueeConfig::default())
    }
}
