//! Platform double driven by a per-tick script.

use std::collections::VecDeque;

use crate::coords::ViewportSize;

use super::{Platform, PlatformEvent};

#[derive(Default)]
pub(crate) struct ScriptedPlatform {
    pub size: ViewportSize,
    pub events: VecDeque<PlatformEvent>,
    pub cursor: Option<(f32, f32)>,
    pub cursor_visible: bool,
    pub warps: Vec<(f32, f32)>,
    pub title: String,
}

impl ScriptedPlatform {
    pub fn new(size: ViewportSize) -> Self {
        Self {
            size,
            cursor_visible: true,
            ..Self::default()
        }
    }

    pub fn push(&mut self, event: PlatformEvent) {
        self.events.push_back(event);
    }
}

impl Platform for ScriptedPlatform {
    fn viewport_size(&self) -> ViewportSize {
        self.size
    }

    fn poll_event(&mut self) -> Option<PlatformEvent> {
        self.events.pop_front()
    }

    fn cursor_position(&self) -> Option<(f32, f32)> {
        self.cursor
    }

    fn set_cursor_position(&mut self, x: f32, y: f32) {
        self.cursor = Some((x, y));
        self.warps.push((x, y));
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }
}
