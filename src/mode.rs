use tracing::info;

/// Narrowest viewport, in logical pixels, that counts as desktop.
pub const DESKTOP_BREAKPOINT: u32 = 768;

pub fn shortcuts_enabled_for(width: u32) -> bool {
    width >= DESKTOP_BREAKPOINT
}

/// Change in listener state caused by a viewport change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Attach,
    Detach,
}

/// Tracks whether the viewport is wide enough for keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDetector {
    enabled: bool,
    width: u32,
}

impl ModeDetector {
    /// Initial mount. Returns the detector and, when wide enough, the
    /// attach that mounting implies.
    pub fn mount(width: u32) -> (Self, Option<Transition>) {
        let enabled = shortcuts_enabled_for(width);
        let detector = Self { enabled, width };
        (detector, enabled.then_some(Transition::Attach))
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Feed a resize. Yields a transition only when `enabled` flips.
    pub fn resize(&mut self, width: u32) -> Option<Transition> {
        self.width = width;
        let enabled = shortcuts_enabled_for(width);
        if enabled == self.enabled {
            return None;
        }
        self.enabled = enabled;
        info!(width, enabled, "keyboard shortcut mode changed");
        Some(if enabled { Transition::Attach } else { Transition::Detach })
    }
}
