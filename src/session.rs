//! The mounted shortcut dispatcher: mode detection, the single key
//! listener, and dispatch with route tracking.

use serde::Serialize;
use tracing::{debug, info};

use crate::context::{Navigator, UiSnapshot};
use crate::dispatch::{Dispatcher, KeyDown, Outcome};
use crate::dom::Document;
use crate::keybindings::ShortcutAction;
use crate::mode::{ModeDetector, Transition};

/// Host side of the global key-down subscription.
pub trait KeyListenerHost {
    fn subscribe(&mut self);
    fn unsubscribe(&mut self);
}

/// A listener host that only records its state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerFlag {
    pub attached: bool,
    pub subscribes: usize,
    pub unsubscribes: usize,
}

impl KeyListenerHost for ListenerFlag {
    fn subscribe(&mut self) {
        self.attached = true;
        self.subscribes += 1;
    }

    fn unsubscribe(&mut self) {
        self.attached = false;
        self.unsubscribes += 1;
    }
}

/// Read-only status for host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShortcutStatus {
    pub shortcuts_enabled: bool,
    pub shortcut_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutState {
    pub enabled: bool,
    pub current_route: String,
}

/// Keeps `current_route` in step with navigations made by handlers.
struct RouteTracking<'n, N: ?Sized> {
    inner: &'n mut N,
    route: &'n mut String,
}

impl<N: Navigator + ?Sized> Navigator for RouteTracking<'_, N> {
    fn push(&mut self, route: &str) {
        self.inner.push(route);
        *self.route = route.to_string();
    }
}

/// A mounted dispatcher that owns its key listener.
///
/// The listener is subscribed exactly while shortcuts are enabled and is
/// released when the session is dropped.
pub struct ShortcutSession<H: KeyListenerHost> {
    host: H,
    dispatcher: Dispatcher,
    detector: ModeDetector,
    current_route: String,
}

impl<H: KeyListenerHost> ShortcutSession<H> {
    pub fn mount(mut host: H, dispatcher: Dispatcher, width: u32, route: &str) -> Self {
        let (detector, transition) = ModeDetector::mount(width);
        if transition == Some(Transition::Attach) {
            host.subscribe();
            info!(width, "keyboard shortcuts attached");
        }
        Self {
            host,
            dispatcher,
            detector,
            current_route: route.to_string(),
        }
    }

    /// Viewport resized. Returns true when the listener was attached or detached.
    pub fn resize(&mut self, width: u32) -> bool {
        match self.detector.resize(width) {
            Some(Transition::Attach) => {
                self.host.subscribe();
                true
            }
            Some(Transition::Detach) => {
                self.host.unsubscribe();
                true
            }
            None => false,
        }
    }

    /// Record a navigation the host made on its own.
    pub fn set_route(&mut self, route: &str) {
        if self.current_route != route {
            self.current_route = route.to_string();
        }
    }

    pub fn handle_key<D, N>(
        &mut self,
        event: &KeyDown<'_>,
        ui: UiSnapshot<'_>,
        doc: &mut D,
        nav: &mut N,
    ) -> Outcome
    where
        D: Document + ?Sized,
        N: Navigator + ?Sized,
    {
        if !self.detector.enabled() {
            debug!(code = ?event.code, "shortcuts disabled");
            return Outcome::Disabled;
        }
        let route = self.current_route.clone();
        let ctx = ui.on_route(&route);
        let mut tracking = RouteTracking {
            inner: nav,
            route: &mut self.current_route,
        };
        self.dispatcher.dispatch(event, &ctx, doc, &mut tracking)
    }

    pub fn state(&self) -> ShortcutState {
        ShortcutState {
            enabled: self.detector.enabled(),
            current_route: self.current_route.clone(),
        }
    }

    pub fn status(&self) -> ShortcutStatus {
        let enabled = self.detector.enabled();
        ShortcutStatus {
            shortcuts_enabled: enabled,
            shortcut_count: if enabled { ShortcutAction::ALL.len() } else { 0 },
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: KeyListenerHost> Drop for ShortcutSession<H> {
    fn drop(&mut self) {
        if self.detector.enabled() {
            self.host.unsubscribe();
            info!("keyboard shortcuts detached");
        }
    }
}
