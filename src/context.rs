//! Collaborators the dispatcher reads from or drives, supplied by the host.

use tracing::info;

use crate::store::SelectionStore;

/// Route changes requested by shortcut handlers.
pub trait Navigator {
    fn push(&mut self, route: &str);
}

/// Snapshot of host UI state taken when a key event arrives.
pub struct PageContext<'a> {
    pub route: &'a str,
    pub authenticated: bool,
    /// Set while a guided tour overlay owns the keyboard.
    pub tour_active: bool,
    pub selection: &'a dyn SelectionStore,
}

/// Host UI state without the route, for callers that track the route
/// themselves.
#[derive(Clone, Copy)]
pub struct UiSnapshot<'a> {
    pub authenticated: bool,
    pub tour_active: bool,
    pub selection: &'a dyn SelectionStore,
}

impl<'a> UiSnapshot<'a> {
    pub fn on_route<'b>(self, route: &'b str) -> PageContext<'b>
    where
        'a: 'b,
    {
        PageContext {
            route,
            authenticated: self.authenticated,
            tour_active: self.tour_active,
            selection: self.selection,
        }
    }
}

/// A navigation stack that remembers every pushed route.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![initial.to_string()],
        }
    }

    pub fn current(&self) -> &str {
        self.entries.last().map(String::as_str).unwrap_or("/")
    }

    /// Go back one entry. The initial route is never popped.
    pub fn back(&mut self) -> Option<String> {
        if self.entries.len() > 1 {
            self.entries.pop()
        } else {
            None
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Navigator for History {
    fn push(&mut self, route: &str) {
        info!(from = self.current(), to = route, "navigate");
        self.entries.push(route.to_string());
    }
}
