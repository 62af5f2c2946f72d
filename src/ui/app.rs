use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{info, warn};

use footprint::config::Settings;
use footprint::context::{History, UiSnapshot};
use footprint::dispatch::{Dispatcher, KeyDown, Outcome};
use footprint::dom::{Document, Element, ElementId, MemoryDocument, LIVE_REGION_ID};
use footprint::keybindings::Keybindings;
use footprint::routes::{self, SELECTED_COMPANY_KEY};
use footprint::session::{ListenerFlag, ShortcutSession};
use footprint::store::{FileSelectionStore, MemorySelectionStore, SelectionStore};
use footprint::Result;

/// Company id written by the "select company" host key.
const DEMO_COMPANY_ID: &str = "42";

/// Persisted selections: on disk when the config dir is usable, otherwise in memory.
pub enum Selection {
    File(FileSelectionStore),
    Memory(MemorySelectionStore),
}

impl Selection {
    pub fn open() -> Self {
        match FileSelectionStore::open_default() {
            Ok(store) => Selection::File(store),
            Err(e) => {
                warn!(error = %e, "selection store unavailable, keeping selections in memory");
                Selection::Memory(MemorySelectionStore::new())
            }
        }
    }

    /// Select the demo company, or clear the selection if one is set.
    pub fn toggle_company(&mut self) -> Result<()> {
        let selected = self.get(SELECTED_COMPANY_KEY).is_some();
        match self {
            Selection::File(store) if selected => store.remove(SELECTED_COMPANY_KEY).map(|_| ()),
            Selection::File(store) => store.set(SELECTED_COMPANY_KEY, DEMO_COMPANY_ID),
            Selection::Memory(store) if selected => {
                store.remove(SELECTED_COMPANY_KEY);
                Ok(())
            }
            Selection::Memory(store) => {
                store.set(SELECTED_COMPANY_KEY, DEMO_COMPANY_ID);
                Ok(())
            }
        }
    }
}

impl SelectionStore for Selection {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            Selection::File(store) => store.get(key),
            Selection::Memory(store) => store.get(key),
        }
    }
}

/// Browsers report Shift for shifted symbols and capitals; terminals often
/// do not. Restore it for a US layout so bindings like `shift+?` match.
pub fn browser_modifiers(code: KeyCode, modifiers: KeyModifiers) -> KeyModifiers {
    const SHIFTED: &str = "~!@#$%^&*()_+{}|:\"<>?";
    match code {
        KeyCode::Char(c) if c.is_ascii_uppercase() || SHIFTED.contains(c) => {
            modifiers | KeyModifiers::SHIFT
        }
        _ => modifiers,
    }
}

pub fn page_title(route: &str) -> &'static str {
    if route.starts_with(routes::NEW_PRODUCT) {
        "New product"
    } else if route.starts_with(routes::PRODUCT_LIST) {
        "Products"
    } else if route.starts_with(routes::NEW_COMPANY) {
        "New company"
    } else if route.starts_with(routes::LIST_COMPANIES) {
        "Companies"
    } else if route.starts_with(routes::DASHBOARD) {
        "Dashboard"
    } else if route.starts_with("/accessibility") {
        "Accessibility"
    } else {
        "Page"
    }
}

/// The terminal page: an in-memory document driven by the shortcut session.
pub struct App {
    pub doc: MemoryDocument,
    pub history: History,
    pub session: ShortcutSession<ListenerFlag>,
    pub selection: Selection,
    pub authenticated: bool,
    pub tour_active: bool,
    pub last_outcome: Option<Outcome>,
    pub search: ElementId,
    pub live_region: ElementId,
    pub menu_toggle: ElementId,
    pixels_per_column: u32,
    fixed_width: Option<u32>,
    dialogs_opened: usize,
}

impl App {
    pub fn new(settings: &Settings, route: &str, columns: u16, fixed_width: Option<u32>, selection: Selection) -> Self {
        let mut doc = MemoryDocument::new();
        let main = doc.append(None, Element::new("main"));
        let header = doc.append(Some(main), Element::new("header"));
        let menu_toggle = doc.append(Some(header), Element::button("Account menu").expanded(false));
        let search = doc.append(Some(main), Element::text_input("Search companies and products"));
        let live_region = doc.append(None, Element::new("div").dom_id(LIVE_REGION_ID).role("status"));

        let pixels_per_column = settings.pixels_per_column.max(1);
        let width = fixed_width.unwrap_or(columns as u32 * pixels_per_column);
        let dispatcher = Dispatcher::new(Keybindings::from_config(&settings.keybindings));
        let session = ShortcutSession::mount(ListenerFlag::default(), dispatcher, width, route);

        Self {
            doc,
            history: History::new(route),
            session,
            selection,
            authenticated: true,
            tour_active: false,
            last_outcome: None,
            search,
            live_region,
            menu_toggle,
            pixels_per_column,
            fixed_width,
            dialogs_opened: 0,
        }
    }

    pub fn viewport_width(&self, columns: u16) -> u32 {
        self.fixed_width.unwrap_or(columns as u32 * self.pixels_per_column)
    }

    pub fn on_resize(&mut self, columns: u16) {
        let width = self.viewport_width(columns);
        self.session.resize(width);
    }

    pub fn route(&self) -> &str {
        self.history.current()
    }

    pub fn announcement(&self) -> &str {
        self.doc.text(self.live_region)
    }

    pub fn search_value(&self) -> &str {
        self.doc.text(self.search)
    }

    pub fn company_selected(&self) -> bool {
        self.selection.get(SELECTED_COMPANY_KEY).is_some()
    }

    pub fn menu_expanded(&self) -> bool {
        self.doc.get(self.menu_toggle).and_then(|el| el.aria_expanded) == Some(true)
    }

    /// Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::F(2) => self.open_dialog(),
            KeyCode::F(3) => {
                self.doc.activate(self.menu_toggle);
            }
            KeyCode::F(4) => {
                self.tour_active = !self.tour_active;
                info!(tour_active = self.tour_active, "tour toggled");
            }
            KeyCode::F(5) => self.authenticated = !self.authenticated,
            KeyCode::F(6) => {
                if let Err(e) = self.selection.toggle_company() {
                    warn!(error = %e, "failed to update company selection");
                }
            }
            KeyCode::F(7) => {
                if self.history.back().is_some() {
                    let route = self.history.current().to_string();
                    self.session.set_route(&route);
                }
            }
            KeyCode::Tab => self.cycle_focus(),
            code => self.key_down(code, key.modifiers),
        }
        false
    }

    /// Deliver a key to the page: shortcut listener first, then the
    /// focused element's default behavior.
    fn key_down(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let modifiers = browser_modifiers(code, modifiers);
        let target = self
            .doc
            .focused_element()
            .cloned()
            .unwrap_or_else(|| Element::new("body"));
        let ui = UiSnapshot {
            authenticated: self.authenticated,
            tour_active: self.tour_active,
            selection: &self.selection,
        };
        let event = KeyDown::new(code, modifiers, Some(&target));
        let outcome = self.session.handle_key(&event, ui, &mut self.doc, &mut self.history);
        self.last_outcome = Some(outcome);

        if !outcome.prevents_default() {
            self.default_action(code, modifiers);
        }
    }

    fn default_action(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if code == KeyCode::Esc && self.tour_active {
            self.tour_active = false;
            info!("tour closed");
            return;
        }
        let Some(focused) = self.doc.focused() else {
            return;
        };
        if focused == self.search {
            match code {
                KeyCode::Char(c) if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                    self.edit_search(|value| value.push(c));
                }
                KeyCode::Backspace => self.edit_search(|value| {
                    value.pop();
                }),
                _ => {}
            }
        } else if code == KeyCode::Enter && self.doc.get(focused).is_some_and(Element::is_button) {
            self.doc.activate(focused);
        }
    }

    fn edit_search(&mut self, edit: impl FnOnce(&mut String)) {
        let mut value = if self.doc.has_selection(self.search) {
            String::new()
        } else {
            self.doc.text(self.search).to_string()
        };
        edit(&mut value);
        self.doc.set_text_content(self.search, &value);
        self.doc.set_focus(Some(self.search));
    }

    pub fn open_dialog(&mut self) {
        self.dialogs_opened += 1;
        let title = format!("Energy record #{}", self.dialogs_opened);
        let dialog = self.doc.append(None, Element::modal_dialog().label(&title));
        self.doc.append(Some(dialog), Element::button("Save record"));
        self.doc.append(Some(dialog), Element::button("Close dialog"));
    }

    /// Move focus to the next button or input, wrapping through the page body.
    pub fn cycle_focus(&mut self) {
        let focusable: Vec<ElementId> = self
            .doc
            .elements()
            .into_iter()
            .filter(|&id| {
                self.doc
                    .get(id)
                    .is_some_and(|el| el.is_button() || el.tag == "input")
            })
            .collect();
        let next = match self.doc.focused().and_then(|f| focusable.iter().position(|&id| id == f)) {
            Some(i) => focusable.get(i + 1).copied(),
            None => focusable.first().copied(),
        };
        self.doc.set_focus(next);
    }

    /// Short description of the focused element for the status line.
    pub fn focus_label(&self) -> String {
        match self.doc.focused_element() {
            None => "page".to_string(),
            Some(el) => match (&el.aria_label, &el.placeholder) {
                (Some(label), _) => format!("{} \"{}\"", el.tag, label),
                (None, Some(placeholder)) => format!("{} \"{}\"", el.tag, placeholder),
                (None, None) => el.tag.clone(),
            },
        }
    }
}
