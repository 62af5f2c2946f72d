use crossterm::event::{KeyCode, KeyModifiers};
use tracing::debug;

use crate::actions;
use crate::context::{Navigator, PageContext};
use crate::dom::{Document, Element};
use crate::guard::is_input_field;
use crate::keybindings::{GuardPolicy, Keybindings, ShortcutAction};

/// A key-down event and the element it was aimed at.
#[derive(Debug, Clone, Copy)]
pub struct KeyDown<'a> {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    /// `None` when the event target is not an element.
    pub target: Option<&'a Element>,
}

impl<'a> KeyDown<'a> {
    pub fn new(code: KeyCode, modifiers: KeyModifiers, target: Option<&'a Element>) -> Self {
        Self { code, modifiers, target }
    }
}

/// What the dispatcher did with a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Shortcuts are off (narrow viewport); the event was not looked at.
    Disabled,
    /// A guided tour is running and owns Escape.
    TourActive,
    /// The user is typing; the key belongs to the field.
    InInputField,
    Unbound,
    Handled(ShortcutAction),
}

impl Outcome {
    /// Whether the host should suppress the key's default behavior.
    ///
    /// Escape is never swallowed so overlays with their own handlers still see it.
    pub fn prevents_default(self) -> bool {
        matches!(self, Outcome::Handled(action) if action != ShortcutAction::EscapeCascade)
    }
}

/// Routes key events through the command table.
pub struct Dispatcher {
    keybindings: Keybindings,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Keybindings::default())
    }
}

impl Dispatcher {
    pub fn new(keybindings: Keybindings) -> Self {
        Self { keybindings }
    }

    pub fn keybindings(&self) -> &Keybindings {
        &self.keybindings
    }

    /// Handle one key-down.
    ///
    /// Escape is checked first and ignores the input guard. Every other
    /// binding is dropped while a text field has focus.
    pub fn dispatch<D, N>(
        &self,
        event: &KeyDown<'_>,
        ctx: &PageContext<'_>,
        doc: &mut D,
        nav: &mut N,
    ) -> Outcome
    where
        D: Document + ?Sized,
        N: Navigator + ?Sized,
    {
        let action = self.keybindings.action(event.code, event.modifiers);

        if let Some(ShortcutAction::EscapeCascade) = action {
            if ctx.tour_active {
                debug!("escape left to the tour");
                return Outcome::TourActive;
            }
            actions::escape_cascade(doc);
            return Outcome::Handled(ShortcutAction::EscapeCascade);
        }

        if is_input_field(event.target) {
            return Outcome::InInputField;
        }

        let Some(action) = action else {
            return Outcome::Unbound;
        };
        debug_assert_eq!(action.guard_policy(), GuardPolicy::BlockedInInput);
        debug!(?action, code = ?event.code, "shortcut");

        match action {
            ShortcutAction::FocusSearch => {
                actions::focus_search(doc);
            }
            ShortcutAction::ShowHelp => actions::show_help(doc, nav),
            ShortcutAction::CreateNew => {
                actions::create_new(ctx, doc, nav);
            }
            ShortcutAction::EscapeCascade => {}
        }
        Outcome::Handled(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::History;
    use crate::dom::{MemoryDocument, OverlayQuery, LIVE_REGION_ID};
    use crate::routes::SELECTED_COMPANY_KEY;
    use crate::store::MemorySelectionStore;

    struct Page {
        doc: MemoryDocument,
        nav: History,
        store: MemorySelectionStore,
        live: usize,
        authenticated: bool,
        tour_active: bool,
    }

    impl Page {
        fn new(route: &str) -> Self {
            let mut doc = MemoryDocument::new();
            let live = doc.append(None, Element::new("div").dom_id(LIVE_REGION_ID));
            Self {
                doc,
                nav: History::new(route),
                store: MemorySelectionStore::new(),
                live,
                authenticated: true,
                tour_active: false,
            }
        }

        fn press(&mut self, code: KeyCode, modifiers: KeyModifiers, target: Option<&Element>) -> Outcome {
            let route = self.nav.current().to_string();
            let ctx = PageContext {
                route: &route,
                authenticated: self.authenticated,
                tour_active: self.tour_active,
                selection: &self.store,
            };
            let event = KeyDown::new(code, modifiers, target);
            Dispatcher::default().dispatch(&event, &ctx, &mut self.doc, &mut self.nav)
        }

        fn announcement(&self) -> &str {
            self.doc.text(self.live)
        }
    }

    fn body() -> Element {
        Element::new("body")
    }

    #[test]
    fn test_create_on_product_page() {
        let mut page = Page::new("/product-list/123");
        let outcome = page.press(KeyCode::Char('n'), KeyModifiers::NONE, Some(&body()));
        assert_eq!(outcome, Outcome::Handled(ShortcutAction::CreateNew));
        assert!(outcome.prevents_default());
        assert_eq!(page.nav.current(), "/product-list/product");
        assert_eq!(page.announcement(), "Creating new product");
    }

    #[test]
    fn test_create_on_dashboard() {
        let mut page = Page::new("/dashboard");
        page.press(KeyCode::Char('N'), KeyModifiers::SHIFT, Some(&body()));
        assert_eq!(page.nav.current(), "/create-company");
        assert_eq!(page.announcement(), "Creating new company");
    }

    #[test]
    fn test_create_elsewhere_with_selected_company() {
        let mut page = Page::new("/other");
        page.store.set(SELECTED_COMPANY_KEY, "42");
        page.press(KeyCode::Char('n'), KeyModifiers::NONE, None);
        assert_eq!(page.nav.current(), "/product-list/product");
    }

    #[test]
    fn test_create_suppressed_in_input() {
        let mut page = Page::new("/dashboard");
        let input = Element::new("input");
        let outcome = page.press(KeyCode::Char('n'), KeyModifiers::NONE, Some(&input));
        assert_eq!(outcome, Outcome::InInputField);
        assert!(!outcome.prevents_default());
        assert_eq!(page.nav.entries().len(), 1);
    }

    #[test]
    fn test_create_suppressed_in_content_editable() {
        let mut page = Page::new("/dashboard");
        let editor = Element::new("div").editable(true);
        assert_eq!(page.press(KeyCode::Char('n'), KeyModifiers::NONE, Some(&editor)), Outcome::InInputField);
    }

    #[test]
    fn test_create_signed_out_is_handled_without_navigation() {
        let mut page = Page::new("/dashboard");
        page.authenticated = false;
        let outcome = page.press(KeyCode::Char('n'), KeyModifiers::NONE, Some(&body()));
        assert_eq!(outcome, Outcome::Handled(ShortcutAction::CreateNew));
        assert_eq!(page.nav.entries().len(), 1);
        assert_eq!(page.announcement(), "");
    }

    #[test]
    fn test_question_mark_without_shift_is_noop() {
        let mut page = Page::new("/dashboard");
        let outcome = page.press(KeyCode::Char('?'), KeyModifiers::NONE, Some(&body()));
        assert_eq!(outcome, Outcome::Unbound);
        assert!(!outcome.prevents_default());
        assert_eq!(page.nav.entries().len(), 1);
        assert_eq!(page.announcement(), "");
    }

    #[test]
    fn test_shift_question_mark_opens_help() {
        let mut page = Page::new("/dashboard");
        let outcome = page.press(KeyCode::Char('?'), KeyModifiers::SHIFT, Some(&body()));
        assert_eq!(outcome, Outcome::Handled(ShortcutAction::ShowHelp));
        assert_eq!(page.nav.current(), "/accessibility#keyboard-shortcuts");
        assert_eq!(page.announcement(), "Navigating to keyboard shortcuts help");
    }

    #[test]
    fn test_slash_focuses_search() {
        let mut page = Page::new("/list-companies");
        let search = page.doc.append(None, Element::text_input("Search companies"));
        let outcome = page.press(KeyCode::Char('/'), KeyModifiers::NONE, Some(&body()));
        assert!(outcome.prevents_default());
        assert_eq!(page.doc.focused(), Some(search));
        assert_eq!(page.announcement(), "Search field focused");
    }

    #[test]
    fn test_slash_typed_into_search_is_left_alone() {
        let mut page = Page::new("/list-companies");
        let search = page.doc.append(None, Element::text_input("Search companies"));
        page.doc.set_focus(Some(search));
        let target = page.doc.focused_element().cloned();
        let outcome = page.press(KeyCode::Char('/'), KeyModifiers::NONE, target.as_ref());
        assert_eq!(outcome, Outcome::InInputField);
        assert_eq!(page.announcement(), "");
    }

    #[test]
    fn test_escape_runs_cascade_from_input() {
        let mut page = Page::new("/dashboard");
        for _ in 0..2 {
            let dialog = page.doc.append(None, Element::modal_dialog());
            page.doc.append(Some(dialog), Element::button("Close"));
        }
        page.doc.append(None, Element::button("Menu").expanded(true));

        let input = Element::new("textarea");
        let outcome = page.press(KeyCode::Esc, KeyModifiers::NONE, Some(&input));
        assert_eq!(outcome, Outcome::Handled(ShortcutAction::EscapeCascade));
        assert!(!outcome.prevents_default());
        assert_eq!(page.doc.activations().len(), 3);
    }

    #[test]
    fn test_escape_with_modifier_runs_cascade() {
        for modifiers in [KeyModifiers::SHIFT, KeyModifiers::CONTROL, KeyModifiers::ALT] {
            let mut page = Page::new("/dashboard");
            let dialog = page.doc.append(None, Element::modal_dialog());
            page.doc.append(Some(dialog), Element::button("Close"));

            let input = Element::text_input("Search");
            let outcome = page.press(KeyCode::Esc, modifiers, Some(&input));
            assert_eq!(outcome, Outcome::Handled(ShortcutAction::EscapeCascade));
            assert_eq!(page.doc.activations().len(), 1);
            assert!(page.doc.open_dialogs().is_empty());
        }
    }

    #[test]
    fn test_create_with_alt_held() {
        let mut page = Page::new("/dashboard");
        let outcome = page.press(KeyCode::Char('n'), KeyModifiers::ALT, Some(&body()));
        assert_eq!(outcome, Outcome::Handled(ShortcutAction::CreateNew));
        assert_eq!(page.nav.current(), "/create-company");
    }

    #[test]
    fn test_ctrl_shift_question_mark_opens_help() {
        let mut page = Page::new("/dashboard");
        page.press(KeyCode::Char('?'), KeyModifiers::CONTROL | KeyModifiers::SHIFT, Some(&body()));
        assert_eq!(page.nav.current(), "/accessibility#keyboard-shortcuts");
    }

    #[test]
    fn test_escape_suppressed_during_tour() {
        let mut page = Page::new("/dashboard");
        let dialog = page.doc.append(None, Element::modal_dialog());
        page.doc.append(Some(dialog), Element::button("Close"));
        page.tour_active = true;

        let outcome = page.press(KeyCode::Esc, KeyModifiers::NONE, Some(&body()));
        assert_eq!(outcome, Outcome::TourActive);
        assert!(page.doc.activations().is_empty());
        assert_eq!(page.doc.open_dialogs().len(), 1);
    }

    #[test]
    fn test_tour_does_not_block_other_shortcuts() {
        let mut page = Page::new("/dashboard");
        page.tour_active = true;
        page.press(KeyCode::Char('n'), KeyModifiers::NONE, Some(&body()));
        assert_eq!(page.nav.current(), "/create-company");
    }

    #[test]
    fn test_unbound_key() {
        let mut page = Page::new("/dashboard");
        assert_eq!(page.press(KeyCode::Char('x'), KeyModifiers::NONE, Some(&body())), Outcome::Unbound);
    }
}
