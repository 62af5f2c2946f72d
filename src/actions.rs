//! Shortcut action handlers.
//!
//! Each handler looks the page up fresh and degrades to a no-op when the
//! element it needs is missing. None of them can fail.

use tracing::{debug, trace};

use crate::announce::{self, announce};
use crate::context::{Navigator, PageContext};
use crate::dom::{find_search_input, Document, OverlayQuery};
use crate::routes;
use crate::store::SelectionStore;

/// Where the create shortcut goes and what it says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateTarget {
    pub route: &'static str,
    pub announcement: &'static str,
}

impl CreateTarget {
    const PRODUCT: CreateTarget = CreateTarget {
        route: routes::NEW_PRODUCT,
        announcement: announce::CREATING_PRODUCT,
    };
    const COMPANY: CreateTarget = CreateTarget {
        route: routes::NEW_COMPANY,
        announcement: announce::CREATING_COMPANY,
    };
}

/// Pick the create destination for `route`.
///
/// Product pages create products, company pages and the dashboard create
/// companies. Anywhere else a product is created only if a company is
/// already selected.
pub fn resolve_create_target(route: &str, selection: &dyn SelectionStore) -> CreateTarget {
    if route.contains(routes::PRODUCT_LIST) {
        return CreateTarget::PRODUCT;
    }
    if route.contains(routes::LIST_COMPANIES) || route.contains(routes::DASHBOARD) {
        return CreateTarget::COMPANY;
    }
    let has_company = selection
        .get(routes::SELECTED_COMPANY_KEY)
        .is_some_and(|id| !id.is_empty());
    if has_company {
        CreateTarget::PRODUCT
    } else {
        CreateTarget::COMPANY
    }
}

/// Navigate to the context-appropriate create page. Signed-out users get nothing.
pub fn create_new<D, N>(ctx: &PageContext<'_>, doc: &mut D, nav: &mut N) -> Option<CreateTarget>
where
    D: Document + ?Sized,
    N: Navigator + ?Sized,
{
    if !ctx.authenticated {
        trace!("create shortcut ignored while signed out");
        return None;
    }
    let target = resolve_create_target(ctx.route, ctx.selection);
    debug!(route = ctx.route, destination = target.route, "create new");
    nav.push(target.route);
    announce(doc, target.announcement);
    Some(target)
}

/// Focus and select the page's search field. Returns false if there is none.
pub fn focus_search<D: Document + ?Sized>(doc: &mut D) -> bool {
    let Some(input) = find_search_input(doc) else {
        trace!("no search input on page");
        return false;
    };
    doc.focus_and_select(input);
    announce(doc, announce::SEARCH_FOCUSED);
    true
}

pub fn show_help<D, N>(doc: &mut D, nav: &mut N)
where
    D: Document + ?Sized,
    N: Navigator + ?Sized,
{
    nav.push(routes::SHORTCUTS_HELP);
    announce(doc, announce::HELP_OPENED);
}

/// Close every open modal dialog and collapse every expanded toggle.
///
/// Both lookups are taken before anything is clicked, so closing a dialog
/// cannot hide a toggle from the second pass. Returns the number of
/// activations issued.
pub fn escape_cascade<D: Document + ?Sized>(doc: &mut D) -> usize {
    let close_controls: Vec<_> = doc
        .open_dialogs()
        .into_iter()
        .filter_map(|dialog| doc.find_close_control(dialog))
        .collect();
    let toggles: Vec<_> = doc
        .expanded_menus()
        .into_iter()
        .filter(|&id| doc.get(id).is_some_and(|el| el.is_button()))
        .collect();

    let count = close_controls.len() + toggles.len();
    for id in close_controls.into_iter().chain(toggles) {
        doc.activate(id);
    }
    debug!(activations = count, "escape cascade");
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::History;
    use crate::dom::{Element, MemoryDocument, LIVE_REGION_ID};
    use crate::store::MemorySelectionStore;

    fn page() -> (MemoryDocument, usize) {
        let mut doc = MemoryDocument::new();
        let live = doc.append(None, Element::new("div").dom_id(LIVE_REGION_ID));
        (doc, live)
    }

    fn with_company(id: &str) -> MemorySelectionStore {
        let mut store = MemorySelectionStore::new();
        store.set(routes::SELECTED_COMPANY_KEY, id);
        store
    }

    #[test]
    fn test_resolve_product_pages() {
        let empty = MemorySelectionStore::new();
        assert_eq!(resolve_create_target("/product-list/123", &empty).route, "/product-list/product");
        assert_eq!(resolve_create_target("/product-list", &empty).route, "/product-list/product");
    }

    #[test]
    fn test_resolve_company_pages_ignore_selection() {
        let store = with_company("42");
        assert_eq!(resolve_create_target("/dashboard", &store).route, "/create-company");
        assert_eq!(resolve_create_target("/list-companies", &store).route, "/create-company");
    }

    #[test]
    fn test_resolve_elsewhere_uses_selection() {
        assert_eq!(resolve_create_target("/other", &with_company("42")), CreateTarget::PRODUCT);
        assert_eq!(resolve_create_target("/other", &MemorySelectionStore::new()), CreateTarget::COMPANY);
        assert_eq!(resolve_create_target("/other", &with_company("")), CreateTarget::COMPANY);
    }

    #[test]
    fn test_create_new_navigates_and_announces() {
        let (mut doc, live) = page();
        let mut nav = History::new("/product-list/123");
        let store = MemorySelectionStore::new();
        let ctx = PageContext {
            route: "/product-list/123",
            authenticated: true,
            tour_active: false,
            selection: &store,
        };

        let target = create_new(&ctx, &mut doc, &mut nav);
        assert_eq!(target, Some(CreateTarget::PRODUCT));
        assert_eq!(nav.current(), "/product-list/product");
        assert_eq!(doc.text(live), "Creating new product");
    }

    #[test]
    fn test_create_new_requires_sign_in() {
        let (mut doc, live) = page();
        let mut nav = History::new("/dashboard");
        let store = MemorySelectionStore::new();
        let ctx = PageContext {
            route: "/dashboard",
            authenticated: false,
            tour_active: false,
            selection: &store,
        };

        assert_eq!(create_new(&ctx, &mut doc, &mut nav), None);
        assert_eq!(nav.entries().len(), 1);
        assert_eq!(doc.text(live), "");
    }

    #[test]
    fn test_focus_search_selects_input() {
        let (mut doc, live) = page();
        let search = doc.append(None, Element::text_input("Search products"));

        assert!(focus_search(&mut doc));
        assert_eq!(doc.focused(), Some(search));
        assert!(doc.has_selection(search));
        assert_eq!(doc.text(live), "Search field focused");
    }

    #[test]
    fn test_focus_search_without_input_is_silent() {
        let (mut doc, live) = page();
        assert!(!focus_search(&mut doc));
        assert_eq!(doc.text(live), "");
    }

    #[test]
    fn test_show_help() {
        let (mut doc, live) = page();
        let mut nav = History::new("/dashboard");
        show_help(&mut doc, &mut nav);
        assert_eq!(nav.current(), "/accessibility#keyboard-shortcuts");
        assert_eq!(doc.text(live), "Navigating to keyboard shortcuts help");
    }

    #[test]
    fn test_escape_cascade_closes_dialogs_and_menus() {
        let mut doc = MemoryDocument::new();
        for _ in 0..2 {
            let dialog = doc.append(None, Element::modal_dialog());
            doc.append(Some(dialog), Element::button("Save"));
            doc.append(Some(dialog), Element::button("Close"));
        }
        doc.append(None, Element::button("Company menu").expanded(true));
        doc.append(None, Element::button("Collapsed").expanded(false));

        assert_eq!(escape_cascade(&mut doc), 3);
        assert_eq!(doc.activations().len(), 3);
        assert!(doc.open_dialogs().is_empty());
        assert!(doc.expanded_menus().is_empty());
    }

    #[test]
    fn test_escape_cascade_counts_toggle_inside_dialog() {
        let mut doc = MemoryDocument::new();
        let dialog = doc.append(None, Element::modal_dialog());
        doc.append(Some(dialog), Element::button("close"));
        doc.append(Some(dialog), Element::button("Units").expanded(true));

        assert_eq!(escape_cascade(&mut doc), 2);
    }

    #[test]
    fn test_escape_cascade_skips_dialog_without_close_control() {
        let mut doc = MemoryDocument::new();
        let dialog = doc.append(None, Element::modal_dialog());
        doc.append(Some(dialog), Element::button("Confirm"));
        doc.append(None, Element::new("div").expanded(true));

        assert_eq!(escape_cascade(&mut doc), 0);
        assert_eq!(doc.open_dialogs(), vec![dialog]);
    }

    #[test]
    fn test_escape_cascade_on_empty_page() {
        let mut doc = MemoryDocument::new();
        assert_eq!(escape_cascade(&mut doc), 0);
    }
}
