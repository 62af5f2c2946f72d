//! Page capability used by the dispatcher.
//!
//! The dispatcher never owns page state. Every query runs against the live
//! `Document` at dispatch time, so whatever the host renders is the source of
//! truth for "what is open". `MemoryDocument` is a small in-process tree used
//! by the terminal host and by tests.

use tracing::trace;

/// Handle to an element inside a `Document`. Only valid until the next mutation.
pub type ElementId = usize;

/// Element id of the accessibility live region.
pub const LIVE_REGION_ID: &str = "status-announcements";

/// The accessible surface of an element: tag, ARIA attributes and the few
/// form attributes the shortcut handlers look at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub dom_id: Option<String>,
    pub role: Option<String>,
    pub aria_label: Option<String>,
    pub aria_modal: bool,
    pub aria_expanded: Option<bool>,
    pub input_type: Option<String>,
    pub placeholder: Option<String>,
    pub content_editable: bool,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    /// A `role="dialog" aria-modal="true"` container.
    pub fn modal_dialog() -> Self {
        Self::new("div").role("dialog").modal(true)
    }

    pub fn button(label: &str) -> Self {
        Self::new("button").label(label)
    }

    pub fn text_input(placeholder: &str) -> Self {
        let mut el = Self::new("input");
        el.input_type = Some("text".to_string());
        el.placeholder = Some(placeholder.to_string());
        el
    }

    pub fn dom_id(mut self, id: &str) -> Self {
        self.dom_id = Some(id.to_string());
        self
    }

    pub fn role(mut self, role: &str) -> Self {
        self.role = Some(role.to_string());
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.aria_label = Some(label.to_string());
        self
    }

    pub fn modal(mut self, modal: bool) -> Self {
        self.aria_modal = modal;
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.aria_expanded = Some(expanded);
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.content_editable = editable;
        self
    }

    pub fn is_button(&self) -> bool {
        self.tag.eq_ignore_ascii_case("button")
    }

    pub fn is_open_modal_dialog(&self) -> bool {
        self.role.as_deref() == Some("dialog") && self.aria_modal
    }

    /// A button whose accessible label mentions "close" in any casing.
    pub fn is_close_control(&self) -> bool {
        self.is_button()
            && self
                .aria_label
                .as_deref()
                .is_some_and(|l| l.to_lowercase().contains("close"))
    }

    /// `input[type="text"][placeholder*="Search"]` or `input[placeholder*="search"]`.
    pub fn is_search_input(&self) -> bool {
        if !self.tag.eq_ignore_ascii_case("input") {
            return false;
        }
        let placeholder = self.placeholder.as_deref().unwrap_or("");
        let is_text = self.input_type.as_deref() == Some("text");
        (is_text && placeholder.contains("Search")) || placeholder.contains("search")
    }
}

/// Read/write access to the page.
pub trait Document {
    fn get(&self, id: ElementId) -> Option<&Element>;

    /// All live elements in document order.
    fn elements(&self) -> Vec<ElementId>;

    /// Descendants of `id` in document order, excluding `id` itself.
    fn descendants(&self, id: ElementId) -> Vec<ElementId>;

    fn element_by_dom_id(&self, dom_id: &str) -> Option<ElementId>;

    /// Programmatic click.
    fn activate(&mut self, id: ElementId);

    fn focus_and_select(&mut self, id: ElementId);

    fn set_text_content(&mut self, id: ElementId, text: &str);
}

/// Overlay lookups used by the escape cascade.
pub trait OverlayQuery {
    fn open_dialogs(&self) -> Vec<ElementId>;
    fn expanded_menus(&self) -> Vec<ElementId>;
    fn find_close_control(&self, dialog: ElementId) -> Option<ElementId>;
}

impl<D: Document + ?Sized> OverlayQuery for D {
    fn open_dialogs(&self) -> Vec<ElementId> {
        self.elements()
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(Element::is_open_modal_dialog))
            .collect()
    }

    fn expanded_menus(&self) -> Vec<ElementId> {
        self.elements()
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(|el| el.aria_expanded == Some(true)))
            .collect()
    }

    fn find_close_control(&self, dialog: ElementId) -> Option<ElementId> {
        self.descendants(dialog)
            .into_iter()
            .find(|&id| self.get(id).is_some_and(Element::is_close_control))
    }
}

/// First search input on the page, if any.
pub fn find_search_input<D: Document + ?Sized>(doc: &D) -> Option<ElementId> {
    doc.elements()
        .into_iter()
        .find(|&id| doc.get(id).is_some_and(Element::is_search_input))
}

// ─── In-memory document ────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Node {
    element: Element,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    text: String,
}

/// A flat-arena element tree with click behavior for close controls and
/// disclosure toggles.
///
/// Activating a close control removes its nearest enclosing dialog.
/// Activating an element with an expanded state flips that state.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    nodes: Vec<Option<Node>>,
    roots: Vec<ElementId>,
    focused: Option<ElementId>,
    selected: Option<ElementId>,
    activations: Vec<ElementId>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `element` as the last child of `parent` (or as a root).
    pub fn append(&mut self, parent: Option<ElementId>, element: Element) -> ElementId {
        let id = self.nodes.len();
        self.nodes.push(Some(Node {
            element,
            parent,
            children: Vec::new(),
            text: String::new(),
        }));
        match parent.and_then(|p| self.node_mut(p)) {
            Some(p) => p.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Remove an element and its subtree.
    pub fn remove(&mut self, id: ElementId) {
        let Some(node) = self.nodes.get_mut(id).and_then(Option::take) else {
            return;
        };
        match node.parent.and_then(|p| self.node_mut(p)) {
            Some(parent) => parent.children.retain(|&c| c != id),
            None => self.roots.retain(|&r| r != id),
        }
        for child in node.children {
            self.remove_subtree(child);
        }
        if self.focused.is_some_and(|f| self.get(f).is_none()) {
            self.focused = None;
        }
        if self.selected.is_some_and(|s| self.get(s).is_none()) {
            self.selected = None;
        }
    }

    fn remove_subtree(&mut self, id: ElementId) {
        if let Some(node) = self.nodes.get_mut(id).and_then(Option::take) {
            for child in node.children {
                self.remove_subtree(child);
            }
        }
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id).and_then(Option::as_mut)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.node_mut(id).map(|n| &mut n.element)
    }

    pub fn text(&self, id: ElementId) -> &str {
        self.node(id).map(|n| n.text.as_str()).unwrap_or("")
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// Element that currently receives key events.
    pub fn focused_element(&self) -> Option<&Element> {
        self.focused.and_then(|id| self.get(id))
    }

    pub fn set_focus(&mut self, id: Option<ElementId>) {
        self.focused = id.filter(|&i| self.get(i).is_some());
        self.selected = None;
    }

    /// Whether the focused input's contents are selected.
    pub fn has_selection(&self, id: ElementId) -> bool {
        self.selected == Some(id)
    }

    /// Every programmatic activation since creation, in order.
    pub fn activations(&self) -> &[ElementId] {
        &self.activations
    }

    fn enclosing_dialog(&self, id: ElementId) -> Option<ElementId> {
        let mut current = self.node(id)?.parent;
        while let Some(p) = current {
            let node = self.node(p)?;
            if node.element.is_open_modal_dialog() {
                return Some(p);
            }
            current = node.parent;
        }
        None
    }

    fn collect(&self, id: ElementId, out: &mut Vec<ElementId>) {
        if let Some(node) = self.node(id) {
            for &child in &node.children {
                out.push(child);
                self.collect(child, out);
            }
        }
    }
}

impl Document for MemoryDocument {
    fn get(&self, id: ElementId) -> Option<&Element> {
        self.node(id).map(|n| &n.element)
    }

    fn elements(&self) -> Vec<ElementId> {
        let mut out = Vec::new();
        for &root in &self.roots {
            out.push(root);
            self.collect(root, &mut out);
        }
        out
    }

    fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        self.collect(id, &mut out);
        out
    }

    fn element_by_dom_id(&self, dom_id: &str) -> Option<ElementId> {
        self.elements()
            .into_iter()
            .find(|&id| self.get(id).and_then(|el| el.dom_id.as_deref()) == Some(dom_id))
    }

    fn activate(&mut self, id: ElementId) {
        let Some(element) = self.get(id).cloned() else {
            return;
        };
        self.activations.push(id);
        if element.is_close_control() {
            if let Some(dialog) = self.enclosing_dialog(id) {
                trace!(dialog, "close control removed dialog");
                self.remove(dialog);
            }
        } else if let Some(expanded) = element.aria_expanded {
            if let Some(el) = self.get_mut(id) {
                el.aria_expanded = Some(!expanded);
            }
        }
    }

    fn focus_and_select(&mut self, id: ElementId) {
        if self.get(id).is_some() {
            self.focused = Some(id);
            self.selected = Some(id);
        }
    }

    fn set_text_content(&mut self, id: ElementId, text: &str) {
        if let Some(node) = self.node_mut(id) {
            node.text = text.to_string();
        }
    }
}
