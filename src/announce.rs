use tracing::trace;

use crate::dom::{Document, LIVE_REGION_ID};

pub const SEARCH_FOCUSED: &str = "Search field focused";
pub const HELP_OPENED: &str = "Navigating to keyboard shortcuts help";
pub const CREATING_PRODUCT: &str = "Creating new product";
pub const CREATING_COMPANY: &str = "Creating new company";

/// Replace the live region's text with `message`.
///
/// Returns false when the page has no live region.
pub fn announce<D: Document + ?Sized>(doc: &mut D, message: &str) -> bool {
    match doc.element_by_dom_id(LIVE_REGION_ID) {
        Some(region) => {
            doc.set_text_content(region, message);
            true
        }
        None => {
            trace!(message, "no live region, announcement dropped");
            false
        }
    }
}
