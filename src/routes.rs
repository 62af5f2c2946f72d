//! Front-end routes the shortcut handlers read or navigate to.

pub const PRODUCT_LIST: &str = "/product-list";
pub const LIST_COMPANIES: &str = "/list-companies";
pub const DASHBOARD: &str = "/dashboard";

pub const NEW_PRODUCT: &str = "/product-list/product";
pub const NEW_COMPANY: &str = "/create-company";
pub const SHORTCUTS_HELP: &str = "/accessibility#keyboard-shortcuts";

/// Persisted selection key holding the active company id.
pub const SELECTED_COMPANY_KEY: &str = "selected_company_id";
