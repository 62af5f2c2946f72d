pub mod app;
pub mod draw;
pub mod help;
pub mod theme;
