use ratatui::style::Color;

// ═══════════════════════════════════════════════════════════════════════════════
// Palette
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy)]
pub struct Palette {
    pub bg: Color,           // page background
    pub bg_alt: Color,       // header, status line
    pub fg: Color,           // body text
    pub fg_dim: Color,       // secondary text
    pub fg_strong: Color,    // titles
    pub accent: Color,       // focus ring, route
    pub shortcut: Color,     // key caps in the shortcut list
    pub positive: Color,     // enabled, announcements
    pub highlight: Color,    // disabled, warnings
}

#[derive(Clone, Copy)]
pub struct Theme {
    pub palette: Palette,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            palette: Palette {
                bg: Color::Reset,
                bg_alt: Color::Indexed(236),
                fg: Color::Indexed(252),
                fg_dim: Color::Indexed(244),
                fg_strong: Color::White,
                accent: Color::Indexed(39),
                shortcut: Color::Indexed(214),
                positive: Color::Indexed(78),
                highlight: Color::Indexed(203),
            },
        }
    }
}
