use ratatui::style::Color;

pub struct Resources {
    pub main_color: Color,
    pub secondary_color: Color,
    pub accent_color: Color,
    pub background_color: Color,
    pub focus_color: Color,
    pub error_color: Color,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            main_color: Color::White,
            secondary_color: Color::Gray,
            accent_color: Color::Cyan,
            background_color: Color::Black,
            focus_color: Color::Yellow,
            error_color: Color::Red,
        }
    }
}
