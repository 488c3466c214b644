use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Clear, Widget},
};

/// Clears `area` and paints it with a solid color, used under overlays.
pub struct BackgroundWidget {
    color: Color,
}

impl BackgroundWidget {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Widget for BackgroundWidget {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Clear.render(area, buf);
        buf.set_style(area, Style::new().bg(self.color));
    }
}
