use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Stylize},
    text::{Line, Span},
    widgets::Widget,
};

const SEPARATOR: &str = "  ";

pub struct NavigationHelpWidget {
    key_bindings: Vec<(String, String)>,
    key_color: Color,
    text_color: Color,
}

impl NavigationHelpWidget {
    pub fn new(key_bindings: Vec<(String, String)>, key_color: Color, text_color: Color) -> Self {
        Self {
            key_bindings,
            key_color,
            text_color,
        }
    }

    fn key_width(&self) -> usize {
        self.key_bindings
            .iter()
            .map(|(key, _)| key.chars().count())
            .max()
            .unwrap_or(0)
    }

    pub fn min_width(&self) -> usize {
        let description_width = self
            .key_bindings
            .iter()
            .map(|(_, description)| description.chars().count())
            .max()
            .unwrap_or(0);

        self.key_width() + SEPARATOR.len() + description_width
    }

    pub fn height(&self) -> usize {
        self.key_bindings.len()
    }
}

impl Widget for NavigationHelpWidget {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let key_width = self.key_width();

        for (row, (key, description)) in self
            .key_bindings
            .iter()
            .take(area.height as usize)
            .enumerate()
        {
            let line = Line::from(vec![
                Span::raw(format!("{key:>key_width$}")).bold().fg(self.key_color),
                Span::raw(SEPARATOR),
                Span::raw(description.as_str()).fg(self.text_color),
            ]);

            buf.set_line(area.x, area.y + row as u16, &line, area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> NavigationHelpWidget {
        NavigationHelpWidget::new(
            vec![
                ("↑".to_string(), "Move focus up".to_string()),
                ("F10".to_string(), "Quit application".to_string()),
            ],
            Color::Red,
            Color::Black,
        )
    }

    #[test]
    fn test_dimensions() {
        let widget = widget();

        assert_eq!(widget.height(), 2);
        assert_eq!(widget.min_width(), 3 + 2 + "Quit application".len());
    }

    #[test]
    fn test_keys_are_right_aligned() {
        let area = Rect::new(0, 0, 24, 2);
        let mut buf = Buffer::empty(area);

        widget().render(area, &mut buf);

        assert_eq!(buf[(2, 0)].symbol(), "↑");
        assert_eq!(buf[(0, 1)].symbol(), "F");
        assert_eq!(buf[(5, 1)].symbol(), "Q");
    }
}
