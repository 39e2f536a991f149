use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

const KEY_HINTS: &str = " o:open e:edit n:new r:ren d:del c:dup s:sort q:quit ";
const BUSY_LABEL: &str = " Loading… ";

/// One-line bar: current path, busy indicator and key hints, or a transient
/// status message.
pub struct StatusBarWidget<'a> {
    path_str: &'a str,
    busy: bool,
    sort_label: Option<&'a str>,
    status_message: Option<&'a str>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(path_str: &'a str) -> Self {
        Self {
            path_str,
            busy: false,
            sort_label: None,
            status_message: None,
        }
    }

    pub fn busy(mut self, busy: bool) -> Self {
        self.busy = busy;
        self
    }

    pub fn sort_label(mut self, label: &'a str) -> Self {
        self.sort_label = Some(label);
        self
    }

    pub fn status_message(mut self, msg: &'a str) -> Self {
        self.status_message = Some(msg);
        self
    }
}

/// Keep the tail of `s` within `budget` columns, marking the cut with `...`.
fn truncate_left(s: &str, budget: usize) -> String {
    let len = s.chars().count();
    if len <= budget {
        return s.to_string();
    }
    if budget <= 3 {
        return s.chars().skip(len - budget).collect();
    }
    let tail: String = s.chars().skip(len - (budget - 3)).collect();
    format!("...{}", tail)
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;

        if let Some(msg) = self.status_message {
            let display: String = msg.chars().take(width).collect();
            let display = format!("{:<width$}", display, width = width);
            let line = Line::from(Span::styled(display, Style::default().fg(Color::Green)));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        let busy_label = if self.busy { BUSY_LABEL } else { "" };
        let sort_label = self.sort_label.unwrap_or("");
        let fixed = KEY_HINTS.chars().count()
            + busy_label.chars().count()
            + sort_label.chars().count();
        let path_display = truncate_left(self.path_str, width.saturating_sub(fixed + 1));
        let pad = width
            .saturating_sub(fixed)
            .saturating_sub(path_display.chars().count());

        let spans = vec![
            Span::styled(path_display, Style::default().fg(Color::White)),
            Span::raw(" ".repeat(pad)),
            Span::styled(
                busy_label,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(sort_label, Style::default().fg(Color::Cyan)),
            Span::styled(
                KEY_HINTS,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
            ),
        ];

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
