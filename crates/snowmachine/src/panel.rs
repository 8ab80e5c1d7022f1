//! The foreground panel: its placement, contents and the blur region behind it.

use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Paragraph},
};
use snowmachine_core::{BlurRegion, Rgba};

/// Panel size in cells.
const PANEL_WIDTH: u16 = 44;
const PANEL_HEIGHT: u16 = 7;

/// Split the screen into the centred panel and the help line at the bottom.
pub fn layout(area: Rect) -> (Rect, Rect) {
    let [body, help] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
    let [row] = Layout::vertical([Constraint::Length(PANEL_HEIGHT)])
        .flex(Flex::Center)
        .areas(body);
    let [panel] = Layout::horizontal([Constraint::Length(PANEL_WIDTH)])
        .flex(Flex::Center)
        .areas(row);
    (panel, help)
}

/// Title and date inside a rounded border, all in `color`.
///
/// Only the border and the text cells are styled; the rest of the panel keeps
/// whatever was drawn underneath it.
pub fn card(title: &str, date: String, color: Rgba) -> Paragraph<'_> {
    let style = Style::new().fg(color.into());
    let lines = vec![
        Line::from(""),
        Line::from(title).style(style).bold(),
        Line::from(""),
        Line::from(date).style(style),
    ];
    Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(style),
    )
}

/// The surface pixels behind `panel`, two pixel rows per cell row.
///
/// `screen` is the area the surface covers; the panel is expressed relative
/// to its origin.
pub fn blur_region(screen: Rect, panel: Rect) -> BlurRegion {
    BlurRegion::new(
        panel.x.saturating_sub(screen.x) as u32,
        panel.y.saturating_sub(screen.y) as u32 * 2,
        panel.width as u32,
        panel.height as u32 * 2,
    )
}
