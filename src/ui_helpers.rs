use eframe::egui::{self, Color32, RichText, Ui};

use crate::models::TitleKind;

/// Colored badge text for a title's kind.
pub fn kind_badge(kind: TitleKind) -> RichText {
    match kind {
        TitleKind::Movie => RichText::new("MOVIE").color(Color32::LIGHT_GREEN).small(),
        TitleKind::Tv => RichText::new("TV").color(Color32::LIGHT_BLUE).small(),
    }
}

pub fn section_heading(ui: &mut Ui, text: &str) {
    ui.add_space(10.0);
    ui.label(RichText::new(text).heading().strong());
    ui.add_space(4.0);
}

/// Gray stand-in frame drawn while a poster is loading or after it failed.
/// Returns the click response for the whole frame.
pub fn poster_placeholder(ui: &mut Ui, size: egui::Vec2, caption: &str) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
    ui.painter().rect_filled(rect, 4.0, Color32::from_gray(45));
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        truncate(caption, 18),
        egui::FontId::proportional(13.0),
        Color32::from_gray(160),
    );
    response
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
