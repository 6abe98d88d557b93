use eframe::egui::{Color32, Frame, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color;
use crate::dashboard::present::TableView;

// ---------------------------------------------------------------------------
// TableView rendering
// ---------------------------------------------------------------------------

/// Maroon section band with centered white text.
pub fn section_band(ui: &mut Ui, text: &str) {
    Frame::new()
        .fill(color::HEADER)
        .inner_margin(8)
        .corner_radius(4)
        .show(ui, |ui: &mut Ui| {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(text).color(Color32::WHITE).strong());
            });
        });
    ui.add_space(6.0);
}

/// Render a [`TableView`] with uniformly colored headers.
pub fn table_view(ui: &mut Ui, id: &str, table: &TableView) {
    table_view_with_header_colors(ui, id, table, None);
}

/// Render a [`TableView`]; `header_colors` overrides the header fill per
/// column (the quadrant table paints each quadrant its severity color).
pub fn table_view_with_header_colors(
    ui: &mut Ui,
    id: &str,
    table: &TableView,
    header_colors: Option<&[Color32]>,
) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(Column::auto().at_least(60.0).resizable(true), table.headers.len())
            .header(26.0, |mut header| {
                for (i, title) in table.headers.iter().enumerate() {
                    header.col(|ui| {
                        let fill = header_colors
                            .and_then(|colors| colors.get(i).copied())
                            .unwrap_or(color::HEADER);
                        Frame::new().fill(fill).inner_margin(4).show(ui, |ui: &mut Ui| {
                            ui.label(RichText::new(title).color(Color32::WHITE).strong());
                        });
                    });
                }
            })
            .body(|mut body| {
                for row in &table.rows {
                    body.row(22.0, |mut table_row| {
                        for cell in row {
                            table_row.col(|ui| {
                                ui.label(cell);
                            });
                        }
                    });
                }
            });
    });
    ui.add_space(10.0);
}
