use eframe::egui::Color32;

use crate::dashboard::fields::Status;

// ---------------------------------------------------------------------------
// Fixed display palette
//
// Styling stays out of the view-models; renderers pick colors here.
// ---------------------------------------------------------------------------

/// Institutional maroon used for section bands and table headers.
pub const HEADER: Color32 = Color32::from_rgb(0x62, 0x11, 0x32);

/// Accent for the indicator banners.
pub const INDICATOR: Color32 = Color32::from_rgb(0x2e, 0x86, 0xc1);

pub const WARNING: Color32 = Color32::from_rgb(0xdc, 0x35, 0x45);

/// Per-status series colors (chart and status tables).
pub fn status_color(status: Status) -> Color32 {
    match status {
        Status::NoProgress => Color32::from_rgb(0xdc, 0x35, 0x45),
        Status::InProgress => Color32::from_rgb(0xff, 0xc1, 0x07),
        Status::Completed => Color32::from_rgb(0x28, 0xa7, 0x45),
        Status::Compliance => Color32::from_rgb(0x66, 0x10, 0xf2),
    }
}

/// Chart series color looked up by series name, falling back to gray for
/// names that are not one of the four statuses.
pub fn series_color(name: &str) -> Color32 {
    Status::ALL
        .iter()
        .find(|s| s.column_stem() == name)
        .map(|s| status_color(*s))
        .unwrap_or(Color32::GRAY)
}

/// Quadrant header colors, in I–IV order (severity red → blue).
pub const QUADRANT_COLORS: [Color32; 4] = [
    Color32::from_rgb(0xdc, 0x35, 0x45),
    Color32::from_rgb(0xff, 0xc1, 0x07),
    Color32::from_rgb(0x28, 0xa7, 0x45),
    Color32::from_rgb(0x00, 0x7b, 0xff),
];
