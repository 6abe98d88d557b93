use eframe::egui::{self, Color32, Frame, RichText, Ui};

use crate::color;
use crate::dashboard::aggregate::ScopeHeader;
use crate::dashboard::present::{NO_DATA_MESSAGE, SOURCE_FOOTER};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Actions the top bar can request from the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopAction {
    Reload,
    PickDataDir,
}

/// Render the top menu / toolbar. Returns the requested action, if any.
pub fn top_bar(ui: &mut Ui, state: &AppState) -> Option<TopAction> {
    let mut action = None;

    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Archivo", |ui: &mut Ui| {
            if ui.button("Abrir carpeta de datos…").clicked() {
                action = Some(TopAction::PickDataDir);
                ui.close_menu();
            }
            if ui.button("Recargar datos").clicked() {
                action = Some(TopAction::Reload);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(bundle) = &state.bundle {
            ui.label(format!(
                "PTAR {} · ACTRI {} · PTCI {} · AMTRI {} registros",
                bundle.ptar.len(),
                bundle.actri.len(),
                bundle.ptci.len(),
                bundle.amtri.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });

    action
}

/// Static dashboard title banner.
pub fn title_banner(ui: &mut Ui) {
    Frame::new()
        .fill(color::HEADER)
        .inner_margin(14)
        .corner_radius(6)
        .show(ui, |ui: &mut Ui| {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(
                    RichText::new("SISTEMA DE CONTROL INTERNO INSTITUCIONAL")
                        .color(Color32::WHITE)
                        .size(22.0)
                        .strong(),
                );
                ui.label(
                    RichText::new("RIESGOS Y AVANCE DE LAS ACCIONES DE CONTROL")
                        .color(Color32::WHITE)
                        .size(15.0),
                );
            });
        });
    ui.add_space(8.0);
}

// ---------------------------------------------------------------------------
// Cascading selectors
// ---------------------------------------------------------------------------

/// The "all institutions in the sector" sentinel shown by the sector selector.
pub const ALL_SECTORS: &str = "Todas";

/// Render the Institución / Sector / Año selector row.
///
/// Widgets read the current selection and queue changes locally; the state
/// transitions (with their cascading resets) run after rendering.
pub fn selector_row(ui: &mut Ui, state: &mut AppState) {
    let mut pick_institution: Option<String> = None;
    let mut pick_sector: Option<Option<String>> = None;
    let mut pick_year: Option<i64> = None;

    ui.horizontal(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.strong("Seleccione la Institución");
            let current = state.institution.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("institution")
                .width(260.0)
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for inst in &state.index.institutions {
                        if ui.selectable_label(current == *inst, inst).clicked() {
                            pick_institution = Some(inst.clone());
                        }
                    }
                });
        });

        ui.vertical(|ui: &mut Ui| {
            ui.strong("Seleccione el Sector");
            let current = state.sector.clone().unwrap_or_else(|| ALL_SECTORS.to_string());
            egui::ComboBox::from_id_salt("sector")
                .width(200.0)
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui.selectable_label(current == ALL_SECTORS, ALL_SECTORS).clicked() {
                        pick_sector = Some(None);
                    }
                    for sector in &state.index.sectors {
                        if ui.selectable_label(current == *sector, sector).clicked() {
                            pick_sector = Some(Some(sector.clone()));
                        }
                    }
                });
        });

        ui.vertical(|ui: &mut Ui| {
            ui.strong("Seleccione el Año");
            let current = state.year.map(|y| y.to_string()).unwrap_or_default();
            egui::ComboBox::from_id_salt("year")
                .width(100.0)
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for year in state.available_years() {
                        if ui
                            .selectable_label(state.year == Some(year), year.to_string())
                            .clicked()
                        {
                            pick_year = Some(year);
                        }
                    }
                });
        });
    });
    ui.add_space(8.0);

    if let Some(inst) = pick_institution {
        state.select_institution(inst);
    } else if let Some(sector) = pick_sector {
        state.select_sector(sector);
    } else if let Some(year) = pick_year {
        state.select_year(year);
    }
}

// ---------------------------------------------------------------------------
// Scope header / placeholders
// ---------------------------------------------------------------------------

/// Light card summarizing the active scope above the tabs.
pub fn scope_header(ui: &mut Ui, header: &ScopeHeader) {
    Frame::group(ui.style()).inner_margin(10).show(ui, |ui: &mut Ui| {
        match header {
            ScopeHeader::Institution {
                institution,
                sector,
                acronym,
            } => {
                ui.label(format!("Institución: {institution}"));
                ui.label(format!("Sector: {sector}"));
                ui.label(format!("Siglas: {acronym}"));
            }
            ScopeHeader::Sector {
                sector,
                institutions,
            } => {
                ui.label(format!("Sector: {sector}"));
                ui.label("Instituciones:");
                for inst in institutions {
                    ui.label(format!("  • {inst}"));
                }
            }
        }
    });
    ui.add_space(8.0);
}

/// Blue indicator banner, one centered line per entry.
pub fn indicator_banner(ui: &mut Ui, lines: &[String]) {
    Frame::new()
        .fill(color::INDICATOR)
        .inner_margin(10)
        .corner_radius(4)
        .show(ui, |ui: &mut Ui| {
            ui.vertical_centered(|ui: &mut Ui| {
                for line in lines {
                    ui.label(RichText::new(line).color(Color32::WHITE).size(17.0).strong());
                }
            });
        });
    ui.add_space(8.0);
}

pub fn no_data(ui: &mut Ui) {
    ui.add_space(20.0);
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(NO_DATA_MESSAGE);
    });
}

pub fn source_footer(ui: &mut Ui) {
    ui.add_space(8.0);
    ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui: &mut Ui| {
        ui.label(RichText::new(SOURCE_FOOTER).small().color(Color32::GRAY));
    });
}
