use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color;
use crate::config::AppConfig;
use crate::dashboard::aggregate::{
    self, improvement_descriptions, institution_breakdown,
};
use crate::dashboard::fields::QUARTER_COL;
use crate::dashboard::present::{
    breakdown_table, improvement_description_table, totals_lines, MISMATCH_WARNING,
};
use crate::data::cache::TtlCache;
use crate::data::loader::{load_bundle, DirectorySource};
use crate::data::model::{CellValue, DatasetBundle, ACRONYM_COL};
use crate::state::{AppState, Tab};
use crate::ui::panels::{self, TopAction};
use crate::ui::{plot, tables};

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

const BUNDLE_KEY: &str = "bundle";

pub struct SicoinApp {
    state: AppState,
    config: AppConfig,
    cache: TtlCache<&'static str, DatasetBundle>,
}

impl SicoinApp {
    /// Build the app and perform the initial load. A failed first load is
    /// fatal; there is nothing to show without data.
    pub fn new(config: AppConfig) -> Result<Self> {
        let cache = TtlCache::new(config.refresh_interval());
        let mut app = SicoinApp {
            state: AppState::default(),
            config,
            cache,
        };
        app.refresh().context("initial data load")?;
        Ok(app)
    }

    /// Fetch (or reuse) the bundle through the cache and hand it to the state.
    fn refresh(&mut self) -> Result<()> {
        let source = DirectorySource::new(&self.config.data_dir);
        let files = self.config.files.clone();
        let bundle = self
            .cache
            .get_or_fetch(BUNDLE_KEY, || load_bundle(&source, &files))?;
        self.state.set_bundle(bundle);
        self.state.status_message = None;
        Ok(())
    }

    /// Refetch once the TTL has elapsed. A failed refetch keeps the last
    /// good snapshot on screen and reports the error instead.
    fn maybe_refresh(&mut self) {
        if self.cache.peek(&BUNDLE_KEY).is_some() {
            return;
        }
        log::info!("data cache expired, refetching");
        if let Err(e) = self.refresh() {
            log::error!("refresh failed: {e:#}");
            self.state.status_message = Some(format!("Error al actualizar los datos: {e}"));
        }
    }

    fn handle_top_action(&mut self, action: TopAction) {
        match action {
            TopAction::Reload => {
                self.cache.invalidate(&BUNDLE_KEY);
                if let Err(e) = self.refresh() {
                    log::error!("reload failed: {e:#}");
                    self.state.status_message =
                        Some(format!("Error al recargar los datos: {e}"));
                }
            }
            TopAction::PickDataDir => {
                if let Some(dir) = rfd::FileDialog::new()
                    .set_title("Carpeta de datos")
                    .pick_folder()
                {
                    log::info!("data directory changed to {}", dir.display());
                    self.config.data_dir = dir;
                    self.handle_top_action(TopAction::Reload);
                }
            }
        }
    }
}

impl eframe::App for SicoinApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.maybe_refresh();

        let mut action = None;
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            action = panels::top_bar(ui, &self.state);
        });
        if let Some(action) = action {
            self.handle_top_action(action);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                panels::title_banner(ui);
                panels::selector_row(ui, &mut self.state);

                ui.horizontal(|ui| {
                    ui.selectable_value(&mut self.state.active_tab, Tab::Ptar, "PTAR");
                    ui.selectable_value(&mut self.state.active_tab, Tab::Ptci, "PTCI");
                    ui.selectable_value(&mut self.state.active_tab, Tab::Reportes, "REPORTES");
                });
                ui.separator();

                match self.state.active_tab {
                    Tab::Ptar => ptar_tab(ui, &self.state),
                    Tab::Ptci => ptci_tab(ui, &mut self.state),
                    Tab::Reportes => reportes_tab(ui, &self.state),
                }
            });
        });
    }
}

// ---------------------------------------------------------------------------
// PTAR tab
// ---------------------------------------------------------------------------

fn ptar_tab(ui: &mut Ui, state: &AppState) {
    let Some(ptar) = &state.ptar else {
        panels::no_data(ui);
        return;
    };
    let view = &ptar.view;

    panels::scope_header(ui, &ptar.summary.header);
    panels::indicator_banner(ui, &totals_lines(view));

    tables::section_band(ui, &view.risk_table.title);
    tables::table_view(ui, "ptar_risks", &view.risk_table);

    ui.columns(2, |cols| {
        tables::section_band(&mut cols[0], &view.quadrant_table.title);
        tables::table_view_with_header_colors(
            &mut cols[0],
            "ptar_quadrants",
            &view.quadrant_table,
            Some(&color::QUADRANT_COLORS),
        );
        tables::section_band(&mut cols[1], &view.strategy_table.title);
        tables::table_view(&mut cols[1], "ptar_strategies", &view.strategy_table);
    });

    tables::section_band(ui, &view.status_table.title);
    tables::table_view(ui, "ptar_status", &view.status_table);
    plot::grouped_bar_chart(ui, "ptar_chart", &view.chart);

    if view.count_mismatch {
        ui.label(RichText::new(MISMATCH_WARNING).color(color::WARNING).strong());
        ui.add_space(6.0);
    }

    tables::section_band(ui, &view.actions_table.title);
    tables::table_view(ui, "ptar_actions", &view.actions_table);

    panels::source_footer(ui);
}

// ---------------------------------------------------------------------------
// PTCI tab
// ---------------------------------------------------------------------------

fn ptci_tab(ui: &mut Ui, state: &mut AppState) {
    // Secondary picks are queued during rendering and applied afterwards,
    // while the computed summary is still borrowed.
    let mut pick_breakdown: Option<String> = None;
    let mut pick_quarter: Option<CellValue> = None;
    let mut pick_acronym: Option<CellValue> = None;
    let sector_scope = state.scope().map(|s| s.is_sector()).unwrap_or(false);

    {
        let Some(ptci) = &state.ptci else {
            panels::no_data(ui);
            return;
        };
        let view = &ptci.view;
        let summary = &ptci.summary;

        panels::indicator_banner(
            ui,
            &[format!(
                "Cumplimiento General de las NGCI: {}",
                view.overall_compliance
            )],
        );

        tables::section_band(ui, &view.program_table.title);
        tables::table_view(ui, "ptci_program", &view.program_table);

        if sector_scope && !summary.institutions.is_empty() {
            tables::section_band(ui, "Desglose por Institución");
            let current = state
                .breakdown_institution
                .clone()
                .unwrap_or_else(|| summary.institutions[0].clone());
            egui::ComboBox::from_id_salt("ptci_breakdown")
                .width(260.0)
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for inst in &summary.institutions {
                        if ui.selectable_label(current == *inst, inst).clicked() {
                            pick_breakdown = Some(inst.clone());
                        }
                    }
                });
            ui.add_space(6.0);

            let rows = institution_breakdown(&summary.rows, &current);
            tables::table_view(ui, "ptci_breakdown_table", &breakdown_table(&rows));
        }

        tables::section_band(ui, &view.detail_table.title);
        tables::table_view(ui, "ptci_detail", &view.detail_table);

        tables::section_band(ui, &view.status_table.title);
        tables::table_view(ui, "ptci_status", &view.status_table);
        plot::grouped_bar_chart(ui, "ptci_chart", &view.chart);

        if !summary.improvement_rows.is_empty() {
            tables::section_band(ui, "Descripción de los Procesos y las Acciones de Mejora");

            let quarter_options = aggregate::distinct_values(&summary.improvement_rows, QUARTER_COL);
            let acronym_options = aggregate::distinct_values(&summary.improvement_rows, ACRONYM_COL);

            ui.horizontal(|ui: &mut Ui| {
                ui.vertical(|ui: &mut Ui| {
                    ui.strong("Trimestre");
                    let current = state.detail_quarter.clone();
                    let shown = current.as_ref().map(CellValue::as_text).unwrap_or_default();
                    egui::ComboBox::from_id_salt("ptci_desc_quarter")
                        .width(120.0)
                        .selected_text(shown)
                        .show_ui(ui, |ui: &mut Ui| {
                            for option in &quarter_options {
                                let selected = current.as_ref() == Some(option);
                                if ui.selectable_label(selected, option.as_text()).clicked() {
                                    pick_quarter = Some(option.clone());
                                }
                            }
                        });
                });
                ui.vertical(|ui: &mut Ui| {
                    ui.strong("Siglas");
                    let current = state.detail_acronym.clone();
                    let shown = current.as_ref().map(CellValue::as_text).unwrap_or_default();
                    egui::ComboBox::from_id_salt("ptci_desc_acronym")
                        .width(160.0)
                        .selected_text(shown)
                        .show_ui(ui, |ui: &mut Ui| {
                            for option in &acronym_options {
                                let selected = current.as_ref() == Some(option);
                                if ui.selectable_label(selected, option.as_text()).clicked() {
                                    pick_acronym = Some(option.clone());
                                }
                            }
                        });
                });
            });
            ui.add_space(6.0);

            if let (Some(quarter), Some(acronym)) = (&state.detail_quarter, &state.detail_acronym)
            {
                let rows = improvement_descriptions(&summary.improvement_rows, quarter, acronym);
                tables::table_view(ui, "ptci_descriptions", &improvement_description_table(&rows));
            }
        }

        panels::source_footer(ui);
    }

    if let Some(inst) = pick_breakdown {
        state.breakdown_institution = Some(inst);
    }
    if let Some(quarter) = pick_quarter {
        state.detail_quarter = Some(quarter);
    }
    if let Some(acronym) = pick_acronym {
        state.detail_acronym = Some(acronym);
    }
}

// ---------------------------------------------------------------------------
// REPORTES tab
// ---------------------------------------------------------------------------

fn reportes_tab(ui: &mut Ui, state: &AppState) {
    tables::section_band(ui, "Reportes");
    ui.label(
        "Los reportes institucionales se publican trimestralmente por el Órgano \
         Interno de Control. Este panel resume los registros cargados.",
    );
    ui.add_space(8.0);

    if let Some(bundle) = &state.bundle {
        let counts = [
            ("PTAR", bundle.ptar.len()),
            ("ACTRI", bundle.actri.len()),
            ("PTCI", bundle.ptci.len()),
            ("AMTRI", bundle.amtri.len()),
        ];
        for (name, n) in counts {
            ui.label(format!("{name}: {n} registros"));
        }
    } else {
        ui.label(RichText::new("Sin datos cargados.").color(Color32::GRAY));
    }

    panels::source_footer(ui);
}
