use std::sync::Arc;

use crate::dashboard::aggregate::{ptar_dashboard, ptci_dashboard, PtarSummary, PtciSummary};
use crate::dashboard::fields::QUARTER_COL;
use crate::dashboard::present::{ptar_view, ptci_view, PtarView, PtciView};
use crate::dashboard::{aggregate, Scope};
use crate::data::index::FilterIndex;
use crate::data::model::{CellValue, DatasetBundle, ACRONYM_COL};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Ptar,
    Ptci,
    Reportes,
}

/// Cached PTAR aggregation for the current selection.
pub struct PtarComputed {
    pub summary: PtarSummary,
    pub view: PtarView,
}

/// Cached PTCI aggregation for the current selection.
pub struct PtciComputed {
    pub summary: PtciSummary,
    pub view: PtciView,
}

/// The full UI state, independent of rendering.
///
/// Selection is an explicit little state machine: the scope is either one
/// institution or a whole sector ("Todas" in the sector selector means
/// institution scope). Changing the sector resets institution-scoped
/// sub-state; changing the institution drops back to institution scope.
pub struct AppState {
    /// Loaded datasets (None until the first successful load).
    pub bundle: Option<Arc<DatasetBundle>>,

    /// Distinct selector values, built once per bundle.
    pub index: FilterIndex,

    pub institution: Option<String>,
    /// `None` renders as "Todas": institution scope.
    pub sector: Option<String>,
    pub year: Option<i64>,

    // Secondary detail selections.
    pub breakdown_institution: Option<String>,
    pub detail_quarter: Option<CellValue>,
    pub detail_acronym: Option<CellValue>,

    /// Aggregations for the current selection, recomputed on change.
    pub ptar: Option<PtarComputed>,
    pub ptci: Option<PtciComputed>,

    pub active_tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            bundle: None,
            index: FilterIndex::default(),
            institution: None,
            sector: None,
            year: None,
            breakdown_institution: None,
            detail_quarter: None,
            detail_acronym: None,
            ptar: None,
            ptci: None,
            active_tab: Tab::Ptar,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded bundle: rebuild the index, keep the current
    /// selection where it still exists, then recompute.
    pub fn set_bundle(&mut self, bundle: Arc<DatasetBundle>) {
        self.index = FilterIndex::build(&bundle.ptar);
        self.bundle = Some(bundle);

        let inst_still_there = self
            .institution
            .as_ref()
            .map(|i| self.index.institutions.contains(i))
            .unwrap_or(false);
        if !inst_still_there {
            self.institution = self.index.institutions.first().cloned();
        }
        if let Some(sector) = &self.sector {
            if !self.index.sectors.contains(sector) {
                self.sector = None;
            }
        }

        self.clamp_year();
        self.recompute();
    }

    /// Active scope, if any selection is possible at all.
    pub fn scope(&self) -> Option<Scope> {
        if let Some(sector) = &self.sector {
            return Some(Scope::Sector(sector.clone()));
        }
        self.institution.clone().map(Scope::Institution)
    }

    /// Years offered by the year selector for the active scope.
    pub fn available_years(&self) -> Vec<i64> {
        match self.scope() {
            Some(scope) => self.index.available_years(&scope).to_vec(),
            None => Vec::new(),
        }
    }

    pub fn select_institution(&mut self, name: String) {
        self.institution = Some(name);
        // Picking an institution drops back to institution scope.
        self.sector = None;
        self.reset_detail_selections();
        self.clamp_year();
        self.recompute();
    }

    /// `None` means "Todas" (institution scope).
    pub fn select_sector(&mut self, sector: Option<String>) {
        self.sector = sector;
        // Sector change invalidates any institution-scoped sub-state.
        self.reset_detail_selections();
        self.clamp_year();
        self.recompute();
    }

    pub fn select_year(&mut self, year: i64) {
        self.year = Some(year);
        self.reset_detail_selections();
        self.recompute();
    }

    fn reset_detail_selections(&mut self) {
        self.breakdown_institution = None;
        self.detail_quarter = None;
        self.detail_acronym = None;
    }

    /// Keep the selected year inside the active scope's options.
    fn clamp_year(&mut self) {
        let years = self.available_years();
        let valid = self.year.map(|y| years.contains(&y)).unwrap_or(false);
        if !valid {
            self.year = years.first().copied();
        }
    }

    /// Recompute both dashboard aggregations for the current selection.
    pub fn recompute(&mut self) {
        self.ptar = None;
        self.ptci = None;

        let (Some(bundle), Some(scope), Some(year)) =
            (self.bundle.clone(), self.scope(), self.year)
        else {
            return;
        };

        if let Some(summary) = ptar_dashboard(&bundle, &scope, year) {
            let view = ptar_view(&summary);
            self.ptar = Some(PtarComputed { summary, view });
        }
        if let Some(summary) = ptci_dashboard(&bundle, &scope, year) {
            let view = ptci_view(&summary);
            self.ptci = Some(PtciComputed { summary, view });
        }

        self.default_detail_selections();
    }

    /// Seed the secondary selectors from the freshly computed summaries.
    fn default_detail_selections(&mut self) {
        let Some(ptci) = &self.ptci else {
            return;
        };
        if self.breakdown_institution.is_none() {
            self.breakdown_institution = ptci.summary.institutions.first().cloned();
        }
        if self.detail_quarter.is_none() {
            self.detail_quarter =
                aggregate::distinct_values(&ptci.summary.improvement_rows, QUARTER_COL)
                    .into_iter()
                    .next();
        }
        if self.detail_acronym.is_none() {
            self.detail_acronym =
                aggregate::distinct_values(&ptci.summary.improvement_rows, ACRONYM_COL)
                    .into_iter()
                    .next();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Record, Table};

    fn row(inst: &str, sector: &str, year: i64, ac_total: i64) -> Record {
        let mut r = Record::new();
        r.insert("Institución".into(), CellValue::String(inst.into()));
        r.insert("Sector".into(), CellValue::String(sector.into()));
        r.insert("Año".into(), CellValue::Integer(year));
        r.insert("AC_Total".into(), CellValue::Integer(ac_total));
        r.insert("Riesgos_Totales".into(), CellValue::Integer(1));
        r
    }

    fn bundle() -> Arc<DatasetBundle> {
        let columns: Vec<String> =
            ["Institución", "Sector", "Año", "AC_Total", "Riesgos_Totales"]
                .iter()
                .map(|c| c.to_string())
                .collect();
        let ptar = Table::new(
            columns,
            vec![row("A", "S1", 2023, 3), row("A", "S1", 2024, 4), row("B", "S2", 2024, 5)],
        );
        Arc::new(DatasetBundle {
            ptar,
            ..DatasetBundle::default()
        })
    }

    #[test]
    fn first_bundle_selects_first_institution_and_year() {
        let mut state = AppState::default();
        state.set_bundle(bundle());

        assert_eq!(state.institution.as_deref(), Some("A"));
        assert_eq!(state.sector, None);
        assert_eq!(state.year, Some(2023));
        assert!(state.ptar.is_some());
    }

    #[test]
    fn selecting_a_sector_switches_scope_and_year_options() {
        let mut state = AppState::default();
        state.set_bundle(bundle());
        state.select_sector(Some("S2".into()));

        assert_eq!(state.scope(), Some(Scope::Sector("S2".into())));
        assert_eq!(state.available_years(), vec![2024]);
        assert_eq!(state.year, Some(2024));
    }

    #[test]
    fn selecting_an_institution_resets_the_sector() {
        let mut state = AppState::default();
        state.set_bundle(bundle());
        state.select_sector(Some("S2".into()));
        state.select_institution("A".into());

        assert_eq!(state.sector, None);
        assert_eq!(state.scope(), Some(Scope::Institution("A".into())));
        assert_eq!(state.available_years(), vec![2023, 2024]);
    }

    #[test]
    fn sector_change_resets_institution_scoped_substate() {
        let mut state = AppState::default();
        state.set_bundle(bundle());
        state.breakdown_institution = Some("A".into());
        state.select_sector(Some("S1".into()));

        // Reset, then reseeded from the new aggregation (if any).
        assert_ne!(state.breakdown_institution.as_deref(), Some("stale"));
        assert_eq!(state.scope(), Some(Scope::Sector("S1".into())));
    }

    #[test]
    fn no_data_selection_clears_the_computed_views() {
        let mut state = AppState::default();
        state.set_bundle(bundle());
        state.select_year(1999);
        assert!(state.ptar.is_none());
        assert!(state.ptci.is_none());
    }
}
