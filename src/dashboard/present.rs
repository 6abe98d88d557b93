use serde::Serialize;

use super::aggregate::{PtarSummary, PtciSummary, ScopeHeader};
use super::fields::{
    Quarter, Status, ACTION_DESCRIPTION_COLS, BREAKDOWN_COLS, IMPROVEMENT_DESCRIPTION_COLS,
    NGCI_COMPLIANCE_COL, PROGRESS_INSTITUTION_COL, PROGRESS_OVERSIGHT_COL, QUADRANTS,
    RISK_CATEGORIES, STRATEGIES,
};
use crate::data::model::{CellValue, Record};

// ---------------------------------------------------------------------------
// View-models
//
// Pure formatting output: ordered headers and stringified cells, no styling
// and no business logic, so any renderer (egui, terminal, JSON) can consume
// the same structures.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    /// One value per group, in group order.
    pub values: Vec<f64>,
    /// Display values as `N%` above the bars instead of plain bars.
    pub percent_labels: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedBarChart {
    /// Group labels along the x axis (the four quarters).
    pub groups: Vec<String>,
    pub series: Vec<BarSeries>,
}

/// PTAR tab view-model.
#[derive(Debug, Clone, Serialize)]
pub struct PtarView {
    pub header_lines: Vec<String>,
    pub total_actions: i64,
    pub total_risks: i64,
    pub risk_table: TableView,
    pub quadrant_table: TableView,
    pub strategy_table: TableView,
    pub status_table: TableView,
    pub chart: GroupedBarChart,
    pub actions_table: TableView,
    pub count_mismatch: bool,
}

/// PTCI tab view-model. Breakdown and description tables depend on secondary
/// selections and are built on demand via [`breakdown_table`] and
/// [`improvement_description_table`].
#[derive(Debug, Clone, Serialize)]
pub struct PtciView {
    pub overall_compliance: String,
    pub program_table: TableView,
    pub detail_table: TableView,
    pub status_table: TableView,
    pub chart: GroupedBarChart,
}

pub const NO_DATA_MESSAGE: &str = "No hay datos para los filtros seleccionados.";
pub const MISMATCH_WARNING: &str =
    "Las acciones de control registradas en el PTAR no coinciden con las Acciones de Control Registradas";
pub const SOURCE_FOOTER: &str = "Fuente: Sistema de Control Interno (SICOIN)";

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

fn fmt_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

fn fmt_percent(v: f64) -> String {
    format!("{}%", fmt_number(v))
}

/// Progress percentage cell: rounded to 2 decimals with a `%` suffix, empty
/// when the value is missing.
fn fmt_progress(record: &Record, col: &str) -> String {
    match record.get(col).and_then(CellValue::coerce_f64) {
        Some(v) => fmt_percent((v * 100.0).round() / 100.0),
        None => String::new(),
    }
}

fn cell_text(record: &Record, col: &str) -> String {
    record.get(col).map(CellValue::as_text).unwrap_or_default()
}

/// Single-row projection of the reduced record over a fixed column order.
fn projection_table(title: &str, cols: &[&str], data: &Record) -> TableView {
    TableView {
        title: title.to_string(),
        headers: cols.iter().map(|c| c.to_string()).collect(),
        rows: vec![cols.iter().map(|c| cell_text(data, c)).collect()],
    }
}

fn status_table(title: &str, first_header: &str, quarters: &super::fields::QuarterStatusTable) -> TableView {
    let mut headers = vec![first_header.to_string()];
    headers.extend(Quarter::ALL.iter().map(|q| q.label().to_string()));

    let rows = Status::ALL
        .iter()
        .map(|status| {
            let mut row = vec![status.label().to_string()];
            for quarter in Quarter::ALL {
                let v = quarters.get(quarter, *status);
                row.push(if status.is_percentage() {
                    fmt_percent(v)
                } else {
                    fmt_number(v)
                });
            }
            row
        })
        .collect();

    TableView {
        title: title.to_string(),
        headers,
        rows,
    }
}

fn status_chart(quarters: &super::fields::QuarterStatusTable) -> GroupedBarChart {
    GroupedBarChart {
        groups: Quarter::ALL.iter().map(|q| q.number().to_string()).collect(),
        series: Status::ALL
            .iter()
            .map(|status| BarSeries {
                name: status.column_stem().to_string(),
                values: quarters.row(*status).to_vec(),
                percent_labels: status.is_percentage(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// PTAR
// ---------------------------------------------------------------------------

pub fn ptar_view(summary: &PtarSummary) -> PtarView {
    let header_lines = match &summary.header {
        ScopeHeader::Institution {
            institution,
            sector,
            acronym,
        } => vec![
            format!("Institución: {institution}"),
            format!("Sector: {sector}"),
            format!("Siglas: {acronym}"),
        ],
        ScopeHeader::Sector {
            sector,
            institutions,
        } => {
            let mut lines = vec![format!("Sector: {sector}"), "Instituciones:".to_string()];
            lines.extend(institutions.iter().map(|i| format!("  • {i}")));
            lines
        }
    };

    let actions_table = TableView {
        title: "Descripción de los Riesgos y las Acciones de Control".to_string(),
        headers: ACTION_DESCRIPTION_COLS.iter().map(|(_, l)| l.to_string()).collect(),
        rows: summary
            .actions
            .iter()
            .map(|row| {
                ACTION_DESCRIPTION_COLS
                    .iter()
                    .map(|(col, _)| {
                        if *col == PROGRESS_INSTITUTION_COL || *col == PROGRESS_OVERSIGHT_COL {
                            fmt_progress(row, col)
                        } else {
                            cell_text(row, col)
                        }
                    })
                    .collect()
            })
            .collect(),
    };

    PtarView {
        header_lines,
        total_actions: summary.total_actions,
        total_risks: summary.total_risks,
        risk_table: projection_table("Clasificación de Riesgos", &RISK_CATEGORIES, &summary.data),
        quadrant_table: projection_table("Cuadrante", &QUADRANTS, &summary.data),
        strategy_table: projection_table("Estrategia", &STRATEGIES, &summary.data),
        status_table: status_table(
            "Seguimiento de las Acciones de Control",
            "Estado de las Acciones de Control",
            &summary.quarters,
        ),
        chart: status_chart(&summary.quarters),
        actions_table,
        count_mismatch: summary.count_mismatch,
    }
}

// ---------------------------------------------------------------------------
// PTCI
// ---------------------------------------------------------------------------

pub fn ptci_view(summary: &PtciSummary) -> PtciView {
    let program_table = TableView {
        title: "Programa de Trabajo de Control Interno".to_string(),
        headers: summary.program.iter().map(|(label, _)| label.clone()).collect(),
        rows: vec![summary.program.iter().map(|(_, v)| v.as_text()).collect()],
    };

    let detail_table = TableView {
        title: "Detalle de las Acciones de Mejora".to_string(),
        headers: summary.detail_counts.iter().map(|(col, _)| col.clone()).collect(),
        rows: vec![summary.detail_counts.iter().map(|(_, v)| v.to_string()).collect()],
    };

    PtciView {
        overall_compliance: fmt_percent(summary.overall_compliance),
        program_table,
        detail_table,
        status_table: status_table(
            "Seguimiento de las Acciones de Mejora",
            "Estatus de las Acciones de Mejora",
            &summary.quarters,
        ),
        chart: status_chart(&summary.quarters),
    }
}

/// PTCI per-institution breakdown (sector scope only).
pub fn breakdown_table(rows: &[&Record]) -> TableView {
    TableView {
        title: "Desglose por Institución".to_string(),
        headers: BREAKDOWN_COLS.iter().map(|(_, l)| l.to_string()).collect(),
        rows: rows
            .iter()
            .map(|row| {
                BREAKDOWN_COLS
                    .iter()
                    .map(|(col, _)| {
                        if *col == NGCI_COMPLIANCE_COL {
                            match row.get(*col).and_then(CellValue::coerce_f64) {
                                Some(v) => format!("{}%", v.round() as i64),
                                None => String::new(),
                            }
                        } else {
                            cell_text(row, col)
                        }
                    })
                    .collect()
            })
            .collect(),
    }
}

/// AMTRI process / improvement-action description rows.
pub fn improvement_description_table(rows: &[&Record]) -> TableView {
    TableView {
        title: "Descripción de los Procesos y las Acciones de Mejora".to_string(),
        headers: IMPROVEMENT_DESCRIPTION_COLS.iter().map(|c| c.to_string()).collect(),
        rows: rows
            .iter()
            .map(|row| {
                IMPROVEMENT_DESCRIPTION_COLS
                    .iter()
                    .map(|col| {
                        if *col == PROGRESS_INSTITUTION_COL || *col == PROGRESS_OVERSIGHT_COL {
                            match row.get(*col).and_then(CellValue::coerce_f64) {
                                Some(v) => format!("{}%", v as i64),
                                None => cell_text(row, col),
                            }
                        } else {
                            cell_text(row, col)
                        }
                    })
                    .collect()
            })
            .collect(),
    }
}

/// Totals banner above the PTAR tables.
pub fn totals_lines(view: &PtarView) -> [String; 2] {
    [
        format!("Total de Acciones de Control: {}", view.total_actions),
        format!("Total de Riesgos: {}", view.total_risks),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::aggregate::ptar_dashboard;
    use crate::dashboard::Scope;
    use crate::data::model::{DatasetBundle, Table};

    fn rec(pairs: &[(&str, CellValue)]) -> Record {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn bundle() -> DatasetBundle {
        let mut columns: Vec<String> =
            vec!["Año".into(), "Institución".into(), "Sector".into(), "Siglas".into()];
        columns.extend(RISK_CATEGORIES.iter().map(|c| c.to_string()));
        columns.extend(QUADRANTS.iter().map(|c| c.to_string()));
        columns.extend(STRATEGIES.iter().map(|c| c.to_string()));
        columns.push("AC_Total".into());
        columns.push("Riesgos_Totales".into());
        columns.push("1Cumplimiento".into());

        let mut row = rec(&[
            ("Año", CellValue::Integer(2024)),
            ("Institución", CellValue::String("A".into())),
            ("Sector", CellValue::String("S1".into())),
            ("Siglas", CellValue::String("AAA".into())),
            ("AC_Total", CellValue::Integer(2)),
            ("Riesgos_Totales", CellValue::Integer(1)),
            ("1Cumplimiento", CellValue::Float(65.5)),
        ]);
        for (i, c) in RISK_CATEGORIES.iter().enumerate() {
            row.insert(c.to_string(), CellValue::Integer(i as i64));
        }
        for c in QUADRANTS.iter().chain(STRATEGIES.iter()) {
            row.insert(c.to_string(), CellValue::Integer(1));
        }

        DatasetBundle {
            ptar: Table::new(columns, vec![row]),
            actri: Table::default(),
            ptci: Table::default(),
            amtri: Table::default(),
        }
    }

    #[test]
    fn projections_keep_the_fixed_column_order() {
        let summary = ptar_dashboard(&bundle(), &Scope::Institution("A".into()), 2024).unwrap();
        let view = ptar_view(&summary);

        assert_eq!(view.risk_table.headers, RISK_CATEGORIES.to_vec());
        assert_eq!(view.risk_table.rows[0][0], "0");
        assert_eq!(view.risk_table.rows[0][13], "13");
        assert_eq!(view.quadrant_table.headers, QUADRANTS.to_vec());
        assert_eq!(view.strategy_table.headers.len(), 5);
    }

    #[test]
    fn status_table_suffixes_compliance_with_percent() {
        let summary = ptar_dashboard(&bundle(), &Scope::Institution("A".into()), 2024).unwrap();
        let view = ptar_view(&summary);

        let headers = &view.status_table.headers;
        assert_eq!(headers[1], "Primero");
        assert_eq!(headers[4], "Cuarto");
        let compliance_row = &view.status_table.rows[3];
        assert_eq!(compliance_row[0], "% de Cumplimiento");
        assert_eq!(compliance_row[1], "65.5%");
        assert_eq!(compliance_row[2], "0%");
    }

    #[test]
    fn chart_marks_only_the_compliance_series_as_percent() {
        let summary = ptar_dashboard(&bundle(), &Scope::Institution("A".into()), 2024).unwrap();
        let view = ptar_view(&summary);

        assert_eq!(view.chart.groups, vec!["1", "2", "3", "4"]);
        assert_eq!(view.chart.series.len(), 4);
        let percent_flags: Vec<bool> = view.chart.series.iter().map(|s| s.percent_labels).collect();
        assert_eq!(percent_flags, vec![false, false, false, true]);
        assert_eq!(view.chart.series[3].values[0], 65.5);
    }

    #[test]
    fn views_serialize_to_json() {
        let summary = ptar_dashboard(&bundle(), &Scope::Institution("A".into()), 2024).unwrap();
        let view = ptar_view(&summary);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["total_actions"], 2);
        assert!(json["chart"]["series"].as_array().unwrap().len() == 4);
    }

    #[test]
    fn progress_cells_render_blank_when_missing() {
        let row = rec(&[("Avance_Institución", CellValue::Float(33.333))]);
        assert_eq!(fmt_progress(&row, "Avance_Institución"), "33.33%");
        assert_eq!(fmt_progress(&row, "Avance_OIC"), "");
    }
}
