use std::collections::BTreeSet;

use super::fields::{
    is_compliance_column, quarter_status_column, Quarter, QuarterStatusTable, Status,
    IMPROVEMENT_DETAIL_COLS, NGCI_COMPLIANCE_COL, PROGRAM_NOT_UPDATED_FLAG_COL,
    PROGRAM_ORIGINAL_COL, PROGRAM_UPDATED_FLAG_COL, PROGRAM_UPDATED_TOTAL_COL, QUARTER_COL,
    TOTAL_ACTIONS_COL, TOTAL_RISKS_COL,
};
use super::Scope;
use crate::data::model::{CellValue, DatasetBundle, Record, Table, ACRONYM_COL, INSTITUTION_COL, SECTOR_COL};
use crate::data::normalize::{row_text, row_year};

// ---------------------------------------------------------------------------
// Row selection
// ---------------------------------------------------------------------------

/// Rows of `table` matching the scope and year.
pub fn filter_rows<'t>(table: &'t Table, scope: &Scope, year: i64) -> Vec<&'t Record> {
    let (col, name) = match scope {
        Scope::Institution(n) => (INSTITUTION_COL, n.as_str()),
        Scope::Sector(n) => (SECTOR_COL, n.as_str()),
    };
    table
        .rows
        .iter()
        .filter(|row| row_year(row) == Some(year) && row_text(row, col) == Some(name))
        .collect()
}

// ---------------------------------------------------------------------------
// Reduction and cleaning
// ---------------------------------------------------------------------------

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Numeric field of a cleaned record, 0 when missing.
pub fn field_f64(record: &Record, col: &str) -> f64 {
    record.get(col).and_then(CellValue::coerce_f64).unwrap_or(0.0)
}

fn column_sum(rows: &[&Record], col: &str) -> f64 {
    rows.iter().map(|r| field_f64(r, col)).sum()
}

/// Mean with missing treated as 0 first; mean of an empty selection is 0.
fn column_mean(rows: &[&Record], col: &str) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    column_sum(rows, col) / rows.len() as f64
}

/// Reduce the matched rows to the single record the tables project from.
///
/// Sector scope sums every numeric field across the rows except the
/// `*Cumplimiento` percentages, which take the mean (missing as 0) rounded to
/// 2 decimals. Institution scope takes the single row as-is. Either way the
/// result is then cleaned: nulls become 0, non-compliance numerics round to
/// integers, compliance percentages keep 2 decimals.
pub fn reduce(rows: &[&Record], columns: &[String], scope: &Scope) -> Record {
    let mut data = Record::new();

    match scope {
        Scope::Sector(_) => {
            for col in columns {
                let any_numeric = rows.iter().any(|r| {
                    r.get(col).map(CellValue::is_numeric).unwrap_or(false)
                });
                if is_compliance_column(col) {
                    data.insert(col.clone(), CellValue::Float(round2(column_mean(rows, col))));
                } else if any_numeric {
                    data.insert(col.clone(), CellValue::Float(column_sum(rows, col)));
                }
            }
        }
        Scope::Institution(_) => {
            if let Some(row) = rows.first() {
                data = (*row).clone();
            }
        }
    }

    clean(&mut data);
    data
}

/// Null → 0; round non-compliance numerics to integers, compliance to 2
/// decimals. Text fields pass through.
fn clean(data: &mut Record) {
    for (col, value) in data.iter_mut() {
        if value.is_null() {
            *value = CellValue::Integer(0);
        } else if value.is_numeric() {
            let v = value.as_f64().unwrap_or(0.0);
            *value = if is_compliance_column(col) {
                CellValue::Float(round2(v))
            } else {
                CellValue::Integer(v.round() as i64)
            };
        }
    }
}

// ---------------------------------------------------------------------------
// PTAR dashboard
// ---------------------------------------------------------------------------

/// Who the active selection covers, for the dashboard header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeHeader {
    Institution {
        institution: String,
        sector: String,
        acronym: String,
    },
    Sector {
        sector: String,
        institutions: Vec<String>,
    },
}

/// Aggregated PTAR view of one `(scope, year)` selection.
#[derive(Debug, Clone)]
pub struct PtarSummary {
    pub header: ScopeHeader,
    /// Reduced and cleaned record all table projections read from.
    pub data: Record,
    pub total_actions: i64,
    pub total_risks: i64,
    pub quarters: QuarterStatusTable,
    /// ACTRI rows matching the same selection.
    pub actions: Vec<Record>,
    /// Soft consistency check: ACTRI row count vs `AC_Total`. Warning-only.
    pub count_mismatch: bool,
}

/// Run the PTAR aggregation. `None` means no matching rows ("no data"),
/// never a panic on an empty selection.
pub fn ptar_dashboard(bundle: &DatasetBundle, scope: &Scope, year: i64) -> Option<PtarSummary> {
    let rows = filter_rows(&bundle.ptar, scope, year);
    if rows.is_empty() {
        return None;
    }

    let header = match scope {
        Scope::Sector(sector) => {
            let mut seen = BTreeSet::new();
            let mut institutions = Vec::new();
            for row in &rows {
                if let Some(inst) = row_text(row, INSTITUTION_COL) {
                    if seen.insert(inst.to_string()) {
                        institutions.push(inst.to_string());
                    }
                }
            }
            ScopeHeader::Sector {
                sector: sector.clone(),
                institutions,
            }
        }
        Scope::Institution(institution) => ScopeHeader::Institution {
            institution: institution.clone(),
            sector: row_text(rows[0], SECTOR_COL).unwrap_or_default().to_string(),
            acronym: rows[0]
                .get(ACRONYM_COL)
                .map(CellValue::as_text)
                .unwrap_or_default(),
        },
    };

    let data = reduce(&rows, &bundle.ptar.columns, scope);

    let mut quarters = QuarterStatusTable::default();
    for quarter in Quarter::ALL {
        for status in Status::ALL {
            let col = quarter_status_column(quarter, status);
            quarters.set(quarter, status, field_f64(&data, &col));
        }
    }

    let total_actions = field_f64(&data, TOTAL_ACTIONS_COL) as i64;
    let total_risks = field_f64(&data, TOTAL_RISKS_COL) as i64;

    let actions: Vec<Record> = filter_rows(&bundle.actri, scope, year)
        .into_iter()
        .cloned()
        .collect();
    let count_mismatch = total_actions != actions.len() as i64;

    Some(PtarSummary {
        header,
        data,
        total_actions,
        total_risks,
        quarters,
        actions,
        count_mismatch,
    })
}

// ---------------------------------------------------------------------------
// PTCI dashboard
// ---------------------------------------------------------------------------

/// Aggregated PTCI view of one `(scope, year)` selection.
#[derive(Debug, Clone)]
pub struct PtciSummary {
    /// Overall NGCI compliance percentage: mean across the sector's
    /// institutions, or the institution's own value.
    pub overall_compliance: f64,
    /// Improvement-action program indicators, label → value.
    pub program: Vec<(String, CellValue)>,
    /// Per-quarter status/compliance rollup, integer-rounded.
    pub quarters: QuarterStatusTable,
    /// AMTRI registration/location/sufficiency sums, label → count.
    pub detail_counts: Vec<(String, i64)>,
    /// Distinct institutions in the matched PTCI rows (sector scope only).
    pub institutions: Vec<String>,
    /// Matched PTCI rows, source of the per-institution breakdown.
    pub rows: Vec<Record>,
    /// Matched AMTRI rows, source of the description table.
    pub improvement_rows: Vec<Record>,
}

pub fn ptci_dashboard(bundle: &DatasetBundle, scope: &Scope, year: i64) -> Option<PtciSummary> {
    let rows = filter_rows(&bundle.ptci, scope, year);
    if rows.is_empty() {
        return None;
    }
    let improvement_rows: Vec<Record> = filter_rows(&bundle.amtri, scope, year)
        .into_iter()
        .cloned()
        .collect();

    let overall_compliance = match scope {
        Scope::Sector(_) => round2(column_mean(&rows, NGCI_COMPLIANCE_COL)),
        Scope::Institution(_) => round2(field_f64(rows[0], NGCI_COMPLIANCE_COL)),
    };

    // The institution view shows the update flags alongside both program
    // counts; the sector view only has meaningful sums for the counts.
    let program_cols: &[&str] = match scope {
        Scope::Institution(_) => &[
            PROGRAM_ORIGINAL_COL,
            PROGRAM_UPDATED_FLAG_COL,
            PROGRAM_NOT_UPDATED_FLAG_COL,
            PROGRAM_UPDATED_TOTAL_COL,
        ],
        Scope::Sector(_) => &[PROGRAM_ORIGINAL_COL, PROGRAM_UPDATED_TOTAL_COL],
    };
    let flag_cols = [PROGRAM_UPDATED_FLAG_COL, PROGRAM_NOT_UPDATED_FLAG_COL];
    let program = program_cols
        .iter()
        .map(|&col| {
            let value = if flag_cols.contains(&col) {
                rows[0].get(col).cloned().unwrap_or(CellValue::Null)
            } else if bundle.ptci.has_column(col) {
                CellValue::Integer(column_sum(&rows, col).round() as i64)
            } else {
                CellValue::Integer(0)
            };
            (super::fields::program_label(col).to_string(), value)
        })
        .collect();

    // Per-field quarter policy: Compliance is a mean under sector scope,
    // everything else sums; the PTCI rollup is integer-rounded throughout.
    let mut quarters = QuarterStatusTable::default();
    for quarter in Quarter::ALL {
        for status in Status::ALL {
            let col = quarter_status_column(quarter, status);
            let value = if !bundle.ptci.has_column(&col) {
                0.0
            } else if status.is_percentage() && scope.is_sector() {
                column_mean(&rows, &col)
            } else {
                column_sum(&rows, &col)
            };
            quarters.set(quarter, status, value.round());
        }
    }

    let amtri_refs: Vec<&Record> = improvement_rows.iter().collect();
    let detail_counts = IMPROVEMENT_DETAIL_COLS
        .iter()
        .map(|&col| {
            let value = if bundle.amtri.has_column(col) {
                column_sum(&amtri_refs, col).round() as i64
            } else {
                0
            };
            (col.to_string(), value)
        })
        .collect();

    let institutions: Vec<String> = rows
        .iter()
        .filter_map(|r| row_text(r, INSTITUTION_COL))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    Some(PtciSummary {
        overall_compliance,
        program,
        quarters,
        detail_counts,
        institutions,
        rows: rows.into_iter().cloned().collect(),
        improvement_rows,
    })
}

// ---------------------------------------------------------------------------
// Secondary detail filters
// ---------------------------------------------------------------------------

/// PTCI rows of one institution, for the sector-scope breakdown table.
pub fn institution_breakdown<'r>(rows: &'r [Record], institution: &str) -> Vec<&'r Record> {
    rows.iter()
        .filter(|r| row_text(r, INSTITUTION_COL) == Some(institution))
        .collect()
}

/// Distinct values of a column across rows, sorted, nulls excluded.
pub fn distinct_values(rows: &[Record], col: &str) -> Vec<CellValue> {
    rows.iter()
        .filter_map(|r| r.get(col))
        .filter(|v| !v.is_null())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// AMTRI rows matching the quarter and acronym sub-filters.
pub fn improvement_descriptions<'r>(
    rows: &'r [Record],
    quarter: &CellValue,
    acronym: &CellValue,
) -> Vec<&'r Record> {
    rows.iter()
        .filter(|r| r.get(QUARTER_COL) == Some(quarter) && r.get(ACRONYM_COL) == Some(acronym))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Table;

    fn rec(pairs: &[(&str, CellValue)]) -> Record {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn s(v: &str) -> CellValue {
        CellValue::String(v.into())
    }

    fn ptar_table() -> Table {
        let columns: Vec<String> = [
            "Año", "Institución", "Sector", "Siglas", "AC_Total", "Riesgos_Totales",
            "1Sin_Avances", "1Cumplimiento",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        let rows = vec![
            rec(&[
                ("Año", CellValue::Integer(2024)),
                ("Institución", s("A")),
                ("Sector", s("S1")),
                ("Siglas", s("AAA")),
                ("AC_Total", CellValue::Integer(10)),
                ("Riesgos_Totales", CellValue::Integer(5)),
                ("1Sin_Avances", CellValue::Integer(2)),
                ("1Cumplimiento", CellValue::Float(50.0)),
            ]),
            rec(&[
                ("Año", CellValue::Integer(2024)),
                ("Institución", s("B")),
                ("Sector", s("S1")),
                ("Siglas", s("BBB")),
                ("AC_Total", CellValue::Integer(6)),
                ("Riesgos_Totales", CellValue::Integer(3)),
                ("1Sin_Avances", CellValue::Integer(4)),
                ("1Cumplimiento", CellValue::Float(80.0)),
            ]),
        ];
        Table::new(columns, rows)
    }

    fn actri_rows(n: usize) -> Table {
        let rows = (0..n)
            .map(|i| {
                rec(&[
                    ("Año", CellValue::Integer(2024)),
                    ("Institución", s(if i % 2 == 0 { "A" } else { "B" })),
                    ("Sector", s("S1")),
                    ("AC", CellValue::Integer(i as i64 + 1)),
                ])
            })
            .collect();
        Table::new(vec!["Año".into(), "Institución".into(), "Sector".into(), "AC".into()], rows)
    }

    fn bundle() -> DatasetBundle {
        DatasetBundle {
            ptar: ptar_table(),
            actri: actri_rows(16),
            ptci: Table::default(),
            amtri: Table::default(),
        }
    }

    #[test]
    fn sector_scope_sums_counts_and_averages_compliance() {
        let summary = ptar_dashboard(&bundle(), &Scope::Sector("S1".into()), 2024).unwrap();
        assert_eq!(summary.total_actions, 16);
        assert_eq!(summary.total_risks, 8);
        assert_eq!(summary.data["1Sin_Avances"], CellValue::Integer(6));
        assert_eq!(summary.data["1Cumplimiento"], CellValue::Float(65.0));
        assert_eq!(summary.quarters.get(Quarter::Q1, Status::NoProgress), 6.0);
        assert_eq!(summary.quarters.get(Quarter::Q1, Status::Compliance), 65.0);
        assert!(!summary.count_mismatch);
    }

    #[test]
    fn sector_header_lists_member_institutions() {
        let summary = ptar_dashboard(&bundle(), &Scope::Sector("S1".into()), 2024).unwrap();
        assert_eq!(
            summary.header,
            ScopeHeader::Sector {
                sector: "S1".into(),
                institutions: vec!["A".into(), "B".into()],
            }
        );
    }

    #[test]
    fn institution_scope_takes_the_row_directly() {
        let summary = ptar_dashboard(&bundle(), &Scope::Institution("A".into()), 2024).unwrap();
        assert_eq!(summary.total_actions, 10);
        assert_eq!(summary.data["1Cumplimiento"], CellValue::Float(50.0));
        assert_eq!(
            summary.header,
            ScopeHeader::Institution {
                institution: "A".into(),
                sector: "S1".into(),
                acronym: "AAA".into(),
            }
        );
        // 16 ACTRI rows in S1 but AC_Total is 10 for institution A alone:
        // only the 8 rows tagged A count.
        assert_eq!(summary.actions.len(), 8);
        assert!(summary.count_mismatch);
    }

    #[test]
    fn empty_sector_reduces_to_zeroes() {
        let rows: Vec<&Record> = Vec::new();
        let data = reduce(&rows, &ptar_table().columns, &Scope::Sector("S9".into()));
        assert_eq!(data["AC_Total"], CellValue::Integer(0));
        assert_eq!(data["1Cumplimiento"], CellValue::Float(0.0));
    }

    #[test]
    fn unknown_institution_yields_no_data() {
        assert!(ptar_dashboard(&bundle(), &Scope::Institution("Z".into()), 2024).is_none());
        assert!(ptar_dashboard(&bundle(), &Scope::Sector("S9".into()), 2024).is_none());
        assert!(ptar_dashboard(&bundle(), &Scope::Sector("S1".into()), 1999).is_none());
    }

    #[test]
    fn cleaning_replaces_nulls_and_rounds() {
        let row = rec(&[
            ("Año", CellValue::Integer(2024)),
            ("Institución", s("A")),
            ("Sector", s("S1")),
            ("AC_Total", CellValue::Null),
            ("1Cumplimiento", CellValue::Float(49.996)),
            ("Riesgos_Totales", CellValue::Float(4.6)),
        ]);
        let rows = vec![&row];
        let data = reduce(&rows, &ptar_table().columns, &Scope::Institution("A".into()));
        assert_eq!(data["AC_Total"], CellValue::Integer(0));
        assert_eq!(data["1Cumplimiento"], CellValue::Float(50.0));
        assert_eq!(data["Riesgos_Totales"], CellValue::Integer(5));
    }

    #[test]
    fn count_mismatch_is_flagged_when_actri_rows_differ() {
        let mut b = bundle();
        b.actri = actri_rows(9);
        let summary = ptar_dashboard(&b, &Scope::Sector("S1".into()), 2024).unwrap();
        assert_eq!(summary.total_actions, 16);
        assert!(summary.count_mismatch);
    }

    // -- PTCI --

    fn ptci_bundle() -> DatasetBundle {
        let columns: Vec<String> = [
            "Año", "Institución", "Sector", NGCI_COMPLIANCE_COL,
            PROGRAM_ORIGINAL_COL, PROGRAM_UPDATED_FLAG_COL, PROGRAM_NOT_UPDATED_FLAG_COL,
            PROGRAM_UPDATED_TOTAL_COL, "1Sin_Avances", "1Cumplimiento",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        let rows = vec![
            rec(&[
                ("Año", CellValue::Integer(2024)),
                ("Institución", s("A")),
                ("Sector", s("S1")),
                (NGCI_COMPLIANCE_COL, CellValue::Float(90.0)),
                (PROGRAM_ORIGINAL_COL, CellValue::Integer(4)),
                (PROGRAM_UPDATED_FLAG_COL, s("Sí")),
                (PROGRAM_NOT_UPDATED_FLAG_COL, s("No")),
                (PROGRAM_UPDATED_TOTAL_COL, CellValue::Integer(6)),
                ("1Sin_Avances", CellValue::Integer(2)),
                ("1Cumplimiento", CellValue::Float(50.0)),
            ]),
            rec(&[
                ("Año", CellValue::Integer(2024)),
                ("Institución", s("B")),
                ("Sector", s("S1")),
                (NGCI_COMPLIANCE_COL, CellValue::Float(70.0)),
                (PROGRAM_ORIGINAL_COL, CellValue::Integer(2)),
                (PROGRAM_UPDATED_FLAG_COL, s("No")),
                (PROGRAM_NOT_UPDATED_FLAG_COL, s("Sí")),
                (PROGRAM_UPDATED_TOTAL_COL, CellValue::Integer(3)),
                ("1Sin_Avances", CellValue::Integer(1)),
                ("1Cumplimiento", CellValue::Float(81.0)),
            ]),
        ];
        DatasetBundle {
            ptar: ptar_table(),
            actri: actri_rows(16),
            ptci: Table::new(columns, rows),
            amtri: Table::default(),
        }
    }

    #[test]
    fn ptci_sector_scope_averages_overall_compliance() {
        let summary = ptci_dashboard(&ptci_bundle(), &Scope::Sector("S1".into()), 2024).unwrap();
        assert_eq!(summary.overall_compliance, 80.0);
        assert_eq!(summary.institutions, vec!["A", "B"]);
    }

    #[test]
    fn ptci_institution_scope_reads_compliance_directly() {
        let summary =
            ptci_dashboard(&ptci_bundle(), &Scope::Institution("B".into()), 2024).unwrap();
        assert_eq!(summary.overall_compliance, 70.0);
        // Institution view carries the two update flags.
        assert_eq!(summary.program.len(), 4);
        assert_eq!(summary.program[1].1, s("No"));
    }

    #[test]
    fn ptci_quarter_policy_mean_for_compliance_sum_for_counts() {
        let summary = ptci_dashboard(&ptci_bundle(), &Scope::Sector("S1".into()), 2024).unwrap();
        assert_eq!(summary.quarters.get(Quarter::Q1, Status::NoProgress), 3.0);
        // mean(50.0, 81.0) = 65.5, integer-rounded for the PTCI rollup.
        assert_eq!(summary.quarters.get(Quarter::Q1, Status::Compliance), 66.0);
        // Missing quarters are 0, not an error.
        assert_eq!(summary.quarters.get(Quarter::Q3, Status::Completed), 0.0);
    }

    #[test]
    fn ptci_sector_program_keeps_only_the_count_columns() {
        let summary = ptci_dashboard(&ptci_bundle(), &Scope::Sector("S1".into()), 2024).unwrap();
        assert_eq!(summary.program.len(), 2);
        assert_eq!(summary.program[0].1, CellValue::Integer(6));
        assert_eq!(summary.program[1].1, CellValue::Integer(9));
    }

    #[test]
    fn ptci_empty_selection_is_no_data() {
        assert!(ptci_dashboard(&ptci_bundle(), &Scope::Sector("S1".into()), 2020).is_none());
    }

    #[test]
    fn breakdown_and_detail_filters() {
        let summary = ptci_dashboard(&ptci_bundle(), &Scope::Sector("S1".into()), 2024).unwrap();
        let only_a = institution_breakdown(&summary.rows, "A");
        assert_eq!(only_a.len(), 1);
        assert_eq!(row_text(only_a[0], INSTITUTION_COL), Some("A"));

        let rows = vec![
            rec(&[(QUARTER_COL, CellValue::Integer(1)), (ACRONYM_COL, s("AAA"))]),
            rec(&[(QUARTER_COL, CellValue::Integer(2)), (ACRONYM_COL, s("AAA"))]),
            rec(&[(QUARTER_COL, CellValue::Integer(1)), (ACRONYM_COL, s("BBB"))]),
        ];
        assert_eq!(
            distinct_values(&rows, QUARTER_COL),
            vec![CellValue::Integer(1), CellValue::Integer(2)]
        );
        let filtered = improvement_descriptions(&rows, &CellValue::Integer(1), &s("AAA"));
        assert_eq!(filtered.len(), 1);
    }
}
