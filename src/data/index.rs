use std::collections::{BTreeMap, BTreeSet};

use super::model::{Table, INSTITUTION_COL, SECTOR_COL};
use super::normalize::{row_text, row_year};
use crate::dashboard::Scope;

// ---------------------------------------------------------------------------
// FilterIndex – distinct values backing the cascading selectors
// ---------------------------------------------------------------------------

/// Pre-computed distinct institutions / sectors and the years available for
/// each, built once per loaded bundle so the selectors never rescan rows.
#[derive(Debug, Clone, Default)]
pub struct FilterIndex {
    pub institutions: Vec<String>,
    pub sectors: Vec<String>,
    pub years_by_institution: BTreeMap<String, Vec<i64>>,
    pub years_by_sector: BTreeMap<String, Vec<i64>>,
}

impl FilterIndex {
    /// Build the index from the primary (PTAR) dataset. Rows with a missing
    /// institution, sector or year are excluded from the distinct sets.
    pub fn build(ptar: &Table) -> Self {
        let mut institutions: BTreeSet<String> = BTreeSet::new();
        let mut sectors: BTreeSet<String> = BTreeSet::new();
        let mut years_by_institution: BTreeMap<String, BTreeSet<i64>> = BTreeMap::new();
        let mut years_by_sector: BTreeMap<String, BTreeSet<i64>> = BTreeMap::new();

        for row in &ptar.rows {
            let inst = row_text(row, INSTITUTION_COL);
            let sector = row_text(row, SECTOR_COL);
            let year = row_year(row);

            if let Some(inst) = inst {
                institutions.insert(inst.to_string());
                if let Some(y) = year {
                    years_by_institution.entry(inst.to_string()).or_default().insert(y);
                }
            }
            if let Some(sector) = sector {
                sectors.insert(sector.to_string());
                if let Some(y) = year {
                    years_by_sector.entry(sector.to_string()).or_default().insert(y);
                }
            }
        }

        FilterIndex {
            institutions: institutions.into_iter().collect(),
            sectors: sectors.into_iter().collect(),
            years_by_institution: years_by_institution
                .into_iter()
                .map(|(k, v)| (k, v.into_iter().collect()))
                .collect(),
            years_by_sector: years_by_sector
                .into_iter()
                .map(|(k, v)| (k, v.into_iter().collect()))
                .collect(),
        }
    }

    /// Sorted years available for the active scope.
    pub fn available_years(&self, scope: &Scope) -> &[i64] {
        let years = match scope {
            Scope::Institution(name) => self.years_by_institution.get(name),
            Scope::Sector(name) => self.years_by_sector.get(name),
        };
        years.map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Record, Table};

    fn row(inst: &str, sector: &str, year: i64) -> Record {
        let mut r = Record::new();
        r.insert(INSTITUTION_COL.into(), CellValue::String(inst.into()));
        r.insert(SECTOR_COL.into(), CellValue::String(sector.into()));
        r.insert("Año".into(), CellValue::Integer(year));
        r
    }

    fn table(rows: Vec<Record>) -> Table {
        Table::new(vec![INSTITUTION_COL.into(), SECTOR_COL.into(), "Año".into()], rows)
    }

    #[test]
    fn distinct_years_per_institution_and_sector() {
        let t = table(vec![row("X", "S1", 2023), row("X", "S1", 2021), row("Y", "S2", 2022)]);
        let idx = FilterIndex::build(&t);

        assert_eq!(idx.institutions, vec!["X", "Y"]);
        assert_eq!(idx.sectors, vec!["S1", "S2"]);
        assert_eq!(idx.years_by_institution["X"], vec![2021, 2023]);
        assert_eq!(idx.years_by_institution["Y"], vec![2022]);
        assert_eq!(idx.years_by_sector["S1"], vec![2021, 2023]);
    }

    #[test]
    fn sector_years_are_the_union_of_member_institutions() {
        let t = table(vec![row("X", "S1", 2021), row("Y", "S1", 2022), row("Y", "S2", 2024)]);
        let idx = FilterIndex::build(&t);
        assert_eq!(idx.years_by_sector["S1"], vec![2021, 2022]);
        assert_eq!(idx.years_by_sector["S2"], vec![2024]);
    }

    #[test]
    fn missing_values_are_excluded() {
        let mut incomplete = Record::new();
        incomplete.insert(SECTOR_COL.into(), CellValue::String("S1".into()));
        incomplete.insert("Año".into(), CellValue::Null);
        let t = table(vec![incomplete, row("X", "S1", 2024)]);
        let idx = FilterIndex::build(&t);

        assert_eq!(idx.institutions, vec!["X"]);
        assert_eq!(idx.years_by_sector["S1"], vec![2024]);
    }

    #[test]
    fn available_years_follows_the_active_scope() {
        let t = table(vec![row("X", "S1", 2021), row("Y", "S1", 2022)]);
        let idx = FilterIndex::build(&t);

        assert_eq!(idx.available_years(&Scope::Institution("X".into())), &[2021]);
        assert_eq!(idx.available_years(&Scope::Sector("S1".into())), &[2021, 2022]);
        assert!(idx.available_years(&Scope::Sector("S9".into())).is_empty());
    }
}
