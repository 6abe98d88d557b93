use super::model::{CellValue, Record, Table, INSTITUTION_COL, SECTOR_COL, YEAR_COL};

// ---------------------------------------------------------------------------
// Table normalization
// ---------------------------------------------------------------------------

/// Clean one freshly parsed table. Idempotent: normalizing an already
/// normalized table returns an identical one.
///
/// Steps, in order:
/// 1. trim whitespace from column names;
/// 2. if an `Año` column exists, drop rows whose value is the literal header
///    string (duplicated header rows from concatenated sheets) and coerce the
///    remaining values to numbers, mapping unparseable values to `Null`;
/// 3. coerce `Institución` / `Sector` to trimmed text where present.
pub fn normalize_table(table: &Table) -> Table {
    let columns: Vec<String> = table.columns.iter().map(|c| c.trim().to_string()).collect();
    let has_year = columns.iter().any(|c| c == YEAR_COL);

    let mut rows = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let mut out = Record::new();
        for (col, value) in row {
            out.insert(col.trim().to_string(), value.clone());
        }

        if has_year {
            let year = out.get(YEAR_COL).cloned().unwrap_or(CellValue::Null);
            // A repeated header row carries the column name as its value.
            if matches!(&year, CellValue::String(s) if s.trim() == YEAR_COL) {
                continue;
            }
            out.insert(YEAR_COL.to_string(), coerce_year(&year));
        }

        for col in [INSTITUTION_COL, SECTOR_COL] {
            if let Some(v) = out.get(col) {
                out.insert(col.to_string(), coerce_text(v));
            }
        }

        rows.push(out);
    }

    Table::new(columns, rows)
}

fn coerce_year(value: &CellValue) -> CellValue {
    match value {
        CellValue::Integer(_) | CellValue::Float(_) => value.clone(),
        CellValue::String(s) => {
            let t = s.trim();
            if let Ok(i) = t.parse::<i64>() {
                CellValue::Integer(i)
            } else if let Ok(f) = t.parse::<f64>() {
                CellValue::Float(f)
            } else {
                CellValue::Null
            }
        }
        _ => CellValue::Null,
    }
}

fn coerce_text(value: &CellValue) -> CellValue {
    match value {
        CellValue::Null => CellValue::Null,
        other => CellValue::String(other.as_text().trim().to_string()),
    }
}

/// Year of a normalized row, if present and numeric.
pub fn row_year(row: &Record) -> Option<i64> {
    match row.get(YEAR_COL)? {
        CellValue::Integer(i) => Some(*i),
        CellValue::Float(f) => Some(*f as i64),
        _ => None,
    }
}

/// Trimmed text value of a normalized row column, `None` when missing/null.
pub fn row_text<'r>(row: &'r Record, col: &str) -> Option<&'r str> {
    match row.get(col)? {
        CellValue::String(s) => Some(s.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_table() -> Table {
        let columns = vec![" Año ".to_string(), "Institución".to_string(), "Sector".to_string()];
        let mk = |year: CellValue, inst: &str, sector: &str| {
            let mut r = Record::new();
            r.insert(" Año ".into(), year);
            r.insert("Institución".into(), CellValue::String(inst.into()));
            r.insert("Sector".into(), CellValue::String(sector.into()));
            r
        };
        Table::new(
            columns,
            vec![
                mk(CellValue::String("2024".into()), "  IMSS ", "Salud"),
                mk(CellValue::String("Año".into()), "Institución", "Sector"),
                mk(CellValue::String("???".into()), "ISSSTE", " Salud "),
            ],
        )
    }

    #[test]
    fn trims_headers_and_drops_repeated_header_rows() {
        let table = normalize_table(&raw_table());
        assert_eq!(table.columns[0], "Año");
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0]["Institución"], CellValue::String("IMSS".into()));
        assert_eq!(table.rows[1]["Sector"], CellValue::String("Salud".into()));
    }

    #[test]
    fn coerces_year_and_maps_garbage_to_null() {
        let table = normalize_table(&raw_table());
        assert_eq!(table.rows[0]["Año"], CellValue::Integer(2024));
        assert_eq!(table.rows[1]["Año"], CellValue::Null);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_table(&raw_table());
        let twice = normalize_table(&once);
        assert_eq!(once.columns, twice.columns);
        assert_eq!(once.rows, twice.rows);
    }

    #[test]
    fn tables_without_known_columns_pass_through() {
        let mut r = Record::new();
        r.insert("Registradas".into(), CellValue::Integer(3));
        let table = Table::new(vec!["Registradas".into()], vec![r]);
        let normalized = normalize_table(&table);
        assert_eq!(normalized.rows, table.rows);
    }
}
