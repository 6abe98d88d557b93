use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Well-known column names (source schema, kept verbatim)
// ---------------------------------------------------------------------------

pub const YEAR_COL: &str = "Año";
pub const INSTITUTION_COL: &str = "Institución";
pub const SECTOR_COL: &str = "Sector";
pub const ACRONYM_COL: &str = "Siglas";

// ---------------------------------------------------------------------------
// CellValue – a single cell of a loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common spreadsheet dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text for simplicity.
    Date(String),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => {
                if v.fract() == 0.0 {
                    write!(f, "{v:.0}")
                } else {
                    write!(f, "{v}")
                }
            }
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Like [`as_f64`](Self::as_f64) but also coerces numeric-looking text,
    /// the way the source sheets ship percentages as strings.
    pub fn coerce_f64(&self) -> Option<f64> {
        match self {
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            other => other.as_f64(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text content, empty string for `Null`.
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

// ---------------------------------------------------------------------------
// Record / Table – one loaded dataset
// ---------------------------------------------------------------------------

/// One row of a dataset: column name → cell value.
pub type Record = BTreeMap<String, CellValue>;

/// A loaded tabular dataset with its column order preserved.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Ordered column names as they appeared in the file.
    pub columns: Vec<String>,
    /// All rows.
    pub rows: Vec<Record>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Table { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

// ---------------------------------------------------------------------------
// The four SICOIN datasets
// ---------------------------------------------------------------------------

/// Logical dataset names, in loading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetName {
    /// Risk and control-action work program (primary dataset).
    Ptar,
    /// Per-action risk/action descriptions.
    Actri,
    /// Internal-control work program (NGCI compliance).
    Ptci,
    /// Improvement-action detail.
    Amtri,
}

impl DatasetName {
    pub const ALL: [DatasetName; 4] = [
        DatasetName::Ptar,
        DatasetName::Actri,
        DatasetName::Ptci,
        DatasetName::Amtri,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetName::Ptar => "PTAR",
            DatasetName::Actri => "ACTRI",
            DatasetName::Ptci => "PTCI",
            DatasetName::Amtri => "AMTRI",
        }
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four normalized datasets, loaded together and shared immutably.
#[derive(Debug, Clone, Default)]
pub struct DatasetBundle {
    pub ptar: Table,
    pub actri: Table,
    pub ptci: Table,
    pub amtri: Table,
}

impl DatasetBundle {
    pub fn set(&mut self, name: DatasetName, table: Table) {
        match name {
            DatasetName::Ptar => self.ptar = table,
            DatasetName::Actri => self.actri = table,
            DatasetName::Ptci => self.ptci = table,
            DatasetName::Amtri => self.amtri = table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_f64_handles_text_percentages() {
        assert_eq!(CellValue::String(" 65.5 ".into()).coerce_f64(), Some(65.5));
        assert_eq!(CellValue::Integer(7).coerce_f64(), Some(7.0));
        assert_eq!(CellValue::String("n/a".into()).coerce_f64(), None);
        assert_eq!(CellValue::Null.coerce_f64(), None);
    }

    #[test]
    fn display_is_empty_for_null() {
        assert_eq!(CellValue::Null.as_text(), "");
        assert_eq!(CellValue::Float(50.0).as_text(), "50");
        assert_eq!(CellValue::Float(65.5).as_text(), "65.5");
    }
}
