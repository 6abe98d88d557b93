// Fixed column vocabularies of the SICOIN sheets. Order matters: the
// projections in the dashboard tables follow these slices verbatim.

/// Risk-category count columns (PTAR).
pub const RISK_CATEGORIES: [&str; 14] = [
    "Sustantivo",
    "Administrativo",
    "Financiero",
    "Presupuestal",
    "Servicios",
    "Seguridad",
    "Obra_Pública",
    "Recursos_Humanos",
    "Imagen",
    "TICs",
    "Salud",
    "Otro",
    "Corrupción",
    "Legal",
];

/// Risk quadrant count columns (PTAR).
pub const QUADRANTS: [&str; 4] = ["I", "II", "III", "IV"];

/// Risk-strategy count columns (PTAR).
pub const STRATEGIES: [&str; 5] = ["Evitar", "Reducir", "Asumir", "Transferir", "Compartir"];

/// Total-actions / total-risks indicator columns (PTAR).
pub const TOTAL_ACTIONS_COL: &str = "AC_Total";
pub const TOTAL_RISKS_COL: &str = "Riesgos_Totales";

/// Overall NGCI compliance column (PTCI).
pub const NGCI_COMPLIANCE_COL: &str = "Cumplimiento_General_de_las_NGCI";

/// Improvement-action program columns (PTCI).
pub const PROGRAM_ORIGINAL_COL: &str = "Acciones_de_Mejora_Programa_Original";
pub const PROGRAM_UPDATED_FLAG_COL: &str = "Se_Actualizó_el_Programa";
pub const PROGRAM_NOT_UPDATED_FLAG_COL: &str = "No_Se_Actualizó_el_Programa";
pub const PROGRAM_UPDATED_TOTAL_COL: &str = "TotalAcciones_de_Mejora_Programa_Actualizado";

/// Display label for a PTCI program column.
pub fn program_label(col: &str) -> &str {
    match col {
        PROGRAM_ORIGINAL_COL => "Programa Original de Acciones de Mejora",
        PROGRAM_UPDATED_FLAG_COL => "Se Actualizó el Programa",
        PROGRAM_NOT_UPDATED_FLAG_COL => "No Se Actualizó el Programa",
        PROGRAM_UPDATED_TOTAL_COL => "Programa Actualizado de Acciones de Mejora",
        other => other,
    }
}

/// Improvement-action registration/location/sufficiency counts (AMTRI).
pub const IMPROVEMENT_DETAIL_COLS: [&str; 6] = [
    "Registradas",
    "Localizadas",
    "No_localizadas",
    "Suficientes",
    "Parcielmente_Suficientes",
    "Insuficientes",
];

/// Columns of the PTCI per-institution breakdown table, with display labels.
pub const BREAKDOWN_COLS: [(&str, &str); 9] = [
    ("Año", "Año"),
    ("Institución", "Institución"),
    (NGCI_COMPLIANCE_COL, "Cumplimiento General NGCI"),
    ("Informe_Anual_Finalizado", "Informe Anual Finalizado"),
    ("SUBIO_ARCHIVO", "Subió Archivo"),
    (PROGRAM_UPDATED_FLAG_COL, "Programa Actualizado"),
    (PROGRAM_NOT_UPDATED_FLAG_COL, "Programa No Actualizado"),
    (PROGRAM_ORIGINAL_COL, "Acciones Mejora (Original)"),
    (PROGRAM_UPDATED_TOTAL_COL, "Acciones Mejora (Actualizado)"),
];

/// Columns of the ACTRI risk/action description table, with display labels.
pub const ACTION_DESCRIPTION_COLS: [(&str, &str); 8] = [
    ("Año", "Año"),
    ("Siglas", "Siglas"),
    ("Riesgo", "Riesgo"),
    ("Descripción_del_Riesgo", "Descripción del Riesgo"),
    ("AC", "No. de AC"),
    ("Descripcion", "Descripción"),
    ("Avance_Institución", "Avance Institución"),
    ("Avance_OIC", "Avance OIC"),
];

/// Columns of the AMTRI process/improvement-action description table.
pub const IMPROVEMENT_DESCRIPTION_COLS: [&str; 14] = [
    "Año",
    "Trimestre",
    "Siglas",
    "Procesos",
    "AM",
    "Descripcion",
    "Fecha_Inicio",
    "Fecha_Termino",
    "Avance_Institución",
    "Avance_OIC",
    "¿Evaluado?",
    "¿Favorable?",
    "¿AM_Congruete?",
    "¿Contribuye?",
];

/// AMTRI secondary-filter columns.
pub const QUARTER_COL: &str = "Trimestre";

/// Institution/oversight progress percentage columns (ACTRI and AMTRI).
pub const PROGRESS_INSTITUTION_COL: &str = "Avance_Institución";
pub const PROGRESS_OVERSIGHT_COL: &str = "Avance_OIC";

// ---------------------------------------------------------------------------
// Quarter × status addressing
// ---------------------------------------------------------------------------

/// Reporting quarter 1–4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    pub fn number(&self) -> u8 {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 2,
            Quarter::Q3 => 3,
            Quarter::Q4 => 4,
        }
    }

    pub fn index(&self) -> usize {
        self.number() as usize - 1
    }

    /// Ordinal label used in the status tables.
    pub fn label(&self) -> &'static str {
        match self {
            Quarter::Q1 => "Primero",
            Quarter::Q2 => "Segundo",
            Quarter::Q3 => "Tercero",
            Quarter::Q4 => "Cuarto",
        }
    }
}

/// Per-quarter action status. `Compliance` is a percentage and is the one
/// field that aggregates by mean under sector scope; the rest are counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    NoProgress,
    InProgress,
    Completed,
    Compliance,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::NoProgress,
        Status::InProgress,
        Status::Completed,
        Status::Compliance,
    ];

    pub fn index(&self) -> usize {
        match self {
            Status::NoProgress => 0,
            Status::InProgress => 1,
            Status::Completed => 2,
            Status::Compliance => 3,
        }
    }

    /// Column-name stem as it appears in the sheets.
    pub fn column_stem(&self) -> &'static str {
        match self {
            Status::NoProgress => "Sin_Avances",
            Status::InProgress => "En_Proceso",
            Status::Completed => "Concluidas",
            Status::Compliance => "Cumplimiento",
        }
    }

    /// Row label in the status tables.
    pub fn label(&self) -> &'static str {
        match self {
            Status::NoProgress => "Sin Avances",
            Status::InProgress => "En Proceso",
            Status::Completed => "Concluidas",
            Status::Compliance => "% de Cumplimiento",
        }
    }

    pub fn is_percentage(&self) -> bool {
        matches!(self, Status::Compliance)
    }
}

/// The one place the `"{quarter}{status}"` column naming rule lives.
pub fn quarter_status_column(quarter: Quarter, status: Status) -> String {
    format!("{}{}", quarter.number(), status.column_stem())
}

/// Whether a column holds a compliance percentage (`1Cumplimiento` …
/// `4Cumplimiento`, or the overall NGCI percentage).
pub fn is_compliance_column(name: &str) -> bool {
    name.ends_with("Cumplimiento") || name == NGCI_COMPLIANCE_COL
}

/// Per-quarter values for the four statuses, addressed by typed keys instead
/// of string concatenation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuarterStatusTable {
    values: [[f64; 4]; 4],
}

impl QuarterStatusTable {
    pub fn get(&self, quarter: Quarter, status: Status) -> f64 {
        self.values[status.index()][quarter.index()]
    }

    pub fn set(&mut self, quarter: Quarter, status: Status, value: f64) {
        self.values[status.index()][quarter.index()] = value;
    }

    /// Values for one status across the four quarters.
    pub fn row(&self, status: Status) -> [f64; 4] {
        self.values[status.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_naming_matches_the_sheet_schema() {
        assert_eq!(quarter_status_column(Quarter::Q1, Status::NoProgress), "1Sin_Avances");
        assert_eq!(quarter_status_column(Quarter::Q4, Status::Compliance), "4Cumplimiento");
    }

    #[test]
    fn compliance_columns_are_recognized() {
        assert!(is_compliance_column("3Cumplimiento"));
        assert!(is_compliance_column(NGCI_COMPLIANCE_COL));
        assert!(!is_compliance_column("AC_Total"));
    }

    #[test]
    fn table_roundtrips_by_typed_key() {
        let mut t = QuarterStatusTable::default();
        t.set(Quarter::Q2, Status::Completed, 9.0);
        assert_eq!(t.get(Quarter::Q2, Status::Completed), 9.0);
        assert_eq!(t.row(Status::Completed), [0.0, 9.0, 0.0, 0.0]);
    }
}
