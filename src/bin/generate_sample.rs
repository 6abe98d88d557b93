use std::path::Path;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform integer in `0..bound`.
    fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Split `total` into `n` non-negative parts that sum back to `total`.
fn distribute(rng: &mut SimpleRng, total: i64, n: usize) -> Vec<i64> {
    let mut parts = vec![0i64; n];
    for _ in 0..total {
        let i = rng.below(n as u64) as usize;
        parts[i] += 1;
    }
    parts
}

const RISK_CATEGORIES: [&str; 14] = [
    "Sustantivo", "Administrativo", "Financiero", "Presupuestal", "Servicios",
    "Seguridad", "Obra_Pública", "Recursos_Humanos", "Imagen", "TICs", "Salud",
    "Otro", "Corrupción", "Legal",
];
const QUADRANTS: [&str; 4] = ["I", "II", "III", "IV"];
const STRATEGIES: [&str; 5] = ["Evitar", "Reducir", "Asumir", "Transferir", "Compartir"];

/// (institution, sector, acronym)
const INSTITUTIONS: [(&str, &str, &str); 6] = [
    ("Secretaría de Salud", "Salud", "SSA"),
    ("Hospital General del Estado", "Salud", "HGE"),
    ("Secretaría de Educación", "Educación", "SED"),
    ("Universidad Tecnológica", "Educación", "UTE"),
    ("Secretaría de Finanzas", "Hacienda", "SFI"),
    ("Tesorería Estatal", "Hacienda", "TES"),
];

const YEARS: [i64; 2] = [2023, 2024];

/// The one institution whose ACTRI rows deliberately disagree with its
/// `AC_Total`, so the consistency warning has something to fire on.
const MISMATCHED_ACRONYM: &str = "TES";

/// Per-quarter action snapshot: the three counts sum to the action total.
struct QuarterSnapshot {
    no_progress: i64,
    in_progress: i64,
    completed: i64,
    compliance: f64,
}

fn quarter_snapshots(rng: &mut SimpleRng, total_actions: i64) -> [QuarterSnapshot; 4] {
    let mut completed = 0i64;
    std::array::from_fn(|_| {
        let remaining = total_actions - completed;
        completed += rng.below((remaining + 1) as u64) as i64;
        let in_progress = rng.below((total_actions - completed + 1) as u64) as i64;
        let no_progress = total_actions - completed - in_progress;
        let compliance = if total_actions == 0 {
            0.0
        } else {
            let base = completed as f64 / total_actions as f64 * 100.0;
            ((base + rng.next_f64() * 5.0) * 100.0).round() / 100.0
        };
        QuarterSnapshot {
            no_progress,
            in_progress,
            completed,
            compliance: compliance.min(100.0),
        }
    })
}

fn write_ptar(path: &Path, rng: &mut SimpleRng) -> Vec<(String, String, String, i64, i64)> {
    let mut headers: Vec<String> = ["Año", "Institución", "Sector", "Siglas"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    headers.extend(RISK_CATEGORIES.iter().map(|c| c.to_string()));
    headers.extend(QUADRANTS.iter().map(|c| c.to_string()));
    headers.extend(STRATEGIES.iter().map(|c| c.to_string()));
    headers.push("Riesgos_Totales".to_string());
    headers.push("AC_Total".to_string());
    for q in 1..=4 {
        for stem in ["Sin_Avances", "En_Proceso", "Concluidas", "Cumplimiento"] {
            headers.push(format!("{q}{stem}"));
        }
    }

    let mut writer = csv::Writer::from_path(path).expect("Failed to create PTAR.csv");
    writer.write_record(&headers).expect("Failed to write PTAR header");

    // (institution, sector, acronym, year, action count) for the other sheets.
    let mut plans = Vec::new();

    for &(institution, sector, acronym) in &INSTITUTIONS {
        for &year in &YEARS {
            let risks: Vec<i64> = (0..RISK_CATEGORIES.len())
                .map(|_| rng.below(4) as i64)
                .collect();
            let total_risks: i64 = risks.iter().sum();
            let quadrants = distribute(rng, total_risks, QUADRANTS.len());
            let strategies = distribute(rng, total_risks, STRATEGIES.len());
            let total_actions = total_risks + rng.below(4) as i64;
            let quarters = quarter_snapshots(rng, total_actions);

            let mut record: Vec<String> = vec![
                year.to_string(),
                institution.to_string(),
                sector.to_string(),
                acronym.to_string(),
            ];
            record.extend(risks.iter().map(|v| v.to_string()));
            record.extend(quadrants.iter().map(|v| v.to_string()));
            record.extend(strategies.iter().map(|v| v.to_string()));
            record.push(total_risks.to_string());
            record.push(total_actions.to_string());
            for q in &quarters {
                record.push(q.no_progress.to_string());
                record.push(q.in_progress.to_string());
                record.push(q.completed.to_string());
                record.push(format!("{:.2}", q.compliance));
            }
            writer.write_record(&record).expect("Failed to write PTAR row");

            plans.push((
                institution.to_string(),
                sector.to_string(),
                acronym.to_string(),
                year,
                total_actions,
            ));
        }
    }
    writer.flush().expect("Failed to flush PTAR.csv");
    plans
}

fn write_actri(path: &Path, rng: &mut SimpleRng, plans: &[(String, String, String, i64, i64)]) {
    let headers = [
        "Año", "Institución", "Sector", "Siglas", "Riesgo",
        "Descripción_del_Riesgo", "AC", "Descripcion",
        "Avance_Institución", "Avance_OIC",
    ];
    let mut writer = csv::Writer::from_path(path).expect("Failed to create ACTRI.csv");
    writer.write_record(headers).expect("Failed to write ACTRI header");

    for (institution, sector, acronym, year, total_actions) in plans {
        // One institution reports one action fewer than its PTAR total.
        let rows = if acronym == MISMATCHED_ACRONYM {
            (total_actions - 1).max(0)
        } else {
            *total_actions
        };
        for i in 0..rows {
            let risk_no = i / 2 + 1;
            let progress = (rng.next_f64() * 100.0 * 100.0).round() / 100.0;
            let oversight = (progress * (0.8 + rng.next_f64() * 0.2) * 100.0).round() / 100.0;
            writer
                .write_record([
                    year.to_string(),
                    institution.clone(),
                    sector.clone(),
                    acronym.clone(),
                    format!("R-{risk_no:02}"),
                    format!("Riesgo institucional {risk_no} de {acronym}"),
                    format!("AC-{:02}", i + 1),
                    format!("Acción de control {} para el riesgo {risk_no}", i + 1),
                    format!("{progress:.2}"),
                    format!("{oversight:.2}"),
                ])
                .expect("Failed to write ACTRI row");
        }
    }
    writer.flush().expect("Failed to flush ACTRI.csv");
}

fn write_ptci(path: &Path, rng: &mut SimpleRng) {
    let mut headers: Vec<String> = [
        "Año", "Institución", "Sector", "Siglas",
        "Cumplimiento_General_de_las_NGCI",
        "Informe_Anual_Finalizado", "SUBIO_ARCHIVO",
        "Se_Actualizó_el_Programa", "No_Se_Actualizó_el_Programa",
        "Acciones_de_Mejora_Programa_Original",
        "TotalAcciones_de_Mejora_Programa_Actualizado",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();
    for q in 1..=4 {
        for stem in ["Sin_Avances", "En_Proceso", "Concluidas", "Cumplimiento"] {
            headers.push(format!("{q}{stem}"));
        }
    }

    let mut writer = csv::Writer::from_path(path).expect("Failed to create PTCI.csv");
    writer.write_record(&headers).expect("Failed to write PTCI header");

    for &(institution, sector, acronym) in &INSTITUTIONS {
        for &year in &YEARS {
            let original = 2 + rng.below(5) as i64;
            let updated = rng.below(2) == 1;
            let total = if updated {
                original + rng.below(3) as i64
            } else {
                original
            };
            let ngci = 60.0 + rng.next_f64() * 40.0;
            let quarters = quarter_snapshots(rng, total);

            let mut record: Vec<String> = vec![
                year.to_string(),
                institution.to_string(),
                sector.to_string(),
                acronym.to_string(),
                format!("{:.2}", (ngci * 100.0).round() / 100.0),
                "Sí".to_string(),
                if rng.below(5) > 0 { "Sí" } else { "No" }.to_string(),
                if updated { "Sí" } else { "No" }.to_string(),
                if updated { "No" } else { "Sí" }.to_string(),
                original.to_string(),
                total.to_string(),
            ];
            for q in &quarters {
                record.push(q.no_progress.to_string());
                record.push(q.in_progress.to_string());
                record.push(q.completed.to_string());
                record.push(format!("{:.2}", q.compliance));
            }
            writer.write_record(&record).expect("Failed to write PTCI row");
        }
    }
    writer.flush().expect("Failed to flush PTCI.csv");
}

fn write_amtri(path: &Path, rng: &mut SimpleRng) {
    let headers = [
        "Año", "Trimestre", "Institución", "Sector", "Siglas",
        "Procesos", "AM", "Descripcion", "Fecha_Inicio", "Fecha_Termino",
        "Avance_Institución", "Avance_OIC",
        "¿Evaluado?", "¿Favorable?", "¿AM_Congruete?", "¿Contribuye?",
        "Registradas", "Localizadas", "No_localizadas",
        "Suficientes", "Parcielmente_Suficientes", "Insuficientes",
    ];
    let mut writer = csv::Writer::from_path(path).expect("Failed to create AMTRI.csv");
    writer.write_record(headers).expect("Failed to write AMTRI header");

    for &(institution, sector, acronym) in &INSTITUTIONS {
        for &year in &YEARS {
            for quarter in 1..=4i64 {
                let actions = 1 + rng.below(3) as i64;
                for i in 0..actions {
                    let registered = 1 + rng.below(3) as i64;
                    let located = rng.below((registered + 1) as u64) as i64;
                    let sufficient = rng.below((located + 1) as u64) as i64;
                    let partial = rng.below((located - sufficient + 1) as u64) as i64;
                    let progress = (rng.next_f64() * 100.0).round();
                    writer
                        .write_record([
                            year.to_string(),
                            quarter.to_string(),
                            institution.to_string(),
                            sector.to_string(),
                            acronym.to_string(),
                            format!("Proceso {}", i + 1),
                            format!("AM-{quarter}{:02}", i + 1),
                            format!("Acción de mejora {} del trimestre {quarter}", i + 1),
                            format!("{year}-0{quarter}-01"),
                            format!("{year}-12-31"),
                            format!("{progress:.0}"),
                            format!("{:.0}", (progress * 0.9).round()),
                            "Sí".to_string(),
                            if rng.below(4) > 0 { "Sí" } else { "No" }.to_string(),
                            "Sí".to_string(),
                            "Sí".to_string(),
                            registered.to_string(),
                            located.to_string(),
                            (registered - located).to_string(),
                            sufficient.to_string(),
                            partial.to_string(),
                            (located - sufficient - partial).to_string(),
                        ])
                        .expect("Failed to write AMTRI row");
                }
            }
        }
    }
    writer.flush().expect("Failed to flush AMTRI.csv");
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let out_dir = Path::new("demo_data");
    std::fs::create_dir_all(out_dir).expect("Failed to create demo_data/");

    let plans = write_ptar(&out_dir.join("PTAR.csv"), &mut rng);
    write_actri(&out_dir.join("ACTRI.csv"), &mut rng, &plans);
    write_ptci(&out_dir.join("PTCI.csv"), &mut rng);
    write_amtri(&out_dir.join("AMTRI.csv"), &mut rng);

    println!(
        "Wrote PTAR ({} rows), ACTRI, PTCI and AMTRI to {}",
        plans.len(),
        out_dir.display()
    );
}
