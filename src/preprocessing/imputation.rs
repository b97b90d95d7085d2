//! Заполнение пропусков медианами

use std::collections::HashMap;

use super::stats::nan_median;
use crate::types::{Observation, OPERATIONAL_COLUMNS, RATIO_COLUMNS};

pub struct Imputer;

impl Imputer {
    /// Коэффициенты -> медиана внутри департамента,
    /// операционные показатели -> глобальная медиана.
    pub fn clean_and_impute(rows: &mut [Observation]) {
        Self::impute_by_department(rows, &RATIO_COLUMNS);
        Self::impute_global(rows, &OPERATIONAL_COLUMNS);
    }

    pub fn impute_by_department(rows: &mut [Observation], columns: &[&str]) {
        // Индексы строк по департаментам; строки без департамента не входят ни в одну группу
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            if row.department.trim().is_empty() {
                continue;
            }
            groups.entry(row.department.clone()).or_default().push(i);
        }

        for (department, indices) in &groups {
            for &column in columns {
                let median = nan_median(indices.iter().filter_map(|&i| rows[i].value(column)));
                if median.is_nan() {
                    // Весь столбец в группе пустой: оставляем как есть
                    continue;
                }

                let mut filled = 0usize;
                for &i in indices {
                    if let Some(value) = rows[i].value_mut(column) {
                        if value.is_nan() {
                            *value = median;
                            filled += 1;
                        }
                    }
                }

                if filled > 0 {
                    tracing::debug!(
                        "Imputed {} values of {} in department {} with median {:.4}",
                        filled,
                        column,
                        department,
                        median
                    );
                }
            }
        }
    }

    pub fn impute_global(rows: &mut [Observation], columns: &[&str]) {
        for &column in columns {
            let median = nan_median(rows.iter().filter_map(|r| r.value(column)));
            if median.is_nan() {
                continue;
            }

            for row in rows.iter_mut() {
                if let Some(value) = row.value_mut(column) {
                    if value.is_nan() {
                        *value = median;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawObservation;

    fn row(department: &str, roa: Option<f64>, plantilla: Option<f64>) -> Observation {
        Observation::from(RawObservation {
            unit_id: "U".to_string(),
            department: department.to_string(),
            period_id: None,
            ingresos: Some(100.0),
            gastos: Some(80.0),
            activos: Some(50.0),
            pasivos: Some(25.0),
            ebit: Some(20.0),
            roa,
            roe: Some(0.1),
            margen_explotacion: Some(0.2),
            endeudamiento: Some(0.5),
            indice_rentabilidad: Some(0.05),
            plantilla,
            costes_fijos: Some(30.0),
            costes_variables: Some(40.0),
            crecimiento_ingresos: Some(0.02),
        })
    }

    #[test]
    fn ratios_use_department_median() {
        let mut rows = vec![
            row("Ventas", Some(0.10), Some(10.0)),
            row("Ventas", Some(0.30), Some(10.0)),
            row("Ventas", None, Some(10.0)),
            row("IT", Some(0.90), Some(10.0)),
            row("IT", None, Some(10.0)),
        ];

        Imputer::clean_and_impute(&mut rows);

        assert!((rows[2].roa - 0.20).abs() < 1e-12);
        assert!((rows[4].roa - 0.90).abs() < 1e-12);
    }

    #[test]
    fn all_missing_group_stays_missing() {
        let mut rows = vec![row("Legal", None, Some(1.0)), row("IT", Some(0.5), Some(1.0))];

        Imputer::clean_and_impute(&mut rows);

        assert!(rows[0].roa.is_nan());
        assert_eq!(rows[1].roa, 0.5);
    }

    #[test]
    fn rows_without_department_are_not_grouped() {
        let mut rows = vec![
            row("", Some(0.40), Some(1.0)),
            row("", None, Some(1.0)),
            row("IT", Some(0.10), Some(1.0)),
        ];

        Imputer::clean_and_impute(&mut rows);

        assert!(rows[1].roa.is_nan());
        assert_eq!(rows[0].roa, 0.40);
    }

    #[test]
    fn operational_columns_use_global_median() {
        let mut rows = vec![
            row("Ventas", Some(0.1), Some(10.0)),
            row("IT", Some(0.1), Some(30.0)),
            row("IT", Some(0.1), None),
        ];

        Imputer::clean_and_impute(&mut rows);

        assert_eq!(rows[2].plantilla, 20.0);
    }
}
