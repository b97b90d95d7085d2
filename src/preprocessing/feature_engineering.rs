//! Feature engineering и эвристическая целевая метка

use super::stats::nan_quantile;
use crate::types::{LabelThresholds, Observation};

pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Производные коэффициенты. Деление по правилам IEEE:
    /// x/0 -> ±inf, 0/0 -> NaN, пропуски распространяются.
    pub fn add_ratio_features(rows: &mut [Observation]) {
        for row in rows.iter_mut() {
            row.ingresos_por_empleado = row.ingresos / row.plantilla;
            row.ratio_gastos_ingresos = row.gastos / row.ingresos;
            row.margen_operativo = row.ebit / row.ingresos;
            row.solvencia = row.activos / row.pasivos;

            row.costes_totales = row.costes_fijos + row.costes_variables;
            row.peso_costes_fijos = row.costes_fijos / row.costes_totales;
        }
    }

    /// Пороги по всему датасету: нижний квартиль маржи и рентабельности,
    /// верхний квартиль долговой нагрузки.
    pub fn label_thresholds(rows: &[Observation]) -> LabelThresholds {
        LabelThresholds {
            margen_explotacion_q25: nan_quantile(rows.iter().map(|r| r.margen_explotacion), 0.25),
            indice_rentabilidad_q25: nan_quantile(rows.iter().map(|r| r.indice_rentabilidad), 0.25),
            endeudamiento_q75: nan_quantile(rows.iter().map(|r| r.endeudamiento), 0.75),
        }
    }

    /// Сравнение с NaN всегда ложно, поэтому строки с пропусками получают 0
    pub fn is_at_risk(row: &Observation, thresholds: &LabelThresholds) -> bool {
        row.margen_explotacion <= thresholds.margen_explotacion_q25
            && row.indice_rentabilidad <= thresholds.indice_rentabilidad_q25
            && row.endeudamiento >= thresholds.endeudamiento_q75
    }

    pub fn create_target(rows: &mut [Observation]) -> LabelThresholds {
        let thresholds = Self::label_thresholds(rows);

        let mut positives = 0usize;
        for row in rows.iter_mut() {
            let at_risk = Self::is_at_risk(row, &thresholds);
            positives += at_risk as usize;
            row.riesgo_deterioro = Some(at_risk as u8);
        }

        tracing::info!(
            "Target created: {} of {} units flagged (margen<={:.4}, rentabilidad<={:.4}, endeudamiento>={:.4})",
            positives,
            rows.len(),
            thresholds.margen_explotacion_q25,
            thresholds.indice_rentabilidad_q25,
            thresholds.endeudamiento_q75
        );

        thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawObservation;

    fn observation(margen: f64, rent: f64, endeud: f64) -> Observation {
        Observation::from(RawObservation {
            unit_id: "U1".to_string(),
            department: "Ventas".to_string(),
            period_id: Some("2024Q1".to_string()),
            ingresos: Some(20000.0),
            gastos: Some(15000.0),
            activos: Some(18000.0),
            pasivos: Some(10000.0),
            ebit: Some(4000.0),
            roa: Some(0.05),
            roe: Some(0.10),
            margen_explotacion: Some(margen),
            endeudamiento: Some(endeud),
            indice_rentabilidad: Some(rent),
            plantilla: Some(200.0),
            costes_fijos: Some(6000.0),
            costes_variables: Some(9000.0),
            crecimiento_ingresos: Some(0.08),
        })
    }

    #[test]
    fn ratios_follow_their_definitions() {
        let mut rows = vec![observation(0.2, 0.02, 0.6)];
        FeatureEngineer::add_ratio_features(&mut rows);
        let r = &rows[0];

        assert_eq!(r.ingresos_por_empleado, 100.0);
        assert_eq!(r.ratio_gastos_ingresos, 0.75);
        assert_eq!(r.margen_operativo, 0.2);
        assert_eq!(r.solvencia, 1.8);
        assert_eq!(r.costes_totales, 15000.0);
        assert_eq!(r.peso_costes_fijos, 0.4);
    }

    #[test]
    fn zero_denominators_follow_float_semantics() {
        let mut row = observation(0.2, 0.02, 0.6);
        row.pasivos = 0.0;
        row.ingresos = 0.0;
        row.gastos = 0.0;
        let mut rows = vec![row];
        FeatureEngineer::add_ratio_features(&mut rows);

        assert_eq!(rows[0].solvencia, f64::INFINITY);
        assert!(rows[0].ratio_gastos_ingresos.is_nan());
    }

    #[test]
    fn missing_inputs_propagate() {
        let mut row = observation(0.2, 0.02, 0.6);
        row.plantilla = f64::NAN;
        let mut rows = vec![row];
        FeatureEngineer::add_ratio_features(&mut rows);

        assert!(rows[0].ingresos_por_empleado.is_nan());
        assert_eq!(rows[0].solvencia, 1.8);
    }

    #[test]
    fn label_matches_quantile_thresholds() {
        let mut rows = vec![
            observation(0.01, 0.01, 0.95),
            observation(0.10, 0.05, 0.70),
            observation(0.20, 0.10, 0.50),
            observation(0.30, 0.15, 0.40),
            observation(0.40, 0.20, 0.30),
        ];

        let thresholds = FeatureEngineer::create_target(&mut rows);

        assert!((thresholds.margen_explotacion_q25 - 0.10).abs() < 1e-12);
        assert!((thresholds.indice_rentabilidad_q25 - 0.05).abs() < 1e-12);
        assert!((thresholds.endeudamiento_q75 - 0.70).abs() < 1e-12);

        let labels: Vec<u8> = rows.iter().map(|r| r.riesgo_deterioro.unwrap()).collect();
        assert_eq!(labels, vec![1, 1, 0, 0, 0]);

        for row in &rows {
            let expected = row.margen_explotacion <= thresholds.margen_explotacion_q25
                && row.indice_rentabilidad <= thresholds.indice_rentabilidad_q25
                && row.endeudamiento >= thresholds.endeudamiento_q75;
            assert_eq!(row.riesgo_deterioro, Some(expected as u8));
        }
    }

    #[test]
    fn missing_ratio_is_never_at_risk() {
        let mut rows = vec![
            observation(f64::NAN, 0.01, 0.95),
            observation(0.10, 0.05, 0.70),
            observation(0.20, 0.10, 0.50),
        ];
        FeatureEngineer::create_target(&mut rows);
        assert_eq!(rows[0].riesgo_deterioro, Some(0));
    }
}
