//! Оценка одной бизнес-единицы по введенным показателям

use std::collections::HashMap;

use ndarray::Array2;

use crate::config::ModelConfig;
use crate::error::{PipelineError, Result};
use crate::models::RiskModel;
use crate::types::PredictionOutput;

/// Поле формы: имя колонки, подпись, значение по умолчанию и ограничения
#[derive(Debug, Clone, Copy)]
pub struct InputField {
    pub name: &'static str,
    pub label: &'static str,
    pub default: f64,
    pub min: Option<f64>,
    pub integer: bool,
}

const fn field(name: &'static str, label: &'static str, default: f64) -> InputField {
    InputField {
        name,
        label,
        default,
        min: None,
        integer: false,
    }
}

const fn non_negative(name: &'static str, label: &'static str, default: f64) -> InputField {
    InputField {
        name,
        label,
        default,
        min: Some(0.0),
        integer: false,
    }
}

pub const INPUT_FIELDS: [InputField; 20] = [
    non_negative("Ingresos", "Ingresos", 20000.0),
    non_negative("Gastos", "Gastos", 15000.0),
    non_negative("Activos", "Activos", 18000.0),
    non_negative("Pasivos", "Pasivos", 10000.0),
    field("EBIT", "EBIT", 4000.0),
    field("ROA", "ROA", 0.05),
    field("ROE", "ROE", 0.10),
    field("Margen_Explotacion", "Margen de Explotación", 0.20),
    field("Endeudamiento", "Endeudamiento", 0.60),
    field("Indice_Rentabilidad", "Índice de Rentabilidad", 0.02),
    InputField {
        name: "Plantilla",
        label: "Plantilla",
        default: 200.0,
        min: Some(1.0),
        integer: true,
    },
    field("Costes_Fijos", "Costes Fijos", 6000.0),
    field("CostesVariables", "Costes Variables", 9000.0),
    field("Crecimiento_Ingresos", "Crecimiento de Ingresos", 0.08),
    field("Ingresos_por_Empleado", "Ingresos por Empleado", 100.0),
    field("Ratio_Gastos_Ingresos", "Ratio Gastos / Ingresos", 0.75),
    field("Margen_Operativo", "Margen Operativo", 0.20),
    field("Solvencia", "Solvencia", 1.8),
    field("Costes_Totales", "Costes Totales", 15000.0),
    field("Peso_Costes_Fijos", "Peso de Costes Fijos", 0.4),
];

pub fn default_inputs() -> HashMap<String, f64> {
    INPUT_FIELDS
        .iter()
        .map(|f| (f.name.to_string(), f.default))
        .collect()
}

/// Строка признаков в порядке модели; отсутствующие признаки -> 0.0
pub fn align_input(inputs: &HashMap<String, f64>, features: &[String]) -> Array2<f64> {
    let mut row = Array2::zeros((1, features.len()));
    for (j, feature) in features.iter().enumerate() {
        if let Some(&value) = inputs.get(feature) {
            row[[0, j]] = value;
        }
    }
    row
}

pub fn validate_input(inputs: &HashMap<String, f64>) -> Result<()> {
    for (name, value) in inputs {
        if !value.is_finite() {
            return Err(PipelineError::InvalidInput(format!("{name} must be a finite number")));
        }
    }

    for field in &INPUT_FIELDS {
        let Some(&value) = inputs.get(field.name) else {
            continue;
        };
        if let Some(min) = field.min {
            if value < min {
                return Err(PipelineError::InvalidInput(format!(
                    "{} must be at least {}",
                    field.label, min
                )));
            }
        }
        if field.integer && value.fract() != 0.0 {
            return Err(PipelineError::InvalidInput(format!(
                "{} must be a whole number",
                field.label
            )));
        }
    }
    Ok(())
}

pub fn assess(model: &RiskModel, config: &ModelConfig, inputs: &HashMap<String, f64>) -> Result<PredictionOutput> {
    validate_input(inputs)?;

    let x = align_input(inputs, &config.features);
    let probability = model
        .predict_proba(&x)?
        .get(0)
        .copied()
        .ok_or_else(|| PipelineError::Shape("model returned no prediction".to_string()))?;

    let prediction = (probability >= config.threshold) as u8;
    let message = if prediction == 1 {
        "Riesgo elevado de deterioro financiero"
    } else {
        "Unidad sin señales relevantes de deterioro"
    };

    Ok(PredictionOutput {
        prediction,
        probability,
        threshold: config.threshold,
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FEATURE_COLUMNS;

    #[test]
    fn form_covers_every_feature() {
        let names: Vec<&str> = INPUT_FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(names, FEATURE_COLUMNS.to_vec());
    }

    #[test]
    fn alignment_reorders_and_zero_fills() {
        let features: Vec<String> = ["Solvencia", "Nueva_Variable", "Ingresos"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let inputs = default_inputs();

        let x = align_input(&inputs, &features);

        assert_eq!(x.shape(), &[1, 3]);
        assert_eq!(x[[0, 0]], 1.8);
        assert_eq!(x[[0, 1]], 0.0);
        assert_eq!(x[[0, 2]], 20000.0);
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_input(&default_inputs()).is_ok());
    }

    #[test]
    fn validation_rejects_out_of_range() {
        let mut inputs = default_inputs();
        inputs.insert("Plantilla".to_string(), 0.0);
        assert!(validate_input(&inputs).is_err());

        let mut inputs = default_inputs();
        inputs.insert("Plantilla".to_string(), 12.5);
        assert!(validate_input(&inputs).is_err());

        let mut inputs = default_inputs();
        inputs.insert("Pasivos".to_string(), -1.0);
        assert!(validate_input(&inputs).is_err());

        // EBIT может быть отрицательным
        let mut inputs = default_inputs();
        inputs.insert("EBIT".to_string(), -500.0);
        assert!(validate_input(&inputs).is_ok());
    }
}
