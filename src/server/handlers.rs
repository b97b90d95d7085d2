use std::collections::HashMap;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};

use super::page::{self, Outcome};
use super::AppState;
use crate::error::PipelineError;
use crate::inference::{self, INPUT_FIELDS};
use crate::types::PredictionOutput;

pub async fn index() -> Html<String> {
    Html(page::render(&HashMap::new(), None))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Форма всегда отправляет все поля: пустое или отсутствующее поле - ошибка,
/// нечисловое значение - тоже. Посторонние ключи игнорируются.
fn parse_form(form: &HashMap<String, String>) -> Result<HashMap<String, f64>, String> {
    let mut inputs = HashMap::new();
    for field in &INPUT_FIELDS {
        let raw = form.get(field.name).map(|v| v.trim()).unwrap_or("");
        if raw.is_empty() {
            return Err(format!("{}: campo obligatorio", field.label));
        }
        let value: f64 = raw
            .parse()
            .map_err(|_| format!("{}: '{raw}' no es un número válido", field.label))?;
        inputs.insert(field.name.to_string(), value);
    }
    Ok(inputs)
}

pub async fn evaluate_form(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    tracing::info!("Form submission with {} fields", form.len());

    let outcome = match parse_form(&form) {
        Ok(inputs) => match inference::assess(&state.model, &state.config, &inputs) {
            Ok(output) => {
                tracing::info!(
                    "Prediction {} (p = {:.4})",
                    output.prediction,
                    output.probability
                );
                Outcome::Prediction(output)
            }
            Err(PipelineError::InvalidInput(reason)) => Outcome::Invalid(reason),
            Err(e) => {
                tracing::error!("Prediction error: {}", e);
                let html = page::render(&form, Some(&Outcome::Invalid(e.to_string())));
                return (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response();
            }
        },
        Err(reason) => Outcome::Invalid(reason),
    };

    let status = match &outcome {
        Outcome::Prediction(_) => StatusCode::OK,
        Outcome::Invalid(reason) => {
            tracing::warn!("Form input rejected: {}", reason);
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };
    (status, Html(page::render(&form, Some(&outcome)))).into_response()
}

pub async fn predict(
    State(state): State<AppState>,
    Json(inputs): Json<HashMap<String, f64>>,
) -> Result<Json<PredictionOutput>, (StatusCode, Json<serde_json::Value>)> {
    tracing::info!("Predict request: {} fields", inputs.len());

    inference::assess(&state.model, &state.config, &inputs)
        .map(Json)
        .map_err(|e| {
            let status = match e {
                PipelineError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            tracing::warn!("Predict request rejected: {}", e);
            (status, Json(serde_json::json!({ "error": e.to_string() })))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> HashMap<String, String> {
        INPUT_FIELDS
            .iter()
            .map(|f| (f.name.to_string(), f.default.to_string()))
            .collect()
    }

    #[test]
    fn complete_form_is_parsed() {
        let mut form = filled_form();
        form.insert("Ingresos".to_string(), " 1500.5 ".to_string());
        form.insert("csrf".to_string(), "ignored".to_string());

        let inputs = parse_form(&form).unwrap();

        assert_eq!(inputs.len(), INPUT_FIELDS.len());
        assert_eq!(inputs["Ingresos"], 1500.5);
        assert_eq!(inputs["Plantilla"], 200.0);
    }

    #[test]
    fn blank_headcount_is_rejected() {
        let mut form = filled_form();
        form.insert("Plantilla".to_string(), "  ".to_string());

        let err = parse_form(&form).unwrap_err();
        assert!(err.contains("Plantilla"));
    }

    #[test]
    fn missing_field_is_rejected() {
        let mut form = filled_form();
        form.remove("Solvencia");

        let err = parse_form(&form).unwrap_err();
        assert!(err.contains("Solvencia"));
    }

    #[test]
    fn non_numeric_field_is_rejected() {
        let mut form = filled_form();
        form.insert("Plantilla".to_string(), "doscientos".to_string());

        let err = parse_form(&form).unwrap_err();
        assert!(err.contains("Plantilla"));
    }
}
