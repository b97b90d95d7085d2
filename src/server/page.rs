//! HTML страница формы

use std::collections::HashMap;
use std::fmt::Write;

use crate::inference::INPUT_FIELDS;
use crate::types::PredictionOutput;

pub const TITLE: &str = "Sistema de Alerta Temprana de Rendimiento Financiero";
pub const CAPTION: &str = "Modelo SVM entrenado como sistema de alerta temprana para la organización.";

/// Что показать под кнопкой
pub enum Outcome {
    Prediction(PredictionOutput),
    Invalid(String),
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Prediction(p) if p.prediction == 1 => format!(
            "<div class=\"alert error\">⚠️ <strong>{}</strong><br>Probabilidad estimada: <strong>{:.2}%</strong></div>\n\
             <p class=\"caption\">{}</p>",
            escape_html(&p.message),
            p.probability * 100.0,
            CAPTION
        ),
        Outcome::Prediction(p) => format!(
            "<div class=\"alert success\">✅ <strong>{}</strong><br>Probabilidad estimada de riesgo: <strong>{:.2}%</strong></div>\n\
             <p class=\"caption\">{}</p>",
            escape_html(&p.message),
            p.probability * 100.0,
            CAPTION
        ),
        Outcome::Invalid(reason) => format!(
            "<div class=\"alert warning\">{}</div>",
            escape_html(reason)
        ),
    }
}

/// Значения полей берутся из `values` (последний ввод), иначе значения по умолчанию
pub fn render(values: &HashMap<String, String>, outcome: Option<&Outcome>) -> String {
    let mut inputs = String::new();
    for field in &INPUT_FIELDS {
        let value = values
            .get(field.name)
            .cloned()
            .unwrap_or_else(|| field.default.to_string());
        let min = field
            .min
            .map(|m| format!(" min=\"{m}\""))
            .unwrap_or_default();
        let step = if field.integer { "1" } else { "any" };

        let _ = writeln!(
            inputs,
            "      <label for=\"{name}\">{label}</label>\n      \
             <input type=\"number\" id=\"{name}\" name=\"{name}\" value=\"{value}\" step=\"{step}\"{min}>",
            name = field.name,
            label = escape_html(field.label),
            value = escape_html(&value),
        );
    }

    let result = outcome.map(render_outcome).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="utf-8">
  <title>{TITLE}</title>
  <style>
    body {{ font-family: sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; }}
    form {{ display: grid; grid-template-columns: 1fr 1fr; gap: 0.4rem 1rem; align-items: center; }}
    button {{ grid-column: 1 / span 2; padding: 0.6rem; font-size: 1rem; }}
    .alert {{ padding: 1rem; border-radius: 0.4rem; margin-top: 1rem; }}
    .error {{ background: #fde2e1; }}
    .success {{ background: #def7e5; }}
    .warning {{ background: #fff4d6; }}
    .caption {{ color: #666; font-size: 0.85rem; }}
  </style>
</head>
<body>
  <h1>{TITLE}</h1>
  <p>Esta herramienta estima la <strong>probabilidad de que una unidad de negocio
  presente señales tempranas de deterioro financiero</strong>, a partir de
  indicadores financieros y operativos.</p>
  <h2>Introduce los indicadores de la unidad de negocio</h2>
  <form method="post" action="/">
{inputs}    <button type="submit">📊 Evaluar Riesgo</button>
  </form>
  <hr>
  {result}
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_lists_all_inputs_with_defaults() {
        let html = render(&HashMap::new(), None);

        assert!(html.contains(TITLE));
        assert!(html.contains("Evaluar Riesgo"));
        for field in &INPUT_FIELDS {
            assert!(html.contains(&format!("name=\"{}\"", field.name)));
        }
        assert!(html.contains("value=\"20000\""));
        assert!(!html.contains("Probabilidad estimada"));
    }

    #[test]
    fn risk_outcome_shows_percentage() {
        let outcome = Outcome::Prediction(PredictionOutput {
            prediction: 1,
            probability: 0.8765,
            threshold: 0.5,
            message: "Riesgo elevado de deterioro financiero".to_string(),
        });
        let html = render(&HashMap::new(), Some(&outcome));

        assert!(html.contains("Probabilidad estimada: <strong>87.65%</strong>"));
        assert!(html.contains(CAPTION));
    }

    #[test]
    fn user_text_is_escaped() {
        let mut values = HashMap::new();
        values.insert("Ingresos".to_string(), "\"><script>".to_string());
        let html = render(&values, Some(&Outcome::Invalid("<b>bad</b>".to_string())));

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
    }
}
