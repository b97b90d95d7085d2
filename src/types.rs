//! Типы данных для ML модуля

use serde::{Deserialize, Serialize};

pub const TARGET: &str = "Riesgo_Deterioro";

/// Колонки, которые никогда не являются признаками
pub const NON_FEATURES: [&str; 4] = [TARGET, "Unidad_ID", "Departamento", "Periodo_ID"];

/// Финансовые коэффициенты: медиана по департаменту
pub const RATIO_COLUMNS: [&str; 5] = [
    "ROA",
    "ROE",
    "Margen_Explotacion",
    "Endeudamiento",
    "Indice_Rentabilidad",
];

/// Операционные показатели: глобальная медиана
pub const OPERATIONAL_COLUMNS: [&str; 4] = [
    "Plantilla",
    "Costes_Fijos",
    "CostesVariables",
    "Crecimiento_Ingresos",
];

/// Полный список признаков в порядке колонок обработанного датасета
pub const FEATURE_COLUMNS: [&str; 20] = [
    "Ingresos",
    "Gastos",
    "Activos",
    "Pasivos",
    "EBIT",
    "ROA",
    "ROE",
    "Margen_Explotacion",
    "Endeudamiento",
    "Indice_Rentabilidad",
    "Plantilla",
    "Costes_Fijos",
    "CostesVariables",
    "Crecimiento_Ingresos",
    "Ingresos_por_Empleado",
    "Ratio_Gastos_Ingresos",
    "Margen_Operativo",
    "Solvencia",
    "Costes_Totales",
    "Peso_Costes_Fijos",
];

/// Строка исходного CSV (data/raw/dataset.csv). Пустые ячейки -> None.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawObservation {
    #[serde(rename = "Unidad_ID")]
    pub unit_id: String,
    #[serde(rename = "Departamento")]
    pub department: String,
    #[serde(rename = "Periodo_ID", default)]
    pub period_id: Option<String>,
    #[serde(rename = "Ingresos")]
    pub ingresos: Option<f64>,
    #[serde(rename = "Gastos")]
    pub gastos: Option<f64>,
    #[serde(rename = "Activos")]
    pub activos: Option<f64>,
    #[serde(rename = "Pasivos")]
    pub pasivos: Option<f64>,
    #[serde(rename = "EBIT")]
    pub ebit: Option<f64>,
    #[serde(rename = "ROA")]
    pub roa: Option<f64>,
    #[serde(rename = "ROE")]
    pub roe: Option<f64>,
    #[serde(rename = "Margen_Explotacion")]
    pub margen_explotacion: Option<f64>,
    #[serde(rename = "Endeudamiento")]
    pub endeudamiento: Option<f64>,
    #[serde(rename = "Indice_Rentabilidad")]
    pub indice_rentabilidad: Option<f64>,
    #[serde(rename = "Plantilla")]
    pub plantilla: Option<f64>,
    #[serde(rename = "Costes_Fijos")]
    pub costes_fijos: Option<f64>,
    #[serde(rename = "CostesVariables")]
    pub costes_variables: Option<f64>,
    #[serde(rename = "Crecimiento_Ingresos")]
    pub crecimiento_ingresos: Option<f64>,
}

/// Рабочая строка пайплайна. Пропуски представлены как NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub unit_id: String,
    pub department: String,
    pub period_id: Option<String>,

    pub ingresos: f64,
    pub gastos: f64,
    pub activos: f64,
    pub pasivos: f64,
    pub ebit: f64,
    pub roa: f64,
    pub roe: f64,
    pub margen_explotacion: f64,
    pub endeudamiento: f64,
    pub indice_rentabilidad: f64,
    pub plantilla: f64,
    pub costes_fijos: f64,
    pub costes_variables: f64,
    pub crecimiento_ingresos: f64,

    // Заполняются в feature_engineering
    pub ingresos_por_empleado: f64,
    pub ratio_gastos_ingresos: f64,
    pub margen_operativo: f64,
    pub solvencia: f64,
    pub costes_totales: f64,
    pub peso_costes_fijos: f64,

    // Заполняется в create_target
    pub riesgo_deterioro: Option<u8>,
}

impl From<RawObservation> for Observation {
    fn from(raw: RawObservation) -> Self {
        let v = |x: Option<f64>| x.unwrap_or(f64::NAN);
        Self {
            unit_id: raw.unit_id,
            department: raw.department,
            period_id: raw.period_id,
            ingresos: v(raw.ingresos),
            gastos: v(raw.gastos),
            activos: v(raw.activos),
            pasivos: v(raw.pasivos),
            ebit: v(raw.ebit),
            roa: v(raw.roa),
            roe: v(raw.roe),
            margen_explotacion: v(raw.margen_explotacion),
            endeudamiento: v(raw.endeudamiento),
            indice_rentabilidad: v(raw.indice_rentabilidad),
            plantilla: v(raw.plantilla),
            costes_fijos: v(raw.costes_fijos),
            costes_variables: v(raw.costes_variables),
            crecimiento_ingresos: v(raw.crecimiento_ingresos),
            ingresos_por_empleado: f64::NAN,
            ratio_gastos_ingresos: f64::NAN,
            margen_operativo: f64::NAN,
            solvencia: f64::NAN,
            costes_totales: f64::NAN,
            peso_costes_fijos: f64::NAN,
            riesgo_deterioro: None,
        }
    }
}

impl Observation {
    /// Доступ к числовой колонке по имени из CSV
    pub fn value(&self, column: &str) -> Option<f64> {
        self.field(column).copied()
    }

    pub fn value_mut(&mut self, column: &str) -> Option<&mut f64> {
        let value = match column {
            "Ingresos" => &mut self.ingresos,
            "Gastos" => &mut self.gastos,
            "Activos" => &mut self.activos,
            "Pasivos" => &mut self.pasivos,
            "EBIT" => &mut self.ebit,
            "ROA" => &mut self.roa,
            "ROE" => &mut self.roe,
            "Margen_Explotacion" => &mut self.margen_explotacion,
            "Endeudamiento" => &mut self.endeudamiento,
            "Indice_Rentabilidad" => &mut self.indice_rentabilidad,
            "Plantilla" => &mut self.plantilla,
            "Costes_Fijos" => &mut self.costes_fijos,
            "CostesVariables" => &mut self.costes_variables,
            "Crecimiento_Ingresos" => &mut self.crecimiento_ingresos,
            "Ingresos_por_Empleado" => &mut self.ingresos_por_empleado,
            "Ratio_Gastos_Ingresos" => &mut self.ratio_gastos_ingresos,
            "Margen_Operativo" => &mut self.margen_operativo,
            "Solvencia" => &mut self.solvencia,
            "Costes_Totales" => &mut self.costes_totales,
            "Peso_Costes_Fijos" => &mut self.peso_costes_fijos,
            _ => return None,
        };
        Some(value)
    }

    fn field(&self, column: &str) -> Option<&f64> {
        let value = match column {
            "Ingresos" => &self.ingresos,
            "Gastos" => &self.gastos,
            "Activos" => &self.activos,
            "Pasivos" => &self.pasivos,
            "EBIT" => &self.ebit,
            "ROA" => &self.roa,
            "ROE" => &self.roe,
            "Margen_Explotacion" => &self.margen_explotacion,
            "Endeudamiento" => &self.endeudamiento,
            "Indice_Rentabilidad" => &self.indice_rentabilidad,
            "Plantilla" => &self.plantilla,
            "Costes_Fijos" => &self.costes_fijos,
            "CostesVariables" => &self.costes_variables,
            "Crecimiento_Ingresos" => &self.crecimiento_ingresos,
            "Ingresos_por_Empleado" => &self.ingresos_por_empleado,
            "Ratio_Gastos_Ingresos" => &self.ratio_gastos_ingresos,
            "Margen_Operativo" => &self.margen_operativo,
            "Solvencia" => &self.solvencia,
            "Costes_Totales" => &self.costes_totales,
            "Peso_Costes_Fijos" => &self.peso_costes_fijos,
            _ => return None,
        };
        Some(value)
    }
}

/// Строка обработанного датасета (data/processed/dataset_model_ready.csv)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedObservation {
    #[serde(rename = "Periodo_ID")]
    pub period_id: Option<String>,
    #[serde(rename = "Ingresos")]
    pub ingresos: f64,
    #[serde(rename = "Gastos")]
    pub gastos: f64,
    #[serde(rename = "Activos")]
    pub activos: f64,
    #[serde(rename = "Pasivos")]
    pub pasivos: f64,
    #[serde(rename = "EBIT")]
    pub ebit: f64,
    #[serde(rename = "ROA")]
    pub roa: f64,
    #[serde(rename = "ROE")]
    pub roe: f64,
    #[serde(rename = "Margen_Explotacion")]
    pub margen_explotacion: f64,
    #[serde(rename = "Endeudamiento")]
    pub endeudamiento: f64,
    #[serde(rename = "Indice_Rentabilidad")]
    pub indice_rentabilidad: f64,
    #[serde(rename = "Plantilla")]
    pub plantilla: f64,
    #[serde(rename = "Costes_Fijos")]
    pub costes_fijos: f64,
    #[serde(rename = "CostesVariables")]
    pub costes_variables: f64,
    #[serde(rename = "Crecimiento_Ingresos")]
    pub crecimiento_ingresos: f64,
    #[serde(rename = "Ingresos_por_Empleado")]
    pub ingresos_por_empleado: f64,
    #[serde(rename = "Ratio_Gastos_Ingresos")]
    pub ratio_gastos_ingresos: f64,
    #[serde(rename = "Margen_Operativo")]
    pub margen_operativo: f64,
    #[serde(rename = "Solvencia")]
    pub solvencia: f64,
    #[serde(rename = "Costes_Totales")]
    pub costes_totales: f64,
    #[serde(rename = "Peso_Costes_Fijos")]
    pub peso_costes_fijos: f64,
    #[serde(rename = "Riesgo_Deterioro")]
    pub riesgo_deterioro: u8,
}

impl From<&Observation> for ProcessedObservation {
    fn from(obs: &Observation) -> Self {
        Self {
            period_id: obs.period_id.clone(),
            ingresos: obs.ingresos,
            gastos: obs.gastos,
            activos: obs.activos,
            pasivos: obs.pasivos,
            ebit: obs.ebit,
            roa: obs.roa,
            roe: obs.roe,
            margen_explotacion: obs.margen_explotacion,
            endeudamiento: obs.endeudamiento,
            indice_rentabilidad: obs.indice_rentabilidad,
            plantilla: obs.plantilla,
            costes_fijos: obs.costes_fijos,
            costes_variables: obs.costes_variables,
            crecimiento_ingresos: obs.crecimiento_ingresos,
            ingresos_por_empleado: obs.ingresos_por_empleado,
            ratio_gastos_ingresos: obs.ratio_gastos_ingresos,
            margen_operativo: obs.margen_operativo,
            solvencia: obs.solvencia,
            costes_totales: obs.costes_totales,
            peso_costes_fijos: obs.peso_costes_fijos,
            riesgo_deterioro: obs.riesgo_deterioro.unwrap_or(0),
        }
    }
}

/// Пороги, использованные для эвристической метки
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelThresholds {
    pub margen_explotacion_q25: f64,
    pub indice_rentabilidad_q25: f64,
    pub endeudamiento_q75: f64,
}

/// Результат оценки одной бизнес-единицы
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionOutput {
    pub prediction: u8,
    pub probability: f64,
    pub threshold: f64,
    pub message: String,
}

/// Метрики на тестовой выборке (models/final_model_metrics.csv)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    #[serde(rename = "ROC_AUC")]
    pub roc_auc: f64,
    #[serde(rename = "Precision_riesgo")]
    pub precision: f64,
    #[serde(rename = "Recall_riesgo")]
    pub recall: f64,
    #[serde(rename = "F1_riesgo")]
    pub f1: f64,
}

/// Метрики кандидата (models/candidate_models_metrics.csv)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateMetricsRow {
    #[serde(rename = "Modelo")]
    pub model: String,
    #[serde(rename = "ROC_AUC")]
    pub roc_auc: f64,
    #[serde(rename = "Precision_riesgo")]
    pub precision: f64,
    #[serde(rename = "Recall_riesgo")]
    pub recall: f64,
    #[serde(rename = "F1_riesgo")]
    pub f1: f64,
}

impl CandidateMetricsRow {
    pub fn new(model: impl Into<String>, metrics: MetricsRow) -> Self {
        Self {
            model: model.into(),
            roc_auc: metrics.roc_auc,
            precision: metrics.precision,
            recall: metrics.recall,
            f1: metrics.f1,
        }
    }
}
