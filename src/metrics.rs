//! Метрики бинарной классификации

use std::fmt;

use ndarray::Array1;

use crate::error::{PipelineError, Result};
use crate::types::MetricsRow;

/// Матрица ошибок [[TN, FP], [FN, TP]]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionMatrix {
    pub fn from_labels(y_true: &Array1<usize>, y_pred: &Array1<usize>) -> Self {
        let mut cm = ConfusionMatrix::default();
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (t == 1, p == 1) {
                (false, false) => cm.tn += 1,
                (false, true) => cm.fp += 1,
                (true, false) => cm.fn_ += 1,
                (true, true) => cm.tp += 1,
            }
        }
        cm
    }

    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }

    /// Точность для класса 1. Нулевой знаменатель дает 0.
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn f1(&self) -> f64 {
        f1(self.precision(), self.recall())
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// Метрики для класса 0 (класс 0 считается положительным)
    fn negative_class(&self) -> ClassScores {
        let precision = ratio(self.tn, self.tn + self.fn_);
        let recall = ratio(self.tn, self.tn + self.fp);
        ClassScores {
            precision,
            recall,
            f1: f1(precision, recall),
            support: self.tn + self.fp,
        }
    }

    fn positive_class(&self) -> ClassScores {
        ClassScores {
            precision: self.precision(),
            recall: self.recall(),
            f1: self.f1(),
            support: self.tp + self.fn_,
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.tn.max(self.fp).max(self.fn_).max(self.tp).to_string().len();
        writeln!(f, "[[{:>w$} {:>w$}]", self.tn, self.fp, w = width)?;
        write!(f, " [{:>w$} {:>w$}]]", self.fn_, self.tp, w = width)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// ROC AUC через ранги (Манн-Уитни), одинаковые оценки получают средний ранг
pub fn roc_auc(y_true: &Array1<usize>, scores: &Array1<f64>) -> Result<f64> {
    if y_true.len() != scores.len() {
        return Err(PipelineError::Shape(format!(
            "{} labels for {} scores",
            y_true.len(),
            scores.len()
        )));
    }

    let n_pos = y_true.iter().filter(|&&l| l == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(PipelineError::InvalidInput(
            "ROC AUC is undefined when only one class is present in y_true".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // Ранги с 1, средний для группы одинаковых значений
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let rank_sum: f64 = (0..y_true.len())
        .filter(|&i| y_true[i] == 1)
        .map(|i| ranks[i])
        .sum();
    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;

    Ok((rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

fn weighted_scores(classes: &[ClassScores; 2], weights: [f64; 2], support: usize) -> ClassScores {
    let norm: f64 = weights.iter().sum();
    let avg = |metric: fn(&ClassScores) -> f64| {
        classes.iter().zip(weights).map(|(c, w)| w * metric(c)).sum::<f64>() / norm
    };
    ClassScores {
        precision: avg(|c| c.precision),
        recall: avg(|c| c.recall),
        f1: avg(|c| c.f1),
        support,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Отчет по классам, accuracy, macro и weighted средние
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: [ClassScores; 2],
    pub accuracy: f64,
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
}

impl ClassificationReport {
    pub fn new(cm: &ConfusionMatrix) -> Self {
        let classes = [cm.negative_class(), cm.positive_class()];
        let total = cm.total();

        let macro_avg = weighted_scores(&classes, [1.0, 1.0], total);
        let weighted_avg = if total > 0 {
            weighted_scores(
                &classes,
                [classes[0].support as f64, classes[1].support as f64],
                total,
            )
        } else {
            macro_avg
        };

        Self {
            classes,
            accuracy: cm.accuracy(),
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.macro_avg.support;
        writeln!(f, "{:>14} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for (label, c) in self.classes.iter().enumerate() {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>14} {:>9} {:>9} {:>9.2} {:>9}", "accuracy", "", "", self.accuracy, total)?;
        for (name, c) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, c.precision, c.recall, c.f1, c.support
            )?;
        }
        Ok(())
    }
}

/// Все метрики одной модели на тестовой выборке
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub confusion: ConfusionMatrix,
    pub report: ClassificationReport,
    pub roc_auc: f64,
}

impl Evaluation {
    pub fn compute(y_true: &Array1<usize>, y_pred: &Array1<usize>, scores: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(PipelineError::Shape(format!(
                "{} labels for {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }
        let confusion = ConfusionMatrix::from_labels(y_true, y_pred);
        Ok(Self {
            report: ClassificationReport::new(&confusion),
            roc_auc: roc_auc(y_true, scores)?,
            confusion,
        })
    }

    pub fn summary(&self) -> MetricsRow {
        MetricsRow {
            roc_auc: self.roc_auc,
            precision: self.confusion.precision(),
            recall: self.confusion.recall(),
            f1: self.confusion.f1(),
        }
    }
}
