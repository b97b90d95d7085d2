//! Описательные статистики с пропуском NaN

/// Квантиль с линейной интерполяцией между порядковыми статистиками.
/// NaN пропускаются; если значений нет, возвращается NaN.
pub fn nan_quantile(values: impl IntoIterator<Item = f64>, q: f64) -> f64 {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(f64::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    }
}

pub fn nan_median(values: impl IntoIterator<Item = f64>) -> f64 {
    nan_quantile(values, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_even_count_averages_middle_values() {
        assert_eq!(nan_median([4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(nan_median([5.0, 1.0, 3.0]), 3.0);
    }

    #[test]
    fn nan_values_are_skipped() {
        assert_eq!(nan_median([f64::NAN, 1.0, 3.0]), 2.0);
        assert!(nan_median([f64::NAN, f64::NAN]).is_nan());
        assert!(nan_median(std::iter::empty()).is_nan());
    }

    #[test]
    fn quantile_interpolates_linearly() {
        // pos = 0.25 * 4 = 1.0
        assert_eq!(nan_quantile([1.0, 2.0, 3.0, 4.0, 5.0], 0.25), 2.0);
        // pos = 0.75 * 3 = 2.25 -> 3 + 0.25 * (4 - 3)
        assert!((nan_quantile([1.0, 2.0, 3.0, 4.0], 0.75) - 3.25).abs() < 1e-12);
        assert_eq!(nan_quantile([7.0], 0.25), 7.0);
    }
}
