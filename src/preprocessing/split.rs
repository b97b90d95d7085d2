//! Стратифицированное разделение train/test

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Доля каждого класса в тесте пропорциональна его частоте,
/// всего в тесте ceil(test_size * n) строк.
pub fn stratified_split(labels: &[usize], test_size: f64, seed: u64) -> Result<SplitIndices> {
    let n = labels.len();
    if n < 2 {
        return Err(PipelineError::EmptyDataset(format!(
            "need at least 2 rows to split, got {n}"
        )));
    }
    if !(0.0..1.0).contains(&test_size) || test_size == 0.0 {
        return Err(PipelineError::InvalidInput(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);

    let mut classes: Vec<usize> = labels.to_vec();
    classes.sort_unstable();
    classes.dedup();

    let n_test = ((test_size * n as f64).ceil() as usize).clamp(1, n - 1);

    // Квоты по классам, остаток отдаем классам с наибольшей дробной частью
    let mut quotas: Vec<(usize, usize, f64)> = classes
        .iter()
        .map(|&c| {
            let count = labels.iter().filter(|&&l| l == c).count();
            let exact = n_test as f64 * count as f64 / n as f64;
            (c, exact.floor() as usize, exact - exact.floor())
        })
        .collect();
    let assigned: usize = quotas.iter().map(|q| q.1).sum();
    let mut order: Vec<usize> = (0..quotas.len()).collect();
    order.sort_by(|&a, &b| quotas[b].2.total_cmp(&quotas[a].2));
    for &i in order.iter().take(n_test.saturating_sub(assigned)) {
        quotas[i].1 += 1;
    }

    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (class, quota, _) in quotas {
        let mut members: Vec<usize> = (0..n).filter(|&i| labels[i] == class).collect();
        members.shuffle(&mut rng);
        let quota = quota.min(members.len());
        test.extend_from_slice(&members[..quota]);
        train.extend_from_slice(&members[quota..]);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Ok(SplitIndices { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n_neg: usize, n_pos: usize) -> Vec<usize> {
        let mut y = vec![0; n_neg];
        y.extend(std::iter::repeat(1).take(n_pos));
        y
    }

    #[test]
    fn keeps_class_proportions() {
        let y = labels(80, 20);
        let split = stratified_split(&y, 0.2, 42).unwrap();

        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.len(), 80);
        assert_eq!(split.test.iter().filter(|&&i| y[i] == 1).count(), 4);
        assert_eq!(split.train.iter().filter(|&&i| y[i] == 1).count(), 16);
    }

    #[test]
    fn partitions_all_rows_once() {
        let y = labels(37, 11);
        let split = stratified_split(&y, 0.2, 7).unwrap();

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..48).collect::<Vec<_>>());
        assert_eq!(split.test.len(), 10);
    }

    #[test]
    fn deterministic_for_seed() {
        let y = labels(50, 10);
        assert_eq!(
            stratified_split(&y, 0.2, 42).unwrap(),
            stratified_split(&y, 0.2, 42).unwrap()
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(stratified_split(&[1], 0.2, 42).is_err());
        assert!(stratified_split(&[0, 1, 0], 1.5, 42).is_err());
    }
}
