use ndarray::{ArrayView2, Axis};

fn arg_by(scores: ArrayView2<'_, f32>, better: impl Fn(f32, f32) -> bool) -> Vec<usize> {
    scores
        .axis_iter(Axis(0))
        .map(|row| {
            let mut best = 0;
            for (i, &v) in row.iter().enumerate().skip(1) {
                if better(v, row[best]) {
                    best = i;
                }
            }
            best
        })
        .collect()
}

/// Row-wise argmax. Ties go to the lowest class index.
pub fn predicted_classes(scores: ArrayView2<'_, f32>) -> Vec<usize> {
    arg_by(scores, |v, best| v > best)
}

/// Row-wise argmin, the class the model considers least likely. Ties go to the
/// lowest class index.
pub fn least_likely_classes(scores: ArrayView2<'_, f32>) -> Vec<usize> {
    arg_by(scores, |v, best| v < best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_arg_extremes() {
        let scores = arr2(&[[0.1f32, -2.0, 3.0], [1.0, 1.0, 1.0], [5.0, 4.0, -4.0]]);
        assert_eq!(predicted_classes(scores.view()), vec![2, 0, 0]);
        assert_eq!(least_likely_classes(scores.view()), vec![1, 0, 2]);
    }
}
