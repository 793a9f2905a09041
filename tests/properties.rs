use approx::{assert_abs_diff_eq, assert_relative_eq};
use ferrite_loss::loss::log_softmax;
use ferrite_loss::{softmax_cross_entropy, Criterion, Matrix, SoftmaxCrossEntropy};
use proptest::prelude::*;

/// (scores, one-hot class indices) with 1..8 rows and 2..6 classes.
fn batch(score_range: std::ops::Range<f64>) -> impl Strategy<Value = (Matrix, Vec<usize>, usize)> {
    (1usize..8, 2usize..6).prop_flat_map(move |(rows, cols)| {
        (
            prop::collection::vec(prop::collection::vec(score_range.clone(), cols), rows),
            prop::collection::vec(0..cols, rows),
            Just(cols),
        )
            .prop_map(|(data, idx, cols)| (Matrix::from_data(data), idx, cols))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_loss_non_negative((scores, idx, cols) in batch(-50.0..50.0)) {
        let labels = Matrix::one_hot(&idx, cols).unwrap();
        let loss = SoftmaxCrossEntropy::new().forward(&scores, &labels).unwrap();
        prop_assert!(loss.iter().all(|&l| l >= 0.0));
    }

    #[test]
    fn prop_one_hot_loss_is_negative_log_softmax((scores, idx, cols) in batch(-50.0..50.0)) {
        let labels = Matrix::one_hot(&idx, cols).unwrap();
        let out = softmax_cross_entropy(&scores, &labels).unwrap();
        for (i, &k) in idx.iter().enumerate() {
            prop_assert!((out.loss[i] + out.log_softmax.data[i][k]).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_softmax_rows_sum_to_one((scores, idx, cols) in batch(-1e4..1e4)) {
        let labels = Matrix::one_hot(&idx, cols).unwrap();
        let out = softmax_cross_entropy(&scores, &labels).unwrap();
        for sum in out.softmax.row_sums() {
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }
        prop_assert!(out.loss.iter().all(|l| l.is_finite()));
    }

    #[test]
    fn prop_derivative_is_softmax_minus_labels((scores, idx, cols) in batch(-20.0..20.0)) {
        let labels = Matrix::one_hot(&idx, cols).unwrap();
        let mut ce = SoftmaxCrossEntropy::new();
        ce.forward(&scores, &labels).unwrap();
        let grad = ce.derivative().unwrap();
        let expected = ce.softmax().unwrap() - &labels;
        prop_assert_eq!(&grad, &expected);
        for sum in grad.row_sums() {
            prop_assert!(sum.abs() < 1e-9);
        }
    }

    #[test]
    fn prop_shift_invariance((scores, idx, cols) in batch(-10.0..10.0), shift in -1000.0f64..1000.0) {
        let labels = Matrix::one_hot(&idx, cols).unwrap();
        let base = softmax_cross_entropy(&scores, &labels).unwrap();
        let moved = softmax_cross_entropy(&scores.map(|x| x + shift), &labels).unwrap();
        for (a, b) in base.loss.iter().zip(moved.loss.iter()) {
            prop_assert!((a - b).abs() < 1e-9);
        }
        for (ra, rb) in base.softmax.data.iter().zip(moved.softmax.data.iter()) {
            for (a, b) in ra.iter().zip(rb.iter()) {
                prop_assert!((a - b).abs() < 1e-9);
            }
        }
    }
}

#[test]
fn large_constant_shift_leaves_worked_example_unchanged() {
    let scores = Matrix::from_data(vec![vec![1.0, 2.0, 3.0]]);
    let labels = Matrix::one_hot(&[2], 3).unwrap();
    let base = softmax_cross_entropy(&scores, &labels).unwrap();
    let moved = softmax_cross_entropy(&scores.map(|x| x + 1000.0), &labels).unwrap();
    assert_abs_diff_eq!(base.loss[0], moved.loss[0], epsilon = 1e-9);
    assert_abs_diff_eq!(moved.loss[0], 0.4076, epsilon = 1e-4);
}

#[test]
fn derivative_matches_finite_differences() {
    let scores = Matrix::from_data(vec![vec![0.3, -1.2, 2.0, 0.5], vec![-0.7, 0.1, 0.0, 1.1]]);
    let labels = Matrix::from_data(vec![vec![0.0, 0.0, 1.0, 0.0], vec![0.25, 0.25, 0.0, 0.5]]);
    let mut ce = SoftmaxCrossEntropy::new();
    ce.forward(&scores, &labels).unwrap();
    let grad = ce.derivative().unwrap();

    let total = |m: &Matrix| -> f64 { softmax_cross_entropy(m, &labels).unwrap().loss.iter().sum() };
    let h = 1e-6;
    for i in 0..scores.rows {
        for j in 0..scores.cols {
            let mut plus = scores.clone();
            let mut minus = scores.clone();
            plus.data[i][j] += h;
            minus.data[i][j] -= h;
            let numeric = (total(&plus) - total(&minus)) / (2.0 * h);
            assert_abs_diff_eq!(grad.data[i][j], numeric, epsilon = 1e-6);
        }
    }
}

#[test]
fn log_softmax_handles_very_negative_rows() {
    let ls = log_softmax(&Matrix::from_data(vec![vec![-1e6, -1e6 - 1.0]]));
    assert!(ls.data[0].iter().all(|x| x.is_finite()));
    // One ULP of a logsumexp near -1e6 is ~1e-10, so the row sum is only good to ~1e-10.
    assert_relative_eq!(ls.data[0][0] - ls.data[0][1], 1.0, max_relative = 1e-9);
    assert_relative_eq!(ls.data[0][0].exp() + ls.data[0][1].exp(), 1.0, max_relative = 1e-9);
}

#[test]
fn boxed_criterion_from_config() {
    let mut criterion: Box<dyn Criterion> = ferrite_loss::CriterionConfig::default().build();
    let scores = Matrix::from_data(vec![vec![1.0, 2.0, 3.0]]);
    let labels = Matrix::one_hot(&[2], 3).unwrap();
    let loss = criterion.call(&scores, &labels).unwrap();
    assert_abs_diff_eq!(loss[0], 0.4076, epsilon = 1e-4);
    assert_abs_diff_eq!(criterion.derivative().unwrap().data[0][2], -0.3348, epsilon = 1e-4);
}
