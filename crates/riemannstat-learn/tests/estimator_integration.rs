//! Integration tests for the estimators on curved and quotient geometry.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use riemannstat_core::prelude::*;
use riemannstat_learn::prelude::*;

fn sphere_immersion(p: &DVector<f64>) -> DVector<f64> {
    let (theta, phi) = (p[0], p[1]);
    DVector::from_vec(vec![
        phi.cos() * theta.sin(),
        phi.sin() * theta.sin(),
        theta.cos(),
    ])
}

fn sphere_jacobian(p: &DVector<f64>) -> DMatrix<f64> {
    let (theta, phi) = (p[0], p[1]);
    DMatrix::from_row_slice(
        3,
        2,
        &[
            phi.cos() * theta.cos(),
            -phi.sin() * theta.sin(),
            phi.sin() * theta.cos(),
            phi.cos() * theta.sin(),
            -theta.sin(),
            0.0,
        ],
    )
}

fn sphere_metric() -> PullbackMetric<
    f64,
    impl Fn(&DVector<f64>) -> DVector<f64> + Send + Sync,
    impl Fn(&DVector<f64>) -> DMatrix<f64> + Send + Sync,
> {
    PullbackMetric::new(2, 3, sphere_immersion, sphere_jacobian)
}

fn path_graph() -> DMatrix<f64> {
    DMatrix::from_row_slice(
        3,
        3,
        &[
            0.0, 1.0, 0.0, //
            1.0, 0.0, 1.0, //
            0.0, 1.0, 0.0,
        ],
    )
}

#[test]
fn test_frechet_mean_on_sphere_chart() {
    let metric = sphere_metric();
    let center = DVector::from_vec(vec![1.2, 0.4]);

    // Points spread symmetrically around the center along both chart axes.
    let points = vec![
        DVector::from_vec(vec![1.2 + 0.1, 0.4]),
        DVector::from_vec(vec![1.2 - 0.1, 0.4]),
        DVector::from_vec(vec![1.2, 0.4 + 0.1]),
        DVector::from_vec(vec![1.2, 0.4 - 0.1]),
    ];

    let fit = FrechetMean::new()
        .with_init_point(center.clone())
        .fit(&metric, &points, None)
        .unwrap();

    assert!(fit.converged);
    assert!(metric.dist(&fit.estimate, &center).unwrap() < 5e-3);
}

#[test]
fn test_weiszfeld_median_on_graph_total_space() {
    let metric = MatrixFlatMetric::<f64>::square(3);
    let base = path_graph();

    // A tight cluster and one far outlier.
    let mut points: Vec<DMatrix<f64>> = (0..4).map(|_| base.clone()).collect();
    points.push(&base * 50.0);

    let fit = WeiszfeldAlgorithm::new()
        .with_max_iter(200)
        .fit(&metric, &points, None)
        .unwrap();

    // The median sticks with the cluster; the mean would not.
    assert!(metric.dist(&fit.estimate, &base).unwrap() < 1.0);
}

#[test]
fn test_weiszfeld_median_on_sphere_chart() {
    let metric = sphere_metric();
    let points = vec![
        DVector::from_vec(vec![1.0, 0.2]),
        DVector::from_vec(vec![1.1, 0.3]),
        DVector::from_vec(vec![1.2, 0.25]),
    ];

    let fit = WeiszfeldAlgorithm::new()
        .with_max_iter(50)
        .with_epsilon(1e-9)
        .fit(&metric, &points, None)
        .unwrap();

    // The median lands inside the hull of the cluster.
    for point in &points {
        assert!(metric.dist(&fit.estimate, point).unwrap() < 0.2);
    }
}

#[test]
fn test_aac_frechet_pipeline_on_scrambled_orbit() {
    let metric = GraphSpaceMetric::<f64>::new(3).unwrap();
    let action = PermutationAction::<f64>::new();
    let reference = path_graph();

    let samples: Vec<DMatrix<f64>> = [
        vec![0, 1, 2],
        vec![1, 0, 2],
        vec![2, 1, 0],
        vec![0, 2, 1],
        vec![1, 2, 0],
    ]
    .into_iter()
    .map(|indices| action.apply(&Permutation::new(indices).unwrap(), &reference))
    .collect();

    let fit = AacFrechet::new()
        .with_seed(7)
        .fit(&metric, &samples)
        .unwrap();

    assert!(fit.converged);
    // All samples lie on one orbit, so the quotient mean is the orbit.
    assert_relative_eq!(
        metric.quotient_dist(&reference, &fit.estimate).unwrap(),
        0.0,
        epsilon = 1e-9
    );
}

#[test]
fn test_seeded_fits_are_bit_reproducible() {
    let metric = GraphSpaceMetric::<f64>::new(3).unwrap();
    let action = PermutationAction::<f64>::new();
    let base = path_graph();

    let relabelings = [vec![0, 1, 2], vec![1, 0, 2], vec![2, 0, 1], vec![0, 2, 1]];
    let samples: Vec<DMatrix<f64>> = relabelings
        .into_iter()
        .enumerate()
        .map(|(k, indices)| {
            let graph = &base * (1.0 + 0.1 * k as f64);
            action.apply(&Permutation::new(indices).unwrap(), &graph)
        })
        .collect();

    let estimator = AacFrechet::new().with_seed(1234);
    let first = estimator.fit(&metric, &samples).unwrap();
    let second = estimator.fit(&metric, &samples).unwrap();

    assert_eq!(first.estimate, second.estimate);
    assert_eq!(first.n_iter, second.n_iter);
    assert_eq!(first.converged, second.converged);
}

proptest! {
    #[test]
    fn prop_repeated_point_is_its_own_median(
        coords in proptest::collection::vec(-5.0f64..5.0, 3),
        raw_weights in proptest::collection::vec(0.1f64..10.0, 4),
    ) {
        let metric = FlatMetric::<f64>::new(3);
        let point = DVector::from_vec(coords);
        let points = vec![point.clone(); 4];

        let fit = WeiszfeldAlgorithm::new()
            .fit(&metric, &points, Some(&raw_weights))
            .unwrap();
        prop_assert_eq!(fit.estimate, point);
        prop_assert_eq!(fit.n_iter, 1);
        prop_assert!(fit.converged);
    }
}
