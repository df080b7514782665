use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::GeneratorConfig;
use crate::flow::{FeatureSpace, FlowSampler};

#[test]
fn feature_bounds_fall_in_range() {
    let mut rng = StdRng::seed_from_u64(5);
    let space = FeatureSpace::sample(12, (2.0, 100.0), &mut rng).unwrap();
    assert_eq!(space.len(), 12);
    assert!(space.bounds().iter().all(|&b| (2..100).contains(&b)));

    assert!(FeatureSpace::sample(0, (2.0, 100.0), &mut rng).is_err());
    assert!(FeatureSpace::sample(3, (5.0, 5.0), &mut rng).is_err());
    assert!(FeatureSpace::from_bounds(vec![3, 0]).is_err());
}

#[test]
fn feature_values_stay_below_bounds() {
    let space = FeatureSpace::from_bounds(vec![1, 2, 7, 40]).unwrap();
    let sampler = FlowSampler::new(&GeneratorConfig::default(), space.clone()).unwrap();
    let mut rng = StdRng::seed_from_u64(6);

    for _ in 0..1000 {
        let values = sampler.feature_values(&mut rng);
        assert!(space.contains(&values), "{values:?}");
        assert_eq!(values[0], 0);
    }
    assert!(!space.contains(&[0, 0, 0]));
    assert!(!space.contains(&[0, 2, 0, 0]));
}

#[test]
fn flow_sizes_are_positive_and_scale_with_config() {
    let cfg = GeneratorConfig {
        flow_scale: 10.0,
        ..GeneratorConfig::default()
    };
    let sampler = FlowSampler::new(&cfg, FeatureSpace::from_bounds(vec![5]).unwrap()).unwrap();
    let mut rng = StdRng::seed_from_u64(7);

    let n = 20_000;
    let sizes: Vec<f64> = (0..n).map(|_| sampler.flow_size(&mut rng)).collect();
    assert!(sizes.iter().all(|&s| s > 0.0));
    let mean = sizes.iter().sum::<f64>() / n as f64;
    assert!((mean - 10.0).abs() < 1.0, "mean {mean}");
}

#[test]
fn organization_size_split_per_prefix() {
    let sampler = FlowSampler::new(&GeneratorConfig::default(), FeatureSpace::from_bounds(vec![5]).unwrap()).unwrap();
    let mut rng = StdRng::seed_from_u64(8);
    assert!(sampler.organization_size(&mut rng) >= 0.0);

    assert_eq!(FlowSampler::per_prefix_mean(100.0, 4), 25.0);
    assert_eq!(FlowSampler::per_prefix_mean(100.0, 0), 0.0);
}

#[test]
fn invalid_scale_is_rejected() {
    let cfg = GeneratorConfig {
        feature_scale: 0.0,
        ..GeneratorConfig::default()
    };
    assert!(FlowSampler::new(&cfg, FeatureSpace::from_bounds(vec![5]).unwrap()).is_err());
}
