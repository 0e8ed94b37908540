//! End-to-end runs on a synthetic ordinal problem.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use u_rulegp::data::{Attribute, Dataset, Instance, Metadata};
use u_rulegp::gp::{EvolutionConfig, EvolutionSettings, LoggingListener, RuleGpRunner};
use u_rulegp::metrics::{ClassificationReport, ConfusionMatrix};
use u_rulegp::tree::TreeSpecies;
use u_rulegp::RuleGpError;

/// `score` in [0, 12); grade = score / 4. `noise` is irrelevant.
fn grades() -> Dataset {
    let meta = Metadata::new(
        vec![
            Attribute::numeric("score", 0.0, 12.0),
            Attribute::categorical("noise", ["on", "off"]),
            Attribute::categorical("grade", ["low", "mid", "high"]),
        ],
        2,
    );
    let instances = (0..120)
        .map(|i| {
            let score = i as f64 / 10.0;
            let grade = (score / 4.0).floor();
            Instance::new(vec![score, (i % 2) as f64, grade])
        })
        .collect();
    Dataset::new("grades", meta, instances).unwrap()
}

fn config() -> EvolutionConfig {
    EvolutionConfig::default()
        .with_population_size(60)
        .with_max_generations(25)
        .with_seed(2024)
}

#[test]
fn test_end_to_end_classifier() {
    let ds = grades();
    let species = TreeSpecies::new(ds.metadata().clone(), 4).unwrap();

    let result = RuleGpRunner::new(&species, &ds, config())
        .unwrap()
        .with_listener(LoggingListener::new(ds.metadata().clone()).with_frequency(5))
        .run()
        .unwrap();

    assert!(!result.cancelled);
    assert_eq!(result.generations, vec![25, 25, 25]);

    let classifier = &result.classifier;
    assert_eq!(classifier.len(), 3);
    let mut classes: Vec<usize> = classifier.rules().iter().map(|r| r.consequent()).collect();
    classes.sort_unstable();
    assert_eq!(classes, vec![0, 1, 2]);

    for pair in classifier.rules().windows(2) {
        assert!(pair[0].fitness() <= pair[1].fitness());
    }
    assert!(result.champion_fitness.iter().all(|f| f.is_finite()));

    let predictions = classifier.classify_all(&ds);
    assert_eq!(predictions.len(), ds.len());
    assert!(predictions.iter().all(|&p| p < 3));

    let report = ClassificationReport::evaluate(classifier, &ds).unwrap();
    assert_eq!(report.confusion.total(), ds.len());
    for value in [report.accuracy, report.auc, report.kappa, report.omae, report.geometric_mean] {
        assert!(!value.is_nan());
    }

    let text = classifier.render(ds.metadata());
    assert!(text.starts_with(" 1 Rule: IF "));
    assert!(text.contains("ELSE (grade = "));
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let ds = grades();
    let species = TreeSpecies::new(ds.metadata().clone(), 4).unwrap();

    let a = RuleGpRunner::new(&species, &ds, config()).unwrap().run().unwrap();
    let b = RuleGpRunner::new(&species, &ds, config()).unwrap().run().unwrap();

    assert_eq!(a.classifier, b.classifier);
    assert_eq!(
        ConfusionMatrix::from_rule_base(&a.classifier, &ds).unwrap(),
        ConfusionMatrix::from_rule_base(&b.classifier, &ds).unwrap()
    );
}

#[test]
fn test_settings_drive_a_run() {
    let ds = grades();
    let species = TreeSpecies::new(ds.metadata().clone(), 3).unwrap();

    let settings = EvolutionSettings {
        population_size: 30,
        max_generations: 5,
        parents_selector: "rank".into(),
        fitness: "fails-complexity".into(),
        seed: Some(1),
        ..EvolutionSettings::default()
    };
    let result = RuleGpRunner::new(&species, &ds, settings.resolve().unwrap())
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(result.classifier.len(), 3);

    let unknown = EvolutionSettings {
        parents_selector: "roulette".into(),
        ..EvolutionSettings::default()
    };
    assert!(matches!(
        unknown.resolve(),
        Err(RuleGpError::UnknownOperator { kind: "selector", .. })
    ));
}

#[test]
fn test_cancelled_run_returns_partial_classifier() {
    let ds = grades();
    let species = TreeSpecies::new(ds.metadata().clone(), 4).unwrap();

    let result = RuleGpRunner::new(&species, &ds, config())
        .unwrap()
        .with_cancel(Arc::new(AtomicBool::new(true)))
        .run()
        .unwrap();

    assert!(result.cancelled);
    assert!(result.classifier.is_empty());
    // an empty cascade still answers with the majority class
    let predictions = result.classifier.classify_all(&ds);
    assert!(predictions.iter().all(|&p| p == result.classifier.default_class()));
}
