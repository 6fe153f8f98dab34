//! Single-record inference benchmarks.

#![allow(clippy::unwrap_used)]

use criterion::{Criterion, criterion_group, criterion_main};
use irc_stage_core::{
    ClinicalRecord, GradientBoostingSpec, ModelArtifact, ModelSpec, RegressionTree, TreeNode,
    predict_stage,
};
use std::hint::black_box;

/// 100 stages of depth-2 trees over 5 classes.
fn boosting_artifact() -> ModelArtifact {
    let trees: Vec<Vec<RegressionTree>> = (0..100)
        .map(|stage| {
            (0..5)
                .map(|k| RegressionTree {
                    nodes: vec![
                        TreeNode::split((stage + k) % 11, 10.0, 1, 2),
                        TreeNode::split(1, 12.0 + k as f64, 3, 4),
                        TreeNode::leaf(0.3),
                        TreeNode::leaf(-0.1),
                        TreeNode::leaf(0.2),
                    ],
                })
                .collect()
        })
        .collect();
    ModelArtifact::new(ModelSpec::GradientBoosting(GradientBoostingSpec {
        n_classes: 5,
        learning_rate: 0.1,
        init_scores: vec![-1.6; 5],
        trees,
    }))
}

fn sample_record() -> ClinicalRecord {
    ClinicalRecord {
        uree: 0.5,
        creatinine: 15.0,
        hemoglobine: 10.5,
        sodium: 138.0,
        potassium: 4.8,
        calcium: 2.1,
        age: 70,
        sexe: 1,
        asthenie: 1,
        systole: 150.0,
        etat_general: 3,
    }
}

fn bench_predict_stage(c: &mut Criterion) {
    let model = boosting_artifact().into_model().unwrap();
    let record = sample_record();

    c.bench_function("predict_stage_gradient_boosting_100x5", |b| {
        b.iter(|| predict_stage(black_box(&model), black_box(&record)))
    });
}

fn bench_load_artifact(c: &mut Criterion) {
    let json = boosting_artifact().to_json_pretty().unwrap();

    c.bench_function("parse_and_validate_artifact", |b| {
        b.iter(|| {
            ModelArtifact::from_json(black_box(&json))
                .and_then(ModelArtifact::into_model)
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_predict_stage, bench_load_artifact);
criterion_main!(benches);
