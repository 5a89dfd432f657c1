use criterion::measurement::Measurement;
use criterion::{criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion};
use ndarray::Array2;
use party_analysis::density::{Kernel, KernelDensity};
use party_analysis::{pipeline, AnalysisConfig, Column, LogHandle, PreprocessConfig, Table};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::time::Duration;

#[derive(Clone)]
pub struct SurveyConfig {
    seed: u64,
    table_sizes: Vec<(usize, usize)>,
    measurement_time: u64,
    sample_size: usize,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            table_sizes: vec![(50, 10), (250, 40), (1000, 60)],
            measurement_time: 10,
            sample_size: 10,
        }
    }
}

/// Synthetic survey: a key column plus `features` normally distributed
/// expert scores.
fn create_survey(rows: usize, features: usize, seed: u64) -> Table {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let score = Normal::new(5.0, 2.0).unwrap();

    let mut columns = vec![Column::numeric(
        "party_id",
        (0..rows).map(|i| i as f64).collect(),
    )];
    for j in 0..features {
        columns.push(Column::numeric(
            format!("q{}", j),
            (0..rows).map(|_| score.sample(&mut rng)).collect(),
        ));
    }
    Table::new(columns).unwrap()
}

fn create_points(rows: usize, dims: usize, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    Array2::from_shape_fn((rows, dims), |_| normal.sample(&mut rng))
}

fn configure_group<'a, M: Measurement>(
    c: &'a mut Criterion<M>,
    name: &str,
    config: &SurveyConfig,
) -> BenchmarkGroup<'a, M> {
    let mut group = c.benchmark_group(name);
    group.measurement_time(Duration::from_secs(config.measurement_time));
    group.sample_size(config.sample_size);
    group
}

fn bench_pipeline(c: &mut Criterion) {
    let config = SurveyConfig::default();
    let log = LogHandle::detached();
    let analysis = AnalysisConfig::new().preprocess(PreprocessConfig::new().key_columns(["party_id"]));
    let mut group = configure_group(c, "pipeline", &config);

    for &(rows, features) in &config.table_sizes {
        let table = create_survey(rows, features, config.seed);
        group.bench_with_input(
            BenchmarkId::new("run", format!("{}x{}", rows, features)),
            &table,
            |b, table| {
                b.iter(|| pipeline::run(table, &analysis, &log).unwrap());
            },
        );
    }
    group.finish();
}

fn bench_density(c: &mut Criterion) {
    let config = SurveyConfig::default();
    let mut group = configure_group(c, "kernel_density", &config);

    for &(rows, _) in &config.table_sizes {
        let points = create_points(rows, 2, config.seed);
        let kde = KernelDensity::fit(points.view(), Kernel::Gaussian, 0.5).unwrap();

        group.bench_with_input(BenchmarkId::new("score_samples", rows), &points, |b, points| {
            b.iter(|| kde.score_samples(points.view()).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("sample", rows), &rows, |b, &rows| {
            let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
            b.iter(|| kde.sample(rows, &mut rng).unwrap());
        });
    }
    group.finish();
}

criterion_group!(pipeline_benches, bench_pipeline, bench_density);
criterion_main!(pipeline_benches);
