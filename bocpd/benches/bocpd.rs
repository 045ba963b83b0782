use bocpd::generators::normal_segments;
use bocpd::*;
use criterion::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn bench_online_vs_batch(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(100);
    let (_, data) = normal_segments(5, 100, 400, &mut rng).unwrap();

    let mut group = c.benchmark_group("Bocpd");
    for nelems in (100..=500).step_by(100) {
        let subdata: Vec<f64> = data.iter().take(nelems).copied().collect();

        group.throughput(Throughput::Elements(nelems as u64));
        group.bench_with_input(
            BenchmarkId::new("online", nelems),
            &subdata,
            |b, data| {
                b.iter(|| {
                    let mut cpd = Bocpd::new(
                        250.0,
                        ConstantHazard,
                        StudentTUpdater::default(),
                    )
                    .unwrap();
                    for x in data {
                        cpd.update(*x).unwrap();
                    }
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("batch", nelems),
            &subdata,
            |b, data| {
                b.iter(|| {
                    let mut model = StudentTUpdater::default();
                    detect_batch(data, 250.0, &ConstantHazard, &mut model)
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_online_vs_batch);
criterion_main!(benches);
