use advisory_core::{build_context, ScenarioFlags};
use advisory_engine::Advisor;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_full_round(c: &mut Criterion) {
    let dataset = county_data::builtin_dataset();
    let flags = ScenarioFlags {
        climate_shock: true,
        export_block: true,
        subsidy_cut: true,
    };
    c.bench_function("all agents x 12 counties", |b| {
        b.iter(|| {
            let mut advisor = Advisor::seeded(42);
            for county in dataset.counties() {
                let ctx = build_context(county, flags, &dataset).unwrap();
                let _ = black_box(advisor.evaluate_all(&ctx));
            }
        })
    });
}

criterion_group!(benches, bench_full_round);
criterion_main!(benches);
