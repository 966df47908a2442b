use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use ownership_dashboard::{
    aggregate, logging,
    model::OwnershipColumn,
    report::{CompanyReport, Selection},
    sample::{self, SampleSpec},
};

fn bench_aggregation(c: &mut Criterion) {
    logging::set_silent(true);
    let dataset = sample::dataset(SampleSpec {
        companies: 500,
        quarters: 16,
        seed: 0xBADF00D,
    });
    let selection = Selection::first_company(&dataset).expect("sample has companies");

    let mut group = c.benchmark_group("aggregation");
    group.throughput(Throughput::Elements(dataset.ownership.len() as u64));

    group.bench_function("latest_per_company", |b| {
        b.iter(|| aggregate::latest_per_company(&dataset.ownership))
    });
    group.bench_function("top_n_percent_held", |b| {
        b.iter(|| {
            aggregate::top_n_by_column(
                &dataset.ownership,
                OwnershipColumn::InstitutionPercentHeld,
                10,
                false,
            )
        })
    });
    group.bench_function("company_report", |b| {
        b.iter(|| {
            CompanyReport::build(&dataset, &selection, 10).expect("report builds")
        })
    });

    group.finish();
}

criterion_group!(benches, bench_aggregation);
criterion_main!(benches);
