use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pcp::*;
use rust_decimal::Decimal;

fn batch() -> Vec<ProductionRecord> {
    (1..=31)
        .map(|d| {
            let date = NaiveDate::from_ymd_opt(2026, 1, d).unwrap();
            let record = ProductionRecord::new(date, RecordSource::Imported)
                .with_planned_volume(Decimal::from(700))
                .with_sap_code(format!("0001{:04}", d));
            if d <= 20 {
                record
                    .with_executed_volume(Decimal::from(680 + i64::from(d)))
                    .with_gas_consumption(Decimal::from(28_000))
                    .with_energy_consumption(Decimal::from(52_000))
                    .with_metallic_yield_pct(Decimal::new(958, 1))
                    .with_setup_time_minutes(Decimal::from(50))
            } else {
                record
            }
        })
        .collect()
}

fn bench_pipeline(c: &mut Criterion) {
    let prices = UnitCostConfig::new(
        Decimal::new(300, 2),
        Decimal::new(60, 2),
        Decimal::from(2000),
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
    );
    let engine = PcpEngine::new(EngineConfig::new(), prices);
    let period = DateRange::month(2026, 1).unwrap();
    let records = batch();

    c.bench_function("monthly_pipeline", |bench| {
        bench.iter(|| engine.calculate(black_box(&records), None, period))
    });

    let baseline = engine.calculate(&records, None, period);
    let scenarios: Vec<_> = (0..32)
        .map(|i| {
            SimulationScenario::new()
                .with_daily_volume(Decimal::from(600 + i * 10))
                .with_yield_delta_pp(Decimal::new(i64::from(i) - 16, 1))
        })
        .collect();

    c.bench_function("compare_32_scenarios", |bench| {
        bench.iter(|| engine.compare(&baseline.forecast, &baseline.kpi, black_box(&scenarios)))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
