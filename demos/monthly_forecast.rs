//! 月底預測示例

use chrono::NaiveDate;
use pcp::*;
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    pcp::logging::init();

    println!("=== TL1 二月月底預測 ===\n");

    // 單價配置
    let mut store = CostConfigStore::new(UnitCostConfig::parse(
        "2,85",
        "0,58",
        "1950",
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
    )?)?;
    store.save(UnitCostConfig::parse(
        "3,00",
        "0,60",
        "2000",
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
    )?)?;

    // 二月匯入批次：前 12 天有實績
    let records: Vec<ProductionRecord> = (1..=28)
        .map(|d| {
            let date = NaiveDate::from_ymd_opt(2026, 2, d).unwrap();
            let record = ProductionRecord::new(date, RecordSource::Imported)
                .with_planned_volume(Decimal::from(720));
            let record = if d % 9 == 0 {
                record
            } else {
                record.with_sap_code(format!("0001{:04}", d))
            };
            if d <= 12 {
                record
                    .with_executed_volume(Decimal::from(690 + i64::from(d % 4) * 10))
                    .with_gas_consumption(Decimal::from(29_000))
                    .with_energy_consumption(Decimal::from(52_800))
                    .with_metallic_yield_pct(Decimal::new(957, 1))
                    .with_setup_time_minutes(Decimal::from(55))
            } else {
                record
            }
        })
        .collect();

    let config = EngineConfig::new().with_targets(
        ConsumptionTargets::new()
            .with_gas_per_ton(Decimal::from(40))
            .with_energy_per_ton(Decimal::from(75))
            .with_yield_pct(Decimal::from(96)),
    );
    let period = DateRange::month(2026, 2)?;
    let engine = PcpEngine::new(config, store.active_at(period.start).clone())
        .with_calendar(WorkCalendar::continuous("TL1".to_string()));

    let result = engine.calculate(&records, None, period);

    println!("{}", result.missing_items.label);
    println!("資料健康度: {} ({:?})", result.health.score, result.health.grade);
    println!("\nKPI:");
    println!("  總產量: {} t", result.kpi.total_production);
    println!("  平均收得率: {}%", result.kpi.avg_yield_pct.round_dp(2));
    println!("  估算超耗成本: R$ {}", result.kpi.estimated_extra_cost.round_dp(2));

    println!("\n預測（截至 {:?}）:", result.forecast.as_of);
    println!("  已執行: {} t", result.forecast.executed_to_date.volume);
    println!("  預測剩餘: {} t", result.forecast.projected_remaining.volume);
    println!("  月底: {} t", result.forecast.month_end.volume);
    println!("  月底成本: R$ {}", result.forecast.month_end.cost.total().round_dp(2));

    let scenarios = vec![
        SimulationScenario::new().with_label("收得率 +1 p.p.").with_yield_delta_pp(Decimal::ONE),
        SimulationScenario::new()
            .with_label("天然氣 -5%")
            .with_gas_intensity_change_pct(Decimal::from(-5)),
        SimulationScenario::new().with_label("剩 10 天").with_remaining_workdays(10),
    ];

    println!("\n情境:");
    for simulation in engine.compare(&result.forecast, &result.kpi, &scenarios) {
        println!(
            "  {:<16} 節省 R$ {:>12}  每噸 R$ {:>8}  變動 {}%",
            simulation.label.unwrap_or_default(),
            simulation.potential_savings.round_dp(2),
            simulation.cost_per_ton.round_dp(2),
            simulation.variance_pct.round_dp(2)
        );
    }

    Ok(())
}
