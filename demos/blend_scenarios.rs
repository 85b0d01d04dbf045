//! 混合情境規劃示例

use rust_decimal::Decimal;
use tracko_core::StockLot;
use tracko_optimizer::{BlendConstraints, ScenarioPlanner};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Harman Senaryoları ===\n");

    let lots = vec![
        StockLot::new("L1".to_string(), Decimal::from(12000), Decimal::from(325), Decimal::new(15, 1))
            .with_reference("CONT-1".to_string(), "34 AA 1".to_string()),
        StockLot::new("L2".to_string(), Decimal::from(9000), Decimal::from(288), Decimal::new(35, 1))
            .with_reference("CONT-2".to_string(), "34 AA 2".to_string()),
        StockLot::new("L3".to_string(), Decimal::from(6000), Decimal::from(305), Decimal::new(62, 1))
            .with_reference("CONT-3".to_string(), "34 AA 3".to_string()),
        StockLot::new("L4".to_string(), Decimal::from(4000), Decimal::from(300), Decimal::new(9, 1))
            .with_reference("CONT-4".to_string(), "34 AA 4".to_string()),
    ];

    let constraints = BlendConstraints::default()
        .with_caliber_range(Decimal::from(295), Decimal::from(315))
        .with_max_breakage(Decimal::from(4))
        .with_min_batch_kg(Decimal::from(2000));

    println!(
        "Koşullar: kalibre {}-{}, şak+kırık ≤ %{}, min. parti {} kg\n",
        constraints.min_caliber, constraints.max_caliber, constraints.max_breakage, constraints.min_batch_kg
    );

    let plan = ScenarioPlanner::new(constraints)?.plan(&lots)?;

    for (rank, scenario) in plan.scenarios.iter().enumerate() {
        println!(
            "{}{}: {} kg üretim, %{} verim, {} harman",
            scenario.name(rank + 1),
            if scenario.is_best { " ★" } else { "" },
            scenario.total_production_kg.round_dp(0),
            scenario.efficiency_percent.round_dp(1),
            scenario.batch_count()
        );
        for step in &scenario.steps {
            let parts: Vec<String> = step
                .items
                .iter()
                .map(|item| format!("{} %{}", item.lot_id, item.ratio))
                .collect();
            println!("    {}: {} ({} kg)", step.title(), parts.join(" + "), step.total_kg.round_dp(0));
        }
    }

    for message in &plan.messages {
        println!("\n{message}");
    }

    Ok(())
}
