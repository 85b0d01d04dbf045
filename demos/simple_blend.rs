//! 簡單混合計算示例

use rust_decimal::Decimal;
use tracko_calc::BlendCalculator;
use tracko_core::{BlendInput, StockLot};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Basit Harman Hesabı ===\n");

    let lots = vec![
        StockLot::new("A".to_string(), Decimal::from(5000), Decimal::from(309), Decimal::ONE)
            .with_reference("CONT-A".to_string(), "34 ABC 101".to_string()),
        StockLot::new("B".to_string(), Decimal::from(16000), Decimal::from(299), Decimal::TWO)
            .with_reference("CONT-B".to_string(), "34 ABC 202".to_string()),
    ];

    println!("Stok:");
    for lot in &lots {
        println!(
            "  - {} ({}): {} kg, kalibre {}, şak+kırık %{}",
            lot.id, lot.contract_no, lot.available_kg, lot.caliber, lot.breakage_percent
        );
    }

    let inputs = vec![
        BlendInput::new("A", Decimal::from(55)),
        BlendInput::new("B", Decimal::from(45)),
    ];

    let result = BlendCalculator::default().preview(&inputs, &lots)?;

    println!("\nSonuç:");
    println!("  Toplam oran:    %{}", result.total_ratio);
    println!("  Maks. üretim:   {} kg", result.max_production_kg.round_dp(2));
    println!("  Ort. kalibre:   {}", result.weighted_caliber.round_dp(2));
    println!("  Ort. şak+kırık: %{}", result.weighted_breakage.round_dp(2));
    println!("  Darboğaz:       {}", result.bottleneck_lot_id.as_deref().unwrap_or("-"));

    for usage in &result.per_lot_usage {
        println!(
            "  - {}: kullanılan {} kg, kalan {} kg",
            usage.lot_id,
            usage.used_kg.round_dp(2),
            usage.remaining_kg.round_dp(2)
        );
    }

    Ok(())
}
