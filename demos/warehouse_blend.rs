//! 倉庫訂單 → 庫存批次 → 混合並存檔的完整流程

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracko_calc::BlendCalculator;
use tracko_core::{BlendInput, Grade, QualityAnalysis, Stage, TrackerConfig};
use tracko_store::{MemoryStorage, NewOrder, StageDetails, TrackerStore};

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("===== Depo Harman Örneği =====\n");

    // 步驟 1: 建立記憶體儲存
    println!("[1] Open store");
    let mut store = TrackerStore::open(MemoryStorage::new(), TrackerConfig::default())?;

    // 步驟 2: 新增訂單並移到倉庫
    println!("[2] Create orders and move them to the warehouse");
    let order_date = NaiveDate::from_ymd_opt(2024, 1, 10).ok_or("invalid date")?;
    let mut ids = Vec::new();
    for (contract, container, truck, kg) in [
        ("CONT-2024-001", "MSCU1234567", "34 ABC 101", 5000),
        ("CONT-2024-002", "TGHU7654321", "34 ABC 202", 16000),
        ("CONT-2024-003", "CMAU5555555", "06 XY 42", 8000),
    ] {
        let id = store
            .create_order(
                NewOrder::new(contract.to_string(), "Vietnam Cashew".to_string(), Grade::WW320, order_date)
                    .with_unit_price(Decimal::new(385, 2))
                    .with_total_kg(Decimal::from(kg)),
            )
            .id
            .clone();

        store.move_stage(
            &id,
            Stage::Warehouse,
            StageDetails {
                container_no: Some(container.to_string()),
                truck_no: Some(truck.to_string()),
                ..StageDetails::default()
            },
        )?;
        println!("    {contract}: {kg} kg → {}", Stage::Warehouse);
        ids.push(id);
    }

    // 步驟 3: 入庫分析（第三筆沒有分析，使用等級預設值）
    println!("\n[3] Record entry analyses");
    store.add_analysis(
        QualityAnalysis::new("CONT-2024-001".to_string(), "MSCU1234567".to_string(), Grade::WW320)
            .with_defects(Decimal::from(309), Decimal::new(8, 1), Decimal::new(2, 1)),
    );
    store.add_analysis(
        QualityAnalysis::new("CONT-2024-002".to_string(), "TGHU7654321".to_string(), Grade::WW320)
            .with_defects(Decimal::from(299), Decimal::new(15, 1), Decimal::new(5, 1)),
    );

    let lots = store.stock_lots();
    for lot in &lots {
        println!(
            "    {} / {}: {} kg, kalibre {}, şak+kırık %{}",
            lot.contract_no, lot.truck_no, lot.available_kg, lot.caliber, lot.breakage_percent
        );
    }

    // 步驟 4: 混合
    println!("\n[4] Blend 40 / 40 / 20");
    let inputs = vec![
        BlendInput::new(ids[0].clone(), Decimal::from(40)),
        BlendInput::new(ids[1].clone(), Decimal::from(40)),
        BlendInput::new(ids[2].clone(), Decimal::from(20)),
    ];
    let result = BlendCalculator::from_config(store.config()).preview(&inputs, &lots)?;
    println!("    Üretim: {} kg", result.max_production_kg.round_dp(2));
    println!("    Kalibre: {}", result.weighted_caliber.round_dp(2));
    println!("    Fire: %{}", result.waste_percent().round_dp(2));
    for warning in &result.warnings {
        println!("    ! {}", warning.message);
    }

    // 步驟 5: 確認並寫入歷史
    println!("\n[5] Commit");
    let history = store.commit_blend(&result, "Örnek harman".to_string(), order_date)?;
    println!("    {} kalem, toplam {} kg", history.items.len(), history.total_kg.round_dp(2));

    Ok(())
}
