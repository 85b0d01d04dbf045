//! 輸出格式化

use anyhow::Result;
use serde::Serialize;
use tracko_calc::stats::{InventoryStats, PriceStats, ProductionStats, QuantitySummary, StageMatrix};
use tracko_calc::BlendResult;
use tracko_core::format::{format_date_tr, format_number_tr, format_thousands_tr};
use tracko_core::{
    BlendHistory, ExitAnalysis, FreightRecord, Order, PriceRecord, QualityAnalysis, Stage, StockLot,
};
use tracko_optimizer::PlanResult;

use crate::cli::OutputFormat;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 依輸出格式列印；表格模式使用 `table`
pub fn emit<T: Serialize + ?Sized>(format: OutputFormat, value: &T, table: impl FnOnce(&T)) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => {
            table(value);
            Ok(())
        }
    }
}

fn date_or_dash(date: Option<chrono::NaiveDate>) -> String {
    date.map(format_date_tr).unwrap_or_else(|| "-".to_string())
}

pub fn orders_table(orders: &[&Order]) {
    if orders.is_empty() {
        println!("Sipariş bulunamadı.");
        return;
    }

    println!(
        "{:<36}  {:<16}  {:<20}  {:<6}  {:<10}  {:<10}  {:<10}  {:>12}",
        "ID", "Kontrat", "Tedarikçi", "Grade", "Aşama", "Tarih", "ETA", "KG"
    );
    for order in orders {
        println!(
            "{:<36}  {:<16}  {:<20}  {:<6}  {:<10}  {:<10}  {:<10}  {:>12}",
            order.id,
            order.contract_no,
            order.supplier,
            order.grade,
            order.stage,
            date_or_dash(order.order_date),
            date_or_dash(order.eta),
            format_thousands_tr(order.total_kg),
        );
    }
    println!("\n{} sipariş", orders.len());
}

pub fn order_detail(order: &Order) {
    println!("Sipariş {}", order.id);
    println!("=====================================");
    println!("Kontrat:        {}", order.contract_no);
    println!("Tedarikçi:      {}", order.supplier);
    println!("Grade:          {}", order.grade);
    println!("Aşama:          {}{}", order.stage, if order.is_archived { " (arşiv)" } else { "" });
    println!("Sipariş Tarihi: {}", date_or_dash(order.order_date));
    println!("ETA:            {}", date_or_dash(order.eta));
    println!("Ambalaj:        {}", order.packaging_type);
    println!("Konteyner:      {} x {}", order.fcl_count, order.container_type);
    println!("Miktar:         {} kg / {} lb", format_thousands_tr(order.total_kg), format_thousands_tr(order.total_lb));
    println!("Birim Fiyat:    ${}", format_number_tr(order.unit_price));
    println!("Toplam:         ${}", format_number_tr(order.total_price));

    let optional = [
        ("B/L No", order.bl_no.as_deref()),
        ("Booking No", order.booking_no.as_deref()),
        ("Konteyner No", order.container_no.as_deref()),
        ("Gemi", order.vessel_name.as_deref()),
        ("Liman Notu", order.port_note.as_deref()),
        ("Beyanname No", order.antrepo_declaration_no.as_deref()),
        ("Ref. No", order.an_ref_no.as_deref()),
        ("Tır No", order.truck_no.as_deref()),
        ("Parti No", order.batch_no.as_deref()),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            println!("{:<16}{}", format!("{label}:"), value);
        }
    }
    if let Some(status) = order.payment_status {
        println!("Ödeme:          {}", status.label());
    }
    if let Some(status) = order.antrepo_status {
        println!("Antrepo Durumu: {}", status.label());
    }
    if !order.note.is_empty() {
        println!("Not:            {}", order.note);
    }
}

pub fn prices_table(records: &[&PriceRecord]) {
    println!("{:<36}  {:<10}  {:<6}  {:>8}  {:>8}  Durum", "ID", "Tarih", "Grade", "Fiyat", "Değişim");
    for record in records {
        println!(
            "{:<36}  {:<10}  {:<6}  {:>8}  {:>8}  {}",
            record.id,
            format_date_tr(record.date),
            record.grade,
            format_number_tr(record.price),
            record.change,
            record.trend.arrow()
        );
    }
}

pub fn freight_table(records: &[FreightRecord]) {
    println!("{:<36}  {:<10}  {:>10}  {:>10}  Durum", "ID", "Tarih", "Fiyat", "Değişim");
    for record in records {
        println!(
            "{:<36}  {:<10}  {:>10}  {:>10}  {}",
            record.id,
            format_date_tr(record.date),
            format_number_tr(record.price),
            record.change,
            record.trend.arrow()
        );
    }
}

pub fn price_stats_table(stats: &[PriceStats]) {
    println!(
        "{:<6}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}",
        "Grade", "Güncel", "Ort.", "Max", "Min", "Fark %"
    );
    for item in stats {
        println!(
            "{:<6}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}",
            item.grade,
            format_number_tr(item.current),
            format_number_tr(item.average),
            format_number_tr(item.max),
            format_number_tr(item.min),
            format_number_tr(item.diff_from_average_percent),
        );
    }
}

pub fn analyses_table(analyses: &[&QualityAnalysis]) {
    println!(
        "{:<16}  {:<14}  {:<6}  {:<10}  {:>8}  {:>8}  {:>6}",
        "Kontrat", "Konteyner", "Grade", "Tarih", "Kalibre", "Şak+Kır", "Nem"
    );
    for analysis in analyses {
        println!(
            "{:<16}  {:<14}  {:<6}  {:<10}  {:>8}  {:>8}  {:>6}",
            analysis.contract_no,
            analysis.container_no,
            analysis.grade,
            date_or_dash(analysis.date),
            format_thousands_tr(analysis.caliber),
            format_number_tr(analysis.breakage_total()),
            format_number_tr(analysis.moisture),
        );
    }
}

pub fn exit_analyses_table(analyses: &[&ExitAnalysis]) {
    println!(
        "{:<16}  {:<10}  {:<16}  {:<6}  {:>8}  {:>8}",
        "Kontrat", "Lot", "Müşteri", "Grade", "Kalibre", "Şak+Kır"
    );
    for analysis in analyses {
        println!(
            "{:<16}  {:<10}  {:<16}  {:<6}  {:>8}  {:>8}",
            analysis.base.contract_no,
            analysis.lot,
            analysis.customer,
            analysis.base.grade,
            format_thousands_tr(analysis.base.caliber),
            format_number_tr(analysis.base.breakage_total()),
        );
    }
}

pub fn stock_table(lots: &[StockLot]) {
    if lots.is_empty() {
        println!("Depoda stok yok.");
        return;
    }

    println!(
        "{:<36}  {:<16}  {:<12}  {:>12}  {:>8}  {:>8}",
        "ID", "Kontrat", "Tır No", "Mevcut (kg)", "Kalibre", "Şak+Kır"
    );
    for lot in lots {
        println!(
            "{:<36}  {:<16}  {:<12}  {:>12}  {:>8}  {:>8}",
            lot.id,
            lot.contract_no,
            lot.truck_no,
            format_thousands_tr(lot.available_kg),
            format_thousands_tr(lot.caliber),
            format_number_tr(lot.breakage_percent),
        );
    }
}

pub fn blend_table(result: &BlendResult) {
    println!("\nHarman Sonucu");
    println!("=============");
    println!(
        "Toplam oran:      %{} {}",
        format_number_tr(result.total_ratio),
        if result.is_valid { "(geçerli)" } else { "(toplam %100 olmalı)" }
    );
    println!("Maks. üretim:     {} kg", format_number_tr(result.max_production_kg));
    println!("Ort. kalibre:     {}", format_number_tr(result.weighted_caliber));
    println!("Ort. şak+kırık:   %{}", format_number_tr(result.weighted_breakage));
    println!("Fire:             %{}", format_number_tr(result.waste_percent()));

    println!(
        "\n{:<36}  {:>6}  {:>12}  {:>12}  {:>12}",
        "Parti", "Oran", "Mevcut", "Kullanılan", "Kalan"
    );
    for usage in &result.per_lot_usage {
        println!(
            "{:<36}  {:>6}  {:>12}  {:>12}  {:>12}{}",
            usage.lot_id,
            format_thousands_tr(usage.ratio),
            format_number_tr(usage.available_kg),
            format_number_tr(usage.used_kg),
            format_number_tr(usage.remaining_kg),
            if usage.is_bottleneck { "  ← darboğaz" } else { "" }
        );
    }

    for warning in &result.warnings {
        println!("! {}", warning.message);
    }
}

pub fn blend_history(history: &BlendHistory) {
    println!(
        "\nHarman kaydedildi: {} kg, fire %{}",
        format_number_tr(history.total_kg),
        format_number_tr(history.waste_percent)
    );
}

pub fn plan_table(plan: &PlanResult, best_only: bool) {
    for message in &plan.messages {
        println!("{message}");
    }

    for (rank, scenario) in plan.scenarios.iter().enumerate() {
        if best_only && !scenario.is_best {
            continue;
        }

        println!("\n{}{}", scenario.name(rank + 1), if scenario.is_best { "  ★" } else { "" });
        println!(
            "  Üretim {} kg | Kalibre {} | Şak+Kırık %{} | Kalan {} kg | Verim %{} | {} harman",
            format_number_tr(scenario.total_production_kg),
            format_number_tr(scenario.avg_caliber),
            format_number_tr(scenario.avg_breakage),
            format_number_tr(scenario.remaining_kg),
            format_number_tr(scenario.efficiency_percent),
            scenario.batch_count()
        );
        for step in &scenario.steps {
            println!(
                "  {}: {} kg, kalibre {}, şak+kırık %{}",
                step.title(),
                format_number_tr(step.total_kg),
                format_number_tr(step.caliber),
                format_number_tr(step.breakage)
            );
            for item in &step.items {
                println!(
                    "    - {} ({}) %{} → {} kg",
                    item.contract_no,
                    item.truck_no,
                    format_thousands_tr(item.ratio),
                    format_number_tr(item.used_kg)
                );
            }
        }
    }
}

/// 儀表板統計
#[derive(Serialize)]
pub struct Dashboard {
    pub production: ProductionStats,
    pub quantities: QuantitySummary,
    pub stages: StageMatrix,
    pub inventory: InventoryStats,
    pub prices: Vec<PriceStats>,
}

pub fn dashboard_table(dashboard: &Dashboard) {
    let production = &dashboard.production;
    println!("Üretim Özeti");
    println!("============");
    println!(
        "Toplam: {} kg / {} lb / {} FCL",
        format_thousands_tr(production.total_kg),
        format_thousands_tr(production.total_lb),
        production.total_fcl
    );
    for share in &production.grades {
        println!("  {:<8} {:>12} kg  %{}", share.name, format_thousands_tr(share.kg), format_number_tr(share.percent));
    }
    println!("En büyük tedarikçiler:");
    for share in &production.top_suppliers {
        println!("  {:<24} {:>12} kg  %{}", share.name, format_thousands_tr(share.kg), format_number_tr(share.percent));
    }

    println!("\nMiktar (ton)");
    println!("{:<8}  {:>10}  {:>10}  {:>10}", "Grade", "Beklenen", "Antrepo", "Depo");
    for row in dashboard.quantities.rows.iter().chain(std::iter::once(&dashboard.quantities.totals)) {
        println!(
            "{:<8}  {:>10}  {:>10}  {:>10}",
            row.grade.map_or("Toplam".to_string(), |g| g.to_string()),
            format_number_tr(row.expected_t),
            format_number_tr(row.bonded_t),
            format_number_tr(row.warehouse_t)
        );
    }

    println!("\nAşama Dağılımı");
    let header: Vec<String> = Stage::ALL.iter().map(|stage| format!("{:>9}", stage.label())).collect();
    println!("{:<8}{}  {:>6}", "Grade", header.join(""), "Toplam");
    for row in dashboard.stages.rows.iter().chain(std::iter::once(&dashboard.stages.totals)) {
        let counts: Vec<String> = row.counts.iter().map(|count| format!("{count:>9}")).collect();
        println!(
            "{:<8}{}  {:>6}",
            row.grade.map_or("Toplam".to_string(), |g| g.to_string()),
            counts.join(""),
            row.total
        );
    }

    let inventory = &dashboard.inventory;
    println!("\nStok Maliyeti");
    println!(
        "Depo:           ${}/lb ({} lb)",
        format_number_tr(inventory.warehouse_avg_price),
        format_thousands_tr(inventory.warehouse_lb)
    );
    println!(
        "Antrepo + Depo: ${}/lb ({} lb)",
        format_number_tr(inventory.combined_avg_price),
        format_thousands_tr(inventory.combined_lb)
    );

    if !dashboard.prices.is_empty() {
        println!("\nFiyatlar");
        price_stats_table(&dashboard.prices);
    }
}
