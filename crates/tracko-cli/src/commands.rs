//! 子命令執行

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use tracko_calc::{BlendCalculator, StatsCalculator};
use tracko_core::{BlendInput, Grade, StockLot, TrackoError};
use tracko_io::{CsvExporter, ExcelImporter};
use tracko_optimizer::{BlendConstraints, ScenarioPlanner};
use tracko_store::{FileStorage, NewOrder, OrderPatch, OrderQuery, OrderSort, StageDetails, TrackerStore};

use crate::cli::{
    AnalysisCommand, Cli, Commands, FreightCommand, OptimizeArgs, OrderCommand, OrderFieldArgs, OrderListArgs,
    OutputFormat, PriceCommand, SortArg, StageDetailArgs,
};
use crate::config;
use crate::output::{self, Dashboard};

type Store = TrackerStore<FileStorage>;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// 執行命令
pub fn execute(cli: Cli) -> Result<()> {
    let config = config::resolve(&cli)?;
    let storage = FileStorage::open(&config.data_dir)
        .with_context(|| format!("veri dizini açılamadı: {}", config.data_dir.display()))?;
    let mut store = TrackerStore::open(storage, config)?;
    let format = cli.format;

    match cli.command {
        Commands::Order(command) => run_order(&mut store, command, format)?,
        Commands::Price(command) => run_price(&mut store, command, format)?,
        Commands::Freight(command) => run_freight(&mut store, command, format)?,
        Commands::Analysis(command) => run_analysis(&mut store, command, format)?,
        Commands::Import { file, dry_run } => run_import(&mut store, file, dry_run, format)?,
        Commands::Stock => {
            let lots = store.stock_lots();
            output::emit(format, lots.as_slice(), output::stock_table)?;
        }
        Commands::Blend {
            lots,
            complement,
            commit,
            note,
        } => run_blend(&mut store, blend_inputs(lots, complement), commit, note, format)?,
        Commands::Optimize(args) => run_optimize(&store, args, format)?,
        Commands::Stats { grade } => run_stats(&store, grade, format)?,
    }

    if store.is_dirty() {
        let saved = store.save()?;
        tracing::debug!("已寫入 {} 個集合", saved.len());
    }

    Ok(())
}

// ===== 訂單 =====

fn run_order(store: &mut Store, command: OrderCommand, format: OutputFormat) -> Result<()> {
    match command {
        OrderCommand::Add(args) => {
            let mut new_order = NewOrder::new(
                args.contract,
                args.supplier,
                args.grade,
                args.date.unwrap_or_else(today),
            );
            apply_new_order_fields(&mut new_order, args.fields);

            let order = store.create_order(new_order);
            tracing::info!("Sipariş eklendi: {}", order.contract_no);
            output::emit(format, order, output::order_detail)?;
        }
        OrderCommand::List(args) => list_orders(store, args, format)?,
        OrderCommand::Show { id } => {
            let order = store.order(&id)?;
            output::emit(format, order, output::order_detail)?;
        }
        OrderCommand::Update { id, fields } => {
            let order = store.update_order(&id, order_patch(fields))?;
            output::emit(format, order, output::order_detail)?;
        }
        OrderCommand::Move { ids, to, details } => {
            let details = stage_details(details);
            let moved = if ids.len() > 1 && details.is_empty() {
                store.move_many(&ids, to)?
            } else {
                // 先確認所有訂單存在，避免部分移動
                for id in &ids {
                    store.order(id)?;
                }
                let mut moved = 0;
                for id in &ids {
                    if store.move_stage(id, to, details.clone())? {
                        moved += 1;
                    }
                }
                moved
            };
            println!("{} sipariş {} aşamasına taşındı.", moved, to);
        }
        OrderCommand::Archive { id } => {
            let archived = store.toggle_archive(&id)?;
            println!("{}", if archived { "Sipariş arşivlendi." } else { "Sipariş arşivden çıkarıldı." });
        }
        OrderCommand::Delete { id } => {
            let order = store.delete_order(&id)?;
            println!("Sipariş silindi: {}", order.contract_no);
        }
    }
    Ok(())
}

fn list_orders(store: &Store, args: OrderListArgs, format: OutputFormat) -> Result<()> {
    let mut query = OrderQuery::new().with_sort(match args.sort {
        SortArg::Date => OrderSort::OrderDateDesc,
        SortArg::Eta => OrderSort::EtaNearest,
    });
    if let Some(stage) = args.stage {
        query = query.with_stage(stage);
    }
    if args.archived {
        query = query.archived();
    }
    if let Some(search) = args.search {
        query = query.with_search(search);
    }
    if let Some(grade) = args.grade {
        query = query.with_grade(grade);
    }
    if args.upcoming {
        query = query.with_eta_within(store.config().eta_window_days);
    } else if let Some(days) = args.eta_within {
        query = query.with_eta_within(days);
    }

    let orders = store.query_orders(&query, today());

    if let Some(path) = args.export {
        CsvExporter::to_path(&path, |file| CsvExporter::write_orders(file, &orders))?;
        println!("{} sipariş dışa aktarıldı: {}", orders.len(), path.display());
        return Ok(());
    }

    output::emit(format, orders.as_slice(), output::orders_table)
}

fn apply_new_order_fields(order: &mut NewOrder, fields: OrderFieldArgs) {
    if let Some(eta) = fields.eta {
        order.eta = Some(eta);
    }
    if let Some(price) = fields.price {
        order.unit_price = price;
    }
    order.total_kg = fields.kg;
    order.total_lb = fields.lb;
    if let Some(packaging) = fields.packaging {
        order.packaging_type = packaging;
    }
    if let Some(container_type) = fields.container_type {
        order.container_type = container_type;
    }
    order.fcl_count = fields.fcl;
    if let Some(month) = fields.shipment_month {
        order.shipment_month = month;
    }
    order.harvest_year = fields.harvest_year;
    order.fob_price = fields.fob;
    order.cnf_price = fields.cnf;
    order.freight_price = fields.freight;
    if let Some(note) = fields.note {
        order.note = note;
    }
}

fn order_patch(fields: OrderFieldArgs) -> OrderPatch {
    OrderPatch {
        eta: fields.eta,
        note: fields.note,
        packaging_type: fields.packaging,
        unit_price: fields.price,
        total_kg: fields.kg,
        total_lb: fields.lb,
        shipment_month: fields.shipment_month,
        fcl_count: fields.fcl,
        container_type: fields.container_type,
        harvest_year: fields.harvest_year,
        fob_price: fields.fob,
        cnf_price: fields.cnf,
        freight_price: fields.freight,
        ..OrderPatch::default()
    }
}

fn stage_details(args: StageDetailArgs) -> StageDetails {
    StageDetails {
        etd: args.etd,
        eta: args.eta,
        loading_date: args.loading_date,
        booking_no: args.booking_no,
        bl_no: args.bl_no,
        container_no: args.container_no,
        vessel_name: args.vessel,
        payment_status: args.payment,
        port_note: args.port_note,
        antrepo_entry_date: args.antrepo_entry,
        antrepo_declaration_no: args.declaration_no,
        agriculture_analysis_date: args.agriculture_date,
        is_agriculture_approved: args.agriculture_approved,
        antrepo_exit_date: args.antrepo_exit,
        antrepo_status: args.antrepo_status,
        an_ref_no: args.ref_no,
        truck_no: args.truck_no,
        batch_no: args.batch_no,
    }
}

// ===== 價格與運費 =====

fn run_price(store: &mut Store, command: PriceCommand, format: OutputFormat) -> Result<()> {
    match command {
        PriceCommand::Add { grade, price, date } => {
            let record = store.add_price(date.unwrap_or_else(today), grade, price);
            output::emit(format, std::slice::from_ref(&record), output::prices_table)?;
        }
        PriceCommand::Update { id, grade, price, date } => {
            let current = store
                .prices()
                .iter()
                .find(|record| record.id == id)
                .cloned()
                .ok_or_else(|| TrackoError::RecordNotFound(id.clone()))?;
            let record = store.update_price(
                &id,
                date.unwrap_or(current.date),
                grade.unwrap_or(current.grade),
                price.unwrap_or(current.price),
            )?;
            output::emit(format, std::slice::from_ref(&record), output::prices_table)?;
        }
        PriceCommand::Delete { id } => {
            store.delete_price(&id)?;
            println!("Fiyat kaydı silindi.");
        }
        PriceCommand::List { grade } => {
            let mut records: Vec<_> = store
                .prices()
                .iter()
                .filter(|record| grade.map_or(true, |g| record.grade == g))
                .collect();
            records.sort_by(|a, b| b.date.cmp(&a.date));
            output::emit(format, records.as_slice(), output::prices_table)?;
        }
        PriceCommand::Stats => {
            let stats: Vec<_> = Grade::ALL
                .iter()
                .filter_map(|&grade| StatsCalculator::price_stats(store.prices(), grade))
                .collect();
            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({
                    "stats": stats,
                    "tickers": StatsCalculator::price_tickers(store.prices()),
                }))?,
                OutputFormat::Table => {
                    if stats.is_empty() {
                        println!("Fiyat kaydı yok.");
                    } else {
                        output::price_stats_table(&stats);
                    }
                }
            }
        }
        PriceCommand::Export { output } => {
            let path = export_path(output, "kaju_fiyat_takip");
            CsvExporter::to_path(&path, |file| CsvExporter::write_prices(file, store.prices()))?;
            println!("Dışa aktarıldı: {}", path.display());
        }
    }
    Ok(())
}

fn run_freight(store: &mut Store, command: FreightCommand, format: OutputFormat) -> Result<()> {
    match command {
        FreightCommand::Add { price, date } => {
            let record = store.add_freight(date.unwrap_or_else(today), price).clone();
            output::emit(format, std::slice::from_ref(&record), output::freight_table)?;
        }
        FreightCommand::Update { id, price, date } => {
            let current = store
                .freight()
                .iter()
                .find(|record| record.id == id)
                .cloned()
                .ok_or_else(|| TrackoError::RecordNotFound(id.clone()))?;
            let record = store
                .update_freight(&id, date.unwrap_or(current.date), price.unwrap_or(current.price))?
                .clone();
            output::emit(format, std::slice::from_ref(&record), output::freight_table)?;
        }
        FreightCommand::Delete { id } => {
            store.delete_freight(&id)?;
            println!("Navlun kaydı silindi.");
        }
        FreightCommand::List => {
            let mut records = store.freight().to_vec();
            records.sort_by(|a, b| b.date.cmp(&a.date));
            output::emit(format, records.as_slice(), output::freight_table)?;
            if format == OutputFormat::Table {
                if let Some(latest) = store.latest_freight_price() {
                    println!("\nGüncel navlun: ${}", tracko_core::format::format_number_tr(latest));
                }
            }
        }
        FreightCommand::Export { output } => {
            let path = export_path(output, "kaju_navlun_takip");
            CsvExporter::to_path(&path, |file| CsvExporter::write_freight(file, store.freight()))?;
            println!("Dışa aktarıldı: {}", path.display());
        }
    }
    Ok(())
}

fn export_path(output: Option<PathBuf>, prefix: &str) -> PathBuf {
    output.unwrap_or_else(|| PathBuf::from(CsvExporter::default_file_name(prefix, today())))
}

// ===== 分析 =====

fn run_analysis(store: &mut Store, command: AnalysisCommand, format: OutputFormat) -> Result<()> {
    match command {
        AnalysisCommand::List { search, exit } => {
            let term = search.unwrap_or_default();
            if exit {
                let analyses = store.search_exit_analyses(&term);
                output::emit(format, analyses.as_slice(), output::exit_analyses_table)?;
            } else {
                let analyses = store.search_analyses(&term);
                output::emit(format, analyses.as_slice(), output::analyses_table)?;
            }
        }
        AnalysisCommand::Delete { id, exit } => {
            if exit {
                store.delete_exit_analysis(&id)?;
            } else {
                store.delete_analysis(&id)?;
            }
            println!("Analiz silindi.");
        }
    }
    Ok(())
}

// ===== 匯入 =====

fn run_import(store: &mut Store, file: PathBuf, dry_run: bool, format: OutputFormat) -> Result<()> {
    let result = ExcelImporter::import_path(&file)
        .with_context(|| format!("Excel içe aktarılamadı: {}", file.display()))?;

    for error in &result.errors {
        tracing::warn!("{}", error);
    }

    if format == OutputFormat::Json {
        output::print_json(&serde_json::json!({
            "orders": result.orders.len(),
            "analyses": result.analyses.len(),
            "errors": result.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "dry_run": dry_run,
        }))?;
    } else {
        println!(
            "{} sipariş, {} analiz okundu ({} satır hatası).",
            result.orders.len(),
            result.analyses.len(),
            result.errors.len()
        );
    }

    if result.is_empty() {
        bail!("dosyada içe aktarılacak kayıt bulunamadı");
    }

    if dry_run {
        let sheets = tracko_io::sheet_names(&file)?;
        println!("Sayfalar: {}", sheets.join(", "));
        println!("Deneme modu: veriler kaydedilmedi.");
        return Ok(());
    }

    store.replace_all(result.orders, result.analyses);
    Ok(())
}

// ===== 混合 =====

/// `--complement`：第二批比例由第一批補足
fn blend_inputs(mut inputs: Vec<BlendInput>, complement: bool) -> Vec<BlendInput> {
    if complement {
        if let Some(ratio) = inputs.first().map(|input| input.ratio) {
            BlendCalculator::apply_ratio_edit(&mut inputs, 0, ratio);
        }
    }
    inputs
}

fn run_blend(store: &mut Store, inputs: Vec<BlendInput>, commit: bool, note: String, format: OutputFormat) -> Result<()> {
    let calculator = BlendCalculator::from_config(store.config());
    let result = calculator.preview(&inputs, &store.stock_lots())?;
    output::emit(format, &result, output::blend_table)?;

    if commit {
        if !result.is_valid {
            bail!("oranların toplamı %100 olmalı (şu an %{})", result.total_ratio);
        }
        let history = store.commit_blend(&result, note, today())?;
        tracing::info!("Harman kaydedildi: {}", history.id);
        if format == OutputFormat::Table {
            output::blend_history(history);
        }
    }
    Ok(())
}

fn run_optimize(store: &Store, args: OptimizeArgs, format: OutputFormat) -> Result<()> {
    let lots = select_lots(store.stock_lots(), &args.lots)?;
    let constraints = optimize_constraints(&args);
    let planner = ScenarioPlanner::new(constraints)?.with_calculator(BlendCalculator::from_config(store.config()));
    let plan = planner.plan(&lots)?;

    match format {
        OutputFormat::Json => output::print_json(&plan),
        OutputFormat::Table => {
            output::plan_table(&plan, args.best_only);
            Ok(())
        }
    }
}

/// 依 `--lot` 篩選並排序庫存；未指定時使用全部
fn select_lots(stock: Vec<StockLot>, ids: &[String]) -> Result<Vec<StockLot>> {
    if ids.is_empty() {
        return Ok(stock);
    }

    ids.iter()
        .map(|id| {
            stock
                .iter()
                .find(|lot| &lot.id == id)
                .cloned()
                .ok_or_else(|| anyhow::Error::from(TrackoError::RecordNotFound(id.clone())))
        })
        .collect()
}

fn optimize_constraints(args: &OptimizeArgs) -> BlendConstraints {
    let defaults = BlendConstraints::default();
    let mut constraints = defaults.clone().with_caliber_range(
        args.min_caliber.unwrap_or(defaults.min_caliber),
        args.max_caliber.unwrap_or(defaults.max_caliber),
    );
    if let Some(max_breakage) = args.max_breakage {
        constraints = constraints.with_max_breakage(max_breakage);
    }
    if let Some(ratio) = args.min_mix_ratio {
        constraints = constraints.with_min_mix_ratio(ratio);
    }
    if let Some(kg) = args.min_batch_kg {
        constraints = constraints.with_min_batch_kg(kg);
    }
    if let Some(limit) = args.limit_kg {
        constraints = constraints.with_production_limit(limit);
    }
    if let Some(step) = args.ratio_step {
        constraints = constraints.with_ratio_step(step);
    }
    constraints
}

// ===== 統計 =====

fn run_stats(store: &Store, grade: Option<Grade>, format: OutputFormat) -> Result<()> {
    let orders = store.orders();
    let dashboard = Dashboard {
        production: StatsCalculator::production_stats(orders),
        quantities: StatsCalculator::quantity_summary(orders),
        stages: StatsCalculator::stage_matrix(orders),
        inventory: StatsCalculator::inventory_stats(orders, grade),
        prices: Grade::ALL
            .iter()
            .filter_map(|&g| StatsCalculator::price_stats(store.prices(), g))
            .collect(),
    };
    output::emit(format, &dashboard, output::dashboard_table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use tracko_core::TrackerConfig;

    fn lot(id: &str, kg: i64) -> StockLot {
        StockLot::new(id.to_string(), Decimal::from(kg), Decimal::from(300), Decimal::ONE)
    }

    #[test]
    fn test_select_lots_keeps_user_order() {
        let stock = vec![lot("A", 1000), lot("B", 2000), lot("C", 3000)];
        let selected = select_lots(stock, &["C".to_string(), "A".to_string()]).unwrap();

        let ids: Vec<_> = selected.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A"]);
    }

    #[test]
    fn test_select_lots_unknown_id() {
        let stock = vec![lot("A", 1000)];
        assert!(select_lots(stock, &["X".to_string()]).is_err());
    }

    #[test]
    fn test_blend_inputs_complement() {
        let inputs = vec![BlendInput::new("A", Decimal::from(70)), BlendInput::new("B", Decimal::ZERO)];

        let completed = blend_inputs(inputs.clone(), true);
        assert_eq!(completed[1].ratio, Decimal::from(30));

        let untouched = blend_inputs(inputs, false);
        assert_eq!(untouched[1].ratio, Decimal::ZERO);
    }

    #[rstest]
    #[case(None, None, Decimal::from(290), Decimal::from(320))]
    #[case(Some(Decimal::from(280)), None, Decimal::from(280), Decimal::from(320))]
    #[case(Some(Decimal::from(300)), Some(Decimal::from(310)), Decimal::from(300), Decimal::from(310))]
    fn test_optimize_constraints_caliber(
        #[case] min: Option<Decimal>,
        #[case] max: Option<Decimal>,
        #[case] expected_min: Decimal,
        #[case] expected_max: Decimal,
    ) {
        let args = OptimizeArgs {
            lots: Vec::new(),
            min_caliber: min,
            max_caliber: max,
            max_breakage: None,
            min_mix_ratio: None,
            min_batch_kg: None,
            limit_kg: Some(Decimal::from(5000)),
            ratio_step: None,
            best_only: false,
        };
        let constraints = optimize_constraints(&args);

        assert_eq!(constraints.min_caliber, expected_min);
        assert_eq!(constraints.max_caliber, expected_max);
        assert_eq!(constraints.production_limit_kg, Some(Decimal::from(5000)));
    }

    #[test]
    fn test_order_patch_maps_fields() {
        let fields = OrderFieldArgs {
            price: Some(Decimal::new(385, 2)),
            kg: Some(Decimal::from(16000)),
            note: Some("acil".to_string()),
            ..OrderFieldArgs::default()
        };
        let patch = order_patch(fields);

        assert_eq!(patch.unit_price, Some(Decimal::new(385, 2)));
        assert_eq!(patch.total_kg, Some(Decimal::from(16000)));
        assert_eq!(patch.note.as_deref(), Some("acil"));
        assert!(patch.contract_no.is_none());
    }

    #[test]
    fn test_execute_writes_to_data_dir() {
        use clap::Parser;

        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();

        let run = |args: &[&str]| {
            let mut full = vec!["tracko", "--data-dir", data_dir];
            full.extend_from_slice(args);
            execute(Cli::try_parse_from(full).unwrap())
        };

        run(&["price", "add", "--grade", "WW320", "--price", "3,85", "--date", "05.01.2024"]).unwrap();
        run(&["order", "add", "--contract", "C-1", "--supplier", "Acme", "--grade", "WW240", "--kg", "16000"])
            .unwrap();

        let storage = FileStorage::open(dir.path()).unwrap();
        let store = TrackerStore::open(storage, TrackerConfig::new(dir.path().to_path_buf())).unwrap();
        assert_eq!(store.orders().len(), 1);
        assert_eq!(store.orders()[0].contract_no, "C-1");
        // 新訂單也會記錄一筆價格
        assert_eq!(store.prices().len(), 2);
    }
}
