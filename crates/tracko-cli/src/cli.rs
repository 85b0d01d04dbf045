//! 命令列定義

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use tracko_core::format::{parse_date_tr, parse_number_tr};
use tracko_core::{AntrepoStatus, BlendInput, ContainerType, Grade, PackagingType, PaymentStatus, Stage};

/// 輸出格式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// 訂單排序
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// 下單日期（新到舊）
    #[default]
    Date,
    /// 最近到港
    Eta,
}

#[derive(Parser)]
#[command(name = "tracko")]
#[command(version)]
#[command(about = "Kaju/ceviz ticaret takibi: sipariş lojistiği, fiyatlar ve harman hesaplama")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 資料目錄（覆蓋設定檔）
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// 設定檔（JSON）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 輸出格式
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// 詳細日誌
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 訂單管理
    #[command(subcommand)]
    Order(OrderCommand),

    /// 等級價格紀錄
    #[command(subcommand)]
    Price(PriceCommand),

    /// 運費紀錄
    #[command(subcommand)]
    Freight(FreightCommand),

    /// 品質分析
    #[command(subcommand)]
    Analysis(AnalysisCommand),

    /// 從 Excel 匯入（取代現有訂單與分析）
    Import {
        /// .xlsx / .xls 檔案
        file: PathBuf,

        /// 只顯示結果，不寫入
        #[arg(long)]
        dry_run: bool,
    },

    /// 列出可混合的倉庫庫存
    Stock,

    /// 混合計算
    Blend {
        /// 批次與比例，例如 `--lot <ID>:55`
        #[arg(long = "lot", value_parser = parse_lot_ratio, required = true)]
        lots: Vec<BlendInput>,

        /// 兩批次混合時，以第一批比例自動補足第二批至 100
        #[arg(long)]
        complement: bool,

        /// 確認並寫入混合歷史
        #[arg(long)]
        commit: bool,

        /// 備註
        #[arg(long, default_value = "")]
        note: String,
    },

    /// 產生混合情境
    Optimize(OptimizeArgs),

    /// 儀表板統計
    Stats {
        /// 只計算此等級的庫存成本
        #[arg(long)]
        grade: Option<Grade>,
    },
}

#[derive(Subcommand)]
pub enum OrderCommand {
    /// 新增訂單
    Add(OrderAddArgs),

    /// 列出訂單
    List(OrderListArgs),

    /// 顯示訂單明細
    Show { id: String },

    /// 修改訂單
    Update {
        id: String,

        #[command(flatten)]
        fields: OrderFieldArgs,
    },

    /// 移動到其他階段
    Move {
        /// 訂單 ID（可多個）
        #[arg(required = true)]
        ids: Vec<String>,

        /// 目標階段（Sipariş, Yüklendi, Yolda, Limanda, Antrepoda, Depoda）
        #[arg(long)]
        to: Stage,

        #[command(flatten)]
        details: StageDetailArgs,
    },

    /// 切換封存狀態
    Archive { id: String },

    /// 刪除訂單
    Delete { id: String },
}

#[derive(Args)]
pub struct OrderAddArgs {
    #[arg(long)]
    pub contract: String,

    #[arg(long)]
    pub supplier: String,

    #[arg(long)]
    pub grade: Grade,

    /// 下單日期（dd.mm.yyyy，預設今天）
    #[arg(long, value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,

    #[command(flatten)]
    pub fields: OrderFieldArgs,
}

/// 新增與修改共用的欄位
#[derive(Args, Default)]
pub struct OrderFieldArgs {
    /// 預計到港日（dd.mm.yyyy）
    #[arg(long, value_parser = parse_date_arg)]
    pub eta: Option<NaiveDate>,

    /// 單價（$/lb）
    #[arg(long, value_parser = parse_decimal_arg)]
    pub price: Option<Decimal>,

    /// 數量（公斤）
    #[arg(long, value_parser = parse_decimal_arg, conflicts_with = "lb")]
    pub kg: Option<Decimal>,

    /// 數量（磅）
    #[arg(long, value_parser = parse_decimal_arg)]
    pub lb: Option<Decimal>,

    #[arg(long)]
    pub packaging: Option<PackagingType>,

    /// 貨櫃尺寸（20 或 40）
    #[arg(long)]
    pub container_type: Option<ContainerType>,

    #[arg(long)]
    pub fcl: Option<u32>,

    #[arg(long)]
    pub shipment_month: Option<String>,

    #[arg(long)]
    pub harvest_year: Option<String>,

    #[arg(long, value_parser = parse_decimal_arg)]
    pub fob: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal_arg)]
    pub cnf: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal_arg)]
    pub freight: Option<Decimal>,

    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Args)]
pub struct OrderListArgs {
    #[arg(long)]
    pub stage: Option<Stage>,

    /// 顯示封存訂單
    #[arg(long)]
    pub archived: bool,

    /// 搜尋（合約號、供應商、提單號、船名）
    #[arg(long, short = 's')]
    pub search: Option<String>,

    #[arg(long)]
    pub grade: Option<Grade>,

    /// 只顯示即將到港（使用設定的天數）
    #[arg(long, conflicts_with = "eta_within")]
    pub upcoming: bool,

    /// 只顯示 N 天內到港
    #[arg(long)]
    pub eta_within: Option<u32>,

    #[arg(long, value_enum, default_value_t = SortArg::Date)]
    pub sort: SortArg,

    /// 匯出為 CSV
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// 階段轉移資料
#[derive(Args, Default)]
pub struct StageDetailArgs {
    #[arg(long, value_parser = parse_date_arg)]
    pub etd: Option<NaiveDate>,

    #[arg(long, value_parser = parse_date_arg)]
    pub eta: Option<NaiveDate>,

    #[arg(long, value_parser = parse_date_arg)]
    pub loading_date: Option<NaiveDate>,

    #[arg(long)]
    pub booking_no: Option<String>,

    #[arg(long)]
    pub bl_no: Option<String>,

    #[arg(long)]
    pub container_no: Option<String>,

    #[arg(long)]
    pub vessel: Option<String>,

    /// 付款狀態（Ödendi / Ödeme bekliyor）
    #[arg(long)]
    pub payment: Option<PaymentStatus>,

    #[arg(long)]
    pub port_note: Option<String>,

    #[arg(long, value_parser = parse_date_arg)]
    pub antrepo_entry: Option<NaiveDate>,

    #[arg(long)]
    pub declaration_no: Option<String>,

    #[arg(long, value_parser = parse_date_arg)]
    pub agriculture_date: Option<NaiveDate>,

    #[arg(long)]
    pub agriculture_approved: Option<bool>,

    #[arg(long, value_parser = parse_date_arg)]
    pub antrepo_exit: Option<NaiveDate>,

    #[arg(long)]
    pub antrepo_status: Option<AntrepoStatus>,

    #[arg(long)]
    pub ref_no: Option<String>,

    #[arg(long)]
    pub truck_no: Option<String>,

    #[arg(long)]
    pub batch_no: Option<String>,
}

#[derive(Subcommand)]
pub enum PriceCommand {
    /// 新增價格
    Add {
        #[arg(long)]
        grade: Grade,

        #[arg(long, value_parser = parse_decimal_arg)]
        price: Decimal,

        /// 日期（dd.mm.yyyy，預設今天）
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// 修改價格紀錄
    Update {
        id: String,

        #[arg(long)]
        grade: Option<Grade>,

        #[arg(long, value_parser = parse_decimal_arg)]
        price: Option<Decimal>,

        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// 刪除價格紀錄
    Delete { id: String },

    /// 列出價格紀錄
    List {
        #[arg(long)]
        grade: Option<Grade>,
    },

    /// 各等級價格統計
    Stats,

    /// 匯出 CSV
    Export {
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum FreightCommand {
    /// 新增運費
    Add {
        #[arg(long, value_parser = parse_decimal_arg)]
        price: Decimal,

        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// 修改運費紀錄
    Update {
        id: String,

        #[arg(long, value_parser = parse_decimal_arg)]
        price: Option<Decimal>,

        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// 刪除運費紀錄
    Delete { id: String },

    /// 列出運費紀錄
    List,

    /// 匯出 CSV
    Export {
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AnalysisCommand {
    /// 列出分析
    List {
        /// 搜尋（合約號、貨櫃號、批號、卡車號）
        #[arg(long, short = 's')]
        search: Option<String>,

        /// 出庫分析
        #[arg(long)]
        exit: bool,
    },

    /// 刪除分析
    Delete {
        id: String,

        #[arg(long)]
        exit: bool,
    },
}

#[derive(Args)]
pub struct OptimizeArgs {
    /// 只使用這些批次（依輸入順序作為使用者優先順序）
    #[arg(long = "lot")]
    pub lots: Vec<String>,

    #[arg(long, value_parser = parse_decimal_arg)]
    pub min_caliber: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal_arg)]
    pub max_caliber: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal_arg)]
    pub max_breakage: Option<Decimal>,

    /// 兩批次混合時每批最低比例（%）
    #[arg(long, value_parser = parse_decimal_arg)]
    pub min_mix_ratio: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal_arg)]
    pub min_batch_kg: Option<Decimal>,

    /// 總產量上限（公斤）
    #[arg(long, value_parser = parse_decimal_arg)]
    pub limit_kg: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal_arg)]
    pub ratio_step: Option<Decimal>,

    /// 只顯示最佳情境
    #[arg(long)]
    pub best_only: bool,
}

/// `ID:RATIO`（比例可用逗號小數；無法解析的比例視為 0）
pub fn parse_lot_ratio(value: &str) -> Result<BlendInput, String> {
    let (id, ratio) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("'{value}' 格式應為 ID:ORAN"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("'{value}' 缺少批次 ID"));
    }
    Ok(BlendInput::new(id, parse_number_tr(ratio)))
}

/// 十進位數（接受 `3,85` 與 `3.85`）
pub fn parse_decimal_arg(value: &str) -> Result<Decimal, String> {
    Decimal::from_str(&value.trim().replace(',', ".")).map_err(|e| format!("'{value}': {e}"))
}

/// 日期（`dd.mm.yyyy`、`dd/mm/yyyy` 或 `yyyy-mm-dd`）
pub fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date_tr(value).ok_or_else(|| format!("'{value}' geçersiz tarih (gg.aa.yyyy)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case("abc-123:55", "abc-123", Decimal::from(55))]
    #[case("lot:12,5", "lot", Decimal::new(125, 1))]
    #[case("a:b:45", "a:b", Decimal::from(45))]
    #[case("A:abc", "A", Decimal::ZERO)]
    #[case("A:", "A", Decimal::ZERO)]
    #[case("A:12,5", "A", Decimal::new(125, 1))]
    #[case("A:1.234,5", "A", Decimal::new(12345, 1))]
    fn test_parse_lot_ratio(#[case] raw: &str, #[case] id: &str, #[case] ratio: Decimal) {
        let input = parse_lot_ratio(raw).unwrap();
        assert_eq!(input.lot_id.as_deref(), Some(id));
        assert_eq!(input.ratio, ratio);
    }

    #[rstest]
    #[case("55")]
    #[case(":55")]
    #[case("  :55")]
    fn test_parse_lot_ratio_rejects(#[case] raw: &str) {
        assert!(parse_lot_ratio(raw).is_err());
    }

    #[test]
    fn test_parse_blend_command() {
        let cli = Cli::try_parse_from([
            "tracko", "blend", "--lot", "A:55", "--lot", "B:45", "--commit", "--format", "json",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Blend { lots, commit, .. } => {
                assert_eq!(lots.len(), 2);
                assert!(commit);
            }
            _ => panic!("expected blend command"),
        }
    }

    #[test]
    fn test_blend_keeps_malformed_ratio_as_zero() {
        let cli = Cli::try_parse_from(["tracko", "blend", "--lot", "A:abc", "--lot", "B:100"]).unwrap();

        match cli.command {
            Commands::Blend { lots, complement, .. } => {
                assert_eq!(lots[0].ratio, Decimal::ZERO);
                assert_eq!(lots[1].ratio, Decimal::ONE_HUNDRED);
                assert!(!complement);
            }
            _ => panic!("expected blend command"),
        }
    }

    #[test]
    fn test_parse_order_move() {
        let cli = Cli::try_parse_from([
            "tracko", "order", "move", "id-1", "--to", "Depoda", "--truck-no", "34 ABC 101",
        ])
        .unwrap();

        match cli.command {
            Commands::Order(OrderCommand::Move { ids, to, details }) => {
                assert_eq!(ids, vec!["id-1"]);
                assert_eq!(to, Stage::Warehouse);
                assert_eq!(details.truck_no.as_deref(), Some("34 ABC 101"));
            }
            _ => panic!("expected order move"),
        }
    }

    #[test]
    fn test_parse_date_arg() {
        assert_eq!(parse_date_arg("15.01.2024"), Ok(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
        assert!(parse_date_arg("yarın").is_err());
    }
}
