//! Tracko - 腰果/核桃貿易追蹤命令列工具
//!
//! 訂單物流追蹤、價格紀錄、Excel 匯入與混合計算。

mod cli;
mod commands;
mod config;
mod logging;
mod output;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = commands::execute(cli) {
        eprintln!("Hata: {:#}", e);
        std::process::exit(1);
    }
}
