// Backup Logger - 带审计日志的目录快照备份工具
//
// 主程序入口，负责命令行参数解析和备份流程协调
//
// 功能特性：
// - 普通复制：将源目录完整复制为带时间戳的新目录
// - 压缩归档：打包为 Deflate 压缩的 ZIP 文件
// - 审计日志：每次运行写入一条摘要记录（成功或失败）
// - 交互模式：未提供路径时逐项询问，并记住上次的选择

use anyhow::{anyhow, Context, Result};
use backup_logger::cli::run_interactive_mode;
use backup_logger::{AuditLog, BackupConfig, BackupEngine};
use clap::Parser;
use console::style;
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// 命令行参数结构体
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 源路径（要备份的目录）。省略时进入交互模式
    #[arg(value_name = "SOURCE")]
    source: Option<PathBuf>,

    /// 目标根路径
    #[arg(value_name = "DESTINATION")]
    destination: Option<PathBuf>,

    /// 压缩为 ZIP 归档
    #[arg(short, long)]
    compress: bool,

    /// 附加在备份名称末尾的版本标签
    #[arg(long, value_name = "TAG")]
    tag: Option<String>,

    /// 审计日志文件路径（默认为程序目录下的 logs/backup.log）
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

/// 程序入口
fn main() -> Result<()> {
    let args = Args::parse();

    let config = match (args.source, args.destination) {
        (Some(src), Some(dest)) => BackupConfig::new(src, dest, args.compress, args.tag),
        _ => run_interactive_mode()?,
    };

    let mut engine = BackupEngine::new(config);
    if let Some(path) = &args.log_file {
        let log = AuditLog::open(path)
            .with_context(|| format!("Failed to open log file {:?}", path))?;
        engine = engine.with_log(log);
    }

    let config = engine.config();
    println!("Source: {:?}", style(&config.source).blue());
    println!("Dest:   {:?}", style(&config.destination_root).blue());
    println!(
        "Mode:   {}",
        style(if config.compress { "zip" } else { "copy" }).yellow()
    );
    println!("{}", style("----------------------------------------").dim());

    let backup_path = run_in_background(engine)?;

    println!(
        "{} {}",
        style("Backup finished ->").green().bold(),
        backup_path.display()
    );
    Ok(())
}

/// 在工作线程中执行备份，主线程显示进度指示
fn run_in_background(engine: BackupEngine) -> Result<PathBuf> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Backing up... please wait.");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let worker = thread::spawn(move || engine.run());
    let result = worker
        .join()
        .map_err(|_| anyhow!("Backup worker panicked"));
    spinner.finish_and_clear();

    Ok(result??)
}
