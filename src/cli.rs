// Backup Logger - 命令行交互界面模块
// 依次询问源路径、目标路径、是否压缩与版本标签

use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use std::path::{Path, PathBuf};

use crate::config::BackupConfig;
use crate::store::Preferences;
use crate::utils::normalize_path;

/// 运行交互式模式
///
/// 上次保存的偏好设置作为各项输入的默认值；
/// 源路径与目标路径在输入时即校验是否存在。
/// 输入完成后写回偏好设置（写入失败只打印警告）。
///
/// # 返回
/// * `Ok(BackupConfig)` - 由用户输入构成的备份配置
/// * `Err(anyhow::Error)` - 终端交互失败
pub fn run_interactive_mode() -> Result<BackupConfig> {
    let prefs = Preferences::load().unwrap_or_else(|e| {
        eprintln!("{} {:#}", style("Warning:").yellow(), e);
        Preferences::default()
    });
    let theme = ColorfulTheme::default();

    println!(
        "{}",
        style(format!("Backup Logger v{}", env!("CARGO_PKG_VERSION")))
            .cyan()
            .bold()
    );
    println!(
        "{}",
        style("----------------------------------------").dim()
    );

    let source = prompt_existing_dir(
        &theme,
        "Enter path to folder to back up",
        &prefs.source,
        "Source folder does not exist.",
    )?;
    let destination = prompt_existing_dir(
        &theme,
        "Enter destination root folder",
        &prefs.destination,
        "Destination folder does not exist.",
    )?;

    let compress = Confirm::with_theme(&theme)
        .with_prompt("Compress to ZIP?")
        .default(prefs.compress)
        .interact()?;

    let version: String = Input::with_theme(&theme)
        .with_prompt("Optional version tag (press Enter to skip)")
        .allow_empty(true)
        .interact_text()?;

    let config = BackupConfig::new(source, destination, compress, Some(version));

    if let Err(e) = config.to_preferences().save() {
        eprintln!("{} {:#}", style("Warning:").yellow(), e);
    }

    Ok(config)
}

/// 询问一个必须已存在的目录路径
fn prompt_existing_dir(
    theme: &ColorfulTheme,
    prompt: &str,
    previous: &Path,
    missing_message: &'static str,
) -> Result<PathBuf> {
    let mut input = Input::<String>::with_theme(theme).with_prompt(prompt);
    if !previous.as_os_str().is_empty() {
        input = input.default(previous.display().to_string());
    }

    let answer = input
        .validate_with(move |s: &String| -> Result<(), &'static str> {
            if normalize_path(Path::new(s.trim())).is_dir() {
                Ok(())
            } else {
                Err(missing_message)
            }
        })
        .interact_text()?;

    Ok(PathBuf::from(answer.trim()))
}
