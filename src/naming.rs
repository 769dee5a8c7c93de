// Backup Logger - 备份命名模块
// 生成 `{源目录名}_backup_{时间戳}[_v{版本}]` 形式的备份名称

use crate::utils::base_name;
use chrono::{DateTime, Local};
use std::path::Path;

/// 备份名称中的时间戳格式（秒级精度）
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// 生成备份名称
///
/// 同一源目录、同一版本标签在同一秒内生成的名称相同，
/// 调用方需要自行处理由此产生的冲突。空字符串版本视为未设置。
///
/// # 参数
/// * `source` - 源目录（已规范化）
/// * `version` - 可选版本标签
/// * `now` - 生成名称所用的时间
pub fn backup_name(source: &Path, version: Option<&str>, now: DateTime<Local>) -> String {
    let mut name = format!("{}_backup_{}", base_name(source), now.format(TIMESTAMP_FORMAT));
    if let Some(v) = version.filter(|v| !v.is_empty()) {
        name.push_str("_v");
        name.push_str(v);
    }
    name
}
