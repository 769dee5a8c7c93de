// Backup Logger - 工具函数模块
// 提供路径展开、规范化等辅助功能

use directories::BaseDirs;
use path_clean::PathClean;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// 展开路径开头的 `~`
///
/// 仅处理 `~` 与 `~/...` 两种形式；`~user` 原样返回。
/// 无法确定主目录时也原样返回。
pub fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match BaseDirs::new() {
            Some(dirs) => dirs.home_dir().join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// 将路径规范化为绝对路径
///
/// # 流程
/// 1. 展开 `~`
/// 2. 相对路径基于当前工作目录拼接
/// 3. 路径存在时解析符号链接，否则仅做词法清理（去掉 `.` 与 `..`）
/// 4. 去掉 Windows 上 `canonicalize` 附加的 `\\?\` 前缀
///
/// 不检查路径是否存在。
pub fn normalize_path(path: &Path) -> PathBuf {
    let expanded = expand_home(path);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    };

    match fs::canonicalize(&absolute) {
        Ok(resolved) => strip_verbatim_prefix(&resolved),
        Err(_) => absolute.clean(),
    }
}

/// 移除逐字路径前缀
///
/// 将带有 `\\?\` 前缀的路径转换回普通路径格式，便于显示和记录日志。
/// UNC 形式 `\\?\UNC\server\share` 转换为 `\\server\share`。
pub fn strip_verbatim_prefix(path: &Path) -> PathBuf {
    let p = path.to_string_lossy();
    if let Some(unc) = p.strip_prefix(r"\\?\UNC\") {
        PathBuf::from(format!(r"\\{}", unc))
    } else if let Some(stripped) = p.strip_prefix(r"\\?\") {
        PathBuf::from(stripped)
    } else {
        path.to_path_buf()
    }
}

/// 从路径获取基础名称
///
/// 使用路径最后一部分去掉扩展名后的名称。
/// 例如：`/home/me/project` -> `project`，`/etc/conf.d` -> `conf`
/// 对于驱动器根路径：`D:\` -> `D_Drive`，Unix 根目录 -> `Root_Backup`
pub fn base_name(path: &Path) -> String {
    if let Some(name) = path.file_stem() {
        return name.to_string_lossy().to_string();
    }

    let path_str = path.to_string_lossy();
    match path_str.find(':') {
        Some(colon_idx) if colon_idx > 0 => {
            let drive = &path_str[colon_idx - 1..colon_idx];
            format!("{}_Drive", drive.to_uppercase())
        }
        Some(_) => "Unknown_Drive".to_string(),
        None => "Root_Backup".to_string(),
    }
}
