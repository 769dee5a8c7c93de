// Backup Logger - 源目录扫描模块
// 负责遍历源目录、统计文件数量

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 遍历源目录下的所有文件（不含目录本身）
///
/// 不跟随符号链接：指向目录的符号链接既不计入也不展开，
/// 指向文件的符号链接按文件处理。无法访问的条目记录警告后跳过。
///
/// # 参数
/// * `source` - 源目录
///
/// # 返回
/// 文件的完整路径列表，按遍历顺序排列
pub fn walk_files(source: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(source)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::warn!("Cannot access {:?}: {}", err.path(), err);
                None
            }
        })
        .filter(|e| !e.path().is_dir())
        .map(|e| e.into_path())
}

/// 递归统计源目录中的文件数量
///
/// 在传输开始前调用，保证传输中途失败时摘要记录里仍有文件数。
pub fn count_files(source: &Path) -> u64 {
    walk_files(source).count() as u64
}
