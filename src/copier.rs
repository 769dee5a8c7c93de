// Backup Logger - 目录复制模块
// 普通复制模式：将整棵源目录树复制到新的目标目录

use crate::error::BackupError;
use filetime::FileTime;
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// 递归复制目录树
///
/// 目标目录必须不存在，否则返回 `BackupError::AlreadyExists`。
/// 符号链接会被跟随（复制链接目标的内容）。中途失败时不回滚，
/// 已复制的部分保留在目标目录中。
///
/// # 参数
/// * `source` - 源目录
/// * `dest` - 新建的目标目录
///
/// # 返回
/// * `Ok(u64)` - 复制的文件数量
/// * `Err(BackupError)` - 复制失败
pub fn copy_tree(source: &Path, dest: &Path) -> Result<u64, BackupError> {
    tracing::info!("Copying directory tree -> {}", dest.display());

    fs::create_dir(dest).map_err(|e| BackupError::from_io(dest, e))?;

    let mut copied = 0u64;
    for entry in WalkDir::new(source).follow_links(true).min_depth(1) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(source).to_path_buf();
            BackupError::from_io(&path, io::Error::from(err))
        })?;

        let rel_path = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let dest_path = dest.join(rel_path);

        if entry.file_type().is_dir() {
            fs::create_dir(&dest_path).map_err(|e| BackupError::from_io(&dest_path, e))?;
        } else {
            copy_file(entry.path(), &dest_path)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// 复制单个文件并保留源文件的时间戳
fn copy_file(src: &Path, dest: &Path) -> Result<(), BackupError> {
    fs::copy(src, dest).map_err(|e| BackupError::from_io(src, e))?;

    let src_meta = fs::metadata(src).map_err(|e| BackupError::from_io(src, e))?;
    let mtime = FileTime::from_last_modification_time(&src_meta);
    let atime = FileTime::from_last_access_time(&src_meta);

    let mut perms = src_meta.permissions();
    let original_readonly = perms.readonly();

    // 只读文件需要先取消只读才能设置时间戳
    if original_readonly {
        perms.set_readonly(false);
        fs::set_permissions(dest, perms.clone()).map_err(|e| BackupError::from_io(dest, e))?;
    }

    filetime::set_file_times(dest, atime, mtime).map_err(|e| BackupError::from_io(dest, e))?;

    if original_readonly {
        perms.set_readonly(true);
        fs::set_permissions(dest, perms).map_err(|e| BackupError::from_io(dest, e))?;
    }

    Ok(())
}
