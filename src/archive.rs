// Backup Logger - 压缩归档模块
// 将源目录打包为 Deflate 压缩的 ZIP 文件

use crate::error::BackupError;
use crate::scanner::walk_files;
use chrono::{DateTime, Datelike, Local, Timelike};
use std::fs::{self, File, Metadata};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// 创建 ZIP 归档
///
/// 归档内的路径相对于源目录的**父目录**计算，因此顶层条目是源目录自身的名称。
/// 先写入 `{dest_zip}.partial`，成功后再重命名为最终文件名；
/// 同名归档已存在时会被替换。失败时删除临时文件。
///
/// # 参数
/// * `source` - 源目录
/// * `dest_zip` - 最终归档路径
///
/// # 返回
/// * `Ok(u64)` - 写入的条目数量
/// * `Err(BackupError)` - 写入失败
pub fn zip_directory(source: &Path, dest_zip: &Path) -> Result<u64, BackupError> {
    tracing::info!("Creating ZIP archive -> {}", dest_zip.display());

    let temp_path = partial_path(dest_zip);
    let result = write_archive(source, &temp_path).and_then(|entries| {
        fs::rename(&temp_path, dest_zip).map_err(|e| BackupError::from_io(dest_zip, e))?;
        Ok(entries)
    });

    if result.is_err() {
        // 临时文件可能根本没有创建
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_archive(source: &Path, target: &Path) -> Result<u64, BackupError> {
    let file = File::create(target).map_err(|e| BackupError::from_io(target, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let base = source.parent().unwrap_or(source);
    let mut entries = 0u64;

    for path in walk_files(source) {
        let rel = path.strip_prefix(base).unwrap_or(&path);
        let name = entry_name(rel);

        let mut input = File::open(&path).map_err(|e| BackupError::from_io(&path, e))?;
        let meta = input
            .metadata()
            .map_err(|e| BackupError::from_io(&path, e))?;
        let options = entry_options(&meta);

        zip.start_file(name, options)
            .map_err(|e| BackupError::from_zip(&path, e))?;
        io::copy(&mut input, &mut zip).map_err(|e| BackupError::from_io(&path, e))?;
        entries += 1;
    }

    zip.finish().map_err(|e| BackupError::from_zip(target, e))?;
    Ok(entries)
}

/// 条目选项：保留源文件的修改时间与 Unix 权限
fn entry_options(meta: &Metadata) -> SimpleFileOptions {
    let mut options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(meta.len() >= u32::MAX as u64);

    if let Some(mtime) = meta.modified().ok().and_then(zip_time) {
        options = options.last_modified_time(mtime);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options = options.unix_permissions(meta.permissions().mode());
    }

    options
}

/// 转换为 ZIP 使用的本地时间；1980 年以前等超出范围的时间返回 `None`
fn zip_time(mtime: std::time::SystemTime) -> Option<zip::DateTime> {
    let local: DateTime<Local> = mtime.into();
    zip::DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .ok()
}

/// 归档条目名称统一使用 `/` 分隔
fn entry_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn partial_path(dest_zip: &Path) -> PathBuf {
    let mut name = dest_zip.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn entries_are_rooted_under_source_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("project");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("a.txt"), "alpha").unwrap();
        fs::write(root.join("sub/b.txt"), "beta").unwrap();

        let dest = dir.path().join("out.zip");
        assert_eq!(zip_directory(&root, &dest).unwrap(), 2);
        assert!(!partial_path(&dest).exists());

        let mut archive = ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["project/a.txt", "project/sub/b.txt"]);

        let mut content = String::new();
        archive
            .by_name("project/sub/b.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "beta");
    }

    #[test]
    fn missing_destination_directory_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("project");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("a.txt"), "alpha").unwrap();

        let dest = dir.path().join("missing").join("out.zip");
        let err = zip_directory(&root, &dest).unwrap_err();
        assert!(matches!(err, BackupError::Transfer { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn entries_keep_mtime_and_mode() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("project");
        fs::create_dir_all(&root).unwrap();
        let script = root.join("run.sh");
        fs::write(&script, "#!/bin/sh\n").unwrap();

        let mtime = filetime::FileTime::from_unix_time(1_700_000_000, 0);
        filetime::set_file_mtime(&script, mtime).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        }

        let dest = dir.path().join("out.zip");
        zip_directory(&root, &dest).unwrap();

        let mut archive = ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let entry = archive.by_name("project/run.sh").unwrap();

        let expected: DateTime<Local> =
            (std::time::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000)).into();
        let stored = entry.last_modified().unwrap();
        assert_eq!(stored.year() as i32, expected.year());
        assert_eq!(stored.month() as u32, expected.month());
        assert_eq!(stored.day() as u32, expected.day());
        assert_eq!(stored.hour() as u32, expected.hour());
        assert_eq!(stored.minute() as u32, expected.minute());
        // DOS 时间精度为 2 秒
        assert_eq!(stored.second() as u32, expected.second() / 2 * 2);

        #[cfg(unix)]
        assert_eq!(entry.unix_mode().unwrap() & 0o777, 0o755);
    }

    #[test]
    fn entry_names_use_forward_slashes() {
        let rel: PathBuf = ["project", "sub", "b.txt"].iter().collect();
        assert_eq!(entry_name(&rel), "project/sub/b.txt");
    }
}
