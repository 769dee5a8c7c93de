// Backup Logger - 错误类型模块
// 定义备份引擎对外暴露的错误分类

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 备份引擎错误
///
/// 校验阶段的错误（源不存在、目标根目录不存在等）不会产生摘要记录；
/// 传输阶段的错误在返回前一定已经写入摘要记录。
#[derive(Debug, Error)]
pub enum BackupError {
    /// 源路径不存在
    #[error("Source path does not exist: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// 源路径存在但不是目录
    #[error("Source path is not a directory: {}", path.display())]
    SourceNotDirectory { path: PathBuf },

    /// 目标根目录不存在（或不是目录）
    #[error("Destination root is not an existing directory: {}", path.display())]
    DestinationNotFound { path: PathBuf },

    /// 普通复制模式下目标目录已存在（同一秒内重复备份）
    #[error("Destination already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    /// 传输过程中权限不足
    #[error("Permission denied: {}", path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 其他 I/O 传输失败
    #[error("Backup transfer failed at {}: {source}", path.display())]
    Transfer {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 压缩包格式层面的失败
    #[error("Failed to write archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// 默认日志文件无法打开
    #[error("Failed to open log sink {}: {source}", path.display())]
    LogSink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BackupError {
    /// 按 `io::ErrorKind` 对传输阶段的 I/O 错误分类
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path, source: err },
            io::ErrorKind::AlreadyExists => Self::AlreadyExists { path },
            _ => Self::Transfer { path, source: err },
        }
    }

    /// zip 写入错误：I/O 错误沿用同样的分类，其余归为 `Archive`
    pub fn from_zip(path: &Path, err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io_err) => Self::from_io(path, io_err),
            other => Self::Archive {
                path: path.to_path_buf(),
                source: other,
            },
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}
