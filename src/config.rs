// Backup Logger - 备份配置模块
// 描述单次备份请求的所有参数

use crate::store::Preferences;
use crate::utils::normalize_path;
use std::path::{Path, PathBuf};

/// 备份配置结构体
///
/// 构造时把两个路径规范化为绝对路径（展开 `~`、处理相对路径），
/// 但不检查是否存在；存在性检查推迟到 `BackupEngine::run`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    /// 源路径（要备份的目录）
    pub source: PathBuf,

    /// 目标根路径（备份存放位置）
    pub destination_root: PathBuf,

    /// 是否压缩为 ZIP
    pub compress: bool,

    /// 可选版本标签，附加在备份名称末尾
    pub version: Option<String>,
}

impl BackupConfig {
    /// 创建新的备份配置
    ///
    /// # 参数
    /// * `source` - 源路径
    /// * `destination_root` - 目标根路径
    /// * `compress` - 是否压缩
    /// * `version` - 版本标签，空字符串视为未设置
    pub fn new(
        source: impl AsRef<Path>,
        destination_root: impl AsRef<Path>,
        compress: bool,
        version: Option<String>,
    ) -> Self {
        Self {
            source: normalize_path(source.as_ref()),
            destination_root: normalize_path(destination_root.as_ref()),
            compress,
            version: version.filter(|v| !v.trim().is_empty()),
        }
    }

    /// 转换为可持久化的偏好设置（版本标签不保存）
    pub fn to_preferences(&self) -> Preferences {
        Preferences {
            source: self.source.clone(),
            destination: self.destination_root.clone(),
            compress: self.compress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_normalized_without_existence_check() {
        let config = BackupConfig::new("/no/such/src/./x", "/no/such/dst/../out", false, None);
        assert_eq!(config.source, PathBuf::from("/no/such/src/x"));
        assert_eq!(config.destination_root, PathBuf::from("/no/such/out"));
    }

    #[test]
    fn blank_version_is_dropped() {
        let config = BackupConfig::new("/a", "/b", true, Some("  ".to_string()));
        assert_eq!(config.version, None);

        let config = BackupConfig::new("/a", "/b", true, Some("3".to_string()));
        assert_eq!(config.version.as_deref(), Some("3"));
    }

    #[test]
    fn preferences_keep_paths_and_compress_flag() {
        let config = BackupConfig::new("/a", "/b", true, Some("3".to_string()));
        let prefs = config.to_preferences();
        assert!(prefs.compress);
        assert_eq!(prefs.source, config.source);
        assert_eq!(prefs.destination, config.destination_root);
    }
}
