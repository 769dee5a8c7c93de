// Backup Logger - 偏好设置存储模块
// 负责保存和加载上一次使用的源路径、目标路径与压缩选项

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 用户偏好设置
///
/// 交互模式启动时作为默认值读取，确认输入后写回。
/// 备份引擎本身不读写此文件。
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    /// 上次使用的源路径
    pub source: PathBuf,

    /// 上次使用的目标根路径
    pub destination: PathBuf,

    /// 上次是否压缩
    pub compress: bool,
}

impl Preferences {
    /// 从平台标准配置目录加载偏好设置
    ///
    /// # 返回
    /// * `Ok(Preferences)` - 加载的设置，如果文件不存在则返回默认值
    /// * `Err(anyhow::Error)` - 如果文件存在但解析失败
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// 保存到平台标准配置目录
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read preferences {:?}", path))?;
        toml::from_str(&content).context("Failed to parse preferences file")
    }

    /// 保存到指定路径，必要时创建父目录
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write preferences file")
    }

    /// 获取偏好设置文件的路径
    ///
    /// - Windows: `C:\Users\<用户>\AppData\Roaming\backup-logger\config\preferences.toml`
    /// - macOS: `~/Library/Application Support/backup-logger/preferences.toml`
    /// - Linux: `~/.config/backup-logger/preferences.toml`
    fn get_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "backup-logger")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("preferences.toml"))
    }
}
