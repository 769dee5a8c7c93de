// Backup Logger - 备份引擎模块
// 校验输入、统计文件、生成备份名称、执行复制或压缩，并为每次运行写入一条摘要记录

use crate::archive::zip_directory;
use crate::audit::AuditLog;
use crate::config::BackupConfig;
use crate::copier::copy_tree;
use crate::error::BackupError;
use crate::naming::backup_name;
use crate::scanner::count_files;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

/// 备份名称使用的时钟
pub type Clock = fn() -> DateTime<Local>;

/// 备份引擎
///
/// 引擎不保存跨运行的状态：每次调用 `run` 都会根据当前时间生成新的备份，
/// 因此连续调用两次会得到两个不同的备份（同一秒内除外）。
///
/// # 运行流程
/// 1. **校验**：源目录与目标根目录必须存在，失败时只记录错误，不写摘要
/// 2. **统计**：递归统计源目录文件数量
/// 3. **命名**：`{源目录名}_backup_{时间戳}[_v{版本}]`
/// 4. **传输**：压缩为 `{名称}.zip` 或复制为 `{名称}` 目录
/// 5. **摘要**：无论传输成功与否，都恰好写入一条摘要记录
#[derive(Debug, Clone)]
pub struct BackupEngine {
    config: BackupConfig,
    log: Option<AuditLog>,
    clock: Clock,
}

impl BackupEngine {
    /// 创建新的备份引擎
    ///
    /// 未通过 `with_log` 指定日志输出端时，`run` 会打开默认日志文件
    /// （见 `AuditLog::default_path`）。
    pub fn new(config: BackupConfig) -> Self {
        Self {
            config,
            log: None,
            clock: Local::now,
        }
    }

    /// 指定日志输出端
    pub fn with_log(mut self, log: AuditLog) -> Self {
        self.log = Some(log);
        self
    }

    /// 替换生成备份名称所用的时钟
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    /// 执行备份
    ///
    /// # 返回
    /// * `Ok(PathBuf)` - 创建的备份目录或归档文件路径
    /// * `Err(BackupError)` - 校验或传输失败（错误已写入日志）
    pub fn run(&self) -> Result<PathBuf, BackupError> {
        let log = match &self.log {
            Some(log) => log.clone(),
            None => {
                let path = AuditLog::default_path();
                AuditLog::open(&path).map_err(|source| BackupError::LogSink { path, source })?
            }
        };

        log.scope(|| self.execute())
    }

    fn execute(&self) -> Result<PathBuf, BackupError> {
        let started = Instant::now();
        let started_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        self.validate()?;

        // 提前统计，传输中途失败时摘要里仍然有文件数
        let file_count = count_files(&self.config.source);
        let name = backup_name(
            &self.config.source,
            self.config.version.as_deref(),
            (self.clock)(),
        );

        let mut summary = RunSummary {
            started,
            started_at,
            source: &self.config.source,
            destination: None,
            file_count,
        };

        let result = self.transfer(&name, &mut summary);
        match &result {
            Err(e) if e.is_permission_denied() => {
                error!(error = ?e, "Permission denied during backup: {}", e);
            }
            Err(e) => error!(error = ?e, "Unhandled error during backup: {}", e),
            Ok(_) => {}
        }

        // `summary` 在返回时析构并写入摘要记录
        result
    }

    fn validate(&self) -> Result<(), BackupError> {
        let source = &self.config.source;
        let destination_root = &self.config.destination_root;

        let err = if !source.exists() {
            BackupError::SourceNotFound {
                path: source.clone(),
            }
        } else if !source.is_dir() {
            BackupError::SourceNotDirectory {
                path: source.clone(),
            }
        } else if !destination_root.is_dir() {
            BackupError::DestinationNotFound {
                path: destination_root.clone(),
            }
        } else {
            return Ok(());
        };

        error!("{}", err);
        Err(err)
    }

    fn transfer(&self, name: &str, summary: &mut RunSummary<'_>) -> Result<PathBuf, BackupError> {
        let source = &self.config.source;

        if self.config.compress {
            let dest = self.config.destination_root.join(format!("{}.zip", name));
            summary.destination = Some(dest.clone());
            zip_directory(source, &dest)?;
            Ok(dest)
        } else {
            let dest = self.config.destination_root.join(name);
            summary.destination = Some(dest.clone());
            copy_tree(source, &dest)?;
            Ok(dest)
        }
    }
}

/// 单次运行的摘要记录
///
/// 在析构时写入日志，保证成功返回、错误返回乃至 panic 展开时都恰好写入一次。
struct RunSummary<'a> {
    started: Instant,
    started_at: String,
    source: &'a Path,
    destination: Option<PathBuf>,
    file_count: u64,
}

impl Drop for RunSummary<'_> {
    fn drop(&mut self) {
        let destination = self
            .destination
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "N/A".to_string());

        info!(
            "Backup summary | time={} | src={} | dest={} | files={} | duration={:.2}s",
            self.started_at,
            self.source.display(),
            destination,
            self.file_count,
            self.started.elapsed().as_secs_f64()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemorySink;
    use std::fs;

    fn engine_with_sink(config: BackupConfig) -> (BackupEngine, MemorySink) {
        let sink = MemorySink::new();
        let engine = BackupEngine::new(config).with_log(AuditLog::with_writer(sink.clone()));
        (engine, sink)
    }

    #[test]
    fn summary_reports_na_when_destination_unset() {
        let sink = MemorySink::new();
        AuditLog::with_writer(sink.clone()).scope(|| {
            let _summary = RunSummary {
                started: Instant::now(),
                started_at: "2024-01-01 00:00:00".to_string(),
                source: Path::new("/src"),
                destination: None,
                file_count: 4,
            };
        });

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("| INFO | Backup summary | time=2024-01-01 00:00:00 | src=/src | dest=N/A | files=4 | duration="));
        assert!(lines[0].ends_with('s'));
    }

    #[test]
    fn missing_destination_root_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("project");
        fs::create_dir_all(&src).unwrap();

        let config = BackupConfig::new(&src, dir.path().join("nowhere"), false, None);
        let (engine, sink) = engine_with_sink(config);

        let err = engine.run().unwrap_err();
        assert!(matches!(err, BackupError::DestinationNotFound { .. }));
        assert!(!sink.contents().contains("Backup summary"));
        assert!(sink.contents().contains("| ERROR |"));
    }

    #[test]
    fn file_source_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("file.txt");
        fs::write(&src, "x").unwrap();

        let config = BackupConfig::new(&src, dir.path(), true, None);
        let (engine, sink) = engine_with_sink(config);

        let err = engine.run().unwrap_err();
        assert!(matches!(err, BackupError::SourceNotDirectory { .. }));
        assert!(!sink.contents().contains("Backup summary"));
    }
}
