// Backup Logger - 带审计日志的目录快照备份工具
// 模块声明文件

/// 压缩归档模块（ZIP）
pub mod archive;

/// 审计日志输出端模块
pub mod audit;

/// 命令行交互界面模块
pub mod cli;

/// 单次备份配置模块
pub mod config;

/// 目录复制模块
pub mod copier;

/// 备份引擎模块
pub mod engine;

/// 错误类型模块
pub mod error;

/// 备份命名模块
pub mod naming;

/// 源目录扫描模块
pub mod scanner;

/// 偏好设置存储模块
pub mod store;

/// 工具函数模块
pub mod utils;

pub use audit::AuditLog;
pub use config::BackupConfig;
pub use engine::BackupEngine;
pub use error::BackupError;
