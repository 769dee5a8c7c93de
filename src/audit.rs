// Backup Logger - 审计日志模块
// 提供显式构造、显式传递的日志输出端（Sink），不安装全局 subscriber

use chrono::Local;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;

/// 审计日志输出端
///
/// 内部持有一个 `tracing::Dispatch`。克隆后的实例共享同一个输出端，
/// 因此多个引擎实例可以写入同一个追加模式的日志文件。
#[derive(Debug, Clone)]
pub struct AuditLog {
    dispatch: Dispatch,
}

impl AuditLog {
    /// 以追加模式打开日志文件，必要时创建父目录
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::with_writer(Mutex::new(file)))
    }

    /// 默认位置：可执行文件所在目录下的 `logs/backup.log`
    pub fn default_path() -> PathBuf {
        let root = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        root.join("logs").join("backup.log")
    }

    /// 使用任意 `MakeWriter` 构建输出端
    pub fn with_writer<W>(writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer)
            .with_ansi(false)
            .with_max_level(Level::INFO)
            .event_format(AuditFormat)
            .finish();

        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// 在此输出端的作用域内执行 `f`，期间所有 `tracing` 事件都写入这里
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

/// 单行日志格式：`{时间} | {级别} | {消息}`
struct AuditFormat;

impl<S, N> FormatEvent<S, N> for AuditFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
        write!(writer, "{} | {} | ", now, event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// 内存日志缓冲区
///
/// 主要用于嵌入方和测试读取已写入的日志行。
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出当前全部内容
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for MemorySink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for MemorySink {
    type Writer = MemorySink;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_use_pipe_separated_layout() {
        let sink = MemorySink::new();
        let log = AuditLog::with_writer(sink.clone());

        log.scope(|| {
            tracing::info!("hello audit");
            tracing::error!("something broke");
        });

        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" | INFO | hello audit"), "{}", lines[0]);
        assert!(lines[1].ends_with(" | ERROR | something broke"), "{}", lines[1]);
    }

    #[test]
    fn debug_events_are_filtered_out() {
        let sink = MemorySink::new();
        let log = AuditLog::with_writer(sink.clone());
        log.scope(|| tracing::debug!("noise"));
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn events_outside_scope_are_not_captured() {
        let sink = MemorySink::new();
        let _log = AuditLog::with_writer(sink.clone());
        tracing::info!("not ours");
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("backup.log");

        AuditLog::open(&path).unwrap().scope(|| tracing::info!("first"));
        AuditLog::open(&path).unwrap().scope(|| tracing::info!("second"));

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("first"));
        assert!(lines[1].ends_with("second"));
    }
}
