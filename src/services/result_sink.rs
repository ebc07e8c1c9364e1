//! 结果输出服务 - 业务能力层
//!
//! 只负责"把评分记录写成文件"能力，不关心记录从哪来
//!
//! 写入先落到同目录下的临时文件，完成后再替换目标文件，
//! 中途失败不会留下半截结果。

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::{ConfigError, SinkError};
use crate::models::GradingRecord;

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// 表格：表头 + 每条记录一行
    #[default]
    Csv,
    /// 结构化：4 空格缩进的 JSON 数组
    Json,
}

impl OutputFormat {
    /// 按文件扩展名推断格式
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" | "tabular" => Ok(OutputFormat::Csv),
            "json" | "structured" => Ok(OutputFormat::Json),
            other => Err(ConfigError::invalid_value(
                "OUTPUT_FORMAT",
                format!("未知的输出格式 '{other}'，可选 csv / json"),
            )),
        }
    }
}

/// 结果输出服务
///
/// 职责：
/// - 一次性写出全部记录
/// - 不修改、不排序记录
pub struct ResultSink {
    path: PathBuf,
}

impl ResultSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写出记录，顺序与输入一致
    pub fn save(&self, records: &[GradingRecord], format: OutputFormat) -> Result<(), SinkError> {
        if records.is_empty() {
            match format {
                OutputFormat::Csv => return Err(SinkError::EmptyOutput),
                OutputFormat::Json => warn!("没有任何评分记录，将写出空数组"),
            }
        }

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| SinkError::io(dir, e))?;

        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            match format {
                OutputFormat::Csv => write_csv(&mut writer, records)?,
                OutputFormat::Json => {
                    write_json(&mut writer, records)?;
                    writeln!(writer).map_err(|e| SinkError::io(&self.path, e))?;
                }
            }
            writer.flush().map_err(|e| SinkError::io(&self.path, e))?;
        }

        tmp.persist(&self.path)
            .map_err(|e| SinkError::io(&self.path, e.error))?;

        info!(
            "✓ 已写出 {} 条评分记录到 {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn write_csv<W: Write>(writer: W, records: &[GradingRecord]) -> Result<(), SinkError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn write_json<W: Write>(writer: W, records: &[GradingRecord]) -> Result<(), SinkError> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    records.serialize(&mut serializer)?;
    Ok(())
}

/// 读取之前写出的 JSON 结果
pub fn load_json(path: &Path) -> Result<Vec<GradingRecord>, SinkError> {
    let file = File::open(path).map_err(|e| SinkError::io(path, e))?;
    let records = serde_json::from_reader(BufReader::new(file))?;
    Ok(records)
}

/// 并发收集各试卷的记录
///
/// 试卷完成顺序不确定，输出时按试卷在批次中的序号排序，
/// 同一试卷内的记录保持原有顺序。
#[derive(Debug, Default)]
pub struct RecordCollector {
    entries: Mutex<Vec<(usize, Vec<GradingRecord>)>>,
}

impl RecordCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一份试卷的全部记录
    pub fn append(&self, document_index: usize, records: Vec<GradingRecord>) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.push((document_index, records));
    }

    pub fn len(&self) -> usize {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.iter().map(|(_, records)| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 取出全部记录（按试卷序号排序）
    pub fn into_records(self) -> Vec<GradingRecord> {
        let mut entries = self
            .entries
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.sort_by_key(|(index, _)| *index);
        entries
            .into_iter()
            .flat_map(|(_, records)| records)
            .collect()
    }
}
