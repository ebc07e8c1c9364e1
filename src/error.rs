//! 错误类型定义
//!
//! 按失败的影响范围划分：
//! - `ConfigError`：配置/布局/答案文件有误，文档开始渲染前即终止
//! - `RenderError`：单个区域渲染失败，只影响该区域
//! - `RecognitionError` / `GradingError`：单次远程调用失败，只影响该题
//! - `SinkError`：结果写出失败，只影响本次保存

use std::path::PathBuf;

use async_openai::error::OpenAIError;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 渲染错误
    #[error("渲染错误: {0}")]
    Render(#[from] RenderError),
    /// 识别服务错误
    #[error("识别错误: {0}")]
    Recognition(#[from] RecognitionError),
    /// 评分服务错误
    #[error("评分错误: {0}")]
    Grading(#[from] GradingError),
    /// 结果输出错误
    #[error("输出错误: {0}")]
    Sink(#[from] SinkError),
    /// 读取试卷文件失败
    #[error("无法读取试卷文件 {}: {source}", path.display())]
    DocumentLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 文档处理被取消
    #[error("文档 {document_id} 的处理已取消")]
    Cancelled { document_id: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取文件失败
    #[error("读取文件失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({}): {source}", path.display())]
    JsonParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({}): {source}", path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// CSV 解析失败
    #[error("CSV解析失败 ({}): {source}", path.display())]
    CsvParseFailed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// 不支持的文件格式
    #[error("不支持的文件格式: {} (仅支持 .json / .toml)", path.display())]
    UnsupportedFormat { path: PathBuf },
    /// 目录不存在
    #[error("目录不存在: {}", path.display())]
    DirectoryNotFound { path: PathBuf },
    /// 页码无法解析
    #[error("无法解析页码: '{key}'")]
    InvalidPageKey { key: String },
    /// 区域定义不合法
    #[error("第 {page} 页第 {position} 个区域不合法: {reason}")]
    InvalidBox {
        page: u32,
        position: usize,
        reason: String,
    },
    /// 布局为空
    #[error("布局文件中没有任何页面")]
    EmptyLayout,
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置项取值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 区域渲染错误
///
/// 只包含字符串字段，便于整页失败时复制给该页的每个区域
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// PDFium 动态库不可用
    #[error("PDFium 不可用: {reason}")]
    LibraryUnavailable { reason: String },
    /// 文档无法解析
    #[error("无法打开文档 {document_id}: {reason}")]
    DocumentLoad { document_id: String, reason: String },
    /// 页码超出范围
    #[error("页码 {page} 超出范围 (文档共 {page_count} 页)")]
    PageOutOfRange { page: u32, page_count: usize },
    /// DPI 不合法
    #[error("DPI 必须大于 0 (当前: {dpi})")]
    InvalidDpi { dpi: u32 },
    /// 区域与页面没有交集
    #[error("第 {page} 页的区域 {coords} 位于页面之外")]
    OutsidePage { page: u32, coords: String },
    /// 裁剪后区域面积为 0
    #[error("第 {page} 页的区域裁剪后为空")]
    EmptyRegion { page: u32 },
    /// 位图尺寸超出限制
    #[error("第 {page} 页位图尺寸 {width}x{height} 超出像素上限 {limit}")]
    RasterTooLarge {
        page: u32,
        width: u64,
        height: u64,
        limit: u64,
    },
    /// 光栅化失败
    #[error("第 {page} 页光栅化失败: {reason}")]
    RasterFailed { page: u32, reason: String },
    /// PNG 编码失败
    #[error("PNG 编码失败: {reason}")]
    EncodeFailed { reason: String },
}

/// LLM 调用错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: OpenAIError,
    },
    /// 调用超时
    #[error("LLM API调用超时 (模型: {model}, {secs} 秒)")]
    Timeout { model: String, secs: u64 },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 识别服务错误
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// 区域图片为空，没有可识别的内容
    #[error("区域图片为空")]
    EmptyImage,
    /// 远程服务失败
    #[error(transparent)]
    Service(#[from] LlmError),
}

/// 评分服务错误
#[derive(Debug, Error)]
pub enum GradingError {
    /// 远程服务失败
    #[error(transparent)]
    Service(#[from] LlmError),
}

/// 结果输出错误
#[derive(Debug, Error)]
pub enum SinkError {
    /// 表格格式需要至少一条记录来生成表头
    #[error("没有任何记录，无法生成 CSV 表头")]
    EmptyOutput,
    /// 文件读写失败
    #[error("文件读写失败 ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// CSV 写入失败
    #[error("CSV写入失败: {0}")]
    Csv(#[from] csv::Error),
    /// JSON 序列化失败
    #[error("JSON序列化失败: {0}")]
    Json(#[from] serde_json::Error),
}

// ========== 便捷构造函数 ==========

impl ConfigError {
    /// 创建区域不合法错误
    pub fn invalid_box(page: u32, position: usize, reason: impl Into<String>) -> Self {
        ConfigError::InvalidBox {
            page,
            position,
            reason: reason.into(),
        }
    }

    /// 创建配置项不合法错误
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl SinkError {
    /// 创建文件读写错误
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SinkError::Io {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
