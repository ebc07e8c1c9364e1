use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::services::OutputFormat;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 扫描版试卷 PDF 所在目录
    pub exam_folder: PathBuf,
    /// 区域布局文件（.json / .toml）
    pub layout_file: PathBuf,
    /// 标准答案文件（.json / .toml）
    pub answer_key_file: PathBuf,
    /// 学生信息 CSV（可选）
    pub metadata_file: Option<PathBuf>,
    /// 结果输出文件
    pub output_file: PathBuf,
    /// 结果输出格式
    pub output_format: OutputFormat,
    /// 区域渲染分辨率
    pub render_dpi: u32,
    /// 单页位图的像素上限
    pub max_raster_pixels: u64,
    /// 同时处理的试卷数量
    pub max_concurrent_documents: usize,
    /// 同时进行的识别/评分请求数量
    pub max_concurrent_requests: usize,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 单次请求最多重试次数
    pub max_retries: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: PathBuf,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub recognition_model: String,
    pub grading_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exam_folder: PathBuf::from("exam_reports"),
            layout_file: PathBuf::from("direction_files/config_file.json"),
            answer_key_file: PathBuf::from("direction_files/correct_answers.json"),
            metadata_file: None,
            output_file: PathBuf::from("grading_results.csv"),
            output_format: OutputFormat::Csv,
            render_dpi: 300,
            max_raster_pixels: 200_000_000,
            max_concurrent_documents: 4,
            max_concurrent_requests: 8,
            request_timeout_secs: 60,
            max_retries: 3,
            verbose_logging: false,
            output_log_file: PathBuf::from("output.txt"),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            recognition_model: "gpt-4o".to_string(),
            grading_model: "gpt-4".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        let output_file = env_path("OUTPUT_FILE").unwrap_or(default.output_file);
        // 未指定格式时按输出文件扩展名推断
        let output_format = match std::env::var("OUTPUT_FORMAT") {
            Ok(v) => v.parse()?,
            Err(_) => OutputFormat::from_path(&output_file).unwrap_or(default.output_format),
        };

        Ok(Self {
            exam_folder: env_path("EXAM_FOLDER").unwrap_or(default.exam_folder),
            layout_file: env_path("LAYOUT_FILE").unwrap_or(default.layout_file),
            answer_key_file: env_path("ANSWER_KEY_FILE").unwrap_or(default.answer_key_file),
            metadata_file: env_path("METADATA_FILE").or(default.metadata_file),
            output_file,
            output_format,
            render_dpi: env_parse("RENDER_DPI", default.render_dpi)?,
            max_raster_pixels: env_parse("MAX_RASTER_PIXELS", default.max_raster_pixels)?,
            max_concurrent_documents: env_parse(
                "MAX_CONCURRENT_DOCUMENTS",
                default.max_concurrent_documents,
            )?,
            max_concurrent_requests: env_parse(
                "MAX_CONCURRENT_REQUESTS",
                default.max_concurrent_requests,
            )?,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", default.request_timeout_secs)?,
            max_retries: env_parse("MAX_RETRIES", default.max_retries)?,
            verbose_logging: env_parse("VERBOSE_LOGGING", default.verbose_logging)?,
            output_log_file: env_path("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            recognition_model: std::env::var("RECOGNITION_MODEL")
                .unwrap_or(default.recognition_model),
            grading_model: std::env::var("GRADING_MODEL").unwrap_or(default.grading_model),
        })
    }

    /// 检查配置取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render_dpi == 0 {
            return Err(ConfigError::invalid_value("RENDER_DPI", "必须大于 0"));
        }
        if self.max_concurrent_documents == 0 {
            return Err(ConfigError::invalid_value(
                "MAX_CONCURRENT_DOCUMENTS",
                "必须大于 0",
            ));
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::invalid_value(
                "MAX_CONCURRENT_REQUESTS",
                "必须大于 0",
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid_value("REQUEST_TIMEOUT_SECS", "必须大于 0"));
        }
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::invalid_value("LLM_API_KEY", "未设置"));
        }
        Ok(())
    }
}

fn env_path(var_name: &str) -> Option<PathBuf> {
    std::env::var(var_name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

fn env_parse<T: FromStr>(var_name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value,
            expected_type: std::any::type_name::<T>().to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            llm_api_key: "sk-test".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_config_needs_api_key() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "LLM_API_KEY"));
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_zero_dpi_rejected() {
        let config = Config {
            render_dpi: 0,
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "RENDER_DPI"
        ));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = Config {
            max_concurrent_requests: 0,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_parse_reports_bad_value() {
        std::env::set_var("EXAM_GRADER_TEST_DPI", "abc");
        let err = env_parse::<u32>("EXAM_GRADER_TEST_DPI", 300).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarParseFailed { ref value, .. } if value == "abc"));
        std::env::remove_var("EXAM_GRADER_TEST_DPI");

        assert_eq!(env_parse::<u32>("EXAM_GRADER_TEST_UNSET", 300).unwrap(), 300);
    }
}
