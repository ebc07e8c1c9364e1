//! LLM 服务 - 业务能力层
//!
//! 只负责"调用 LLM"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）
//!
//! 请求没有远端状态，可以安全重试：每次调用带超时，失败后按指数退避重试。

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::LlmError;

/// 第一次重试前的等待时间，之后每次翻倍
const BASE_BACKOFF_MS: u64 = 500;
/// 单次等待的上限
const MAX_BACKOFF_MS: u64 = 8_000;

/// 单次请求的生成参数
#[derive(Debug, Clone)]
pub struct ChatOptions {
    /// `None` 时使用服务端默认值
    pub temperature: Option<f32>,
    pub max_tokens: u32,
    pub image_detail: ImageDetail,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: None,
            max_tokens: 300,
            image_detail: ImageDetail::Auto,
        }
    }
}

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API（文本或文本 + 图片）
/// - 超时与重试
/// - 不认识学生、题目或试卷
pub struct LlmService {
    client: Client<OpenAIConfig>,
    request_timeout: Duration,
    max_retries: usize,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            max_retries: config.max_retries,
        }
    }

    /// 带超时和重试的 LLM 调用
    ///
    /// # 参数
    /// - `model`: 模型名称
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `imgs`: 图片 URL 列表（可选，支持 `data:` URL），会追加到用户消息中
    /// - `options`: 生成参数
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去除首尾空白）
    pub async fn chat(
        &self,
        model: &str,
        user_message: &str,
        system_message: Option<&str>,
        imgs: Option<&[String]>,
        options: &ChatOptions,
    ) -> Result<String, LlmError> {
        let attempts = self.max_retries + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = match timeout(
                self.request_timeout,
                self.send_to_llm(model, user_message, system_message, imgs, options),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(LlmError::Timeout {
                    model: model.to_string(),
                    secs: self.request_timeout.as_secs(),
                }),
            };

            match result {
                Ok(content) => return Ok(content),
                Err(e) if attempt < attempts => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        "LLM 调用失败 (尝试 {}/{}): {}，{} 毫秒后重试...",
                        attempt,
                        attempts,
                        e,
                        delay.as_millis()
                    );
                    sleep(delay).await;
                }
                Err(e) => {
                    warn!("LLM 调用失败，已重试 {} 次", self.max_retries);
                    return Err(e);
                }
            }
        }
    }

    /// 单次 LLM 调用
    async fn send_to_llm(
        &self,
        model: &str,
        user_message: &str,
        system_message: Option<&str>,
        imgs: Option<&[String]>,
        options: &ChatOptions,
    ) -> Result<String, LlmError> {
        let api_failed = |source| LlmError::ApiCallFailed {
            model: model.to_string(),
            source,
        };

        debug!("调用 LLM API，模型: {}", model);
        debug!("用户消息长度: {} 字符", user_message.len());

        // 构建消息列表
        let mut messages = Vec::new();

        // 添加系统消息（如果提供）
        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(api_failed)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        // 构建用户消息内容（支持图片）
        let user_msg = match imgs.filter(|urls| !urls.is_empty()) {
            Some(img_urls) => {
                // 使用 Vision API：构建包含文本和图片的内容
                let mut content_parts = vec![ChatCompletionRequestUserMessageContentPart::Text(
                    ChatCompletionRequestMessageContentPartText {
                        text: user_message.to_string(),
                    },
                )];

                for url in img_urls {
                    content_parts.push(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                        ChatCompletionRequestMessageContentPartImage {
                            image_url: ImageUrl {
                                url: url.clone(),
                                detail: Some(options.image_detail.clone()),
                            },
                        },
                    ));
                }

                debug!("使用 Vision API，包含 {} 张图片", img_urls.len());

                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(
                        content_parts,
                    ))
                    .build()
                    .map_err(api_failed)?
            }
            // 没有图片，只有文本
            None => ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()
                .map_err(api_failed)?,
        };

        messages.push(ChatCompletionRequestMessage::User(user_msg));

        // 构建请求
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(model)
            .messages(messages)
            .max_tokens(options.max_tokens);
        if let Some(temperature) = options.temperature {
            builder.temperature(temperature);
        }
        let request = builder.build().map_err(api_failed)?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(api_failed)?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::EmptyContent {
                model: model.to_string(),
            })?;

        Ok(content.trim().to_string())
    }
}

/// 第 `attempt` 次失败后的等待时间
fn backoff_delay(attempt: usize) -> Duration {
    let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(16);
    let millis = BASE_BACKOFF_MS.saturating_mul(1u64 << exponent);
    Duration::from_millis(millis.min(MAX_BACKOFF_MS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        assert_eq!(backoff_delay(1), Duration::from_millis(500));
        assert_eq!(backoff_delay(2), Duration::from_millis(1_000));
        assert_eq!(backoff_delay(3), Duration::from_millis(2_000));
        assert_eq!(backoff_delay(10), Duration::from_millis(MAX_BACKOFF_MS));
        assert_eq!(backoff_delay(usize::MAX), Duration::from_millis(MAX_BACKOFF_MS));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_after_retries() {
        let config = Config {
            llm_api_key: "sk-test".to_string(),
            // 保留地址，连接会立即失败
            llm_api_base_url: "http://127.0.0.1:9/v1".to_string(),
            request_timeout_secs: 5,
            max_retries: 0,
            ..Config::default()
        };
        let service = LlmService::new(&config);

        let result = service
            .chat("gpt-4", "ping", None, None, &ChatOptions::default())
            .await;
        assert!(result.is_err());
    }

    /// 测试通用 LLM 调用
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_send_to_llm_simple -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_send_to_llm_simple() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env().expect("配置加载失败");
        let service = LlmService::new(&config);

        let response = service
            .chat(
                &config.grading_model,
                "请用一句话介绍你自己",
                Some("你是一个简洁的助手，回答要简短。"),
                None,
                &ChatOptions::default(),
            )
            .await
            .expect("LLM 调用失败");

        println!("LLM 响应: {}", response);
        assert!(!response.is_empty());
    }
}
