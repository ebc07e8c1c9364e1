//! 识别服务 - 业务能力层
//!
//! 只负责"把区域图片转成文字"能力

use std::future::Future;
use std::sync::Arc;

use async_openai::types::chat::ImageDetail;
use tracing::debug;

use super::llm_service::{ChatOptions, LlmService};
use crate::config::Config;
use crate::error::RecognitionError;
use crate::models::RenderedRegion;

const RECOGNITION_PROMPT: &str =
    "Please, turn the written text inside of the squares into typed text.";

/// 识别服务接口
///
/// 每次调用相互独立，远端不保存状态。
pub trait Recognizer: Send + Sync + 'static {
    fn recognize(
        &self,
        region: &RenderedRegion,
    ) -> impl Future<Output = Result<String, RecognitionError>> + Send;
}

/// 基于 Vision LLM 的手写识别
pub struct VisionRecognizer {
    llm: Arc<LlmService>,
    model: String,
    options: ChatOptions,
}

impl VisionRecognizer {
    pub fn new(llm: Arc<LlmService>, config: &Config) -> Self {
        Self {
            llm,
            model: config.recognition_model.clone(),
            options: ChatOptions {
                image_detail: ImageDetail::High,
                ..ChatOptions::default()
            },
        }
    }
}

impl Recognizer for VisionRecognizer {
    async fn recognize(&self, region: &RenderedRegion) -> Result<String, RecognitionError> {
        if region.is_empty() {
            return Err(RecognitionError::EmptyImage);
        }

        debug!("识别区域图片，PNG 大小: {} 字节", region.as_bytes().len());
        let image_url = region.data_url();
        let text = self
            .llm
            .chat(
                &self.model,
                RECOGNITION_PROMPT,
                None,
                Some(std::slice::from_ref(&image_url)),
                &self.options,
            )
            .await?;

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognition_leaves_temperature_to_service() {
        let config = Config::default();
        let recognizer = VisionRecognizer::new(Arc::new(LlmService::new(&config)), &config);
        assert_eq!(recognizer.options.temperature, None);
        assert!(matches!(recognizer.options.image_detail, ImageDetail::High));
        assert_eq!(recognizer.model, "gpt-4o");
    }

    #[tokio::test]
    async fn test_empty_region_is_not_sent() {
        let config = Config {
            llm_api_key: "sk-test".to_string(),
            llm_api_base_url: "http://127.0.0.1:9/v1".to_string(),
            ..Config::default()
        };
        let recognizer = VisionRecognizer::new(Arc::new(LlmService::new(&config)), &config);

        let err = recognizer
            .recognize(&RenderedRegion::empty())
            .await
            .unwrap_err();
        assert!(matches!(err, RecognitionError::EmptyImage));
    }
}
