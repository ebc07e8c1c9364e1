//! 取消标记
//!
//! 每份试卷持有一个子标记；子标记或批次的根标记任意一个被置位，试卷都会在
//! 下一个阶段边界停止。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
    parent: Option<Arc<AtomicBool>>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// 派生一个子标记：取消父标记会影响子标记，反之不会
    pub fn child(&self) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            parent: Some(self.flag.clone()),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
            || self
                .parent
                .as_ref()
                .is_some_and(|parent| parent.load(Ordering::Relaxed))
    }

    /// 已取消时返回 `AppError::Cancelled`
    pub fn check(&self, document_id: &str) -> AppResult<()> {
        if self.is_cancelled() {
            return Err(AppError::Cancelled {
                document_id: document_id.to_string(),
            });
        }
        Ok(())
    }
}
