//! 处理上下文
//!
//! 封装"我正在处理哪份试卷的哪道题"这一信息

use std::fmt::Display;

use crate::models::QuestionKey;

/// 试卷处理上下文
#[derive(Debug, Clone)]
pub struct DocumentCtx {
    /// 试卷ID（文件名去掉扩展名）
    pub document_id: String,

    /// 试卷在批次中的序号，决定输出顺序
    pub document_index: usize,

    /// 文件名（用于查找学生信息）
    pub file_name: String,
}

impl DocumentCtx {
    pub fn new(document_id: String, document_index: usize, file_name: String) -> Self {
        Self {
            document_id,
            document_index,
            file_name,
        }
    }

    /// 派生某道题的上下文
    pub fn question(&self, key: QuestionKey) -> QuestionCtx {
        QuestionCtx {
            document_id: self.document_id.clone(),
            document_index: self.document_index,
            key,
        }
    }
}

impl Display for DocumentCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文档 {}]", self.document_id)
    }
}

/// 题目处理上下文
#[derive(Debug, Clone)]
pub struct QuestionCtx {
    pub document_id: String,
    pub document_index: usize,
    /// (页码, 页内序号)
    pub key: QuestionKey,
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[文档 {} 第{}页 题目#{}]",
            self.document_id, self.key.page_index, self.key.ordinal
        )
    }
}
