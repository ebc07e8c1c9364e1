//! 提取计划 - 流程层
//!
//! 把区域布局展开成按页分组的渲染请求，决定每个区域在结果中的角色

use tracing::debug;

use crate::error::ConfigError;
use crate::models::{BoxCoords, BoxKind, ExamLayout, ExtractionRequest, PageConfig, RegionRole};

/// 一页的渲染请求（按声明顺序）
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub page_index: u32,
    pub requests: Vec<ExtractionRequest>,
}

impl PagePlan {
    /// 本页要渲染的区域坐标，顺序与 `requests` 一致
    pub fn boxes(&self) -> Vec<BoxCoords> {
        self.requests.iter().map(|r| r.coords).collect()
    }

    pub fn answer_count(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| matches!(r.role, RegionRole::Answer(_)))
            .count()
    }
}

/// 为一份试卷生成提取计划，页码升序
///
/// 答案序号只在答案区域之间计数，与姓名/学号区域的位置无关。
/// 每页多余的姓名、学号区域不会进入计划。
pub fn plan(layout: &ExamLayout, document_id: &str, dpi: u32) -> Result<Vec<PagePlan>, ConfigError> {
    if dpi == 0 {
        return Err(ConfigError::invalid_value("render_dpi", "DPI 必须大于 0"));
    }

    let plans: Vec<PagePlan> = layout
        .pages()
        .iter()
        .map(|page| plan_page(page, document_id, dpi))
        .collect();

    debug!(
        "[文档 {}] 提取计划: {} 页, {} 个区域",
        document_id,
        plans.len(),
        plans.iter().map(|p| p.requests.len()).sum::<usize>()
    );

    Ok(plans)
}

fn plan_page(page: &PageConfig, document_id: &str, dpi: u32) -> PagePlan {
    let mut requests = Vec::with_capacity(page.boxes.len());
    let mut has_name = false;
    let mut has_id = false;
    let mut ordinal = 0;

    for spec in &page.boxes {
        let role = match spec.kind {
            BoxKind::Name if has_name => continue,
            BoxKind::Id if has_id => continue,
            BoxKind::Name => {
                has_name = true;
                RegionRole::Name
            }
            BoxKind::Id => {
                has_id = true;
                RegionRole::Id
            }
            BoxKind::Answer => {
                ordinal += 1;
                RegionRole::Answer(ordinal)
            }
        };

        requests.push(ExtractionRequest {
            document_id: document_id.to_string(),
            page_index: page.page_index,
            role,
            coords: spec.coords,
            dpi,
        });
    }

    PagePlan {
        page_index: page.page_index,
        requests,
    }
}
