//! 试卷区域布局
//!
//! 布局文件描述每一页上有哪些区域（姓名、学号、答案）以及它们的坐标。
//! 坐标单位为 PDF 点（1/72 英寸），原点在页面左上角，y 轴向下。

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// 区域类型
///
/// 布局文件中省略 `type` 时按答案区域处理；无法识别的类型直接报错。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxKind {
    Name,
    Id,
    #[default]
    Answer,
}

/// 区域坐标 (x0, y0, x1, y1)，单位为 PDF 点
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxCoords {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoxCoords {
    /// 创建并校验坐标：必须有限、非负，且 x0 < x1、y0 < y1
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Result<Self, String> {
        let values = [x0, y0, x1, y1];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(format!("坐标必须是有限数值: {:?}", values));
        }
        if values.iter().any(|v| *v < 0.0) {
            return Err(format!("坐标不能为负数: {:?}", values));
        }
        if x0 >= x1 || y0 >= y1 {
            return Err(format!("要求 x0 < x1 且 y0 < y1: {:?}", values));
        }
        Ok(Self { x0, y0, x1, y1 })
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

impl fmt::Display for BoxCoords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x0, self.y0, self.x1, self.y1)
    }
}

/// 单个区域定义
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSpec {
    pub kind: BoxKind,
    pub coords: BoxCoords,
}

/// 一页的区域列表，顺序即声明顺序
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub page_index: u32,
    pub boxes: Vec<BoxSpec>,
}

impl PageConfig {
    /// 本页答案区域的数量
    pub fn answer_count(&self) -> usize {
        self.boxes
            .iter()
            .filter(|b| b.kind == BoxKind::Answer)
            .count()
    }
}

/// 整份试卷的布局，按页码升序排列
#[derive(Debug, Clone, PartialEq)]
pub struct ExamLayout {
    pages: Vec<PageConfig>,
}

impl ExamLayout {
    /// 由已校验的页面列表创建布局
    pub fn new(mut pages: Vec<PageConfig>) -> Result<Self, ConfigError> {
        if pages.is_empty() {
            return Err(ConfigError::EmptyLayout);
        }
        pages.sort_by_key(|p| p.page_index);
        // "0" 与 "00" 之类的键会落到同一页
        if let Some(pair) = pages.windows(2).find(|w| w[0].page_index == w[1].page_index) {
            return Err(ConfigError::InvalidPageKey {
                key: pair[0].page_index.to_string(),
            });
        }
        Ok(Self { pages })
    }

    pub fn pages(&self) -> &[PageConfig] {
        &self.pages
    }

    /// 所有页面的答案区域总数
    pub fn question_count(&self) -> usize {
        self.pages.iter().map(PageConfig::answer_count).sum()
    }

    /// 把反序列化得到的原始布局转换为校验过的布局
    pub(crate) fn from_raw(raw: RawLayout) -> Result<Self, ConfigError> {
        let mut pages = Vec::with_capacity(raw.pages.len());

        for (key, raw_boxes) in raw.pages {
            let page_index: u32 = key
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPageKey { key: key.clone() })?;

            let mut boxes = Vec::with_capacity(raw_boxes.len());
            for (position, raw_box) in raw_boxes.into_iter().enumerate() {
                let position = position + 1;
                let values = raw_box.coords.ok_or_else(|| {
                    ConfigError::invalid_box(page_index, position, "缺少 box 字段")
                })?;
                let [x0, y0, x1, y1] = <[f64; 4]>::try_from(values.as_slice()).map_err(|_| {
                    ConfigError::invalid_box(
                        page_index,
                        position,
                        format!("box 需要 4 个数值，实际为 {} 个", values.len()),
                    )
                })?;
                let coords = BoxCoords::new(x0, y0, x1, y1)
                    .map_err(|reason| ConfigError::invalid_box(page_index, position, reason))?;

                boxes.push(BoxSpec {
                    kind: raw_box.kind,
                    coords,
                });
            }

            warn_duplicate_identity_boxes(page_index, &boxes);
            pages.push(PageConfig { page_index, boxes });
        }

        Self::new(pages)
    }
}

/// 每页只使用第一个姓名区域和第一个学号区域
fn warn_duplicate_identity_boxes(page_index: u32, boxes: &[BoxSpec]) {
    for kind in [BoxKind::Name, BoxKind::Id] {
        let count = boxes.iter().filter(|b| b.kind == kind).count();
        if count > 1 {
            warn!(
                "⚠️ 第 {} 页定义了 {} 个 {:?} 区域，只使用第一个",
                page_index, count, kind
            );
        }
    }
}

/// 布局文件的原始结构
///
/// 页码在 JSON 中是字符串键（`"0"`、`"1"`），在 TOML 中同样以带引号的键出现。
#[derive(Debug, Deserialize)]
pub(crate) struct RawLayout {
    #[serde(default)]
    pub pages: BTreeMap<String, Vec<RawBox>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBox {
    #[serde(rename = "type", default)]
    pub kind: BoxKind,
    #[serde(rename = "box")]
    pub coords: Option<Vec<f64>>,
}
