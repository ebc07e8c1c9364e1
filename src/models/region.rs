//! 渲染请求与渲染结果

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::layout::BoxCoords;

/// 区域在页面中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionRole {
    Name,
    Id,
    /// 答案区域，序号从 1 开始，按本页答案区域的声明顺序编号
    Answer(usize),
}

impl fmt::Display for RegionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionRole::Name => write!(f, "姓名区域"),
            RegionRole::Id => write!(f, "学号区域"),
            RegionRole::Answer(ordinal) => write!(f, "答案区域 {}", ordinal),
        }
    }
}

/// 单个区域的渲染请求
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    pub document_id: String,
    pub page_index: u32,
    pub role: RegionRole,
    pub coords: BoxCoords,
    pub dpi: u32,
}

/// 渲染后的区域图片（PNG 字节）
///
/// 字节为空表示该区域渲染失败，后续识别结果按空字符串处理。
#[derive(Clone, PartialEq, Eq, Default)]
pub struct RenderedRegion {
    png: Vec<u8>,
}

impl RenderedRegion {
    pub fn from_png(png: Vec<u8>) -> Self {
        Self { png }
    }

    /// 渲染失败时使用的空区域
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.png.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.png)
    }

    /// 供 Vision API 使用的 data URL
    pub fn data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.to_base64())
    }
}

impl fmt::Debug for RenderedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedRegion")
            .field("png_len", &self.png.len())
            .finish()
    }
}

/// 一页的渲染结果
#[derive(Debug, Clone, Default)]
pub struct PageExtraction {
    pub page_index: u32,
    pub name: Option<RenderedRegion>,
    pub id: Option<RenderedRegion>,
    /// 按答案序号排列
    pub answers: Vec<RenderedRegion>,
}

impl PageExtraction {
    pub fn new(page_index: u32) -> Self {
        Self {
            page_index,
            ..Default::default()
        }
    }

    /// 按角色放入对应位置
    pub fn insert(&mut self, role: RegionRole, region: RenderedRegion) {
        match role {
            RegionRole::Name => self.name = Some(region),
            RegionRole::Id => self.id = Some(region),
            RegionRole::Answer(_) => self.answers.push(region),
        }
    }

    /// 本页全部区域：姓名、学号、答案（按序号）
    pub fn regions(&self) -> impl Iterator<Item = (RegionRole, &RenderedRegion)> {
        let name = self.name.iter().map(|r| (RegionRole::Name, r));
        let id = self.id.iter().map(|r| (RegionRole::Id, r));
        let answers = self
            .answers
            .iter()
            .enumerate()
            .map(|(i, r)| (RegionRole::Answer(i + 1), r));
        name.chain(id).chain(answers)
    }
}
