//! 区域渲染接口与通用的裁剪/编码逻辑

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use super::geometry::pixel_rect;
use crate::error::RenderError;
use crate::models::{BoxCoords, ExamDocument, RenderedRegion};

/// 区域渲染器
///
/// 实现必须是确定性的：同一文档、页码、区域、DPI 总是得到相同的字节。
/// 调用是阻塞的，异步代码中应放到 `spawn_blocking` 里执行。
pub trait RegionRenderer: Send + Sync {
    /// 渲染一页上的多个区域
    ///
    /// 整页只光栅化一次；返回值与 `boxes` 一一对应，单个区域失败不影响其他区域。
    fn render_page(
        &self,
        document: &ExamDocument,
        page_index: u32,
        boxes: &[BoxCoords],
        dpi: u32,
    ) -> Vec<Result<RenderedRegion, RenderError>>;

    /// 渲染单个区域
    fn render(
        &self,
        document: &ExamDocument,
        page_index: u32,
        coords: &BoxCoords,
        dpi: u32,
    ) -> Result<RenderedRegion, RenderError> {
        self.render_page(document, page_index, std::slice::from_ref(coords), dpi)
            .into_iter()
            .next()
            .unwrap_or(Err(RenderError::EmptyRegion { page: page_index }))
    }
}

/// 从整页位图中裁出区域并编码为 PNG
pub fn crop_region(
    raster: &DynamicImage,
    coords: &BoxCoords,
    dpi: u32,
    page_index: u32,
) -> Result<RenderedRegion, RenderError> {
    let rect = pixel_rect(coords, dpi, raster.width(), raster.height(), page_index)?;
    let cropped = raster.crop_imm(rect.left, rect.top, rect.width, rect.height);
    Ok(RenderedRegion::from_png(encode_png(&cropped)?))
}

/// 无损编码为 PNG
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, RenderError> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| RenderError::EncodeFailed {
            reason: e.to_string(),
        })?;
    Ok(cursor.into_inner())
}
