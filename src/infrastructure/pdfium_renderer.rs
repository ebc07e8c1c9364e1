//! 基于 PDFium 的区域渲染器
//!
//! `Pdfium` 不是 `Send`，每次渲染都在当前线程重新绑定动态库。

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::debug;

use super::geometry::{raster_size, scale_for_dpi};
use super::renderer::{crop_region, RegionRenderer};
use crate::error::RenderError;
use crate::models::{BoxCoords, ExamDocument, RenderedRegion};

/// PDFium 区域渲染器
pub struct PdfiumRenderer {
    max_raster_pixels: u64,
}

impl PdfiumRenderer {
    /// 创建渲染器，启动时即检查 PDFium 动态库能否加载
    pub fn new(max_raster_pixels: u64) -> Result<Self, RenderError> {
        let _ = load_pdfium()?;
        Ok(Self { max_raster_pixels })
    }

    /// 以 `dpi / 72` 的缩放系数光栅化整页
    fn rasterize_page(
        &self,
        document: &ExamDocument,
        page_index: u32,
        dpi: u32,
    ) -> Result<DynamicImage, RenderError> {
        let scale = scale_for_dpi(dpi)?;
        let pdfium = load_pdfium()?;
        let pdf = pdfium
            .load_pdf_from_byte_slice(document.bytes(), None)
            .map_err(|e| RenderError::DocumentLoad {
                document_id: document.id.clone(),
                reason: e.to_string(),
            })?;

        let pages = pdf.pages();
        let page_count = pages.len() as usize;
        let out_of_range = || RenderError::PageOutOfRange {
            page: page_index,
            page_count,
        };
        let index = u16::try_from(page_index).map_err(|_| out_of_range())?;
        let page = pages.get(index).map_err(|_| out_of_range())?;

        let (width, height) = raster_size(
            f64::from(page.width().value),
            f64::from(page.height().value),
            dpi,
        )?;
        if width.saturating_mul(height) > self.max_raster_pixels {
            return Err(RenderError::RasterTooLarge {
                page: page_index,
                width,
                height,
                limit: self.max_raster_pixels,
            });
        }

        let config = PdfRenderConfig::new()
            .scale_page_by_factor(scale as f32)
            .render_form_data(true)
            .render_annotations(true);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| RenderError::RasterFailed {
                page: page_index,
                reason: e.to_string(),
            })?;
        let raster = bitmap.as_image();

        debug!(
            document = %document.id,
            page = page_index,
            dpi,
            width = raster.width(),
            height = raster.height(),
            "页面光栅化完成"
        );

        Ok(raster)
    }
}

impl RegionRenderer for PdfiumRenderer {
    fn render_page(
        &self,
        document: &ExamDocument,
        page_index: u32,
        boxes: &[BoxCoords],
        dpi: u32,
    ) -> Vec<Result<RenderedRegion, RenderError>> {
        if boxes.is_empty() {
            return Vec::new();
        }

        match self.rasterize_page(document, page_index, dpi) {
            Ok(raster) => boxes
                .iter()
                .map(|coords| crop_region(&raster, coords, dpi, page_index))
                .collect(),
            // 整页失败时本页每个区域都得到同一个错误
            Err(e) => vec![Err(e); boxes.len()],
        }
    }
}

/// 加载 PDFium 动态库
///
/// 查找顺序：
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` 环境变量
/// 2. 可执行文件所在目录
/// 3. 系统库路径
fn load_pdfium() -> Result<Pdfium, RenderError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        debug!(path = %path, "从环境变量加载 PDFium");
        let bindings =
            Pdfium::bind_to_library(&path).map_err(|e| RenderError::LibraryUnavailable {
                reason: format!("无法从 {path} 加载 PDFium: {e}"),
            })?;
        return Ok(Pdfium::new(bindings));
    }

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.to_path_buf()))
    {
        let lib_path =
            Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
        if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
            debug!(dir = %exe_dir.display(), "从可执行文件目录加载 PDFium");
            return Ok(Pdfium::new(bindings));
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| {
        RenderError::LibraryUnavailable {
            reason: format!("未找到 PDFium，请设置 PDFIUM_DYNAMIC_LIB_PATH 或安装 PDFium: {e}"),
        }
    })?;
    Ok(Pdfium::new(bindings))
}
