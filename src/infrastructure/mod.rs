//! 基础设施层
//!
//! 持有稀缺资源（PDFium 动态库），只暴露"把区域渲染成图片"的能力，
//! 不认识学生、题目或评分流程。

pub mod geometry;
pub mod pdfium_renderer;
pub mod renderer;

pub use geometry::{pixel_rect, scale_for_dpi, PixelRect, POINTS_PER_INCH};
pub use pdfium_renderer::PdfiumRenderer;
pub use renderer::{crop_region, encode_png, RegionRenderer};
