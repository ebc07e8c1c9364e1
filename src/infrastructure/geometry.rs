//! 坐标换算：PDF 点 → 设备像素
//!
//! 缩放系数为 `dpi / 72`，两个方向相同。坐标先乘 DPI 再除以 72，
//! 整数坐标落在整像素上时结果是精确的。左上角向下取整、右下角向上取整，
//! 再裁剪到页面位图范围内。

use crate::error::RenderError;
use crate::models::BoxCoords;

/// 每英寸的 PDF 点数
pub const POINTS_PER_INCH: f64 = 72.0;

/// 位图中的像素矩形
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// 由 DPI 计算缩放系数
pub fn scale_for_dpi(dpi: u32) -> Result<f64, RenderError> {
    if dpi == 0 {
        return Err(RenderError::InvalidDpi { dpi });
    }
    Ok(f64::from(dpi) / POINTS_PER_INCH)
}

/// 点 → 像素（未取整）
fn to_pixels(points: f64, dpi: u32) -> f64 {
    points * f64::from(dpi) / POINTS_PER_INCH
}

/// 把区域换算为页面位图中的像素矩形
///
/// `raster_width` / `raster_height` 是整页位图的实际尺寸，超出部分被裁掉。
pub fn pixel_rect(
    coords: &BoxCoords,
    dpi: u32,
    raster_width: u32,
    raster_height: u32,
    page_index: u32,
) -> Result<PixelRect, RenderError> {
    scale_for_dpi(dpi)?;
    let max_x = f64::from(raster_width);
    let max_y = f64::from(raster_height);

    let left = to_pixels(coords.x0, dpi).floor().max(0.0);
    let top = to_pixels(coords.y0, dpi).floor().max(0.0);
    let right = to_pixels(coords.x1, dpi).ceil().min(max_x);
    let bottom = to_pixels(coords.y1, dpi).ceil().min(max_y);

    if left >= max_x || top >= max_y || right <= 0.0 || bottom <= 0.0 {
        return Err(RenderError::OutsidePage {
            page: page_index,
            coords: coords.to_string(),
        });
    }
    if right <= left || bottom <= top {
        return Err(RenderError::EmptyRegion { page: page_index });
    }

    Ok(PixelRect {
        left: left as u32,
        top: top as u32,
        width: (right - left) as u32,
        height: (bottom - top) as u32,
    })
}

/// 整页位图的预期尺寸（像素）
pub fn raster_size(width_points: f64, height_points: f64, dpi: u32) -> Result<(u64, u64), RenderError> {
    scale_for_dpi(dpi)?;
    Ok((
        to_pixels(width_points, dpi).ceil().max(0.0) as u64,
        to_pixels(height_points, dpi).ceil().max(0.0) as u64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(x0: f64, y0: f64, x1: f64, y1: f64) -> BoxCoords {
        BoxCoords::new(x0, y0, x1, y1).unwrap()
    }

    #[test]
    fn test_72_dpi_is_identity() {
        let rect = pixel_rect(&coords(10.0, 20.0, 110.0, 70.0), 72, 612, 792, 0).unwrap();
        assert_eq!(
            rect,
            PixelRect {
                left: 10,
                top: 20,
                width: 100,
                height: 50
            }
        );
    }

    #[test]
    fn test_scale_applies_to_both_axes() {
        // 144 / 72 = 2
        let rect = pixel_rect(&coords(10.0, 20.0, 110.0, 70.0), 144, 1224, 1584, 0).unwrap();
        assert_eq!(
            rect,
            PixelRect {
                left: 20,
                top: 40,
                width: 200,
                height: 100
            }
        );
    }

    #[test]
    fn test_fractional_edges_expand_outward() {
        // 300 / 72 = 4.1666...
        let rect = pixel_rect(&coords(1.0, 1.0, 2.0, 2.0), 300, 2550, 3300, 0).unwrap();
        assert_eq!(rect.left, 4);
        assert_eq!(rect.top, 4);
        // ceil(8.33) - 4
        assert_eq!(rect.width, 5);
        assert_eq!(rect.height, 5);
    }

    #[test]
    fn test_partial_overlap_is_clipped() {
        let rect = pixel_rect(&coords(500.0, 700.0, 700.0, 900.0), 72, 612, 792, 1).unwrap();
        assert_eq!(
            rect,
            PixelRect {
                left: 500,
                top: 700,
                width: 112,
                height: 92
            }
        );
    }

    #[test]
    fn test_box_outside_page() {
        let err = pixel_rect(&coords(700.0, 10.0, 800.0, 50.0), 72, 612, 792, 3).unwrap_err();
        assert!(matches!(err, RenderError::OutsidePage { page: 3, .. }));
    }

    #[test]
    fn test_zero_dpi_rejected() {
        let err = pixel_rect(&coords(0.0, 0.0, 10.0, 10.0), 0, 612, 792, 0).unwrap_err();
        assert_eq!(err, RenderError::InvalidDpi { dpi: 0 });
    }

    #[test]
    fn test_empty_raster() {
        let err = pixel_rect(&coords(0.0, 0.0, 10.0, 10.0), 72, 0, 0, 0).unwrap_err();
        assert!(matches!(err, RenderError::OutsidePage { .. }));
    }

    #[test]
    fn test_raster_size_letter_page() {
        assert_eq!(raster_size(612.0, 792.0, 300).unwrap(), (2550, 3300));
        assert!(raster_size(612.0, 792.0, 0).is_err());
    }

    #[test]
    fn test_integral_edges_do_not_gain_a_pixel() {
        for dpi in [150u32, 200, 300, 600] {
            for y1 in 1..=792u32 {
                let rect =
                    pixel_rect(&coords(0.0, 0.0, 10.0, f64::from(y1)), dpi, 100_000, 100_000, 0)
                        .unwrap();
                let expected = (u64::from(y1) * u64::from(dpi)).div_ceil(72);
                assert_eq!(u64::from(rect.height), expected, "y1={y1} dpi={dpi}");
            }
        }
    }

    #[test]
    fn test_raster_size_matches_exact_division() {
        for dpi in [96u32, 150, 300] {
            for points in [595u32, 612, 792, 842] {
                let (w, _) = raster_size(f64::from(points), 10.0, dpi).unwrap();
                assert_eq!(w, (u64::from(points) * u64::from(dpi)).div_ceil(72));
            }
        }
    }
}
