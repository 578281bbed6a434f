//! 栅格图像到 `ndarray` 矩阵的转换.

use image::RgbImage;
use ndarray::Array2;

/// 将 RGB 图像转换为 `(高, 宽)` 布局的 8-bit 灰度矩阵.
///
/// 灰度化使用 `image` crate 的亮度系数 (Rec. 709).
pub fn gray_array(img: &RgbImage) -> Array2<u8> {
    let (w, h) = img.dimensions();
    let gray = image::imageops::grayscale(img);

    // 该操作不会生成 `Err`, 可直接 unwrap.
    Array2::from_shape_vec((h as usize, w as usize), gray.into_raw()).unwrap()
}
