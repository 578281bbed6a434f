use crate::Label;
use image::RgbImage;

mod raster;

pub use raster::gray_array;

/// 一个样本: 解码后的 RGB 栅格图像, 类别标签和稳定的文件名标识.
///
/// 样本在流水线中只读, 任何描述子都不会修改它.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// 解码后的图像.
    pub image: RgbImage,

    /// 类别标签.
    pub label: Label,

    /// 文件名 (不含目录与扩展名). 假定在一次运行中唯一, 但不做校验.
    pub filename: String,
}

impl Sample {
    /// 构造样本.
    #[inline]
    pub fn new<S: Into<String>>(image: RgbImage, label: Label, filename: S) -> Self {
        Self {
            image,
            label,
            filename: filename.into(),
        }
    }

    /// 图像的 `(高, 宽)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.image.height() as usize, self.image.width() as usize)
    }
}
