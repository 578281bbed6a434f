//! 特征描述子.
//!
//! 描述子分为两种互不兼容的能力:
//!
//! 1. [`Describe`]: 表格型. 将一幅图像映射为定长数值向量, 输出长度 ([`Describe::arity`])
//!   必须事先声明;
//! 2. [`DescribeImage`]: 图像型. 将一幅图像映射为一幅派生图像 (如超像素重绘).
//!
//! 调用方按输出模态分别处理它们, 因此这两个 trait 不做统一.

mod fos;
mod glcm;
mod lbp;
mod slic;
mod stats;

pub use fos::Fos;
pub use glcm::{Glcm, GlcmProperty};
pub use lbp::Lbp;
pub use slic::SlicMean;

use image::RgbImage;
use std::fmt;

/// 描述子元信息.
///
/// `id` 是路径安全的稳定标识, 同时编码了描述子的参数, 用于特征列名前缀和输出文件名;
/// `name` 仅用于展示. 二者分离, 使得同一种算法的不同参数配置不会互相冲突.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptorMeta {
    id: String,
    name: String,
}

impl DescriptorMeta {
    /// 构建元信息.
    ///
    /// `id` 必须非空, 且只能包含 ASCII 字母、数字、`-` 和 `.`, 否则返回 `None`.
    /// (`_` 被保留为列名中 id 与特征索引的分隔符.)
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N) -> Option<Self> {
        let id = id.into();
        if is_path_safe(&id) {
            Some(Self {
                id,
                name: name.into(),
            })
        } else {
            None
        }
    }

    /// 稳定标识.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 展示名.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 第 `index` 个特征的列名, 形如 `<id>_<index>`.
    #[inline]
    pub fn column(&self, index: usize) -> String {
        format!("{}_{index}", self.id)
    }
}

impl fmt::Display for DescriptorMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

fn is_path_safe(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
}

/// 描述子运行时错误.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DescribeError {
    /// 图像太小, 无法运行该描述子.
    ///
    /// 两个参数分别代表描述子要求的最小 `(高, 宽)` 和实际的 `(高, 宽)`.
    #[error("image is too small: need at least {0:?} (h, w), got {1:?}")]
    ImageTooSmall((usize, usize), (usize, usize)),

    /// 图像内容退化, 导致特征无定义.
    #[error("degenerate image: {0}")]
    Degenerate(String),

    /// 其他错误.
    #[error("{0}")]
    Other(String),
}

/// 描述子运行结果.
pub type DescribeResult<T> = Result<T, DescribeError>;

/// 表格型描述子: 将图像映射为定长数值向量.
pub trait Describe {
    /// 元信息.
    fn meta(&self) -> &DescriptorMeta;

    /// 声明的输出向量长度. 对任意输入图像, [`Describe::describe`]
    /// 的成功输出都必须恰好是这个长度.
    fn arity(&self) -> usize;

    /// 计算 `img` 的特征向量.
    fn describe(&self, img: &RgbImage) -> DescribeResult<Vec<f64>>;

    /// 全部输出列名, 按特征索引排列.
    fn columns(&self) -> Vec<String> {
        (0..self.arity()).map(|k| self.meta().column(k)).collect()
    }
}

/// 图像型描述子: 将图像映射为派生图像.
pub trait DescribeImage {
    /// 元信息.
    fn meta(&self) -> &DescriptorMeta;

    /// 计算 `img` 的派生图像.
    fn describe_image(&self, img: &RgbImage) -> DescribeResult<RgbImage>;
}

/// 检查 `img` 的尺寸至少为 `(min_h, min_w)`.
pub(crate) fn ensure_min_size(img: &RgbImage, min_h: usize, min_w: usize) -> DescribeResult<()> {
    let got = (img.height() as usize, img.width() as usize);
    if got.0 < min_h || got.1 < min_w {
        Err(DescribeError::ImageTooSmall((min_h, min_w), got))
    } else {
        Ok(())
    }
}
