//! 特征聚合流水线.
//!
//! 两条导出路径共享同样的外层迭代结构, 但输出模态不同:
//!
//! 1. [`extract_features`]: 表格型描述子 -> [`crate::FeatureTable`] (+ CSV);
//! 2. [`extract_image_like`]: 图像型描述子 -> 派生图像列表 (+ PNG 文件).
//!
//! 两者都是完全同步、单线程的, 不做缓存, 每次调用都从头计算.
//! 任何一个样本出错都会终止整次运行, 已计算的部分结果随之丢弃.

mod image_like;
mod tabular;

pub use image_like::{extract_image_like, image_like_path};
pub use tabular::{extract_features, table_path};

use crate::descriptor::DescribeError;
use std::path::PathBuf;

/// 流水线运行时错误.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// 输入样本集为空.
    #[error("no samples to extract features from")]
    EmptySamples,

    /// 多个描述子共用同一个 id, 其特征列名会互相冲突.
    #[error("descriptor id `{0}` appears more than once")]
    DuplicateDescriptor(String),

    /// 描述子在某个样本上运行失败.
    #[error("descriptor `{descriptor}` failed on `{filename}`: {source}")]
    Describe {
        /// 描述子 id.
        descriptor: String,
        /// 样本文件名.
        filename: String,
        /// 底层错误.
        source: DescribeError,
    },

    /// 描述子输出长度与其声明的长度不符.
    #[error("descriptor `{descriptor}` declared {expected} features but returned {got} on `{filename}`")]
    ArityMismatch {
        /// 描述子 id.
        descriptor: String,
        /// 样本文件名.
        filename: String,
        /// 声明的长度.
        expected: usize,
        /// 实际的长度.
        got: usize,
    },

    /// 持久化时的 I/O 错误.
    #[error("failed to write `{path}`: {source}")]
    Io {
        /// 目标路径.
        path: PathBuf,
        /// 底层错误.
        source: std::io::Error,
    },

    /// 保存派生图像错误.
    #[error("failed to save image `{path}`: {source}")]
    Image {
        /// 目标路径.
        path: PathBuf,
        /// 底层错误.
        source: image::ImageError,
    },
}

/// 流水线运行结果.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// 以 [`ExtractError::Io`] 包装 `path` 上的 I/O 错误.
#[inline]
fn io_error(path: PathBuf) -> impl FnOnce(std::io::Error) -> ExtractError {
    move |source| ExtractError::Io { path, source }
}
