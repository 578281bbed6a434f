//! 数据集操作.

use crate::Label;
use std::path::{Path, PathBuf};

mod breakhis;

pub use breakhis::{binary_paths, read_data, read_images};

/// 数据集加载错误.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// 图像无法打开或解码.
    #[error("failed to decode `{path}`: {source}")]
    Decode {
        /// 图像路径.
        path: PathBuf,
        /// 底层错误.
        source: image::ImageError,
    },

    /// 遍历数据集目录错误.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// 标签超出类别数.
    #[error("label {label} is out of range for {classes} classes")]
    LabelOutOfRange {
        /// 越界标签.
        label: Label,
        /// 类别数.
        classes: usize,
    },
}

/// 数据集操作结果.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// 获取 `{用户主目录}/dataset` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    Some(ans)
}

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = home_dataset_dir()?;
    ans.extend(it);
    Some(ans)
}

/// 从路径中提取样本标识: 最后一个路径分量 (`/` 与 `\` 均视为分隔符),
/// 截断到第一个 `.` 之前.
///
/// ```
/// use histo_berry::dataset::alter_name;
///
/// assert_eq!(alter_name("a\\b\\SOB_B_A-14-22549AB-40-001.png"), "SOB_B_A-14-22549AB-40-001");
/// assert_eq!(alter_name("x/y.tar.gz"), "y");
/// ```
pub fn alter_name<S: AsRef<str>>(path: S) -> String {
    let path = path.as_ref();
    let last = path.rsplit(['/', '\\']).next().unwrap_or(path);
    last.split('.').next().unwrap_or(last).to_string()
}

/// 计算类别均衡采样的样本权重.
///
/// 第 `i` 个样本的权重为 `N / count[labels[i]]`, 其中 `N` 为样本总数.
/// 任一标签不小于 `classes` 时返回错误.
pub fn balanced_weights(labels: &[Label], classes: usize) -> DatasetResult<Vec<f64>> {
    let mut count = vec![0u64; classes];
    for &label in labels {
        match count.get_mut(label as usize) {
            Some(c) => *c += 1,
            None => return Err(DatasetError::LabelOutOfRange { label, classes }),
        }
    }
    let n = labels.len() as f64;

    // 出现过的类别计数一定非零.
    Ok(labels
        .iter()
        .map(|&label| n / count[label as usize] as f64)
        .collect())
}
