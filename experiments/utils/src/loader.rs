//! 对 `histo-berry::dataset` 的更一层封装. 从环境变量解析实验的输入输出路径.

use histo_berry::consts::{Magnification, ParseMagnificationError};
use std::env;
use std::path::PathBuf;

/// 数据集根目录的环境变量.
pub const DATASET_DIR_ENV: &str = "BREAKHIS_DIR";

/// 放大倍数的环境变量.
pub const MAGNIFICATION_ENV: &str = "BREAKHIS_MF";

/// 特征表输出目录的环境变量.
pub const FEATURE_DIR_ENV: &str = "FEATURE_DIR";

/// 超像素图像输出目录的环境变量.
pub const SUPERPIXEL_DIR_ENV: &str = "SUPERPIXEL_DIR";

/// 获取 BreaKHis 数据集的基本路径 (即包含 `benign` 和 `malignant` 的目录).
///
/// 1. 若环境变量 `$BREAKHIS_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/BreaKHis_v1/histology_slides/breast`.
///
/// 无法确定用户主目录时返回 `None`.
pub fn dataset_dir_from_env_or_home() -> Option<PathBuf> {
    match non_empty_var(DATASET_DIR_ENV) {
        Some(d) => Some(PathBuf::from(d)),
        None => histo_berry::dataset::home_dataset_dir_with([
            "BreaKHis_v1",
            "histology_slides",
            "breast",
        ]),
    }
}

/// 获取放大倍数.
///
/// 1. 若环境变量 `$BREAKHIS_MF` 非空, 则解析其值;
/// 2. 否则, 返回 40X.
pub fn magnification_from_env() -> Result<Magnification, ParseMagnificationError> {
    non_empty_var(MAGNIFICATION_ENV).map_or(Ok(Magnification::default()), |s| s.parse())
}

/// 获取特征表输出目录.
///
/// 1. 若环境变量 `$FEATURE_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `features/all/binary/<mf>/`.
pub fn feature_dir_from_env_or_default(mf: Magnification) -> PathBuf {
    non_empty_var(FEATURE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(mf.default_feature_dir()))
}

/// 获取超像素图像输出目录. 只有设置了环境变量 `$SUPERPIXEL_DIR` 时才运行图像型导出.
pub fn superpixel_dir_from_env() -> Option<PathBuf> {
    non_empty_var(SUPERPIXEL_DIR_ENV).map(PathBuf::from)
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
