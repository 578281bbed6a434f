//! 程序运行函数.

use crate::report::{ExtractReport, ImageLikeReport};
use histo_berry::consts::{ParseMagnificationError, BENIGN};
use histo_berry::dataset::{self, DatasetError};
use histo_berry::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use utils::loader;

/// 运行错误.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// 无法确定数据集目录.
    #[error("cannot locate the dataset, please set ${}", loader::DATASET_DIR_ENV)]
    NoDatasetDir,

    /// 数据集目录不存在.
    #[error("`{0}` is not a directory, please change data dir")]
    NotADirectory(PathBuf),

    /// 数据集目录下没有任何图像.
    #[error("no {mf} images found under `{root}`, please change data dir")]
    NoImages {
        /// 数据集目录.
        root: PathBuf,
        /// 放大倍数.
        mf: Magnification,
    },

    /// 放大倍数配置错误.
    #[error(transparent)]
    Magnification(#[from] ParseMagnificationError),

    /// 数据集加载错误.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// 特征提取错误.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// 默认的表格型描述子集合.
fn default_descriptors() -> Vec<Box<dyn Describe>> {
    let mut ans: Vec<Box<dyn Describe>> = vec![];
    // 参数均为合法字面量.
    ans.extend(Lbp::new(8, 1.0).map(|d| Box::new(d) as Box<dyn Describe>));
    ans.push(Box::new(Glcm::standard()));
    ans.push(Box::new(Fos::new()));
    ans
}

/// 默认的图像型描述子.
fn default_image_like() -> Option<SlicMean> {
    SlicMean::new(100, 10.0, 10)
}

/// 实际运行.
pub fn run() -> Result<ExtractReport, RunError> {
    let root = loader::dataset_dir_from_env_or_home().ok_or(RunError::NoDatasetDir)?;
    if !root.is_dir() {
        return Err(RunError::NotADirectory(root));
    }
    let mf = loader::magnification_from_env()?;

    println!("Loading BreaKHis {mf} from `{}`...", root.display());
    let samples = dataset::read_data(&root, mf, None)?;
    if samples.is_empty() {
        return Err(RunError::NoImages { root, mf });
    }
    let benign = samples.iter().filter(|s| s.label == BENIGN).count();
    log::info!("{} samples of shape {:?}", samples.len(), samples[0].shape());

    let descriptors = default_descriptors();
    let refs: Vec<&dyn Describe> = descriptors.iter().map(|d| &**d).collect();
    let feature_dir = loader::feature_dir_from_env_or_default(mf);

    println!("Extracting features...");
    let since = Instant::now();
    let (_, table) = extract_features(&samples, &refs, true, &feature_dir)?;
    let elapsed = since.elapsed();

    let image_like = match (loader::superpixel_dir_from_env(), default_image_like()) {
        (Some(dir), Some(slic)) => {
            println!("Exporting superpixel images...");
            let since = Instant::now();
            let (names, _) = extract_image_like(&samples, &slic, true, &dir)?;
            Some(ImageLikeReport {
                id: slic.meta().id().to_string(),
                dir,
                images: names.len(),
                elapsed: since.elapsed(),
            })
        }
        _ => None,
    };

    Ok(ExtractReport {
        mf,
        benign,
        malignant: samples.len() - benign,
        descriptors: refs
            .iter()
            .map(|d| (d.meta().id().to_string(), d.arity()))
            .collect(),
        table_path: table_path(&feature_dir, &refs),
        table_shape: (table.n_rows(), table.n_columns()),
        elapsed,
        image_like,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_descriptors() {
        let d = default_descriptors();
        let ids: Vec<&str> = d.iter().map(|d| d.meta().id()).collect();
        assert_eq!(ids, vec!["lbp-p8-r1", "glcm-d1-a0.45.90.135-l256", "fos"]);
        assert_eq!(d.iter().map(|d| d.arity()).sum::<usize>(), 10 + 24 + 10);
        assert!(default_image_like().is_some());
    }
}
