//! 表格型特征导出.

use super::{io_error, ExtractError, ExtractResult};
use crate::consts::TABLE_EXTENSION;
use crate::descriptor::Describe;
use crate::{FeatureTable, Sample};
use itertools::Itertools;
use ndarray::Array2;
use std::fs;
use std::path::{Path, PathBuf};

/// 对每个样本运行每个描述子, 并将结果聚合为一张宽特征表.
///
/// 外层按 `descriptors` 顺序、内层按 `samples` 顺序依次计算. 返回输入文件名的副本和特征表.
/// 若 `save` 为 `true`, 特征表会写入 [`table_path`] 给出的 CSV 文件
/// (不存在的目录会被创建, 已存在的文件会被直接覆盖).
///
/// # 注意
///
/// 1. `samples` 不能为空, 否则返回 [`ExtractError::EmptySamples`].
/// 2. `descriptors` 为空时不视为错误: 特征表只有 `image` 和 `label` 两列.
/// 3. 每次调用描述子后都会校验输出长度等于 [`Describe::arity`],
///   不符时立即返回 [`ExtractError::ArityMismatch`].
/// 4. 描述子 id 必须两两不同, 否则在任何计算之前返回 [`ExtractError::DuplicateDescriptor`].
/// 5. 文件名的唯一性不做校验.
pub fn extract_features<P: AsRef<Path>>(
    samples: &[Sample],
    descriptors: &[&dyn Describe],
    save: bool,
    feature_dir: P,
) -> ExtractResult<(Vec<String>, FeatureTable)> {
    if samples.is_empty() {
        return Err(ExtractError::EmptySamples);
    }
    if let Some(id) = descriptors.iter().map(|d| d.meta().id()).duplicates().next() {
        return Err(ExtractError::DuplicateDescriptor(id.to_string()));
    }
    if descriptors.is_empty() {
        log::warn!("no descriptors given, the table will only hold `image` and `label`");
    }

    let filenames: Vec<String> = samples.iter().map(|s| s.filename.clone()).collect();
    let labels = samples.iter().map(|s| s.label).collect();
    let mut table = FeatureTable::new(filenames.clone(), labels);

    for &d in descriptors {
        let block = describe_all(samples, d)?;
        table.append_columns(d.columns(), block);
    }

    if save {
        let path = table_path(feature_dir, descriptors);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent.to_path_buf()))?;
        }
        table.save_csv(&path).map_err(io_error(path.clone()))?;
        log::info!(
            "saved {} x {} feature table to `{}`",
            table.n_rows(),
            table.n_columns(),
            path.display()
        );
    }

    Ok((filenames, table))
}

/// 特征表的持久化路径: `feature_dir` 下, 以全部描述子 id 依次拼接为文件名, 扩展名为 `csv`.
///
/// `feature_dir` 总是被视为目录: 结果是 `feature_dir.join(...)`, 而不是在其字符串末尾
/// 直接拼接, 因此 `out` 和 `out/` 得到同一个路径 `out/<ids>.csv`.
///
/// 例如 `feature_dir` 为 `features/`, 描述子为 `fos` 和 `lbp-p8-r1` 时,
/// 路径为 `features/foslbp-p8-r1.csv`. 没有描述子时文件名为 `.csv`.
pub fn table_path<P: AsRef<Path>>(feature_dir: P, descriptors: &[&dyn Describe]) -> PathBuf {
    let stem: String = descriptors.iter().map(|d| d.meta().id()).collect();
    feature_dir
        .as_ref()
        .join(format!("{stem}.{TABLE_EXTENSION}"))
}

/// 在全部样本上运行一个描述子, 得到 `(样本数, arity)` 的特征块.
fn describe_all(samples: &[Sample], d: &dyn Describe) -> ExtractResult<Array2<f64>> {
    let meta = d.meta();
    let arity = d.arity();
    let n = samples.len();
    log::info!("running {meta}: {arity} features over {n} samples");

    let mut block = Array2::<f64>::zeros((n, arity));
    for (i, (sample, mut row)) in samples.iter().zip(block.rows_mut()).enumerate() {
        log::debug!("{}: {}/{n} `{}`", meta.id(), i + 1, sample.filename);

        let values = d
            .describe(&sample.image)
            .map_err(|source| ExtractError::Describe {
                descriptor: meta.id().to_string(),
                filename: sample.filename.clone(),
                source,
            })?;
        if values.len() != arity {
            return Err(ExtractError::ArityMismatch {
                descriptor: meta.id().to_string(),
                filename: sample.filename.clone(),
                expected: arity,
                got: values.len(),
            });
        }
        for (dst, v) in row.iter_mut().zip(values) {
            *dst = v;
        }
    }
    Ok(block)
}
