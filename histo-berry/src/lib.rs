#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 提供 BreaKHis 乳腺组织病理图像数据集的加载、手工特征描述子,
//! 以及将描述子结果聚合为带标签特征表 (并持久化为 CSV) 的流水线.
//!
//! 下游的分类器训练脚本只消费本 crate 产出的 CSV 特征表和派生图像,
//! 网络结构、训练循环与可视化不在本 crate 的范围内.
//!
//! # 注意
//!
//! 1. 该 crate 目前只处理二分类 (良性 / 恶性) 组织, 标签 0 为良性,
//!   其余标签一律视为恶性.
//! 2. 流水线是完全同步、单线程的. 任何一个样本出错都会让整次运行失败,
//!   已经计算好的部分结果会被丢弃.
//!
//! # 开发计划
//!
//! ### 数据集加载 ✅
//!
//! 按 `<root>/{benign,malignant}/*/*/*/<mf>/*.png` 的目录结构读取图像,
//! 统一缩放到相同大小.
//!
//! 实现位于 `histo-berry/src/dataset`.
//!
//! ### 特征描述子 ✅
//!
//! 1. 一阶统计量 (FOS). ✅
//! 2. 旋转不变均匀 LBP 直方图. ✅
//! 3. 灰度共生矩阵 (GLCM) 纹理属性. ✅
//! 4. SLIC 超像素均值重绘 (图像型描述子). ✅
//!
//! 实现位于 `histo-berry/src/descriptor`.
//!
//! ### 特征聚合流水线 ✅
//!
//! 表格型与图像型两条导出路径. 每个描述子事先声明输出维度,
//! 运行时逐次校验.
//!
//! 实现位于 `histo-berry/src/extract`.
//!
//! ### 特征表 CSV 读写 ✅
//!
//! 实现位于 `histo-berry/src/table.rs`.

/// 类别标签. 二分类模式下只有 [`consts::BENIGN`] 和 [`consts::MALIGNANT`].
pub type Label = u32;

pub mod consts;

/// 样本与栅格图像的基础数据结构.
mod data;

pub use data::{gray_array, Sample};

pub mod dataset;

pub mod descriptor;

pub mod extract;

pub mod table;

pub mod prelude;

pub use descriptor::{Describe, DescribeError, DescribeImage, DescriptorMeta};
pub use extract::{extract_features, extract_image_like, ExtractError};
pub use table::FeatureTable;
