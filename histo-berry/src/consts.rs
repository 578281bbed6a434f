//! 通用常量.

use crate::Label;
use std::fmt;
use std::str::FromStr;

/// 良性组织的标签值.
pub const BENIGN: Label = 0;

/// 恶性组织的标签值.
pub const MALIGNANT: Label = 1;

/// 二分类模式下的类别数.
pub const BINARY_CLASSES: usize = 2;

/// 良性组织的类别名. 同时也是数据集中良性样本的顶层目录名.
pub const BENIGN_NAME: &str = "benign";

/// 恶性组织的类别名. 同时也是数据集中恶性样本的顶层目录名.
pub const MALIGNANT_NAME: &str = "malignant";

/// 未显式指定尺寸时, 样本图像统一缩放到的 `(宽, 高)`.
pub const DEFAULT_IMAGE_SIZE: (u32, u32) = (456, 700);

/// 特征表中文件名列的列名.
pub const IMAGE_COLUMN: &str = "image";

/// 特征表中标签列的列名.
pub const LABEL_COLUMN: &str = "label";

/// 特征表文件的扩展名.
pub const TABLE_EXTENSION: &str = "csv";

/// 图像型描述子导出文件的扩展名.
pub const IMAGE_EXTENSION: &str = "png";

/// 根据标签获得类别名. 标签 0 为良性, 其余一律视为恶性.
#[inline]
pub const fn class_name(label: Label) -> &'static str {
    match label {
        BENIGN => BENIGN_NAME,
        _ => MALIGNANT_NAME,
    }
}

/// 显微镜放大倍数. BreaKHis 数据集按放大倍数分目录存放.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Magnification {
    /// 40 倍.
    X40,

    /// 100 倍.
    X100,

    /// 200 倍.
    X200,

    /// 400 倍.
    X400,
}

impl Magnification {
    /// 所有放大倍数, 按倍率升序.
    pub const ALL: [Magnification; 4] = [Self::X40, Self::X100, Self::X200, Self::X400];

    /// 数据集中该倍数对应的目录名, 如 `"40X"`.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::X40 => "40X",
            Self::X100 => "100X",
            Self::X200 => "200X",
            Self::X400 => "400X",
        }
    }

    /// 默认的特征表输出目录 `features/all/binary/<mf>/`.
    pub fn default_feature_dir(&self) -> String {
        format!("features/all/binary/{}/", self.as_str())
    }
}

impl Default for Magnification {
    #[inline]
    fn default() -> Self {
        Self::X40
    }
}

impl fmt::Display for Magnification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 解析放大倍数字符串失败.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown magnification `{0}`, expected one of 40X, 100X, 200X, 400X")]
pub struct ParseMagnificationError(pub String);

impl FromStr for Magnification {
    type Err = ParseMagnificationError;

    /// 大小写不敏感, 末尾的 `X` 可以省略.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let digits = t.strip_suffix(['X', 'x']).unwrap_or(t);
        match digits {
            "40" => Ok(Self::X40),
            "100" => Ok(Self::X100),
            "200" => Ok(Self::X200),
            "400" => Ok(Self::X400),
            _ => Err(ParseMagnificationError(s.to_string())),
        }
    }
}
