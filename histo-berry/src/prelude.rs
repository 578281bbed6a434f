//! 🫐欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{gray_array, Label, Sample};

pub use crate::consts::{class_name, Magnification, BENIGN, MALIGNANT};

pub use crate::dataset::{self, alter_name, balanced_weights, read_data, read_images};

pub use crate::descriptor::{
    Describe, DescribeError, DescribeImage, DescriptorMeta, Fos, Glcm, Lbp, SlicMean,
};

pub use crate::extract::{
    extract_features, extract_image_like, image_like_path, table_path, ExtractError,
};

pub use crate::table::{FeatureTable, ReadTableError};
