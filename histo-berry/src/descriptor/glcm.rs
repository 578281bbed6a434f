//! 灰度共生矩阵 (Gray-Level Co-occurrence Matrix) 纹理属性.

use super::{ensure_min_size, Describe, DescribeResult, DescriptorMeta};
use crate::gray_array;
use image::RgbImage;
use itertools::Itertools;
use ndarray::{Array2, ArrayView2};
use std::f64::consts::FRAC_PI_4;

/// 从共生矩阵导出的纹理属性.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GlcmProperty {
    /// `sum P(i, j) (i - j)^2`.
    Contrast,

    /// `sum P(i, j) |i - j|`.
    Dissimilarity,

    /// `sum P(i, j) / (1 + (i - j)^2)`.
    Homogeneity,

    /// `sqrt(ASM)`.
    Energy,

    /// 行列灰度的相关系数. 任一方向标准差为 0 时记为 1.
    Correlation,

    /// 角二阶矩 `sum P(i, j)^2`.
    Asm,
}

impl GlcmProperty {
    /// 全部属性, 同时也是输出中的排列顺序.
    pub const ALL: [GlcmProperty; 6] = [
        Self::Contrast,
        Self::Dissimilarity,
        Self::Homogeneity,
        Self::Energy,
        Self::Correlation,
        Self::Asm,
    ];

    /// 在归一化共生矩阵 `p` 上计算该属性.
    pub fn eval(&self, p: ArrayView2<f64>) -> f64 {
        match self {
            Self::Contrast => weighted_sum(p, |i, j| (i - j).powi(2)),
            Self::Dissimilarity => weighted_sum(p, |i, j| (i - j).abs()),
            Self::Homogeneity => weighted_sum(p, |i, j| 1.0 / (1.0 + (i - j).powi(2))),
            Self::Energy => Self::Asm.eval(p).sqrt(),
            Self::Asm => p.iter().map(|v| v * v).sum(),
            Self::Correlation => correlation(p),
        }
    }
}

/// 灰度共生矩阵纹理属性.
///
/// 对每一对 `(distance, angle)`, 以 `(round(sin(angle) * d), round(cos(angle) * d))`
/// 为 `(行, 列)` 偏移统计非对称共生矩阵, 归一化后计算 [`GlcmProperty::ALL`]
/// 中的六个属性. 输出按属性、距离、角度的顺序展开.
#[derive(Debug, Clone)]
pub struct Glcm {
    meta: DescriptorMeta,
    distances: Vec<u32>,
    angles: Vec<f64>,
    levels: u32,
}

impl Glcm {
    /// 构建 GLCM 描述子.
    ///
    /// `distances` 和 `angles` (弧度) 必须非空, 距离必须为正, 角度必须有限,
    /// `levels` 必须在 `2..=256` 之间, 否则返回 `None`.
    /// 灰度值 `v` 会被量化为 `v * levels / 256`.
    pub fn new(distances: Vec<u32>, angles: Vec<f64>, levels: u32) -> Option<Self> {
        if distances.is_empty()
            || angles.is_empty()
            || distances.contains(&0)
            || angles.iter().any(|a| !a.is_finite())
            || !(2..=256).contains(&levels)
        {
            return None;
        }
        let id = format!(
            "glcm-d{}-a{}-l{levels}",
            distances.iter().join("."),
            angles
                .iter()
                .map(|a| a.to_degrees().round() as i64)
                .join("."),
        );
        let meta = DescriptorMeta::new(id, format!("GLCM(levels={levels})"))?;
        Some(Self {
            meta,
            distances,
            angles,
            levels,
        })
    }

    /// 距离 1, 角度 0, π/4, π/2, 3π/4, 256 级灰度.
    pub fn standard() -> Self {
        // 参数合法.
        Self::new(
            vec![1],
            vec![0.0, FRAC_PI_4, 2.0 * FRAC_PI_4, 3.0 * FRAC_PI_4],
            256,
        )
        .unwrap()
    }

    /// 灰度级数.
    #[inline]
    pub fn levels(&self) -> u32 {
        self.levels
    }

    /// 统计 `(distance, angle)` 下的归一化共生矩阵. 若不存在任何像素对, 返回全 0 矩阵.
    pub fn matrix(&self, gray: ArrayView2<u8>, distance: u32, angle: f64) -> Array2<f64> {
        let n = self.levels as usize;
        let (h, w) = gray.dim();
        let dr = (angle.sin() * distance as f64).round() as isize;
        let dc = (angle.cos() * distance as f64).round() as isize;

        let mut m = Array2::<f64>::zeros((n, n));
        let quantize = |v: u8| v as usize * n / 256;

        for ((r, c), &pix) in gray.indexed_iter() {
            let rr = r as isize + dr;
            let cc = c as isize + dc;
            if rr < 0 || cc < 0 || rr >= h as isize || cc >= w as isize {
                continue;
            }
            let other = gray[(rr as usize, cc as usize)];
            m[(quantize(pix), quantize(other))] += 1.0;
        }

        let total = m.sum();
        if total > 0.0 {
            m /= total;
        }
        m
    }
}

impl Describe for Glcm {
    #[inline]
    fn meta(&self) -> &DescriptorMeta {
        &self.meta
    }

    #[inline]
    fn arity(&self) -> usize {
        GlcmProperty::ALL.len() * self.distances.len() * self.angles.len()
    }

    fn describe(&self, img: &RgbImage) -> DescribeResult<Vec<f64>> {
        ensure_min_size(img, 1, 1)?;
        let gray = gray_array(img);

        let mut matrices = Vec::with_capacity(self.distances.len() * self.angles.len());
        for (&d, &a) in self.distances.iter().cartesian_product(self.angles.iter()) {
            matrices.push(self.matrix(gray.view(), d, a));
        }

        let mut ans = Vec::with_capacity(self.arity());
        for prop in GlcmProperty::ALL {
            ans.extend(matrices.iter().map(|m| prop.eval(m.view())));
        }
        Ok(ans)
    }
}

fn weighted_sum<F: Fn(f64, f64) -> f64>(p: ArrayView2<f64>, f: F) -> f64 {
    p.indexed_iter()
        .map(|((i, j), &v)| v * f(i as f64, j as f64))
        .sum()
}

fn correlation(p: ArrayView2<f64>) -> f64 {
    let mu_i = weighted_sum(p, |i, _| i);
    let mu_j = weighted_sum(p, |_, j| j);
    let sd_i = weighted_sum(p, |i, _| (i - mu_i).powi(2)).sqrt();
    let sd_j = weighted_sum(p, |_, j| (j - mu_j).powi(2)).sqrt();
    if sd_i < 1e-15 || sd_j < 1e-15 {
        return 1.0;
    }
    weighted_sum(p, |i, j| (i - mu_i) * (j - mu_j)) / (sd_i * sd_j)
}
