//! 旋转不变均匀局部二值模式 (Local Binary Patterns).

use super::{ensure_min_size, Describe, DescribeResult, DescriptorMeta};
use crate::gray_array;
use image::RgbImage;
use ndarray::ArrayView2;
use std::f64::consts::PI;

/// 旋转不变均匀 LBP 码直方图.
///
/// 以每个像素为圆心, 在半径为 `radius` 的圆上均匀取 `points` 个采样点
/// (双线性插值, 图像外部视为 0), 与圆心比较得到二值模式. 模式中 0/1
/// 跳变不超过 2 次的 "均匀" 模式按 1 的个数编码为 `0..=points`,
/// 其余模式统一编码为 `points + 1`. 输出为这 `points + 2` 个码的归一化直方图.
#[derive(Debug, Clone)]
pub struct Lbp {
    meta: DescriptorMeta,
    points: u32,
    radius: f64,

    /// 采样点相对圆心的 `(dh, dw)` 偏移.
    offsets: Vec<(f64, f64)>,
}

impl Lbp {
    /// 采样点个数上限.
    pub const MAX_POINTS: u32 = 32;

    /// 构建 LBP 描述子.
    ///
    /// `points` 必须在 `3..=32` 之间, `radius` 必须为有限正数, 否则返回 `None`.
    pub fn new(points: u32, radius: f64) -> Option<Self> {
        if !(3..=Self::MAX_POINTS).contains(&points) || !radius.is_finite() || radius <= 0.0 {
            return None;
        }
        let meta = DescriptorMeta::new(
            format!("lbp-p{points}-r{radius}"),
            format!("LBP(P={points}, R={radius})"),
        )?;
        let offsets = (0..points)
            .map(|p| {
                let theta = 2.0 * PI * p as f64 / points as f64;
                (round5(-radius * theta.sin()), round5(radius * theta.cos()))
            })
            .collect();
        Some(Self {
            meta,
            points,
            radius,
            offsets,
        })
    }

    /// 采样点个数.
    #[inline]
    pub fn points(&self) -> u32 {
        self.points
    }

    /// 采样半径.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// 计算每个像素的 LBP 码.
    fn codes(&self, gray: ArrayView2<u8>) -> Vec<u32> {
        let (h, w) = gray.dim();
        let mut ans = Vec::with_capacity(h * w);
        let mut bits = vec![false; self.offsets.len()];
        for ((r, c), &center) in gray.indexed_iter() {
            let center = center as f64;
            for (bit, &(dh, dw)) in bits.iter_mut().zip(self.offsets.iter()) {
                *bit = bilinear(gray, r as f64 + dh, c as f64 + dw) - center >= 0.0;
            }
            ans.push(self.encode(&bits));
        }
        ans
    }

    fn encode(&self, bits: &[bool]) -> u32 {
        let changes = bits
            .iter()
            .zip(bits.iter().cycle().skip(1))
            .filter(|(a, b)| a != b)
            .count();
        if changes <= 2 {
            bits.iter().filter(|b| **b).count() as u32
        } else {
            self.points + 1
        }
    }
}

impl Describe for Lbp {
    #[inline]
    fn meta(&self) -> &DescriptorMeta {
        &self.meta
    }

    #[inline]
    fn arity(&self) -> usize {
        self.points as usize + 2
    }

    fn describe(&self, img: &RgbImage) -> DescribeResult<Vec<f64>> {
        ensure_min_size(img, 1, 1)?;
        let gray = gray_array(img);
        let codes = self.codes(gray.view());

        let mut hist = vec![0.0; self.arity()];
        for code in codes.iter() {
            hist[*code as usize] += 1.0;
        }
        let n = codes.len() as f64;
        hist.iter_mut().for_each(|v| *v /= n);
        Ok(hist)
    }
}

#[inline]
fn round5(v: f64) -> f64 {
    (v * 1e5).round() / 1e5
}

/// 在 `(y, x)` 处双线性插值. 图像外部的像素视为 0.
fn bilinear(gray: ArrayView2<u8>, y: f64, x: f64) -> f64 {
    let y0 = y.floor();
    let x0 = x.floor();
    let dy = y - y0;
    let dx = x - x0;

    let at = |yy: f64, xx: f64| -> f64 {
        if yy < 0.0 || xx < 0.0 {
            return 0.0;
        }
        gray.get((yy as usize, xx as usize))
            .map_or(0.0, |&v| v as f64)
    };

    // 先水平后垂直地线性插值. 四邻像素相等时结果与它们严格相等.
    let top = lerp(at(y0, x0), at(y0, x0 + 1.0), dx);
    let bottom = lerp(at(y0 + 1.0, x0), at(y0 + 1.0, x0 + 1.0), dx);
    lerp(top, bottom, dy)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
