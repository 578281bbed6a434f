//! 一阶统计量 (First Order Statistics).

use super::stats::{self, Histogram};
use super::{ensure_min_size, Describe, DescribeResult, DescriptorMeta};
use crate::gray_array;
use image::RgbImage;

/// 输出的特征, 按列序排列.
const FEATURES: [&str; 10] = [
    "mean", "variance", "median", "mode", "skewness", "kurtosis", "energy", "entropy", "min",
    "max",
];

/// 灰度直方图上的一阶统计量.
///
/// 输出依次为均值、方差、中位数、众数、偏度、峰度、能量、熵 (以 2 为底)、
/// 最小灰度和最大灰度. 方差为 0 时偏度和峰度记为 0.
#[derive(Debug, Clone)]
pub struct Fos {
    meta: DescriptorMeta,
}

impl Fos {
    /// 初始化.
    pub fn new() -> Self {
        Self {
            // 字面量 id 一定合法.
            meta: DescriptorMeta::new("fos", "FOS").unwrap(),
        }
    }

    /// 各输出特征的名字.
    #[inline]
    pub fn feature_names() -> &'static [&'static str] {
        &FEATURES
    }
}

impl Default for Fos {
    fn default() -> Self {
        Self::new()
    }
}

impl Describe for Fos {
    #[inline]
    fn meta(&self) -> &DescriptorMeta {
        &self.meta
    }

    #[inline]
    fn arity(&self) -> usize {
        FEATURES.len()
    }

    fn describe(&self, img: &RgbImage) -> DescribeResult<Vec<f64>> {
        ensure_min_size(img, 1, 1)?;
        let gray = gray_array(img);
        let hist = Histogram::from_gray(gray.view());
        let p = hist.probabilities();

        let mean = stats::mean(&p);
        let variance = stats::central_moment(&p, mean, 2);
        let (skewness, kurtosis) = if variance > 0.0 {
            let sd = variance.sqrt();
            (
                stats::central_moment(&p, mean, 3) / sd.powi(3),
                stats::central_moment(&p, mean, 4) / variance.powi(2),
            )
        } else {
            (0.0, 0.0)
        };
        let energy = p.iter().map(|v| v * v).sum::<f64>();

        // 图像非空, 以下均存在.
        let median = hist.median_level().unwrap_or_default() as f64;
        let mode = hist.mode_level().unwrap_or_default() as f64;
        let min = hist.min_level().unwrap_or_default() as f64;
        let max = hist.max_level().unwrap_or_default() as f64;

        Ok(vec![
            mean,
            variance,
            median,
            mode,
            skewness,
            kurtosis,
            energy,
            stats::entropy(&p),
            min,
            max,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DescribeError;
    use image::{Rgb, RgbImage};

    fn float_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_fos_flat_image() {
        let img = RgbImage::from_pixel(4, 4, Rgb([100, 100, 100]));
        let v = Fos::new().describe(&img).unwrap();
        assert_eq!(v.len(), Fos::new().arity());
        assert!(float_eq(v[0], 100.0));
        assert!(float_eq(v[1], 0.0));
        assert!(float_eq(v[2], 100.0));
        assert!(float_eq(v[3], 100.0));
        assert!(float_eq(v[4], 0.0));
        assert!(float_eq(v[5], 0.0));
        assert!(float_eq(v[6], 1.0));
        assert!(float_eq(v[7], 0.0));
        assert!(float_eq(v[8], 100.0));
        assert!(float_eq(v[9], 100.0));
    }

    #[test]
    fn test_fos_two_levels() {
        // 左半边黑, 右半边白.
        let img = RgbImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let v = Fos::new().describe(&img).unwrap();
        assert!(float_eq(v[0], 127.5));
        assert!(float_eq(v[1], 127.5 * 127.5));
        assert!(float_eq(v[4], 0.0));
        assert!(float_eq(v[5], 1.0));
        assert!(float_eq(v[6], 0.5));
        assert!(float_eq(v[7], 1.0));
        assert!(float_eq(v[8], 0.0));
        assert!(float_eq(v[9], 255.0));
    }

    #[test]
    fn test_fos_empty_image() {
        let img = RgbImage::new(0, 0);
        assert!(matches!(
            Fos::new().describe(&img),
            Err(DescribeError::ImageTooSmall(..))
        ));
    }

    #[test]
    fn test_fos_columns() {
        let cols = Fos::new().columns();
        assert_eq!(cols.first().unwrap(), "fos_0");
        assert_eq!(cols.last().unwrap(), "fos_9");
        assert_eq!(Fos::feature_names().len(), cols.len());
    }
}
