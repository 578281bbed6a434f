//! 描述子共用的统计工具.

use ndarray::ArrayView2;
use num::Float;

/// 256 级灰度直方图.
#[derive(Clone, Debug)]
pub(crate) struct Histogram {
    counts: [u64; 256],
    total: u64,
}

impl Histogram {
    /// 统计 `gray` 中各灰度级的像素个数.
    pub fn from_gray(gray: ArrayView2<u8>) -> Self {
        let mut counts = [0u64; 256];
        for &pix in gray.iter() {
            counts[pix as usize] += 1;
        }
        Self {
            counts,
            total: gray.len() as u64,
        }
    }

    /// 归一化后的概率分布. 空直方图返回全 0.
    pub fn probabilities(&self) -> [f64; 256] {
        let mut p = [0.0; 256];
        if self.total == 0 {
            return p;
        }
        let n = self.total as f64;
        for (dst, &c) in p.iter_mut().zip(self.counts.iter()) {
            *dst = c as f64 / n;
        }
        p
    }

    /// 最小的非空灰度级.
    pub fn min_level(&self) -> Option<usize> {
        self.counts.iter().position(|&c| c > 0)
    }

    /// 最大的非空灰度级.
    pub fn max_level(&self) -> Option<usize> {
        self.counts.iter().rposition(|&c| c > 0)
    }

    /// 累计像素数首次达到总数一半时的灰度级.
    pub fn median_level(&self) -> Option<usize> {
        if self.total == 0 {
            return None;
        }
        let half = (self.total + 1) / 2;
        let mut acc = 0u64;
        for (level, &c) in self.counts.iter().enumerate() {
            acc += c;
            if acc >= half {
                return Some(level);
            }
        }
        unreachable!()
    }

    /// 像素最多的灰度级. 并列时取较小者.
    pub fn mode_level(&self) -> Option<usize> {
        if self.total == 0 {
            return None;
        }
        let mut best = 0;
        for (level, &c) in self.counts.iter().enumerate() {
            if c > self.counts[best] {
                best = level;
            }
        }
        Some(best)
    }
}

/// 离散分布 `p` (下标即取值) 的 `k` 阶中心矩.
pub(crate) fn central_moment<T: Float>(p: &[T], mean: T, k: i32) -> T {
    p.iter().enumerate().fold(T::zero(), |acc, (i, &pi)| {
        let x = T::from(i).unwrap();
        acc + (x - mean).powi(k) * pi
    })
}

/// 离散分布 `p` (下标即取值) 的期望.
pub(crate) fn mean<T: Float>(p: &[T]) -> T {
    p.iter()
        .enumerate()
        .fold(T::zero(), |acc, (i, &pi)| acc + T::from(i).unwrap() * pi)
}

/// 离散分布 `p` 的香农熵, 以 2 为底.
pub(crate) fn entropy<T: Float>(p: &[T]) -> T {
    p.iter()
        .filter(|&&pi| pi > T::zero())
        .fold(T::zero(), |acc, &pi| acc - pi * pi.log2())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn float_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn test_histogram_levels() {
        let g = array![[0u8, 0, 10], [10, 10, 200]];
        let h = Histogram::from_gray(g.view());
        assert_eq!(h.total, 6);
        assert_eq!(h.min_level(), Some(0));
        assert_eq!(h.max_level(), Some(200));
        assert_eq!(h.median_level(), Some(10));
        assert_eq!(h.mode_level(), Some(10));

        let p = h.probabilities();
        assert!(float_eq(p.iter().sum::<f64>(), 1.0));
        assert!(float_eq(p[10], 0.5));
    }

    #[test]
    fn test_empty_histogram() {
        let g = ndarray::Array2::<u8>::zeros((0, 0));
        let h = Histogram::from_gray(g.view());
        assert_eq!(h.min_level(), None);
        assert_eq!(h.median_level(), None);
        assert!(h.probabilities().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_moments() {
        // 取值 0 和 2, 各占一半.
        let p = [0.5, 0.0, 0.5];
        let m = mean(&p);
        assert!(float_eq(m, 1.0));
        assert!(float_eq(central_moment(&p, m, 2), 1.0));
        assert!(float_eq(central_moment(&p, m, 3), 0.0));
        assert!(float_eq(entropy(&p), 1.0));
    }
}
