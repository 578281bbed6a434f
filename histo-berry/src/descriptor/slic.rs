//! SLIC 超像素均值重绘.

use super::{ensure_min_size, DescribeImage, DescribeResult, DescriptorMeta};
use image::{Rgb, RgbImage};
use ndarray::Array2;
use ordered_float::NotNan;

/// 未归属任何聚类中心的像素.
const UNLABELED: usize = usize::MAX;

/// 聚类中心: `[r, g, b, y, x]`.
type Center = [f64; 5];

/// 以 SLIC (Simple Linear Iterative Clustering) 超像素分割图像,
/// 并用每个超像素的平均颜色重绘整幅图像.
///
/// 颜色距离在 RGB 空间计算, 空间距离以网格步长 `S = sqrt(N / segments)` 归一化,
/// 再乘以 `compactness`. `compactness` 越大, 超像素越接近规则网格.
#[derive(Debug, Clone)]
pub struct SlicMean {
    meta: DescriptorMeta,
    segments: u32,
    compactness: f64,
    iterations: u32,
}

impl SlicMean {
    /// 构建 SLIC 描述子.
    ///
    /// `segments` 与 `iterations` 必须为正, `compactness` 必须为有限正数,
    /// 否则返回 `None`.
    pub fn new(segments: u32, compactness: f64, iterations: u32) -> Option<Self> {
        if segments == 0 || iterations == 0 || !compactness.is_finite() || compactness <= 0.0 {
            return None;
        }
        let meta = DescriptorMeta::new(
            format!("slic-n{segments}-c{compactness}-i{iterations}"),
            format!("SLIC(n={segments}, m={compactness})"),
        )?;
        Some(Self {
            meta,
            segments,
            compactness,
            iterations,
        })
    }

    /// 计算每个像素所属的超像素编号, 编号范围为 `0..centers`.
    pub fn segment(&self, img: &RgbImage) -> Array2<usize> {
        let (w, h) = img.dimensions();
        let (h, w) = (h as usize, w as usize);
        let step = ((h * w) as f64 / self.segments as f64).sqrt().max(1.0);
        let mut centers = grid_centers(img, step);

        let mut labels = Array2::<usize>::from_elem((h, w), UNLABELED);
        let mut dist = Array2::<f64>::from_elem((h, w), f64::INFINITY);
        let spatial_weight = (self.compactness / step).powi(2);
        let radius = step.ceil() as isize;

        for _ in 0..self.iterations {
            labels.fill(UNLABELED);
            dist.fill(f64::INFINITY);

            for (k, c) in centers.iter().enumerate() {
                let (cy, cx) = (c[3].round() as isize, c[4].round() as isize);
                let y_range = (cy - radius).max(0)..(cy + radius + 1).min(h as isize);
                let x_range = (cx - radius).max(0)..(cx + radius + 1).min(w as isize);
                for y in y_range {
                    for x in x_range.clone() {
                        let d = distance(c, feature(img, y as usize, x as usize), spatial_weight);
                        let pos = (y as usize, x as usize);
                        if d < dist[pos] {
                            dist[pos] = d;
                            labels[pos] = k;
                        }
                    }
                }
            }

            assign_orphans(&mut labels, &centers);
            centers = update_centers(img, &labels, &centers);
        }
        labels
    }
}

impl DescribeImage for SlicMean {
    #[inline]
    fn meta(&self) -> &DescriptorMeta {
        &self.meta
    }

    fn describe_image(&self, img: &RgbImage) -> DescribeResult<RgbImage> {
        ensure_min_size(img, 1, 1)?;
        let labels = self.segment(img);

        let n = labels.iter().copied().max().map_or(0, |m| m + 1);
        let mut sums = vec![[0.0f64; 3]; n];
        let mut counts = vec![0u64; n];
        for ((y, x), &k) in labels.indexed_iter() {
            let p = img.get_pixel(x as u32, y as u32);
            for ch in 0..3 {
                sums[k][ch] += p[ch] as f64;
            }
            counts[k] += 1;
        }

        let means: Vec<Rgb<u8>> = sums
            .iter()
            .zip(counts.iter())
            .map(|(s, &c)| {
                let c = c.max(1) as f64;
                Rgb(s.map(|v| (v / c).round().clamp(0.0, 255.0) as u8))
            })
            .collect();

        let (w, h) = img.dimensions();
        Ok(RgbImage::from_fn(w, h, |x, y| {
            means[labels[(y as usize, x as usize)]]
        }))
    }
}

#[inline]
fn feature(img: &RgbImage, y: usize, x: usize) -> Center {
    let p = img.get_pixel(x as u32, y as u32);
    [p[0] as f64, p[1] as f64, p[2] as f64, y as f64, x as f64]
}

/// 平方距离. 单调性与开方后相同, 省去开方.
#[inline]
fn distance(c: &Center, f: Center, spatial_weight: f64) -> f64 {
    let dc = (0..3).map(|i| (c[i] - f[i]).powi(2)).sum::<f64>();
    let ds = (c[3] - f[3]).powi(2) + (c[4] - f[4]).powi(2);
    dc + ds * spatial_weight
}

/// 以 `step` 为步长, 在网格单元中心放置初始聚类中心.
fn grid_centers(img: &RgbImage, step: f64) -> Vec<Center> {
    let (w, h) = img.dimensions();
    let (h, w) = (h as f64, w as f64);
    // 狭长图像上, 半个步长可能已越界.
    let mut ans = Vec::new();
    let mut y = (step / 2.0).min(h / 2.0);
    while y < h {
        let mut x = (step / 2.0).min(w / 2.0);
        while x < w {
            ans.push(feature(img, y as usize, x as usize));
            x += step;
        }
        y += step;
    }
    ans
}

/// 将搜索窗口没有覆盖到的像素分配给空间上最近的中心.
fn assign_orphans(labels: &mut Array2<usize>, centers: &[Center]) {
    for ((y, x), k) in labels.indexed_iter_mut() {
        if *k != UNLABELED {
            continue;
        }
        let (yf, xf) = (y as f64, x as f64);
        // `centers` 非空: 至少有一个网格中心.
        if let Some((nearest, _)) = centers.iter().enumerate().min_by_key(|(_, c)| {
            NotNan::new((c[3] - yf).powi(2) + (c[4] - xf).powi(2)).unwrap()
        }) {
            *k = nearest;
        }
    }
}

/// 以归属像素的均值更新中心. 没有归属像素的中心保持不变.
fn update_centers(img: &RgbImage, labels: &Array2<usize>, old: &[Center]) -> Vec<Center> {
    let mut sums = vec![[0.0f64; 5]; old.len()];
    let mut counts = vec![0u64; old.len()];
    for ((y, x), &k) in labels.indexed_iter() {
        let f = feature(img, y, x);
        for (s, v) in sums[k].iter_mut().zip(f) {
            *s += v;
        }
        counts[k] += 1;
    }
    sums.into_iter()
        .zip(counts)
        .zip(old.iter())
        .map(|((s, c), o)| if c == 0 { *o } else { s.map(|v| v / c as f64) })
        .collect()
}
