//! 图像型特征导出.

use super::{io_error, ExtractError, ExtractResult};
use crate::consts::{class_name, IMAGE_EXTENSION};
use crate::descriptor::{DescribeImage, DescriptorMeta};
use crate::{Label, Sample};
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};

/// 对每个样本运行图像型描述子, 收集派生图像.
///
/// 若 `save` 为 `true`, 每幅派生图像在计算后立即写入 [`image_like_path`]
/// 给出的 PNG 文件 (不存在的目录会被创建, 已存在的文件会被直接覆盖).
/// 返回输入文件名的副本和按样本顺序排列的派生图像.
///
/// `samples` 不能为空, 否则返回 [`ExtractError::EmptySamples`].
pub fn extract_image_like<P: AsRef<Path>>(
    samples: &[Sample],
    descriptor: &dyn DescribeImage,
    save: bool,
    feature_dir: P,
) -> ExtractResult<(Vec<String>, Vec<RgbImage>)> {
    if samples.is_empty() {
        return Err(ExtractError::EmptySamples);
    }

    let meta = descriptor.meta();
    let n = samples.len();
    let base = feature_dir.as_ref();
    log::info!("running image-like {meta} over {n} samples");

    let mut filenames = Vec::with_capacity(n);
    let mut images = Vec::with_capacity(n);
    for (i, sample) in samples.iter().enumerate() {
        log::debug!("{}: {}/{n} `{}`", meta.id(), i + 1, sample.filename);

        let derived = descriptor
            .describe_image(&sample.image)
            .map_err(|source| ExtractError::Describe {
                descriptor: meta.id().to_string(),
                filename: sample.filename.clone(),
                source,
            })?;

        if save {
            let path = image_like_path(base, meta, sample.label, &sample.filename);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(io_error(parent.to_path_buf()))?;
            }
            derived
                .save(&path)
                .map_err(|source| ExtractError::Image {
                    path: path.clone(),
                    source,
                })?;
        }

        filenames.push(sample.filename.clone());
        images.push(derived);
    }

    if save {
        log::info!(
            "saved {n} derived images under `{}`",
            base.join(meta.id()).display()
        );
    }
    Ok((filenames, images))
}

/// 派生图像的持久化路径: `<feature_dir>/<id>/<benign|malignant>/<filename>.png`.
pub fn image_like_path<P: AsRef<Path>>(
    feature_dir: P,
    meta: &DescriptorMeta,
    label: Label,
    filename: &str,
) -> PathBuf {
    let mut ans = feature_dir.as_ref().join(meta.id());
    ans.push(class_name(label));
    ans.push(format!("{filename}.{IMAGE_EXTENSION}"));
    ans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DescribeError, DescribeResult, SlicMean};
    use image::Rgb;

    /// 反色.
    struct Invert(DescriptorMeta);

    impl DescribeImage for Invert {
        fn meta(&self) -> &DescriptorMeta {
            &self.0
        }

        fn describe_image(&self, img: &RgbImage) -> DescribeResult<RgbImage> {
            let mut out = img.clone();
            image::imageops::invert(&mut out);
            Ok(out)
        }
    }

    /// 总是失败.
    struct Broken(DescriptorMeta);

    impl DescribeImage for Broken {
        fn meta(&self) -> &DescriptorMeta {
            &self.0
        }

        fn describe_image(&self, _: &RgbImage) -> DescribeResult<RgbImage> {
            Err(DescribeError::Other("broken".to_string()))
        }
    }

    fn invert() -> Invert {
        Invert(DescriptorMeta::new("invert", "invert").unwrap())
    }

    fn two_samples() -> Vec<Sample> {
        vec![
            Sample::new(RgbImage::from_pixel(3, 2, Rgb([10, 20, 30])), 0, "x"),
            Sample::new(RgbImage::from_pixel(3, 2, Rgb([200, 100, 0])), 1, "y"),
        ]
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("histo-berry-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_image_like_path() {
        let m = DescriptorMeta::new("slic-n100-c10-i10", "SLIC").unwrap();
        assert_eq!(
            image_like_path("out", &m, 0, "SOB_B_A-1"),
            PathBuf::from("out/slic-n100-c10-i10/benign/SOB_B_A-1.png")
        );
        assert_eq!(
            image_like_path("out", &m, 3, "z"),
            PathBuf::from("out/slic-n100-c10-i10/malignant/z.png")
        );
    }

    #[test]
    fn test_image_like_in_memory() {
        let dir = scratch_dir("image-like-mem");
        let (names, images) = extract_image_like(&two_samples(), &invert(), false, &dir).unwrap();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(images.len(), 2);
        assert_eq!(*images[0].get_pixel(0, 0), Rgb([245, 235, 225]));
        assert_eq!(*images[1].get_pixel(2, 1), Rgb([55, 155, 255]));
        assert!(!dir.exists());
    }

    #[test]
    fn test_image_like_persist_by_class() {
        let dir = scratch_dir("image-like-save");
        let d = invert();
        let (_, images) = extract_image_like(&two_samples(), &d, true, &dir).unwrap();

        let benign = dir.join("invert").join("benign").join("x.png");
        let malignant = dir.join("invert").join("malignant").join("y.png");
        assert!(benign.is_file());
        assert!(malignant.is_file());
        assert!(!dir.join("invert").join("benign").join("y.png").exists());

        let back = image::open(&malignant).unwrap().into_rgb8();
        assert_eq!(back, images[1]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_image_like_with_slic() {
        let slic = SlicMean::new(4, 10.0, 3).unwrap();
        let (_, images) = extract_image_like(&two_samples(), &slic, false, "unused").unwrap();
        // 纯色图像的超像素均值仍是原图.
        assert_eq!(images[0], two_samples()[0].image);
    }

    #[test]
    fn test_image_like_errors() {
        assert!(matches!(
            extract_image_like(&[], &invert(), false, "unused"),
            Err(ExtractError::EmptySamples)
        ));

        let broken = Broken(DescriptorMeta::new("broken", "broken").unwrap());
        assert!(matches!(
            extract_image_like(&two_samples(), &broken, false, "unused"),
            Err(ExtractError::Describe { .. })
        ));
    }
}
