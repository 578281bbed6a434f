//! BreaKHis 二分类数据集加载器.
//!
//! 数据集的目录结构为
//! `<root>/{benign,malignant}/<SOB>/<tumor type>/<slide>/<mf>/<filename>.png`.

use super::{alter_name, DatasetError, DatasetResult};
use crate::consts::{
    Magnification, BENIGN, BENIGN_NAME, DEFAULT_IMAGE_SIZE, IMAGE_EXTENSION, MALIGNANT,
    MALIGNANT_NAME,
};
use crate::{Label, Sample};
use image::imageops::FilterType;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 类别目录到图像文件的深度.
const CLASS_TO_IMAGE_DEPTH: usize = 5;

/// 获取 `root` 下放大倍数为 `mf` 的良性和恶性图像路径, 分别按路径排序.
///
/// 符号链接 (目录或文件) 会被跟随. 不存在的类别目录视为空.
pub fn binary_paths<P: AsRef<Path>>(
    root: P,
    mf: Magnification,
) -> DatasetResult<(Vec<PathBuf>, Vec<PathBuf>)> {
    let root = root.as_ref();
    Ok((
        class_paths(&root.join(BENIGN_NAME), mf)?,
        class_paths(&root.join(MALIGNANT_NAME), mf)?,
    ))
}

fn class_paths(dir: &Path, mf: Magnification) -> DatasetResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        log::warn!("class directory `{}` does not exist", dir.display());
        return Ok(vec![]);
    }

    let mut ans = vec![];
    for entry in WalkDir::new(dir)
        .min_depth(CLASS_TO_IMAGE_DEPTH)
        .max_depth(CLASS_TO_IMAGE_DEPTH)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        let in_mf = path
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|d| d == mf.as_str());
        if entry.file_type().is_file() && in_mf && is_png(path) {
            ans.push(path.to_path_buf());
        }
    }
    Ok(ans)
}

#[inline]
fn is_png(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == IMAGE_EXTENSION)
}

/// 读取 `paths` 中所有 `.png` 图像 (其它文件被跳过), 统一转为 RGB 并缩放到
/// `imsize` (`(宽, 高)`, 缺省为 [`DEFAULT_IMAGE_SIZE`]), 标注为 `label`.
///
/// 任何一个图像解码失败都会使整个读取失败. 开启 `rayon` feature 时并行解码,
/// 但输出顺序始终与 `paths` 一致.
pub fn read_images<P: AsRef<Path>>(
    paths: &[P],
    label: Label,
    imsize: Option<(u32, u32)>,
) -> DatasetResult<Vec<Sample>> {
    let (w, h) = imsize.unwrap_or(DEFAULT_IMAGE_SIZE);
    let pngs: Vec<&Path> = paths
        .iter()
        .map(|p| p.as_ref())
        .filter(|p| is_png(p))
        .collect();
    let ans = decode_all(&pngs, label, w, h)?;

    log::info!("read {} images labeled {label}", ans.len());
    Ok(ans)
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        fn decode_all(paths: &[&Path], label: Label, w: u32, h: u32) -> DatasetResult<Vec<Sample>> {
            use rayon::prelude::*;
            paths
                .par_iter()
                .map(|p| load_sample(p, label, w, h))
                .collect()
        }
    } else {
        fn decode_all(paths: &[&Path], label: Label, w: u32, h: u32) -> DatasetResult<Vec<Sample>> {
            paths.iter().map(|p| load_sample(p, label, w, h)).collect()
        }
    }
}

fn load_sample(path: &Path, label: Label, w: u32, h: u32) -> DatasetResult<Sample> {
    log::debug!("decoding `{}`", path.display());
    let img = image::open(path)
        .map_err(|source| DatasetError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .into_rgb8();
    let img = if img.dimensions() == (w, h) {
        img
    } else {
        image::imageops::resize(&img, w, h, FilterType::Triangle)
    };
    Ok(Sample::new(img, label, alter_name(path.to_string_lossy())))
}

/// 读取 `root` 下放大倍数为 `mf` 的二分类数据集.
///
/// 返回的样本中, 良性样本 (标签 [`BENIGN`]) 在前, 恶性样本 (标签 [`MALIGNANT`]) 在后.
pub fn read_data<P: AsRef<Path>>(
    root: P,
    mf: Magnification,
    imsize: Option<(u32, u32)>,
) -> DatasetResult<Vec<Sample>> {
    let (benign, malignant) = binary_paths(root, mf)?;
    log::info!(
        "found {} benign and {} malignant images at {mf}",
        benign.len(),
        malignant.len()
    );
    let mut ans = read_images(&benign, BENIGN, imsize)?;
    ans.extend(read_images(&malignant, MALIGNANT, imsize)?);
    Ok(ans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs;

    /// 在系统临时目录下创建一个空的测试目录.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("histo-berry-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn put_image(root: &Path, class: &str, mf: &str, name: &str, color: [u8; 3]) -> PathBuf {
        let dir = root.join(class).join("SOB").join("type").join("slide-1").join(mf);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        RgbImage::from_pixel(8, 6, Rgb(color)).save(&path).unwrap();
        path
    }

    #[test]
    fn test_binary_paths_filters_mf_and_extension() {
        let root = scratch_dir("paths");
        put_image(&root, "benign", "40X", "b2.png", [1, 2, 3]);
        put_image(&root, "benign", "40X", "b1.png", [1, 2, 3]);
        put_image(&root, "benign", "100X", "b3.png", [1, 2, 3]);
        put_image(&root, "malignant", "40X", "m1.png", [1, 2, 3]);
        fs::write(root.join("malignant/SOB/type/slide-1/40X/notes.txt"), "x").unwrap();

        let (b, m) = binary_paths(&root, Magnification::X40).unwrap();
        let names: Vec<String> = b.iter().map(alter_name_of).collect();
        assert_eq!(names, vec!["b1", "b2"]);
        assert_eq!(m.len(), 1);

        let (b, m) = binary_paths(&root, Magnification::X400).unwrap();
        assert!(b.is_empty() && m.is_empty());

        fs::remove_dir_all(&root).unwrap();
    }

    fn alter_name_of(p: &PathBuf) -> String {
        alter_name(p.to_string_lossy())
    }

    #[cfg(unix)]
    #[test]
    fn test_binary_paths_follows_symlinks() {
        use std::os::unix::fs::symlink;

        let store = scratch_dir("symlink-store");
        let real = store.join("real.png");
        RgbImage::from_pixel(8, 6, Rgb([9, 9, 9])).save(&real).unwrap();
        let real_slide = store.join("slide-2");
        fs::create_dir_all(real_slide.join("40X")).unwrap();
        RgbImage::from_pixel(8, 6, Rgb([9, 9, 9]))
            .save(real_slide.join("40X").join("b2.png"))
            .unwrap();

        let root = scratch_dir("symlink");
        // 链接到文件.
        let mf_dir = root.join("benign/SOB/type/slide-1/40X");
        fs::create_dir_all(&mf_dir).unwrap();
        symlink(&real, mf_dir.join("b1.png")).unwrap();
        // 链接到目录.
        symlink(&real_slide, root.join("benign/SOB/type/slide-2")).unwrap();

        let (b, m) = binary_paths(&root, Magnification::X40).unwrap();
        let names: Vec<String> = b.iter().map(alter_name_of).collect();
        assert_eq!(names, vec!["b1", "b2"]);
        assert!(m.is_empty());

        let samples = read_images(&b, BENIGN, Some((4, 3))).unwrap();
        assert_eq!(samples.len(), 2);

        fs::remove_dir_all(&root).unwrap();
        fs::remove_dir_all(&store).unwrap();
    }

    #[test]
    fn test_missing_class_dir_is_empty() {
        let root = scratch_dir("missing");
        let (b, m) = binary_paths(&root, Magnification::X40).unwrap();
        assert!(b.is_empty() && m.is_empty());
        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_read_data() {
        let root = scratch_dir("read");
        put_image(&root, "malignant", "40X", "m1.png", [200, 0, 0]);
        put_image(&root, "benign", "40X", "b1.png", [0, 200, 0]);
        put_image(&root, "benign", "40X", "b2.png", [0, 0, 200]);

        let samples = read_data(&root, Magnification::X40, Some((4, 3))).unwrap();
        let summary: Vec<(&str, Label)> = samples
            .iter()
            .map(|s| (s.filename.as_str(), s.label))
            .collect();
        assert_eq!(summary, vec![("b1", 0), ("b2", 0), ("m1", 1)]);
        for s in samples.iter() {
            assert_eq!(s.image.dimensions(), (4, 3));
        }
        assert_eq!(*samples[2].image.get_pixel(0, 0), Rgb([200, 0, 0]));

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_read_images_default_size_and_skip() {
        let root = scratch_dir("default-size");
        let p = put_image(&root, "benign", "40X", "b1.png", [5, 5, 5]);
        let txt = root.join("skip.txt");
        fs::write(&txt, "not an image").unwrap();

        let samples = read_images(&[p, txt], BENIGN, None).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].image.dimensions(), DEFAULT_IMAGE_SIZE);

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_read_images_decode_error() {
        let root = scratch_dir("corrupt");
        let bad = root.join("bad.png");
        fs::write(&bad, b"definitely not a png").unwrap();
        assert!(matches!(
            read_images(&[bad], MALIGNANT, None),
            Err(DatasetError::Decode { .. })
        ));
        fs::remove_dir_all(&root).unwrap();
    }
}
