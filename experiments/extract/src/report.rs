//! 运行结果.

use histo_berry::consts::Magnification;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

const S4: &str = "    ";

/// 图像型导出结果.
#[derive(Debug, Clone)]
pub struct ImageLikeReport {
    /// 描述子 id.
    pub id: String,
    /// 输出目录.
    pub dir: PathBuf,
    /// 写出的图像个数.
    pub images: usize,
    /// 耗时.
    pub elapsed: Duration,
}

/// 特征提取最终结果.
#[derive(Debug, Clone)]
pub struct ExtractReport {
    pub mf: Magnification,
    pub benign: usize,
    pub malignant: usize,

    /// `(描述子 id, 特征维度)`, 按列序排列.
    pub descriptors: Vec<(String, usize)>,
    pub table_path: PathBuf,

    /// `(行数, 列数)`, 列数包含 `image` 和 `label`.
    pub table_shape: (usize, usize),
    pub elapsed: Duration,
    pub image_like: Option<ImageLikeReport>,
}

impl ExtractReport {
    /// 将结果写进 `w` 中.
    pub fn describe_into<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let total = self.benign + self.malignant;
        writeln!(w, "Feature extraction at {}:", self.mf)?;
        writeln!(
            w,
            "{S4}Samples: {total} ({} benign, {} malignant)",
            self.benign, self.malignant
        )?;
        for (id, arity) in self.descriptors.iter() {
            writeln!(w, "{S4}Descriptor `{id}`: {arity} features")?;
        }
        let (rows, cols) = self.table_shape;
        writeln!(w, "{S4}Table: {rows} rows x {cols} columns")?;
        writeln!(w, "{S4}Saved to: {}", self.table_path.display())?;
        writeln!(w, "{S4}Total time: {} ms", self.elapsed.as_millis())?;
        write!(
            w,
            "{S4}Average time: {} per image",
            average_us(self.elapsed, total)
        )?;

        if let Some(r) = self.image_like.as_ref() {
            writeln!(w)?;
            writeln!(w, "Image-like export `{}`:", r.id)?;
            writeln!(w, "{S4}Images written: {}", r.images)?;
            writeln!(w, "{S4}Saved under: {}", r.dir.join(&r.id).display())?;
            write!(
                w,
                "{S4}Average time: {} per image",
                average_us(r.elapsed, r.images)
            )?;
        }
        Ok(())
    }

    /// 打印运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(512);
        match self.describe_into(&mut buf) {
            Ok(()) => println!("{}", String::from_utf8_lossy(&buf)),
            Err(e) => log::error!("failed to format report: {e}"),
        }
        utils::sep();
    }
}

#[inline]
fn average_us(d: Duration, n: usize) -> String {
    match n {
        0 => "/".to_string(),
        n => format!("{:.3} us", d.as_micros() as f64 / n as f64),
    }
}
