//! 带标签的宽特征表, 及其 CSV 读写.
//!
//! 表中每行对应一个样本, 依次为文件名列 `image`、标签列 `label`,
//! 然后是每个描述子的每一维特征 `<id>_<index>`.

use crate::consts::{IMAGE_COLUMN, LABEL_COLUMN};
use crate::dataset::alter_name;
use crate::Label;
use itertools::{izip, Itertools};
use ndarray::{concatenate, Array2, ArrayView1, ArrayView2, Axis};
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// 特征表.
///
/// 行序与输入样本顺序一致; 特征列按描述子顺序, 再按特征索引顺序排列.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureTable {
    filenames: Vec<String>,
    labels: Vec<Label>,
    columns: Vec<String>,

    /// `(行数, 特征列数)`.
    data: Array2<f64>,
}

/// 读取 CSV 特征表错误.
#[derive(Debug, thiserror::Error)]
pub enum ReadTableError {
    /// 底层 I/O 错误.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// 文件为空, 没有表头.
    #[error("missing header line")]
    MissingHeader,

    /// 表头的前两列不是 `image`, `label`.
    #[error("header must start with `image,label`, got `{0}`")]
    BadHeader(String),

    /// 某一行格式错误. 行号从 1 开始计 (表头为第 1 行).
    #[error("line {line}: {reason}")]
    Malformed {
        /// 行号.
        line: usize,
        /// 错误原因.
        reason: String,
    },
}

impl FeatureTable {
    /// 创建只有文件名列和标签列的表.
    ///
    /// `filenames` 与 `labels` 长度必须相同, 否则程序 panic.
    pub fn new(filenames: Vec<String>, labels: Vec<Label>) -> Self {
        assert_eq!(filenames.len(), labels.len(), "文件名与标签必须一一对应");
        let rows = filenames.len();
        Self {
            filenames,
            labels,
            columns: vec![],
            data: Array2::zeros((rows, 0)),
        }
    }

    /// 在表的右侧追加一组特征列.
    ///
    /// `block` 的形状必须为 `(self.n_rows(), columns.len())`, 否则程序 panic.
    pub fn append_columns(&mut self, columns: Vec<String>, block: Array2<f64>) {
        assert_eq!(block.nrows(), self.n_rows(), "行数不符");
        assert_eq!(block.ncols(), columns.len(), "列数不符");
        // 形状已经检查过, 不会生成 `Err`.
        self.data = concatenate(Axis(1), &[self.data.view(), block.view()]).unwrap();
        self.columns.extend(columns);
    }

    /// 行数, 即样本个数.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.filenames.len()
    }

    /// 特征列数 (不含文件名列和标签列).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// 总列数 (含文件名列和标签列).
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.n_features() + 2
    }

    /// 完整表头.
    pub fn header(&self) -> Vec<&str> {
        [IMAGE_COLUMN, LABEL_COLUMN]
            .into_iter()
            .chain(self.columns.iter().map(String::as_str))
            .collect()
    }

    /// 特征列名.
    #[inline]
    pub fn feature_columns(&self) -> &[String] {
        &self.columns
    }

    /// 文件名列.
    #[inline]
    pub fn filenames(&self) -> &[String] {
        &self.filenames
    }

    /// 标签列.
    #[inline]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// 全部特征值, 形状为 `(行数, 特征列数)`.
    #[inline]
    pub fn features(&self) -> ArrayView2<f64> {
        self.data.view()
    }

    /// 按列名获取一列特征. 不存在时返回 `None`.
    pub fn column(&self, name: &str) -> Option<ArrayView1<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.data.column(idx))
    }

    /// 获取第 `row` 行的特征. 越界时返回 `None`.
    pub fn row(&self, row: usize) -> Option<ArrayView1<f64>> {
        (row < self.n_rows()).then(|| self.data.row(row))
    }

    /// 获取第 `row` 行、列名为 `name` 的特征值.
    pub fn get(&self, row: usize, name: &str) -> Option<f64> {
        self.column(name)?.get(row).copied()
    }

    /// 对文件名列中的每一项应用 [`alter_name`], 只保留不含目录与扩展名的文件名.
    pub fn normalize_filenames(&mut self) {
        for f in self.filenames.iter_mut() {
            *f = alter_name(f.as_str());
        }
    }

    /// 以 CSV 格式写入 `w`. 不写行索引列.
    ///
    /// 特征值以 `f64` 的 `Display` 格式写出, 即能精确读回的最短表示:
    /// 整数值写作 `1` 而不是 `1.0`, 两种写法对 CSV 解析器是等价的.
    pub fn write_csv<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "{}", self.header().into_iter().map(escape).join(","))?;
        for (name, label, row) in izip!(&self.filenames, &self.labels, self.data.rows()) {
            write!(w, "{},{label}", escape(name))?;
            for v in row.iter() {
                write!(w, ",{v}")?;
            }
            writeln!(w)?;
        }
        w.flush()
    }

    /// 以 CSV 格式保存到 `path`. 已存在的文件会被直接覆盖.
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file))
    }

    /// 从 `path` 读取 CSV 特征表.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self, ReadTableError> {
        let file = File::open(path)?;
        Self::from_csv_reader(BufReader::new(file))
    }

    /// 从 `r` 读取 CSV 特征表.
    ///
    /// 空特征值读为 NaN. 不支持跨行的带引号字段.
    pub fn from_csv_reader<R: BufRead>(r: R) -> Result<Self, ReadTableError> {
        let mut lines = r.lines();
        let header = lines.next().ok_or(ReadTableError::MissingHeader)??;
        let header = split_record(header.trim_end_matches('\r')).map_err(|reason| {
            ReadTableError::Malformed { line: 1, reason }
        })?;
        if header.len() < 2 || header[0] != IMAGE_COLUMN || header[1] != LABEL_COLUMN {
            return Err(ReadTableError::BadHeader(header.join(",")));
        }
        let columns: Vec<String> = header[2..].to_vec();

        let mut filenames = vec![];
        let mut labels = vec![];
        let mut values = vec![];
        for (i, line) in lines.enumerate() {
            let line_no = i + 2;
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let malformed = |reason: String| ReadTableError::Malformed {
                line: line_no,
                reason,
            };

            let fields = split_record(line).map_err(malformed)?;
            if fields.len() != header.len() {
                return Err(malformed(format!(
                    "expected {} fields, got {}",
                    header.len(),
                    fields.len()
                )));
            }
            let mut it = fields.into_iter();
            // 字段个数已检查, 至少有两个.
            filenames.push(it.next().unwrap());
            let label = it.next().unwrap();
            labels.push(
                label
                    .trim()
                    .parse::<Label>()
                    .map_err(|e| malformed(format!("bad label `{label}`: {e}")))?,
            );
            for field in it {
                values.push(parse_value(&field).map_err(malformed)?);
            }
        }

        let data = Array2::from_shape_vec((filenames.len(), columns.len()), values)
            .map_err(|e| ReadTableError::Malformed {
                line: 0,
                reason: e.to_string(),
            })?;
        Ok(Self {
            filenames,
            labels,
            columns,
            data,
        })
    }
}

fn parse_value(field: &str) -> Result<f64, String> {
    let t = field.trim();
    if t.is_empty() {
        return Ok(f64::NAN);
    }
    t.parse::<f64>()
        .map_err(|e| format!("bad value `{field}`: {e}"))
}

/// 需要时给 CSV 字段加引号.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// 拆分单行 CSV 记录.
fn split_record(line: &str) -> Result<Vec<String>, String> {
    let mut fields = vec![];
    let mut cur = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match (quoted, ch) {
            (true, '"') if chars.peek() == Some(&'"') => {
                chars.next();
                cur.push('"');
            }
            (true, '"') => quoted = false,
            (true, c) => cur.push(c),
            (false, '"') if cur.is_empty() => quoted = true,
            (false, ',') => fields.push(std::mem::take(&mut cur)),
            (false, c) => cur.push(c),
        }
    }
    if quoted {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(cur);
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_table() -> FeatureTable {
        let mut t = FeatureTable::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec![0, 1, 0],
        );
        t.append_columns(
            vec!["d_0".to_string(), "d_1".to_string()],
            array![[0.5, 1.0], [2.25, -3.0], [0.1, 7.0]],
        );
        t
    }

    #[test]
    fn test_empty_feature_table() {
        let t = FeatureTable::new(vec!["x".to_string()], vec![1]);
        assert_eq!(t.n_rows(), 1);
        assert_eq!(t.n_columns(), 2);
        assert_eq!(t.header(), vec!["image", "label"]);
    }

    #[test]
    fn test_append_and_lookup() {
        let t = sample_table();
        assert_eq!(t.header(), vec!["image", "label", "d_0", "d_1"]);
        assert_eq!(t.get(1, "d_0"), Some(2.25));
        assert_eq!(t.get(2, "d_1"), Some(7.0));
        assert_eq!(t.get(3, "d_1"), None);
        assert_eq!(t.get(0, "e_0"), None);
        assert_eq!(t.row(0).unwrap().to_vec(), vec![0.5, 1.0]);
        assert!(t.row(3).is_none());
    }

    #[test]
    #[should_panic]
    fn test_append_wrong_rows() {
        let mut t = FeatureTable::new(vec!["a".to_string()], vec![0]);
        t.append_columns(vec!["d_0".to_string()], array![[1.0], [2.0]]);
    }

    #[test]
    fn test_write_csv() {
        let mut buf = Vec::new();
        sample_table().write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "image,label,d_0,d_1\na,0,0.5,1\nb,1,2.25,-3\nc,0,0.1,7\n"
        );
    }

    #[test]
    fn test_csv_reads_back() {
        let t = sample_table();
        let mut buf = Vec::new();
        t.write_csv(&mut buf).unwrap();
        let back = FeatureTable::from_csv_reader(buf.as_slice()).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_quoted_filenames() {
        let mut t = FeatureTable::new(vec!["a,\"b\"".to_string()], vec![1]);
        t.append_columns(vec!["d_0".to_string()], array![[1.5]]);
        let mut buf = Vec::new();
        t.write_csv(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf.clone()).unwrap(),
            "image,label,d_0\n\"a,\"\"b\"\"\",1,1.5\n"
        );
        let back = FeatureTable::from_csv_reader(buf.as_slice()).unwrap();
        assert_eq!(back.filenames()[0], "a,\"b\"");
    }

    #[test]
    fn test_read_csv_errors() {
        assert!(matches!(
            FeatureTable::from_csv_reader("".as_bytes()),
            Err(ReadTableError::MissingHeader)
        ));
        assert!(matches!(
            FeatureTable::from_csv_reader("file,label\n".as_bytes()),
            Err(ReadTableError::BadHeader(_))
        ));
        assert!(matches!(
            FeatureTable::from_csv_reader("image,label,d_0\na,0\n".as_bytes()),
            Err(ReadTableError::Malformed { line: 2, .. })
        ));
        assert!(matches!(
            FeatureTable::from_csv_reader("image,label\na,x\n".as_bytes()),
            Err(ReadTableError::Malformed { line: 2, .. })
        ));
        assert!(matches!(
            FeatureTable::from_csv_reader("image,label\n\"a,0\n".as_bytes()),
            Err(ReadTableError::Malformed { line: 2, .. })
        ));
    }

    #[test]
    fn test_read_csv_empty_value_is_nan() {
        let t = FeatureTable::from_csv_reader("image,label,d_0\r\na,1,\r\n".as_bytes()).unwrap();
        assert!(t.get(0, "d_0").unwrap().is_nan());
    }

    #[test]
    fn test_normalize_filenames() {
        let mut t = FeatureTable::new(
            vec![
                "C:\\data\\SOB_B_A-14-22549AB-40-001.png".to_string(),
                "data/benign/SOB_M_DC-14-2523-40-010.png".to_string(),
                "plain".to_string(),
            ],
            vec![0, 1, 1],
        );
        t.normalize_filenames();
        assert_eq!(
            t.filenames(),
            &["SOB_B_A-14-22549AB-40-001", "SOB_M_DC-14-2523-40-010", "plain"]
        );
    }
}
