//! 在 BreaKHis 二分类数据集上运行默认描述子集合, 导出 CSV 特征表
//! (以及可选的超像素派生图像).

mod report;
mod runner;

use log::LevelFilter;
use simple_logger::SimpleLogger;

fn main() {
    // 可以用 `RUST_LOG=debug` 打开逐样本进度.
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
        .expect("Logger initialization error");

    match runner::run() {
        Ok(report) => report.analyze(),
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}
