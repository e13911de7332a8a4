/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 命令行入口：`mnist_dcgan train` 训练（可断点续训），不带参数则从最近的检查点生成样本
 */

use clap::Parser;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

use mnist_dcgan::app;
use mnist_dcgan::train::{RunMode, TrainingConfig};

#[derive(Parser)]
#[command(name = "mnist_dcgan", about = "在 MNIST 上训练 DCGAN 并导出样本图与动图", long_about = None)]
struct Cli {
    /// 运行模式：只有一个参数且恰好为 train 时训练，其余情况均为推理
    #[arg(value_name = "MODE", trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("日志初始化失败");
    }

    let cli = Cli::parse();
    let mode = RunMode::from_args(&cli.args);
    if let Err(e) = app::run(mode, TrainingConfig::default()) {
        error!("运行失败: {e}");
        std::process::exit(1);
    }
}
