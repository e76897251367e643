/*
 * @Description  : 命令行入口：在 CIFAR-10 训练集上训练 DCGAN
 *
 * 若当前目录存在`dcgan.json`则从中读取配置（缺失字段取默认值），否则使用默认配置。
 * 日志级别由环境变量`RUST_LOG`控制，默认`info`。
 */

use std::path::Path;

use only_dcgan::data::{Cifar10Dataset, DataLoader};
use only_dcgan::errors::GanError;
use only_dcgan::gan::{TrainConfig, Trainer};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = "dcgan.json";

fn main() -> Result<(), GanError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = if Path::new(CONFIG_FILE).exists() {
        info!("从 {CONFIG_FILE} 读取配置");
        TrainConfig::from_json_file(CONFIG_FILE)?
    } else {
        TrainConfig::default()
    };
    config.validate()?;

    let dataset = Cifar10Dataset::load(Some(&config.data_root), true, config.download)?;
    let mut loader = DataLoader::new(dataset, config.batch_size).shuffle(config.shuffle);
    if let Some(seed) = config.seed {
        loader = loader.seed(seed);
    }

    let mut trainer = Trainer::new(config);
    trainer.fit(&loader)?;
    info!("训练结束，样本图位于 {}", trainer.config().results_dir);
    Ok(())
}
