use anyhow::Result;
use exam_grader::utils::logging::init_log_file;
use exam_grader::{logger, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志
    init_log_file(&config.output_log_file)?;
    logger::init(config.verbose_logging, &config.output_log_file)?;

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
