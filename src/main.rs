use anyhow::Result;
use exam_hint_viewer::config::Config;
use exam_hint_viewer::server;
use exam_hint_viewer::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config);

    // 启动代理服务
    server::run(&config).await?;

    Ok(())
}
