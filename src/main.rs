use clap::Parser;
use dotenv::dotenv;
use human_panic::setup_panic;
use tracing::{debug, error, warn};

use rust_coursetask_next::config::AppConfig;
use rust_coursetask_next::errors::{CourseTaskError, Result};
use rust_coursetask_next::runtime::lifetime;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    dotenv().ok();

    // 记录程序启动时间
    let start_datetime = chrono::Utc::now();

    setup_panic!();
    let cli = Cli::parse();

    // 初始化配置
    if let Err(e) = AppConfig::init() {
        eprintln!("Failed to initialize configuration: {e}");
        std::process::exit(1);
    }
    let config = AppConfig::get();

    // 初始化日志
    let stdout_log = std::io::stdout();
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(stdout_log);
    let filter = tracing_subscriber::EnvFilter::new(&config.app.log_level);
    let tracing_format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_ansi(true);

    let tracing_builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking_writer)
        .event_format(tracing_format);

    if config.is_development() {
        tracing_builder
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        tracing_builder.json().init();
    }

    warn!(
        "Starting {} {} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.app.system_name
    );

    let result = run(cli.command).await;

    debug!(
        "Command completed in {} ms",
        chrono::Utc::now()
            .signed_duration_since(start_datetime)
            .num_milliseconds()
    );

    if let Err(e) = result {
        #[cfg(debug_assertions)]
        error!("{}", e.format_colored());
        #[cfg(not(debug_assertions))]
        error!("{}", e.format_simple());
        drop(_guard);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::RubricRender { file } => {
            let rubric = std::fs::read_to_string(&file)?;
            let engine = lifetime::startup::prepare_rubric_engine();
            let rendered = engine.render_rubric(rubric.as_str())?;
            println!("{}", serde_json::to_string_pretty(&rendered)?);
        }
        Commands::RubricCheck {
            file,
            location,
            expected_max_score,
        } => {
            let rubric = std::fs::read_to_string(&file)?;
            let engine = lifetime::startup::prepare_rubric_engine();
            engine.check_rubric(&rubric, &location, expected_max_score)?;
            println!("Rubric for {location} is valid (max score {expected_max_score})");
        }
        Commands::TaskStatus { entry_id } => {
            let startup = lifetime::startup::prepare_worker_startup().await?;
            let task = startup
                .storage
                .get_course_task_by_id(entry_id)
                .await?
                .ok_or_else(|| CourseTaskError::not_found(format!("任务记录 {entry_id} 不存在")))?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
    }
    Ok(())
}
