//! PromptScore - 医疗提示词评分命令行
//!
//! 用法示例:
//! - `promptscore evaluate "Explain first-line therapy for hypertension"`
//! - `promptscore --json evaluate --example`
//! - `promptscore history show 0`
//! - `promptscore --offline evaluate "..."`（使用内置的模拟评分服务）

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use promptscore::application::ports::{
    EvaluationViewPort, GradingServicePort, KeyValueStorePort,
};
use promptscore::application::{EvaluationReport, EvaluationSession, ImproveReport};
use promptscore::config::{load_config_from_path, print_config, AppConfig};
use promptscore::domain::history::Theme;
use promptscore::domain::prompt::EXAMPLE_PROMPT;
use promptscore::infrastructure::adapters::{FakeGradingClient, HttpGradingClient};
use promptscore::infrastructure::events::EventPublisher;
use promptscore::infrastructure::memory::InMemoryKeyValueStore;
use promptscore::infrastructure::persistence::sled::{SledKeyValueStore, SledStoreConfig};
use promptscore::infrastructure::view::ConsoleView;

#[derive(Parser, Debug)]
#[command(
    name = "promptscore",
    version,
    about = "Grade medical prompts against a five-criterion safety rubric"
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit view events as JSON lines instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Use a simulated grading service and an in-memory store
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a prompt for grading and wait for the result
    Evaluate {
        /// Prompt text (words are joined with spaces)
        #[arg(required_unless_present = "example")]
        prompt: Vec<String>,

        /// Evaluate the built-in example prompt
        #[arg(long)]
        example: bool,
    },
    /// Ask the service for a clearer rewrite of a prompt
    Improve {
        #[arg(required = true)]
        prompt: Vec<String>,
    },
    /// Show or manage recent evaluations
    History {
        #[command(subcommand)]
        cmd: Option<HistoryCmd>,
    },
    /// Show or change the theme preference
    Theme {
        #[command(subcommand)]
        cmd: Option<ThemeCmd>,
    },
    /// Check whether the grading service is reachable
    Health,
}

#[derive(Subcommand, Debug)]
enum HistoryCmd {
    List,
    /// Print the prompt stored at the given position (0 = most recent)
    Show { index: usize },
    Clear,
}

#[derive(Subcommand, Debug)]
enum ThemeCmd {
    Show,
    Dark,
    Light,
    Toggle,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config_from_path(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 日志输出到 stderr，stdout 只保留渲染结果
    let log_filter = format!("{},promptscore={}", config.log.level, config.log.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    print_config(&config);

    let service = build_service(&config, cli.offline)?;
    let store = build_store(&config, cli.offline)?;
    let (view, printer) = build_view(cli.json);

    let mut session = EvaluationSession::new(
        service,
        view.clone(),
        store,
        config.session_config(),
    );

    let code = run(cli.cmd, &mut session, view.as_ref()).await?;

    // 关闭事件通道，等待 JSON 输出写完
    drop(session);
    drop(view);
    if let Some(printer) = printer {
        printer.await?;
    }

    Ok(code)
}

async fn run(
    cmd: Command,
    session: &mut EvaluationSession,
    view: &dyn EvaluationViewPort,
) -> anyhow::Result<ExitCode> {
    match cmd {
        Command::Evaluate { prompt, example } => {
            let text = if example {
                EXAMPLE_PROMPT.to_string()
            } else {
                prompt.join(" ")
            };
            session.draft_mut().set_text(&text);

            match session.evaluate(&text).await {
                EvaluationReport::Accepted { .. } => Ok(ExitCode::SUCCESS),
                EvaluationReport::Rejected(_) | EvaluationReport::Invalid(_) => {
                    Ok(ExitCode::from(2))
                }
            }
        }
        Command::Improve { prompt } => match session.improve_prompt(&prompt.join(" ")).await {
            ImproveReport::Improved(_) => Ok(ExitCode::SUCCESS),
            ImproveReport::Unchanged => {
                view.alert("Could not improve the prompt. The original prompt was kept.");
                Ok(ExitCode::from(2))
            }
            ImproveReport::Invalid(_) => Ok(ExitCode::from(2)),
        },
        Command::History { cmd } => {
            match cmd.unwrap_or(HistoryCmd::List) {
                HistoryCmd::List => view.render_history(session.history()),
                HistoryCmd::Show { index } => {
                    let prompt = session.load_history(index)?;
                    println!("{}", prompt);
                }
                HistoryCmd::Clear => session.clear_history()?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Theme { cmd } => {
            match cmd.unwrap_or(ThemeCmd::Show) {
                ThemeCmd::Show => view.render_theme(session.theme()),
                ThemeCmd::Dark => session.set_theme(Theme::Dark)?,
                ThemeCmd::Light => session.set_theme(Theme::Light)?,
                ThemeCmd::Toggle => {
                    session.toggle_theme()?;
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Health => {
            if session.health_check().await {
                println!("Grading service is reachable");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("Grading service is unreachable");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn build_service(config: &AppConfig, offline: bool) -> anyhow::Result<Arc<dyn GradingServicePort>> {
    if offline {
        tracing::warn!("Running offline with a simulated grading service");
        return Ok(Arc::new(FakeGradingClient::demo()));
    }
    Ok(Arc::new(HttpGradingClient::new(config.service.client_config())?))
}

fn build_store(config: &AppConfig, offline: bool) -> anyhow::Result<Arc<dyn KeyValueStorePort>> {
    if offline {
        return Ok(Arc::new(InMemoryKeyValueStore::new()));
    }

    if let Some(parent) = std::path::Path::new(&config.history.db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = SledKeyValueStore::new(&SledStoreConfig {
        db_path: config.history.db_path.clone(),
    })?;
    Ok(Arc::new(store))
}

fn build_view(json: bool) -> (Arc<dyn EvaluationViewPort>, Option<JoinHandle<()>>) {
    if !json {
        return (Arc::new(ConsoleView::new()), None);
    }

    let publisher = Arc::new(EventPublisher::new());
    let mut events = publisher.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => tracing::warn!(error = %e, "Failed to encode view event"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped = skipped, "View events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    (publisher, Some(printer))
}
