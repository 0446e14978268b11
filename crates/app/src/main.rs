use std::fmt;
use std::sync::Arc;

use client::{ClientConfig, HttpCourseApi};
use course_core::model::{ChapterId, CourseId};
use course_core::route::{ChapterTab, CourseRoute};
use sync::{CourseSyncController, SidebarTree, SyncConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCourseId { raw: String },
    InvalidChapterId { raw: String },
    MissingCourseId,
    MissingBaseUrl,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCourseId { raw } => write!(f, "invalid --course value: {raw}"),
            ArgsError::InvalidChapterId { raw } => write!(f, "invalid --chapter value: {raw}"),
            ArgsError::MissingCourseId => write!(f, "--course (or COURSE_ID) is required"),
            ArgsError::MissingBaseUrl => {
                write!(f, "--base-url (or COURSE_API_BASE_URL) is required")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- watch --course <id> [--base-url <url>] [--token <token>]");
    eprintln!("  cargo run -p app -- show  --course <id> [--base-url <url>] [--token <token>]");
    eprintln!();
    eprintln!("watch re-renders the course tree as generation progresses and runs");
    eprintln!("until every poll has settled (or Ctrl-C). show prints once and exits.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --chapter <id>   mark a chapter as the active one");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COURSE_API_BASE_URL, COURSE_API_TOKEN, COURSE_ID");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Watch,
    Show,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "watch" => Some(Self::Watch),
            "show" => Some(Self::Show),
            _ => None,
        }
    }
}

struct Args {
    course_id: CourseId,
    chapter_id: Option<ChapterId>,
    base_url: String,
    token: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut course_id = std::env::var("COURSE_ID")
            .ok()
            .and_then(|value| value.parse::<CourseId>().ok());
        let mut chapter_id = None;
        let mut base_url = std::env::var("COURSE_API_BASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let mut token = std::env::var("COURSE_API_TOKEN")
            .ok()
            .filter(|value| !value.trim().is_empty());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--course" => {
                    let value = require_value(args, "--course")?;
                    course_id = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidCourseId { raw: value.clone() })?,
                    );
                }
                "--chapter" => {
                    let value = require_value(args, "--chapter")?;
                    chapter_id = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidChapterId { raw: value.clone() })?,
                    );
                }
                "--base-url" => {
                    base_url = Some(require_value(args, "--base-url")?);
                }
                "--token" => {
                    token = Some(require_value(args, "--token")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            course_id: course_id.ok_or(ArgsError::MissingCourseId)?,
            chapter_id,
            base_url: base_url.ok_or(ArgsError::MissingBaseUrl)?,
            token,
        })
    }
}

/// Render the projected sidebar tree for the terminal.
fn render(tree: &SidebarTree) -> String {
    let mut out = String::new();
    let title = tree.title.as_deref().unwrap_or("Course Overview");
    out.push_str(&format!(
        "Course {} — {title} [{}]{}\n",
        tree.course_id,
        tree.status,
        if tree.degraded { " (status updates lost)" } else { "" }
    ));
    for node in &tree.chapters {
        let check = if node.is_completed { "x" } else { " " };
        let marker = if node.is_active { ">" } else { " " };
        out.push_str(&format!(
            "{marker}[{check}] {}. {}{}\n",
            node.ordinal,
            node.caption,
            if node.degraded { " (quiz updates lost)" } else { "" }
        ));
        if node.is_expanded {
            for tab in &node.tabs {
                let active = if tab.is_active { " *" } else { "" };
                out.push_str(&format!("      - {}{active}\n", tab.tab));
            }
        }
    }
    out
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Watch,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Watch,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut config = ClientConfig::new(args.base_url.clone());
    if let Some(token) = args.token.clone() {
        config = config.with_token(token);
    }
    let api = Arc::new(HttpCourseApi::new(config));

    let controller = CourseSyncController::new(api, SyncConfig::default());
    controller.load(args.course_id).await?;
    if let Some(chapter_id) = args.chapter_id {
        controller.route_changed(&CourseRoute::chapter(
            args.course_id,
            chapter_id,
            ChapterTab::Content,
        ));
    }

    let mut changes = controller.changes();
    if let Some(tree) = controller.sidebar() {
        print!("{}", render(&tree));
    }

    if cmd == Command::Show || controller.active_poll_count() == 0 {
        controller.shutdown();
        return Ok(());
    }

    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(tree) = controller.sidebar() {
                    println!();
                    print!("{}", render(&tree));
                }
                if controller.active_poll_count() == 0 {
                    tracing::info!("all polls settled, exiting");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    controller.shutdown();
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
