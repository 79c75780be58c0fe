use std::fmt;
use std::sync::Arc;

use qbank_core::model::CourseId;
use services::MediaTransferService;
use storage::repository::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingCourseId { flag: &'static str },
    InvalidCourseId { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingCourseId { flag } => write!(f, "{flag} is required"),
            ArgsError::InvalidCourseId { flag, raw } => {
                write!(f, "invalid {flag} value: {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

fn parse_course_id(flag: &'static str, raw: String) -> Result<CourseId, ArgsError> {
    raw.parse()
        .map_err(|_| ArgsError::InvalidCourseId { flag, raw })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    db_url: String,
    source: CourseId,
    destination: CourseId,
}

impl Args {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut args = args;
        let mut db_url =
            std::env::var("QBANK_DB_URL").unwrap_or_else(|_| "sqlite:lms.sqlite3".into());
        let mut source: Option<CourseId> = None;
        let mut destination: Option<CourseId> = None;

        while let Some(arg) = args.next() {
            // Flags accept both `--flag value` and `--flag=value`.
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
                None => (arg, None),
            };
            let mut value_for = |flag: &'static str| match inline.clone() {
                Some(value) => Ok(value),
                None => require_value(&mut args, flag),
            };
            match flag.as_str() {
                "--sourcecourseid" | "-src" => {
                    let value = value_for("--sourcecourseid")?;
                    source = Some(parse_course_id("--sourcecourseid", value)?);
                }
                "--destinationcourseid" | "-dest" => {
                    let value = value_for("--destinationcourseid")?;
                    destination = Some(parse_course_id("--destinationcourseid", value)?);
                }
                "--db" => {
                    let value = value_for("--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(flag)),
            }
        }

        Ok(Self {
            db_url,
            source: source.ok_or(ArgsError::MissingCourseId {
                flag: "--sourcecourseid",
            })?,
            destination: destination.ok_or(ArgsError::MissingCourseId {
                flag: "--destinationcourseid",
            })?,
        })
    }
}

fn print_usage() {
    eprintln!("Copy question media files from one course's questions to another's.");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- --sourcecourseid <id> --destinationcourseid <id> [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -src,  --sourcecourseid <id>        Course to copy media from (required)");
    eprintln!("  -dest, --destinationcourseid <id>   Course to copy media to (required)");
    eprintln!("  --db <sqlite_url>                   SQLite URL (default: sqlite:lms.sqlite3)");
    eprintln!("  -h, --help                          Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QBANK_DB_URL   Overrides the default database URL");
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::sqlite(&args.db_url).await?;
    let service = MediaTransferService::new(
        Arc::clone(&storage.courses),
        Arc::clone(&storage.users),
        Arc::clone(&storage.questions),
        Arc::clone(&storage.files),
    );

    let report = service.transfer(args.source, args.destination).await?;

    info!(
        questions = report.questions_matched,
        question_images = report.question_images,
        question_sounds = report.question_sounds,
        answer_sounds = report.answer_sounds,
        feedback_sounds = report.feedback_sounds,
        "transfer finished"
    );
    println!(
        "Copied {} files across {} matched questions from course {} to course {}",
        report.total_files(),
        report.questions_matched,
        args.source,
        args.destination
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(err) = run(args).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
