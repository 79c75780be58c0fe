use std::fmt;

use chrono::{DateTime, Utc};
use qbank_core::Clock;
use qbank_core::model::{AreaKey, ContextId, FileArea, ItemId};
use storage::sqlite::SqliteRepository;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    clock: Clock,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
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

impl Args {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut args = args;
        let mut db_url =
            std::env::var("QBANK_DB_URL").unwrap_or_else(|_| "sqlite:lms.sqlite3".into());
        let mut clock = Clock::default_clock();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    clock = Clock::fixed(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, clock })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Seeds two courses (70 and 71) with matched turmultiplechoice and");
    eprintln!("turprove questions; only course 70 carries media files, so a");
    eprintln!("transfer run from 70 to 71 has something to copy.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:lms.sqlite3)");
    eprintln!("  --now <rfc3339>           Fixed timestamp for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QBANK_DB_URL");
}

struct Seeder<'a> {
    pool: &'a sqlx::SqlitePool,
    clock: Clock,
}

impl Seeder<'_> {
    async fn user(&self, id: i64, username: &str, is_admin: bool) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT OR IGNORE INTO users (id, username, is_admin) VALUES (?1, ?2, ?3)")
            .bind(id)
            .bind(username)
            .bind(i64::from(is_admin))
            .execute(self.pool)
            .await?;
        Ok(())
    }

    async fn course(&self, id: i64, shortname: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT OR IGNORE INTO course (id, shortname, fullname) VALUES (?1, ?2, ?2)",
        )
        .bind(id)
        .bind(shortname)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    async fn quiz(&self, id: i64, course: i64, name: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT OR IGNORE INTO quiz (id, course, name) VALUES (?1, ?2, ?3)")
            .bind(id)
            .bind(course)
            .bind(name)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    async fn question(
        &self,
        id: i64,
        quiz: i64,
        slot: i64,
        qtype: &str,
        name: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT OR IGNORE INTO question (id, qtype, name) VALUES (?1, ?2, ?3)")
            .bind(id)
            .bind(qtype)
            .bind(name)
            .execute(self.pool)
            .await?;
        sqlx::query(
            "INSERT OR IGNORE INTO quiz_slots (quizid, slot, questionid) VALUES (?1, ?2, ?3)",
        )
        .bind(quiz)
        .bind(slot)
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    async fn answer(&self, id: i64, question: i64, text: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT OR IGNORE INTO question_answers (id, question, answer) VALUES (?1, ?2, ?3)")
            .bind(id)
            .bind(question)
            .bind(text)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    async fn file(
        &self,
        key: &AreaKey,
        filename: &str,
        mimetype: &str,
        content: &[u8],
    ) -> Result<(), Box<dyn std::error::Error>> {
        sqlx::query(
            r"
            INSERT INTO files (
                contextid, component, filearea, itemid, filename, mimetype,
                filesize, sortorder, timecreated, content
            )
            VALUES (?1, 'question', ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8)
            ",
        )
        .bind(i64::try_from(key.context.value())?)
        .bind(key.area.as_str())
        .bind(i64::try_from(key.item.value())?)
        .bind(filename)
        .bind(mimetype)
        .bind(i64::try_from(content.len())?)
        .bind(self.clock.now())
        .bind(content)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let repo = SqliteRepository::connect(&args.db_url).await?;
    repo.migrate().await?;

    let seeder = Seeder {
        pool: repo.pool(),
        clock: args.clock,
    };

    seeder.user(1, "admin", true).await?;

    // Source course 70 and its restored copy 71, with questions in matching
    // slot order. Question and answer ids differ between the two on purpose.
    seeder.course(70, "tur-source").await?;
    seeder.course(71, "tur-restored").await?;
    seeder.quiz(700, 70, "Tur quiz").await?;
    seeder.quiz(710, 71, "Tur quiz").await?;

    let layout = [
        // (source qid, dest qid, slot, qtype)
        (101, 201, 1, "turmultiplechoice"),
        (102, 202, 2, "turmultiplechoice"),
        (103, 203, 3, "turprove"),
    ];
    for (src, dest, slot, qtype) in layout {
        seeder
            .question(src, 700, slot, qtype, &format!("Q{slot}"))
            .await?;
        seeder
            .question(dest, 710, slot, qtype, &format!("Q{slot}"))
            .await?;
        for i in 0..2_i64 {
            seeder
                .answer(src * 10 + i, src, &format!("answer {i}"))
                .await?;
            seeder
                .answer(dest * 10 + i, dest, &format!("answer {i}"))
                .await?;
        }
    }

    // Media on the source side only.
    for (src, _, slot, _) in layout {
        let question = ItemId::new(src as u64);
        seeder
            .file(
                &AreaKey {
                    context: ContextId::SYSTEM,
                    area: FileArea::QuestionImage,
                    item: question,
                },
                &format!("q{slot}.png"),
                "image/png",
                format!("png-{slot}").as_bytes(),
            )
            .await?;
        seeder
            .file(
                &AreaKey {
                    context: ContextId::SYSTEM,
                    area: FileArea::QuestionSound,
                    item: question,
                },
                &format!("q{slot}.mp3"),
                "audio/mpeg",
                format!("mp3-{slot}").as_bytes(),
            )
            .await?;
        for i in 0..2_i64 {
            let answer = ItemId::new((src * 10 + i) as u64);
            seeder
                .file(
                    &AreaKey {
                        context: ContextId::SYSTEM,
                        area: FileArea::AnswerSound,
                        item: answer,
                    },
                    &format!("a{i}.mp3"),
                    "audio/mpeg",
                    format!("answer-mp3-{slot}-{i}").as_bytes(),
                )
                .await?;
        }
    }

    println!(
        "Seeded courses 70 and 71 with matched Turforlag questions into {}",
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
