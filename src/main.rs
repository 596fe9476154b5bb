use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use academic_progress::config::{Settings, SettingsOverrides};
use academic_progress::store::{InMemoryStore, RecordProvider, Snapshot};
use academic_progress::{
    calendar, completion, db, grades, pipeline, report, summary, CourseDirectory, StatusFilter,
};

#[derive(Parser)]
#[command(name = "academic-progress")]
#[command(about = "Course, assignment and grade tracker", long_about = None)]
struct Cli {
    /// Read records from a JSON snapshot instead of Postgres
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,
    /// Settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Evaluate as of this instant instead of the current time
    #[arg(long, global = true, value_parser = parse_now)]
    now: Option<DateTime<Utc>>,
    /// Presentation time zone as minutes east of UTC
    #[arg(long, global = true, allow_hyphen_values = true)]
    utc_offset: Option<i32>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load sample courses and assignments
    Seed,
    /// Import courses and/or assignments from CSV files
    Import {
        #[arg(long)]
        courses: Option<PathBuf>,
        #[arg(long)]
        assignments: Option<PathBuf>,
    },
    /// Dashboard stats: GPA, pending work, completion and upcoming deadlines
    Summary,
    /// Weighted grade per course and overall GPA
    Grades,
    /// Open assignments due soon
    Upcoming {
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Month grid with assignments per day
    Calendar {
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
        /// Show every assignment due on this date (YYYY-MM-DD)
        #[arg(long)]
        day: Option<NaiveDate>,
    },
    /// Search and filter assignments, ordered by due date
    List {
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    /// Mark an assignment completed, or reopen a completed one
    Toggle {
        #[arg(long)]
        id: i64,
    },
    /// Generate a markdown progress report
    Report {
        #[arg(long, default_value = "progress-report.md")]
        out: PathBuf,
    },
}

fn parse_now(value: &str) -> Result<DateTime<Utc>, String> {
    academic_progress::parse_timestamp(value)
        .ok_or_else(|| format!("`{value}` is not an ISO-8601 date or timestamp"))
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set unless --snapshot is given")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn load_records(snapshot: Option<&PathBuf>) -> anyhow::Result<Snapshot> {
    match snapshot {
        Some(path) => Snapshot::load(path)
            .with_context(|| format!("failed to load snapshot {}", path.display())),
        None => {
            let pool = connect().await?;
            db::fetch_snapshot(&pool).await
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply_overrides(&SettingsOverrides {
        utc_offset_minutes: cli.utc_offset,
        ..SettingsOverrides::default()
    });
    let now = cli.now.unwrap_or_else(Utc::now);
    let zone = settings.zone()?;
    debug!(%now, offset = zone.local_minus_utc(), "resolved evaluation time");

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            db::seed(&pool, now).await?;
            println!("Seed data inserted.");
        }
        Commands::Import {
            courses,
            assignments,
        } => {
            if courses.is_none() && assignments.is_none() {
                anyhow::bail!("nothing to import: pass --courses and/or --assignments");
            }
            let pool = connect().await?;
            if let Some(csv) = courses {
                let inserted = db::import_courses_csv(&pool, &csv).await?;
                println!("Inserted {inserted} courses from {}.", csv.display());
            }
            if let Some(csv) = assignments {
                let inserted = db::import_assignments_csv(&pool, &csv, now).await?;
                println!("Inserted {inserted} assignments from {}.", csv.display());
            }
        }
        Commands::Summary => {
            let records = load_records(cli.snapshot.as_ref()).await?;
            let stats = summary::dashboard(
                &records.courses,
                &records.assignments,
                now,
                settings.deadline_window(),
            );
            if cli.json {
                return print_json(&stats);
            }

            let directory = CourseDirectory::new(&records.courses);
            println!("Current GPA:     {}", stats.gpa);
            println!("Total courses:   {}", stats.total_courses);
            println!("Pending tasks:   {}", stats.pending);
            println!("Completion rate: {}%", stats.completion_rate);
            println!();
            if stats.upcoming.is_empty() {
                println!("No upcoming deadlines. You're all caught up.");
            } else {
                println!("Upcoming deadlines:");
                for assignment in stats.upcoming.iter() {
                    println!(
                        "- {} ({}) due {} [{}]",
                        assignment.title,
                        directory.name_of(assignment.course_id),
                        assignment.due_date,
                        assignment.priority
                    );
                }
            }
        }
        Commands::Grades => {
            let records = load_records(cli.snapshot.as_ref()).await?;
            let breakdown = grades::course_breakdown(&records.courses, &records.assignments);
            let gpa = grades::overall_gpa(&records.courses, &records.assignments);
            if cli.json {
                return print_json(&serde_json::json!({ "gpa": gpa, "courses": breakdown }));
            }

            if breakdown.is_empty() {
                println!("No grades yet.");
                return Ok(());
            }
            println!("Overall GPA: {gpa}");
            for course in breakdown.iter() {
                println!();
                println!(
                    "{}: {:.2}% ({})",
                    course.course_name, course.rounded_percent, course.letter
                );
                for assignment in course.graded.iter() {
                    println!(
                        "  - {}: {:.1}% (weight {})",
                        assignment.title,
                        assignment.percentage().unwrap_or_default(),
                        assignment.weight
                    );
                }
            }
        }
        Commands::Upcoming { days, limit } => {
            settings.apply_overrides(&SettingsOverrides {
                window_days: days,
                upcoming_limit: limit,
                utc_offset_minutes: None,
            });
            let window = settings.deadline_window();
            let records = load_records(cli.snapshot.as_ref()).await?;
            let selected = academic_progress::upcoming(&records.assignments, now, window);
            info!(count = selected.len(), days = window.days, "selected upcoming assignments");
            if cli.json {
                return print_json(&selected);
            }

            if selected.is_empty() {
                println!("Nothing due in the next {} days.", window.days);
                return Ok(());
            }
            let directory = CourseDirectory::new(&records.courses);
            for assignment in selected.iter() {
                println!(
                    "- {} ({}) due {} [{}]",
                    assignment.title,
                    directory.name_of(assignment.course_id),
                    assignment.due_date,
                    assignment.priority
                );
            }
        }
        Commands::Calendar { month, year, day } => {
            let records = load_records(cli.snapshot.as_ref()).await?;
            let today = now.with_timezone(&zone).date_naive();

            if let Some(day) = day {
                let due = calendar::assignments_on_day(&records.assignments, day, &zone);
                if cli.json {
                    return print_json(&due);
                }
                println!("{}", day.format("%B %-d, %Y"));
                if due.is_empty() {
                    println!("No assignments due on this date.");
                }
                let directory = CourseDirectory::new(&records.courses);
                for assignment in due.iter() {
                    println!(
                        "- {} ({}) [{}]",
                        assignment.title,
                        directory.name_of(assignment.course_id),
                        assignment.priority
                    );
                }
                return Ok(());
            }

            let month = month.unwrap_or_else(|| today.month());
            let year = year.unwrap_or_else(|| today.year());
            let cells = calendar::month_view(
                &records.assignments,
                month,
                year,
                settings.week_start()?,
                &zone,
            )?;
            if cli.json {
                return print_json(&cells);
            }

            let preview = settings.calendar_preview;
            for cell in cells.iter().filter(|cell| cell.in_month) {
                if cell.assignments.is_empty() {
                    continue;
                }
                let marker = if cell.date == today { " (today)" } else { "" };
                println!("{}{}", cell.date.format("%a %b %-d"), marker);
                for assignment in cell.assignments.iter().take(preview) {
                    println!("  - {}", assignment.title);
                }
                let hidden = cell.overflow(preview);
                if hidden > 0 {
                    println!("  +{hidden} more");
                }
            }
        }
        Commands::List { query, status } => {
            let records = load_records(cli.snapshot.as_ref()).await?;
            let listed = pipeline::filter_and_sort(&records.assignments, &query, status);
            if cli.json {
                return print_json(&listed);
            }

            let counts = completion::status_counts(&records.assignments);
            println!(
                "All {} | Pending {} | In progress {} | Completed {}",
                counts.all, counts.pending, counts.in_progress, counts.completed
            );
            if listed.is_empty() {
                println!("No assignments found. Try adjusting your search or filter.");
                return Ok(());
            }
            let directory = CourseDirectory::new(&records.courses);
            for assignment in listed.iter() {
                let overdue = if assignment.is_overdue(now) { " OVERDUE" } else { "" };
                println!(
                    "#{} {} ({}) due {} [{}, {}]{}",
                    assignment.id,
                    assignment.title,
                    directory.name_of(assignment.course_id),
                    assignment.due_date,
                    assignment.status,
                    assignment.priority,
                    overdue
                );
            }
        }
        Commands::Toggle { id } => {
            let toggled = match cli.snapshot.as_ref() {
                Some(path) => {
                    let mut store = InMemoryStore::from_snapshot(Snapshot::load(path)?)?;
                    let toggled = store.toggle_status(id, now)?;
                    store.snapshot().save(path)?;
                    toggled
                }
                None => {
                    let pool = connect().await?;
                    db::toggle_status(&pool, id, now).await?
                }
            };
            println!("{} is now {}.", toggled.title, toggled.status);
        }
        Commands::Report { out } => {
            let records = load_records(cli.snapshot.as_ref()).await?;
            let report = report::build_report(&records, now, settings.deadline_window(), &zone);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
