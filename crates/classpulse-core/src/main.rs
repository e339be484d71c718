//! ClassPulse CLI
//!
//! Command-line interface for the ClassPulse service.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use classpulse::alerting::{evaluate, AlertEvaluator, DropPolicy};
use classpulse::api::{AppState, HttpServer};
use classpulse::config::{Config, DatabaseBackend};
use classpulse::db::{self, PostgresPool};
use classpulse::models::{ExamType, Role, ScoreRecord, User};

/// ClassPulse - school performance tracking
#[derive(Parser)]
#[command(name = "classpulse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "CLASSPULSE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// HTTP port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Database management
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },

    /// Check whether a score change would raise an alert
    CheckDrop {
        /// Subject label used in the message
        #[arg(long, default_value = "Math")]
        subject: String,

        /// Previous score
        #[arg(long)]
        previous: f64,

        /// New score
        #[arg(long)]
        current: f64,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Run database migrations
    Migrate,

    /// Insert a demo teacher, student and parent
    Seed,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config, cli.verbose);

    let result = match cli.command {
        Commands::Serve { host, port } => run_serve(config, host, port).await,
        Commands::Db { command } => run_db(config, command).await,
        Commands::CheckDrop {
            subject,
            previous,
            current,
        } => run_check_drop(&config, subject, previous, current),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &Config, verbose: bool) {
    let level = if verbose { "debug" } else { config.logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if config.logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run_serve(mut config: Config, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let store = db::connect(&config)
        .await
        .context("failed to open the store")?;
    store.health_check().await.context("store health check failed")?;

    let policy = DropPolicy::from(&config.alerting);
    info!(threshold = policy.threshold, backend = ?config.database.backend, "Store ready");

    let evaluator = AlertEvaluator::new(Arc::clone(&store), policy);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    HttpServer::new(AppState::new(store, evaluator))
        .serve(&addr)
        .await?;

    Ok(())
}

async fn run_db(config: Config, command: DbCommands) -> anyhow::Result<()> {
    if config.database.backend != DatabaseBackend::Postgres {
        anyhow::bail!("database commands require the postgres backend");
    }

    match command {
        DbCommands::Migrate => {
            let pool = PostgresPool::new(&config.database).await?;
            pool.migrate().await?;
            println!("Migrations applied.");
        }
        DbCommands::Seed => {
            let store = db::connect(&config).await?;

            let teacher = User::new("ms.rivera", "Elena Rivera", Role::Teacher);
            let student = User::new("sam.okafor", "Sam Okafor", Role::Student).with_teacher(teacher.id);
            let parent = User::new("ada.okafor", "Ada Okafor", Role::Parent).with_child(student.id);

            for user in [&teacher, &student, &parent] {
                store.upsert_user(user).await?;
                println!("{:<8} {} ({})", user.role, user.id, user.username);
            }
        }
    }

    Ok(())
}

fn run_check_drop(config: &Config, subject: String, previous: f64, current: f64) -> anyhow::Result<()> {
    let policy = DropPolicy::from(&config.alerting);
    let student_id = Uuid::nil();
    let teacher_id = Uuid::nil();

    let score = |value: f64| ScoreRecord {
        id: Uuid::new_v4(),
        student_id,
        teacher_id,
        subject: subject.clone(),
        score: value,
        max_score: 100.0,
        exam_type: ExamType::Quiz,
        remarks: None,
        recorded_at: Utc::now(),
    };

    match evaluate(&score(current), Some(&score(previous)), &policy) {
        Some(alert) => println!("ALERT ({:.2}%): {}", alert.drop_percentage, alert.message),
        None => println!("No alert (threshold {})", policy.threshold),
    }

    Ok(())
}
