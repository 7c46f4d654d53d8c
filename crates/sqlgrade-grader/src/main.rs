//! sqlgrade CLI
//!
//! Grades, validates and runs SQL answers from the command line.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sqlgrade_core::{validate_sql, Schema, SqlQuery};
use sqlgrade_grader::{Catalog, Grader, GraderConfig, Submission};
use sqlgrade_sqlite::Sandbox;

/// Grade SQL answers against reference queries.
#[derive(Parser)]
#[command(name = "sqlgrade")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    limits: LimitArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LimitArgs {
    /// Per-query time budget in milliseconds.
    #[arg(long, global = true, env = "SQLGRADE_TIMEOUT_MS", default_value_t = 5000)]
    timeout_ms: u64,

    /// Most rows a query may return.
    #[arg(long, global = true, env = "SQLGRADE_MAX_ROWS", default_value_t = 1000)]
    max_rows: usize,

    /// Relative tolerance for comparing numbers.
    #[arg(long, global = true, env = "SQLGRADE_FLOAT_EPSILON", default_value_t = 1e-6)]
    float_epsilon: f64,

    /// Compare rows by position when a question does not say.
    #[arg(long, global = true)]
    order_sensitive: bool,
}

impl LimitArgs {
    const fn config(&self) -> GraderConfig {
        GraderConfig {
            timeout_ms: self.timeout_ms,
            max_rows: self.max_rows,
            float_epsilon: self.float_epsilon,
            default_order_sensitive: self.order_sensitive,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Grade an answer to a catalog question and print the JSON report.
    Grade {
        /// Catalog file with schemas and questions.
        #[arg(short, long)]
        catalog: PathBuf,

        /// Question id.
        #[arg(short, long)]
        question: String,

        /// The answer SQL.
        #[arg(long, conflicts_with = "sql_file", required_unless_present = "sql_file")]
        sql: Option<String>,

        /// File holding the answer SQL.
        #[arg(long)]
        sql_file: Option<PathBuf>,
    },

    /// Check a query's table and column references against a schema.
    Validate {
        /// Schema definition file.
        #[arg(short, long)]
        schema: PathBuf,

        /// The SQL to check.
        #[arg(long)]
        sql: String,
    },

    /// Run a query in the sandbox and print the result table.
    Run {
        /// Schema definition file.
        #[arg(short, long)]
        schema: PathBuf,

        /// The SQL to run.
        #[arg(long)]
        sql: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable.
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.limits.config();
    match cli.command {
        Commands::Grade {
            catalog,
            question,
            sql,
            sql_file,
        } => {
            let student_sql = match (sql, sql_file) {
                (Some(sql), _) => sql,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => anyhow::bail!("one of --sql or --sql-file is required"),
            };
            let catalog = Catalog::from_path(&catalog)?;
            info!(question = %question, "Grading");
            let grader = Grader::new(catalog, config);
            let report = grader.grade(&Submission::new(question, student_sql)).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Validate { schema, sql } => {
            let schema = load_schema(&schema)?;
            let issues = validate_sql(&sql, &schema).context("Query does not parse")?;
            if issues.is_empty() {
                info!("No issues found");
            }
            println!("{}", serde_json::to_string_pretty(&issues)?);
        }

        Commands::Run { schema, sql } => {
            let schema = load_schema(&schema)?;
            let sandbox = Sandbox::new(config.sandbox_limits());
            match sandbox.execute(&SqlQuery::student(sql), &schema).await? {
                Ok(result) => println!("{result}"),
                Err(failure) => {
                    println!("{failure}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Reads a schema definition file. The file stem becomes the schema id.
fn load_schema(path: &Path) -> anyhow::Result<Schema> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let id = path
        .file_stem()
        .map_or_else(|| String::from("schema"), |s| s.to_string_lossy().into_owned());
    Schema::from_json(id, None, &json).with_context(|| format!("Invalid schema {}", path.display()))
}
