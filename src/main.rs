use anyhow::{Context, Result};
use clap::Parser;
use gradebook::{
    auth::{Authenticator, ClientSecret},
    config::Config,
    grading::{GradeBatcher, HeaderBindings, NameIndex},
    input::parse_grade_sheet,
    report,
    sheets::{a1, SheetsClient},
};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Write assignment scores into a Google Sheets gradebook.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Grade file: label line, then `initial last_name score` lines. `-` or absent reads stdin
    grades: Option<PathBuf>,

    /// YAML config file
    #[arg(short, long, default_value = "gradebook.yaml")]
    config: PathBuf,

    /// Override `spreadsheet_id` from the config
    #[arg(long)]
    spreadsheet: Option<String>,

    /// Override `worksheet` from the config
    #[arg(long)]
    worksheet: Option<String>,

    /// Write the missing/ambiguous report here instead of stdout
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Resolve and print the writes without sending them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    // ─── 2) config ───────────────────────────────────────────────────
    let mut config = Config::load(&args.config)?;
    if let Some(id) = args.spreadsheet.clone() {
        config.spreadsheet_id = id;
    }
    if let Some(ws) = args.worksheet.clone() {
        config.worksheet = ws;
    }
    config.validate()?;
    info!(spreadsheet = %config.spreadsheet_id, worksheet = %config.worksheet, "configuration");

    // ─── 3) read grades ──────────────────────────────────────────────
    let text = read_grades(args.grades.as_deref()).await?;
    let grades = parse_grade_sheet(&text)?;
    info!(
        column = %grades.grade_label,
        records = grades.records.len(),
        skipped = grades.malformed.len(),
        "parsed grade file"
    );

    // ─── 4) credentials ──────────────────────────────────────────────
    let http = Client::new();
    let secret = ClientSecret::load(&config.auth.client_secret)
        .context("loading OAuth client secret")?;
    let token = Authenticator::new(
        http.clone(),
        secret,
        &config.auth.credential_cache,
        config.auth.redirect_port,
    )
    .obtain()
    .await
    .context("obtaining credentials")?;

    // ─── 5) resolve students ─────────────────────────────────────────
    let source = SheetsClient::new(
        http,
        token.access_token,
        &config.spreadsheet_id,
        &config.worksheet,
    )?;
    let mut batcher = GradeBatcher::new(
        source,
        HeaderBindings::new(config.header_row),
        NameIndex::new(&config.columns.first_name, &config.columns.last_name),
        &grades.grade_label,
    );
    batcher
        .bind_headers()
        .await
        .context("resolving header columns")?;
    for record in grades.records {
        batcher.add_grade(record).await?;
    }

    // ─── 6) commit ───────────────────────────────────────────────────
    if args.dry_run {
        let worksheet = batcher.source().worksheet();
        for u in batcher.staged() {
            println!("{} = {}", a1::cell(worksheet, u.row, u.col), u.value);
        }
        info!(cells = batcher.staged().len(), "dry run; nothing written");
    } else {
        let written = batcher.flush().await.context("writing grades")?;
        info!(cells = written, "done");
    }

    // ─── 7) report ───────────────────────────────────────────────────
    let (missing, ambiguous) = batcher.unresolved();
    if !missing.is_empty() || !ambiguous.is_empty() {
        warn!(
            missing = missing.len(),
            ambiguous = ambiguous.len(),
            "some students were not graded"
        );
    }
    let rendered = report::render(missing, ambiguous);
    match &args.report {
        Some(path) => {
            tokio::fs::write(path, &rendered)
                .await
                .with_context(|| format!("writing report {}", path.display()))?;
            info!(path = %path.display(), "wrote report");
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

async fn read_grades(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => tokio::fs::read_to_string(p)
            .await
            .with_context(|| format!("reading grades from {}", p.display())),
        _ => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("reading grades from stdin")?;
            Ok(text)
        }
    }
}
