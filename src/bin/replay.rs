//! Audit-log replay utility.
//!
//! Reconciles the plain-text audit log into the verification database:
//! inserts sessions the store is missing and retrofills photo paths that
//! only the log captured.

use dov_bridge::infra::{AuditLog, SqliteRecordStore};
use dov_bridge::reconcile;

fn print_help() {
    eprintln!(
        "\
dov-bridge replay

USAGE:
  replay <command> [options]

COMMANDS:
  sync        Insert audit log sessions missing from the database
  retrofill   Fill missing photo paths from the audit log
  run         sync followed by retrofill

OPTIONS:
  --database-url <url>   (defaults to env DATABASE_URL, then sqlite:verifications.db)
  --log-file <path>      (defaults to env AUDIT_LOG_FILE, then dov_audit_log.txt)
  --dry-run              Report what would change without writing
"
    );
}

struct Args {
    command: String,
    database_url: String,
    log_file: String,
    dry_run: bool,
}

fn parse_args() -> Option<Args> {
    let mut args = std::env::args().skip(1);
    let command = args.next()?;
    if matches!(command.as_str(), "-h" | "--help" | "help") {
        return None;
    }

    let mut database_url = None;
    let mut log_file = None;
    let mut dry_run = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--database-url" => database_url = args.next(),
            "--log-file" => log_file = args.next(),
            "--dry-run" => dry_run = true,
            other => {
                eprintln!("Unknown option: {other}");
                return None;
            }
        }
    }

    Some(Args {
        command,
        database_url: database_url
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .unwrap_or_else(|| "sqlite:verifications.db".to_string()),
        log_file: log_file
            .or_else(|| std::env::var("AUDIT_LOG_FILE").ok())
            .unwrap_or_else(|| "dov_audit_log.txt".to_string()),
        dry_run,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let Some(args) = parse_args() else {
        print_help();
        std::process::exit(2);
    };

    let store = SqliteRecordStore::from_url(&args.database_url).await?;
    store.initialize().await?;
    let audit = AuditLog::new(&args.log_file);

    match args.command.as_str() {
        "sync" => {
            let report = reconcile::sync_log(&store, &audit, args.dry_run).await?;
            println!(
                "Sync complete: {} inserted, {} already present, {} incomplete blocks",
                report.inserted, report.skipped, report.incomplete
            );
        }
        "retrofill" => {
            let updated = reconcile::retrofill_photos(&store, &audit, args.dry_run).await?;
            println!("Retrofill complete: {updated} records updated");
        }
        "run" => {
            let (report, updated) = reconcile::run(&store, &audit, args.dry_run).await?;
            println!(
                "Log processing complete: {} inserted, {} already present, {} retrofilled",
                report.inserted, report.skipped, updated
            );
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
            std::process::exit(2);
        }
    }

    Ok(())
}
