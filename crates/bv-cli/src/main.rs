//! Backup Verification CLI

use bv_core::report::{self, ReportFormat};
use bv_core::{BackupVerifier, DigestAlgorithm, OverallStatus, VerifyConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "bv")]
#[command(about = "Backup Integrity & Restoration-Verification Tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full backup health check
    Check {
        /// Backup directory to verify
        #[arg(short, long, default_value = "./backups")]
        root: PathBuf,

        /// Scratch directory for restore drills
        #[arg(short, long, default_value = "./backup-tests")]
        scratch: PathBuf,

        /// Output format (json, markdown)
        #[arg(short, long, default_value = "markdown")]
        format: String,

        /// Output file (defaults to stdout)
        #[arg(short = 'O', long)]
        output_file: Option<PathBuf>,

        /// Maximum file size for restore drills (MiB)
        #[arg(long, default_value = "100")]
        max_test_size_mib: u64,

        /// Digest algorithm (sha256, sha512)
        #[arg(short, long, default_value = "sha256")]
        algorithm: String,

        /// Per-check timeout (seconds)
        #[arg(long, default_value = "60")]
        timeout_secs: u64,
    },

    /// Report quick backup status without running checks
    Status {
        /// Backup directory to inspect
        #[arg(short, long, default_value = "./backups")]
        root: PathBuf,
    },

    /// List discovered backup artifacts, newest first
    List {
        /// Backup directory to inspect
        #[arg(short, long, default_value = "./backups")]
        root: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    match cli.command {
        Commands::Check {
            root,
            scratch,
            format,
            output_file,
            max_test_size_mib,
            algorithm,
            timeout_secs,
        } => {
            cmd_check(
                root,
                scratch,
                format,
                output_file,
                max_test_size_mib,
                algorithm,
                timeout_secs,
            )
            .await;
        }
        Commands::Status { root } => {
            cmd_status(root).await;
        }
        Commands::List { root } => {
            cmd_list(root).await;
        }
    }
}

async fn cmd_check(
    root: PathBuf,
    scratch: PathBuf,
    format: String,
    output_file: Option<PathBuf>,
    max_test_size_mib: u64,
    algorithm: String,
    timeout_secs: u64,
) {
    let algorithm: DigestAlgorithm = match algorithm.parse() {
        Ok(algorithm) => algorithm,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let config = VerifyConfig {
        backup_dir: root,
        scratch_dir: scratch,
        max_test_file_size: max_test_size_mib * 1024 * 1024,
        algorithm,
        check_timeout_secs: timeout_secs,
    };

    info!("Checking backups in: {}", config.backup_dir.display());

    let verifier = BackupVerifier::new(config);
    let result = verifier.run_health_check().await;

    let format = match format.to_lowercase().as_str() {
        "json" => ReportFormat::Json,
        _ => ReportFormat::Markdown,
    };

    match report::render(&result, format) {
        Ok(rendered) => {
            if let Some(out_path) = output_file {
                if let Err(e) = std::fs::write(&out_path, &rendered) {
                    error!("Failed to write output file: {}", e);
                    std::process::exit(1);
                }
                info!("Report written to: {}", out_path.display());
            } else {
                println!("{}", rendered);
            }
        }
        Err(e) => {
            error!("Failed to render report: {}", e);
            std::process::exit(1);
        }
    }

    if result.overall_status == OverallStatus::Fail {
        std::process::exit(1);
    }
}

async fn cmd_status(root: PathBuf) {
    let config = VerifyConfig {
        backup_dir: root,
        ..Default::default()
    };
    let verifier = BackupVerifier::new(config);
    let status = verifier.quick_status().await;

    println!("Backup status: {}", status.status);
    match status.last_check {
        Some(timestamp) => println!("Last backup:   {}", timestamp),
        None => println!("Last backup:   none"),
    }
}

async fn cmd_list(root: PathBuf) {
    let config = VerifyConfig {
        backup_dir: root,
        ..Default::default()
    };
    let verifier = BackupVerifier::new(config);

    match verifier.list_artifacts().await {
        Ok(artifacts) => {
            if artifacts.is_empty() {
                println!("No backup artifacts found");
                return;
            }
            println!("{:<40} {:>12}  {}", "NAME", "SIZE", "MODIFIED");
            for artifact in artifacts {
                println!(
                    "{:<40} {:>12}  {}",
                    artifact.name, artifact.size_bytes, artifact.modified_at
                );
            }
        }
        Err(e) => {
            error!("Failed to list backups: {}", e);
            std::process::exit(1);
        }
    }
}
