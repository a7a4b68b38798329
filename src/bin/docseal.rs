//! `docseal` command-line front end.
//!
//! ```bash
//! docseal keygen --out-dir keys/
//! docseal seal --input report.pdf --public-key keys/public_key.pem --out-dir sealed/
//! docseal open --envelope sealed/report.pdf.enc --wrapped-key sealed/report.pdf.key \
//!     --private-key keys/private_key.pem --out-dir restored/
//! docseal batch --public-key keys/public_key.pem --out-dir sealed/ --json a.pdf b.pdf
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use docseal::{OpenRequest, SealRequest, Sealer, SealerConfig};

// ============================================================================
// CLI Definition
// ============================================================================

/// Seal files for a recipient's RSA public key
#[derive(Parser, Debug)]
#[command(name = "docseal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an RSA key pair as PEM files
    Keygen {
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Modulus size in bits
        #[arg(long)]
        bits: Option<usize>,
    },

    /// Encrypt one file into <name>.enc and <name>.key
    Seal {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short = 'k', long)]
        public_key: PathBuf,

        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Decrypt a .enc/.key pair
    Open {
        #[arg(short, long)]
        envelope: PathBuf,

        #[arg(short, long)]
        wrapped_key: PathBuf,

        #[arg(short = 'k', long)]
        private_key: PathBuf,

        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Encrypt several files concurrently for one recipient
    Batch {
        #[arg(short = 'k', long)]
        public_key: PathBuf,

        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Print the job record of each sealed file as JSON
        #[arg(long)]
        json: bool,

        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging("info");

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => SealerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SealerConfig::default(),
    };
    let sealer = Sealer::with_filesystem(config)?;

    match cli.command {
        Commands::Keygen { out_dir, bits } => {
            let keys = sealer.provision_keys(&out_dir, bits)?;
            println!("public key:  {}", keys.public_key.display());
            println!("private key: {}", keys.private_key.display());
        }
        Commands::Seal {
            input,
            public_key,
            out_dir,
        } => {
            let outcome = sealer.seal_file(&SealRequest {
                plaintext: input,
                public_key,
                out_dir,
            })?;
            let job = sealer.job(outcome.job_id)?;
            info!(job_id = job.id, file = %job.file_name, size = job.file_size, "job finished");
            println!("{}", outcome.paths.envelope.display());
            println!("{}", outcome.paths.wrapped_key.display());
        }
        Commands::Open {
            envelope,
            wrapped_key,
            private_key,
            out_dir,
        } => {
            let outcome = sealer.open_file(&OpenRequest {
                envelope,
                wrapped_key,
                private_key,
                out_dir,
            })?;
            println!("{}", outcome.path.display());
        }
        Commands::Batch {
            public_key,
            out_dir,
            json,
            inputs,
        } => {
            let items = sealer.seal_batch(inputs, &public_key, &out_dir).await;
            let mut failed = 0;
            for item in &items {
                match &item.result {
                    Ok(outcome) if json => {
                        let job = sealer.job(outcome.job_id)?;
                        println!("{}", serde_json::to_string(&job)?);
                    }
                    Ok(outcome) => println!("ok    {}", outcome.paths.envelope.display()),
                    Err(e) => {
                        failed += 1;
                        println!("error {}: {}", item.plaintext.display(), e);
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{} of {} files failed", failed, items.len());
            }
        }
    }
    Ok(())
}
