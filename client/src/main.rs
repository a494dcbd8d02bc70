use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use client::{candidate::CandidateFile, session::UploadSession, upload::ConvertClient, DEFAULT_SERVER_URL};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "docstron", version, about = "Convert PDF to DOCX and back")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload a .pdf or .docx file and fetch the converted document
    Convert {
        file: PathBuf,

        /// Base URL of the conversion service
        #[arg(long, env = "DOCSTRON_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
        server: String,

        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Only print the download link
        #[arg(long)]
        no_download: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Convert {
            file,
            server,
            output_dir,
            no_download,
        } => convert(file, server, output_dir, no_download).await,
    }
}

async fn convert(file: PathBuf, server: String, output_dir: PathBuf, no_download: bool) -> anyhow::Result<()> {
    let candidate = CandidateFile::from_path(&file).await.with_context(|| format!("Could not read {}", file.display()))?;
    let client = ConvertClient::new(&server)?;

    let mut session = UploadSession::default();
    if session.select(candidate).is_err() {
        bail!("{}", session.error().unwrap_or_default());
    }

    let bar = ProgressBar::new(100);
    bar.set_style(ProgressStyle::with_template("uploading {bar:40.cyan/blue} {pos:>3}%")?);
    let progress = bar.clone();
    let submitted = session.submit(&client, move |percent| progress.set_position(percent as u64)).await;
    let download_url = match submitted {
        Ok(Some(download_url)) => {
            bar.finish_and_clear();
            download_url
        }
        Ok(None) => bail!("No file selected."),
        Err(_) => {
            bar.abandon();
            bail!("{}", session.error().unwrap_or_default());
        }
    };

    let download_name = session.download_name();
    println!("{}: {}", download_name, download_url);
    if !no_download {
        let destination = output_dir.join(&download_name);
        client
            .download(&download_url, &destination)
            .await
            .with_context(|| format!("Could not download {}", download_url))?;
        println!("Saved {}", destination.display());
    }
    Ok(())
}
