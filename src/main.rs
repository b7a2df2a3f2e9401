mod cli;

use clap::Parser;
use cli::Cli;
use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn init_tracing(debug: Option<&str>) -> anyhow::Result<()> {
    // --debug wins over RUST_LOG
    let filter = match debug {
        Some(_) => EnvFilter::new("ooedit=debug"),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ooedit=warn")),
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match debug {
        Some(dest) if dest != "-" => {
            let file = File::create(dest)
                .map_err(|e| anyhow::anyhow!("cannot create debug log {}: {}", dest, e))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow::anyhow!("cannot initialise logging: {}", e))?;
        },
        _ => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!("cannot initialise logging: {}", e))?;
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.debug.as_deref()) {
        eprintln!("ooedit: {:#}", e);
        return ExitCode::from(cli::exit_status(ooedit::ErrorKind::Write));
    }

    let work = tokio::task::spawn_blocking(move || cli::run(&cli));
    tokio::select! {
        joined = work => match joined {
            Ok(Ok(())) => ExitCode::SUCCESS,
            Ok(Err(e)) => {
                eprintln!("ooedit: {:#}", e);
                ExitCode::from(cli::exit_code(&e))
            },
            Err(e) => {
                eprintln!("ooedit: {}", e);
                ExitCode::from(cli::EXIT_OTHER)
            },
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("ooedit: interrupted");
            // Dropping the runtime would wait for the blocking edit to finish
            std::process::exit(i32::from(cli::EXIT_INTERRUPTED))
        },
    }
}
