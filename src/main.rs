use std::{path::Path, time::Duration};

use anyhow::anyhow;
use clap::Parser;
use fern::colors::{Color, ColoredLevelConfig};
use log::{error, info, warn, LevelFilter};

use orly_mirror::{
    cli::Cli,
    client::{ClientConfig, OreillyClient},
    cookies,
    dispatcher::MediaDispatcher,
    driver::{until_interrupted, Driver, Prompt},
    error::{OrlyError, Result},
    toc::ContentKind,
};

/// Shell convention for a process stopped by SIGINT.
const INTERRUPTED: i32 = 130;

fn setup_logger(verbose: bool) -> std::result::Result<(), fern::InitError> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                colors.color(record.level()),
                message
            ))
        })
        .level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .level_for("reqwest", LevelFilter::Warn)
        .level_for("hyper", LevelFilter::Warn)
        .level_for("html5ever", LevelFilter::Warn)
        .level_for("selectors", LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let cookie_file = cli
        .cookies
        .clone()
        .or_else(|| cookies::find_cookie_file(Path::new(".")))
        .ok_or_else(|| {
            anyhow!("cookie.txt or cookies.txt not found in current directory. Please export your cookies from your browser and save them here")
        })?;
    info!("Found cookie file: {}", cookie_file.display());
    let jar = cookies::load_cookie_jar(&cookie_file)?;

    let client = OreillyClient::new(
        ClientConfig {
            base_url: cli.base_url.clone(),
            user_agent: cli.user_agent.clone(),
        },
        jar,
    )?;

    let mut prompt = Prompt::new(tokio::io::stdin());
    match client.check_login().await {
        Ok(()) => info!("Authentication successful."),
        Err(err @ OrlyError::AuthenticationFailed(_)) => {
            warn!("{}", err);
            if !prompt.confirm("Continue anyway? (y/n): ").await? {
                return Ok(());
            }
        }
        Err(err) => warn!("Auth check skipped: {}", err),
    }

    let kind = cli.command.kind();
    let dispatcher = MediaDispatcher::new(cli.downloader.clone(), cookie_file);
    if kind == ContentKind::Course {
        if let Err(err) = dispatcher.probe().await {
            warn!("{}", err);
        }
    }

    tokio::fs::create_dir_all(&cli.output).await?;
    let driver = Driver::new(
        &client,
        kind,
        cli.output.clone(),
        Duration::from_secs(cli.delay),
        dispatcher,
    );

    let urls = cli.command.urls();
    let session = async {
        if urls.is_empty() {
            driver.run_interactive(&mut prompt).await.map(|_| ())
        } else {
            driver.run_batch(urls).await;
            Ok(())
        }
    };

    match until_interrupted(session, tokio::signal::ctrl_c()).await {
        Some(result) => result,
        None => {
            warn!("Interrupted by user. Exiting.");
            log::logger().flush();
            // A blocking stdin read cannot be cancelled and would keep the runtime alive
            std::process::exit(INTERRUPTED);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = setup_logger(cli.verbose) {
        eprintln!("Failed to set up logging: {}", err);
    }

    if let Err(err) = run(cli).await {
        error!("{}", err);
        std::process::exit(1);
    }
}
