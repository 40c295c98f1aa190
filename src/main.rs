use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use daily_image::clock::{self, SystemClock};
use daily_image::config::{self, ConfigOverrides, ServerConfig};
use daily_image::mapper::{rank_images, select_image};
use daily_image::output::{self, PickReport};
use daily_image::refresh::DailyRefresher;
use daily_image::{logging, scan, server};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Only computed once, for clap
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "daily-image")]
#[command(about = "Serve one image per day from a directory of photos")]
#[command(long_about = "\
Serve one image per day from a directory of photos

Every day at local midnight one image is picked from the image directory,
copied into the asset directory as today_YYYY-MM-DD.jpg, and shown on a
minimal web page. The pick is reproducible: the same set of images and the
same date always give the same image.

Layout:

  images/                 # --imagedir: the pool (*.jpg, *.jpeg, recursive)
  ├── dawn.jpg
  └── travel/
      └── kyoto.jpeg
  assets/                 # --assetdir: served under /assets/
  └── today_2024-01-01.jpg

Settings are read from daily-image.toml (or --config), then overridden by
environment variables, then by flags.

Run 'daily-image gen-config' to generate a documented config file.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: ./daily-image.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory containing all images
    #[arg(long = "imagedir", env = "IMAGE_DIR", global = true)]
    image_dir: Option<PathBuf>,

    /// Directory the image of the day is served from
    #[arg(long = "assetdir", env = "ASSET_DIR", global = true)]
    asset_dir: Option<PathBuf>,

    /// Also append logs to this file
    #[arg(long = "logfile", env = "LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    /// HTTP port
    #[arg(long, env = "PORT", global = true)]
    port: Option<u16>,

    /// Timezone for the midnight rotation (IANA name, e.g. Europe/Berlin)
    #[arg(long, env = "TIMEZONE", global = true)]
    timezone: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the image of the day (default)
    Serve,
    /// Show which image a date maps to, with every candidate's score
    Pick {
        /// Date to pick for, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the image pool
    Check,
    /// Print a stock config file with all options documented
    GenConfig,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            image_dir: self.image_dir.clone(),
            asset_dir: self.asset_dir.clone(),
            // An empty LOG_FILE disables file logging
            log_file: self
                .log_file
                .clone()
                .filter(|p| !p.as_os_str().is_empty()),
            port: self.port,
            timezone: self.timezone.clone(),
        }
    }

    fn load_config(&self) -> Result<ServerConfig, config::ConfigError> {
        config::load_config(self.config.as_deref(), &self.overrides())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cli = Cli::parse();

    match cli.command.take() {
        None | Some(Command::Serve) => {
            let config = cli.load_config()?;
            logging::init(config.log_file.as_deref())?;
            run_server(config)?;
        }
        Some(Command::Pick { date, json }) => {
            let config = cli.load_config()?;
            let tz = config.tz()?;
            let pool = scan::scan_pool(&config.image_dir)?;
            let today = clock::today(&SystemClock, tz);
            let date = date.unwrap_or(today);
            let selected = select_image(&pool, date, today)?;
            let report = PickReport::new(date, selected, rank_images(&pool, date));
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_pick_output(&report);
            }
        }
        Some(Command::Check) => {
            let config = cli.load_config()?;
            println!("==> Checking {}", config.image_dir.display());
            let pool = scan::scan_pool(&config.image_dir)?;
            output::print_pool_output(&pool, &config.image_dir);
            if pool.is_empty() {
                println!("==> No images found");
            } else {
                println!("==> Pool is valid");
            }
        }
        Some(Command::GenConfig) => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Publish today's image, then serve until Ctrl-C.
fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let tz = config.tz()?;
    std::fs::create_dir_all(&config.asset_dir)?;

    let refresher = Arc::new(DailyRefresher::new(
        &config.image_dir,
        &config.asset_dir,
        tz,
        Arc::new(SystemClock),
    ));

    // Failure is already logged; the page shows a placeholder until the
    // next successful refresh, which also clears leftovers from earlier runs.
    let _ = refresher.refresh_now();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let cancel = CancellationToken::new();

        let schedule = tokio::spawn(Arc::clone(&refresher).run_schedule_loop(cancel.clone()));

        let shutdown = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutting down");
                    shutdown.cancel();
                }
                Err(e) => warn!("Cannot listen for Ctrl-C: {e}"),
            }
        });

        info!(
            "Server started on :{}. Images will be renewed at midnight in timezone '{}'.",
            config.port, config.timezone
        );
        let result = server::run(config.port, refresher, cancel.clone()).await;

        cancel.cancel();
        if let Err(e) = schedule.await {
            warn!("Image schedule task failed: {e}");
        }
        result
    })?;

    Ok(())
}
