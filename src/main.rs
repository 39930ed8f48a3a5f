use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use slot_reels::MachineConfig;
use std::{
    path::{
        Path,
        PathBuf,
    },
    sync::OnceLock,
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling,
};
use tracing_subscriber::{
    EnvFilter,
    fmt,
};

mod client;
mod ui;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn print_usage_and_exit() -> ! {
    println!(
        "Usage: slot-reels [--config <path>] [--seed <n>] [--force-on-spin <n>]\n\
         [--forced-icon <path>] [--log-dir <path>]\n\
         \n\
         Flags:\n\
           --config <path>       JSON machine config (icons, strip_size, timing, ...)\n\
           --seed <n>            Seed the reel and outcome RNGs for a repeatable session\n\
           --force-on-spin <n>   Land three forced icons on spin number <n>\n\
           --forced-icon <path>  Icon used by --force-on-spin (default {})\n\
           --log-dir <path>      Directory for the log file (default {})",
        slot_reels::config::DEFAULT_FORCED_ICON,
        slot_reels::config::DEFAULT_LOG_DIR,
    );
    std::process::exit(0);
}

fn parse_number(flag: &str, value: Option<String>) -> Result<u64> {
    let raw = value.ok_or_else(|| eyre!("{flag} requires a number"))?;
    raw.parse()
        .wrap_err_with(|| format!("{flag} expects a number, got {raw:?}"))
}

fn parse_cli_args() -> Result<MachineConfig> {
    let mut args = std::env::args().skip(1);
    let mut config_path: Option<PathBuf> = None;
    let mut seed: Option<u64> = None;
    let mut force_on_spin: Option<u64> = None;
    let mut forced_icon: Option<String> = None;
    let mut log_dir: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| eyre!("--config requires a path argument"))?;
                if config_path.is_some() {
                    return Err(eyre!("--config may only be specified once"));
                }
                config_path = Some(PathBuf::from(path));
            }
            "--seed" => seed = Some(parse_number("--seed", args.next())?),
            "--force-on-spin" => {
                force_on_spin = Some(parse_number("--force-on-spin", args.next())?)
            }
            "--forced-icon" => {
                let icon = args
                    .next()
                    .ok_or_else(|| eyre!("--forced-icon requires an icon path"))?;
                forced_icon = Some(icon);
            }
            "--log-dir" => {
                let dir = args
                    .next()
                    .ok_or_else(|| eyre!("--log-dir requires a path argument"))?;
                log_dir = Some(dir);
            }
            "--help" | "-h" => print_usage_and_exit(),
            other => return Err(eyre!("Unknown argument: {other}")),
        }
    }

    let mut config = match config_path {
        Some(path) => MachineConfig::load(&path)?,
        None => MachineConfig::default(),
    };
    if seed.is_some() {
        config.seed = seed;
    }
    if force_on_spin.is_some() {
        config.force_final_on_spin = force_on_spin;
    }
    if let Some(icon) = forced_icon {
        config.forced_icon = icon;
    }
    if let Some(dir) = log_dir {
        config.log_dir = dir;
    }
    config.validate()?;
    Ok(config)
}

fn init_tracing(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)
        .wrap_err_with(|| format!("creating log dir {}", log_dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(log_dir, "slot-reels.log"));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!("installing tracing subscriber: {e}"))?;
    let _ = LOG_GUARD.set(guard);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let config = parse_cli_args()?;
    init_tracing(&config.log_dir()?)?;
    tracing::info!(seed = ?config.seed, forced = ?config.force_final_on_spin, "starting slot-reels");
    client::run_app(config).await
}
