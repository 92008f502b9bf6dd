use std::fs::File;
use std::io;
use std::io::Write;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock, Mutex, TryLockResult};

use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use fetal_plane_explorer::api::{PredictionClient, DEFAULT_API_URL};
use fetal_plane_explorer::config::Config;
use fetal_plane_explorer::file::ImageFile;
use fetal_plane_explorer::notify::default_notifier;
use futures::FutureExt;
use tracing::{debug, error, info};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::app::App;

mod app;
mod commands;

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
struct Args {
    /// Image to submit right away, as if it had been dropped
    #[arg()]
    file: Option<PathBuf>,

    /// Base URL of the inference service
    #[arg(long, env = "FETAL_EXPLORER_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Path of the HTML report, per default: explorer_report-%Y-%m-%dT%H-%M-%S.html
    #[arg(long)]
    report: Option<PathBuf>,

    /// Open the report in the browser when the first result is shown
    #[arg(long)]
    open: bool,

    /// Print failure notifications to stderr instead of showing a dialog
    #[arg(long)]
    console_alerts: bool,

    /// Submit FILE, print the result and exit
    #[arg(long, requires = "file")]
    once: bool,

    /// Query the service health and metadata and exit
    #[arg(long, conflicts_with = "once")]
    check: bool,

    /// How verbose the output should be, can be set up to 3 times. Has no effect if RUST_LOG is set
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to output log to
    #[arg(short, long)]
    log_path: Option<PathBuf>,
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            api_url: args.api_url.clone(),
            report_path: args.report.clone().unwrap_or_else(Config::default_report_path),
            open_report: args.open,
            console_alerts: args.console_alerts,
        }
    }
}

// everything runs on one thread, uploads and rendering interleave at await points
#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let old_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        old_hook(panic_info);
        error!("Backtrace: {:#?}", backtrace);
    }));

    let args = Args::parse();

    tracing_init(&args)?;

    debug!(?args);

    // AssertUnwindSafe is fine since the only thing done after a panic is writing the crash log
    match AssertUnwindSafe(run(args)).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            error!("the application panicked, this is a bug");
            write_crashlog(payload.as_ref());
            std::process::exit(101);
        }
    }
}

async fn run(args: Args) -> eyre::Result<()> {
    let config = Config::from(&args);

    if args.check {
        return check_service(&config).await;
    }

    let notifier = default_notifier(config.console_alerts);
    let app = App::new(config, notifier)?;

    if args.once {
        let Some(path) = args.file else {
            eyre::bail!("--once needs a file");
        };
        if !app.run_once(ImageFile::new(path)).await? {
            std::process::exit(1);
        }
        return Ok(());
    }

    app.run(args.file).await?;

    if let Some(log_path) = args.log_path {
        info!("wrote logs to {}", log_path.display());
    }
    Ok(())
}

async fn check_service(config: &Config) -> eyre::Result<()> {
    let client = PredictionClient::new(config.api_url.clone());

    let health = client
        .health()
        .await
        .wrap_err_with(|| format!("health check against {} failed", client.base_url()))?;
    println!("status:      {}", health.status);

    let metadata = client.metadata().await.wrap_err("could not fetch service metadata")?;
    println!("service:     {}", metadata.service);
    println!("version:     {}", metadata.version);
    println!("model mode:  {}", metadata.model_mode);
    if !metadata.description.is_empty() {
        println!("description: {}", metadata.description);
    }

    if !health.is_ok() {
        eyre::bail!("service reported status {:?}", health.status);
    }
    Ok(())
}

fn write_crashlog(payload: &(dyn std::any::Any + Send)) {
    let Ok(mut file) = File::create("crashlog.txt") else {
        return;
    };

    let lines = match LOG_BUFFER.try_lock() {
        TryLockResult::Ok(buffer) => buffer.join("\n"),
        _ => "failed to lock log buffer".to_string(),
    };
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic: unknown payload type".to_string()
    };

    if write!(file, "{}\n\n{}", lines, message).is_ok() {
        info!("wrote crashlog to crashlog.txt");
    }
}

/// Log lines of this session, kept for the crash log.
pub static LOG_BUFFER: LazyLock<Mutex<Vec<String>>> = LazyLock::new(|| Mutex::new(Vec::new()));

struct VecWriter;

impl io::Write for VecWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let str = String::from_utf8_lossy(buf);
        if let Ok(mut buffer) = LOG_BUFFER.lock() {
            buffer.extend(str.lines().map(|s| s.to_string()));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Tees log output into two writers. Stdout is left to the page rendering.
struct DualWriter<A: io::Write, B: io::Write> {
    m: Arc<Mutex<(A, B)>>,
}

impl<A: io::Write, B: io::Write> DualWriter<A, B> {
    fn new(a: A, b: B) -> Self {
        Self {
            m: Arc::new(Mutex::new((a, b))),
        }
    }
}

impl<A: io::Write, B: io::Write> io::Write for DualWriter<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut m = self.m.lock().map_err(|_| io::Error::other("log writer poisoned"))?;
        m.0.write_all(buf)?;
        m.1.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut m = self.m.lock().map_err(|_| io::Error::other("log writer poisoned"))?;
        m.0.flush()?;
        m.1.flush()
    }
}

impl<'a, A: io::Write, B: io::Write> MakeWriter<'a> for DualWriter<A, B> {
    type Writer = DualWriter<A, B>;

    fn make_writer(&'a self) -> Self::Writer {
        DualWriter { m: self.m.clone() }
    }
}

fn tracing_init(args: &Args) -> eyre::Result<()> {
    tracing_log::LogTracer::init()?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(
            match args.verbose {
                0 => "fetal_plane_explorer=info",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
            .parse()?,
        )
        .from_env_lossy();

    let console_log = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(DualWriter::new(VecWriter, io::stderr()))
        .with_filter(env_filter);

    let file_log = if let Some(log_path) = &args.log_path {
        let log_file = File::create(log_path).wrap_err_with(|| format!("could not create {}", log_path.display()))?;
        let file_log = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(Mutex::new(log_file))
            .with_filter(tracing::level_filters::LevelFilter::TRACE);
        Some(file_log)
    } else {
        None
    };

    let subscriber = tracing_subscriber::registry().with(console_log).with(file_log);

    tracing::subscriber::set_global_default(subscriber).wrap_err("unable to set up logging")?;
    Ok(())
}
