//! Interactive session: prompt commands in, page renderings out.

use std::io::Write;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::eyre;
use fetal_plane_explorer::api::PredictionClient;
use fetal_plane_explorer::config::Config;
use fetal_plane_explorer::distributor::{ResultDistributor, ResultsRegion};
use fetal_plane_explorer::events::EventScope;
use fetal_plane_explorer::file::ImageFile;
use fetal_plane_explorer::intake::FileIntake;
use fetal_plane_explorer::model::ServiceMetadata;
use fetal_plane_explorer::notify::Notifier;
use fetal_plane_explorer::ui::composite::save_composite;
use fetal_plane_explorer::ui::page::{write_report, Page};
use fetal_plane_explorer::ui::registry;
use futures::{FutureExt, Stream, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::pin;
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::commands::{self, Command, HELP};

pub struct App {
    config: Config,
    client: PredictionClient,
    page: Page,
    page_scope: EventScope,
    distributor: ResultDistributor,
    intake: FileIntake,
    /// Uploads that have not finished yet
    pending: JoinSet<bool>,
    report_opened: bool,
}

impl App {
    pub fn new(config: Config, notifier: Arc<dyn Notifier>) -> eyre::Result<Self> {
        let registry = registry::init()?;

        let page_scope = EventScope::root("page");
        let intake_scope = page_scope.child("main").child("file-upload");
        let client = PredictionClient::new(config.api_url.clone());

        Ok(Self {
            page: Page::mount(registry)?,
            distributor: ResultDistributor::new(ResultsRegion::mount(registry)?),
            intake: FileIntake::new(client.clone(), intake_scope, notifier),
            client,
            page_scope,
            pending: JoinSet::new(),
            report_opened: false,
            config,
        })
    }

    /// Reads commands until `quit` or end of input. After end of input the session
    /// stays up until the uploads already started have finished.
    #[instrument(skip_all)]
    pub async fn run(mut self, initial: Option<PathBuf>) -> eyre::Result<()> {
        let uploads = ResultDistributor::listen(&self.page_scope);
        pin!(uploads);
        let commands = stdin_lines();
        pin!(commands);

        let (metadata_tx, metadata_rx) = oneshot::channel();
        tokio::spawn(fetch_metadata(self.client.clone(), metadata_tx));
        let mut metadata_rx = Some(metadata_rx);

        info!(api = %self.client.base_url(), report = %self.config.report_path.display(), "ready");
        self.render().await;

        if let Some(path) = initial {
            self.handle(Command::Drop(vec![path])).await;
        }
        prompt();

        let mut input_closed = false;
        loop {
            if input_closed && self.pending.is_empty() {
                break;
            }

            tokio::select! {
                Some(result) = uploads.next() => {
                    self.distributor.distribute(result);
                    self.render().await;
                    prompt();
                }

                Some(joined) = self.pending.join_next() => {
                    if let Err(e) = joined {
                        error!(%e, "upload task failed");
                    }
                }

                metadata = async {
                    match metadata_rx.as_mut() {
                        Some(rx) => rx.await.ok(),
                        None => None,
                    }
                }, if metadata_rx.is_some() => {
                    metadata_rx = None;
                    if let Some(metadata) = metadata {
                        self.page.set_service(Some(metadata));
                    }
                }

                line = commands.next(), if !input_closed => match line {
                    Some(line) => {
                        match commands::parse(&line) {
                            Ok(Some(command)) => {
                                if self.handle(command).await.is_break() {
                                    break;
                                }
                            }
                            Ok(None) => {}
                            Err(e) => println!("{e}"),
                        }
                        prompt();
                    }
                    None => {
                        debug!("input closed");
                        input_closed = true;
                    }
                },
            }
        }

        // results announced by the last uploads may still be queued
        while let Some(Some(result)) = uploads.next().now_or_never() {
            self.distributor.distribute(result);
            self.render().await;
        }

        info!("report written to {}", self.config.report_path.display());
        Ok(())
    }

    /// Submits one file, waits for it and renders the outcome.
    /// Returns whether a result was shown.
    pub async fn run_once(mut self, file: ImageFile) -> eyre::Result<bool> {
        let uploads = ResultDistributor::listen(&self.page_scope);
        pin!(uploads);

        let announced = self.intake.task(file).await;
        if let Some(Some(result)) = uploads.next().now_or_never() {
            self.distributor.distribute(result);
        }
        self.render().await;
        Ok(announced)
    }

    async fn handle(&mut self, command: Command) -> ControlFlow<()> {
        debug!(?command);
        match command {
            Command::Drop(paths) => {
                if let Some(file) = FileIntake::dropped(paths) {
                    self.pending.spawn(self.intake.task(file));
                }
            }
            Command::Pick => self.pick(),
            Command::Intensity(value) => {
                let applied = self.distributor.region_mut().overlay_mut().set_intensity(value);
                info!(%applied, "overlay intensity changed");
                self.render().await;
            }
            Command::Show => self.render().await,
            Command::Save(path) => match save_composite(self.distributor.region().overlay(), &path) {
                Ok(()) => info!("wrote overlay to {}", path.display()),
                Err(e) => println!("could not save overlay: {e}"),
            },
            Command::Help => println!("{HELP}"),
            Command::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    #[cfg(feature = "picker")]
    fn pick(&mut self) {
        let intake = self.intake.clone();
        self.pending.spawn(async move {
            match FileIntake::pick().await {
                Some(file) => intake.process_file(file).await,
                None => false,
            }
        });
    }

    #[cfg(not(feature = "picker"))]
    fn pick(&mut self) {
        println!("the file dialog is not available in this build, drop a path instead");
    }

    /// Prints the page and rewrites the report.
    async fn render(&mut self) {
        let body = self.page.render(self.distributor.region());
        print!("\n{}", body.to_text());

        let html = self.page.to_document(&body);
        if let Err(e) = write_report(&self.config.report_path, &html).await {
            warn!(%e, "report not updated");
            return;
        }

        if self.config.open_report && !self.report_opened && self.distributor.region().is_visible() {
            self.report_opened = true;
            if let Err(e) = open::that(&self.config.report_path) {
                warn!(%e, "could not open report");
            }
        }
    }
}

async fn fetch_metadata(client: PredictionClient, tx: oneshot::Sender<ServiceMetadata>) {
    match client.health().await {
        Ok(health) if health.is_ok() => debug!("service is healthy"),
        Ok(health) => warn!(status = %health.status, "service reports a problem"),
        Err(e) => {
            warn!(%e, "inference service is not reachable, uploads will fail until it is");
            return;
        }
    }

    match client.metadata().await {
        Ok(metadata) => {
            info!(service = %metadata.service, version = %metadata.version, mode = %metadata.model_mode, "connected");
            let _ = tx.send(metadata);
        }
        Err(e) => warn!(%e, "could not fetch service metadata"),
    }
}

fn stdin_lines() -> impl Stream<Item = String> {
    async_stream::stream! {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => yield line,
                Ok(None) => break,
                Err(e) => {
                    warn!(%e, "failed to read input");
                    break;
                }
            }
        }
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
