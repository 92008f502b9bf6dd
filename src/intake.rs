//! File intake: submit a file for prediction and announce the result.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::api::{PredictError, PredictionClient};
use crate::events::{EventScope, UiEvent};
use crate::file::{ImageFile, ReadError};
use crate::model::ClientAugmentedResult;
use crate::notify::Notifier;

/// What the operator sees when a prediction fails. Details go to the log.
pub const FAILURE_MESSAGE: &str = "Prediction failed. See console.";

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error(transparent)]
    Read(#[from] ReadError),
}

/// Takes dropped or picked files and runs each one as an independent upload.
///
/// Nothing is retained between uploads. Overlapping uploads are not serialized, the
/// one that finishes last is the one left on screen.
#[derive(Clone)]
pub struct FileIntake {
    client: PredictionClient,
    scope: EventScope,
    notifier: Arc<dyn Notifier>,
}

impl FileIntake {
    /// `scope` is the intake's own scope; results bubble up from it.
    pub fn new(client: PredictionClient, scope: EventScope, notifier: Arc<dyn Notifier>) -> Self {
        Self { client, scope, notifier }
    }

    /// Picks the file to use from a drop. Only the first of several files is used.
    pub fn dropped(paths: Vec<PathBuf>) -> Option<ImageFile> {
        let mut paths = paths.into_iter();
        let first = paths.next()?;
        let ignored = paths.count();
        if ignored > 0 {
            warn!(ignored, "only one file can be processed at a time");
        }
        Some(ImageFile::new(first))
    }

    /// Opens the native file dialog. PNG and JPEG are the default filter, any file can
    /// still be chosen.
    #[cfg(feature = "picker")]
    pub async fn pick() -> Option<ImageFile> {
        let picked = rfd::AsyncFileDialog::new()
            .set_title("Select ultrasound image")
            .add_filter("Images (PNG, JPG)", crate::file::IMAGE_EXTENSIONS)
            .add_filter("All files", &["*"])
            .pick_file()
            .await?;
        Some(ImageFile::new(picked.path()))
    }

    /// The whole upload as a detached future, for callers that manage their own tasks.
    pub fn task(&self, file: ImageFile) -> impl Future<Output = bool> + Send + 'static {
        let intake = self.clone();
        async move { intake.process_file(file).await }
    }

    /// Starts the upload in the background and returns right away.
    pub fn submit(&self, file: ImageFile) -> JoinHandle<bool> {
        tokio::spawn(self.task(file))
    }

    /// Runs one upload to completion, reporting failures the way the UI does.
    /// Returns whether a result was announced.
    #[instrument(skip_all, fields(file = %file.path().display()))]
    pub async fn process_file(&self, file: ImageFile) -> bool {
        match self.upload(&file).await {
            Ok(result) => {
                let delivered = self.scope.emit(UiEvent::FileUploaded(Box::new(result)));
                info!(delivered, "prediction announced");
                true
            }
            Err(IntakeError::Predict(e)) => {
                error!(error = %e, details = ?e, "prediction failed");
                self.notifier.alert(FAILURE_MESSAGE);
                false
            }
            Err(IntakeError::Read(e)) => {
                // the prediction itself succeeded, the preview read is not surfaced
                warn!(%e, "could not read file for display, result dropped");
                false
            }
        }
    }

    /// Predicts, then reads the preview. Nothing is announced.
    pub async fn upload(&self, file: &ImageFile) -> Result<ClientAugmentedResult, IntakeError> {
        info!(file = file.name(), "submitting for prediction");
        let response = self.client.predict(file).await?;
        let original_image = file.read_as_data_url().await?;
        Ok(ClientAugmentedResult::new(response, original_image))
    }
}
