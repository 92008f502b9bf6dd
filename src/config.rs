use std::path::PathBuf;

use chrono::Local;

use crate::api::DEFAULT_API_URL;

/// Runtime settings for the interactive client.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the inference service, without the `/v1` prefix
    pub api_url: String,
    /// Where the HTML rendering of the page is written after every update
    pub report_path: PathBuf,
    /// Open the report in the default browser once results are first shown
    pub open_report: bool,
    /// Show failures on stderr instead of a native message box
    pub console_alerts: bool,
}

impl Config {
    pub fn default_report_path() -> PathBuf {
        PathBuf::from(Local::now().format("explorer_report-%Y-%m-%dT%H-%M-%S.html").to_string())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            report_path: Self::default_report_path(),
            open_report: false,
            console_alerts: false,
        }
    }
}
