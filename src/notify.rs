//! Operator-visible notifications.

use std::io::Write;

/// Channel for messages the operator has to acknowledge.
pub trait Notifier: Send + Sync + 'static {
    /// Shows `message` and returns once it has been shown (or dismissed).
    fn alert(&self, message: &str);
}

/// Writes alerts to stderr with a terminal bell.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "\x07!! {}", message);
        let _ = stderr.flush();
    }
}

/// Native modal message box. Blocks the calling thread until dismissed.
#[cfg(feature = "picker")]
#[derive(Debug, Default, Clone, Copy)]
pub struct DialogNotifier;

#[cfg(feature = "picker")]
impl Notifier for DialogNotifier {
    fn alert(&self, message: &str) {
        rfd::MessageDialog::new()
            .set_title(crate::APP_TITLE)
            .set_level(rfd::MessageLevel::Error)
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

/// Picks the dialog notifier when available, unless console alerts were requested.
pub fn default_notifier(console: bool) -> std::sync::Arc<dyn Notifier> {
    #[cfg(feature = "picker")]
    if !console {
        return std::sync::Arc::new(DialogNotifier);
    }

    let _ = console;
    std::sync::Arc::new(ConsoleNotifier)
}
