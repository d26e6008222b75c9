//! Console presentation: the browser stands in for the shell window.

use std::io;

use tracing::{info, warn};

use svcshell_core::Presenter;

type Opener = fn(&str) -> io::Result<()>;

/// Hand the URL to the platform opener without waiting for it.
fn open_detached(url: &str) -> io::Result<()> {
    open::that_detached(url)
}

/// Opens the UI in the system browser and reports problems on stderr.
#[derive(Debug, Clone, Copy)]
pub struct ConsolePresenter {
    open_browser: bool,
    opener: Opener,
}

impl ConsolePresenter {
    pub const fn new(open_browser: bool) -> Self {
        Self {
            open_browser,
            opener: open_detached,
        }
    }

    #[cfg(test)]
    const fn with_opener(mut self, opener: Opener) -> Self {
        self.opener = opener;
        self
    }
}

impl Presenter for ConsolePresenter {
    fn on_ready(&self, url: &str) {
        eprintln!("Service ready at {url}");
        if self.open_browser {
            info!(url, "Opening UI");
            if let Err(e) = (self.opener)(url) {
                warn!(url, error = %e, "Failed to open browser");
                eprintln!("Open {url} in your browser to continue.");
            }
        }
    }

    fn on_startup_failed(&self, reason: &str) {
        eprintln!("Failed to start the backend service: {reason}");
    }

    fn on_service_crashed(&self, code: Option<i32>) {
        match code {
            Some(code) => eprintln!("The backend service stopped unexpectedly (exit code {code})."),
            None => eprintln!("The backend service was terminated unexpectedly."),
        }
    }
}
