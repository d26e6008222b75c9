//! Presentation layer callbacks.

/// Callbacks into the presentation layer (window, dialogs).
///
/// Methods must not block; implementations forward to their UI thread or
/// event loop.
pub trait Presenter: Send + Sync {
    /// The service is healthy; load the UI from `url`.
    fn on_ready(&self, url: &str);

    /// Startup failed for good; show a diagnostic.
    fn on_startup_failed(&self, reason: &str);

    /// The spawned service died on its own with a non-success exit.
    fn on_service_crashed(&self, code: Option<i32>);
}

/// Presenter that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPresenter;

impl Presenter for NoopPresenter {
    fn on_ready(&self, _url: &str) {}

    fn on_startup_failed(&self, _reason: &str) {}

    fn on_service_crashed(&self, _code: Option<i32>) {}
}
