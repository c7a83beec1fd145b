use tracing::info;

/// Receives a notification whenever configured exclusions change, so that
/// analysis of open files can be rescheduled.
///
/// Notifications are fire-and-forget. Implementations must return quickly and
/// queue any real work elsewhere.
pub trait AnalysisTrigger: Send + Sync {
    fn notify_exclusions_changed(&self);
}

/// Records the notification as a log event. Used by the command-line tool,
/// which has no analysis to reschedule.
pub struct LoggingTrigger;

impl AnalysisTrigger for LoggingTrigger {
    fn notify_exclusions_changed(&self) {
        info!("Exclusions changed, open files will be re-analyzed");
    }
}
