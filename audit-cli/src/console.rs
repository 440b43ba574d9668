use audit_store::{Notification, Notifier, NotifyLevel};

/// Prints notifications for the person at the terminal
///
/// Both levels go to stderr so stdout only carries listings and exports.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotifyLevel::Success => eprintln!("{}", notification.message),
            NotifyLevel::Error => eprintln!("error: {}", notification.message),
        }
    }
}
