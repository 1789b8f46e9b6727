use super::{AlertTemplate, Notifier};
use tracing::warn;

/// Notifier that writes alerts to the log
#[derive(Debug, Default)]
pub struct LogNotifier {
    template: AlertTemplate,
}

impl LogNotifier {
    pub fn new(template: AlertTemplate) -> Self {
        Self { template }
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        let alert = self.template.alert(message);
        warn!(
            channel = %alert.channel_id,
            id = alert.notification_id,
            "{}: {}",
            alert.title,
            alert.body
        );
    }

    fn name(&self) -> &str {
        "log"
    }
}
