use super::{AlertTemplate, Notifier};
use crate::nats::messages::ALERT_SUBJECT;
use crate::nats::NatsClient;
use tracing::{debug, warn};

/// Notifier that publishes alerts on NATS for a client app to display
pub struct NatsNotifier {
    client: NatsClient,
    template: AlertTemplate,
}

impl NatsNotifier {
    pub fn new(client: NatsClient, template: AlertTemplate) -> Self {
        Self { client, template }
    }
}

impl Notifier for NatsNotifier {
    fn notify(&self, message: &str) {
        let alert = self.template.alert(message);
        let client = self.client.clone();

        tokio::spawn(async move {
            match client.publish_alert(ALERT_SUBJECT, &alert).await {
                Ok(()) => debug!("Published alert to {}", ALERT_SUBJECT),
                Err(e) => warn!("Failed to deliver alert: {:#}", e),
            }
        });
    }

    fn name(&self) -> &str {
        "nats"
    }
}
