//! Alert sink that emits each alert as a `tracing` event.

use tracing::info;

use crate::domain::alert::AlertCategory;
use crate::ports::alert_port::AlertPort;

#[derive(Debug, Default)]
pub struct TracingAlertSink {
    sent: usize,
}

impl TracingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl AlertPort for TracingAlertSink {
    fn notify(&mut self, category: AlertCategory, message: &str) {
        self.sent += 1;
        info!(target: "algodesk::alert", %category, "ALERT: {}", message);
    }
}
