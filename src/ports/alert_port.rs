//! Alert fan-out port (toasts, chat bots, log lines).

use crate::domain::alert::AlertCategory;

pub trait AlertPort {
    fn notify(&mut self, category: AlertCategory, message: &str);
}
