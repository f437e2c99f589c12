//! Without the `logging` feature lineprof installs no logger of its own. Whatever logger the host
//! program installed receives the messages, capped at the configured global level.

use crate::log::LogConfiguration;

impl LogConfiguration {
    /// Applies the global level of this `LogConfiguration`. Module filters are kept but have no
    /// effect without a logger that understands them.
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
