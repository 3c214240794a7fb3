//! Status variable change notification.
//!
//! A watch sits on a single guest byte (a firmware status variable such as the
//! interpreter MODE) and remembers the last value stored there so the renderer
//! knows to refresh. It never influences the guest.

use std::any::Any;

use super::{BusWrite, ObserverError, WriteObserver};

#[derive(Debug, Clone, Default)]
pub struct StatusWatch {
    last: Option<u8>,
    pending: bool,
}

impl StatusWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value stored, if any store happened since the bus was armed.
    pub fn last(&self) -> Option<u8> {
        self.last
    }

    /// The stored value if it changed since the previous call.
    pub fn take_change(&mut self) -> Option<u8> {
        if std::mem::replace(&mut self.pending, false) {
            self.last
        } else {
            None
        }
    }
}

impl WriteObserver for StatusWatch {
    fn on_write(&mut self, write: BusWrite) -> Result<(), ObserverError> {
        self.last = Some(write.value);
        self.pending = true;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
