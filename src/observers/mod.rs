//! Write observation for the guest address space.
//!
//! This module provides the memory bus the interpreter runs against. It owns the
//! 64KB image and an interval registry of write observers: hardware-emulation
//! callbacks that fire when the guest stores into an address range they watch.
//!
//! # Architecture
//!
//! - **WriteObserver trait**: Abstract interface for a write-triggered callback
//! - **ObservableMemory**: The `MemoryBus`; stores the byte, then dispatches
//! - **Observer implementations**: Video surface, status watch
//!
//! # Dispatch Rules
//!
//! - Reads never reach an observer.
//! - A write to address A updates the byte first, then invokes every registration
//!   whose range contains A, in registration order, exactly once.
//! - Until [`ObservableMemory::arm`] is called (the machine is reset), writes do
//!   not reach observers at all, so populating memory is silent.
//! - An observer returning an error is logged and skipped; the write itself and
//!   every other observer are unaffected.
//!
//! # Example
//!
//! ```rust
//! use cerbemu::{BusWrite, MemoryBus, ObservableMemory, observer_fn};
//!
//! let mut memory = ObservableMemory::new();
//! memory
//!     .subscribe(0xF000..0xF800, observer_fn(|write: BusWrite| {
//!         assert_eq!(write.offset, 0x0001);
//!         Ok(())
//!     }))
//!     .unwrap();
//! memory.arm();
//!
//! memory.write(0xF001, 0x61);
//! assert_eq!(memory.read(0xF001), 0x61);
//! ```

use std::any::Any;
use std::ops::{Bound, RangeBounds, RangeInclusive};

use thiserror::Error;

use crate::memory::{FlatMemory, MemoryBus};

pub mod video;
pub mod watch;

pub use video::{TextGrid, VideoSurface};
pub use watch::StatusWatch;

/// A single guest store, as seen by an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusWrite {
    /// Absolute guest address written.
    pub address: u16,
    /// Offset of `address` from the start of the observer's range.
    pub offset: u16,
    /// Byte stored.
    pub value: u8,
}

/// Callback fired on guest writes inside a registered range.
///
/// Observers must not assume they will be called for every store: writes made
/// before the bus is armed are never dispatched. They are `Send` because the
/// bus moves into the emulation thread.
pub trait WriteObserver: Any + Send {
    /// Handle a store that landed inside this observer's range.
    ///
    /// An error is a rendering failure local to the observer. It is discarded by
    /// the bus and never aborts emulation.
    fn on_write(&mut self, write: BusWrite) -> Result<(), ObserverError>;

    /// Support for downcasting to the concrete observer type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcasting support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Adapter turning a closure into a [`WriteObserver`].
pub struct FnObserver<F> {
    callback: F,
}

/// Wrap a closure as a write observer.
pub fn observer_fn<F>(callback: F) -> FnObserver<F>
where
    F: FnMut(BusWrite) -> Result<(), ObserverError> + Send + 'static,
{
    FnObserver { callback }
}

impl<F> WriteObserver for FnObserver<F>
where
    F: FnMut(BusWrite) -> Result<(), ObserverError> + Send + 'static,
{
    fn on_write(&mut self, write: BusWrite) -> Result<(), ObserverError> {
        (self.callback)(write)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Handle to a registration, returned by [`ObservableMemory::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);

/// Errors raised by observer registration or by an observer itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObserverError {
    /// The requested range contains no addresses.
    #[error("observer range is empty")]
    EmptyRange,

    /// A write landed outside the surface the observer renders to.
    #[error("write at offset 0x{offset:04X} is outside a {rows}x{cols} surface")]
    OutOfBounds { offset: u16, rows: usize, cols: usize },

    /// Any other observer-local failure.
    #[error("{0}")]
    Failed(String),
}

/// Internal registration of an observer over an inclusive address range.
struct Subscription {
    range: RangeInclusive<u16>,
    observer: Box<dyn WriteObserver>,
}

/// The guest memory bus: a 64KB image plus an ordered write-observer registry.
///
/// Registrations may cover disjoint or overlapping ranges. Dispatch is a linear
/// scan in registration order, which is stable and cheap for the handful of
/// surfaces a debug harness maps.
pub struct ObservableMemory {
    image: FlatMemory,
    subscriptions: Vec<Subscription>,
    armed: bool,
}

impl ObservableMemory {
    /// Create a zeroed, unarmed bus with no observers.
    pub fn new() -> Self {
        Self::with_image(FlatMemory::new())
    }

    /// Create an unarmed bus over an existing image.
    pub fn with_image(image: FlatMemory) -> Self {
        Self {
            image,
            subscriptions: Vec::new(),
            armed: false,
        }
    }

    /// Register `observer` for writes to every address in `range`.
    ///
    /// # Returns
    ///
    /// * `Ok(ObserverId)` - Handle for later inspection of the observer
    /// * `Err(ObserverError::EmptyRange)` - The range contains no addresses
    pub fn subscribe<R, O>(&mut self, range: R, observer: O) -> Result<ObserverId, ObserverError>
    where
        R: RangeBounds<u16>,
        O: WriteObserver,
    {
        let range = inclusive(&range).ok_or(ObserverError::EmptyRange)?;
        log::debug!(
            "observer {} subscribed to 0x{:04X}-0x{:04X}",
            self.subscriptions.len(),
            range.start(),
            range.end()
        );
        self.subscriptions.push(Subscription {
            range,
            observer: Box::new(observer),
        });
        Ok(ObserverId(self.subscriptions.len() - 1))
    }

    /// Start dispatching writes to observers.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Whether writes are currently dispatched to observers.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Copy `bytes` into the image at `start` without notifying anyone.
    ///
    /// Returns the number of bytes that fit below 0x10000.
    pub fn load(&mut self, start: u16, bytes: &[u8]) -> usize {
        self.image.load(start, bytes)
    }

    /// Set every byte of `range` without notifying anyone.
    pub fn fill(&mut self, range: RangeInclusive<u16>, value: u8) {
        self.image.fill(range, value);
    }

    /// Copy of `len` bytes starting at `start`.
    pub fn slice(&self, start: u16, len: usize) -> Vec<u8> {
        self.image.slice(start, len)
    }

    /// Range watched by a registration.
    pub fn range_of(&self, id: ObserverId) -> Option<RangeInclusive<u16>> {
        self.subscriptions.get(id.0).map(|s| s.range.clone())
    }

    /// Borrow a registered observer as its concrete type.
    pub fn observer<T: WriteObserver>(&self, id: ObserverId) -> Option<&T> {
        self.subscriptions
            .get(id.0)
            .and_then(|s| s.observer.as_any().downcast_ref::<T>())
    }

    /// Mutably borrow a registered observer as its concrete type.
    pub fn observer_mut<T: WriteObserver>(&mut self, id: ObserverId) -> Option<&mut T> {
        self.subscriptions
            .get_mut(id.0)
            .and_then(|s| s.observer.as_any_mut().downcast_mut::<T>())
    }

    fn dispatch(&mut self, address: u16, value: u8) {
        for (index, subscription) in self.subscriptions.iter_mut().enumerate() {
            if !subscription.range.contains(&address) {
                continue;
            }
            let write = BusWrite {
                address,
                offset: address - subscription.range.start(),
                value,
            };
            if let Err(err) = subscription.observer.on_write(write) {
                log::debug!("observer {index} dropped write to 0x{address:04X}: {err}");
            }
        }
    }
}

impl Default for ObservableMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ObservableMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let ranges: Vec<_> = self.subscriptions.iter().map(|s| s.range.clone()).collect();
        f.debug_struct("ObservableMemory")
            .field("armed", &self.armed)
            .field("ranges", &ranges)
            .finish()
    }
}

impl MemoryBus for ObservableMemory {
    fn read(&self, addr: u16) -> u8 {
        self.image.read(addr)
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.image.write(addr, value);
        if self.armed {
            self.dispatch(addr, value);
        }
    }
}

/// Normalize any `u16` range into an inclusive one, or `None` if it is empty.
fn inclusive<R: RangeBounds<u16>>(range: &R) -> Option<RangeInclusive<u16>> {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.checked_add(1)?,
        Bound::Unbounded => 0x0000,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e,
        Bound::Excluded(&e) => e.checked_sub(1)?,
        Bound::Unbounded => 0xFFFF,
    };
    (start <= end).then_some(start..=end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<(usize, BusWrite)>>>;

    fn recorder(log: &Log, tag: usize) -> impl WriteObserver {
        let log = Arc::clone(log);
        observer_fn(move |write| {
            log.lock().unwrap().push((tag, write));
            Ok(())
        })
    }

    #[test]
    fn test_inclusive_normalization() {
        assert_eq!(inclusive(&(0xF000..0xF800)), Some(0xF000..=0xF7FF));
        assert_eq!(inclusive(&(0xFF00..=0xFFFF)), Some(0xFF00..=0xFFFF));
        assert_eq!(inclusive(&(0x0200..0x0200)), None);
        assert_eq!(inclusive(&(0x0000..0x0000)), None);
        assert_eq!(inclusive(&(..)), Some(0x0000..=0xFFFF));
    }

    #[test]
    fn test_empty_range_rejected() {
        let mut memory = ObservableMemory::new();
        let result = memory.subscribe(0x1000..0x1000, observer_fn(|_| Ok(())));
        assert_eq!(result, Err(ObserverError::EmptyRange));
    }

    #[test]
    fn test_overlapping_observers_fire_in_registration_order() {
        let log = Log::default();
        let mut memory = ObservableMemory::new();
        memory.subscribe(0x1000..0x2000, recorder(&log, 0)).unwrap();
        memory.subscribe(0x1800..=0x1800, recorder(&log, 1)).unwrap();
        memory.subscribe(0x3000..0x4000, recorder(&log, 2)).unwrap();
        memory.arm();

        memory.write(0x1800, 0x55);

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].0, 0);
        assert_eq!(log[0].1.offset, 0x0800);
        assert_eq!(log[1].0, 1);
        assert_eq!(log[1].1.offset, 0x0000);
        assert!(log.iter().all(|(_, w)| w.address == 0x1800 && w.value == 0x55));
    }

    #[test]
    fn test_unarmed_writes_are_silent() {
        let log = Log::default();
        let mut memory = ObservableMemory::new();
        memory.subscribe(0x0000..=0xFFFF, recorder(&log, 0)).unwrap();

        memory.write(0x1234, 0x01);
        memory.load(0x2000, &[1, 2, 3]);
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(memory.read(0x1234), 0x01);

        memory.arm();
        memory.write(0x1234, 0x02);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_failing_observer_does_not_block_others() {
        let log = Log::default();
        let mut memory = ObservableMemory::new();
        memory
            .subscribe(0x0400..0x0500, observer_fn(|_| Err(ObserverError::Failed("boom".into()))))
            .unwrap();
        memory.subscribe(0x0400..0x0500, recorder(&log, 1)).unwrap();
        memory.arm();

        memory.write(0x0410, 0x99);

        assert_eq!(memory.read(0x0410), 0x99);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_observer_downcast() {
        let mut memory = ObservableMemory::new();
        let id = memory.subscribe(0x0200..=0x0200, StatusWatch::new()).unwrap();
        memory.arm();
        memory.write(0x0200, 7);

        let watch = memory.observer_mut::<StatusWatch>(id).unwrap();
        assert_eq!(watch.take_change(), Some(7));
        assert!(memory.observer::<VideoSurface>(id).is_none());
        assert_eq!(memory.range_of(id), Some(0x0200..=0x0200));
    }
}
