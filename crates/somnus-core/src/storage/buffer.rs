use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

extern crate alloc;
use alloc::vec::Vec;

use super::RawSample;
use crate::sensors::Quantity;

type Slots = [Vec<RawSample>; Quantity::COUNT];

/// Raw samples accumulated since the last drain, one slot per quantity.
///
/// A single lock guards every slot. Appends and drains both hold it only for
/// O(1) work (a push or a `mem::take`), so a drain sees exactly the samples
/// appended before it took the lock and no sample can land in two drains.
pub struct SampleBuffer {
    slots: Mutex<CriticalSectionRawMutex, RefCell<Slots>>,
}

impl SampleBuffer {
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new([Vec::new(), Vec::new(), Vec::new(), Vec::new()])),
        }
    }

    /// Append one sample to its quantity's slot.
    pub fn append(&self, sample: RawSample) {
        self.slots.lock(|slots| {
            slots.borrow_mut()[sample.quantity.index()].push(sample);
        });
    }

    /// Append several samples under one lock acquisition.
    ///
    /// Used for devices that measure more than one quantity at once, so a
    /// concurrent drain never observes half of a joint reading.
    pub fn append_all(&self, samples: &[RawSample]) {
        self.slots.lock(|slots| {
            let mut slots = slots.borrow_mut();
            for sample in samples {
                slots[sample.quantity.index()].push(*sample);
            }
        });
    }

    /// Take every pending sample of `quantity`, leaving its slot empty.
    pub fn drain(&self, quantity: Quantity) -> Vec<RawSample> {
        self.slots
            .lock(|slots| core::mem::take(&mut slots.borrow_mut()[quantity.index()]))
    }

    /// Number of samples waiting for the next drain.
    pub fn pending(&self, quantity: Quantity) -> usize {
        self.slots.lock(|slots| slots.borrow()[quantity.index()].len())
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}
