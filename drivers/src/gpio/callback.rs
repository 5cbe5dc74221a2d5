//! Callback registry.
//!
//! A fixed arena of slots addressed by generation-checked handles. Removing
//! an entry bumps its slot's generation, so a handle kept past removal can
//! never reach whatever is registered in the slot afterwards. Dispatch order
//! is registration order.

use super::error::{GpioError, GpioResult};
use super::irq::EventSnapshot;

/// Callback slots per controller.
pub const GPIO_CALLBACK_SLOTS: usize = 16;

/// Handler invoked outside the controller guard, once per dispatch pass in
/// which one of its pins fired.
pub trait GpioCallback: Sync {
    fn on_event(&self, event: &EventSnapshot);
}

impl<F> GpioCallback for F
where
    F: Fn(&EventSnapshot) + Sync,
{
    fn on_event(&self, event: &EventSnapshot) {
        self(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle {
    slot: u16,
    generation: u32,
}

impl CallbackHandle {
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot as usize
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Clone, Copy)]
struct CallbackEntry {
    bank: usize,
    bits: u32,
    handler: &'static dyn GpioCallback,
}

#[derive(Clone, Copy)]
struct Slot {
    generation: u32,
    entry: Option<CallbackEntry>,
}

impl Slot {
    const EMPTY: Self = Self {
        generation: 0,
        entry: None,
    };
}

/// Handlers selected for one dispatch pass, copied out of the registry so
/// they can run with no lock held.
pub(crate) struct DispatchList {
    handlers: [Option<&'static dyn GpioCallback>; GPIO_CALLBACK_SLOTS],
    len: usize,
}

impl DispatchList {
    pub(crate) fn iter(&self) -> impl Iterator<Item = &'static dyn GpioCallback> + '_ {
        self.handlers[..self.len].iter().flatten().copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

pub(crate) struct CallbackRegistry {
    slots: [Slot; GPIO_CALLBACK_SLOTS],
    /// Occupied slot indices in registration order.
    order: [u16; GPIO_CALLBACK_SLOTS],
    len: usize,
}

impl CallbackRegistry {
    pub(crate) const fn new() -> Self {
        Self {
            slots: [Slot::EMPTY; GPIO_CALLBACK_SLOTS],
            order: [0; GPIO_CALLBACK_SLOTS],
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn add(
        &mut self,
        bank: usize,
        bits: u32,
        handler: &'static dyn GpioCallback,
    ) -> GpioResult<CallbackHandle> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.entry.is_none())
            .ok_or(GpioError::RegistryFull)?;

        let slot = &mut self.slots[index];
        slot.entry = Some(CallbackEntry {
            bank,
            bits,
            handler,
        });
        self.order[self.len] = index as u16;
        self.len += 1;

        Ok(CallbackHandle {
            slot: index as u16,
            generation: slot.generation,
        })
    }

    pub(crate) fn remove(&mut self, handle: CallbackHandle) -> GpioResult {
        let slot = self
            .slots
            .get_mut(handle.slot())
            .filter(|slot| slot.generation == handle.generation && slot.entry.is_some())
            .ok_or(GpioError::NotRegistered)?;

        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);

        if let Some(pos) = self.order[..self.len]
            .iter()
            .position(|&index| index == handle.slot)
        {
            self.order.copy_within(pos + 1..self.len, pos);
            self.len -= 1;
        }
        Ok(())
    }

    /// Handlers whose mask intersects `event`, in registration order.
    pub(crate) fn collect(&self, event: &EventSnapshot) -> DispatchList {
        let mut list = DispatchList {
            handlers: [None; GPIO_CALLBACK_SLOTS],
            len: 0,
        };

        for &index in &self.order[..self.len] {
            if let Some(entry) = self.slots[index as usize].entry {
                if entry.bank == event.bank && entry.bits & event.fired != 0 {
                    list.handlers[list.len] = Some(entry.handler);
                    list.len += 1;
                }
            }
        }
        list
    }
}
