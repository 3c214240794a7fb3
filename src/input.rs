//! Keyboard delivery into the guest.
//!
//! Keys cross from the operator flow on an unbounded channel. Once per
//! controller iteration [`InputBridge::try_deliver`] checks the guest mailbox:
//!
//! | Address    | Meaning                                        |
//! |------------|------------------------------------------------|
//! | `flag`     | 0 = firmware ready for a key, 1 = key pending  |
//! | `flag + 1` | key code                                       |
//!
//! When the flag is clear and a key is waiting, the code is written, the flag
//! is set, and an NMI tells the firmware to pick it up. The firmware clears the
//! flag after consuming the data byte.

use crossbeam_channel::{Receiver, TryRecvError};

use crate::interpreter::{status, Interpreter, NMI_VECTOR};
use crate::memory::MemoryBus;

/// Cycles charged for the interrupt entry sequence.
pub const NMI_CYCLES: u64 = 7;

/// Raise a non-maskable interrupt on `cpu`.
///
/// Pushes PC (high byte first) and the status byte with B cleared and bit 5
/// set, sets I in the live status register, loads PC from the NMI vector and
/// charges 7 cycles. The live B flag is left as it was.
pub fn inject_nmi<I: Interpreter + ?Sized>(cpu: &mut I) {
    let regs = cpu.registers();
    cpu.push_word(regs.pc);
    cpu.push_byte((regs.status & !status::BREAK) | status::UNUSED);
    cpu.set_status(regs.status | status::INTERRUPT);
    let handler = cpu.word_at(NMI_VECTOR);
    cpu.set_pc(handler);
    cpu.add_cycles(NMI_CYCLES);
}

/// Consumer side of the key channel, bound to a guest mailbox.
#[derive(Debug)]
pub struct InputBridge {
    keys: Receiver<u8>,
    flag: u16,
    delivered: u64,
}

impl InputBridge {
    /// Bridge keys from `keys` into the mailbox whose flag byte is at `flag`.
    pub fn new(keys: Receiver<u8>, flag: u16) -> Self {
        Self {
            keys,
            flag,
            delivered: 0,
        }
    }

    /// Address of the mailbox flag byte.
    pub fn flag_address(&self) -> u16 {
        self.flag
    }

    /// Address of the mailbox data byte.
    pub fn data_address(&self) -> u16 {
        self.flag.wrapping_add(1)
    }

    /// Number of keys handed to the guest so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Deliver the next pending key if the guest mailbox is free.
    ///
    /// Returns the delivered code. A busy mailbox or an empty queue is a no-op:
    /// the channel is only read once the flag is known to be clear, so a key is
    /// never taken off the queue without being delivered.
    pub fn try_deliver<I: Interpreter + ?Sized>(&mut self, cpu: &mut I) -> Option<u8> {
        if cpu.bus().read(self.flag) != 0 {
            return None;
        }
        let code = match self.keys.try_recv() {
            Ok(code) => code,
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => return None,
        };

        let data = self.data_address();
        let bus = cpu.bus_mut();
        bus.write(data, code);
        bus.write(self.flag, 1);
        inject_nmi(cpu);

        self.delivered += 1;
        log::debug!("delivered key 0x{code:02X} via mailbox 0x{:04X}", self.flag);
        Some(code)
    }
}
