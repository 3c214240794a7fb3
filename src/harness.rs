//! Boot sequence.
//!
//! Mirrors what the board's boot ROM does before handing over to the firmware:
//!
//! 1. Fill memory with NOP (0xEA) and the video region with spaces.
//! 2. Map the video surface (and an optional status watch).
//! 3. Copy the program image to its load address.
//! 4. Write the load address into the reset vector, since the image is built
//!    with its vectors stripped.
//! 5. Reset the CPU and arm the observers.
//!
//! Nothing written before step 5 reaches an observer.

use crate::config::ConfigError;
use crate::cpu::CPU;
use crate::interpreter::RESET_VECTOR;
use crate::memory::ADDRESS_SPACE;
use crate::observers::video::{SCREEN_COLUMNS, SCREEN_ROWS};
use crate::observers::{ObservableMemory, ObserverId, StatusWatch, VideoSurface};

/// First byte of the memory-mapped text screen.
pub const VIDEO_BASE: u16 = 0xF800;

/// Last byte cleared to spaces at power-on.
pub const VIDEO_CLEAR_END: u16 = 0xFCAF;

/// Fill byte for the whole address space at power-on.
const NOP: u8 = 0xEA;

/// Where and what to map at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootOptions {
    pub load_address: u16,
    /// Map a [`VideoSurface`] at [`VIDEO_BASE`].
    pub video: bool,
    /// Map a [`StatusWatch`] on this byte.
    pub watch: Option<u16>,
}

impl Default for BootOptions {
    fn default() -> Self {
        Self {
            load_address: crate::config::DEFAULT_LOAD_ADDRESS,
            video: true,
            watch: None,
        }
    }
}

/// A reset machine plus handles to its observers.
pub struct Machine {
    pub cpu: CPU<ObservableMemory>,
    pub video: Option<ObserverId>,
    pub watch: Option<ObserverId>,
}

/// Build and reset a machine running `image`.
pub fn boot(image: &[u8], options: &BootOptions) -> Result<Machine, ConfigError> {
    let load_address = options.load_address;
    if load_address as usize + image.len() > ADDRESS_SPACE {
        return Err(ConfigError::ImageTooLarge {
            len: image.len(),
            load_address,
        });
    }

    let mut memory = ObservableMemory::new();
    memory.fill(0x0000..=0xFFFF, NOP);
    memory.fill(VIDEO_BASE..=VIDEO_CLEAR_END, b' ');

    let video = if options.video {
        let len = (SCREEN_ROWS * SCREEN_COLUMNS) as u16;
        Some(memory.subscribe(
            VIDEO_BASE..VIDEO_BASE + len,
            VideoSurface::new(SCREEN_ROWS, SCREEN_COLUMNS),
        )?)
    } else {
        None
    };
    let watch = options
        .watch
        .map(|address| memory.subscribe(address..=address, StatusWatch::new()))
        .transpose()?;

    memory.load(load_address, image);
    memory.load(RESET_VECTOR, &load_address.to_le_bytes());

    let cpu = CPU::new(memory);
    let mut machine = Machine { cpu, video, watch };
    machine.cpu.memory_mut().arm();

    log::info!(
        "booted {} bytes at 0x{:04X}, PC=0x{:04X}",
        image.len(),
        load_address,
        machine.cpu.pc()
    );
    Ok(machine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBus;

    #[test]
    fn test_boot_layout() {
        let machine = boot(&[0xA9, 0x61], &BootOptions::default()).unwrap();
        let memory = machine.cpu.memory();

        assert_eq!(machine.cpu.pc(), 0xC000);
        assert_eq!(memory.read(0xC000), 0xA9);
        assert_eq!(memory.read(0xC002), NOP);
        assert_eq!(memory.read(0x0000), NOP);
        assert_eq!(memory.read(VIDEO_BASE), b' ');
        assert_eq!(memory.read(VIDEO_CLEAR_END), b' ');
        assert_eq!(memory.read(VIDEO_CLEAR_END + 1), NOP);
        assert_eq!(memory.read_word(RESET_VECTOR), 0xC000);
        assert!(memory.is_armed());
        assert!(machine.video.is_some());
    }

    #[test]
    fn test_image_too_large() {
        let image = vec![0u8; 0x4001];
        let result = boot(&image, &BootOptions::default());
        assert!(matches!(result, Err(ConfigError::ImageTooLarge { len: 0x4001, .. })));
    }

    #[test]
    fn test_boot_without_video_maps_watch() {
        let options = BootOptions {
            load_address: 0x8000,
            video: false,
            watch: Some(0x0300),
        };
        let mut machine = boot(&[], &options).unwrap();
        assert_eq!(machine.cpu.pc(), 0x8000);
        assert!(machine.video.is_none());

        let id = machine.watch.unwrap();
        machine.cpu.memory_mut().write(0x0300, 2);
        let watch = machine.cpu.memory_mut().observer_mut::<StatusWatch>(id).unwrap();
        assert_eq!(watch.take_change(), Some(2));
    }
}
