//! Startup configuration.
//!
//! Everything that can go wrong before the emulation loop starts is a
//! [`ConfigError`] and is fatal: a missing ROM, a bad symbol file, or a
//! breakpoint or mailbox symbol that does not resolve.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::observers::ObserverError;
use crate::symbols::{SymbolError, SymbolTable};

/// Breakpoint symbol that is always checked, whatever else is configured.
pub const FALLBACK_BREAKPOINT: &str = "do_BREAK";

/// Status byte watched when none is configured.
pub const DEFAULT_WATCH: &str = "MODE";

/// Default load address of the program image.
pub const DEFAULT_LOAD_ADDRESS: u16 = 0xC000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read ROM image {path}: {source}")]
    ReadRom {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{len}-byte image does not fit at 0x{load_address:04X}")]
    ImageTooLarge { len: usize, load_address: u16 },

    #[error("invalid address `{0}`")]
    InvalidAddress(String),

    #[error("{role} symbol `{name}` is not defined")]
    UnresolvedSymbol { role: &'static str, name: String },

    #[error(transparent)]
    Symbols(#[from] SymbolError),

    #[error(transparent)]
    Observer(#[from] ObserverError),
}

/// Everything needed to boot an interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Raw program image, loaded without header or relocation.
    pub rom: PathBuf,
    pub load_address: u16,
    /// Assembler label listing.
    pub symbols: PathBuf,
    /// Breakpoint symbol. [`FALLBACK_BREAKPOINT`] is checked as well.
    pub breakpoint: String,
    /// Symbol (or address) of the mailbox flag byte; data is at the next address.
    pub mailbox: String,
    /// Symbol (or address) of a status byte whose changes refresh the display.
    /// `None` watches [`DEFAULT_WATCH`] if the listing defines it.
    pub watch: Option<String>,
    /// How long an idle Step-mode iteration may block on the command channel.
    /// `None` spins.
    pub idle_wait: Option<Duration>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            rom: PathBuf::from("forth-emu.bin"),
            load_address: DEFAULT_LOAD_ADDRESS,
            symbols: PathBuf::from("forth-emu.lbl"),
            breakpoint: FALLBACK_BREAKPOINT.to_string(),
            mailbox: "MAILFLAG".to_string(),
            watch: None,
            idle_wait: None,
        }
    }
}

impl HarnessConfig {
    pub fn read_image(&self) -> Result<Vec<u8>, ConfigError> {
        read_image(&self.rom)
    }

    pub fn load_symbols(&self) -> Result<SymbolTable, ConfigError> {
        Ok(SymbolTable::load(&self.symbols)?)
    }

    /// Resolve the configured breakpoint plus the fallback.
    ///
    /// The configured symbol must exist. The fallback is skipped with a
    /// warning when the listing does not define it.
    pub fn breakpoints(&self, symbols: &SymbolTable) -> Result<Vec<u16>, ConfigError> {
        let mut addresses = vec![resolve(symbols, &self.breakpoint, "breakpoint")?];
        if self.breakpoint != FALLBACK_BREAKPOINT {
            match symbols.address_for(FALLBACK_BREAKPOINT) {
                Ok(address) => addresses.push(address),
                Err(_) => log::warn!("fallback breakpoint `{FALLBACK_BREAKPOINT}` is not defined"),
            }
        }
        Ok(addresses)
    }

    pub fn mailbox_address(&self, symbols: &SymbolTable) -> Result<u16, ConfigError> {
        resolve(symbols, &self.mailbox, "mailbox")
    }

    /// Resolve the status watch.
    ///
    /// A configured watch must resolve. Without one, [`DEFAULT_WATCH`] is used
    /// when defined and otherwise skipped with a warning.
    pub fn watch_address(&self, symbols: &SymbolTable) -> Result<Option<u16>, ConfigError> {
        if let Some(name) = &self.watch {
            return resolve(symbols, name, "watch").map(Some);
        }
        match symbols.address_for(DEFAULT_WATCH) {
            Ok(address) => Ok(Some(address)),
            Err(_) => {
                log::warn!("status watch `{DEFAULT_WATCH}` is not defined");
                Ok(None)
            }
        }
    }
}

/// Read a raw program image.
pub fn read_image(path: &Path) -> Result<Vec<u8>, ConfigError> {
    std::fs::read(path).map_err(|source| ConfigError::ReadRom {
        path: path.display().to_string(),
        source,
    })
}

/// Parse an address written as `0xC000`, `$C000` or decimal `49152`.
pub fn parse_address(text: &str) -> Result<u16, ConfigError> {
    let text = text.trim();
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16)
    } else if let Some(hex) = text.strip_prefix('$') {
        u16::from_str_radix(hex, 16)
    } else {
        text.parse::<u16>()
    };
    parsed.map_err(|_| ConfigError::InvalidAddress(text.to_string()))
}

/// Resolve `name` as a symbol, or failing that as a literal address.
pub fn resolve(symbols: &SymbolTable, name: &str, role: &'static str) -> Result<u16, ConfigError> {
    symbols
        .address_for(name)
        .or_else(|_| parse_address(name))
        .map_err(|_| ConfigError::UnresolvedSymbol {
            role,
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols() -> SymbolTable {
        SymbolTable::parse(
            "al 00C000 .RESET\nal 000200 .MAILFLAG\nal 00C100 .do_BREAK\nal 00C200 .do_DUP\n",
        )
        .unwrap()
    }

    #[test]
    fn test_parse_address_forms() {
        assert_eq!(parse_address("0xC000").unwrap(), 0xC000);
        assert_eq!(parse_address("$c000").unwrap(), 0xC000);
        assert_eq!(parse_address("49152").unwrap(), 0xC000);
        assert!(matches!(parse_address("0x10000"), Err(ConfigError::InvalidAddress(_))));
        assert!(parse_address("RESET").is_err());
    }

    #[test]
    fn test_breakpoints_include_fallback() {
        let config = HarnessConfig {
            breakpoint: "do_DUP".to_string(),
            ..HarnessConfig::default()
        };
        assert_eq!(config.breakpoints(&symbols()).unwrap(), vec![0xC200, 0xC100]);

        let default = HarnessConfig::default();
        assert_eq!(default.breakpoints(&symbols()).unwrap(), vec![0xC100]);
    }

    #[test]
    fn test_unresolved_breakpoint_is_fatal() {
        let config = HarnessConfig {
            breakpoint: "do_NOPE".to_string(),
            ..HarnessConfig::default()
        };
        let err = config.breakpoints(&symbols()).unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedSymbol { role: "breakpoint", .. }));
    }

    #[test]
    fn test_mailbox_and_watch_resolution() {
        let config = HarnessConfig {
            watch: Some("$0300".to_string()),
            ..HarnessConfig::default()
        };
        assert_eq!(config.mailbox_address(&symbols()).unwrap(), 0x0200);
        assert_eq!(config.watch_address(&symbols()).unwrap(), Some(0x0300));
        assert_eq!(HarnessConfig::default().watch_address(&symbols()).unwrap(), None);
    }

    #[test]
    fn test_watch_defaults_to_mode_symbol() {
        let symbols = SymbolTable::parse("al 00C000 .RESET
al 000010 .MODE
").unwrap();
        let default = HarnessConfig::default();
        assert_eq!(default.watch_address(&symbols).unwrap(), Some(0x0010));

        let explicit = HarnessConfig {
            watch: Some("STATE".to_string()),
            ..HarnessConfig::default()
        };
        let err = explicit.watch_address(&symbols).unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedSymbol { role: "watch", .. }));
    }

    #[test]
    fn test_missing_rom() {
        let err = read_image(Path::new("/nonexistent/forth.bin")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/forth.bin"));
    }
}
