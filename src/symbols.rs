//! Symbol table for address symbolication and breakpoint resolution.
//!
//! The table is built once from the label listing the assembler emits alongside
//! the ROM image:
//!
//! ```text
//! al 00C23D .do_PUSH1
//! al 00C239 .__word_12
//! al 00C239 .h_PUSH1
//! ```
//!
//! Labels are stored without their leading `.`. Assembler bookkeeping labels
//! (`__word_*`, `h_*`) are discarded at load time.
//!
//! Lookups by address use floor semantics: a label names the region from its
//! address up to the next label.

use std::path::Path;

use thiserror::Error;

/// Label prefixes the assembler uses for its own bookkeeping.
const INTERNAL_PREFIXES: [&str; 2] = ["__word_", "h_"];

/// Prefix of local labels, which never start a profiling scope.
const LOCAL_PREFIX: char = '@';

#[derive(Debug, Error)]
pub enum SymbolError {
    #[error("failed to read symbol file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: expected `<kind> <hex-address> .<label>`, found `{text}`")]
    Malformed { line: usize, text: String },

    #[error("no symbol at or below 0x{0:04X}")]
    BelowLowest(u16),

    #[error("unknown symbol `{0}`")]
    UnknownLabel(String),
}

/// A single `(address, name)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub address: u16,
    pub name: String,
}

/// Address-ordered symbol index with floor lookup.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    /// Symbols in listing order, used for name lookups.
    listing: Vec<Symbol>,
    /// One entry per distinct address, ascending. When several labels share an
    /// address, the one listed last names it.
    by_address: Vec<(u16, usize)>,
}

impl SymbolTable {
    /// Read and parse a label listing from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SymbolError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SymbolError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse a label listing. Blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self, SymbolError> {
        let mut symbols = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let malformed = || SymbolError::Malformed {
                line: index + 1,
                text: line.to_string(),
            };

            let mut fields = line.split_whitespace();
            let (Some(_kind), Some(address), Some(label), None) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                return Err(malformed());
            };
            let address = u32::from_str_radix(address, 16)
                .ok()
                .and_then(|a| u16::try_from(a).ok())
                .ok_or_else(malformed)?;
            let name = label.strip_prefix('.').unwrap_or(label);
            if name.is_empty() {
                return Err(malformed());
            }
            if INTERNAL_PREFIXES.iter().any(|p| name.starts_with(p)) {
                continue;
            }
            symbols.push(Symbol {
                address,
                name: name.to_string(),
            });
        }
        Ok(Self::from_symbols(symbols))
    }

    /// Build a table from already-parsed symbols, keeping their order.
    pub fn from_symbols(listing: Vec<Symbol>) -> Self {
        let mut by_address: Vec<(u16, usize)> = Vec::with_capacity(listing.len());
        let mut order: Vec<usize> = (0..listing.len()).collect();
        // Stable sort keeps listing order among equal addresses.
        order.sort_by_key(|&i| listing[i].address);
        for index in order {
            let address = listing[index].address;
            match by_address.last_mut() {
                Some(last) if last.0 == address => last.1 = index,
                _ => by_address.push((address, index)),
            }
        }
        Self {
            listing,
            by_address,
        }
    }

    pub fn len(&self) -> usize {
        self.listing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listing.is_empty()
    }

    /// All symbols in listing order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.listing
    }

    /// Label of the greatest stored address at or below `address`.
    pub fn label_for(&self, address: u16) -> Result<&str, SymbolError> {
        let slot = self.by_address.partition_point(|&(a, _)| a <= address);
        if slot == 0 {
            return Err(SymbolError::BelowLowest(address));
        }
        let (_, index) = self.by_address[slot - 1];
        Ok(&self.listing[index].name)
    }

    /// Address of the first listed symbol named `label`.
    ///
    /// If several symbols share the label, the first one in the listing wins.
    pub fn address_for(&self, label: &str) -> Result<u16, SymbolError> {
        self.listing
            .iter()
            .find(|s| s.name == label)
            .map(|s| s.address)
            .ok_or_else(|| SymbolError::UnknownLabel(label.to_string()))
    }

    /// Enclosing scope and sub-label of `address`.
    ///
    /// The scope is the floor label ignoring local (`@`) labels; the sub-label is
    /// the plain floor label, or empty when it is the scope itself.
    pub fn scope_for(&self, address: u16) -> Result<(&str, &str), SymbolError> {
        let sublabel = self.label_for(address)?;
        let slot = self.by_address.partition_point(|&(a, _)| a <= address);
        let scope = self.by_address[..slot]
            .iter()
            .rev()
            .map(|&(_, index)| self.listing[index].name.as_str())
            .find(|name| !name.starts_with(LOCAL_PREFIX))
            .ok_or(SymbolError::BelowLowest(address))?;
        if scope == sublabel {
            Ok((scope, ""))
        } else {
            Ok((scope, sublabel))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
al 00C000 .RESET
al 00C010 .__word_1
al 00C010 .h_DUP
al 00C010 .do_DUP
al 00C014 .@loop
al 00C020 .do_BREAK
";

    #[test]
    fn test_internal_labels_are_dropped() {
        let table = SymbolTable::parse(LISTING).unwrap();
        let names: Vec<_> = table.symbols().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["RESET", "do_DUP", "@loop", "do_BREAK"]);
    }

    #[test]
    fn test_floor_lookup() {
        let table = SymbolTable::parse(LISTING).unwrap();
        assert_eq!(table.label_for(0xC000).unwrap(), "RESET");
        assert_eq!(table.label_for(0xC00F).unwrap(), "RESET");
        assert_eq!(table.label_for(0xC012).unwrap(), "do_DUP");
        assert_eq!(table.label_for(0xFFFF).unwrap(), "do_BREAK");
        assert!(matches!(
            table.label_for(0xBFFF),
            Err(SymbolError::BelowLowest(0xBFFF))
        ));
    }

    #[test]
    fn test_scope_skips_local_labels() {
        let table = SymbolTable::parse(LISTING).unwrap();
        assert_eq!(table.scope_for(0xC016).unwrap(), ("do_DUP", "@loop"));
        assert_eq!(table.scope_for(0xC011).unwrap(), ("do_DUP", ""));
    }

    #[test]
    fn test_duplicate_label_resolves_to_first() {
        let table = SymbolTable::parse("al 001000 .X\nal 002000 .X\n").unwrap();
        assert_eq!(table.address_for("X").unwrap(), 0x1000);
        assert!(matches!(
            table.address_for("Y"),
            Err(SymbolError::UnknownLabel(ref l)) if l == "Y"
        ));
    }

    #[test]
    fn test_shared_address_named_by_last_listed() {
        let table = SymbolTable::parse("al 001000 .first\nal 001000 .second\n").unwrap();
        assert_eq!(table.label_for(0x1000).unwrap(), "second");
        assert_eq!(table.address_for("first").unwrap(), 0x1000);
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(
            SymbolTable::parse("al 00C000\n"),
            Err(SymbolError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            SymbolTable::parse("al 00C000 .A\nal XYZ .B\n"),
            Err(SymbolError::Malformed { line: 2, .. })
        ));
        assert!(matches!(
            SymbolTable::parse("al 010000 .TOO_HIGH\n"),
            Err(SymbolError::Malformed { line: 1, .. })
        ));
    }
}
