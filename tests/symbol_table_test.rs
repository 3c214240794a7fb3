//! Floor lookup and listing parsing through the public API.

use cerbemu::{Symbol, SymbolError, SymbolTable};
use proptest::prelude::*;

fn table(entries: &[(u16, &str)]) -> SymbolTable {
    SymbolTable::from_symbols(
        entries
            .iter()
            .map(|&(address, name)| Symbol {
                address,
                name: name.to_string(),
            })
            .collect(),
    )
}

#[test]
fn test_floor_between_two_labels() {
    let symbols = table(&[(0x0100, "A"), (0x0200, "B")]);

    assert_eq!(symbols.label_for(0x01FF).unwrap(), "A");
    assert_eq!(symbols.label_for(0x0200).unwrap(), "B");
    assert_eq!(symbols.label_for(0xFFFF).unwrap(), "B");
    assert!(matches!(
        symbols.label_for(0x00FF),
        Err(SymbolError::BelowLowest(0x00FF))
    ));
}

#[test]
fn test_listing_order_does_not_matter() {
    let symbols = SymbolTable::parse("al 00C200 .late\nal 00C100 .early\n").unwrap();

    assert_eq!(symbols.label_for(0xC150).unwrap(), "early");
    assert_eq!(symbols.label_for(0xC250).unwrap(), "late");
}

#[test]
fn test_malformed_line_reports_position() {
    let err = SymbolTable::parse("al 00C000 .RESET\nnot a label line here\n").unwrap_err();

    assert!(matches!(err, SymbolError::Malformed { line: 2, .. }));
}

#[test]
fn test_missing_file() {
    let err = SymbolTable::load("/nonexistent/forth-emu.lbl").unwrap_err();

    assert!(matches!(err, SymbolError::Io { .. }));
}

proptest! {
    /// `label_for(a)` names the greatest address <= a, or fails below every label.
    #[test]
    fn prop_floor_matches_linear_scan(
        addresses in prop::collection::btree_set(any::<u16>(), 1..32),
        query in any::<u16>(),
    ) {
        let entries: Vec<(u16, String)> =
            addresses.iter().map(|a| (*a, format!("L{a:04X}"))).collect();
        let symbols = SymbolTable::from_symbols(
            entries
                .iter()
                .map(|(address, name)| Symbol { address: *address, name: name.clone() })
                .collect(),
        );

        let expected = addresses.range(..=query).next_back();
        match (symbols.label_for(query), expected) {
            (Ok(label), Some(floor)) => prop_assert_eq!(label, format!("L{floor:04X}")),
            (Err(SymbolError::BelowLowest(a)), None) => prop_assert_eq!(a, query),
            (got, want) => prop_assert!(false, "got {:?}, expected floor {:?}", got, want),
        }
    }

    /// Every listed name resolves back to its address.
    #[test]
    fn prop_address_for_inverts_listing(
        addresses in prop::collection::btree_set(any::<u16>(), 1..32),
    ) {
        let listing: String = addresses
            .iter()
            .map(|a| format!("al {a:06X} .L{a:04X}\n"))
            .collect();
        let symbols = SymbolTable::parse(&listing).unwrap();

        prop_assert_eq!(symbols.len(), addresses.len());
        for a in &addresses {
            prop_assert_eq!(symbols.address_for(&format!("L{a:04X}")).unwrap(), *a);
        }
    }
}
