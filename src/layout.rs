//! Extraction of `(identifier, phone)` pairs from contact tables whose phone
//! columns follow one of several layouts.
//!
//! Each supported layout is a [`LayoutDescriptor`]: a name plus a function
//! that locates the area-code/number column pairs it understands. Detection
//! runs every descriptor in [`LAYOUTS`] order and unions what they extract,
//! so a file exposing more than one layout contributes all of its phones.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::Table;
use crate::phone::normalize_pair;

/// Column holding the contact's unique key when none is configured.
pub const DEFAULT_ID_COLUMN: &str = "cpf";

/// Number of numbered `dddNN`/`telefoneNN` slots checked.
pub const SLOT_COUNT: usize = 10;

const AREA_CODE_MARKER: &str = "ddd";
const NUMBER_MARKERS: [&str; 2] = ["numero", "tel"];

/// One contact phone, keyed by the contact identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ContactPhone {
    pub id: String,
    pub phone: String,
}

/// An area-code column and the number column it pairs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhoneColumns {
    pub area_code: usize,
    pub number: usize,
}

/// A contact layout the detector knows how to read.
#[derive(Debug, Clone, Copy)]
pub struct LayoutDescriptor {
    pub name: &'static str,
    /// Returns the column pairs of this layout present in the header, in
    /// extraction order. An empty result means the layout does not apply.
    pub locate: fn(&[String]) -> Vec<PhoneColumns>,
}

/// Supported layouts, in the order they are tried.
pub const LAYOUTS: &[LayoutDescriptor] = &[
    LayoutDescriptor {
        name: "indexed-slots",
        locate: locate_indexed_slots,
    },
    LayoutDescriptor {
        name: "single-pair",
        locate: locate_single_pair,
    },
];

/// Names of the columns a layout matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutMatch {
    pub layout: &'static str,
    pub pairs: Vec<(String, String)>,
}

/// Result of running every layout over one contact table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutDetection {
    /// Deduplicated phones, ordered by identifier then phone.
    pub phones: Vec<ContactPhone>,
    pub matches: Vec<LayoutMatch>,
}

impl LayoutDetection {
    /// Whether at least one layout applied to the table.
    pub fn is_recognized(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// `ddd01`/`telefone01` through `ddd10`/`telefone10`. Slots with only one
/// half present are ignored.
pub fn locate_indexed_slots(columns: &[String]) -> Vec<PhoneColumns> {
    (1..=SLOT_COUNT)
        .filter_map(|slot| {
            let area_code = position_exact(columns, &format!("ddd{slot:02}"))?;
            let number = position_exact(columns, &format!("telefone{slot:02}"))?;
            Some(PhoneColumns { area_code, number })
        })
        .collect()
}

/// The first column whose name contains `ddd` paired with the first column
/// whose name contains `numero` or `tel`.
///
/// When several columns contain a marker, the leftmost one wins. This can
/// pick a slot column (`telefone01` contains `tel`) when a file also carries
/// the indexed layout; the union with that layout then deduplicates.
pub fn locate_single_pair(columns: &[String]) -> Vec<PhoneColumns> {
    let area_code = columns
        .iter()
        .position(|column| folded(column).contains(AREA_CODE_MARKER));
    let number = columns.iter().position(|column| {
        let column = folded(column);
        NUMBER_MARKERS.iter().any(|marker| column.contains(marker))
    });
    match (area_code, number) {
        (Some(area_code), Some(number)) => vec![PhoneColumns { area_code, number }],
        _ => Vec::new(),
    }
}

/// Extracts every contact phone the known layouts can find in `table`.
///
/// Without the identifier column no layout applies and the detection comes
/// back unrecognized.
pub fn detect_contact_phones(table: &Table, id_column: &str) -> LayoutDetection {
    let Some(id_idx) = position_exact(&table.columns, id_column) else {
        return LayoutDetection::default();
    };

    let mut phones = BTreeSet::new();
    let mut matches = Vec::new();

    for descriptor in LAYOUTS {
        let pairs = (descriptor.locate)(&table.columns);
        if pairs.is_empty() {
            continue;
        }
        for pair in &pairs {
            extract_pair(table, id_idx, *pair, &mut phones);
        }
        matches.push(LayoutMatch {
            layout: descriptor.name,
            pairs: pairs
                .iter()
                .map(|pair| {
                    (
                        table.columns[pair.area_code].clone(),
                        table.columns[pair.number].clone(),
                    )
                })
                .collect(),
        });
    }

    LayoutDetection {
        phones: phones.into_iter().collect(),
        matches,
    }
}

fn extract_pair(
    table: &Table,
    id_idx: usize,
    pair: PhoneColumns,
    phones: &mut BTreeSet<ContactPhone>,
) {
    for row in 0..table.len() {
        let area_code = table.cell(row, pair.area_code).as_text();
        let number = table.cell(row, pair.number).as_text();
        if let Some(phone) = normalize_pair(&area_code, &number) {
            phones.insert(ContactPhone {
                id: table.cell(row, id_idx).as_text().trim().to_string(),
                phone,
            });
        }
    }
}

fn position_exact(columns: &[String], name: &str) -> Option<usize> {
    let name = folded(name);
    columns.iter().position(|column| folded(column) == name)
}

fn folded(column: &str) -> String {
    column.trim().to_lowercase()
}
