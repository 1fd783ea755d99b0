// SPDX-License-Identifier: Apache-2.0

//! Named access to attestation report fields.
//!
//! Policies reference report fields by the stable names listed here
//! rather than by offset. Every selectable field resolves to the raw
//! little-endian bytes of the encoded report, so reference values can be
//! compared without re-encoding.
//!
//! The catalog is authored statically against the wire layout; the
//! layout test below re-derives every offset from the field widths to
//! guard against drift.

use crate::{error::FieldError, report::AttestationReport};

use std::{borrow::Cow, collections::HashMap};

use lazy_static::lazy_static;

/// Byte offset of the packed KEY_INFO word within the encoded report.
const KEY_INFO_OFFSET: usize = 0x48;

/// How a named field maps onto the encoded report.
#[derive(Clone, Copy, Debug)]
enum FieldSelector {
    /// A contiguous little-endian byte range.
    Bytes { offset: usize, len: usize },

    /// A sub-field of the packed KEY_INFO word. Selection widens the
    /// extracted bits back to a little-endian u32 so that packed fields
    /// compare like any other field.
    KeyInfoBits { shift: u32, mask: u32 },
}

/// Field name, selector pairs for every selectable report field.
///
/// Reserved regions and the signature are deliberately absent: the
/// signature is checked cryptographically, never compared byte-wise.
const FIELD_TABLE: &[(&str, FieldSelector)] = &[
    ("VERSION", FieldSelector::Bytes { offset: 0x000, len: 4 }),
    ("GUEST_SVN", FieldSelector::Bytes { offset: 0x004, len: 4 }),
    ("POLICY", FieldSelector::Bytes { offset: 0x008, len: 8 }),
    ("FAMILY_ID", FieldSelector::Bytes { offset: 0x010, len: 16 }),
    ("IMAGE_ID", FieldSelector::Bytes { offset: 0x020, len: 16 }),
    ("VMPL", FieldSelector::Bytes { offset: 0x030, len: 4 }),
    ("SIGNATURE_ALGO", FieldSelector::Bytes { offset: 0x034, len: 4 }),
    ("CURRENT_TCB", FieldSelector::Bytes { offset: 0x038, len: 8 }),
    ("PLATFORM_INFO", FieldSelector::Bytes { offset: 0x040, len: 8 }),
    ("AUTHOR_KEY_EN", FieldSelector::KeyInfoBits { shift: 0, mask: 0b1 }),
    ("MASK_CHIP_KEY", FieldSelector::KeyInfoBits { shift: 1, mask: 0b1 }),
    ("SIGNING_KEY", FieldSelector::KeyInfoBits { shift: 2, mask: 0b111 }),
    ("REPORT_DATA", FieldSelector::Bytes { offset: 0x050, len: 64 }),
    ("MEASUREMENT", FieldSelector::Bytes { offset: 0x090, len: 48 }),
    ("HOST_DATA", FieldSelector::Bytes { offset: 0x0c0, len: 32 }),
    ("ID_KEY_DIGEST", FieldSelector::Bytes { offset: 0x0e0, len: 48 }),
    ("AUTHOR_KEY_DIGEST", FieldSelector::Bytes { offset: 0x110, len: 48 }),
    ("REPORT_ID", FieldSelector::Bytes { offset: 0x140, len: 32 }),
    ("REPORT_ID_MA", FieldSelector::Bytes { offset: 0x160, len: 32 }),
    ("REPORTED_TCB", FieldSelector::Bytes { offset: 0x180, len: 8 }),
    ("CHIP_ID", FieldSelector::Bytes { offset: 0x1a0, len: 64 }),
    ("COMMITTED_TCB", FieldSelector::Bytes { offset: 0x1e0, len: 8 }),
    ("CURRENT_BUILD", FieldSelector::Bytes { offset: 0x1e8, len: 1 }),
    ("CURRENT_MINOR", FieldSelector::Bytes { offset: 0x1e9, len: 1 }),
    ("CURRENT_MAJOR", FieldSelector::Bytes { offset: 0x1ea, len: 1 }),
    ("COMMITTED_BUILD", FieldSelector::Bytes { offset: 0x1ec, len: 1 }),
    ("COMMITTED_MINOR", FieldSelector::Bytes { offset: 0x1ed, len: 1 }),
    ("COMMITTED_MAJOR", FieldSelector::Bytes { offset: 0x1ee, len: 1 }),
    ("LAUNCH_TCB", FieldSelector::Bytes { offset: 0x1f0, len: 8 }),
];

lazy_static! {
    static ref FIELDS: HashMap<&'static str, FieldSelector> =
        FIELD_TABLE.iter().copied().collect();
}

/// Returns the names of all selectable report fields.
pub fn field_names() -> impl Iterator<Item = &'static str> {
    FIELD_TABLE.iter().map(|(name, _)| *name)
}

/// Returns whether `name` is a selectable report field.
pub fn is_field(name: &str) -> bool {
    FIELDS.contains_key(name)
}

/// Resolves a field name to the raw little-endian bytes of that field in
/// the encoded report.
///
/// Multi-byte fields borrow directly from the retained wire bytes. The
/// sub-fields of the packed KEY_INFO word are extracted and returned as
/// an owned 4-byte little-endian buffer.
pub fn select<'a>(
    report: &'a AttestationReport,
    name: &str,
) -> Result<Cow<'a, [u8]>, FieldError> {
    let selector = FIELDS
        .get(name)
        .ok_or_else(|| FieldError::UnknownField(name.to_string()))?;

    let raw = report.as_bytes();
    match *selector {
        FieldSelector::Bytes { offset, len } => Ok(Cow::Borrowed(&raw[offset..offset + len])),
        FieldSelector::KeyInfoBits { shift, mask } => {
            let word = u32::from_le_bytes([
                raw[KEY_INFO_OFFSET],
                raw[KEY_INFO_OFFSET + 1],
                raw[KEY_INFO_OFFSET + 2],
                raw[KEY_INFO_OFFSET + 3],
            ]);
            let value = (word >> shift) & mask;
            Ok(Cow::Owned(value.to_le_bytes().to_vec()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::REPORT_SIZE;

    fn report_with_pattern() -> AttestationReport {
        let mut raw = vec![0u8; REPORT_SIZE];
        for (i, byte) in raw.iter_mut().enumerate() {
            *byte = (i % 251) as u8;
        }
        // Keep SIGNATURE_ALGO on the supported value so other tests can
        // reuse this fixture.
        raw[0x034..0x038].copy_from_slice(&1u32.to_le_bytes());
        AttestationReport::from_bytes(&raw).unwrap()
    }

    #[test]
    fn unknown_field_is_an_error() {
        let report = report_with_pattern();
        match select(&report, "NO_SUCH_FIELD") {
            Err(FieldError::UnknownField(name)) => assert_eq!(name, "NO_SUCH_FIELD"),
            other => panic!("expected UnknownField, got {other:?}"),
        }
    }

    #[test]
    fn field_names_are_case_sensitive() {
        let report = report_with_pattern();
        assert!(select(&report, "measurement").is_err());
        assert!(select(&report, "MEASUREMENT").is_ok());
    }

    #[test]
    fn byte_fields_slice_the_wire_representation() {
        let report = report_with_pattern();
        let raw = report.as_bytes();

        let measurement = select(&report, "MEASUREMENT").unwrap();
        assert_eq!(&*measurement, &raw[0x090..0x0c0]);

        let policy = select(&report, "POLICY").unwrap();
        assert_eq!(&*policy, &raw[0x008..0x010]);

        let build = select(&report, "CURRENT_BUILD").unwrap();
        assert_eq!(&*build, &raw[0x1e8..0x1e9]);
    }

    #[test]
    fn selected_bytes_match_decoded_fields() {
        let report = report_with_pattern();

        let guest_svn = select(&report, "GUEST_SVN").unwrap();
        assert_eq!(
            u32::from_le_bytes(guest_svn.as_ref().try_into().unwrap()),
            report.guest_svn
        );

        let reported_tcb = select(&report, "REPORTED_TCB").unwrap();
        assert_eq!(
            u64::from_le_bytes(reported_tcb.as_ref().try_into().unwrap()),
            report.reported_tcb
        );

        let chip_id = select(&report, "CHIP_ID").unwrap();
        assert_eq!(&*chip_id, &report.chip_id.0[..]);
    }

    #[test]
    fn packed_fields_widen_to_little_endian_words() {
        let mut raw = vec![0u8; REPORT_SIZE];
        // author_key_en = 1, mask_chip_key = 0, signing_key = 0b101.
        raw[0x048..0x04c].copy_from_slice(&0b10101u32.to_le_bytes());
        let report = AttestationReport::from_bytes(&raw).unwrap();

        let author = select(&report, "AUTHOR_KEY_EN").unwrap();
        assert_eq!(&*author, &1u32.to_le_bytes());

        let mask = select(&report, "MASK_CHIP_KEY").unwrap();
        assert_eq!(&*mask, &0u32.to_le_bytes());

        let signing = select(&report, "SIGNING_KEY").unwrap();
        assert_eq!(&*signing, &0b101u32.to_le_bytes());
    }

    #[test]
    fn every_cataloged_field_selects() {
        let report = report_with_pattern();
        for name in field_names() {
            let bytes = select(&report, name).unwrap();
            assert!(!bytes.is_empty(), "field {name} selected no bytes");
        }
    }

    #[test]
    fn catalog_offsets_match_the_wire_layout() {
        // Walk the wire layout as (name, width, trailing reserved bytes)
        // and check the catalog offset of each named field.
        let layout: &[(&str, usize, usize)] = &[
            ("VERSION", 4, 0),
            ("GUEST_SVN", 4, 0),
            ("POLICY", 8, 0),
            ("FAMILY_ID", 16, 0),
            ("IMAGE_ID", 16, 0),
            ("VMPL", 4, 0),
            ("SIGNATURE_ALGO", 4, 0),
            ("CURRENT_TCB", 8, 0),
            ("PLATFORM_INFO", 8, 0),
            ("KEY_INFO", 4, 4),
            ("REPORT_DATA", 64, 0),
            ("MEASUREMENT", 48, 0),
            ("HOST_DATA", 32, 0),
            ("ID_KEY_DIGEST", 48, 0),
            ("AUTHOR_KEY_DIGEST", 48, 0),
            ("REPORT_ID", 32, 0),
            ("REPORT_ID_MA", 32, 0),
            ("REPORTED_TCB", 8, 24),
            ("CHIP_ID", 64, 0),
            ("COMMITTED_TCB", 8, 0),
            ("CURRENT_BUILD", 1, 0),
            ("CURRENT_MINOR", 1, 0),
            ("CURRENT_MAJOR", 1, 1),
            ("COMMITTED_BUILD", 1, 0),
            ("COMMITTED_MINOR", 1, 0),
            ("COMMITTED_MAJOR", 1, 1),
            ("LAUNCH_TCB", 8, 0),
        ];

        let mut cursor = 0usize;
        for &(name, width, reserved_after) in layout {
            if name == "KEY_INFO" {
                assert_eq!(cursor, KEY_INFO_OFFSET);
            } else {
                match FIELDS[name] {
                    FieldSelector::Bytes { offset, len } => {
                        assert_eq!(offset, cursor, "offset mismatch for {name}");
                        assert_eq!(len, width, "width mismatch for {name}");
                    }
                    FieldSelector::KeyInfoBits { .. } => {
                        panic!("{name} should be a byte range")
                    }
                }
            }
            cursor += width + reserved_after;
        }

        // The walk plus the trailing reserved region must land exactly on
        // the signature.
        assert_eq!(cursor + 168, crate::report::SIGNATURE_OFFSET);
    }
}
