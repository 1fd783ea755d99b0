// SPDX-License-Identifier: Apache-2.0

use crate::{
    error::PolicyError,
    policy::{base64_bytes, Policy, PolicyCheck},
    report::{fields, AttestationReport},
};

use serde::Deserialize;

/// Requires an attestation report field to equal a reference value byte
/// for byte.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Equals {
    /// The name of the report field to compare.
    field: String,

    /// The expected little-endian value of the field.
    #[serde(rename = "referenceValue", with = "base64_bytes")]
    reference_value: Vec<u8>,
}

impl Equals {
    /// Creates an equality policy over the named field.
    pub fn new(field: impl Into<String>, reference_value: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            reference_value,
        }
    }
}

impl Policy for Equals {
    fn check(&self, report: &AttestationReport) -> Result<PolicyCheck, PolicyError> {
        let actual = match fields::select(report, &self.field) {
            Ok(actual) => actual,
            Err(e) => return Ok(PolicyCheck::Failed(e.to_string())),
        };

        if actual.len() != self.reference_value.len() {
            return Ok(PolicyCheck::Failed(format!(
                "field {} is {} bytes but the reference value is {} bytes",
                self.field,
                actual.len(),
                self.reference_value.len()
            )));
        }

        if *actual == self.reference_value[..] {
            Ok(PolicyCheck::Passed)
        } else {
            Ok(PolicyCheck::Failed(format!(
                "field {} does not match the reference value",
                self.field
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::tests::test_report;

    #[test]
    fn equal_bytes_pass() {
        let report = test_report(|raw| raw[0x090..0x0c0].fill(0x5a));
        let policy = Equals::new("MEASUREMENT", vec![0x5a; 48]);
        assert_eq!(policy.check(&report).unwrap(), PolicyCheck::Passed);
    }

    #[test]
    fn differing_bytes_fail() {
        let report = test_report(|raw| raw[0x090..0x0c0].fill(0x5a));
        let mut expected = vec![0x5a; 48];
        expected[47] = 0x5b;
        let policy = Equals::new("MEASUREMENT", expected);

        match policy.check(&report).unwrap() {
            PolicyCheck::Failed(reason) => assert!(reason.contains("MEASUREMENT")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn length_mismatch_fails_with_reason() {
        let report = test_report(|_| {});
        let policy = Equals::new("MEASUREMENT", vec![0u8; 4]);

        match policy.check(&report).unwrap() {
            PolicyCheck::Failed(reason) => {
                assert!(reason.contains("48 bytes"));
                assert!(reason.contains("4 bytes"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn unknown_field_fails_rather_than_errors() {
        let report = test_report(|_| {});
        let policy = Equals::new("NO_SUCH_FIELD", vec![]);

        match policy.check(&report).unwrap() {
            PolicyCheck::Failed(reason) => assert!(reason.contains("NO_SUCH_FIELD")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn packed_fields_compare_as_words() {
        // signing_key = 0, author_key_en = 1.
        let report = test_report(|raw| raw[0x048] = 0b1);
        let policy = Equals::new("AUTHOR_KEY_EN", 1u32.to_le_bytes().to_vec());
        assert_eq!(policy.check(&report).unwrap(), PolicyCheck::Passed);

        let policy = Equals::new("SIGNING_KEY", 0u32.to_le_bytes().to_vec());
        assert_eq!(policy.check(&report).unwrap(), PolicyCheck::Passed);
    }
}
