// SPDX-License-Identifier: Apache-2.0

use crate::{
    error::PolicyError,
    policy::{base64_bytes, Policy, PolicyCheck},
    report::{fields, AttestationReport},
};

use std::cmp::Ordering;

use serde::Deserialize;

/// Requires an attestation report field, interpreted as a little-endian
/// unsigned integer, to be at least a minimum value.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GreaterEqual {
    /// The name of the report field to compare.
    field: String,

    /// The minimum little-endian value of the field.
    #[serde(rename = "minimumValue", with = "base64_bytes")]
    minimum_value: Vec<u8>,
}

impl GreaterEqual {
    /// Creates a minimum-value policy over the named field.
    pub fn new(field: impl Into<String>, minimum_value: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            minimum_value,
        }
    }
}

impl Policy for GreaterEqual {
    fn check(&self, report: &AttestationReport) -> Result<PolicyCheck, PolicyError> {
        let actual = match fields::select(report, &self.field) {
            Ok(actual) => actual,
            Err(e) => return Ok(PolicyCheck::Failed(e.to_string())),
        };

        if actual.len() != self.minimum_value.len() {
            return Ok(PolicyCheck::Failed(format!(
                "field {} is {} bytes but the minimum value is {} bytes",
                self.field,
                actual.len(),
                self.minimum_value.len()
            )));
        }

        // Both values are little-endian, so compare from the most
        // significant byte down.
        match actual.iter().rev().cmp(self.minimum_value.iter().rev()) {
            Ordering::Less => Ok(PolicyCheck::Failed(format!(
                "field {} is below the minimum value",
                self.field
            ))),
            _ => Ok(PolicyCheck::Passed),
        }
    }
}
