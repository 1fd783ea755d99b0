// SPDX-License-Identifier: Apache-2.0

use crate::{
    error::PolicyError,
    policy::{Policy, PolicyCheck},
    report::{fields, AttestationReport, TcbVersion},
};

use serde::Deserialize;

/// Requires every component of a TCB version field to be at least a
/// minimum version.
///
/// A plain [`GreaterEqual`](crate::policy::GreaterEqual) over the packed
/// word would order the components by their byte position; this policy
/// compares bootloader, TEE, SNP and microcode versions independently.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TcbGreaterEqual {
    /// The name of the TCB-valued report field to compare.
    field: String,

    /// Minimum bootloader version.
    #[serde(rename = "minBootloaderVersion", default)]
    min_bootloader_version: u8,

    /// Minimum PSP OS version.
    #[serde(rename = "minTEEVersion", default)]
    min_tee_version: u8,

    /// Minimum SNP firmware version.
    #[serde(rename = "minSNPVersion", default)]
    min_snp_version: u8,

    /// Minimum microcode patch level.
    #[serde(rename = "minMicrocodeVersion", default)]
    min_microcode_version: u8,
}

impl TcbGreaterEqual {
    /// Creates a minimum-TCB policy over the named field.
    pub fn new(field: impl Into<String>, minimum: TcbVersion) -> Self {
        Self {
            field: field.into(),
            min_bootloader_version: minimum.bootloader,
            min_tee_version: minimum.tee,
            min_snp_version: minimum.snp,
            min_microcode_version: minimum.microcode,
        }
    }
}

impl Policy for TcbGreaterEqual {
    fn check(&self, report: &AttestationReport) -> Result<PolicyCheck, PolicyError> {
        let actual = match fields::select(report, &self.field) {
            Ok(actual) => actual,
            Err(e) => return Ok(PolicyCheck::Failed(e.to_string())),
        };

        let word: [u8; 8] = match actual.as_ref().try_into() {
            Ok(word) => word,
            Err(_) => {
                return Ok(PolicyCheck::Failed(format!(
                    "field {} is not a TCB version",
                    self.field
                )))
            }
        };
        let tcb = TcbVersion::from_raw(u64::from_le_bytes(word));

        let components = [
            ("bootloader", tcb.bootloader, self.min_bootloader_version),
            ("TEE", tcb.tee, self.min_tee_version),
            ("SNP", tcb.snp, self.min_snp_version),
            ("microcode", tcb.microcode, self.min_microcode_version),
        ];

        for (name, actual, minimum) in components {
            if actual < minimum {
                return Ok(PolicyCheck::Failed(format!(
                    "{} version {} of field {} is below the minimum {}",
                    name, actual, self.field, minimum
                )));
            }
        }

        Ok(PolicyCheck::Passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::tests::test_report;

    fn tcb_report(tcb: TcbVersion) -> AttestationReport {
        test_report(|raw| raw[0x180..0x188].copy_from_slice(&tcb.to_raw().to_le_bytes()))
    }

    #[test]
    fn meeting_every_minimum_passes() {
        let policy = TcbGreaterEqual::new("REPORTED_TCB", TcbVersion::new(2, 3, 8, 100));
        let report = tcb_report(TcbVersion::new(2, 4, 8, 115));
        assert_eq!(policy.check(&report).unwrap(), PolicyCheck::Passed);
    }

    #[test]
    fn each_component_is_compared_independently() {
        // High microcode version must not compensate for an old SNP
        // firmware version.
        let policy = TcbGreaterEqual::new("REPORTED_TCB", TcbVersion::new(0, 0, 8, 0));
        let report = tcb_report(TcbVersion::new(9, 9, 7, 255));

        match policy.check(&report).unwrap() {
            PolicyCheck::Failed(reason) => assert!(reason.contains("SNP")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn failure_names_the_lagging_component() {
        let policy = TcbGreaterEqual::new("CURRENT_TCB", TcbVersion::new(5, 0, 0, 0));
        let report = test_report(|raw| {
            raw[0x038..0x040]
                .copy_from_slice(&TcbVersion::new(4, 0, 0, 0).to_raw().to_le_bytes())
        });

        match policy.check(&report).unwrap() {
            PolicyCheck::Failed(reason) => {
                assert!(reason.contains("bootloader"));
                assert!(reason.contains("CURRENT_TCB"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn non_tcb_field_fails_rather_than_errors() {
        let policy = TcbGreaterEqual::new("MEASUREMENT", TcbVersion::default());
        let report = test_report(|_| {});

        match policy.check(&report).unwrap() {
            PolicyCheck::Failed(reason) => assert!(reason.contains("not a TCB version")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn unknown_field_fails_rather_than_errors() {
        let policy = TcbGreaterEqual::new("BOGUS", TcbVersion::default());
        let report = test_report(|_| {});
        assert!(matches!(
            policy.check(&report).unwrap(),
            PolicyCheck::Failed(_)
        ));
    }

    #[test]
    fn omitted_minimums_default_to_zero() {
        let policy: TcbGreaterEqual = serde_json::from_value(serde_json::json!({
            "field": "LAUNCH_TCB",
            "minSNPVersion": 8
        }))
        .unwrap();

        let report = test_report(|raw| {
            raw[0x1f0..0x1f8]
                .copy_from_slice(&TcbVersion::new(0, 0, 8, 0).to_raw().to_le_bytes())
        });
        assert_eq!(policy.check(&report).unwrap(), PolicyCheck::Passed);
    }
}
