// SPDX-License-Identifier: Apache-2.0

//! The combined report verification entry point.

use crate::{
    certs::{ca, ext::validate_vcek_extensions, Certificate},
    error::Error,
    policy::{check_policies, PolicyVerdict, PolicyWrapper},
    report::AttestationReport,
};

/// The outcome of verifying an attestation report.
///
/// A report that is well-formed but fails a check is *not verified*; it
/// is a normal outcome, distinct from the [`Error`]s raised for
/// malformed input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The report is endorsed by the certificate chain and satisfies
    /// every policy.
    Verified,

    /// One of the checks did not hold. Carries a caller-facing reason.
    NotVerified(String),
}

impl VerifyOutcome {
    /// Returns whether the report verified successfully.
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// Verifies an attestation report end to end.
///
/// The checks run in order:
///
/// 1. Decode the report from its raw bytes.
/// 2. Require the report to be signed by the chip-unique VCEK.
/// 3. Validate that the CA chain endorses the VCEK certificate.
/// 4. Cross-check the VCEK extensions against the report.
/// 5. Verify the report signature with the VCEK public key.
/// 6. Evaluate the supplied policies against the decoded report.
///
/// Failing checks yield [`VerifyOutcome::NotVerified`]; errors are
/// reserved for input the verifier cannot process at all.
pub fn verify_report(
    raw_report: &[u8],
    policies: &[PolicyWrapper],
    ca: &ca::Chain,
    vcek: &Certificate,
) -> Result<VerifyOutcome, Error> {
    let report = AttestationReport::from_bytes(raw_report)?;

    // Reports signed by a VLEK or an attestation signing key derive
    // their trust differently; only the VCEK path is supported.
    let signing_key = report.key_info.signing_key();
    if signing_key != 0 {
        return Err(Error::UnsupportedSigningKey(signing_key));
    }

    if !ca.verify_vcek(vcek).map_err(Error::Cert)? {
        log::info!("report not verified: the CA chain does not endorse the VCEK");
        return Ok(VerifyOutcome::NotVerified(
            "the CA chain does not endorse the VCEK certificate".into(),
        ));
    }

    if !validate_vcek_extensions(&report, vcek).map_err(Error::Cert)? {
        log::info!("report not verified: VCEK extensions do not match the report");
        return Ok(VerifyOutcome::NotVerified(
            "the VCEK certificate does not match the attestation report".into(),
        ));
    }

    if !report
        .verify_signature(raw_report, vcek)
        .map_err(Error::Signature)?
    {
        log::info!("report not verified: bad signature");
        return Ok(VerifyOutcome::NotVerified(
            "the report signature does not verify under the VCEK public key".into(),
        ));
    }

    match check_policies(policies, &report).map_err(Error::Policy)? {
        PolicyVerdict::Passed => {
            log::debug!("report verified: all checks passed");
            Ok(VerifyOutcome::Verified)
        }
        PolicyVerdict::Failed(reasons) => {
            log::info!("report not verified: {reasons}");
            Ok(VerifyOutcome::NotVerified(reasons))
        }
    }
}
