// SPDX-License-Identifier: Apache-2.0

//! Error types surfaced by the verification interfaces.
//!
//! Malformed caller input is reported with descriptive detail. Negative
//! verification outcomes (a signature that does not verify, a failing
//! policy) are *not* errors; they are represented by
//! [`VerifyOutcome`](crate::VerifyOutcome) and policy verdicts.

use std::{error, fmt::Display};

use openssl::error::ErrorStack;

/// Used for representing errors when decoding an attestation report.
#[derive(Debug)]
pub enum ReportError {
    /// The raw buffer is smaller than the fixed wire size.
    TooShort {
        /// The fixed wire size of an attestation report.
        expected: usize,
        /// The length of the buffer that was provided.
        actual: usize,
    },

    /// An unexpected I/O failure while stepping through the buffer.
    Io(std::io::Error),
}

impl error::Error for ReportError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort { expected, actual } => write!(
                f,
                "the raw attestation report is too small: expected {expected} bytes, got {actual}"
            ),
            Self::Io(e) => write!(f, "error reading the raw attestation report: {e}"),
        }
    }
}

impl From<std::io::Error> for ReportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Used for representing errors when verifying the report signature.
#[derive(Debug)]
pub enum SignatureError {
    /// The report names a signature algorithm other than ECDSA P-384
    /// with SHA-384.
    UnsupportedAlgorithm(u32),

    /// The raw buffer does not cover the signed region of the report.
    TooShort(usize),

    /// The signer certificate does not carry an EC public key.
    BadPublicKey,

    /// A failure inside the cryptographic primitives.
    Crypto(ErrorStack),
}

impl error::Error for SignatureError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Crypto(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for SignatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedAlgorithm(algo) => {
                write!(f, "unknown or invalid signature algorithm: {algo}")
            }
            Self::TooShort(actual) => write!(
                f,
                "the data passed as the raw report is too small: {actual} bytes"
            ),
            Self::BadPublicKey => {
                write!(f, "the signer certificate has an incorrect public key format")
            }
            Self::Crypto(e) => write!(f, "cryptographic primitive failure: {e}"),
        }
    }
}

impl From<ErrorStack> for SignatureError {
    fn from(value: ErrorStack) -> Self {
        Self::Crypto(value)
    }
}

/// Used for representing an unresolvable attestation report field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The field name is not part of the attestation report field catalog.
    UnknownField(String),
}

impl error::Error for FieldError {}

impl Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField(name) => {
                write!(f, "unknown attestation report field: {name}")
            }
        }
    }
}

/// Used for representing errors when handling certificates.
#[derive(Debug)]
pub enum CertError {
    /// The certificate could not be decoded.
    Malformed(String),

    /// A failure inside the X.509 machinery that is not an ordinary
    /// verification outcome.
    Crypto(ErrorStack),
}

impl error::Error for CertError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Crypto(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for CertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(detail) => write!(f, "malformed certificate: {detail}"),
            Self::Crypto(e) => write!(f, "X.509 processing failure: {e}"),
        }
    }
}

impl From<ErrorStack> for CertError {
    fn from(value: ErrorStack) -> Self {
        Self::Crypto(value)
    }
}

/// Used for representing errors when parsing or evaluating policies.
#[derive(Debug)]
pub enum PolicyError {
    /// The policy list is not valid JSON.
    Json(serde_json::Error),

    /// The policy names a type tag that is not registered.
    UnknownPolicyType(String),

    /// The policy parameters do not match the shape its kind expects.
    InvalidParams {
        /// The type tag of the policy whose parameters failed to decode.
        kind: String,
        /// The underlying decoding failure.
        source: serde_json::Error,
    },

    /// An internal failure raised by a policy implementation.
    Internal(String),

    /// An internal failure wrapped with the identifier of the failing
    /// policy, raised while evaluating a policy list.
    Evaluation {
        /// The caller-visible identifier of the failing policy, if any.
        id: Option<String>,
        /// The underlying failure.
        source: Box<PolicyError>,
    },
}

impl error::Error for PolicyError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::InvalidParams { source, .. } => Some(source),
            Self::Evaluation { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Display for PolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "error parsing policies from json: {e}"),
            Self::UnknownPolicyType(tag) => write!(f, "unknown policy type: {tag}"),
            Self::InvalidParams { kind, source } => write!(
                f,
                "could not instantiate policy {kind} with given parameters: {source}"
            ),
            Self::Internal(detail) => write!(f, "internal policy failure: {detail}"),
            Self::Evaluation { id, source } => match id {
                Some(id) => write!(f, "error validating policy {id}: {source}"),
                None => write!(f, "error validating policy: {source}"),
            },
        }
    }
}

impl From<serde_json::Error> for PolicyError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Umbrella error for the combined verification entry point.
///
/// Variants carry their full underlying detail, including
/// [`ErrorStack`] sources from the cryptographic primitives. Embedders
/// answering untrusted remote callers should report only the outer
/// variant and keep the source chain for their own logs.
#[derive(Debug)]
pub enum Error {
    /// The raw report could not be decoded.
    Report(ReportError),

    /// The report was signed by a key other than the chip-unique VCEK.
    UnsupportedSigningKey(u32),

    /// The report signature could not be processed.
    Signature(SignatureError),

    /// A certificate could not be processed.
    Cert(CertError),

    /// The policy list could not be parsed or evaluated.
    Policy(PolicyError),
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Report(e) => Some(e),
            Self::Signature(e) => Some(e),
            Self::Cert(e) => Some(e),
            Self::Policy(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Report(e) => write!(f, "{e}"),
            Self::UnsupportedSigningKey(key) => write!(
                f,
                "only reports signed by a VCEK are supported (signing key type {key})"
            ),
            Self::Signature(e) => write!(f, "{e}"),
            Self::Cert(e) => write!(f, "{e}"),
            Self::Policy(e) => write!(f, "{e}"),
        }
    }
}

impl From<ReportError> for Error {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

impl From<SignatureError> for Error {
    fn from(value: SignatureError) -> Self {
        Self::Signature(value)
    }
}

impl From<CertError> for Error {
    fn from(value: CertError) -> Self {
        Self::Cert(value)
    }
}

impl From<PolicyError> for Error {
    fn from(value: PolicyError) -> Self {
        Self::Policy(value)
    }
}
