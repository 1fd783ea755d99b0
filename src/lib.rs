// SPDX-License-Identifier: Apache-2.0

//! The `snp-verify` crate verifies [AMD SEV-SNP][SNP] attestation
//! reports.
//!
//! [SNP]: https://www.amd.com/content/dam/amd/en/documents/epyc-technical-docs/specifications/56860.pdf
//!
//! Given the raw bytes of an attestation report, the AMD CA chain for
//! the product line (ARK and ASK) and the VCEK certificate of the
//! attesting chip, [`verify_report`] establishes that:
//!
//! 1. The report is well-formed and signed by the chip-unique VCEK.
//! 2. The VCEK is endorsed by the CA chain rooted in the ARK.
//! 3. The TCB and hardware ID extensions baked into the VCEK by the AMD
//!    Key Distribution Service match the corresponding report fields.
//! 4. The ECDSA P-384 report signature verifies under the VCEK key.
//! 5. A caller-supplied list of [policies](crate::policy) holds for the
//!    decoded report.
//!
//! A report failing any of these checks is reported as
//! [`VerifyOutcome::NotVerified`] with a caller-facing reason; errors
//! are reserved for input the verifier cannot process at all.
//!
//! ## Policies
//!
//! Beyond the cryptographic checks, callers constrain report contents
//! declaratively with JSON policies evaluated over named report fields:
//!
//! ```json
//! [
//!     {
//!         "type": "equals",
//!         "id": "measurement",
//!         "params": {
//!             "field": "MEASUREMENT",
//!             "referenceValue": "q6ur..."
//!         }
//!     },
//!     {
//!         "type": "tcbGreaterEqual",
//!         "id": "tcb",
//!         "params": {
//!             "field": "REPORTED_TCB",
//!             "minSNPVersion": 8
//!         }
//!     }
//! ]
//! ```
//!
//! The builtin policy kinds are `equals`, `greaterEqual` and
//! `tcbGreaterEqual`; applications can register their own kinds on a
//! [`PolicyRegistry`].

#![deny(clippy::all)]
#![deny(missing_docs)]
#![allow(unknown_lints)]
#![allow(clippy::identity_op)]
#![allow(clippy::unreadable_literal)]

/// AMD certificate interfaces: the VCEK, the CA chain and the KDS
/// extension cross-checks.
pub mod certs;

/// Error module.
pub mod error;

/// The declarative policy engine.
pub mod policy;

/// The attestation report structure and its binary codec.
pub mod report;

mod util;
mod verify;

pub use report::{AttestationReport, TcbVersion, REPORT_SIZE};
pub use verify::{verify_report, VerifyOutcome};
