// SPDX-License-Identifier: Apache-2.0

//! The SEV-SNP attestation report and its binary codec.
//!
//! [`AttestationReport`] reflects the report structure described in the
//! SEV Secure Nested Paging Firmware ABI specification (Table 21). The
//! codec reads little-endian fields at fixed offsets and performs no
//! validation beyond the length check: every field value is untrusted
//! until the signature, certificate, and policy checks have run.

pub mod fields;
pub mod tcb;

pub use tcb::TcbVersion;

use crate::{
    certs::{ecdsa::Signature, Certificate},
    error::{ReportError, SignatureError},
    util::{
        array::Array,
        parser::ReadExt,
    },
};

use std::{convert::TryFrom, fmt::Display};

use bitfield::bitfield;
use openssl::{ecdsa::EcdsaSig, sha::sha384};
use serde::{Deserialize, Serialize};

/// The fixed wire size of an encoded attestation report in bytes.
pub const REPORT_SIZE: usize = 0x4a0;

/// Offset of the signature field within the encoded report. The digest
/// covered by the signature is computed over every byte before this
/// offset and nothing after it.
pub const SIGNATURE_OFFSET: usize = 0x2a0;

/// The only supported value of the SIGNATURE_ALGO field: ECDSA over
/// curve P-384 with SHA-384 digest.
pub const SIG_ALGO_ECDSA_P384_SHA384: u32 = 1;

bitfield! {
    /// Information related to the key that signed the report.
    ///
    /// | Bit(s) | Name          | Description                                              |
    /// |--------|---------------|----------------------------------------------------------|
    /// | 0      | AUTHOR_KEY_EN | The digest of the author key is present.                 |
    /// | 1      | MASK_CHIP_KEY | The value of MaskChipKey.                                |
    /// | 4:2    | SIGNING_KEY   | Key that signed this report; 0 = VCEK, others reserved.  |
    /// | 31:5   | -             | Reserved.                                                |
    #[repr(C)]
    #[derive(Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
    pub struct KeyInfo(u32);
    impl Debug;
    /// AUTHOR_KEY_EN field: the author key digest is present in AUTHOR_KEY_DIGEST.
    pub author_key_en, _: 0;
    /// MASK_CHIP_KEY field: the CHIP_ID field is masked to zeroes.
    pub mask_chip_key, _: 1;
    /// SIGNING_KEY field: encodes the key used to sign this report.
    pub signing_key, _: 4, 2;
}

/// A decoded SEV-SNP attestation report.
///
/// Constructed once from raw bytes via [`AttestationReport::from_bytes`]
/// and read-only thereafter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AttestationReport {
    /// Version number of this attestation report.
    pub version: u32,
    /// The guest SVN.
    pub guest_svn: u32,
    /// The guest policy bitmask provided at launch.
    pub policy: u64,
    /// The family ID provided at launch.
    pub family_id: Array<u8, 16>,
    /// The image ID provided at launch.
    pub image_id: Array<u8, 16>,
    /// The request VMPL for the attestation report.
    pub vmpl: u32,
    /// The signature algorithm used to sign this report.
    pub sig_algo: u32,
    /// The current TCB version, as a raw little-endian word.
    /// Decode on demand with [`TcbVersion::from_raw`].
    pub current_tcb: u64,
    /// Information about the platform.
    pub platform_info: u64,
    /// Information related to signing keys in the report.
    pub key_info: KeyInfo,
    /// Guest-provided 512 bits of data.
    pub report_data: Array<u8, 64>,
    /// The measurement calculated at launch.
    pub measurement: Array<u8, 48>,
    /// Data provided by the hypervisor at launch.
    pub host_data: Array<u8, 32>,
    /// SHA-384 digest of the ID public key that signed the ID block.
    pub id_key_digest: Array<u8, 48>,
    /// SHA-384 digest of the Author public key that certified the ID key.
    pub author_key_digest: Array<u8, 48>,
    /// Report ID of this guest.
    pub report_id: Array<u8, 32>,
    /// Report ID of this guest's migration agent (if applicable).
    pub report_id_ma: Array<u8, 32>,
    /// Reported TCB version used to derive the VCEK that signed this
    /// report, as a raw little-endian word.
    pub reported_tcb: u64,
    /// If MaskChipKey is 0, an identifier unique to the chip.
    pub chip_id: Array<u8, 64>,
    /// The committed TCB version, as a raw little-endian word.
    pub committed_tcb: u64,
    /// The build number of the current firmware version.
    pub current_build: u8,
    /// The minor number of the current firmware version.
    pub current_minor: u8,
    /// The major number of the current firmware version.
    pub current_major: u8,
    /// The build number of the committed firmware version.
    pub committed_build: u8,
    /// The minor number of the committed firmware version.
    pub committed_minor: u8,
    /// The major number of the committed firmware version.
    pub committed_major: u8,
    /// The current TCB at the time the guest was launched or imported,
    /// as a raw little-endian word.
    pub launch_tcb: u64,
    /// Signature of bytes 0 to 0x29F inclusive of this report.
    pub signature: Signature,

    /// The encoded wire bytes this report was decoded from, retained so
    /// that field selection and signature checks operate on the exact
    /// little-endian representation.
    wire: Array<u8, REPORT_SIZE>,
}

impl AttestationReport {
    /// Attempts to parse an AttestationReport structure from raw bytes.
    ///
    /// Fails if the buffer is smaller than [`REPORT_SIZE`]; a longer
    /// buffer is accepted, but only the first [`REPORT_SIZE`] bytes are
    /// read.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, ReportError> {
        if raw.len() < REPORT_SIZE {
            return Err(ReportError::TooShort {
                expected: REPORT_SIZE,
                actual: raw.len(),
            });
        }

        let mut wire = Array::<u8, REPORT_SIZE>::default();
        wire.0.copy_from_slice(&raw[..REPORT_SIZE]);

        let mut cursor: &[u8] = &wire.0;
        let stepper = &mut cursor;

        let version = stepper.read_le()?;
        let guest_svn = stepper.read_le()?;
        let policy = stepper.read_le()?;
        let family_id = stepper.read_le()?;
        let image_id = stepper.read_le()?;
        let vmpl = stepper.read_le()?;
        let sig_algo = stepper.read_le()?;
        let current_tcb = stepper.read_le()?;
        let platform_info = stepper.read_le()?;
        let key_info = KeyInfo(stepper.read_le()?);
        let report_data = stepper.skip_bytes::<4>()?.read_le()?;
        let measurement = stepper.read_le()?;
        let host_data = stepper.read_le()?;
        let id_key_digest = stepper.read_le()?;
        let author_key_digest = stepper.read_le()?;
        let report_id = stepper.read_le()?;
        let report_id_ma = stepper.read_le()?;
        let reported_tcb = stepper.read_le()?;
        let chip_id = stepper.skip_bytes::<24>()?.read_le()?;
        let committed_tcb = stepper.read_le()?;
        let current_build = stepper.read_le()?;
        let current_minor = stepper.read_le()?;
        let current_major = stepper.read_le()?;
        let committed_build = stepper.skip_bytes::<1>()?.read_le()?;
        let committed_minor = stepper.read_le()?;
        let committed_major = stepper.read_le()?;
        let launch_tcb = stepper.skip_bytes::<1>()?.read_le()?;
        let signature = stepper.skip_bytes::<168>()?.read_le()?;

        Ok(Self {
            version,
            guest_svn,
            policy,
            family_id,
            image_id,
            vmpl,
            sig_algo,
            current_tcb,
            platform_info,
            key_info,
            report_data,
            measurement,
            host_data,
            id_key_digest,
            author_key_digest,
            report_id,
            report_id_ma,
            reported_tcb,
            chip_id,
            committed_tcb,
            current_build,
            current_minor,
            current_major,
            committed_build,
            committed_minor,
            committed_major,
            launch_tcb,
            signature,
            wire,
        })
    }

    /// The encoded wire bytes this report was decoded from.
    pub fn as_bytes(&self) -> &[u8; REPORT_SIZE] {
        &self.wire.0
    }

    /// Verify the report signature against a VCEK certificate.
    ///
    /// The digest is computed over the raw bytes preceding the signature
    /// field. To avoid re-encoding the report, the raw bytes are passed
    /// in alongside the decoded structure.
    ///
    /// A structurally valid but cryptographically failing signature
    /// returns `Ok(false)`; only malformed input is an error.
    pub fn verify_signature(
        &self,
        raw_report: &[u8],
        vcek: &Certificate,
    ) -> Result<bool, SignatureError> {
        if self.sig_algo != SIG_ALGO_ECDSA_P384_SHA384 {
            return Err(SignatureError::UnsupportedAlgorithm(self.sig_algo));
        }

        if raw_report.len() < SIGNATURE_OFFSET {
            return Err(SignatureError::TooShort(raw_report.len()));
        }

        let digest = sha384(&raw_report[..SIGNATURE_OFFSET]);

        let sig = EcdsaSig::try_from(&self.signature)?;
        let key = vcek
            .public_key()?
            .ec_key()
            .map_err(|_| SignatureError::BadPublicKey)?;

        Ok(sig.verify(&digest, &key)?)
    }
}

impl Display for AttestationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            r#"Attestation Report:
  Version:             {}
  Guest SVN:           {}
  Policy:              {:#018x}
  Family ID:           {}
  Image ID:            {}
  VMPL:                {}
  Signature Algorithm: {}
  Current TCB:         {}
  Platform Info:       {:#018x}
  Author Key Enabled:  {}
  Mask Chip Key:       {}
  Signing Key:         {}
  Report Data:         {}
  Measurement:         {}
  Host Data:           {}
  ID Key Digest:       {}
  Author Key Digest:   {}
  Report ID:           {}
  Report ID (MA):      {}
  Reported TCB:        {}
  Chip ID:             {}
  Committed TCB:       {}
  Current Version:     {}.{}.{}
  Committed Version:   {}.{}.{}
  Launch TCB:          {}
{}"#,
            self.version,
            self.guest_svn,
            self.policy,
            self.family_id,
            self.image_id,
            self.vmpl,
            self.sig_algo,
            TcbVersion::from_raw(self.current_tcb),
            self.platform_info,
            self.key_info.author_key_en(),
            self.key_info.mask_chip_key(),
            self.key_info.signing_key(),
            self.report_data,
            self.measurement,
            self.host_data,
            self.id_key_digest,
            self.author_key_digest,
            self.report_id,
            self.report_id_ma,
            TcbVersion::from_raw(self.reported_tcb),
            self.chip_id,
            TcbVersion::from_raw(self.committed_tcb),
            self.current_major,
            self.current_minor,
            self.current_build,
            self.committed_major,
            self.committed_minor,
            self.committed_build,
            TcbVersion::from_raw(self.launch_tcb),
            self.signature,
        )
    }
}
