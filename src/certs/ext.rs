// SPDX-License-Identifier: Apache-2.0

//! Cross-checks between a VCEK certificate and the attestation report it
//! endorses.
//!
//! The AMD Key Distribution Service derives each VCEK from the chip
//! identity and a TCB version, and records both in custom X.509
//! extensions. A report is only endorsed by a VCEK whose extensions
//! match the REPORTED_TCB and CHIP_ID fields of the report; otherwise an
//! attacker could replay a signature made with a key derived for a
//! different (possibly vulnerable) firmware level.

use crate::{
    error::CertError,
    report::{AttestationReport, TcbVersion},
};

use crate::certs::Certificate;

use x509_parser::{der_parser::oid, oid_registry::Oid, prelude::*};

const OID_BOOTLOADER: Oid<'static> = oid!(1.3.6.1.4.1.3704.1.3.1);
const OID_TEE: Oid<'static> = oid!(1.3.6.1.4.1.3704.1.3.2);
const OID_SNP: Oid<'static> = oid!(1.3.6.1.4.1.3704.1.3.3);
const OID_UCODE: Oid<'static> = oid!(1.3.6.1.4.1.3704.1.3.8);
const OID_HWID: Oid<'static> = oid!(1.3.6.1.4.1.3704.1.4);

fn extension_value<'a>(cert: &'a X509Certificate<'a>, oid: &Oid) -> Option<&'a [u8]> {
    cert.extensions()
        .iter()
        .find(|ext| ext.oid == *oid)
        .map(|ext| ext.value)
}

/// Validate that the VCEK certificate endorses the given attestation
/// report.
///
/// Every TCB component extension present on the certificate must match
/// the REPORTED_TCB field, and the hardware ID extension, if present,
/// must match CHIP_ID byte for byte. The KDS encodes the version
/// extensions as a DER INTEGER with a one-byte body, so their value
/// must be exactly `02 01 <version>`. Extensions absent from the
/// certificate are not checked. Only a certificate that cannot be
/// parsed is an error.
pub fn validate_vcek_extensions(
    report: &AttestationReport,
    vcek: &Certificate,
) -> Result<bool, CertError> {
    let der = vcek.to_der()?;
    let (_, cert) =
        X509Certificate::from_der(&der).map_err(|e| CertError::Malformed(e.to_string()))?;

    let tcb = TcbVersion::from_raw(report.reported_tcb);
    let versions = [
        ("bootloader", &OID_BOOTLOADER, tcb.bootloader),
        ("tee", &OID_TEE, tcb.tee),
        ("snp", &OID_SNP, tcb.snp),
        ("microcode", &OID_UCODE, tcb.microcode),
    ];

    for (name, oid, expected) in versions {
        match extension_value(&cert, oid) {
            None => {}
            Some(value) if value == [0x02, 0x01, expected] => {}
            Some(_) => {
                log::debug!("VCEK {name} version extension does not match the reported TCB");
                return Ok(false);
            }
        }
    }

    match extension_value(&cert, &OID_HWID) {
        None => Ok(true),
        Some(hwid) if hwid == &report.chip_id.0[..] => Ok(true),
        Some(_) => {
            log::debug!("VCEK hardware ID extension does not match the report chip ID");
            Ok(false)
        }
    }
}
