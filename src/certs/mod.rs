// SPDX-License-Identifier: Apache-2.0

//! Structures and interfaces for the AMD certificates used to endorse an
//! attestation report.

pub mod ca;
pub mod ecdsa;
pub mod ext;

use crate::error::CertError;

use openssl::{
    bn::BigNum,
    error::ErrorStack,
    pkey::{PKey, Public},
    x509::X509,
};

/// An X.509 certificate endorsing some part of the attestation chain.
#[derive(Clone, Debug)]
pub struct Certificate(X509);

/// Wrap an X509 struct into a Certificate.
impl From<X509> for Certificate {
    fn from(x509: X509) -> Self {
        Self(x509)
    }
}

/// Unwrap the underlying X509 struct from a Certificate.
impl From<Certificate> for X509 {
    fn from(cert: Certificate) -> Self {
        cert.0
    }
}

/// Clone the underlying X509 structure from a reference to a Certificate.
impl From<&Certificate> for X509 {
    fn from(cert: &Certificate) -> Self {
        cert.0.clone()
    }
}

impl Certificate {
    /// Create a Certificate from a PEM-encoded X509 structure.
    pub fn from_pem(pem: &[u8]) -> Result<Self, CertError> {
        Ok(Self(X509::from_pem(pem)?))
    }

    /// Create a Certificate from a DER-encoded X509 structure.
    pub fn from_der(der: &[u8]) -> Result<Self, CertError> {
        Ok(Self(X509::from_der(der)?))
    }

    /// Serialize the Certificate to DER.
    pub fn to_der(&self) -> Result<Vec<u8>, CertError> {
        Ok(self.0.to_der()?)
    }

    /// Retrieve the underlying X509 public key for a Certificate.
    pub fn public_key(&self) -> Result<PKey<Public>, ErrorStack> {
        self.0.public_key()
    }

    /// Borrow the underlying X509 structure.
    pub fn as_x509(&self) -> &X509 {
        &self.0
    }
}

/// Convert a value from its little-endian wire representation.
pub trait FromLe: Sized {
    /// Converts the object from its little-endian representation.
    fn from_le(value: &[u8]) -> Result<Self, ErrorStack>;
}

impl FromLe for BigNum {
    #[inline]
    fn from_le(value: &[u8]) -> Result<Self, ErrorStack> {
        Self::from_slice(&value.iter().rev().cloned().collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bignum_from_le_reverses_the_bytes() {
        let le = [0x2a, 0x00, 0x01];
        let bn = BigNum::from_le(&le).unwrap();
        let be = BigNum::from_slice(&[0x01, 0x00, 0x2a]).unwrap();
        assert_eq!(bn, be);
    }

    #[test]
    fn bignum_from_le_ignores_trailing_zeroes() {
        let bn = BigNum::from_le(&[0x07, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(bn, BigNum::from_u32(7).unwrap());
    }

    #[test]
    fn malformed_pem_is_rejected() {
        assert!(Certificate::from_pem(b"not a certificate").is_err());
    }

    #[test]
    fn malformed_der_is_rejected() {
        assert!(Certificate::from_der(&[0u8; 16]).is_err());
    }
}
