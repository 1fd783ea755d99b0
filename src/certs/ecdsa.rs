// SPDX-License-Identifier: Apache-2.0

//! The ECDSA signature format carried inside an attestation report.

use crate::{
    certs::FromLe,
    util::{array::Array, parser::Decoder},
};

use std::convert::TryFrom;

use openssl::{bn::BigNum, ecdsa::EcdsaSig, error::ErrorStack};
use serde::{Deserialize, Serialize};

/// ECDSA signature.
///
/// The components are stored little-endian and zero-padded to 72 bytes,
/// as the firmware writes them into the report.
#[repr(C)]
#[derive(Default, Copy, Clone, Deserialize, Serialize)]
pub struct Signature {
    r: Array<u8, 72>,

    s: Array<u8, 72>,
}

impl Signature {
    /// Creates a new signature from the values specified.
    pub fn new(r: Array<u8, 72>, s: Array<u8, 72>) -> Self {
        Self { r, s }
    }

    /// Returns the signatures `r` component.
    pub fn r(&self) -> &[u8; 72] {
        &self.r
    }

    /// Returns the signatures `s` component.
    pub fn s(&self) -> &[u8; 72] {
        &self.s
    }
}

impl Eq for Signature {}
impl PartialEq for Signature {
    fn eq(&self, other: &Signature) -> bool {
        self.r[..] == other.r[..] && self.s[..] == other.s[..]
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Signature {{ r: {:x}, s: {:x} }}", self.r, self.s)
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            r#"Signature:
  R: {}
  S: {}"#,
            self.r, self.s
        )
    }
}

impl Decoder for Signature {
    fn decode(reader: &mut impl std::io::Read) -> Result<Self, std::io::Error> {
        let r = Array::<u8, 72>::decode(reader)?;
        let s = Array::<u8, 72>::decode(reader)?;
        Ok(Self::new(r, s))
    }
}

impl TryFrom<&Signature> for EcdsaSig {
    type Error = ErrorStack;

    #[inline]
    fn try_from(signature: &Signature) -> Result<Self, Self::Error> {
        let r = BigNum::from_le(&*signature.r)?;
        let s = BigNum::from_le(&*signature.s)?;
        EcdsaSig::from_private_components(r, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::parser::ReadExt;

    #[test]
    fn decode_splits_r_and_s() {
        let mut data = vec![0u8; 144];
        data[..72].fill(0x11);
        data[72..].fill(0x22);

        let mut reader: &[u8] = &data;
        let sig: Signature = reader.read_le().unwrap();

        assert_eq!(sig.r(), &[0x11; 72]);
        assert_eq!(sig.s(), &[0x22; 72]);
    }

    #[test]
    fn conversion_interprets_components_little_endian() {
        let mut r = [0u8; 72];
        let mut s = [0u8; 72];
        r[0] = 0x01; // LE for 1
        s[0] = 0x02; // LE for 2

        let sig = Signature::new(Array(r), Array(s));
        let ossl = EcdsaSig::try_from(&sig).unwrap();

        assert_eq!(*ossl.r(), BigNum::from_u32(1).unwrap());
        assert_eq!(*ossl.s(), BigNum::from_u32(2).unwrap());
    }

    #[test]
    fn equality_covers_both_components() {
        let a = Signature::new(Array([1; 72]), Array([2; 72]));
        let b = Signature::new(Array([1; 72]), Array([2; 72]));
        let c = Signature::new(Array([1; 72]), Array([3; 72]));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
