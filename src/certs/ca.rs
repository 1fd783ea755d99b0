// SPDX-License-Identifier: Apache-2.0

//! Operations for a Certificate Authority (CA) chain.

use super::Certificate;
use crate::error::CertError;

use openssl::{
    stack::Stack,
    x509::{store::X509StoreBuilder, X509StoreContext, X509},
};

/// A Certificate Authority (CA) chain.
#[derive(Clone, Debug)]
pub struct Chain {
    /// AMD Root Key certificate.
    pub ark: Certificate,

    /// AMD SEV Key certificate.
    pub ask: Certificate,
}

impl Chain {
    /// Deserialize a PEM-encoded ARK and ASK pair to a CA chain.
    pub fn from_pem(ark: &[u8], ask: &[u8]) -> Result<Self, CertError> {
        Ok(Self {
            ark: Certificate::from_pem(ark)?,
            ask: Certificate::from_pem(ask)?,
        })
    }

    /// Deserialize a DER-encoded ARK and ASK pair to a CA chain.
    pub fn from_der(ark: &[u8], ask: &[u8]) -> Result<Self, CertError> {
        Ok(Self {
            ark: Certificate::from_der(ark)?,
            ask: Certificate::from_der(ask)?,
        })
    }

    /// Verify that this CA chain endorses the given VCEK certificate.
    ///
    /// The ARK is the only trusted root and the ASK the only untrusted
    /// intermediate, so a successful build proves the path
    /// ARK -> ASK -> VCEK. The built chain must contain exactly those
    /// three certificates; a shorter path (for example a VCEK issued
    /// directly by the ARK) is rejected.
    ///
    /// Returns `Ok(false)` when no such path exists. Errors are reserved
    /// for failures of the X.509 machinery itself.
    pub fn verify_vcek(&self, vcek: &Certificate) -> Result<bool, CertError> {
        let mut roots = X509StoreBuilder::new()?;
        roots.add_cert(self.ark.clone().into())?;
        let store = roots.build();

        let mut intermediates: Stack<X509> = Stack::new()?;
        intermediates.push(self.ask.clone().into())?;

        let mut context = X509StoreContext::new()?;
        let verified = context.init(&store, vcek.as_x509(), &intermediates, |ctx| {
            if !ctx.verify_cert()? {
                log::debug!(
                    "VCEK chain verification failed: {}",
                    ctx.error().error_string()
                );
                return Ok(false);
            }
            Ok(ctx.chain().map(|chain| chain.len() == 3).unwrap_or(false))
        })?;

        Ok(verified)
    }
}
