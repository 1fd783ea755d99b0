// SPDX-License-Identifier: Apache-2.0

//! The packed TCB_VERSION word and its named components.

use serde::{Deserialize, Serialize};

use std::fmt::Display;

/// TcbVersion represents the version of the firmware.
///
/// The non-reserved components of the packed 64-bit TCB_VERSION word
/// (Chapter 2.2; Table 3).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcbVersion {
    /// Current bootloader version.
    /// SVN of PSP bootloader.
    pub bootloader: u8,
    /// Current PSP OS version.
    /// SVN of PSP operating system.
    pub tee: u8,
    /// Version of the SNP firmware.
    /// Security Version Number (SVN) of SNP firmware.
    pub snp: u8,
    /// Lowest current patch level of all the cores.
    pub microcode: u8,
}

impl TcbVersion {
    /// Creates a new instance of a TcbVersion.
    pub fn new(bootloader: u8, tee: u8, snp: u8, microcode: u8) -> Self {
        Self {
            bootloader,
            tee,
            snp,
            microcode,
        }
    }

    /// Decode a TCB version from the raw little-endian word found in an
    /// attestation report. Bytes 2-5 of the word are reserved and ignored.
    pub fn from_raw(raw: u64) -> Self {
        let bytes = raw.to_le_bytes();
        Self {
            bootloader: bytes[0],
            tee: bytes[1],
            snp: bytes[6],
            microcode: bytes[7],
        }
    }

    /// Encode the components back into a raw little-endian word with the
    /// reserved bytes zeroed.
    pub fn to_raw(self) -> u64 {
        u64::from_le_bytes([
            self.bootloader,
            self.tee,
            0,
            0,
            0,
            0,
            self.snp,
            self.microcode,
        ])
    }
}

impl Display for TcbVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            r#"
TCB Version:
  Microcode:   {}
  SNP:         {}
  TEE:         {}
  Boot Loader: {}
  "#,
            self.microcode, self.snp, self.tee, self.bootloader
        )
    }
}
