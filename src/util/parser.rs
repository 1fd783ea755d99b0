// SPDX-License-Identifier: Apache-2.0

//! Little-endian decoding helpers for fixed-layout binary structures.

use crate::util::array::Array;

use std::io::Read;

/// Trait used to express decoding relationships.
pub trait Decoder: Sized {
    /// Decodes a value from the reader.
    fn decode(reader: &mut impl Read) -> Result<Self, std::io::Error>;
}

impl<const N: usize> Decoder for [u8; N] {
    fn decode(reader: &mut impl Read) -> Result<Self, std::io::Error> {
        let mut buf = [0u8; N];
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}

impl<const N: usize> Decoder for Array<u8, N> {
    fn decode(reader: &mut impl Read) -> Result<Self, std::io::Error> {
        Ok(Array(<[u8; N]>::decode(reader)?))
    }
}

macro_rules! impl_decoder
{
    ($($t:ty), *) => {
        $(
            impl Decoder for $t {
                #[inline(always)]
                fn decode(reader: &mut impl Read) -> Result<Self, std::io::Error> {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    reader.read_exact(&mut buf)?;
                    Ok(<$t>::from_le_bytes(buf))
                }
            }
        )*
    };
}

impl_decoder!(u8, u16, u32, u64);

/// Convenience methods for decoding consecutive wire-format fields.
pub trait ReadExt: Read {
    /// Decode the next value from the stream.
    fn read_le<T>(&mut self) -> Result<T, std::io::Error>
    where
        Self: Sized,
        T: Decoder,
    {
        T::decode(self)
    }

    /// Read and discard SKIP reserved bytes; returns the same reader.
    ///
    /// Reserved regions are not validated: the wire format only promises
    /// their position, not their content.
    fn skip_bytes<const SKIP: usize>(&mut self) -> Result<&mut Self, std::io::Error> {
        if SKIP != 0 {
            const CHUNK: usize = 256;
            let mut buf = [0u8; CHUNK];
            let mut remaining = SKIP;

            while remaining > 0 {
                let n = remaining.min(CHUNK);
                self.read_exact(&mut buf[..n])?;
                remaining -= n;
            }
        }
        Ok(self)
    }
}

impl<R> ReadExt for R where R: Read {}
