// SPDX-License-Identifier: Apache-2.0

//! Helpful structure to deal with arrays with a size larger than 32 bytes

use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use std::{
    array::TryFromSliceError,
    convert::TryFrom,
    fmt::{Debug, LowerHex},
    ops::Deref,
};

/// Large array structure to serialize and default arrays larger than 32 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Array<T, const N: usize>(#[serde(with = "BigArray")] pub [T; N])
where
    T: Serialize + for<'a> Deserialize<'a>;

impl<T, const N: usize> LowerHex for Array<T, N>
where
    T: std::marker::Copy
        + std::default::Default
        + for<'a> Deserialize<'a>
        + Serialize
        + Debug
        + LowerHex,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl<T, const N: usize> std::fmt::Display for Array<T, N>
where
    T: std::marker::Copy
        + std::default::Default
        + for<'a> Deserialize<'a>
        + Serialize
        + Debug
        + LowerHex,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        LowerHex::fmt(self, f)
    }
}

impl<T, const N: usize> Default for Array<T, N>
where
    T: std::marker::Copy + std::default::Default + for<'a> Deserialize<'a> + Serialize,
{
    fn default() -> Self {
        Self([T::default(); N])
    }
}

impl<const N: usize> TryFrom<&[u8]> for Array<u8, N> {
    type Error = TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        Ok(Array(slice.try_into()?))
    }
}

impl<T, const N: usize> From<[T; N]> for Array<T, N>
where
    T: std::marker::Copy + std::default::Default + for<'a> Deserialize<'a> + Serialize,
{
    fn from(array: [T; N]) -> Self {
        Array(array)
    }
}

impl<T, const N: usize> AsRef<[T]> for Array<T, N>
where
    T: std::marker::Copy + std::default::Default + for<'a> Deserialize<'a> + Serialize,
{
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.0.as_ref()
    }
}

impl<T, const N: usize> Deref for Array<T, N>
where
    T: std::marker::Copy + std::default::Default + for<'a> Deserialize<'a> + Serialize,
{
    type Target = [T; N];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
