use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

const KILOBYTE: u64 = 1024;
const MEGABYTE: u64 = KILOBYTE * 1024;
const GIGABYTE: u64 = MEGABYTE * 1024;

/// A size of binary data with units.
///
/// Sizes add up (`+`, `+=`, [`Sum`]) so aggregates over many assets never
/// fall back to raw integers. Multiples are binary (1 KB = 1024 bytes).
///
/// The display form is the exact byte count with a `B` suffix (`609994B`);
/// this is also the format stored as the size-at-save snapshot. Parsing
/// accepts `B`, `KB`, `MB` and `GB` suffixes, case-insensitively, and a bare
/// number as bytes.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataSize {
    bytes: u64,
}

impl DataSize {
    pub const fn zero() -> Self {
        Self { bytes: 0 }
    }

    pub const fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    pub const fn from_kilobytes(kilobytes: u64) -> Self {
        Self::from_bytes(kilobytes.saturating_mul(KILOBYTE))
    }

    pub const fn from_megabytes(megabytes: u64) -> Self {
        Self::from_bytes(megabytes.saturating_mul(MEGABYTE))
    }

    pub const fn from_gigabytes(gigabytes: u64) -> Self {
        Self::from_bytes(gigabytes.saturating_mul(GIGABYTE))
    }

    pub const fn bytes(&self) -> u64 {
        self.bytes
    }

    pub const fn is_zero(&self) -> bool {
        self.bytes == 0
    }

    /// Human-oriented rendering in the largest whole-ish unit (`1.5 MB`).
    pub fn to_human(&self) -> String {
        let (unit, divisor) = match self.bytes {
            b if b >= GIGABYTE => ("GB", GIGABYTE),
            b if b >= MEGABYTE => ("MB", MEGABYTE),
            b if b >= KILOBYTE => ("KB", KILOBYTE),
            _ => return format!("{} B", self.bytes),
        };
        format!("{:.1} {unit}", self.bytes as f64 / divisor as f64)
    }
}

impl Add for DataSize {
    type Output = DataSize;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_bytes(self.bytes.saturating_add(rhs.bytes))
    }
}

impl AddAssign for DataSize {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for DataSize {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl<'a> Sum<&'a DataSize> for DataSize {
    fn sum<I: Iterator<Item = &'a DataSize>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for DataSize {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, unit) = trimmed.split_at(split);
        let value: u64 = digits
            .parse()
            .map_err(|_| TypeError::InvalidSize(s.to_string()))?;
        let multiplier = match unit.trim().to_ascii_uppercase().as_str() {
            "" | "B" => 1,
            "KB" => KILOBYTE,
            "MB" => MEGABYTE,
            "GB" => GIGABYTE,
            _ => return Err(TypeError::InvalidSize(s.to_string())),
        };
        value
            .checked_mul(multiplier)
            .map(Self::from_bytes)
            .ok_or_else(|| TypeError::InvalidSize(s.to_string()))
    }
}

impl TryFrom<String> for DataSize {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DataSize> for String {
    fn from(size: DataSize) -> Self {
        size.to_string()
    }
}

impl fmt::Debug for DataSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataSize({}B)", self.bytes)
    }
}

impl fmt::Display for DataSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}B", self.bytes)
    }
}
