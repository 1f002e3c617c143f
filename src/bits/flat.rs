//! Fixed-width packed integer array.
//!
//! Every value occupies exactly `value_size` bits, the bit width of the
//! largest value stored. Values are packed into `u64` units and may straddle
//! two units.

use crate::binary::PodVec;
use crate::error::{Error, Result};
use crate::io::{Source, Writer};
use std::io::Write;

#[derive(Clone, Debug, Default)]
pub struct FlatVector {
    units: PodVec<u64>,
    value_size: u32,
    mask: u32,
    size: usize,
}

impl FlatVector {
    /// Pack `values` at the minimal common bit width.
    pub fn build(values: &[u32]) -> Self {
        let max_value = values.iter().copied().max().unwrap_or(0);
        let value_size = u32::BITS - max_value.leading_zeros();
        let mask = mask_for(value_size);

        let num_units = if values.is_empty() {
            0
        } else if value_size == 0 {
            1
        } else {
            (value_size as usize * values.len()).div_ceil(64)
        };

        let mut units = vec![0u64; num_units];
        for (i, &value) in values.iter().enumerate() {
            let pos = i * value_size as usize;
            let unit_id = pos / 64;
            let offset = pos % 64;
            units[unit_id] |= (value as u64) << offset;
            if offset + value_size as usize > 64 {
                units[unit_id + 1] |= (value as u64) >> (64 - offset);
            }
        }

        Self {
            units: units.into(),
            value_size,
            mask,
            size: values.len(),
        }
    }

    /// Value at index `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    #[inline]
    pub fn get(&self, i: usize) -> u32 {
        assert!(i < self.size, "index {} out of bounds for length {}", i, self.size);
        let pos = i * self.value_size as usize;
        let unit_id = pos / 64;
        let offset = pos % 64;
        let mut value = self.units[unit_id] >> offset;
        if offset + self.value_size as usize > 64 {
            value |= self.units[unit_id + 1] << (64 - offset);
        }
        value as u32 & self.mask
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Bits per value.
    #[inline]
    pub fn value_size(&self) -> u32 {
        self.value_size
    }

    pub fn total_size(&self) -> usize {
        self.units.byte_len()
    }

    pub fn io_size(&self) -> usize {
        self.units.io_size() + 4 + 4 + 8
    }

    pub(crate) fn read_from<S: Source>(src: &mut S) -> Result<Self> {
        let units = src.read_vec::<u64>()?;
        let value_size = src.read_u32()?;
        if value_size > 32 {
            return Err(Error::format(format!("value size {} exceeds 32 bits", value_size)));
        }
        let mask = src.read_u32()?;
        if mask != mask_for(value_size) {
            return Err(Error::format(format!(
                "mask {:#x} does not match value size {}",
                mask, value_size
            )));
        }
        let size = usize::try_from(src.read_u64()?)
            .map_err(|_| Error::Size("flat vector length exceeds address space"))?;
        let needed_bits = (value_size as usize)
            .checked_mul(size)
            .ok_or(Error::Size("flat vector length exceeds address space"))?;
        if needed_bits > units.len() * 64 || (size > 0 && units.is_empty()) {
            return Err(Error::format(format!(
                "{} values of {} bits do not fit in {} words",
                size,
                value_size,
                units.len()
            )));
        }
        Ok(Self {
            units,
            value_size,
            mask,
            size,
        })
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_vec(&self.units)?;
        writer.write_u32(self.value_size)?;
        writer.write_u32(self.mask)?;
        writer.write_u64(self.size as u64)
    }
}

#[inline]
fn mask_for(value_size: u32) -> u32 {
    if value_size == 0 {
        0
    } else {
        u32::MAX >> (32 - value_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Reader;

    #[test]
    fn test_minimal_width() {
        assert_eq!(FlatVector::build(&[]).value_size(), 0);
        assert_eq!(FlatVector::build(&[0, 0, 0]).value_size(), 0);
        assert_eq!(FlatVector::build(&[1]).value_size(), 1);
        assert_eq!(FlatVector::build(&[5, 2]).value_size(), 3);
        assert_eq!(FlatVector::build(&[u32::MAX]).value_size(), 32);
    }

    #[test]
    fn test_zero_width_values() {
        let fv = FlatVector::build(&[0, 0, 0, 0]);
        assert_eq!(fv.len(), 4);
        assert!((0..4).all(|i| fv.get(i) == 0));
    }

    #[test]
    fn test_values_straddle_units() {
        // 7-bit values cross unit boundaries at irregular offsets.
        let values: Vec<u32> = (0..200).map(|i| (i * 37) % 128).collect();
        let fv = FlatVector::build(&values);
        assert_eq!(fv.value_size(), 7);
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(fv.get(i), v, "index {}", i);
        }
    }

    #[test]
    fn test_full_width_values() {
        let values = [u32::MAX, 0, 0x8000_0001, 12345];
        let fv = FlatVector::build(&values);
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(fv.get(i), v);
        }
    }

    #[test]
    fn test_io_roundtrip() {
        let values: Vec<u32> = (0..100).map(|i| i * 1000).collect();
        let fv = FlatVector::build(&values);

        let mut bytes = Vec::new();
        fv.write_to(&mut Writer::new(&mut bytes)).unwrap();
        assert_eq!(bytes.len(), fv.io_size());

        let restored = FlatVector::read_from(&mut Reader::new(&bytes[..])).unwrap();
        assert_eq!(restored.len(), 100);
        assert_eq!(restored.get(99), 99_000);
    }

    #[test]
    fn test_restore_rejects_bad_mask() {
        let mut bytes = Vec::new();
        {
            let mut writer = Writer::new(&mut bytes);
            writer.write_vec::<u64>(&[0]).unwrap();
            writer.write_u32(4).unwrap();
            writer.write_u32(0xFF).unwrap();
            writer.write_u64(1).unwrap();
        }
        assert!(matches!(
            FlatVector::read_from(&mut Reader::new(&bytes[..])),
            Err(Error::Format(_))
        ));
    }
}
