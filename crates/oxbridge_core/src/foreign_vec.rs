//! Foreign vector iterator.
//!
//! Walks a native record array described by `(data, len, step)` and gives
//! every record its own host allocation before decoding it. No pointer into
//! the native buffer survives the walk.
//!
//! The iterator never frees the native buffer. Whoever produced the
//! [`CRustForeignVec`] stays responsible for it.

use crate::error::{CoreError, CoreResult};
use crate::handle::OpaqueHandle;
use oxbridge_abi::CRustForeignVec;
use std::iter::FusedIterator;
use std::marker::PhantomData;

const WORD: usize = std::mem::size_of::<u64>();

/// Iterator over host copies of foreign vector records.
///
/// Yields exactly `len` handles in native order, then stops for good.
#[derive(Debug)]
pub struct ForeignRecords<'v> {
    base: *const u8,
    stride: usize,
    next: usize,
    len: usize,
    entity: &'static str,
    _marker: PhantomData<&'v CRustForeignVec>,
}

impl ForeignRecords<'_> {
    fn copy_record(&self, index: usize) -> OpaqueHandle {
        let mut words = vec![0u64; self.stride.div_ceil(WORD)].into_boxed_slice();
        // Safety: `index < len` and `len * stride` was checked not to
        // overflow, so the source range lies inside the native buffer; the
        // destination holds at least `stride` bytes.
        unsafe {
            let src = self.base.add(index * self.stride);
            std::ptr::copy_nonoverlapping(src, words.as_mut_ptr().cast::<u8>(), self.stride);
        }
        OpaqueHandle::from_record(words, self.entity)
    }
}

impl Iterator for ForeignRecords<'_> {
    type Item = OpaqueHandle;

    fn next(&mut self) -> Option<OpaqueHandle> {
        if self.next >= self.len {
            return None;
        }
        let record = self.copy_record(self.next);
        self.next += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ForeignRecords<'_> {}

impl FusedIterator for ForeignRecords<'_> {}

/// Starts walking the records of `v`.
///
/// The base pointer is not touched when `v` is empty.
///
/// # Safety
///
/// When `v.len > 0`, `v.data` must point to `v.len * v.step` readable bytes
/// that stay valid while the iterator is alive.
pub unsafe fn records<'v>(
    v: &'v CRustForeignVec,
    entity: &'static str,
) -> CoreResult<ForeignRecords<'v>> {
    if v.byte_len().is_none() {
        return Err(CoreError::LengthOverflow {
            count: v.len,
            stride: v.step,
        });
    }
    if v.len > 0 && v.data.is_null() {
        return Err(CoreError::NullHandle { entity });
    }

    Ok(ForeignRecords {
        base: v.data.cast_const().cast(),
        stride: v.step,
        next: 0,
        len: v.len,
        entity,
        _marker: PhantomData,
    })
}

/// Drains a foreign vector into host values, preserving native order.
///
/// Each record is copied into host memory, wrapped as an [`OpaqueHandle`]
/// and passed to `decode`. The native buffer itself is left alone.
///
/// # Safety
///
/// Same contract as [`records`].
pub unsafe fn collect<T, F>(v: CRustForeignVec, entity: &'static str, decode: F) -> CoreResult<Vec<T>>
where
    F: FnMut(OpaqueHandle) -> T,
{
    let decoded: Vec<T> = records(&v, entity)?.map(decode).collect();
    tracing::trace!(entity, count = v.len, stride = v.step, "drained foreign vector");
    Ok(decoded)
}
