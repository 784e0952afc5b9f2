//! Slice and vector types for FFI.

use std::ffi::c_void;
use std::marker::PhantomData;

/// A borrowed byte slice passed into native calls.
///
/// The native byte type is signed; the bit patterns are the host's bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CRustSlicei8<'a> {
    /// Pointer to data.
    pub data: *const i8,
    /// Length in bytes.
    pub len: usize,
    _marker: PhantomData<&'a [u8]>,
}

impl<'a> CRustSlicei8<'a> {
    /// Views host bytes as a native `i8` slice. No value is transformed.
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self {
            data: bytes.as_ptr().cast(),
            len: bytes.len(),
            _marker: PhantomData,
        }
    }

    /// Creates a slice from raw parts handed out by the native side.
    ///
    /// # Safety
    ///
    /// `data` must point to `len` readable bytes that outlive `'a`.
    pub unsafe fn from_raw_parts(data: *const i8, len: usize) -> Self {
        Self {
            data,
            len,
            _marker: PhantomData,
        }
    }

    /// Returns the bytes, reinterpreted as unsigned.
    ///
    /// # Safety
    ///
    /// `data` must point to at least `len` readable bytes for `'a`.
    pub unsafe fn as_bytes(&self) -> &'a [u8] {
        if self.data.is_null() || self.len == 0 {
            return &[];
        }
        std::slice::from_raw_parts(self.data.cast(), self.len)
    }
}

/// A native-allocated byte vector.
///
/// Must be copied out and freed by the native byte-vector free function
/// exactly once.
#[repr(C)]
#[derive(Debug)]
pub struct CRustVeci8 {
    /// Pointer to data.
    pub data: *const i8,
    /// Length in bytes.
    pub len: usize,
    /// Capacity (for the native allocator).
    pub capacity: usize,
}

impl CRustVeci8 {
    /// Creates a vector the way the native side allocates one.
    pub fn from_vec(vec: Vec<u8>) -> Self {
        let mut vec = std::mem::ManuallyDrop::new(vec);
        Self {
            data: vec.as_mut_ptr().cast(),
            len: vec.len(),
            capacity: vec.capacity(),
        }
    }

    /// Returns the bytes, reinterpreted as unsigned.
    ///
    /// # Safety
    ///
    /// `data` must point to at least `len` readable bytes.
    pub unsafe fn as_bytes(&self) -> &[u8] {
        if self.data.is_null() || self.len == 0 {
            return &[];
        }
        std::slice::from_raw_parts(self.data.cast(), self.len)
    }

    /// Converts back to a Vec, consuming the vector.
    ///
    /// # Safety
    ///
    /// The vector must have been created by [`CRustVeci8::from_vec`].
    pub unsafe fn into_vec(self) -> Vec<u8> {
        if self.data.is_null() {
            return Vec::new();
        }
        Vec::from_raw_parts(self.data.cast_mut().cast(), self.len, self.capacity)
    }
}

/// A native-allocated vector of `i32`.
#[repr(C)]
#[derive(Debug)]
pub struct CRustVeci32 {
    /// Pointer to data.
    pub data: *const i32,
    /// Number of elements.
    pub len: usize,
    /// Capacity in elements.
    pub capacity: usize,
}

impl CRustVeci32 {
    /// Creates a vector the way the native side allocates one.
    pub fn from_vec(vec: Vec<i32>) -> Self {
        let mut vec = std::mem::ManuallyDrop::new(vec);
        Self {
            data: vec.as_mut_ptr(),
            len: vec.len(),
            capacity: vec.capacity(),
        }
    }

    /// Returns the elements.
    ///
    /// # Safety
    ///
    /// `data` must point to at least `len` readable, aligned `i32`s.
    pub unsafe fn as_slice(&self) -> &[i32] {
        if self.data.is_null() || self.len == 0 {
            return &[];
        }
        std::slice::from_raw_parts(self.data, self.len)
    }

    /// Converts back to a Vec, consuming the vector.
    ///
    /// # Safety
    ///
    /// The vector must have been created by [`CRustVeci32::from_vec`].
    pub unsafe fn into_vec(self) -> Vec<i32> {
        if self.data.is_null() {
            return Vec::new();
        }
        Vec::from_raw_parts(self.data.cast_mut(), self.len, self.capacity)
    }
}

/// A native-allocated vector of fixed-size opaque records.
///
/// Record `i` starts at `data + i * step`. The record layout is only known
/// to the native library.
#[repr(C)]
#[derive(Debug)]
pub struct CRustForeignVec {
    /// Base pointer of the record array.
    pub data: *mut c_void,
    /// Number of records.
    pub len: usize,
    /// Capacity in records (for the native allocator).
    pub capacity: usize,
    /// Stride of one record in bytes.
    pub step: usize,
}

impl CRustForeignVec {
    /// Describes a vector of `T` records the way the native side lays them out.
    ///
    /// The allocation is leaked into the returned descriptor.
    pub fn from_vec<T>(vec: Vec<T>) -> Self {
        let mut vec = std::mem::ManuallyDrop::new(vec);
        Self {
            data: vec.as_mut_ptr().cast(),
            len: vec.len(),
            capacity: vec.capacity(),
            step: std::mem::size_of::<T>(),
        }
    }

    /// Describes records that stay owned by someone else.
    pub fn borrowed<T>(records: &[T]) -> Self {
        Self {
            data: records.as_ptr().cast_mut().cast(),
            len: records.len(),
            capacity: records.len(),
            step: std::mem::size_of::<T>(),
        }
    }

    /// Creates an empty vector with a null base pointer.
    pub fn empty(step: usize) -> Self {
        Self {
            data: std::ptr::null_mut(),
            len: 0,
            capacity: 0,
            step,
        }
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total number of bytes spanned by the records, if it fits in `usize`.
    pub fn byte_len(&self) -> Option<usize> {
        self.len.checked_mul(self.step)
    }

    /// Converts back to a Vec, consuming the descriptor.
    ///
    /// # Safety
    ///
    /// The descriptor must have been created by [`CRustForeignVec::from_vec`]
    /// with the same `T`.
    pub unsafe fn into_vec<T>(self) -> Vec<T> {
        if self.data.is_null() {
            return Vec::new();
        }
        Vec::from_raw_parts(self.data.cast(), self.len, self.capacity)
    }
}

/// A borrowed array of handle pointers passed into native calls.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CRustObjectSlice<'a> {
    /// Pointer to the first handle pointer.
    pub data: *const c_void,
    /// Number of handles.
    pub len: usize,
    /// Stride in bytes (the size of a pointer).
    pub step: usize,
    _marker: PhantomData<&'a [*const c_void]>,
}

impl<'a> CRustObjectSlice<'a> {
    /// Views an array of handle pointers.
    pub fn from_ptrs(ptrs: &'a [*const c_void]) -> Self {
        Self {
            data: ptrs.as_ptr().cast(),
            len: ptrs.len(),
            step: std::mem::size_of::<*const c_void>(),
            _marker: PhantomData,
        }
    }

    /// Reads the handle pointer at `index`.
    ///
    /// # Safety
    ///
    /// `index < len` and the slice must still borrow live memory.
    pub unsafe fn ptr_at(&self, index: usize) -> *const c_void {
        let addr = self.data.cast::<u8>().add(index * self.step);
        std::ptr::read_unaligned(addr.cast::<*const c_void>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_reinterprets_high_bytes() {
        let bytes = [0x00u8, 0x7f, 0x80, 0xff];
        let slice = CRustSlicei8::from_bytes(&bytes);
        assert_eq!(slice.len, 4);

        let signed = unsafe { std::slice::from_raw_parts(slice.data, slice.len) };
        assert_eq!(signed, &[0i8, 127, -128, -1]);
        assert_eq!(unsafe { slice.as_bytes() }, &bytes);
    }

    #[test]
    fn vec_i8_from_vec() {
        let vec = CRustVeci8::from_vec(vec![1, 2, 250]);
        assert_eq!(vec.len, 3);
        assert_eq!(unsafe { vec.as_bytes() }, &[1, 2, 250]);
        assert_eq!(unsafe { vec.into_vec() }, vec![1, 2, 250]);
    }

    #[test]
    fn vec_i32_from_vec() {
        let vec = CRustVeci32::from_vec(vec![-1, 0, 7]);
        assert_eq!(unsafe { vec.as_slice() }, &[-1, 0, 7]);
        assert_eq!(unsafe { vec.into_vec() }, vec![-1, 0, 7]);
    }

    #[test]
    fn foreign_vec_stride() {
        let vec = CRustForeignVec::from_vec(vec![[0u64; 3], [1u64; 3]]);
        assert_eq!(vec.len, 2);
        assert_eq!(vec.step, 24);
        assert_eq!(vec.byte_len(), Some(48));

        let back: Vec<[u64; 3]> = unsafe { vec.into_vec() };
        assert_eq!(back[1], [1u64; 3]);
    }

    #[test]
    fn foreign_vec_byte_len_overflow() {
        let vec = CRustForeignVec {
            data: std::ptr::null_mut(),
            len: usize::MAX,
            capacity: 0,
            step: 2,
        };
        assert_eq!(vec.byte_len(), None);
    }

    #[test]
    fn foreign_vec_empty() {
        let vec = CRustForeignVec::empty(16);
        assert!(vec.is_empty());
        assert!(vec.data.is_null());
        assert_eq!(vec.byte_len(), Some(0));
    }

    #[test]
    fn object_slice_reads_pointers() {
        let a = 1u32;
        let b = 2u32;
        let ptrs = [
            std::ptr::addr_of!(a).cast::<c_void>(),
            std::ptr::addr_of!(b).cast::<c_void>(),
        ];
        let slice = CRustObjectSlice::from_ptrs(&ptrs);
        assert_eq!(slice.len, 2);
        assert_eq!(slice.step, std::mem::size_of::<usize>());
        assert_eq!(unsafe { slice.ptr_at(1) }, ptrs[1]);
    }
}
