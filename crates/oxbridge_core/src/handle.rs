//! Handle lifecycle.
//!
//! An [`OpaqueHandle`] is the only owner of a native pointer. It is created
//! once per pointer the native side hands out, and dropping it calls the
//! entity's release function exactly once. There is no reference counting:
//! the native library has no notion of shared ownership.
//!
//! Lifecycle per pointer:
//!
//! ```text
//! raw pointer --wrap--> OpaqueHandle --drop / release--> released
//!                            |
//!                            +--into_raw--> owned by a consuming native call
//! ```
//!
//! A released handle no longer exists as a value, so use-after-release and
//! double release do not type-check.

use crate::error::{CoreError, CoreResult};
use oxbridge_abi::{CRustObjectSlice, RawHandle, ReleaseFn};
use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

enum Owner {
    /// Released by the entity's native delete function.
    Native(ReleaseFn),
    /// A host-allocated copy of a foreign vector record, `len` words long.
    Record { len: usize },
}

/// An owned opaque native resource.
pub struct OpaqueHandle {
    ptr: NonNull<RawHandle>,
    owner: Owner,
    entity: &'static str,
}

// Safety: ownership is unique, so moving the handle to another thread moves
// the only access path with it. Shared access is not `Sync`.
unsafe impl Send for OpaqueHandle {}

impl OpaqueHandle {
    /// Takes ownership of a pointer returned by the native library.
    ///
    /// # Safety
    ///
    /// - `ptr` must be a live handle that no other wrapper owns
    /// - `release` must be the delete function for `ptr`'s entity type
    pub unsafe fn wrap(
        ptr: *mut RawHandle,
        release: ReleaseFn,
        entity: &'static str,
    ) -> CoreResult<Self> {
        let ptr = NonNull::new(ptr).ok_or(CoreError::NullHandle { entity })?;
        Ok(Self {
            ptr,
            owner: Owner::Native(release),
            entity,
        })
    }

    /// Takes ownership of a host-allocated record copy.
    pub(crate) fn from_record(words: Box<[u64]>, entity: &'static str) -> Self {
        let len = words.len();
        let raw = Box::into_raw(words).cast::<u64>();
        // Safety: `Box::into_raw` never returns null.
        let ptr = unsafe { NonNull::new_unchecked(raw.cast::<RawHandle>()) };
        Self {
            ptr,
            owner: Owner::Record { len },
            entity,
        }
    }

    /// Lends the pointer to a native getter.
    ///
    /// The pointer stays valid until this handle is dropped.
    pub fn as_ptr(&self) -> *mut RawHandle {
        self.ptr.as_ptr()
    }

    /// Name of the entity type this handle belongs to.
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Returns true if this handle is a host-owned foreign vector record.
    pub fn is_record(&self) -> bool {
        matches!(self.owner, Owner::Record { .. })
    }

    /// Gives up ownership to a native call that consumes the handle.
    ///
    /// The release function will not be called by the host. Record copies
    /// are host memory and cannot be handed over; they come back as `Err`.
    pub fn into_raw(self) -> Result<*mut RawHandle, Self> {
        if self.is_record() {
            return Err(self);
        }
        let ptr = self.ptr.as_ptr();
        std::mem::forget(self);
        Ok(ptr)
    }

    /// Releases the handle now. Same as dropping it.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for OpaqueHandle {
    fn drop(&mut self) {
        match self.owner {
            Owner::Native(release) => {
                tracing::trace!(entity = self.entity, "releasing native handle");
                // Safety: `wrap` made this the sole owner of a live pointer
                // paired with its own release function, and drop runs once.
                unsafe { release(self.ptr.as_ptr()) };
            }
            Owner::Record { len } => {
                let words = std::ptr::slice_from_raw_parts_mut(self.ptr.as_ptr().cast::<u64>(), len);
                // Safety: produced by `Box::into_raw` in `from_record`.
                drop(unsafe { Box::from_raw(words) });
            }
        }
    }
}

impl fmt::Debug for OpaqueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueHandle")
            .field("entity", &self.entity)
            .field("ptr", &self.ptr)
            .field("record", &self.is_record())
            .finish()
    }
}

/// Handle pointers lent to a native call as a [`CRustObjectSlice`].
///
/// The handles stay owned by the caller and must outlive the slice.
pub struct HandleSlice<'h> {
    ptrs: Vec<*const c_void>,
    _marker: PhantomData<&'h OpaqueHandle>,
}

impl<'h> HandleSlice<'h> {
    /// Collects the pointers of `handles`, in order.
    pub fn new<I>(handles: I) -> Self
    where
        I: IntoIterator<Item = &'h OpaqueHandle>,
    {
        Self {
            ptrs: handles.into_iter().map(|h| h.as_ptr().cast_const()).collect(),
            _marker: PhantomData,
        }
    }

    /// Number of handles.
    pub fn len(&self) -> usize {
        self.ptrs.len()
    }

    /// Returns true if there are no handles.
    pub fn is_empty(&self) -> bool {
        self.ptrs.is_empty()
    }

    /// Returns the native view.
    pub fn as_native(&self) -> CRustObjectSlice<'_> {
        CRustObjectSlice::from_ptrs(&self.ptrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{boxed_handle, handles_released, release_boxed};

    #[test]
    fn wrap_null_fails() {
        let result = unsafe { OpaqueHandle::wrap(std::ptr::null_mut(), release_boxed, "UserId") };
        assert_eq!(result.unwrap_err(), CoreError::NullHandle { entity: "UserId" });
    }

    #[test]
    fn drop_releases_once() {
        let before = handles_released();
        let handle = unsafe { OpaqueHandle::wrap(boxed_handle(1), release_boxed, "DeviceId") }.unwrap();
        assert_eq!(handle.entity(), "DeviceId");
        assert!(!handle.is_record());

        drop(handle);
        assert_eq!(handles_released(), before + 1);
    }

    #[test]
    fn explicit_release() {
        let before = handles_released();
        let handle = unsafe { OpaqueHandle::wrap(boxed_handle(2), release_boxed, "PublicKey") }.unwrap();
        handle.release();
        assert_eq!(handles_released(), before + 1);
    }

    #[test]
    fn exactly_once_over_ten_thousand_handles() {
        let before = handles_released();
        for i in 0..10_000u64 {
            let handle = unsafe { OpaqueHandle::wrap(boxed_handle(i), release_boxed, "GroupId") }.unwrap();
            // Getters are idempotent and leave the handle intact
            let value = unsafe { *handle.as_ptr().cast::<u64>() };
            assert_eq!(value, i);
        }
        assert_eq!(handles_released(), before + 10_000);
    }

    #[test]
    fn into_raw_skips_release() {
        let before = handles_released();
        let handle = unsafe { OpaqueHandle::wrap(boxed_handle(3), release_boxed, "UserId") }.unwrap();

        let raw = handle.into_raw().unwrap();
        assert_eq!(handles_released(), before);

        // The consuming side releases it
        unsafe { release_boxed(raw) };
        assert_eq!(handles_released(), before + 1);
    }

    #[test]
    fn record_is_not_natively_released() {
        let before = handles_released();
        let handle = OpaqueHandle::from_record(vec![7u64, 8].into_boxed_slice(), "GroupMeta");
        assert!(handle.is_record());
        assert_eq!(unsafe { *handle.as_ptr().cast::<u64>().add(1) }, 8);

        let handle = handle.into_raw().unwrap_err();
        drop(handle);
        assert_eq!(handles_released(), before);
    }

    #[test]
    fn handle_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<OpaqueHandle>();
    }

    #[test]
    fn handle_slice_preserves_order() {
        let a = unsafe { OpaqueHandle::wrap(boxed_handle(10), release_boxed, "UserId") }.unwrap();
        let b = unsafe { OpaqueHandle::wrap(boxed_handle(20), release_boxed, "UserId") }.unwrap();

        let slice = HandleSlice::new([&a, &b]);
        assert_eq!(slice.len(), 2);

        let native = slice.as_native();
        assert_eq!(native.len, 2);
        assert_eq!(unsafe { native.ptr_at(0) }, a.as_ptr().cast_const());
        assert_eq!(unsafe { native.ptr_at(1) }, b.as_ptr().cast_const());
    }

    #[test]
    fn empty_handle_slice() {
        let slice = HandleSlice::new(std::iter::empty());
        assert!(slice.is_empty());
        assert_eq!(slice.as_native().len, 0);
    }
}
