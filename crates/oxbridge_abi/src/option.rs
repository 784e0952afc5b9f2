//! Tagged union for optional values.

use crate::types::RawHandle;
use std::fmt;
use std::mem::ManuallyDrop;

/// Payload of a [`CRustOption`].
///
/// When the option is absent only `uninit` is written; reading `data`
/// in that state reads uninitialized memory.
#[repr(C)]
pub union CRustOptionUnion<T> {
    /// Absent sentinel.
    pub uninit: u8,
    /// Present value.
    pub data: ManuallyDrop<T>,
}

/// An optional value crossing the boundary.
#[repr(C)]
pub struct CRustOption<T> {
    /// Payload, valid only when `is_some` is non-zero.
    pub val: CRustOptionUnion<T>,
    /// Present flag.
    pub is_some: u8,
}

/// Optional opaque handle.
pub type CRustOptionHandle = CRustOption<*mut RawHandle>;

impl<T> CRustOption<T> {
    /// Creates an absent option.
    pub fn none() -> Self {
        Self {
            val: CRustOptionUnion { uninit: 0 },
            is_some: 0,
        }
    }

    /// Creates a present option.
    pub fn some(value: T) -> Self {
        Self {
            val: CRustOptionUnion {
                data: ManuallyDrop::new(value),
            },
            is_some: 1,
        }
    }

    /// Returns true if the present flag is set.
    pub fn is_some(&self) -> bool {
        self.is_some != 0
    }
}

impl<T> fmt::Debug for CRustOption<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CRustOption")
            .field("is_some", &self.is_some)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_clears_flag() {
        let opt: CRustOption<u64> = CRustOption::none();
        assert!(!opt.is_some());
        assert_eq!(opt.is_some, 0);
    }

    #[test]
    fn some_sets_flag() {
        let opt = CRustOption::some(42u64);
        assert!(opt.is_some());
        assert_eq!(unsafe { *opt.val.data }, 42);
    }

    #[test]
    fn any_nonzero_flag_is_present() {
        let mut opt = CRustOption::some(1i8);
        opt.is_some = 0xff;
        assert!(opt.is_some());
    }
}
