//! Memory helpers for SIMD code: aligned buffers, alignment arithmetic and
//! memory fences.

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::error::{allocation_error, layout_error, Result};
use crate::scalar::Scalar;

/// An owned, zero-initialised slice with a caller-chosen alignment.
///
/// Vector loads and stores through [`try_load_aligned`] and
/// [`try_store_aligned`] need register-aligned memory, which `Vec<T>` does not
/// guarantee. The buffer derefs to `[T]`, so every slice API works on it.
///
/// [`try_load_aligned`]: crate::simd::U32x4::try_load_aligned
/// [`try_store_aligned`]: crate::simd::U32x4::try_store_aligned
///
/// ```
/// use avel::simd::U32x4;
/// use avel::utils::AlignedBuffer;
///
/// let mut buf = AlignedBuffer::<u32>::new(8, U32x4::ALIGNMENT).unwrap();
/// U32x4::splat(7).try_store_aligned(&mut buf[4..]).unwrap();
/// assert_eq!(buf[..], [0, 0, 0, 0, 7, 7, 7, 7]);
/// ```
pub struct AlignedBuffer<T: Scalar> {
    ptr: NonNull<T>,
    len: usize,
    layout: Layout,
}

// SAFETY: the buffer owns its allocation exclusively, like `Box<[T]>`.
unsafe impl<T: Scalar> Send for AlignedBuffer<T> {}
unsafe impl<T: Scalar> Sync for AlignedBuffer<T> {}

impl<T: Scalar> AlignedBuffer<T> {
    /// Allocates `len` zeroed elements aligned to `align` bytes.
    ///
    /// `align` must be a power of two no smaller than the alignment of `T`.
    pub fn new(len: usize, align: usize) -> Result<Self> {
        if !align.is_power_of_two() || align < mem::align_of::<T>() {
            return Err(layout_error(
                len,
                align,
                format!(
                    "alignment must be a power of two of at least {}",
                    mem::align_of::<T>()
                ),
            ));
        }

        let size = len
            .checked_mul(mem::size_of::<T>())
            .ok_or_else(|| layout_error(len, align, "size overflows usize"))?;
        let layout = Layout::from_size_align(size, align)
            .map_err(|e| layout_error(size, align, e.to_string()))?;

        if size == 0 {
            // no allocation; a well-aligned dangling pointer is enough
            let ptr = NonNull::new(align as *mut T)
                .ok_or_else(|| layout_error(size, align, "zero alignment"))?;
            return Ok(Self { ptr, len, layout });
        }

        // SAFETY: layout has non-zero size
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(raw as *mut T)
            .ok_or_else(|| allocation_error(size, align, "allocator returned null"))?;

        Ok(Self { ptr, len, layout })
    }

    #[inline]
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }
}

impl<T: Scalar> Drop for AlignedBuffer<T> {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, self.layout) };
        }
    }
}

impl<T: Scalar> Deref for AlignedBuffer<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Scalar> DerefMut for AlignedBuffer<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Scalar> std::fmt::Debug for AlignedBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("alignment", &self.alignment())
            .field("data", &self.deref())
            .finish()
    }
}

impl<T: Scalar> From<AlignedBuffer<T>> for Vec<T> {
    fn from(buf: AlignedBuffer<T>) -> Self {
        buf.to_vec()
    }
}

/// Rounds `ptr` down to a multiple of `align`, which must be a power of two.
#[inline(always)]
pub fn align_down<T>(ptr: *const T, align: usize) -> *const T {
    debug_assert!(align.is_power_of_two());
    ptr.wrapping_byte_sub(ptr as usize & (align - 1))
}

/// Whether `ptr` is a multiple of `align`, which must be a power of two.
#[inline(always)]
pub fn is_aligned_to<T>(ptr: *const T, align: usize) -> bool {
    debug_assert!(align.is_power_of_two());
    ptr as usize & (align - 1) == 0
}

/// Orders all earlier loads before any later load.
#[inline(always)]
pub fn load_fence() {
    #[cfg(all(sse, target_arch = "x86_64"))]
    unsafe {
        std::arch::x86_64::_mm_lfence()
    };
    #[cfg(all(sse, target_arch = "x86"))]
    unsafe {
        std::arch::x86::_mm_lfence()
    };
    #[cfg(not(sse))]
    std::sync::atomic::fence(std::sync::atomic::Ordering::Acquire);
}

/// Orders all earlier stores before any later store, including
/// non-temporal ones.
#[inline(always)]
pub fn store_fence() {
    #[cfg(all(sse, target_arch = "x86_64"))]
    unsafe {
        std::arch::x86_64::_mm_sfence()
    };
    #[cfg(all(sse, target_arch = "x86"))]
    unsafe {
        std::arch::x86::_mm_sfence()
    };
    #[cfg(not(sse))]
    std::sync::atomic::fence(std::sync::atomic::Ordering::Release);
}

/// Full fence over loads and stores.
#[inline(always)]
pub fn load_store_fence() {
    #[cfg(all(sse, target_arch = "x86_64"))]
    unsafe {
        std::arch::x86_64::_mm_mfence()
    };
    #[cfg(all(sse, target_arch = "x86"))]
    unsafe {
        std::arch::x86::_mm_mfence()
    };
    #[cfg(not(sse))]
    std::sync::atomic::fence(std::sync::atomic::Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AvelError;

    mod buffer_tests {
        use super::*;

        #[test]
        fn test_zeroed_and_aligned() {
            for align in [4, 16, 32, 64, 4096] {
                let buf = AlignedBuffer::<u32>::new(37, align).unwrap();
                assert_eq!(buf.len(), 37);
                assert!(buf.iter().all(|&x| x == 0));
                assert!(is_aligned_to(buf.as_ptr(), align));
                assert_eq!(buf.alignment(), align);
            }
        }

        #[test]
        fn test_writes_and_conversion() {
            let mut buf = AlignedBuffer::<i16>::new(5, 32).unwrap();
            buf.copy_from_slice(&[1, -2, 3, -4, 5]);
            buf[2] = 30;
            assert_eq!(Vec::from(buf), vec![1, -2, 30, -4, 5]);
        }

        #[test]
        fn test_empty_buffer() {
            let buf = AlignedBuffer::<u64>::new(0, 64).unwrap();
            assert!(buf.is_empty());
            assert!(is_aligned_to(buf.as_ptr(), 64));
        }

        #[test]
        fn test_bad_layouts() {
            assert!(matches!(
                AlignedBuffer::<u32>::new(4, 24),
                Err(AvelError::LayoutError { alignment: 24, .. })
            ));
            assert!(matches!(
                AlignedBuffer::<u64>::new(4, 2),
                Err(AvelError::LayoutError { .. })
            ));
            assert!(matches!(
                AlignedBuffer::<u64>::new(usize::MAX / 4, 16),
                Err(AvelError::LayoutError { .. })
            ));
        }
    }

    mod pointer_tests {
        use super::*;

        #[test]
        fn test_align_down() {
            let p = 0x1234 as *const u8;
            assert_eq!(align_down(p, 16) as usize, 0x1230);
            assert_eq!(align_down(p, 4) as usize, 0x1234);
            assert_eq!(align_down(p, 0x1000) as usize, 0x1000);
        }

        #[test]
        fn test_is_aligned_to() {
            assert!(is_aligned_to(0x40 as *const u32, 64));
            assert!(!is_aligned_to(0x44 as *const u32, 64));
            assert!(is_aligned_to(0x44 as *const u32, 4));
        }

        #[test]
        fn test_fences() {
            load_fence();
            store_fence();
            load_store_fence();
        }
    }
}
