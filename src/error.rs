//! Error types for avel operations.
//!
//! Kernels themselves never fail: arithmetic wraps the way the hardware does.
//! The fallible surface is construction of [`Denominator`](crate::denom::Denominator)s,
//! checked aligned memory access, aligned buffer allocation and capability
//! verification.

use std::fmt;

/// Everything that can go wrong in the fallible corners of the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvelError {
    /// A denominator was built from zero, or from a vector with a zero lane.
    ZeroDivisor,
    /// `try_load_aligned`/`try_store_aligned` got a slice that does not start
    /// on a register boundary.
    Misaligned { address: usize, required: usize },
    /// `try_load_aligned`/`try_store_aligned` got fewer than one vector's
    /// worth of elements.
    LengthMismatch { expected: usize, actual: usize },
    /// The allocator refused an [`AlignedBuffer`](crate::utils::AlignedBuffer).
    AllocationError {
        requested_size: usize,
        requested_alignment: usize,
        message: String,
    },
    /// An [`AlignedBuffer`](crate::utils::AlignedBuffer) was requested with a
    /// non-power-of-two alignment, one below the element alignment, or a byte
    /// size that overflows.
    LayoutError {
        size: usize,
        alignment: usize,
        message: String,
    },
    /// The crate was compiled for instruction-set features the running CPU lacks.
    MissingCapabilities { missing: Vec<&'static str> },
}

impl fmt::Display for AvelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvelError::ZeroDivisor => f.write_str("division by a zero denominator"),
            AvelError::Misaligned { address, required } => write!(
                f,
                "address {address:#x} is not on a {required}-byte vector boundary"
            ),
            AvelError::LengthMismatch { expected, actual } => write!(
                f,
                "vector access needs {expected} elements but the slice has {actual}"
            ),
            AvelError::AllocationError {
                requested_size,
                requested_alignment,
                message,
            } => write!(
                f,
                "aligned buffer allocation of {requested_size} bytes at \
                 {requested_alignment}-byte alignment failed: {message}"
            ),
            AvelError::LayoutError {
                size,
                alignment,
                message,
            } => write!(
                f,
                "bad aligned buffer layout ({size} x {alignment}): {message}"
            ),
            AvelError::MissingCapabilities { missing } => write!(
                f,
                "CPU lacks compiled-in instruction set features: {}",
                missing.join(", ")
            ),
        }
    }
}

impl std::error::Error for AvelError {}

pub type Result<T> = std::result::Result<T, AvelError>;

pub(crate) fn allocation_error(
    size: usize,
    alignment: usize,
    message: impl Into<String>,
) -> AvelError {
    AvelError::AllocationError {
        requested_size: size,
        requested_alignment: alignment,
        message: message.into(),
    }
}

pub(crate) fn layout_error(size: usize, alignment: usize, message: impl Into<String>) -> AvelError {
    AvelError::LayoutError {
        size,
        alignment,
        message: message.into(),
    }
}

pub(crate) fn misaligned<T>(ptr: *const T, required: usize) -> AvelError {
    AvelError::Misaligned {
        address: ptr as usize,
        required,
    }
}

pub(crate) fn length_mismatch(expected: usize, actual: usize) -> AvelError {
    AvelError::LengthMismatch { expected, actual }
}
