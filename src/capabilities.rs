//! Instruction-set capabilities.
//!
//! Kernels are chosen at compile time, so a binary built with
//! `-C target-feature=+avx2` executes AVX2 instructions unconditionally.
//! [`Capabilities::verify`] compares the compiled feature set with what the
//! running CPU reports, so applications can fail early instead of hitting an
//! illegal instruction.
//!
//! ```
//! use avel::capabilities::{Capabilities, Tier};
//!
//! let compiled = Capabilities::compiled();
//! if Tier::active() == Tier::Avx2 {
//!     assert!(compiled.contains(Capabilities::AVX2));
//! }
//! ```

use std::fmt;

use bitflags::bitflags;
use once_cell::sync::Lazy;

use crate::error::{AvelError, Result};

bitflags! {
    /// A set of instruction-set features.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u32 {
        const SSE2 = 1 << 0;
        const SSSE3 = 1 << 1;
        const SSE4_1 = 1 << 2;
        const SSE4_2 = 1 << 3;
        const POPCNT = 1 << 4;
        const LZCNT = 1 << 5;
        const BMI1 = 1 << 6;
        const AVX = 1 << 7;
        const AVX2 = 1 << 8;
        const AVX512F = 1 << 9;
        const AVX512VL = 1 << 10;
        const AVX512BW = 1 << 11;
        const AVX512CD = 1 << 12;
        const AVX512VPOPCNTDQ = 1 << 13;
        const NEON = 1 << 14;
    }
}

const NAMES: [(Capabilities, &str); 15] = [
    (Capabilities::SSE2, "sse2"),
    (Capabilities::SSSE3, "ssse3"),
    (Capabilities::SSE4_1, "sse4.1"),
    (Capabilities::SSE4_2, "sse4.2"),
    (Capabilities::POPCNT, "popcnt"),
    (Capabilities::LZCNT, "lzcnt"),
    (Capabilities::BMI1, "bmi1"),
    (Capabilities::AVX, "avx"),
    (Capabilities::AVX2, "avx2"),
    (Capabilities::AVX512F, "avx512f"),
    (Capabilities::AVX512VL, "avx512vl"),
    (Capabilities::AVX512BW, "avx512bw"),
    (Capabilities::AVX512CD, "avx512cd"),
    (Capabilities::AVX512VPOPCNTDQ, "avx512vpopcntdq"),
    (Capabilities::NEON, "neon"),
];

static DETECTED: Lazy<Capabilities> = Lazy::new(|| {
    let detected = Capabilities::probe();
    log::debug!("detected CPU features: {detected:?}");
    detected
});

impl Capabilities {
    /// Features the crate was compiled for.
    pub const fn compiled() -> Self {
        let mut caps = 0;
        if cfg!(target_feature = "sse2") {
            caps |= Self::SSE2.bits();
        }
        if cfg!(target_feature = "ssse3") {
            caps |= Self::SSSE3.bits();
        }
        if cfg!(target_feature = "sse4.1") {
            caps |= Self::SSE4_1.bits();
        }
        if cfg!(target_feature = "sse4.2") {
            caps |= Self::SSE4_2.bits();
        }
        if cfg!(target_feature = "popcnt") {
            caps |= Self::POPCNT.bits();
        }
        if cfg!(target_feature = "lzcnt") {
            caps |= Self::LZCNT.bits();
        }
        if cfg!(target_feature = "bmi1") {
            caps |= Self::BMI1.bits();
        }
        if cfg!(target_feature = "avx") {
            caps |= Self::AVX.bits();
        }
        if cfg!(target_feature = "avx2") {
            caps |= Self::AVX2.bits();
        }
        if cfg!(target_feature = "avx512f") {
            caps |= Self::AVX512F.bits();
        }
        if cfg!(target_feature = "avx512vl") {
            caps |= Self::AVX512VL.bits();
        }
        if cfg!(target_feature = "avx512bw") {
            caps |= Self::AVX512BW.bits();
        }
        if cfg!(target_feature = "avx512cd") {
            caps |= Self::AVX512CD.bits();
        }
        if cfg!(target_feature = "avx512vpopcntdq") {
            caps |= Self::AVX512VPOPCNTDQ.bits();
        }
        if cfg!(target_feature = "neon") {
            caps |= Self::NEON.bits();
        }
        Self::from_bits_retain(caps)
    }

    /// Features the running CPU supports. Probed once per process.
    pub fn detect() -> Self {
        *DETECTED
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn probe() -> Self {
        let checks = [
            (Self::SSE2, is_x86_feature_detected!("sse2")),
            (Self::SSSE3, is_x86_feature_detected!("ssse3")),
            (Self::SSE4_1, is_x86_feature_detected!("sse4.1")),
            (Self::SSE4_2, is_x86_feature_detected!("sse4.2")),
            (Self::POPCNT, is_x86_feature_detected!("popcnt")),
            (Self::LZCNT, is_x86_feature_detected!("lzcnt")),
            (Self::BMI1, is_x86_feature_detected!("bmi1")),
            (Self::AVX, is_x86_feature_detected!("avx")),
            (Self::AVX2, is_x86_feature_detected!("avx2")),
            (Self::AVX512F, is_x86_feature_detected!("avx512f")),
            (Self::AVX512VL, is_x86_feature_detected!("avx512vl")),
            (Self::AVX512BW, is_x86_feature_detected!("avx512bw")),
            (Self::AVX512CD, is_x86_feature_detected!("avx512cd")),
            (
                Self::AVX512VPOPCNTDQ,
                is_x86_feature_detected!("avx512vpopcntdq"),
            ),
        ];

        checks
            .into_iter()
            .filter(|&(_, present)| present)
            .fold(Self::empty(), |caps, (feature, _)| caps | feature)
    }

    #[cfg(target_arch = "aarch64")]
    fn probe() -> Self {
        if std::arch::is_aarch64_feature_detected!("neon") {
            Self::NEON
        } else {
            Self::empty()
        }
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
    fn probe() -> Self {
        Self::empty()
    }

    /// Checks that the running CPU supports every compiled-in feature.
    ///
    /// Returns [`AvelError::MissingCapabilities`] naming the absent features.
    pub fn verify() -> Result<()> {
        let compiled = Self::compiled();
        let detected = Self::detect();
        log::debug!("compiled for {compiled:?}, tier {}", Tier::active());

        let missing = compiled.difference(detected);
        if missing.is_empty() {
            return Ok(());
        }

        let missing = missing.names();
        log::warn!("CPU lacks compiled-in features: {}", missing.join(", "));
        Err(AvelError::MissingCapabilities { missing })
    }

    /// Lower-case feature names, in a fixed order.
    pub fn names(self) -> Vec<&'static str> {
        NAMES
            .iter()
            .filter(|&&(feature, _)| self.contains(feature))
            .map(|&(_, name)| name)
            .collect()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// The kernel tier a build dispatches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Portable lane-wise kernels.
    Fallback,
    /// 128-bit SSE2 kernels, with SSSE3 and SSE4 refinements when enabled.
    Sse2,
    /// AVX2 kernels for 256-bit types on top of the SSE2 tier.
    Avx2,
    /// AArch64 NEON kernels for 128-bit types.
    Neon,
}

impl Tier {
    /// The tier selected when the crate was built.
    pub const fn active() -> Self {
        if cfg!(avx2) {
            Tier::Avx2
        } else if cfg!(sse) {
            Tier::Sse2
        } else if cfg!(neon) {
            Tier::Neon
        } else {
            Tier::Fallback
        }
    }

    /// Lower-case tier name, as printed by `Display`.
    pub const fn name(self) -> &'static str {
        match self {
            Tier::Fallback => "fallback",
            Tier::Sse2 => "sse2",
            Tier::Avx2 => "avx2",
            Tier::Neon => "neon",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
