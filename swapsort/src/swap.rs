//! Swap primitives.
//!
//! The sort is generic over [`Swap`] and is monomorphised for exactly one
//! implementor, picked at build time through the `xor-swap` cargo feature.

/// Exchange two integers.
///
/// Both arguments are `&mut`, so they can never refer to the same storage.
/// [`XorSwap`] relies on this: XOR-swapping a location with itself zeroes it.
pub trait Swap {
    /// Name used in logs and reports.
    const NAME: &'static str;

    fn swap(a: &mut i32, b: &mut i32);
}

/// Swap through a third storage slot.
pub struct TempSwap;

impl Swap for TempSwap {
    const NAME: &'static str = "temp_swap";

    #[inline(always)]
    fn swap(a: &mut i32, b: &mut i32) {
        let t = *a;
        *a = *b;
        *b = t;
    }
}

/// Swap with three exclusive-or steps and no temporary.
///
/// On x86_64 and aarch64 the XORs are written as inline assembly, otherwise
/// the optimizer sees through them and emits plain moves.
pub struct XorSwap;

impl Swap for XorSwap {
    const NAME: &'static str = "xor_swap";

    #[cfg(target_arch = "x86_64")]
    #[inline(always)]
    fn swap(a: &mut i32, b: &mut i32) {
        // SAFETY: register-only arithmetic, no memory access
        unsafe {
            std::arch::asm!(
                "xor {a:e}, {b:e}",
                "xor {b:e}, {a:e}",
                "xor {a:e}, {b:e}",
                a = inout(reg) *a,
                b = inout(reg) *b,
                options(nomem, nostack),
            );
        }
    }

    #[cfg(target_arch = "aarch64")]
    #[inline(always)]
    fn swap(a: &mut i32, b: &mut i32) {
        // SAFETY: register-only arithmetic, no memory access
        unsafe {
            std::arch::asm!(
                "eor {a:w}, {a:w}, {b:w}",
                "eor {b:w}, {a:w}, {b:w}",
                "eor {a:w}, {a:w}, {b:w}",
                a = inout(reg) *a,
                b = inout(reg) *b,
                options(nomem, nostack, preserves_flags),
            );
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    #[inline(always)]
    fn swap(a: &mut i32, b: &mut i32) {
        *a = std::hint::black_box(*a ^ *b);
        *b = std::hint::black_box(*a ^ *b);
        *a ^= *b;
    }
}

/// The swap the benchmark binary is built with.
#[cfg(not(feature = "xor-swap"))]
pub type SelectedSwap = TempSwap;

/// The swap the benchmark binary is built with.
#[cfg(feature = "xor-swap")]
pub type SelectedSwap = XorSwap;
