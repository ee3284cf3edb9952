//! Inline capacities for [`Function`](crate::Function).
//!
//! Each `Sn` type is `n` machine words large and word aligned. A callable
//! is stored inline when its wrapper fits both the size and the alignment
//! of the space; otherwise it goes to the heap. Any `Sized` type works as a
//! space, e.g. `[usize; 12]`.

/// One word of inline space.
pub struct S1 {
    _inner: [usize; 1],
}

/// Two words of inline space.
pub struct S2 {
    _inner: [usize; 2],
}

/// Four words of inline space.
pub struct S4 {
    _inner: [usize; 4],
}

/// Eight words of inline space, 64 bytes on 64-bit targets.
///
/// This is the default space of [`Function`](crate::Function).
pub struct S8 {
    _inner: [usize; 8],
}

/// Sixteen words of inline space.
pub struct S16 {
    _inner: [usize; 16],
}

/// Thirty-two words of inline space.
pub struct S32 {
    _inner: [usize; 32],
}

/// Sixty-four words of inline space.
pub struct S64 {
    _inner: [usize; 64],
}
