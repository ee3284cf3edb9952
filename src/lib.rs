//! # smallfn: Callables Without the Allocation
//!
//! [`Function`] stores any callable matching a fixed signature (closure,
//! function pointer, or functor) behind one value type that can be cloned,
//! moved, swapped and called without knowing the concrete callable type.
//!
//! ## Core Concept
//!
//! `Box<dyn Fn(..)>` always heap-allocates, even for a closure capturing a
//! single integer. [`Function`] keeps an inline buffer (64 bytes on 64-bit
//! targets by default) and constructs the callable directly inside it when
//! it fits. Larger or over-aligned callables get exactly one heap allocation,
//! made at construction and released on drop.
//!
//! ## Quick Start
//!
//! ```rust
//! use smallfn::Function;
//!
//! let a = 3;
//! let add: Function<dyn Fn(i32) -> i32> = Function::new(move |b| a + b);
//! assert!(add.is_inline());
//! assert_eq!(add.call(4), 7);
//!
//! // Clones are independent deep copies.
//! let copy = add.clone();
//! assert_eq!(copy.call(10), 13);
//! assert_eq!(add.call(10), 13);
//! ```
//!
//! ## Storage Modes
//!
//! A `Function` is always in one of three states:
//!
//! - **empty**: created by [`Function::empty`], [`Default`], `From<None>`, or
//!   left behind by [`Function::take`]. [`Function::is_empty`] returns `true`.
//! - **inline**: the callable lives inside the `Function`.
//! - **heap**: the callable lives in a heap allocation owned by the `Function`.
//!
//! The mode is chosen once when a callable is stored: inline if the wrapped
//! callable fits the space in size and alignment, heap otherwise.
//!
//! ```rust
//! use smallfn::Function;
//! use smallfn::space::S1;
//!
//! // One word of inline space.
//! type Tiny<Sig> = Function<Sig, S1>;
//!
//! let word = 7usize;
//! let small: Tiny<dyn Fn() -> usize> = Function::new(move || word);
//! assert!(small.is_inline());
//!
//! let words = [7usize; 4];
//! let large: Tiny<dyn Fn() -> usize> = Function::new(move || words.len());
//! assert!(large.is_heap());
//! ```
//!
//! **Important**: Space alignment matters! If the space alignment is smaller
//! than the callable's required alignment, the callable is heap-allocated
//! regardless of size.
//!
//! ## Borrowing Callables
//!
//! The signature's trait-object lifetime bounds what may be stored, so a
//! `Function` can hold a closure that borrows local data:
//!
//! ```rust
//! use smallfn::Function;
//!
//! let names = vec![String::from("ada"), String::from("grace")];
//! let len: Function<dyn Fn(usize) -> usize + '_> = Function::new(|i: usize| names[i].len());
//! assert!(len.is_inline());
//! assert_eq!(len.call(1), 5);
//! ```
//!
//! ## Moving, Swapping and Assigning
//!
//! ```rust
//! use smallfn::Function;
//!
//! let data = [1u64; 32];
//! let mut heap: Function<dyn Fn() -> u64> = Function::new(move || data.iter().sum());
//! let mut inline: Function<dyn Fn() -> u64> = Function::new(|| 1);
//!
//! smallfn::swap(&mut heap, &mut inline);
//! assert_eq!(heap.call(), 1);
//! assert_eq!(inline.call(), 32);
//!
//! let moved = inline.take();
//! assert!(inline.is_empty());
//! assert_eq!(moved.call(), 32);
//! ```
//!
//! ## Calling an Empty Function
//!
//! [`Function::call`](Function#method.call) panics on an empty `Function`.
//! [`Function::try_call_with`] reports it as [`EmptyFunction`] instead:
//!
//! ```rust
//! use smallfn::{EmptyFunction, Function};
//!
//! let f: Function<dyn Fn(u8, u8) -> u8> = Function::default();
//! assert_eq!(f.try_call_with((1, 2)), Err(EmptyFunction));
//! ```
//!
//! ## Configuration
//!
//! ### Feature Flags
//!
//! - **`std`** (enabled by default)
//!   - Links to the standard library and implements `std::error::Error` for
//!     [`EmptyFunction`]
//!   - Disable for `#![no_std]` environments: `default-features = false`
//!
//! - **`nightly`** (optional, requires nightly)
//!   - Uses the unstable pointer-metadata APIs to address the inline buffer
//!
//! ### Threading
//!
//! `Function` is neither `Send` nor `Sync`: it places no thread-safety
//! bounds on the stored callable.

#![cfg_attr(feature = "nightly", feature(strict_provenance, set_ptr_value))]
#![cfg_attr(not(feature = "std"), no_std)]
#![allow(stable_features)]
#![deny(missing_docs)]
#![deny(clippy::as_conversions)]

extern crate alloc;

mod concept;
mod error;
mod function;
mod signature;
pub mod space;
mod sptr;

pub use crate::error::EmptyFunction;
pub use crate::function::{swap, Function};
pub use crate::signature::{Holds, Invoke, Signature};
