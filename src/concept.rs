use core::ptr;

use crate::signature::Invoke;

/// The erased interface every stored callable is wrapped to satisfy.
///
/// Destruction goes through the trait object's drop glue. Heap copies are
/// built by the container from [`Concept::copy_to`] and [`Concept::move_to`]
/// so the trait stays free of lifetimes.
pub trait Concept<Args, R> {
    /// Calls the wrapped callable.
    fn call(&self, args: Args) -> R;

    /// Writes a clone of `self` to `dst`.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for writes of `size_of_val(self)` bytes and aligned
    /// to `align_of_val(self)`.
    unsafe fn copy_to(&self, dst: *mut u8);

    /// Relocates `self` to `dst`. Never panics.
    ///
    /// # Safety
    ///
    /// Same requirements on `dst` as [`Concept::copy_to`]. Afterwards `self`
    /// is logically uninitialized and must not be dropped or used.
    unsafe fn move_to(&mut self, dst: *mut u8);
}

/// Holds one callable by value and implements [`Concept`] for it.
#[doc(hidden)]
#[repr(transparent)]
pub struct Model<F> {
    f: F,
}

impl<F> Model<F> {
    pub(crate) fn new(f: F) -> Model<F> {
        Model { f }
    }
}

impl<F, Args, R> Concept<Args, R> for Model<F>
where
    F: Invoke<Args, Output = R> + Clone,
{
    #[inline]
    fn call(&self, args: Args) -> R {
        self.f.invoke(args)
    }

    unsafe fn copy_to(&self, dst: *mut u8) {
        // Clone first so a panicking `clone` leaves `dst` untouched.
        let copy = Model::new(self.f.clone());
        dst.cast::<Self>().write(copy);
    }

    unsafe fn move_to(&mut self, dst: *mut u8) {
        dst.cast::<Self>().write(ptr::read(self));
    }
}

#[cfg(test)]
mod tests {
    use super::{Concept, Model};
    use core::mem::{self, MaybeUninit};
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone)]
    struct Counted {
        drops: Rc<Cell<usize>>,
        base: i32,
    }

    impl Counted {
        fn base(&self) -> i32 {
            self.base
        }
    }

    impl Drop for Counted {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    fn adder(drops: &Rc<Cell<usize>>, base: i32) -> Model<impl Fn(i32) -> i32 + Clone> {
        let counted = Counted {
            drops: drops.clone(),
            base,
        };
        Model::new(move |x: i32| counted.base() + x)
    }

    fn uninit_like<T>(_: &T) -> MaybeUninit<T> {
        MaybeUninit::uninit()
    }

    #[test]
    fn test_call() {
        let drops = Rc::new(Cell::new(0));
        let model = adder(&drops, 3);
        assert_eq!(drops.get(), 0);
        assert_eq!(Concept::<(i32,), i32>::call(&model, (4,)), 7);
        drop(model);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn test_copy_to() {
        let drops = Rc::new(Cell::new(0));
        let model = adder(&drops, 3);

        let mut slot = uninit_like(&model);
        unsafe { Concept::<(i32,), i32>::copy_to(&model, slot.as_mut_ptr().cast()) };
        let copy = unsafe { slot.assume_init() };
        assert_eq!(drops.get(), 0);

        assert_eq!(Concept::<(i32,), i32>::call(&copy, (10,)), 13);
        drop(copy);
        assert_eq!(drops.get(), 1);
        assert_eq!(Concept::<(i32,), i32>::call(&model, (10,)), 13);
        drop(model);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn test_move_to() {
        let drops = Rc::new(Cell::new(0));
        let mut model = adder(&drops, 1);

        let mut slot = uninit_like(&model);
        unsafe { Concept::<(i32,), i32>::move_to(&mut model, slot.as_mut_ptr().cast()) };
        mem::forget(model);
        let moved = unsafe { slot.assume_init() };

        assert_eq!(Concept::<(i32,), i32>::call(&moved, (1,)), 2);
        assert_eq!(drops.get(), 0);
        drop(moved);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn test_erased_drop() {
        let drops = Rc::new(Cell::new(0));
        let model: Box<dyn Concept<(i32,), i32>> = Box::new(adder(&drops, 5));
        assert_eq!(model.call((1,)), 6);
        drop(model);
        assert_eq!(drops.get(), 1);
    }
}
