use alloc::alloc::{alloc as allocate, dealloc, handle_alloc_error, Layout};
use alloc::boxed::Box;
use core::fmt;
use core::marker::PhantomData;
use core::mem::{self, MaybeUninit};
use core::ptr;

use crate::concept::{Concept, Model};
use crate::error::EmptyFunction;
use crate::signature::{Holds, Signature};
use crate::space::S8;
use crate::sptr;

// Moves are bitwise copies and cannot fail, so every wrapper is safe to
// relocate; only size and alignment decide.
const fn fits_inline<T, Space>() -> bool {
    mem::size_of::<T>() <= mem::size_of::<Space>()
        && mem::align_of::<T>() <= mem::align_of::<Space>()
}

/// A heap allocation shaped like an erased wrapper. Freed on drop unless
/// handed over to a `Box`.
struct HeapSlot {
    ptr: *mut u8,
    layout: Layout,
}

impl HeapSlot {
    fn for_value<T: ?Sized>(value: &T) -> HeapSlot {
        let layout = Layout::for_value(value);
        let ptr = if layout.size() == 0 {
            ptr::null_mut::<u8>().wrapping_add(layout.align())
        } else {
            let ptr = unsafe { allocate(layout) };
            if ptr.is_null() {
                handle_alloc_error(layout);
            }
            ptr
        };

        HeapSlot { ptr, layout }
    }

    /// # Safety
    ///
    /// The slot must hold an initialized value of the type `meta` points to.
    unsafe fn into_box<T: ?Sized>(self, meta: *const T) -> Box<T> {
        let raw = sptr::with_metadata_of_mut(self.ptr, meta);
        mem::forget(self);
        Box::from_raw(raw)
    }
}

impl Drop for HeapSlot {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            unsafe { dealloc(self.ptr, self.layout) }
        }
    }
}

fn clone_boxed<Args, R, T>(concept: &T) -> Box<T>
where
    T: ?Sized + Concept<Args, R>,
{
    let slot = HeapSlot::for_value(concept);
    unsafe {
        // A panicking clone drops `slot`, which frees the allocation.
        concept.copy_to(slot.ptr);
        slot.into_box(ptr::from_ref(concept))
    }
}

/// A wrapper constructed in place inside a `Space` buffer.
struct Inline<Sig: ?Sized + Signature, Space> {
    space: MaybeUninit<Space>,
    // Only the vtable of this pointer is meaningful.
    meta: *const Sig::Erased,
}

impl<Sig: ?Sized + Signature, Space> Inline<Sig, Space> {
    fn new<F>(model: Model<F>) -> Self
    where
        Sig: Holds<F>,
    {
        debug_assert!(fits_inline::<Model<F>, Space>());

        let mut space = MaybeUninit::<Space>::uninit();
        unsafe { space.as_mut_ptr().cast::<Model<F>>().write(model) };
        let meta = <Sig as Holds<F>>::erase(ptr::null_mut()).cast_const();

        Inline { space, meta }
    }

    fn as_ptr(&self) -> *const Sig::Erased {
        sptr::with_metadata_of(self.space.as_ptr().cast::<u8>(), self.meta)
    }

    fn as_mut_ptr(&mut self) -> *mut Sig::Erased {
        sptr::with_metadata_of_mut(self.space.as_mut_ptr().cast::<u8>(), self.meta)
    }

    fn get(&self) -> &Sig::Erased {
        unsafe { &*self.as_ptr() }
    }

    fn fits<ToSpace>(&self) -> bool {
        let concept = self.get();
        mem::size_of_val(concept) <= mem::size_of::<ToSpace>()
            && mem::align_of_val(concept) <= mem::align_of::<ToSpace>()
    }

    fn duplicate(&self) -> Self {
        let mut space = MaybeUninit::<Space>::uninit();
        unsafe { self.get().copy_to(space.as_mut_ptr().cast::<u8>()) };

        Inline {
            space,
            meta: self.meta,
        }
    }

    /// Moves the wrapper into a fresh `ToSpace` buffer.
    ///
    /// # Safety
    ///
    /// `self.fits::<ToSpace>()` must hold, and `self` must be forgotten
    /// afterwards instead of dropped.
    unsafe fn relocate<ToSpace>(&mut self) -> Inline<Sig, ToSpace> {
        let mut space = MaybeUninit::<ToSpace>::uninit();
        (*self.as_mut_ptr()).move_to(space.as_mut_ptr().cast::<u8>());

        Inline {
            space,
            meta: self.meta,
        }
    }

    /// Moves the wrapper into a new heap allocation.
    ///
    /// # Safety
    ///
    /// `self` must be forgotten afterwards instead of dropped.
    unsafe fn relocate_to_heap(&mut self) -> Box<Sig::Erased> {
        let slot = HeapSlot::for_value(self.get());
        (*self.as_mut_ptr()).move_to(slot.ptr);
        slot.into_box(self.meta)
    }
}

impl<Sig: ?Sized + Signature, Space> Drop for Inline<Sig, Space> {
    fn drop(&mut self) {
        unsafe { ptr::drop_in_place(self.as_mut_ptr()) }
    }
}

enum Storage<Sig: ?Sized + Signature, Space> {
    Inline(Inline<Sig, Space>),
    /// `None` is the empty state.
    Heap(Option<Box<Sig::Erased>>),
}

/// A type-erased callable that stores small callables inline and larger ones on the heap.
///
/// `Sig` is the call signature written as a `dyn Fn` type, `Space` is the
/// inline capacity (see [`space`](crate::space)). A callable whose wrapper
/// fits `Space` in both size and alignment lives inside the `Function`
/// itself; any other callable is placed in a single heap allocation made at
/// construction and released on drop.
///
/// Cloning deep-copies the stored callable. [`Function::take`] moves it out
/// and leaves the source empty.
///
/// # Example
///
/// ```
/// use smallfn::Function;
/// use smallfn::space::S1;
///
/// let a = 3;
/// let add: Function<dyn Fn(i32) -> i32> = Function::new(move |b| a + b);
/// assert!(add.is_inline());
/// assert_eq!(add.call(4), 7);
///
/// let table = [1u64; 16];
/// let sum: Function<dyn Fn() -> u64, S1> = Function::new(move || table.iter().sum());
/// assert!(sum.is_heap());
/// assert_eq!(sum.call(), 16);
/// ```
pub struct Function<Sig: ?Sized + Signature, Space = S8> {
    storage: Storage<Sig, Space>,
    _sig: PhantomData<*const Sig>,
}

impl<Sig: ?Sized + Signature, Space> Function<Sig, Space> {
    /// Creates a `Function` holding no callable.
    ///
    /// Calling it panics; [`Function::try_call_with`] returns an error instead.
    pub const fn empty() -> Self {
        Function {
            storage: Storage::Heap(None),
            _sig: PhantomData,
        }
    }

    /// Stores `f`, inline if its wrapper fits `Space`, on the heap otherwise.
    ///
    /// Closures, function pointers and functor types implementing
    /// [`Invoke`](crate::Invoke)
    /// are all accepted.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::{Function, Invoke};
    /// use smallfn::space::S2;
    ///
    /// #[derive(Clone)]
    /// struct Lookup([u32; 8]);
    ///
    /// impl Invoke<(usize,)> for Lookup {
    ///     type Output = u32;
    ///
    ///     fn invoke(&self, (i,): (usize,)) -> u32 {
    ///         self.0[i]
    ///     }
    /// }
    ///
    /// let f: Function<dyn Fn(usize) -> u32, S2> = Function::new(Lookup([5; 8]));
    /// assert!(f.is_heap());
    /// assert_eq!(f.call(3), 5);
    /// ```
    pub fn new<F>(f: F) -> Self
    where
        Sig: Holds<F>,
    {
        let inline = const { fits_inline::<Model<F>, Space>() };
        let model = Model::new(f);
        let storage = if inline {
            Storage::Inline(Inline::new(model))
        } else {
            let raw = <Sig as Holds<F>>::erase(Box::into_raw(Box::new(model)));
            Storage::Heap(Some(unsafe { Box::from_raw(raw) }))
        };

        Function {
            storage,
            _sig: PhantomData,
        }
    }

    /// Replaces the stored callable with `f`, choosing its storage mode anew.
    pub fn set<F>(&mut self, f: F)
    where
        Sig: Holds<F>,
    {
        *self = Function::new(f);
    }

    /// Moves the callable out, leaving `self` empty.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::Function;
    ///
    /// let mut src: Function<dyn Fn(i32) -> i32> = Function::new(|x| x * 2);
    /// let dst = src.take();
    ///
    /// assert!(src.is_empty());
    /// assert_eq!(dst.call(21), 42);
    /// ```
    pub fn take(&mut self) -> Self {
        let storage = match &mut self.storage {
            Storage::Heap(boxed) => Storage::Heap(boxed.take()),
            Storage::Inline(inline) => {
                // SAFETY: same space, and the moved-from buffer is forgotten below.
                let moved = unsafe { inline.relocate::<Space>() };
                mem::forget(mem::replace(&mut self.storage, Storage::Heap(None)));
                Storage::Inline(moved)
            }
        };

        Function {
            storage,
            _sig: PhantomData,
        }
    }

    /// Drops the current callable and moves the one in `source` into `self`,
    /// leaving `source` empty.
    pub fn assign(&mut self, source: &mut Self) {
        *self = Function::empty();
        *self = source.take();
    }

    /// Exchanges the callables of `self` and `other`, whatever their storage modes.
    pub fn swap(&mut self, other: &mut Self) {
        let tmp = other.take();
        *other = self.take();
        *self = tmp;
    }

    /// Returns `true` if a callable is stored.
    pub fn is_some(&self) -> bool {
        match &self.storage {
            Storage::Inline(_) => true,
            Storage::Heap(boxed) => boxed.is_some(),
        }
    }

    /// Returns `true` if no callable is stored.
    pub fn is_empty(&self) -> bool {
        !self.is_some()
    }

    /// Returns `true` if the callable is stored inline.
    pub fn is_inline(&self) -> bool {
        matches!(self.storage, Storage::Inline(_))
    }

    /// Returns `true` if the callable is stored in a heap allocation.
    pub fn is_heap(&self) -> bool {
        matches!(self.storage, Storage::Heap(Some(_)))
    }

    /// Change the inline capacity of the `Function`.
    ///
    /// A heap-allocated callable stays where it is. An inline callable is
    /// moved into the new space if it fits, and to the heap otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::Function;
    /// use smallfn::space::{S1, S4};
    ///
    /// let pair = (1usize, 2usize);
    /// let f: Function<dyn Fn() -> usize, S4> = Function::new(move || pair.0 + pair.1);
    /// let g: Function<dyn Fn() -> usize, S1> = f.resize();
    ///
    /// assert!(g.is_heap());
    /// assert_eq!(g.call(), 3);
    /// ```
    pub fn resize<ToSpace>(self) -> Function<Sig, ToSpace> {
        let storage = match self.storage {
            Storage::Heap(boxed) => Storage::Heap(boxed),
            Storage::Inline(mut inline) => {
                let storage = if inline.fits::<ToSpace>() {
                    Storage::Inline(unsafe { inline.relocate::<ToSpace>() })
                } else {
                    Storage::Heap(Some(unsafe { inline.relocate_to_heap() }))
                };
                mem::forget(inline);
                storage
            }
        };

        Function {
            storage,
            _sig: PhantomData,
        }
    }

    /// Calls the stored callable with an argument tuple.
    ///
    /// # Panics
    ///
    /// Panics if the `Function` is empty.
    #[track_caller]
    pub fn call_with(&self, args: Sig::Args) -> Sig::Output {
        match self.concept() {
            Some(concept) => concept.call(args),
            None => empty_call(),
        }
    }

    /// Calls the stored callable with an argument tuple, or returns
    /// [`EmptyFunction`] if there is none.
    pub fn try_call_with(&self, args: Sig::Args) -> Result<Sig::Output, EmptyFunction> {
        self.concept()
            .map(|concept| concept.call(args))
            .ok_or(EmptyFunction)
    }

    fn concept(&self) -> Option<&Sig::Erased> {
        match &self.storage {
            Storage::Inline(inline) => Some(inline.get()),
            Storage::Heap(boxed) => boxed.as_deref(),
        }
    }
}

#[cold]
#[track_caller]
fn empty_call() -> ! {
    panic!("{}", EmptyFunction)
}

macro_rules! impl_call {
    ($($arg:ident $val:ident),*) => {
        impl<'a, R, $($arg,)* Space> Function<dyn Fn($($arg),*) -> R + 'a, Space> {
            /// Calls the stored callable.
            ///
            /// # Panics
            ///
            /// Panics if the `Function` is empty.
            #[inline]
            #[track_caller]
            pub fn call(&self, $($val: $arg),*) -> R {
                self.call_with(($($val,)*))
            }
        }
    };
}

impl_call!();
impl_call!(A a);
impl_call!(A a, B b);
impl_call!(A a, B b, C c);
impl_call!(A a, B b, C c, D d);
impl_call!(A a, B b, C c, D d, E e);
impl_call!(A a, B b, C c, D d, E e, G g);
impl_call!(A a, B b, C c, D d, E e, G g, H h);
impl_call!(A a, B b, C c, D d, E e, G g, H h, I i);

/// Exchanges the callables of two `Function`s.
pub fn swap<Sig: ?Sized + Signature, Space>(
    lhs: &mut Function<Sig, Space>,
    rhs: &mut Function<Sig, Space>,
) {
    lhs.swap(rhs);
}

impl<Sig: ?Sized + Signature, Space> Clone for Function<Sig, Space> {
    fn clone(&self) -> Self {
        let storage = match &self.storage {
            Storage::Inline(inline) => Storage::Inline(inline.duplicate()),
            Storage::Heap(boxed) => {
                Storage::Heap(boxed
                    .as_deref()
                    .map(clone_boxed::<Sig::Args, Sig::Output, _>))
            }
        };

        Function {
            storage,
            _sig: PhantomData,
        }
    }

    /// Copy-and-swap: `self` is left unchanged if cloning `source` panics.
    fn clone_from(&mut self, source: &Self) {
        let mut tmp = source.clone();
        self.swap(&mut tmp);
    }
}

impl<Sig: ?Sized + Signature, Space> Default for Function<Sig, Space> {
    fn default() -> Self {
        Function::empty()
    }
}

impl<Sig: ?Sized + Signature, Space> From<Option<Function<Sig, Space>>> for Function<Sig, Space> {
    /// `None` acts as the null marker and gives an empty `Function`.
    fn from(f: Option<Function<Sig, Space>>) -> Self {
        f.unwrap_or_default()
    }
}

impl<Sig: ?Sized + Signature, Space> fmt::Debug for Function<Sig, Space> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mode = match &self.storage {
            Storage::Inline(_) => "inline",
            Storage::Heap(Some(_)) => "heap",
            Storage::Heap(None) => "empty",
        };
        write!(f, "Function({})", mode)
    }
}

impl<Sig: ?Sized + Signature, Space> fmt::Pointer for Function<Sig, Space> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ptr: *const u8 = match self.concept() {
            Some(concept) => ptr::from_ref(concept).cast::<u8>(),
            None => ptr::null(),
        };
        fmt::Pointer::fmt(&ptr, f)
    }
}
