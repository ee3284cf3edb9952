use crate::concept::{Concept, Model};

/// A call signature, written as a `dyn Fn` type.
///
/// `Function<dyn Fn(A, B) -> R>` stores callables taking `(A, B)` and
/// returning `R`. Signatures of up to eight arguments are supported. The
/// trait object's lifetime bounds the stored callable, so
/// `Function<dyn Fn() -> usize + 'a>` may hold a closure borrowing data
/// that lives for `'a`.
pub trait Signature {
    /// The argument list as a tuple.
    type Args;
    /// The return type.
    type Output;
    #[doc(hidden)]
    type Erased: ?Sized + Concept<Self::Args, Self::Output>;
}

/// Implemented by a signature for every callable type it can store: one
/// that is invocable with the signature's arguments, clonable, and outlives
/// the signature's lifetime.
pub trait Holds<F>: Signature {
    #[doc(hidden)]
    fn erase(model: *mut Model<F>) -> *mut Self::Erased;
}

/// Invocation with an argument tuple.
///
/// Implemented for every `Fn` closure and function pointer of matching
/// arity. Implement it for your own type to store a functor in a
/// [`Function`](crate::Function).
///
/// # Example
///
/// ```
/// use smallfn::{Function, Invoke};
///
/// #[derive(Clone)]
/// struct Scale(i64);
///
/// impl Invoke<(i64,)> for Scale {
///     type Output = i64;
///
///     fn invoke(&self, (x,): (i64,)) -> i64 {
///         self.0 * x
///     }
/// }
///
/// let triple: Function<dyn Fn(i64) -> i64> = Function::new(Scale(3));
/// assert_eq!(triple.call(5), 15);
/// ```
pub trait Invoke<Args> {
    /// The value returned by the call.
    type Output;

    /// Calls `self` with the unpacked arguments.
    fn invoke(&self, args: Args) -> Self::Output;
}

macro_rules! impl_signature {
    ($($arg:ident $val:ident),*) => {
        impl<'a, R, $($arg,)*> Signature for dyn Fn($($arg),*) -> R + 'a {
            type Args = ($($arg,)*);
            type Output = R;
            type Erased = dyn Concept<($($arg,)*), R> + 'a;
        }

        impl<'a, F, R, $($arg,)*> Holds<F> for dyn Fn($($arg),*) -> R + 'a
        where
            F: Invoke<($($arg,)*), Output = R> + Clone + 'a,
        {
            #[inline]
            fn erase(model: *mut Model<F>) -> *mut Self::Erased {
                model
            }
        }

        impl<F, R, $($arg,)*> Invoke<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R,
        {
            type Output = R;

            #[inline]
            fn invoke(&self, ($($val,)*): ($($arg,)*)) -> R {
                self($($val),*)
            }
        }
    };
}

impl_signature!();
impl_signature!(A a);
impl_signature!(A a, B b);
impl_signature!(A a, B b, C c);
impl_signature!(A a, B b, C c, D d);
impl_signature!(A a, B b, C c, D d, E e);
impl_signature!(A a, B b, C c, D d, E e, G g);
impl_signature!(A a, B b, C c, D d, E e, G g, H h);
impl_signature!(A a, B b, C c, D d, E e, G g, H h, I i);
