use core::fmt;

/// Error returned by [`Function::try_call_with`](crate::Function::try_call_with)
/// when the function holds no callable.
///
/// # Example
///
/// ```
/// use smallfn::{EmptyFunction, Function};
///
/// let f: Function<dyn Fn(u8) -> u8> = Function::empty();
/// assert_eq!(f.try_call_with((1,)), Err(EmptyFunction));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmptyFunction;

impl fmt::Display for EmptyFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("called an empty Function")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EmptyFunction {}
