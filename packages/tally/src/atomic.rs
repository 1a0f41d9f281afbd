use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// An atomic wrapper with an underlying atomic storage and conversion to
/// a type T.
///
/// `Acquire` ordering is used for load and `Release` ordering is used for store.
/// This lets enum state (like a bar's [`Status`](crate::Status)) be read
/// without taking the lock that guards its transitions.
///
/// ```rust
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// #[repr(u8)]
/// pub enum Light {
///    Red,
///    Green,
/// }
/// impl From<u8> for Light {
///     fn from(value: u8) -> Self {
///         match value {
///             0 => Self::Red,
///             _ => Self::Green,
///         }
///     }
/// }
/// impl From<Light> for u8 {
///     fn from(value: Light) -> Self {
///         value as Self
///     }
/// }
///
/// let value: tally::Atomic<u8, Light> = tally::Atomic::new_u8(Light::Red as u8);
/// assert_eq!(Light::Red, value.get());
/// value.set(Light::Green);
/// assert_eq!(Light::Green, value.get());
/// ```
#[derive(Debug, Default)]
pub struct Atomic<S, T>(S::Type, std::marker::PhantomData<T>)
where
    S: AtomicType,
    T: From<S> + Into<S>;
/// Marker type to associate primitive with their atomic versions
pub trait AtomicType {
    type Type;
}
impl AtomicType for u8 {
    type Type = AtomicU8;
}
impl<T: From<u8> + Into<u8>> Atomic<u8, T> {
    pub const fn new_u8(value: u8) -> Self {
        Self(AtomicU8::new(value), std::marker::PhantomData)
    }
    pub fn get(&self) -> T {
        self.0.load(Ordering::Acquire).into()
    }
    pub fn set(&self, value: T) {
        self.0.store(value.into(), Ordering::Release)
    }
}

pub(crate) fn next_atomic_usize() -> usize {
    static ID: AtomicUsize = AtomicUsize::new(1);
    ID.fetch_add(1, Ordering::SeqCst)
}
