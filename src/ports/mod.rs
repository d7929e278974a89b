use crate::error::ExprError;

/// Equality and hash-code contract for keys of hashed containers.
///
/// Implementations must guarantee that `eq_keys(a, b)` implies
/// `hash_key(a) == hash_key(b)`.
pub trait KeyComparer<T: ?Sized> {
    fn eq_keys(&self, a: Option<&T>, b: Option<&T>) -> bool;
    fn hash_key(&self, key: Option<&T>) -> Result<u32, ExprError>;
}
