//! Key equality predicate supplied to the map alongside its hasher.

/// Equality over keys (or over a borrowed form `Q` of them).
///
/// Implementations must be an equivalence relation and agree with the map's
/// hasher: keys that compare equal must hash equal. Violating this does not
/// cause memory unsafety, but lookups may miss and duplicates may appear.
pub trait KeyEq<Q: ?Sized> {
    fn eq(&self, stored: &Q, probe: &Q) -> bool;
}

/// Default predicate: delegates to `Eq`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EqualTo;

impl<Q: ?Sized + Eq> KeyEq<Q> for EqualTo {
    #[inline]
    fn eq(&self, stored: &Q, probe: &Q) -> bool {
        stored == probe
    }
}
