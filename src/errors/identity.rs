use super::types::SharedError;
use std::sync::Arc;
/// Identity and "is-a" queries the registry needs from an error type.
///
/// `same` decides exact-identity matches; `is_a` decides equivalence matches and
/// defaults to `same` for types without a cause chain.
pub trait ErrorIdentity {
    fn same(&self, other: &Self) -> bool;
    fn is_a(&self, key: &Self) -> bool {
        self.same(key)
    }
}
impl ErrorIdentity for SharedError {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
    /// Walks the `source()` chain looking for the key's allocation.
    fn is_a(&self, key: &Self) -> bool {
        let target = Arc::as_ptr(key) as *const ();
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(&**self);
        while let Some(err) = current {
            if std::ptr::eq(err as *const dyn std::error::Error as *const (), target) {
                return true;
            }
            current = err.source();
        }
        false
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FixError;
    #[test]
    fn test_identity_is_pointer_based() {
        let a = FixError::new("timeout", "timed out").shared();
        let twin = FixError::new("timeout", "timed out").shared();
        assert!(a.same(&a.clone()));
        assert!(!a.same(&twin));
    }
    #[test]
    fn test_is_a_walks_cause_chain() {
        let root = FixError::new("not_mounted", "volume missing").shared();
        let mid = FixError::wrapping("io", "read failed", root.clone()).shared();
        let top = FixError::wrapping("load", "config load failed", mid.clone()).shared();
        assert!(top.is_a(&root));
        assert!(top.is_a(&mid));
        assert!(top.is_a(&top));
        assert!(!root.is_a(&top));
        let unrelated = FixError::new("not_mounted", "volume missing").shared();
        assert!(!top.is_a(&unrelated));
    }
}
