//! Equivalence relations used to decide element matches.
//!
//! The relation in force is resolved once per call: the caller's comparer if
//! supplied, else the type's default equality. Relations are fallible; a
//! fault raised while comparing must reach the caller as a fault, never be
//! treated as "no match".

use crate::error::ElementFault;

/// Binary predicate deciding whether two elements are equal for a search.
///
/// Implementations must be `Sync`: one relation instance is shared by every
/// worker of a call.
pub trait Equivalence<T>: Sync {
    /// Whether `a` and `b` are equivalent under this relation.
    ///
    /// # Errors
    ///
    /// Returns the underlying fault when the relation itself fails. The
    /// engine collects such faults; it never swallows them.
    fn equivalent(&self, a: &T, b: &T) -> Result<bool, ElementFault>;
}

/// Default equivalence backed by `PartialEq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEquivalence;

impl<T: PartialEq> Equivalence<T> for DefaultEquivalence {
    fn equivalent(&self, a: &T, b: &T) -> Result<bool, ElementFault> {
        Ok(a == b)
    }
}

/// Adapter turning a closure into an [`Equivalence`].
///
/// # Example
///
/// ```
/// use parallel_query_core::equivalence::{equivalence_fn, Equivalence};
///
/// let mod2 = equivalence_fn(|a: &u32, b: &u32| Ok(a % 2 == b % 2));
/// assert!(mod2.equivalent(&4, &10).unwrap());
/// assert!(!mod2.equivalent(&3, &10).unwrap());
/// ```
pub fn equivalence_fn<T, F>(f: F) -> FnEquivalence<F>
where
    F: Fn(&T, &T) -> Result<bool, ElementFault> + Sync,
{
    FnEquivalence(f)
}

/// Closure-backed equivalence relation. Built with [`equivalence_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FnEquivalence<F>(F);

impl<T, F> Equivalence<T> for FnEquivalence<F>
where
    F: Fn(&T, &T) -> Result<bool, ElementFault> + Sync,
{
    fn equivalent(&self, a: &T, b: &T) -> Result<bool, ElementFault> {
        (self.0)(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("relation failed")]
    struct RelationFault;

    #[test]
    fn test_default_equivalence_matches_partial_eq() {
        assert!(DefaultEquivalence.equivalent(&7, &7).unwrap());
        assert!(!DefaultEquivalence.equivalent(&7, &8).unwrap());
    }

    #[test]
    fn test_closure_relation() {
        let congruent_mod_3 = equivalence_fn(|a: &i64, b: &i64| Ok(a.rem_euclid(3) == b.rem_euclid(3)));
        assert!(congruent_mod_3.equivalent(&4, &10).unwrap());
        assert!(!congruent_mod_3.equivalent(&5, &10).unwrap());
    }

    #[test]
    fn test_closure_relation_propagates_faults() {
        let failing = equivalence_fn(|_: &u8, _: &u8| Err(Box::new(RelationFault) as ElementFault));
        let fault = failing.equivalent(&0, &0).unwrap_err();
        assert!(fault.downcast_ref::<RelationFault>().is_some());
    }
}
