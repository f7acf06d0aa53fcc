//! Board invariants checked between turns.
//!
//! Each invariant is a zero-sized type naming one property of a [`Game`]
//! position. They compose as tuples, so the turn contract checks the whole
//! set in one call and reports every failure at once.
//!
//! [`Game`]: super::Game

/// A property every reachable state satisfies.
pub trait Invariant<S> {
    /// True if `state` satisfies the property.
    fn holds(state: &S) -> bool;

    /// What the property says, used in violation reports.
    fn description() -> &'static str;
}

/// One failed invariant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{}", description)]
pub struct InvariantViolation {
    /// Description of the failed invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Records a failure of the invariant described by `description`.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Invariants checked together; implemented for tuples of two to four.
pub trait InvariantSet<S> {
    /// Checks every member, returning all violations rather than the first.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

macro_rules! impl_invariant_set {
    ($($member:ident),+) => {
        impl<S, $($member: Invariant<S>),+> InvariantSet<S> for ($($member,)+) {
            fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
                let violations: Vec<_> = [$(($member::holds(state), $member::description())),+]
                    .into_iter()
                    .filter(|(holds, _)| !holds)
                    .map(|(_, description)| InvariantViolation::new(description))
                    .collect();
                if violations.is_empty() {
                    Ok(())
                } else {
                    Err(violations)
                }
            }
        }
    };
}

impl_invariant_set!(A, B);
impl_invariant_set!(A, B, C);
impl_invariant_set!(A, B, C, D);

pub mod emperor_untrapped;
pub mod immunity_occupied;
pub mod rescue_consistent;

pub use emperor_untrapped::EmperorUntrappedInvariant;
pub use immunity_occupied::ImmunityOccupiedInvariant;
pub use rescue_consistent::RescueConsistentInvariant;

/// All Dragon Face invariants as a composable set.
pub type DragonFaceInvariants = (
    EmperorUntrappedInvariant,
    ImmunityOccupiedInvariant,
    RescueConsistentInvariant,
);
