//! Transition rules shared by the lifecycle enums.
//!
//! `SessionState` and `ConnectionStatus` both declare their allowed moves
//! here. The session checks each move through [`StateMachine::transition_to`]
//! and the health tracker asserts its moves against the same table.

use super::ValidationError;

/// Lifecycle enum with a declared set of allowed moves.
///
/// ```ignore
/// match SessionState::Streaming.transition_to(SessionState::Idle) {
///     Ok(next) => state = next,
///     Err(error) => warn!(%error, "off-path move"),
/// }
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Whether `target` is an allowed move from `self`.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Every state reachable in one move from `self`.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns `target` if the move is allowed.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if !self.can_transition_to(&target) {
            return Err(ValidationError::invalid_format(
                "state_transition",
                format!("{:?} -> {:?} is not an allowed move", self, target),
            ));
        }
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Green,
        Amber,
        Red,
        Broken,
    }

    impl StateMachine for Light {
        fn can_transition_to(&self, target: &Self) -> bool {
            use Light::*;
            matches!(
                (self, target),
                (Green, Amber) | (Amber, Red) | (Red, Green) | (Green, Broken) | (Red, Broken)
            )
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use Light::*;
            match self {
                Green => vec![Amber, Broken],
                Amber => vec![Red],
                Red => vec![Green, Broken],
                Broken => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        assert_eq!(Light::Green.transition_to(Light::Amber), Ok(Light::Amber));
    }

    #[test]
    fn transition_to_fails_for_invalid_transition() {
        assert!(Light::Amber.transition_to(Light::Green).is_err());
    }

    #[test]
    fn broken_light_has_no_moves() {
        assert!(Light::Broken.valid_transitions().is_empty());
        assert!(Light::Broken.transition_to(Light::Green).is_err());
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for light in [Light::Green, Light::Amber, Light::Red, Light::Broken] {
            for target in light.valid_transitions() {
                assert!(
                    light.can_transition_to(&target),
                    "can_transition_to should return true for {:?} -> {:?}",
                    light,
                    target
                );
            }
        }
    }
}
