//! Outcome returned by evaluating an expression.

/// The result of evaluating an expression node against a target.
///
/// Unlike a plain boolean, a failed evaluation comes in two strengths:
/// - `Fail`: the target did not satisfy the predicate this time
/// - `Discard`: the target was rejected by a roll and the caller should treat
///   the rejection as settled rather than retry it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The predicate did not hold.
    Fail,

    /// The predicate was rejected in a way that must not be retried.
    Discard,

    /// The predicate held.
    Pass,
}

impl Outcome {
    /// Returns `true` if this outcome is `Pass`.
    #[inline]
    pub fn is_pass(self) -> bool {
        matches!(self, Outcome::Pass)
    }

    /// Returns `true` if this outcome is `Discard`.
    #[inline]
    pub fn is_discard(self) -> bool {
        matches!(self, Outcome::Discard)
    }

    /// Negation: `Pass` becomes `Fail`, any failure becomes `Pass`.
    #[inline]
    pub fn negate(self) -> Self {
        match self {
            Outcome::Pass => Outcome::Fail,
            Outcome::Fail | Outcome::Discard => Outcome::Pass,
        }
    }

    /// Priority used when an OR node reports one of several failures.
    ///
    /// `Discard` outranks `Fail`.
    #[inline]
    pub fn priority(self) -> u8 {
        match self {
            Outcome::Fail => 0,
            Outcome::Discard => 1,
            Outcome::Pass => 2,
        }
    }

    /// Converts a boolean check into `Pass`/`Fail`.
    #[inline]
    pub fn from_bool(passed: bool) -> Self {
        if passed { Outcome::Pass } else { Outcome::Fail }
    }
}

impl core::fmt::Display for Outcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Outcome::Fail => "fail",
            Outcome::Discard => "discard",
            Outcome::Pass => "pass",
        };
        f.write_str(s)
    }
}
