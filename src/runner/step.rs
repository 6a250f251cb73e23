//! Step Definition
//!
//! A step is a plain record: a name, an action, a dependent flag and an
//! optional skip predicate.

use std::fmt;

use super::error::StepError;

/// Zero-argument fallible unit of work.
pub type Action = Box<dyn Fn() -> Result<(), StepError>>;

/// Run-time check deciding whether a step is bypassed.
pub type SkipPredicate = Box<dyn Fn() -> bool>;

/// A named unit of work in a [`StepSequence`](super::StepSequence).
///
/// # Example
///
/// ```
/// use steprunner::Step;
///
/// let step = Step::new("migrate", || Ok(()))
///     .dependent()
///     .skip_when(|| false);
///
/// assert_eq!(step.name(), "migrate");
/// assert!(step.is_dependent());
/// ```
pub struct Step {
    name: String,
    action: Option<Action>,
    dependent: bool,
    skip: Option<SkipPredicate>,
}

impl Step {
    /// Creates a step with the given action.
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn() -> Result<(), StepError> + 'static,
    {
        Self::named(name).with_action(action)
    }

    /// Creates a step without an action. Running it succeeds with no effect.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: None,
            dependent: false,
            skip: None,
        }
    }

    /// Replaces the action of this step.
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn() -> Result<(), StepError> + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    /// Marks this step as dependent: a run may not start from it.
    pub fn dependent(mut self) -> Self {
        self.dependent = true;
        self
    }

    /// Sets whether this step is dependent.
    pub fn with_dependent(mut self, dependent: bool) -> Self {
        self.dependent = dependent;
        self
    }

    /// Skips this step whenever `predicate` returns true at run time.
    pub fn skip_when<P>(mut self, predicate: P) -> Self
    where
        P: Fn() -> bool + 'static,
    {
        self.skip = Some(Box::new(predicate));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dependent(&self) -> bool {
        self.dependent
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub fn has_skip_predicate(&self) -> bool {
        self.skip.is_some()
    }

    /// Evaluates the skip predicate. A step without one is never skipped.
    pub fn should_skip(&self) -> bool {
        self.skip.as_ref().is_some_and(|skip| skip())
    }

    /// Invokes the action. A missing action counts as success.
    pub(crate) fn perform(&self) -> Result<(), StepError> {
        match &self.action {
            Some(action) => action(),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("dependent", &self.dependent)
            .field("has_action", &self.action.is_some())
            .field("has_skip_predicate", &self.skip.is_some())
            .finish()
    }
}
