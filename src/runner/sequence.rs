//! Step Sequence
//!
//! Ordered list of steps with start resolution and the run loop.
//!
//! Insertion order is execution order: step `i` is assumed to rely on
//! steps `0..i` unless stated otherwise. Runs are stateless, so the same
//! sequence may be run any number of times.

use log::{debug, error};

use super::error::RunnerError;
use super::sink::{EventKind, LogSink, StepEvent, StepSink};
use super::step::Step;

/// An ordered, append-only list of [`Step`]s.
///
/// # Example
///
/// ```
/// use steprunner::{RecordingSink, Step, StepSequence};
///
/// let mut steps = StepSequence::new();
/// steps
///     .add(Step::new("fetch", || Ok(())))
///     .add(Step::new("build", || Ok(())))
///     .add(Step::new("publish", || Ok(())).dependent());
///
/// let mut sink = RecordingSink::new();
/// steps.run_from_command_with("build", &mut sink)?;
///
/// assert_eq!(sink.skipped(), vec!["fetch"]);
/// assert_eq!(sink.performed(), vec!["build", "publish"]);
/// # Ok::<(), steprunner::RunnerError>(())
/// ```
#[derive(Debug, Default)]
pub struct StepSequence {
    steps: Vec<Step>,
}

impl StepSequence {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Appends a step. Names are not checked for uniqueness.
    pub fn add(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Gets the step at `index`.
    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// Returns one `<index>:"<name>"` label per step, in order.
    pub fn names(&self) -> Vec<String> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| label(index, step))
            .collect()
    }

    /// Resolves a user-supplied command to a start index.
    ///
    /// An in-range base-10 index wins; otherwise the first step whose name
    /// equals the command exactly. Out-of-range numbers fall through to
    /// name matching.
    pub fn resolve_start(&self, command: &str) -> Result<usize, RunnerError> {
        if let Ok(index) = command.parse::<usize>() {
            if index < self.steps.len() {
                debug!("Resolved {:?} as step index {}", command, index);
                return Ok(index);
            }
        }

        if let Some(index) = self.steps.iter().position(|step| step.name() == command) {
            debug!("Resolved {:?} as step name at index {}", command, index);
            return Ok(index);
        }

        Err(RunnerError::InvalidStepReference {
            command: command.to_string(),
            valid: self.names(),
        })
    }

    /// Runs from `start_index`, reporting events to the log.
    pub fn run(&self, start_index: usize) -> Result<(), RunnerError> {
        self.run_with(start_index, &mut LogSink)
    }

    /// Runs every step from the first one.
    pub fn run_all(&self) -> Result<(), RunnerError> {
        self.run(0)
    }

    /// Resolves `command` with [`resolve_start`](Self::resolve_start) and runs from there.
    pub fn run_from_command(&self, command: &str) -> Result<(), RunnerError> {
        self.run_from_command_with(command, &mut LogSink)
    }

    pub fn run_all_with(&self, sink: &mut dyn StepSink) -> Result<(), RunnerError> {
        self.run_with(0, sink)
    }

    pub fn run_from_command_with(
        &self,
        command: &str,
        sink: &mut dyn StepSink,
    ) -> Result<(), RunnerError> {
        let start = self
            .resolve_start(command)
            .map_err(|e| RunnerError::UnparsableCommand {
                source: Box::new(e),
            })?;

        self.run_with(start, sink)
    }

    /// Runs from `start_index`, reporting events to `sink`.
    ///
    /// Steps before the start are reported as skipped without being
    /// invoked. From the start onward each step is either skipped by its
    /// predicate or performed; the first failing action ends the run.
    ///
    /// Nothing is reported or invoked when the start index is out of
    /// range or the start step is dependent.
    pub fn run_with(&self, start_index: usize, sink: &mut dyn StepSink) -> Result<(), RunnerError> {
        let start = self
            .steps
            .get(start_index)
            .ok_or(RunnerError::InvalidStartIndex {
                index: start_index,
                len: self.steps.len(),
            })?;

        if start.is_dependent() {
            return Err(RunnerError::DependentStart {
                index: start_index,
                name: start.name().to_string(),
            });
        }

        let last = self.steps.len() - 1;

        for (index, step) in self.steps.iter().enumerate() {
            let event = |kind| StepEvent {
                kind,
                index,
                name: step.name().to_string(),
                last,
            };

            if index < start_index || step.should_skip() {
                sink.record(&event(EventKind::Skip));
                continue;
            }

            sink.record(&event(EventKind::Do));
            if let Err(source) = step.perform() {
                error!("Step {} ({}) failed: {}", index, step.name(), source);
                return Err(RunnerError::StepExecution {
                    index,
                    name: step.name().to_string(),
                    source,
                });
            }
        }

        Ok(())
    }
}

impl FromIterator<Step> for StepSequence {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

impl Extend<Step> for StepSequence {
    fn extend<I: IntoIterator<Item = Step>>(&mut self, iter: I) {
        self.steps.extend(iter);
    }
}

impl<'a> IntoIterator for &'a StepSequence {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

fn label(index: usize, step: &Step) -> String {
    format!("{}:{:?}", index, step.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::sink::RecordingSink;
    use std::cell::Cell;
    use std::error::Error as _;
    use std::rc::Rc;

    /// Counts how often the actions built from it are invoked.
    #[derive(Clone, Default)]
    struct Mock {
        called: Rc<Cell<usize>>,
    }

    impl Mock {
        fn calls(&self) -> usize {
            self.called.get()
        }

        fn success(&self, name: &str) -> Step {
            let called = Rc::clone(&self.called);
            Step::new(name, move || {
                called.set(called.get() + 1);
                Ok(())
            })
        }

        fn throw(&self, name: &str) -> Step {
            let called = Rc::clone(&self.called);
            Step::new(name, move || {
                called.set(called.get() + 1);
                Err("error".into())
            })
        }
    }

    fn named(names: &[&str]) -> StepSequence {
        names.iter().map(|name| Step::named(*name)).collect()
    }

    fn mocks() -> (Mock, Mock, Mock) {
        (Mock::default(), Mock::default(), Mock::default())
    }

    #[test]
    fn test_names() {
        let steps = named(&["first", "second"]);
        assert_eq!(steps.names(), vec!["0:\"first\"", "1:\"second\""]);
    }

    #[test]
    fn test_names_empty() {
        assert!(StepSequence::new().names().is_empty());
    }

    #[test]
    fn test_resolve_start_name_match() {
        let steps = named(&["first", "second", "third"]);
        assert_eq!(steps.resolve_start("second").unwrap(), 1);
    }

    #[test]
    fn test_resolve_start_number_match() {
        let steps = named(&["first", "second", "third"]);
        assert_eq!(steps.resolve_start("2").unwrap(), 2);
    }

    #[test]
    fn test_resolve_start_no_match() {
        let steps = named(&["first", "second", "third"]);
        let err = steps.resolve_start("foo").unwrap_err();

        match &err {
            RunnerError::InvalidStepReference { command, valid } => {
                assert_eq!(command, "foo");
                assert_eq!(valid, &steps.names());
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("0:\"first\", 1:\"second\", 2:\"third\""));
    }

    #[test]
    fn test_resolve_start_out_of_range() {
        let steps = named(&["first", "second", "third"]);
        assert!(steps.resolve_start("10").is_err());
        assert!(steps.resolve_start("3").is_err());
        assert!(steps.resolve_start("-1").is_err());
    }

    #[test]
    fn test_resolve_start_numeric_name_beyond_range() {
        let steps = named(&["first", "10"]);
        assert_eq!(steps.resolve_start("10").unwrap(), 1);
    }

    #[test]
    fn test_resolve_start_index_wins_over_name() {
        let steps = named(&["1", "0"]);
        assert_eq!(steps.resolve_start("1").unwrap(), 1);
    }

    #[test]
    fn test_resolve_start_duplicate_names_first_match() {
        let steps = named(&["build", "test", "build"]);
        assert_eq!(steps.resolve_start("build").unwrap(), 0);
    }

    #[test]
    fn test_resolve_start_is_exact() {
        let steps = named(&["Build"]);
        assert!(steps.resolve_start("build").is_err());
        assert!(steps.resolve_start(" Build").is_err());
    }

    #[test]
    fn test_run_all_steps() {
        let (f1, f2, f3) = mocks();
        let mut steps = StepSequence::new();
        steps.add(f1.success("a")).add(f2.success("b")).add(f3.success("c"));

        assert!(steps.run(0).is_ok());
        assert_eq!((f1.calls(), f2.calls(), f3.calls()), (1, 1, 1));
    }

    #[test]
    fn test_run_error_interrupts() {
        let (f1, f2, f3) = mocks();
        let mut steps = StepSequence::new();
        steps.add(f1.success("a")).add(f2.throw("b")).add(f3.success("c"));

        let err = steps.run(0).unwrap_err();

        assert_eq!((f1.calls(), f2.calls(), f3.calls()), (1, 1, 0));
        match &err {
            RunnerError::StepExecution { index, name, .. } => {
                assert_eq!(*index, 1);
                assert_eq!(name, "b");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.to_string(), "could not perform step 1, b");
        assert_eq!(err.source().unwrap().to_string(), "error");
    }

    #[test]
    fn test_run_dependent_start_fails_without_side_effects() {
        let (f1, f2, f3) = mocks();
        let mut steps = StepSequence::new();
        steps
            .add(f1.success("a"))
            .add(f2.success("b").dependent())
            .add(f3.success("c"));
        let mut sink = RecordingSink::new();

        let err = steps.run_with(1, &mut sink).unwrap_err();

        assert!(err.to_string().contains("cannot be started independently"));
        assert!(matches!(err, RunnerError::DependentStart { index: 1, .. }));
        assert_eq!((f1.calls(), f2.calls(), f3.calls()), (0, 0, 0));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_run_dependent_step_runs_when_reached() {
        let (f1, f2, f3) = mocks();
        let mut steps = StepSequence::new();
        steps
            .add(f1.success("a"))
            .add(f2.success("b").dependent())
            .add(f3.success("c").dependent());

        assert!(steps.run(0).is_ok());
        assert_eq!((f1.calls(), f2.calls(), f3.calls()), (1, 1, 1));
    }

    #[test]
    fn test_run_using_start_index() {
        let (f1, f2, f3) = mocks();
        let mut steps = StepSequence::new();
        steps.add(f1.success("a")).add(f2.success("b")).add(f3.success("c"));
        let mut sink = RecordingSink::new();

        assert!(steps.run_with(1, &mut sink).is_ok());

        assert_eq!((f1.calls(), f2.calls(), f3.calls()), (0, 1, 1));
        assert_eq!(sink.skipped(), vec!["a"]);
        assert_eq!(sink.performed(), vec!["b", "c"]);
    }

    #[test]
    fn test_run_start_on_last_step() {
        let (f1, f2, f3) = mocks();
        let mut steps = StepSequence::new();
        steps.add(f1.success("a")).add(f2.success("b")).add(f3.success("c"));

        assert!(steps.run(2).is_ok());
        assert_eq!((f1.calls(), f2.calls(), f3.calls()), (0, 0, 1));
    }

    #[test]
    fn test_run_skip_predicate() {
        let (f1, f2, f3) = mocks();
        let mut steps = StepSequence::new();
        steps
            .add(f1.success("A").skip_when(|| false))
            .add(f2.success("B").skip_when(|| true))
            .add(f3.success("C").skip_when(|| false));
        let mut sink = RecordingSink::new();

        assert!(steps.run_with(0, &mut sink).is_ok());

        assert_eq!((f1.calls(), f2.calls(), f3.calls()), (1, 0, 1));
        assert_eq!(sink.performed(), vec!["A", "C"]);
        assert_eq!(sink.skipped(), vec!["B"]);
    }

    #[test]
    fn test_run_skipped_start_step_is_allowed() {
        let (f1, f2) = (Mock::default(), Mock::default());
        let mut steps = StepSequence::new();
        steps
            .add(f1.success("a").skip_when(|| true))
            .add(f2.success("b"));

        assert!(steps.run(0).is_ok());
        assert_eq!((f1.calls(), f2.calls()), (0, 1));
    }

    #[test]
    fn test_run_skip_predicate_not_evaluated_before_start() {
        let evaluated = Rc::new(Cell::new(false));
        let seen = Rc::clone(&evaluated);
        let mut steps = StepSequence::new();
        steps
            .add(Step::named("a").skip_when(move || {
                seen.set(true);
                false
            }))
            .add(Step::named("b"));

        assert!(steps.run(1).is_ok());
        assert!(!evaluated.get());
    }

    #[test]
    fn test_run_events_carry_index_and_last() {
        let steps = named(&["a", "b", "c"]);
        let mut sink = RecordingSink::new();

        steps.run_with(1, &mut sink).unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            StepEvent {
                kind: EventKind::Skip,
                index: 0,
                name: "a".to_string(),
                last: 2,
            }
        );
        assert_eq!(events[2].index, 2);
        assert!(events.iter().all(|e| e.last == 2));
        assert_eq!(
            sink.render(),
            "SKIP\t[0/0-2]\t\"a\"\nDO\t[1/0-2]\t\"b\"\nDO\t[2/0-2]\t\"c\""
        );
    }

    #[test]
    fn test_run_failure_stops_events() {
        let (f1, f2, f3) = mocks();
        let mut steps = StepSequence::new();
        steps.add(f1.success("a")).add(f2.throw("b")).add(f3.success("c"));
        let mut sink = RecordingSink::new();

        assert!(steps.run_with(0, &mut sink).is_err());
        assert_eq!(sink.performed(), vec!["a", "b"]);
        assert!(sink.skipped().is_empty());
    }

    #[test]
    fn test_run_out_of_range() {
        let steps = named(&["a", "b"]);
        let mut sink = RecordingSink::new();

        let err = steps.run_with(2, &mut sink).unwrap_err();

        assert!(matches!(err, RunnerError::InvalidStartIndex { index: 2, len: 2 }));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_run_empty_sequence() {
        let steps = StepSequence::new();
        assert!(matches!(
            steps.run_all(),
            Err(RunnerError::InvalidStartIndex { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_run_is_repeatable() {
        let (f1, f2, f3) = mocks();
        let mut steps = StepSequence::new();
        steps.add(f1.success("a")).add(f2.success("b")).add(f3.success("c"));

        steps.run(1).unwrap();
        steps.run(0).unwrap();

        assert_eq!((f1.calls(), f2.calls(), f3.calls()), (1, 2, 2));
    }

    #[test]
    fn test_run_all_matches_run_zero() {
        let (f1, f2, f3) = mocks();
        let mut steps = StepSequence::new();
        steps.add(f1.success("a")).add(f2.throw("b")).add(f3.success("c"));

        let by_run = steps.run(0).unwrap_err().to_string();
        let by_run_all = steps.run_all().unwrap_err().to_string();

        assert_eq!(by_run, by_run_all);
        assert_eq!((f1.calls(), f2.calls(), f3.calls()), (2, 2, 0));
    }

    #[test]
    fn test_run_all_with_sink() {
        let steps = named(&["a", "b"]);
        let mut sink = RecordingSink::new();

        steps.run_all_with(&mut sink).unwrap();
        assert_eq!(sink.performed(), vec!["a", "b"]);
    }

    #[test]
    fn test_run_from_command_by_name() {
        let (f1, f2, f3) = mocks();
        let mut steps = StepSequence::new();
        steps.add(f1.success("first")).add(f2.success("second")).add(f3.success("third"));

        assert!(steps.run_from_command("second").is_ok());
        assert_eq!((f1.calls(), f2.calls(), f3.calls()), (0, 1, 1));
    }

    #[test]
    fn test_run_from_command_by_index() {
        let (f1, f2, f3) = mocks();
        let mut steps = StepSequence::new();
        steps.add(f1.success("first")).add(f2.success("second")).add(f3.success("third"));

        assert!(steps.run_from_command("2").is_ok());
        assert_eq!((f1.calls(), f2.calls(), f3.calls()), (0, 0, 1));
    }

    #[test]
    fn test_run_from_command_invalid() {
        let (f1, f2) = (Mock::default(), Mock::default());
        let mut steps = StepSequence::new();
        steps.add(f1.success("first")).add(f2.success("second"));
        let mut sink = RecordingSink::new();

        let err = steps.run_from_command_with("foo", &mut sink).unwrap_err();

        assert_eq!(err.to_string(), "could not parse command");
        match err {
            RunnerError::UnparsableCommand { source } => {
                assert!(matches!(*source, RunnerError::InvalidStepReference { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!((f1.calls(), f2.calls()), (0, 0));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_run_from_command_dependent_step() {
        let (f1, f2) = (Mock::default(), Mock::default());
        let mut steps = StepSequence::new();
        steps.add(f1.success("first")).add(f2.success("second").dependent());

        let err = steps.run_from_command("second").unwrap_err();

        assert!(matches!(err, RunnerError::DependentStart { index: 1, .. }));
        assert_eq!((f1.calls(), f2.calls()), (0, 0));
    }

    #[test]
    fn test_run_from_command_propagates_step_failure() {
        let f1 = Mock::default();
        let mut steps = StepSequence::new();
        steps.add(Step::named("first")).add(f1.throw("second"));

        let err = steps.run_from_command("first").unwrap_err();

        assert_eq!(err.step_index(), Some(1));
        assert_eq!(f1.calls(), 1);
    }

    #[test]
    fn test_add_extends_sequence() {
        let mut steps = named(&["first"]);
        steps.add(Step::named("second").dependent());

        assert_eq!(steps.len(), 2);
        assert_eq!(steps.get(0).unwrap().name(), "first");
        assert!(!steps.get(0).unwrap().is_dependent());
        assert_eq!(steps.get(1).unwrap().name(), "second");
        assert!(steps.get(1).unwrap().is_dependent());
        assert!(steps.get(2).is_none());
    }

    #[test]
    fn test_add_allows_duplicate_names() {
        let mut steps = StepSequence::new();
        steps.add(Step::named("same")).add(Step::named("same"));
        assert_eq!(steps.names(), vec!["0:\"same\"", "1:\"same\""]);
    }

    #[test]
    fn test_extend_and_iter() {
        let mut steps = named(&["a"]);
        steps.extend(vec![Step::named("b"), Step::named("c")]);

        let names: Vec<&str> = steps.iter().map(Step::name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!((&steps).into_iter().count(), 3);
        assert!(!steps.is_empty());
    }

    #[test]
    fn test_steps_without_action_succeed() {
        let steps = named(&["a", "b", "c"]);
        assert!(steps.run_all().is_ok());
    }
}
