use super::{FinishPolicy, LineMatcher, MatcherError, MatcherFactory};
use crate::invocation::MatcherContext;

type Predicate = dyn Fn(&str, &str) -> Result<bool, MatcherError> + Send + Sync;
type Constructor = dyn Fn(&MatcherContext) -> Box<dyn LineMatcher> + Send + Sync;

/// A factory assembled from closures, for hosts registering ad-hoc matchers.
///
/// ```ignore
/// let factory = FnMatcherFactory::new(
///     "uptime",
///     |cmd, _dir| Ok(cmd == "uptime"),
///     |_ctx| Box::new(UptimeMatcher::default()),
/// )
/// .with_fast(true);
/// ```
pub struct FnMatcherFactory {
    name: String,
    fast: bool,
    finish_policy: FinishPolicy,
    predicate: Box<Predicate>,
    constructor: Box<Constructor>,
}

impl FnMatcherFactory {
    pub fn new<P, C>(name: impl Into<String>, predicate: P, constructor: C) -> Self
    where
        P: Fn(&str, &str) -> Result<bool, MatcherError> + Send + Sync + 'static,
        C: Fn(&MatcherContext) -> Box<dyn LineMatcher> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            fast: false,
            finish_policy: FinishPolicy::ActiveOnly,
            predicate: Box::new(predicate),
            constructor: Box::new(constructor),
        }
    }

    pub fn with_fast(mut self, fast: bool) -> Self {
        self.fast = fast;
        self
    }

    pub fn with_finish_policy(mut self, policy: FinishPolicy) -> Self {
        self.finish_policy = policy;
        self
    }
}

impl MatcherFactory for FnMatcherFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn fast(&self) -> bool {
        self.fast
    }

    fn finish_policy(&self) -> FinishPolicy {
        self.finish_policy
    }

    fn matches(&self, command: &str, working_dir: &str) -> Result<bool, MatcherError> {
        (self.predicate)(command, working_dir)
    }

    fn create(&self, ctx: &MatcherContext) -> Box<dyn LineMatcher> {
        (self.constructor)(ctx)
    }
}
