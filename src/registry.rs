//! Matcher registry and resolution.
//!
//! `MatcherRegistry` holds every registered `MatcherFactory` in registration
//! order. Registration is open during start-up only; once sealed (the
//! tracker seals the registry it is given) further registration fails.

use crate::invocation::{CommandInvocation, InvocationId, MatcherContext};
use crate::matcher::{
    FinishPolicy, FnMatcherFactory, LineMatcher, MatcherError, MatcherFactory, guarded,
};

/// Errors raised while registering factories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// A factory with this display name is already registered.
    #[error("a matcher named {0:?} is already registered")]
    DuplicateName(String),
    /// The registry no longer accepts registrations.
    #[error("registry is sealed; cannot register {0:?}")]
    Sealed(String),
}

/// A matcher built for one invocation, with its factory's scheduling flags.
pub struct ResolvedMatcher {
    pub name: String,
    pub fast: bool,
    pub finish_policy: FinishPolicy,
    pub matcher: Box<dyn LineMatcher>,
}

impl std::fmt::Debug for ResolvedMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedMatcher")
            .field("name", &self.name)
            .field("fast", &self.fast)
            .field("finish_policy", &self.finish_policy)
            .finish_non_exhaustive()
    }
}

/// Central registry of matcher factories.
#[derive(Default)]
pub struct MatcherRegistry {
    factories: Vec<Box<dyn MatcherFactory>>,
    sealed: bool,
}

impl MatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory. Names must be unique.
    pub fn register(&mut self, factory: Box<dyn MatcherFactory>) -> Result<(), RegistrationError> {
        let name = factory.name().to_string();
        if self.sealed {
            return Err(RegistrationError::Sealed(name));
        }
        if self.factories.iter().any(|f| f.name() == name) {
            return Err(RegistrationError::DuplicateName(name));
        }
        crate::debug_info!(
            "REGISTRY",
            "registered matcher {} (fast={}, finish={:?})",
            name,
            factory.fast(),
            factory.finish_policy()
        );
        self.factories.push(factory);
        Ok(())
    }

    /// Register a factory built from a predicate and a constructor closure.
    pub fn register_fn<P, C>(
        &mut self,
        name: impl Into<String>,
        predicate: P,
        constructor: C,
        fast: bool,
    ) -> Result<(), RegistrationError>
    where
        P: Fn(&str, &str) -> Result<bool, MatcherError> + Send + Sync + 'static,
        C: Fn(&MatcherContext) -> Box<dyn LineMatcher> + Send + Sync + 'static,
    {
        self.register(Box::new(
            FnMatcherFactory::new(name, predicate, constructor).with_fast(fast),
        ))
    }

    /// Close the registry to further registration. One-way.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered factories in registration order.
    pub fn factories(&self) -> impl Iterator<Item = &dyn MatcherFactory> {
        self.factories.iter().map(|f| f.as_ref())
    }

    /// Build a matcher from every factory whose predicate accepts `invocation`.
    ///
    /// The command line is trimmed before predicates see it; a blank command
    /// attaches nothing. Predicate errors and panics count as "no match" and
    /// are logged.
    pub fn resolve(&self, id: InvocationId, invocation: &CommandInvocation) -> Vec<ResolvedMatcher> {
        let command = invocation.command.trim();
        if command.is_empty() {
            crate::debug_trace!("REGISTRY", "blank command for {}", id);
            return Vec::new();
        }
        let mut ctx = MatcherContext::from_invocation(invocation);
        ctx.command = command.to_string();
        let mut resolved = Vec::new();

        for factory in &self.factories {
            let name = factory.name();
            let attached = guarded(|| {
                if !factory.matches(command, &invocation.working_dir)? {
                    return Ok(None);
                }
                Ok(Some(factory.create(&ctx)))
            });

            match attached {
                Ok(Some(matcher)) => {
                    crate::debug_log!("REGISTRY", "{} attached to {}", name, id);
                    resolved.push(ResolvedMatcher {
                        name: name.to_string(),
                        fast: factory.fast(),
                        finish_policy: factory.finish_policy(),
                        matcher,
                    });
                }
                Ok(None) => {
                    crate::debug_trace!("REGISTRY", "{} declined {}", name, id);
                }
                Err(e) => {
                    log::warn!(
                        "Matcher {} predicate failed for {} ({:?}): {}",
                        name,
                        id,
                        invocation.command,
                        e
                    );
                }
            }
        }

        resolved
    }
}
