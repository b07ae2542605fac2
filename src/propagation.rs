//! The enter/leave engine swapping thread-local state around task resumes.
//!
//! Before a scheduler resumes a task's continuation on a worker thread it
//! calls [`PropagationEngine::enter`] with the task's [`Context`]; after the
//! task suspends or completes it calls [`PropagationEngine::leave`] with the
//! same context and the token `enter` returned. [`PropagationEngine::scope`]
//! wraps the pair in an RAII guard so `leave` also runs when the task body
//! panics.
//!
//! # Performance tiers
//!
//! Contexts typically carry zero or one propagated element, so `enter` is
//! tiered on the number of bridge invocations needed:
//!
//! 1. **None**: no thread-local is touched and nothing is allocated
//! 2. **One**: the single bridge fires and its prior state rides in the
//!    token directly, with no container
//! 3. **Many**: an exact-capacity sequence of prior states is recorded
//!
//! The tier is decided by invocation count, not element count, because one
//! element may be matched by several bridges registered for its key.
//!
//! # Ordering invariant
//!
//! `enter` and `leave` must visit (element, bridge) pairs in the exact same
//! sequence: context order for elements, registration order for bridges.
//! The prior-state sequence in a many-token is positional, so a traversal
//! mismatch would hand one bridge another bridge's state. `leave` defends
//! with bounds checks and panics on a token/context mismatch rather than
//! silently corrupting thread state.

use crate::bridge::{PriorState, ThreadLocalBridge};
use crate::config::DebugMode;
use crate::context::{Context, ContextElement, Key};
use crate::plugins::task_name::TaskNameBridge;
use core::fmt;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Most keys have exactly one registered bridge.
type BridgeList = SmallVec<[Arc<dyn ThreadLocalBridge>; 1]>;

/// Opaque value produced by [`PropagationEngine::enter`] and consumed by
/// [`PropagationEngine::leave`].
///
/// A token must be passed back to `leave` together with the context that
/// produced it; pairing it with any other context is a programming error
/// and fails loudly.
pub struct RestoreToken(TokenRepr);

enum TokenRepr {
    /// No bridge fired; nothing to undo.
    Empty,
    /// Exactly one bridge fired; its prior state, uncontained.
    Single(PriorState),
    /// Two or more invocations; prior states in traversal order.
    Many(Vec<PriorState>),
}

impl RestoreToken {
    /// True when the matching `enter` touched no thread-local state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.0, TokenRepr::Empty)
    }
}

impl fmt::Debug for RestoreToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            TokenRepr::Empty => f.write_str("RestoreToken::Empty"),
            TokenRepr::Single(_) => f.write_str("RestoreToken::Single"),
            TokenRepr::Many(priors) => write!(f, "RestoreToken::Many({})", priors.len()),
        }
    }
}

/// The registry of installed bridges plus the enter/leave algorithm.
///
/// Built once at startup from a fixed ordered bridge list, read-only
/// afterwards; lookups take no locks.
pub struct PropagationEngine {
    services_by_key: HashMap<Key, BridgeList>,
}

impl PropagationEngine {
    /// Builds the registry from an ordered bridge list.
    ///
    /// Bridges sharing a key keep their relative registration order.
    #[must_use]
    pub fn new(bridges: Vec<Arc<dyn ThreadLocalBridge>>) -> Self {
        let mut services_by_key: HashMap<Key, BridgeList> = HashMap::new();
        for bridge in bridges {
            services_by_key.entry(bridge.key()).or_default().push(bridge);
        }
        Self { services_by_key }
    }

    /// Builds the registry from the host-supplied list, force-registering
    /// the built-in debug task-naming bridge first when `debug` is enabled.
    #[must_use]
    pub fn from_host_list(bridges: Vec<Arc<dyn ThreadLocalBridge>>, debug: DebugMode) -> Self {
        let mut all: Vec<Arc<dyn ThreadLocalBridge>> = Vec::with_capacity(bridges.len() + 1);
        if debug.is_enabled() {
            all.push(Arc::new(TaskNameBridge::new()));
        }
        all.extend(bridges);
        Self::new(all)
    }

    /// Number of distinct keys with at least one registered bridge.
    #[must_use]
    pub fn registered_keys(&self) -> usize {
        self.services_by_key.len()
    }

    /// Installs the thread-local state for every element of `context` that
    /// has a registered bridge, returning the token `leave` needs to undo
    /// it.
    ///
    /// Must run on the thread that is about to run the task, before the
    /// task body.
    #[must_use]
    pub fn enter(&self, context: &Context) -> RestoreToken {
        if self.services_by_key.is_empty() || context.is_empty() {
            return RestoreToken(TokenRepr::Empty);
        }
        match self.invocation_count(context) {
            0 => RestoreToken(TokenRepr::Empty),
            1 => {
                for (element, bridge) in self.active_pairs(context) {
                    let prior = bridge.update_thread_context(context, element);
                    trace!(key = %element.key(), "context enter");
                    return RestoreToken(TokenRepr::Single(prior));
                }
                unreachable!("bridge invocation count changed between passes")
            }
            n => {
                let mut priors = Vec::with_capacity(n);
                for (element, bridge) in self.active_pairs(context) {
                    priors.push(bridge.update_thread_context(context, element));
                }
                trace!(invocations = n, "context enter");
                RestoreToken(TokenRepr::Many(priors))
            }
        }
    }

    /// Restores the thread-local state captured by the matching
    /// [`enter`](Self::enter) call.
    ///
    /// Must run on the same thread as the matching `enter`, after the task
    /// body suspended or returned.
    ///
    /// # Panics
    ///
    /// Panics when `token` was not produced by `enter` on this `context`:
    /// the prior-state sequence is positional, and restoring it against a
    /// different active set would corrupt thread state.
    pub fn leave(&self, context: &Context, token: RestoreToken) {
        match token.0 {
            TokenRepr::Empty => {}
            TokenRepr::Single(prior) => {
                let mut prior = Some(prior);
                for (_element, bridge) in self.active_pairs(context) {
                    match prior.take() {
                        Some(p) => bridge.restore_thread_context(context, p),
                        None => panic!(
                            "restore token mismatch: single-state token, \
                             but the context has more than one active bridge"
                        ),
                    }
                }
                assert!(
                    prior.is_none(),
                    "restore token mismatch: single-state token, \
                     but the context has no active bridge"
                );
                trace!("context leave");
            }
            TokenRepr::Many(priors) => {
                let expected = priors.len();
                let mut priors = priors.into_iter();
                for (_element, bridge) in self.active_pairs(context) {
                    let Some(prior) = priors.next() else {
                        panic!(
                            "restore token mismatch: token holds {expected} prior states, \
                             but the context has more active bridges"
                        );
                    };
                    bridge.restore_thread_context(context, prior);
                }
                let leftover = priors.count();
                assert!(
                    leftover == 0,
                    "restore token mismatch: {leftover} of {expected} prior states \
                     had no active bridge to restore into"
                );
                trace!(invocations = expected, "context leave");
            }
        }
    }

    /// Calls [`enter`](Self::enter) now and guarantees the matching
    /// [`leave`](Self::leave) on every exit path of the enclosing scope,
    /// including unwinding.
    #[must_use]
    pub fn scope<'a>(&'a self, context: &'a Context) -> PropagationScope<'a> {
        let token = self.enter(context);
        PropagationScope {
            engine: self,
            context,
            token: Some(token),
        }
    }

    /// Total bridge invocations `context` requires.
    fn invocation_count(&self, context: &Context) -> usize {
        context
            .iter()
            .filter_map(|element| self.services_by_key.get(&element.key()))
            .map(SmallVec::len)
            .sum()
    }

    /// (element, bridge) pairs in the canonical traversal order: context
    /// order for elements, registration order for bridges. `enter` and
    /// `leave` both walk this exact sequence.
    fn active_pairs<'a>(
        &'a self,
        context: &'a Context,
    ) -> impl Iterator<Item = (&'a ContextElement, &'a Arc<dyn ThreadLocalBridge>)> {
        context.iter().flat_map(move |element| {
            self.services_by_key
                .get(&element.key())
                .into_iter()
                .flatten()
                .map(move |bridge| (element, bridge))
        })
    }
}

impl fmt::Debug for PropagationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropagationEngine")
            .field("registered_keys", &self.services_by_key.len())
            .finish()
    }
}

/// RAII guard pairing one `enter` with exactly one `leave`.
///
/// Dropping the guard restores the captured thread-local state; drop runs
/// on unwinding too, so an erroring task body cannot leak its context into
/// the next task resumed on the thread.
pub struct PropagationScope<'a> {
    engine: &'a PropagationEngine,
    context: &'a Context,
    token: Option<RestoreToken>,
}

impl Drop for PropagationScope<'_> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            self.engine.leave(self.context, token);
        }
    }
}

impl fmt::Debug for PropagationScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropagationScope")
            .field("context", self.context)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
