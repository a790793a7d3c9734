//! Centralized state store with middleware pipeline

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::thread::{self, ThreadId};

use crate::action::Action;
use crate::chain::DispatchChain;
use crate::error::DispatchError;
use crate::middleware::{Middleware, SharedMiddleware as Link};

/// Computes the next state from the current state and an action
///
/// Reducers must be total: actions they don't recognize return the state
/// unchanged. Any `Fn(S, &A) -> S` closure is a reducer; implement the trait
/// directly when the reducer can reject an action.
pub trait Reducer<S, A>: Send + Sync {
    fn reduce(&self, state: S, action: &A) -> Result<S, DispatchError>;
}

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(S, &A) -> S + Send + Sync,
{
    fn reduce(&self, state: S, action: &A) -> Result<S, DispatchError> {
        Ok(self(state, action))
    }
}

/// Adapts a reducer into the terminal link of the chain
struct ReducerLink<R>(R);

impl<S, A, R: Reducer<S, A>> Middleware<S, A> for ReducerLink<R> {
    fn dispatch(
        &self,
        state: S,
        action: &A,
        _chain: &mut DispatchChain<'_, S, A>,
    ) -> Result<S, DispatchError> {
        self.0.reduce(state, action)
    }
}

type Subscriber<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Ordered entries keyed by registration id
struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, T)>,
}

impl<T: Clone> Registry<T> {
    fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    fn insert(&mut self, index: usize, item: T) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(index, (id, item));
        id
    }

    fn push(&mut self, item: T) -> u64 {
        let index = self.entries.len();
        self.insert(index, item)
    }

    fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry_id, _)| *entry_id != id);
    }

    fn snapshot(&self) -> Vec<T> {
        self.entries.iter().map(|(_, item)| item.clone()).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T: Clone>(rw: &RwLock<T>) -> T {
    rw.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn unregister<T: Clone + 'static>(registry: &Arc<RwLock<Registry<T>>>, id: u64) -> Unsubscribe
where
    T: Send + Sync,
{
    let registry: Weak<RwLock<Registry<T>>> = Arc::downgrade(registry);
    Unsubscribe::new(move || {
        if let Some(registry) = registry.upgrade() {
            registry
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(id);
        }
    })
}

/// Handle returned by [`Store::subscribe`] and [`Store::value_watcher`]
///
/// Removes exactly the registration that produced it. Dropping the handle
/// without calling [`unsubscribe`](Self::unsubscribe) keeps the registration
/// alive for the lifetime of the store.
#[must_use = "dropping the handle keeps the registration forever"]
pub struct Unsubscribe {
    remove: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Unsubscribe {
    fn new(remove: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            remove: Some(Box::new(remove)),
        }
    }

    /// Remove the registration
    pub fn unsubscribe(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("active", &self.remove.is_some())
            .finish()
    }
}

/// Clears the dispatching thread marker when a dispatch ends, even by panic
struct DispatchOwner<'a>(&'a Mutex<Option<ThreadId>>);

impl Drop for DispatchOwner<'_> {
    fn drop(&mut self) {
        *lock(self.0) = None;
    }
}

/// Installed at the front of the chain by [`Store::value_watcher`]
struct ValueWatcher<P, C> {
    projection: P,
    on_change: C,
}

impl<S, A, T, P, C> Middleware<S, A> for ValueWatcher<P, C>
where
    T: PartialEq,
    P: Fn(&S) -> T + Send + Sync,
    C: Fn(&T, &T) + Send + Sync,
{
    fn dispatch(
        &self,
        state: S,
        action: &A,
        chain: &mut DispatchChain<'_, S, A>,
    ) -> Result<S, DispatchError> {
        let old = (self.projection)(&state);
        let next = chain.next(state, action)?;
        let new = (self.projection)(&next);
        if old != new {
            (self.on_change)(&old, &new);
        }
        Ok(next)
    }
}

/// Centralized state store with Redux-like reducer and middleware pipeline
///
/// The store holds the application state and provides a single point for
/// state changes through [`dispatch`](Self::dispatch). Every dispatch runs a
/// fresh [`DispatchChain`] over the registered middleware, in insertion
/// order, with the reducer as the terminal link. The chain's result becomes
/// the new state and every subscriber is then notified.
///
/// A store can be shared between threads (`Arc<Store<_, _>>`); concurrent
/// dispatches are serialized so that none is lost.
///
/// # Type Parameters
/// * `S` - The application state type
/// * `A` - The action type (must implement `Action`)
///
/// # Example
/// ```
/// use state_dispatch_core::{Action, Store};
///
/// #[derive(Clone, Debug)]
/// enum CounterAction {
///     Increment,
///     Decrement,
/// }
///
/// impl Action for CounterAction {
///     fn name(&self) -> &'static str {
///         match self {
///             CounterAction::Increment => "Increment",
///             CounterAction::Decrement => "Decrement",
///         }
///     }
/// }
///
/// let store = Store::new(0, |count: i32, action: &CounterAction| match action {
///     CounterAction::Increment => count + 1,
///     CounterAction::Decrement => count - 1,
/// });
///
/// store.dispatch(CounterAction::Increment).unwrap();
/// assert_eq!(store.state(), 1);
/// ```
pub struct Store<S, A> {
    state: Arc<RwLock<S>>,
    /// Serializes dispatches: held from building the chain to assigning its result
    gate: Mutex<()>,
    dispatching: Mutex<Option<ThreadId>>,
    middlewares: Arc<RwLock<Registry<Link<S, A>>>>,
    reducer: Link<S, A>,
    subscribers: Arc<RwLock<Registry<Subscriber<S>>>>,
}

impl<S, A> Store<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action,
{
    /// Create a new store with initial state and reducer
    pub fn new<F>(state: S, reducer: F) -> Self
    where
        F: Fn(S, &A) -> S + Send + Sync + 'static,
    {
        Self::with_reducer(state, reducer)
    }

    /// Create a new store with middleware, run in the given order before the reducer
    pub fn with_middlewares<F>(state: S, middlewares: Vec<Link<S, A>>, reducer: F) -> Self
    where
        F: Fn(S, &A) -> S + Send + Sync + 'static,
    {
        let store = Self::with_reducer(state, reducer);
        store.append_middlewares(middlewares);
        store
    }

    /// Create a new store around a [`Reducer`] implementation
    pub fn with_reducer<R>(state: S, reducer: R) -> Self
    where
        R: Reducer<S, A> + 'static,
    {
        Self {
            state: Arc::new(RwLock::new(state)),
            gate: Mutex::new(()),
            dispatching: Mutex::new(None),
            middlewares: Arc::new(RwLock::new(Registry::new())),
            reducer: Arc::new(ReducerLink(reducer)),
            subscribers: Arc::new(RwLock::new(Registry::new())),
        }
    }

    fn append_middlewares(&self, middlewares: Vec<Link<S, A>>) {
        let mut registry = self
            .middlewares
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for middleware in middlewares {
            registry.push(middleware);
        }
    }

    /// Start building a store from its initial state
    pub fn builder(state: S) -> StoreBuilder<S, A> {
        StoreBuilder::new(state)
    }

    /// Get a snapshot of the current state
    pub fn state(&self) -> S {
        read(&*self.state)
    }

    /// Dispatch an action through the middleware chain and the reducer
    ///
    /// On success the new state is stored and every subscriber is notified,
    /// in subscription order. On failure the state is left untouched and no
    /// subscriber is notified.
    pub fn dispatch(&self, action: A) -> Result<(), DispatchError> {
        let state = self.run_chain(&action)?;

        let subscribers = read_registry(&self.subscribers);
        tracing::trace!(
            action = %action.name(),
            subscribers = subscribers.len(),
            "Dispatched action"
        );
        for subscriber in subscribers {
            subscriber(&state);
        }

        Ok(())
    }

    fn run_chain(&self, action: &A) -> Result<S, DispatchError> {
        let me = thread::current().id();
        if *lock(&self.dispatching) == Some(me) {
            return Err(DispatchError::Reentrant);
        }

        let _gate = lock(&self.gate);
        *lock(&self.dispatching) = Some(me);
        let _owner = DispatchOwner(&self.dispatching);

        let mut links = read_registry(&self.middlewares);
        links.push(self.reducer.clone());

        let mut chain = DispatchChain::new(&links);
        let next = chain.next(self.state(), action)?;

        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next.clone();
        Ok(next)
    }

    /// Register a callback invoked with the new state after every dispatch
    pub fn subscribe<F>(&self, subscriber: F) -> Unsubscribe
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let id = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(subscriber));
        unregister(&self.subscribers, id)
    }

    /// Return an accessor that projects the current state on every call
    ///
    /// The projection runs on a snapshot with no lock held. The accessor holds
    /// onto the state, not the store; it keeps returning the last state even
    /// after the store is dropped.
    pub fn selector<T, P>(&self, projection: P) -> impl Fn() -> T + Send + Sync + 'static
    where
        P: Fn(&S) -> T + Send + Sync + 'static,
    {
        let state = Arc::clone(&self.state);
        move || projection(&read(&*state))
    }

    /// Call `on_change(old, new)` whenever a dispatch changes the projected value
    ///
    /// Installs a middleware in front of every other one. Dispatches that
    /// leave the projection equal (by `PartialEq`) don't trigger the callback.
    pub fn value_watcher<T, P, C>(&self, projection: P, on_change: C) -> Unsubscribe
    where
        T: PartialEq + 'static,
        P: Fn(&S) -> T + Send + Sync + 'static,
        C: Fn(&T, &T) + Send + Sync + 'static,
    {
        let watcher: Link<S, A> = Arc::new(ValueWatcher {
            projection,
            on_change,
        });
        let id = self
            .middlewares
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(0, watcher);
        unregister(&self.middlewares, id)
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of middleware in front of the reducer
    pub fn middleware_count(&self) -> usize {
        self.middlewares
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn read_registry<T: Clone>(registry: &RwLock<Registry<T>>) -> Vec<T> {
    registry
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .snapshot()
}

impl<S: fmt::Debug, A> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.state.read().unwrap_or_else(PoisonError::into_inner))
            .finish_non_exhaustive()
    }
}

/// Fluent construction of a [`Store`]
///
/// ```
/// use state_dispatch_core::{Action, LoggingMiddleware, Store};
///
/// #[derive(Clone, Debug)]
/// struct Tick;
///
/// impl Action for Tick {
///     fn name(&self) -> &'static str {
///         "Tick"
///     }
/// }
///
/// let store = Store::<i32, Tick>::builder(1)
///     .middleware(LoggingMiddleware::new())
///     .middleware_fn(|state, action, chain| chain.next(state + 1, action))
///     .reducer(|state, _| state * 2);
///
/// store.dispatch(Tick).unwrap();
/// assert_eq!(store.state(), 4);
/// ```
pub struct StoreBuilder<S, A> {
    state: S,
    middlewares: Vec<Link<S, A>>,
    _marker: PhantomData<A>,
}

impl<S, A> StoreBuilder<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action,
{
    pub fn new(state: S) -> Self {
        Self {
            state,
            middlewares: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Append a middleware
    pub fn middleware<M: Middleware<S, A> + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Append an already shared middleware (e.g. one the caller keeps a handle to)
    pub fn shared_middleware(mut self, middleware: Link<S, A>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Append a closure middleware
    pub fn middleware_fn<F>(self, f: F) -> Self
    where
        F: Fn(S, &A, &mut DispatchChain<'_, S, A>) -> Result<S, DispatchError>
            + Send
            + Sync
            + 'static,
    {
        self.middleware(crate::middleware::middleware_fn(f))
    }

    /// Finish with a closure reducer
    pub fn reducer<F>(self, reducer: F) -> Store<S, A>
    where
        F: Fn(S, &A) -> S + Send + Sync + 'static,
    {
        Store::with_middlewares(self.state, self.middlewares, reducer)
    }

    /// Finish with a [`Reducer`] implementation
    pub fn build<R>(self, reducer: R) -> Store<S, A>
    where
        R: Reducer<S, A> + 'static,
    {
        let store = Store::with_reducer(self.state, reducer);
        store.append_middlewares(self.middlewares);
        store
    }
}
