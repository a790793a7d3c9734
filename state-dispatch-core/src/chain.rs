//! Single-use cursor over the middleware of one dispatch

use std::sync::Arc;

use crate::error::DispatchError;
use crate::middleware::Middleware;

/// The rest of the pipeline, as seen from inside a middleware.
///
/// A chain is built fresh for every dispatch and walked front to back. Each
/// middleware receives the chain and decides what to do with it:
///
/// - call [`next`](Self::next) before doing its own work, after it, or both
/// - not call it at all, short-circuiting everything downstream
/// - call it more than once; every call resumes from the current cursor, so
///   once the chain is exhausted further calls are the identity
///
/// Calling `next` past the last link returns the state unchanged.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use state_dispatch_core::{middleware_fn, DispatchChain, Middleware};
///
/// let links: Vec<Arc<dyn Middleware<i32, ()>>> = vec![
///     Arc::new(middleware_fn(|state: i32, action: &(), chain| chain.next(state + 1, action))),
///     Arc::new(middleware_fn(|state: i32, action: &(), chain| chain.next(state * 2, action))),
/// ];
///
/// let mut chain = DispatchChain::new(&links);
/// assert_eq!(chain.next(1, &()), Ok(4));
/// ```
pub struct DispatchChain<'a, S, A> {
    links: &'a [Arc<dyn Middleware<S, A>>],
    cursor: usize,
}

impl<'a, S, A> DispatchChain<'a, S, A> {
    /// Create a chain positioned before the first link
    pub fn new(links: &'a [Arc<dyn Middleware<S, A>>]) -> Self {
        Self { links, cursor: 0 }
    }

    /// Run the next unvisited link, or return `state` unchanged if none is left
    pub fn next(&mut self, state: S, action: &A) -> Result<S, DispatchError> {
        let links = self.links;
        match links.get(self.cursor) {
            Some(link) => {
                self.cursor += 1;
                link.dispatch(state, action, self)
            }
            None => Ok(state),
        }
    }

    /// Number of links not visited yet
    pub fn remaining(&self) -> usize {
        self.links.len() - self.cursor
    }
}

impl<S, A> std::fmt::Debug for DispatchChain<'_, S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchChain")
            .field("links", &self.links.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::middleware_fn;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Link = Arc<dyn Middleware<i32, ()>>;

    #[test]
    fn test_empty_chain_is_identity() {
        let links: Vec<Link> = Vec::new();
        let mut chain = DispatchChain::new(&links);

        assert_eq!(chain.next(42, &()), Ok(42));
        assert_eq!(chain.next(7, &()), Ok(7));
    }

    #[test]
    fn test_links_run_in_order() {
        let links: Vec<Link> = vec![
            Arc::new(middleware_fn(|state: i32, action: &(), chain| {
                chain.next(state + 1, action)
            })),
            Arc::new(middleware_fn(|state: i32, action: &(), chain| {
                chain.next(state * 2, action)
            })),
        ];

        assert_eq!(DispatchChain::new(&links).next(1, &()), Ok(4));
    }

    #[test]
    fn test_short_circuit_skips_downstream() {
        let downstream = Arc::new(AtomicUsize::new(0));
        let counter = downstream.clone();

        let links: Vec<Link> = vec![
            Arc::new(middleware_fn(|_state: i32, _action: &(), _chain| Ok(43))),
            Arc::new(middleware_fn(move |state: i32, action: &(), chain| {
                counter.fetch_add(1, Ordering::SeqCst);
                chain.next(state, action)
            })),
        ];

        let mut chain = DispatchChain::new(&links);
        assert_eq!(chain.next(0, &()), Ok(43));
        assert_eq!(downstream.load(Ordering::SeqCst), 0);
        assert_eq!(chain.remaining(), 1);
    }

    #[test]
    fn test_calling_next_twice_resumes_from_cursor() {
        let links: Vec<Link> = vec![
            Arc::new(middleware_fn(|state: i32, action: &(), chain| {
                let once = chain.next(state, action)?;
                chain.next(once + 100, action)
            })),
            Arc::new(middleware_fn(|state: i32, action: &(), chain| {
                chain.next(state + 1, action)
            })),
        ];

        // Second call finds the chain exhausted and returns its input
        assert_eq!(DispatchChain::new(&links).next(0, &()), Ok(101));
    }

    #[test]
    fn test_error_propagates() {
        let links: Vec<Link> = vec![
            Arc::new(middleware_fn(|state: i32, action: &(), chain| {
                chain.next(state, action)
            })),
            Arc::new(middleware_fn(|_state: i32, _action: &(), _chain| {
                Err(DispatchError::middleware("rejected"))
            })),
        ];

        assert_eq!(
            DispatchChain::new(&links).next(0, &()),
            Err(DispatchError::Middleware("rejected".into()))
        );
    }
}
