//! Per-thread pooling of execution contexts.

use std::cell::RefCell;

use tracing::trace;

use crate::domain::equality::EqualityScratch;
use crate::domain::expr::Expr;
use crate::domain::hashing::HashComputation;

/// Scratch state needed by one comparison or hash computation.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    pub equality: EqualityScratch,
    pub hashing: HashComputation,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn are_equal(&mut self, a: &Expr, b: &Expr) -> bool {
        self.equality.are_equal(a, b)
    }

    pub fn hash(&mut self, root: &Expr) -> u32 {
        self.hashing.compute(root)
    }
}

thread_local! {
    static POOLED: RefCell<ExecutionContext> = RefCell::new(ExecutionContext::new());
}

/// Run `f` with this thread's pooled context.
///
/// If the pooled context is already in use further up the stack (a symbol
/// comparison that itself compares trees, for instance) or the thread is
/// shutting down, `f` gets a fresh context instead.
pub fn with_context<R>(f: impl FnOnce(&mut ExecutionContext) -> R) -> R {
    let mut f = Some(f);
    let pooled = POOLED
        .try_with(|cell| {
            let mut context = cell.try_borrow_mut().ok()?;
            let f = f.take()?;
            Some(f(&mut *context))
        })
        .ok()
        .flatten();

    match (pooled, f) {
        (Some(result), _) => result,
        (None, Some(f)) => {
            trace!("pooled execution context busy, using a fresh one");
            f(&mut ExecutionContext::new())
        }
        (None, None) => unreachable!("closure consumed without producing a result"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::expr::NodeType;
    use crate::domain::symbol::Sym;

    #[test]
    fn test_reentrant_use_gets_fresh_context() {
        let int = Sym::named("System.Int32");
        let a = Expr::binary(
            NodeType::Add,
            Expr::parameter(int.clone(), Some("a")),
            Expr::constant(1, int.clone()),
            Some(int.clone()),
        )
        .unwrap();
        let b = Expr::binary(
            NodeType::Add,
            Expr::parameter(int.clone(), Some("a")),
            Expr::constant(1, int.clone()),
            Some(int.clone()),
        )
        .unwrap();
        let c = Expr::constant(2, int);

        let (outer, inner) = with_context(|outer| {
            let inner = with_context(|inner| inner.are_equal(&a, &c));
            (outer.are_equal(&a, &b), inner)
        });
        assert!(outer);
        assert!(!inner);
    }

    #[test]
    fn test_pooled_context_is_reused_across_calls() {
        let int = Sym::named("System.Int32");
        let x = Expr::constant(5, int);
        let first = with_context(|ctx| ctx.hash(&x));
        let second = with_context(|ctx| ctx.hash(&x));
        assert_eq!(first, second);
    }
}
