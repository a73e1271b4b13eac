use crate::context::{EvaluationContext, ModuleId, Reference, ResolutionGuard};
use crate::visit;
use hcl::{Expression, Identifier, Traversal, TraversalOperator};

/// Replaces every reference the [EvaluationContext] can resolve with its literal value
///
/// Stops rewriting once a reference turned out to be unknown, the whole expression is unknown then.
#[derive(derive_new::new)]
pub(crate) struct ReferenceRewriter<'c, 'g> {
    context: &'c EvaluationContext,
    module: ModuleId,
    guard: &'g mut ResolutionGuard,
    #[new(default)]
    pub unknown: bool,
}

impl<'c, 'g> visit::VisitMut<Traversal> for ReferenceRewriter<'c, 'g> {
    fn visit_mut(&mut self, traversal: &mut Traversal) {
        if self.unknown {
            return;
        }

        let path = traversal.get_longest_path();
        match self
            .context
            .resolve_reference(self.module, &path, self.guard)
        {
            Reference::NotAReference => {}
            Reference::Unknown => self.unknown = true,
            Reference::Resolved { literal, consumed } => {
                traversal.apply_substitution(literal.into(), consumed)
            }
        }
    }
}

pub(crate) trait TraversalExt {
    fn apply_substitution(&mut self, expr: Expression, path_len: usize);
    fn get_longest_path(&self) -> Vec<Identifier>;
}

impl TraversalExt for Traversal {
    /// Replace the root and the first `path_len - 1` operators with `expr`
    #[tracing::instrument(level = "trace")]
    fn apply_substitution(&mut self, expr: Expression, path_len: usize) {
        let remove = path_len.saturating_sub(1).min(self.operators.len());

        self.expr = expr;
        self.operators.drain(..remove);

        tracing::trace!(traversal=?self, "after substitution");
    }

    /// `a.b.c[0].d` has the longest path `[a, b, c]`
    fn get_longest_path(&self) -> Vec<Identifier> {
        let Expression::Variable(var) = &self.expr else {
            return vec![];
        };

        let mut path = vec![Identifier::unchecked(var.as_str())];
        for operator in &self.operators {
            let TraversalOperator::GetAttr(ident) = operator else {
                break;
            };

            path.push(ident.clone());
        }

        path
    }
}
