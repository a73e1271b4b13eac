//! expression walker
//!
//! Resolution rewrites every reference (`var.x`, `local.y[0]`, `"${module.m.out}"`, ...) in an
//! expression before evaluating it. [walk_expression] hands each [Traversal] of an expression tree
//! to a [VisitMut]. Plain variables are presented as traversals without operators.
use hcl::template::{Directive, Element};
use hcl::{Expression, Operation, Template, TemplateExpr, Traversal, TraversalOperator};

/// Receives traversals and may rewrite them in place
pub trait VisitMut<T> {
    fn visit_mut(&mut self, value: &mut T);
}

impl<T, F> VisitMut<T> for F
where
    F: FnMut(&mut T),
{
    fn visit_mut(&mut self, value: &mut T) {
        self(value)
    }
}

/// Visits every traversal reachable from `expression`, function arguments excluded
pub fn walk_expression(expression: &mut Expression, visitor: &mut dyn VisitMut<Traversal>) {
    match expression {
        Expression::Variable(variable) => {
            let mut traversal = Traversal::new(
                Expression::Variable(variable.clone()),
                Vec::<TraversalOperator>::new(),
            );
            visitor.visit_mut(&mut traversal);
            *expression = into_expression(traversal);
        }
        Expression::Traversal(traversal) => {
            visitor.visit_mut(traversal);
            walk_operators(traversal, visitor);
            if traversal.operators.is_empty() {
                *expression = std::mem::replace(&mut traversal.expr, Expression::Null);
            }
        }
        Expression::TemplateExpr(template_expr) => {
            // unparsable templates stay as they are and fail evaluation later on
            let Ok(mut template) = Template::from_expr(template_expr) else {
                return;
            };
            walk_template(&mut template, visitor);
            *template_expr = Box::new(TemplateExpr::QuotedString(template.to_string()));
        }
        // never evaluated, so there is nothing to substitute
        Expression::FuncCall(_) => {}
        _ => {
            for child in subexpressions(expression) {
                walk_expression(child, visitor);
            }
        }
    }
}

/// Continues below a traversal the visitor has already seen
fn walk_operators(traversal: &mut Traversal, visitor: &mut dyn VisitMut<Traversal>) {
    // a variable root was part of the visited traversal
    if !matches!(traversal.expr, Expression::Variable(_)) {
        walk_expression(&mut traversal.expr, visitor);
    }

    for operator in traversal.operators.iter_mut() {
        if let TraversalOperator::Index(index) = operator {
            walk_expression(index, visitor);
        }
    }
}

fn subexpressions(expression: &mut Expression) -> Vec<&mut Expression> {
    match expression {
        Expression::Array(items) => items.iter_mut().collect(),
        Expression::Object(object) => object.values_mut().collect(),
        Expression::Parenthesis(inner) => vec![inner.as_mut()],
        Expression::Conditional(conditional) => vec![
            &mut conditional.cond_expr,
            &mut conditional.true_expr,
            &mut conditional.false_expr,
        ],
        Expression::Operation(operation) => match operation.as_mut() {
            Operation::Binary(binary) => vec![&mut binary.lhs_expr, &mut binary.rhs_expr],
            Operation::Unary(unary) => vec![&mut unary.expr],
        },
        Expression::ForExpr(for_expr) => {
            let for_expr = for_expr.as_mut();
            let mut children = vec![&mut for_expr.collection_expr];
            children.extend(for_expr.key_expr.as_mut());
            children.push(&mut for_expr.value_expr);
            children.extend(for_expr.cond_expr.as_mut());
            children
        }
        _ => vec![],
    }
}

fn walk_template(template: &mut Template, visitor: &mut dyn VisitMut<Traversal>) {
    for element in template.elements_mut() {
        match element {
            Element::Literal(_) => {}
            Element::Interpolation(interpolation) => {
                walk_expression(&mut interpolation.expr, visitor);
            }
            Element::Directive(Directive::If(if_directive)) => {
                walk_expression(&mut if_directive.cond_expr, visitor);
                walk_template(&mut if_directive.true_template, visitor);
                if let Some(false_template) = if_directive.false_template.as_mut() {
                    walk_template(false_template, visitor);
                }
            }
            Element::Directive(Directive::For(for_directive)) => {
                walk_expression(&mut for_directive.collection_expr, visitor);
                walk_template(&mut for_directive.template, visitor);
            }
        }
    }
}

/// A traversal without operators is just its expression
fn into_expression(traversal: Traversal) -> Expression {
    if traversal.operators.is_empty() {
        traversal.expr
    } else {
        Expression::Traversal(Box::new(traversal))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(expression: &str) -> Expression {
        let expression: hcl_edit::expr::Expression = expression.parse().unwrap();
        expression.into()
    }

    fn collect_roots(expression: &str) -> Vec<String> {
        let mut roots = vec![];
        let mut visitor = |traversal: &mut Traversal| {
            if let Expression::Variable(var) = &traversal.expr {
                roots.push(var.as_str().to_owned());
            }
        };

        walk_expression(&mut parse(expression), &mut visitor);
        roots
    }

    #[test]
    fn finds_nested_references() {
        assert_eq!(
            collect_roots(r#"var.a ? [local.b] : { key = module.c.out }"#),
            vec!["var", "local", "module"]
        );
        assert_eq!(collect_roots(r#"var.list[local.index]"#), vec!["var", "local"]);
        assert_eq!(collect_roots(r#""${var.prefix}-suffix""#), vec!["var"]);
        assert_eq!(
            collect_roots(r#"[for item in var.items : item if local.enabled]"#),
            vec!["var", "item", "local"]
        );
    }

    #[test]
    fn skips_function_arguments() {
        assert!(collect_roots(r#"lower(var.name)"#).is_empty());
    }

    #[test]
    fn substituted_variable_replaces_expression() {
        let mut expression = parse("name");
        let mut visitor = |traversal: &mut Traversal| {
            traversal.expr = Expression::String("replaced".to_owned());
        };

        walk_expression(&mut expression, &mut visitor);
        assert_eq!(expression, Expression::String("replaced".to_owned()));
    }
}
