// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression resolution and typing.

use lsl_ast::{BinaryOp, Component, Expr, ExprKind, LslType, PostfixOp, PrefixOp, Span};
use lsl_library::LibraryFunction;

use crate::error::{ValidationError, ValidationErrorKind, WarningKind};
use crate::operators;
use crate::tree::{Binding, CallTarget, Expression, ExpressionKind, NodeId, NodeKind};
use crate::validator::Validator;

impl Validator<'_> {
    /// Resolve and type an expression, returning its node.
    pub(crate) fn build_expr(&mut self, expr: &Expr) -> NodeId {
        let span = expr.span;
        match &expr.kind {
            ExprKind::Integer(text) => self.literal(ExpressionKind::Integer(text.clone()), LslType::Integer, span),
            ExprKind::Hex(text) => self.literal(ExpressionKind::Hex(text.clone()), LslType::Integer, span),
            ExprKind::Float(text) => self.literal(ExpressionKind::Float(text.clone()), LslType::Float, span),
            ExprKind::String(text) => {
                let (normalized, errors) = normalize_string(text, span);
                self.finish_expr(ExpressionKind::String(normalized), LslType::String, true, span, errors)
            }
            ExprKind::Vector { x, y, z } => {
                let [x, y, z] = [x, y, z].map(|c| self.build_expr(c));
                let errors = self.check_components("vector", &[x, y, z]);
                let constant = self.all_constant(&[x, y, z]);
                self.finish_expr(ExpressionKind::Vector { x, y, z }, LslType::Vector, constant, span, errors)
            }
            ExprKind::Rotation { x, y, z, s } => {
                let [x, y, z, s] = [x, y, z, s].map(|c| self.build_expr(c));
                let errors = self.check_components("rotation", &[x, y, z, s]);
                let constant = self.all_constant(&[x, y, z, s]);
                self.finish_expr(
                    ExpressionKind::Rotation { x, y, z, s },
                    LslType::Rotation,
                    constant,
                    span,
                    errors,
                )
            }
            ExprKind::List(items) => {
                let items: Vec<NodeId> = items.iter().map(|e| self.build_expr(e)).collect();
                let errors = items
                    .iter()
                    .filter(|&&id| !self.untyped(id))
                    .filter_map(|&id| {
                        let found = self.tree.expr_type(id);
                        matches!(found, LslType::List | LslType::Void).then(|| {
                            ValidationError::new(ValidationErrorKind::InvalidListElement { found }, self.tree.span(id))
                        })
                    })
                    .collect();
                let constant = self.all_constant(&items);
                self.finish_expr(ExpressionKind::List(items), LslType::List, constant, span, errors)
            }
            ExprKind::Ident(name) => self.build_variable(name, span),
            ExprKind::Component { object, component } => self.build_component(object, *component, span),
            ExprKind::Call { name, args } => self.build_call(name, args, span),
            ExprKind::Binary { op, left, right } => self.build_binary(*op, left, right, span),
            ExprKind::Prefix { op, operand } => self.build_prefix(*op, operand, span),
            ExprKind::Postfix { op, operand } => self.build_postfix(*op, operand, span),
            ExprKind::Cast { ty, operand } => self.build_cast(*ty, operand, span),
            ExprKind::Paren(inner) => {
                let inner = self.build_expr(inner);
                let mut errors = Vec::new();
                if self.in_static_context {
                    errors.push(ValidationError::static_context("parentheses", span));
                }
                let ty = self.tree.expr_type(inner);
                let constant = self.is_constant(inner);
                self.finish_expr(ExpressionKind::Paren(inner), ty, constant, span, errors)
            }
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn literal(&mut self, kind: ExpressionKind, ty: LslType, span: Span) -> NodeId {
        self.finish_expr(kind, ty, true, span, Vec::new())
    }

    /// Allocate an expression node and report its errors against it.
    fn finish_expr(
        &mut self,
        kind: ExpressionKind,
        ty: LslType,
        constant: bool,
        span: Span,
        errors: Vec<ValidationError>,
    ) -> NodeId {
        let id = self.tree.alloc(NodeKind::Expr(Expression { kind, ty, constant }), span);
        if !errors.is_empty() {
            self.tree.mark_error(id);
        }
        for error in errors {
            self.error(error);
        }
        id
    }

    /// An erroneous expression whose type is unknown. Checks that depend on it
    /// are skipped so one mistake does not cascade.
    pub(crate) fn untyped(&self, id: NodeId) -> bool {
        self.tree.has_errors(id) && self.tree.expr_type(id).is_void()
    }

    fn is_constant(&self, id: NodeId) -> bool {
        self.tree.expr(id).is_some_and(|e| e.constant)
    }

    fn all_constant(&self, ids: &[NodeId]) -> bool {
        ids.iter().all(|&id| self.is_constant(id))
    }

    fn check_components(&self, literal: &'static str, components: &[NodeId]) -> Vec<ValidationError> {
        components
            .iter()
            .filter(|&&id| !self.untyped(id))
            .filter_map(|&id| {
                let found = self.tree.expr_type(id);
                (!found.is_numeric()).then(|| {
                    ValidationError::new(
                        ValidationErrorKind::InvalidVectorComponent { literal, found },
                        self.tree.span(id),
                    )
                })
            })
            .collect()
    }

    /// Record `reference` on whatever `binding` points at.
    fn add_reference(&mut self, binding: &Binding, reference: NodeId) {
        let decl = match binding {
            Binding::Global(id) | Binding::Local(id) | Binding::Param(id) => *id,
            Binding::LibraryConstant(_) => return,
        };
        if let Some(var) = self.tree.var_decl_mut(decl) {
            var.references.push(reference);
        }
    }

    /// Why `target` cannot be written to, if it cannot.
    fn assignment_problem(&self, target: NodeId) -> Option<ValidationErrorKind> {
        let expr = self.tree.expr(target)?;
        let variable = match &expr.kind {
            ExpressionKind::Variable { .. } => expr,
            ExpressionKind::Component { object, .. } => match self.tree.expr(*object) {
                Some(inner) if matches!(inner.kind, ExpressionKind::Variable { .. }) => inner,
                _ => return Some(ValidationErrorKind::NotAssignable),
            },
            _ => return Some(ValidationErrorKind::NotAssignable),
        };
        match &variable.kind {
            ExpressionKind::Variable {
                name,
                binding: Binding::LibraryConstant(_),
            } => Some(ValidationErrorKind::ModifiedLibraryConstant { name: name.clone() }),
            _ => None,
        }
    }

    // =========================================================================
    // Names
    // =========================================================================

    fn build_variable(&mut self, name: &str, span: Span) -> NodeId {
        let binding = if let Some(id) = self.scopes.lookup(name) {
            Some(Binding::Local(id))
        } else if let Some(id) = self.param(name) {
            Some(Binding::Param(id))
        } else if let Some(&id) = self.globals.get(name) {
            Some(Binding::Global(id))
        } else {
            self.library.constant(name).map(|c| Binding::LibraryConstant(c.clone()))
        };

        let Some(binding) = binding else {
            self.error(ValidationError::undefined_variable(name, span));
            return self.tree.alloc_error(span);
        };

        let (ty, constant) = match &binding {
            Binding::LibraryConstant(c) => {
                if c.deprecated {
                    self.warning(WarningKind::DeprecatedConstant { name: name.to_string() }, span);
                }
                (c.ty, true)
            }
            Binding::Global(id) | Binding::Local(id) | Binding::Param(id) => {
                (self.tree.var_decl(*id).map(|v| v.ty).unwrap_or(LslType::Void), false)
            }
        };

        let id = self.tree.alloc(
            NodeKind::Expr(Expression {
                kind: ExpressionKind::Variable {
                    name: name.to_string(),
                    binding: binding.clone(),
                },
                ty,
                constant,
            }),
            span,
        );
        self.add_reference(&binding, id);
        id
    }

    fn build_component(&mut self, object: &Expr, component: Component, span: Span) -> NodeId {
        let object = self.build_expr(object);
        let mut errors = Vec::new();
        if !self.untyped(object) {
            let ty = self.tree.expr_type(object);
            let ok = match component {
                Component::S => ty == LslType::Rotation,
                Component::X | Component::Y | Component::Z => matches!(ty, LslType::Vector | LslType::Rotation),
            };
            if !ok {
                let component = component.name().chars().next().unwrap_or('?');
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidComponentAccess { component, ty },
                    span,
                ));
            }
        }
        let constant = self.is_constant(object);
        self.finish_expr(
            ExpressionKind::Component { object, component },
            LslType::Float,
            constant,
            span,
            errors,
        )
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn build_call(&mut self, name: &str, args: &[Expr], span: Span) -> NodeId {
        let args: Vec<NodeId> = args.iter().map(|a| self.build_expr(a)).collect();
        let mut errors = Vec::new();
        if self.in_static_context {
            errors.push(ValidationError::static_context("a function call", span));
        }

        let arg_types: Vec<LslType> = args.iter().map(|&a| self.tree.expr_type(a)).collect();
        let untyped_args: Vec<bool> = args.iter().map(|&a| self.untyped(a)).collect();

        let (target, return_type) = if let Some(&function) = self.functions.get(name) {
            let Some(decl) = self.tree.function(function) else {
                return self.tree.alloc_error(span);
            };
            let return_type = decl.return_type;
            let params: Vec<LslType> = decl
                .params
                .iter()
                .map(|&p| self.tree.var_decl(p).map(|v| v.ty).unwrap_or(LslType::Void))
                .collect();
            if params.len() != args.len() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ArgumentCountMismatch {
                        name: name.to_string(),
                        expected: params.len(),
                        found: args.len(),
                    },
                    span,
                ));
            } else {
                for (index, (&expected, (&found, &untyped))) in
                    params.iter().zip(arg_types.iter().zip(&untyped_args)).enumerate()
                {
                    if !untyped && !operators::assignable(expected, found) {
                        errors.push(ValidationError::new(
                            ValidationErrorKind::ArgumentTypeMismatch {
                                name: name.to_string(),
                                index: index + 1,
                                expected,
                                found,
                            },
                            self.tree.span(args[index]),
                        ));
                    }
                }
            }
            (CallTarget::User(function), return_type)
        } else {
            let library = self.library;
            let overloads = library.function_overloads(name);
            let selected = match overloads {
                [] => {
                    self.error(ValidationError::undefined_function(name, span));
                    None
                }
                [only] => match check_overload(only, &arg_types, &untyped_args) {
                    Ok(()) => Some(only),
                    Err(kind) => {
                        let kind = match kind {
                            OverloadMismatch::Count => ValidationErrorKind::ArgumentCountMismatch {
                                name: name.to_string(),
                                expected: only.fixed_param_count(),
                                found: args.len(),
                            },
                            OverloadMismatch::Type { index, expected } => ValidationErrorKind::ArgumentTypeMismatch {
                                name: name.to_string(),
                                index: index + 1,
                                expected,
                                found: arg_types[index],
                            },
                        };
                        errors.push(ValidationError::new(kind, span));
                        Some(only)
                    }
                },
                many => match select_overload(many, &arg_types, &untyped_args) {
                    Ok(function) => Some(function),
                    // An erroneous argument can make several overloads fit.
                    Err(Selection::Ambiguous) if untyped_args.contains(&true) => None,
                    Err(Selection::Ambiguous) => {
                        self.error(ValidationError::new(
                            ValidationErrorKind::AmbiguousOverload { name: name.to_string() },
                            span,
                        ));
                        None
                    }
                    Err(Selection::None) => {
                        self.error(ValidationError::new(
                            ValidationErrorKind::NoMatchingOverload {
                                name: name.to_string(),
                                args: arg_types.clone(),
                            },
                            span,
                        ));
                        None
                    }
                },
            };

            let Some(function) = selected else {
                return self.tree.alloc_error(span);
            };
            if function.deprecated {
                self.warning(WarningKind::DeprecatedFunction { name: name.to_string() }, span);
            }
            (
                CallTarget::Library {
                    mod_invoke: function.mod_invoke,
                    params: function.params.iter().map(|p| p.ty).collect(),
                },
                function.return_type,
            )
        };

        let user = match target {
            CallTarget::User(f) => Some(f),
            CallTarget::Library { .. } => None,
        };
        let id = self.finish_expr(
            ExpressionKind::Call {
                name: name.to_string(),
                args,
                target,
            },
            return_type,
            false,
            span,
            errors,
        );
        if let Some(function) = user.and_then(|f| self.tree.function_mut(f)) {
            function.references.push(id);
        }
        id
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn build_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, span: Span) -> NodeId {
        let left = self.build_expr(left);
        let right = self.build_expr(right);
        let mut errors = Vec::new();
        if self.in_static_context {
            errors.push(ValidationError::static_context("an operator", span));
        }
        if op.is_assignment() {
            if let Some(kind) = self.assignment_problem(left) {
                if !self.untyped(left) {
                    errors.push(ValidationError::new(kind, self.tree.span(left)));
                }
            }
        }

        let (lt, rt) = (self.tree.expr_type(left), self.tree.expr_type(right));
        let ty = if self.untyped(left) || self.untyped(right) {
            LslType::Void
        } else {
            match operators::binary_result(op, lt, rt) {
                Some(ty) => ty,
                None => {
                    errors.push(ValidationError::invalid_binary(op, lt, rt, span));
                    LslType::Void
                }
            }
        };
        let constant = !op.is_assignment() && self.is_constant(left) && self.is_constant(right);
        self.finish_expr(ExpressionKind::Binary { op, left, right }, ty, constant, span, errors)
    }

    fn build_prefix(&mut self, op: PrefixOp, operand: &Expr, span: Span) -> NodeId {
        let operand = self.build_expr(operand);
        let mut errors = Vec::new();
        if self.in_static_context && op != PrefixOp::Negate {
            errors.push(ValidationError::static_context("an operator", span));
        }
        if op.modifies_operand() {
            if let Some(kind) = self.assignment_problem(operand) {
                if !self.untyped(operand) {
                    errors.push(ValidationError::new(kind, self.tree.span(operand)));
                }
            }
        }
        let found = self.tree.expr_type(operand);
        let ty = if self.untyped(operand) {
            LslType::Void
        } else {
            match operators::prefix_result(op, found) {
                Some(ty) => ty,
                None => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidPrefix {
                            op: op.symbol(),
                            operand: found,
                        },
                        span,
                    ));
                    LslType::Void
                }
            }
        };
        let constant = !op.modifies_operand() && self.is_constant(operand);
        self.finish_expr(ExpressionKind::Prefix { op, operand }, ty, constant, span, errors)
    }

    fn build_postfix(&mut self, op: PostfixOp, operand: &Expr, span: Span) -> NodeId {
        let operand = self.build_expr(operand);
        let mut errors = Vec::new();
        if self.in_static_context {
            errors.push(ValidationError::static_context("an operator", span));
        }
        if let Some(kind) = self.assignment_problem(operand) {
            if !self.untyped(operand) {
                errors.push(ValidationError::new(kind, self.tree.span(operand)));
            }
        }
        let found = self.tree.expr_type(operand);
        let ty = if self.untyped(operand) {
            LslType::Void
        } else {
            match operators::postfix_result(op, found) {
                Some(ty) => ty,
                None => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidPostfix {
                            op: op.symbol(),
                            operand: found,
                        },
                        span,
                    ));
                    LslType::Void
                }
            }
        };
        self.finish_expr(ExpressionKind::Postfix { op, operand }, ty, false, span, errors)
    }

    fn build_cast(&mut self, ty: LslType, operand: &Expr, span: Span) -> NodeId {
        let operand = self.build_expr(operand);
        let mut errors = Vec::new();
        if self.in_static_context {
            errors.push(ValidationError::static_context("a cast", span));
        }
        if !self.untyped(operand) {
            let from = self.tree.expr_type(operand);
            if !operators::cast_valid(ty, from) {
                errors.push(ValidationError::new(ValidationErrorKind::InvalidCast { from, to: ty }, span));
            } else if from == ty {
                self.warning(WarningKind::RedundantCast { ty }, span);
            }
        }
        let constant = self.is_constant(operand);
        self.finish_expr(ExpressionKind::Cast { ty, operand }, ty, constant, span, errors)
    }
}

// =========================================================================
// Overload selection
// =========================================================================

#[derive(Debug, PartialEq)]
enum OverloadMismatch {
    Count,
    /// Zero-based argument index.
    Type { index: usize, expected: LslType },
}

#[derive(Debug, PartialEq)]
enum Selection {
    None,
    Ambiguous,
}

/// Check call arguments against one library signature. A variadic `Void`
/// parameter accepts any value.
fn check_overload(function: &LibraryFunction, args: &[LslType], untyped: &[bool]) -> Result<(), OverloadMismatch> {
    let fixed = function.fixed_param_count();
    let count_ok = if function.is_variadic() {
        args.len() >= fixed
    } else {
        args.len() == fixed
    };
    if !count_ok {
        return Err(OverloadMismatch::Count);
    }
    for (index, &found) in args.iter().enumerate() {
        if untyped.get(index).copied().unwrap_or(false) {
            continue;
        }
        let Some(expected) = function.param_type_at(index) else {
            return Err(OverloadMismatch::Count);
        };
        let variadic = index >= fixed && function.is_variadic();
        if variadic && expected.is_void() {
            if found.is_void() {
                return Err(OverloadMismatch::Type { index, expected });
            }
            continue;
        }
        if !operators::assignable(expected, found) {
            return Err(OverloadMismatch::Type { index, expected });
        }
    }
    Ok(())
}

fn exact_match(function: &LibraryFunction, args: &[LslType]) -> bool {
    args.iter()
        .enumerate()
        .all(|(i, &found)| function.param_type_at(i).is_some_and(|t| t == found || t.is_void()))
}

/// Pick one overload for the given argument types. Exact type matches win over
/// matches that need a conversion.
fn select_overload<'f>(
    overloads: &'f [LibraryFunction],
    args: &[LslType],
    untyped: &[bool],
) -> Result<&'f LibraryFunction, Selection> {
    let candidates: Vec<&LibraryFunction> = overloads
        .iter()
        .filter(|f| check_overload(f, args, untyped).is_ok())
        .collect();
    match candidates.as_slice() {
        [] => Err(Selection::None),
        [one] => Ok(*one),
        many => {
            let exact: Vec<&&LibraryFunction> = many.iter().filter(|f| exact_match(f, args)).collect();
            match exact.as_slice() {
                [one] => Ok(**one),
                _ => Err(Selection::Ambiguous),
            }
        }
    }
}

// =========================================================================
// String literals
// =========================================================================

/// Validate escapes in a quoted string literal and replace raw control
/// characters with escapes. Returns the re-quoted text.
pub fn normalize_string(quoted: &str, span: Span) -> (String, Vec<ValidationError>) {
    let inner = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(quoted);
    let mut out = String::with_capacity(inner.len() + 2);
    let mut errors = Vec::new();
    out.push('"');
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(e @ ('n' | 't' | '"' | '\\')) => {
                    out.push('\\');
                    out.push(e);
                }
                Some(e) => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidStringEscape { escape: e },
                        span,
                    ));
                    out.push('\\');
                    out.push(e);
                }
                None => out.push_str("\\\\"),
            },
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out.push('"');
    (out, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsl_library::LibraryParam;

    #[test]
    fn strings_are_normalized() {
        let (s, errors) = normalize_string("\"a\tb\r\nc\\\"d\"", Span::default());
        assert!(errors.is_empty());
        assert_eq!(s, "\"a\\tb\\nc\\\"d\"");
    }

    #[test]
    fn bad_escape_is_reported() {
        let (_, errors) = normalize_string("\"x\\q\"", Span::new(0, 5));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidStringEscape { escape: 'q' });
    }

    fn func(params: Vec<LibraryParam>) -> LibraryFunction {
        LibraryFunction::new("f", LslType::Void, params)
    }

    #[test]
    fn void_variadic_accepts_anything() {
        let f = func(vec![
            LibraryParam::new("a", LslType::Integer),
            LibraryParam::variadic("rest", LslType::Void),
        ]);
        let args = [LslType::Integer, LslType::String, LslType::List];
        assert_eq!(check_overload(&f, &args, &[false; 3]), Ok(()));
        assert_eq!(check_overload(&f, &[], &[]), Err(OverloadMismatch::Count));
    }

    #[test]
    fn typed_variadic_checks_each_extra_argument() {
        let f = func(vec![LibraryParam::variadic("xs", LslType::Float)]);
        assert_eq!(check_overload(&f, &[LslType::Integer, LslType::Float], &[false; 2]), Ok(()));
        assert_eq!(
            check_overload(&f, &[LslType::Float, LslType::String], &[false; 2]),
            Err(OverloadMismatch::Type {
                index: 1,
                expected: LslType::Float
            })
        );
    }

    #[test]
    fn exact_overload_wins() {
        let overloads = vec![
            func(vec![LibraryParam::new("a", LslType::Float)]),
            func(vec![LibraryParam::new("a", LslType::Integer)]),
        ];
        let picked = select_overload(&overloads, &[LslType::Integer], &[false]).unwrap();
        assert_eq!(picked.params[0].ty, LslType::Integer);
        assert_eq!(
            select_overload(&overloads, &[LslType::String], &[false]).unwrap_err(),
            Selection::None
        );
    }

    #[test]
    fn inexact_tie_is_ambiguous() {
        let overloads = vec![
            func(vec![LibraryParam::new("a", LslType::String)]),
            func(vec![LibraryParam::new("a", LslType::Key)]),
            func(vec![LibraryParam::new("a", LslType::Integer)]),
        ];
        assert!(select_overload(&overloads, &[LslType::String], &[false]).is_ok());
        let overloads = &overloads[..2];
        assert!(select_overload(overloads, &[LslType::Integer], &[false]).is_err());
        let more = vec![
            func(vec![LibraryParam::new("a", LslType::Float), LibraryParam::new("b", LslType::Integer)]),
            func(vec![LibraryParam::new("a", LslType::Integer), LibraryParam::new("b", LslType::Float)]),
        ];
        assert_eq!(
            select_overload(&more, &[LslType::Integer, LslType::Integer], &[false; 2]).unwrap_err(),
            Selection::Ambiguous
        );
    }
}
