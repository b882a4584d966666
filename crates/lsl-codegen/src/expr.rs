// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression rendering.

use lsl_ast::{BinaryOp, LslType, PrefixOp};
use lsl_validate::{Binding, CallTarget, ExpressionKind, NodeId, SyntaxTree};

use crate::generator::{shape, CSharpGenerator};
use crate::host::{self, OperatorStub};
use crate::CodegenResult;

/// Where an expression appears. Decides boxing and parenthesization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    /// The whole expression of a statement.
    Statement,
    Value,
    /// Direct argument of a natively typed library call.
    NativeArgument,
    /// Component of a vector or rotation literal.
    Component,
}

impl Position {
    fn bare_numbers(self) -> bool {
        matches!(self, Position::NativeArgument | Position::Component)
    }
}

fn parens(text: String, pos: Position) -> String {
    if pos == Position::Statement {
        text
    } else {
        format!("({text})")
    }
}

impl CSharpGenerator {
    /// Render an expression used as a statement. Forms the host does not
    /// accept as statements go through `UTILITIES.ForceStatement`.
    pub(crate) fn expr_statement(&mut self, tree: &SyntaxTree, id: NodeId) -> CodegenResult<String> {
        let expr = tree.expr(id).ok_or_else(|| shape(id, "an expression"))?;
        let standalone = match &expr.kind {
            ExpressionKind::Call { .. } | ExpressionKind::Postfix { .. } => true,
            ExpressionKind::Binary { op, .. } => op.is_assignment(),
            ExpressionKind::Prefix { op, .. } => op.modifies_operand(),
            _ => false,
        };
        if standalone {
            self.expr(tree, id, Position::Statement)
        } else {
            let text = self.expr(tree, id, Position::Value)?;
            Ok(format!("UTILITIES.ForceStatement({text})"))
        }
    }

    pub(crate) fn expr(&mut self, tree: &SyntaxTree, id: NodeId, pos: Position) -> CodegenResult<String> {
        let expr = tree.expr(id).ok_or_else(|| shape(id, "an expression"))?;

        Ok(match &expr.kind {
            ExpressionKind::Integer(text) => {
                let value = host::integer_literal(text);
                if pos.bare_numbers() {
                    value
                } else {
                    format!("new LSL_Types.LSLInteger({value})")
                }
            }
            ExpressionKind::Hex(text) => {
                format!("new LSL_Types.LSLInteger({})", host::hex_literal(text))
            }
            ExpressionKind::Float(text) => {
                let value = host::float_literal(text);
                if pos.bare_numbers() {
                    value
                } else {
                    format!("new LSL_Types.LSLFloat({value})")
                }
            }
            ExpressionKind::String(text) => {
                if pos == Position::NativeArgument {
                    text.clone()
                } else {
                    format!("new LSL_Types.LSLString({text})")
                }
            }
            ExpressionKind::Vector { x, y, z } => {
                let parts = self.components(tree, &[*x, *y, *z])?;
                format!("(new LSL_Types.Vector3({parts}))")
            }
            ExpressionKind::Rotation { x, y, z, s } => {
                let parts = self.components(tree, &[*x, *y, *z, *s])?;
                format!("(new LSL_Types.Quaternion({parts}))")
            }
            ExpressionKind::List(items) => {
                if items.is_empty() {
                    "(new LSL_Types.list())".to_string()
                } else {
                    let mut parts = Vec::with_capacity(items.len());
                    for &item in items {
                        parts.push(self.expr(tree, item, Position::Value)?);
                    }
                    format!("(new LSL_Types.list({}))", parts.join(", "))
                }
            }
            ExpressionKind::Variable { name, binding } => self.variable(tree, name, binding, expr.ty)?,
            ExpressionKind::Component { object, component } => {
                let object = self.expr(tree, *object, Position::Value)?;
                format!("{object}.{}", component.name())
            }
            ExpressionKind::Call { name, args, target } => self.call(tree, name, args, target, expr.ty)?,
            ExpressionKind::Binary { op, left, right } => {
                self.binary(tree, *op, *left, *right, expr.ty, pos)?
            }
            ExpressionKind::Prefix { op, operand } => self.prefix(tree, *op, *operand, pos)?,
            ExpressionKind::Postfix { op, operand } => {
                let dead = is_dead_component(tree, *operand);
                let operand = self.expr(tree, *operand, Position::Value)?;
                if dead {
                    read_only(operand, pos)
                } else {
                    parens(format!("{operand}{}", op.symbol()), pos)
                }
            }
            ExpressionKind::Cast { ty, operand } => {
                let from = tree.expr_type(*operand);
                let inner = self.expr(tree, *operand, Position::Value)?;
                if from == *ty || (from.is_string_like() && ty.is_string_like()) {
                    inner
                } else {
                    format!("({})({inner})", host::host_type(*ty))
                }
            }
            ExpressionKind::Paren(inner) => {
                let inner = self.expr(tree, *inner, Position::Value)?;
                format!("({inner})")
            }
        })
    }

    fn components(&mut self, tree: &SyntaxTree, ids: &[NodeId]) -> CodegenResult<String> {
        let mut parts = Vec::with_capacity(ids.len());
        for &id in ids {
            parts.push(self.expr(tree, id, Position::Component)?);
        }
        Ok(parts.join(", "))
    }

    fn variable(
        &mut self,
        tree: &SyntaxTree,
        name: &str,
        binding: &Binding,
        ty: LslType,
    ) -> CodegenResult<String> {
        Ok(match binding {
            Binding::Global(_) if self.in_globals_container => {
                format!("this.{}{name}", host::GLOBAL_PREFIX)
            }
            Binding::Global(_) => {
                format!("this.{}.{}{name}", host::GLOBALS_FIELD, host::GLOBAL_PREFIX)
            }
            Binding::Local(decl) => {
                if tree.is_dead_declaration(*decl) {
                    host::dead_variable_default(ty)?.to_string()
                } else {
                    let var = tree
                        .var_decl(*decl)
                        .ok_or_else(|| shape(*decl, "a local declaration"))?;
                    format!("{}{}_{name}", host::LOCAL_PREFIX, var.declared_in_scope)
                }
            }
            Binding::Param(_) => format!("{}{name}", host::PARAM_PREFIX),
            Binding::LibraryConstant(constant) => {
                if constant.expand {
                    host::expanded_constant(constant)?
                } else {
                    constant.name.clone()
                }
            }
        })
    }

    fn call(
        &mut self,
        tree: &SyntaxTree,
        name: &str,
        args: &[NodeId],
        target: &CallTarget,
        ty: LslType,
    ) -> CodegenResult<String> {
        match target {
            CallTarget::User(_) => {
                let mut parts = Vec::with_capacity(args.len());
                for &arg in args {
                    let text = self.expr(tree, arg, Position::Value)?;
                    if tree.expr_type(arg) == LslType::List && !is_bare_variable(tree, arg) {
                        parts.push(format!("UTILITIES.CopyList({text})"));
                    } else {
                        parts.push(text);
                    }
                }
                Ok(format!("{}{name}({})", host::FUNCTION_PREFIX, parts.join(", ")))
            }
            CallTarget::Library { mod_invoke: true, .. } => {
                let mut parts = vec![format!("\"{name}\"")];
                for &arg in args {
                    parts.push(self.expr(tree, arg, Position::Value)?);
                }
                Ok(format!(
                    "this.{}({})",
                    host::mod_invoke_method(ty),
                    parts.join(", ")
                ))
            }
            CallTarget::Library { .. } => {
                let mut parts = Vec::with_capacity(args.len());
                for &arg in args {
                    parts.push(self.expr(tree, arg, Position::NativeArgument)?);
                }
                Ok(format!("this.{name}({})", parts.join(", ")))
            }
        }
    }

    fn binary(
        &mut self,
        tree: &SyntaxTree,
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
        ty: LslType,
        pos: Position,
    ) -> CodegenResult<String> {
        let left_ty = tree.expr_type(left);
        let right_ty = tree.expr_type(right);

        // Right operand first: LSL evaluates binary operands right to left.
        if op.is_logical() {
            let r = self.expr(tree, right, Position::Value)?;
            let l = self.expr(tree, left, Position::Value)?;
            let symbol = if op == BinaryOp::And { "&" } else { "|" };
            return Ok(format!("(((bool)({r})){symbol}((bool)({l})))"));
        }

        if op == BinaryOp::MulAssign && left_ty == LslType::Integer && right_ty == LslType::Float {
            let l = self.expr(tree, left, Position::Value)?;
            let r = self.expr(tree, right, Position::Value)?;
            return Ok(parens(
                format!("{l}=new LSL_Types.LSLInteger(System.Math.Round((double){l} * {r}))"),
                pos,
            ));
        }

        if op.is_assignment() && is_dead_component(tree, left) {
            let r = self.expr(tree, right, Position::Value)?;
            let value = match op.base_op() {
                Some(base) if pos != Position::Statement => {
                    let stub = OperatorStub {
                        left: left_ty,
                        op: base,
                        right: right_ty,
                        result: ty,
                    };
                    self.stubs.insert(stub);
                    let l = self.expr(tree, left, Position::Value)?;
                    format!("{}({r}, {l})", stub.name())
                }
                _ => r,
            };
            return Ok(read_only(value, pos));
        }

        if op.is_assignment() {
            let l = self.expr(tree, left, Position::Value)?;
            let r = self.expr(tree, right, Position::Value)?;
            return Ok(parens(format!("{l}{}{r}", op.symbol()), pos));
        }

        let stub = OperatorStub {
            left: left_ty,
            op,
            right: right_ty,
            result: ty,
        };
        self.stubs.insert(stub);
        let r = self.expr(tree, right, Position::Value)?;
        let l = self.expr(tree, left, Position::Value)?;
        Ok(format!("{}({r}, {l})", stub.name()))
    }

    fn prefix(
        &mut self,
        tree: &SyntaxTree,
        op: PrefixOp,
        operand: NodeId,
        pos: Position,
    ) -> CodegenResult<String> {
        let operand_ty = tree.expr_type(operand);
        let dead = is_dead_component(tree, operand);
        let inner = self.expr(tree, operand, Position::Value)?;
        Ok(match op {
            PrefixOp::Increment | PrefixOp::Decrement if dead => {
                let step = if op == PrefixOp::Increment { '+' } else { '-' };
                read_only(format!("{inner}{step}1"), pos)
            }
            PrefixOp::Negate | PrefixOp::Positive
                if operand_ty == LslType::Vector
                    || (op == PrefixOp::Negate && operand_ty == LslType::Rotation) =>
            {
                format!("UTILITIES.Negate({inner})")
            }
            PrefixOp::Increment | PrefixOp::Decrement => parens(format!("{}{inner}", op.symbol()), pos),
            PrefixOp::Positive => format!("({inner})"),
            PrefixOp::Negate | PrefixOp::Not | PrefixOp::BitNot => {
                format!("({}({inner}))", op.symbol())
            }
        })
    }
}

/// Component access on a local whose declaration never executes. It renders
/// as a component of a `UTILITIES` default, which cannot be written.
fn is_dead_component(tree: &SyntaxTree, id: NodeId) -> bool {
    let mut object = match tree.expr(id).map(|e| &e.kind) {
        Some(ExpressionKind::Component { object, .. }) => *object,
        _ => return false,
    };
    loop {
        match tree.expr(object).map(|e| &e.kind) {
            Some(ExpressionKind::Paren(inner)) => object = *inner,
            Some(ExpressionKind::Variable {
                binding: Binding::Local(decl),
                ..
            }) => return tree.is_dead_declaration(*decl),
            _ => return false,
        }
    }
}

/// The value of a write that has nowhere to go.
fn read_only(value: String, pos: Position) -> String {
    if pos == Position::Statement {
        format!("UTILITIES.ForceStatement({value})")
    } else {
        format!("({value})")
    }
}

/// A plain variable reference, looking through parentheses.
fn is_bare_variable(tree: &SyntaxTree, mut id: NodeId) -> bool {
    loop {
        match tree.expr(id).map(|e| &e.kind) {
            Some(ExpressionKind::Paren(inner)) => id = *inner,
            Some(ExpressionKind::Variable { .. }) => return true,
            _ => return false,
        }
    }
}
