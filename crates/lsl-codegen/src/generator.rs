// SPDX-License-Identifier: (MIT OR Apache-2.0)

use std::io::Write;

use indexmap::IndexSet;
use lsl_ast::LslType;
use lsl_validate::{
    NodeId, ScopeKind, ScriptNode, StatementKind, SyntaxTree, ValidatedScript,
};

use crate::expr::Position;
use crate::host::{self, OperatorStub};
use crate::{CodegenError, CodegenResult, CompilerSettings};

/// Writes validated scripts as C#.
///
/// One generator can be reused for any number of scripts; every run starts
/// from a clean slate.
pub struct CSharpGenerator {
    settings: CompilerSettings,
    output: String,
    indent: usize,
    /// Generic binary operations used so far, in first-use order.
    pub(crate) stubs: IndexSet<OperatorStub>,
    /// Globals are addressed through their container except inside it.
    pub(crate) in_globals_container: bool,
}

impl CSharpGenerator {
    pub fn new(settings: CompilerSettings) -> Self {
        Self {
            settings,
            output: String::new(),
            indent: 0,
            stubs: IndexSet::new(),
            in_globals_container: false,
        }
    }

    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    /// Clear all per-script state.
    pub fn reset(&mut self) {
        self.output.clear();
        self.indent = 0;
        self.stubs.clear();
        self.in_globals_container = false;
    }

    /// Generate C# for a script that validated without errors.
    pub fn generate(&mut self, script: &ValidatedScript) -> CodegenResult<String> {
        if script.has_errors {
            return Err(CodegenError::InvalidInput(
                "script has validation errors".to_string(),
            ));
        }
        self.reset();
        let root = script
            .script()
            .ok_or_else(|| shape(script.root, "a script"))?;
        let result = self.emit_script(&script.tree, root);
        let text = std::mem::take(&mut self.output);
        let stubs = self.stubs.len();
        self.reset();
        result?;
        tracing::debug!(bytes = text.len(), stubs, "generated C#");
        Ok(text)
    }

    /// Generate into a caller-supplied sink.
    pub fn write_to(&mut self, script: &ValidatedScript, sink: &mut dyn Write) -> CodegenResult<()> {
        let text = self.generate(script)?;
        sink.write_all(text.as_bytes())?;
        sink.flush()?;
        Ok(())
    }

    // --- Output helpers ---

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.output.push('\t');
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn blank_line(&mut self) {
        if self.output.is_empty() || self.output.ends_with("\n\n") {
            return;
        }
        if !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        self.output.push('\n');
    }

    fn lines(&mut self, text: &str) {
        for l in text.lines() {
            self.line(l);
        }
    }

    fn banner(&mut self, title: &str) {
        let middle = format!("//== {title} ==");
        let rule = format!("//{}", "=".repeat(middle.len() - 2));
        self.line(&rule);
        self.line(&middle);
        self.line(&rule);
        self.blank_line();
    }

    fn open_brace(&mut self) {
        self.line("{");
        self.indent += 1;
    }

    fn close_brace(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.line("}");
    }

    // --- Compilation unit ---

    fn emit_script(&mut self, tree: &SyntaxTree, script: &ScriptNode) -> CodegenResult<()> {
        if let Some(header) = self.settings.script_header.clone().filter(|h| !h.trim().is_empty()) {
            self.lines(&header);
            self.blank_line();
        }

        let wrap = self.settings.generate_class;
        let namespace = self.settings.namespace.clone();
        if wrap {
            let imports = self.settings.imports.clone();
            for import in &imports {
                self.line(&format!("using {import};"));
            }
            self.blank_line();
            if let Some(ns) = &namespace {
                self.line(&format!("namespace {ns}"));
                self.open_brace();
            }
            let decl = match &self.settings.base_type {
                Some(base) => format!("public class {} : {}", self.settings.class_name, base),
                None => format!("public class {}", self.settings.class_name),
            };
            self.line(&decl);
            self.open_brace();
        }

        self.lines(host::UTILITY_CLASS);
        self.blank_line();

        if wrap {
            self.emit_class_constructor();
        }
        self.emit_globals(tree, script)?;
        self.emit_functions(tree, script)?;

        if !script.states.is_empty() {
            self.banner("User Defined State Event Handlers");
            for &state in &script.states {
                self.emit_state(tree, state)?;
                self.blank_line();
            }
        }

        self.banner("Default State Event Handlers");
        let default_state = script
            .default_state
            .ok_or_else(|| CodegenError::Internal("script has no default state".into()))?;
        self.emit_state(tree, default_state)?;
        self.blank_line();

        self.emit_stubs();

        if wrap {
            self.close_brace();
            if namespace.is_some() {
                self.close_brace();
            }
        }
        Ok(())
    }

    fn emit_class_constructor(&mut self) {
        let signature = format!(
            "public {}{}",
            self.settings.class_name, self.settings.constructor_signature
        );
        self.line(&signature);
        self.open_brace();
        if let Some(body) = self.settings.constructor_body.clone() {
            self.lines(&body);
        }
        self.close_brace();
        self.blank_line();
    }

    fn emit_globals(&mut self, tree: &SyntaxTree, script: &ScriptNode) -> CodegenResult<()> {
        let mut used = Vec::new();
        for &id in &script.globals {
            let var = tree.var_decl(id).ok_or_else(|| shape(id, "a global variable"))?;
            if !var.references.is_empty() {
                used.push(id);
            }
        }
        if used.is_empty() {
            return Ok(());
        }

        self.banner("Global Variable Container");
        self.line(&format!("private class {}", host::GLOBALS_CLASS));
        self.open_brace();
        for &id in &used {
            let var = tree.var_decl(id).ok_or_else(|| shape(id, "a global variable"))?;
            self.line(&format!(
                "public {} {}{};",
                host::host_type(var.ty),
                host::GLOBAL_PREFIX,
                var.name
            ));
        }
        self.line(&format!("public {}()", host::GLOBALS_CLASS));
        self.open_brace();
        self.in_globals_container = true;
        for &id in &used {
            let var = tree.var_decl(id).ok_or_else(|| shape(id, "a global variable"))?;
            let value = match var.init {
                Some(init) => self.expr(tree, init, Position::Value)?,
                None => host::default_initializer(var.ty)?.to_string(),
            };
            self.line(&format!("this.{}{} = {};", host::GLOBAL_PREFIX, var.name, value));
        }
        self.in_globals_container = false;
        self.close_brace();
        self.close_brace();
        self.blank_line();
        self.line(&format!(
            "private {} {} = new {}();",
            host::GLOBALS_CLASS,
            host::GLOBALS_FIELD,
            host::GLOBALS_CLASS
        ));
        self.blank_line();
        Ok(())
    }

    fn emit_functions(&mut self, tree: &SyntaxTree, script: &ScriptNode) -> CodegenResult<()> {
        let used: Vec<NodeId> = script
            .functions
            .iter()
            .copied()
            .filter(|&id| tree.function(id).is_some_and(|f| !f.references.is_empty()))
            .collect();
        if used.is_empty() {
            return Ok(());
        }

        self.banner("User Defined Functions");
        for id in used {
            let func = tree.function(id).ok_or_else(|| shape(id, "a function"))?;
            let params = self.param_list(tree, &func.params)?;
            self.line(&format!(
                "public {} {}{}({})",
                host::host_type(func.return_type),
                host::FUNCTION_PREFIX,
                func.name,
                params
            ));
            let body = func
                .body
                .ok_or_else(|| CodegenError::Internal(format!("function `{}` has no body", func.name)))?;
            self.emit_scope(tree, body)?;
            self.blank_line();
        }
        Ok(())
    }

    fn emit_state(&mut self, tree: &SyntaxTree, id: NodeId) -> CodegenResult<()> {
        let Some(lsl_validate::NodeKind::State(state)) = tree.kind(id) else {
            return Err(shape(id, "a state"));
        };
        for (i, &handler) in state.handlers.iter().enumerate() {
            let Some(lsl_validate::NodeKind::EventHandler(event)) = tree.kind(handler) else {
                return Err(shape(handler, "an event handler"));
            };
            if i > 0 {
                self.blank_line();
            }
            let params = self.param_list(tree, &event.params)?;
            self.line(&format!(
                "public void {}_event_{}({})",
                state.name, event.name, params
            ));
            self.emit_scope(tree, event.body)?;
        }
        Ok(())
    }

    fn param_list(&self, tree: &SyntaxTree, params: &[NodeId]) -> CodegenResult<String> {
        let mut out = Vec::with_capacity(params.len());
        for &p in params {
            let var = tree.var_decl(p).ok_or_else(|| shape(p, "a parameter"))?;
            out.push(format!(
                "{} {}{}",
                host::host_type(var.ty),
                host::PARAM_PREFIX,
                var.name
            ));
        }
        Ok(out.join(", "))
    }

    fn emit_stubs(&mut self) {
        if self.stubs.is_empty() {
            return;
        }
        self.banner("Binary Operator Stubs");
        let stubs: Vec<OperatorStub> = self.stubs.iter().copied().collect();
        for (i, stub) in stubs.iter().enumerate() {
            if i > 0 {
                self.blank_line();
            }
            self.line(&format!(
                "private {} {}({} right, {} left)",
                host::host_type(stub.result),
                stub.name(),
                host::host_type(stub.right),
                host::host_type(stub.left)
            ));
            self.open_brace();
            self.line(&format!("return left {} right;", stub.op.symbol()));
            self.close_brace();
        }
    }

    // --- Code scopes and statements ---

    fn emit_scope(&mut self, tree: &SyntaxTree, id: NodeId) -> CodegenResult<()> {
        let scope = tree.scope(id).ok_or_else(|| shape(id, "a code scope"))?;
        self.open_brace();
        if self.settings.insert_coop_termination
            && (scope.kind.is_loop_body()
                || matches!(scope.kind, ScopeKind::FunctionBody | ScopeKind::EventBody))
        {
            let call = format!("{};", self.settings.coop_termination_call);
            self.line(&call);
        }
        for &stmt in &scope.statements {
            self.emit_statement(tree, stmt)?;
        }
        self.close_brace();
        Ok(())
    }

    fn emit_statement(&mut self, tree: &SyntaxTree, id: NodeId) -> CodegenResult<()> {
        let stmt = tree.stmt(id).ok_or_else(|| shape(id, "a statement"))?;
        let is_label = matches!(stmt.kind, StatementKind::Label { .. });
        if stmt.info.dead.is_dead() && !is_label {
            return Ok(());
        }

        match &stmt.kind {
            StatementKind::Expr(e) => {
                if has_side_effects(tree, *e) {
                    let text = self.expr_statement(tree, *e)?;
                    self.line(&format!("{text};"));
                }
            }
            StatementKind::LocalVar(var) => {
                let value = match var.init {
                    Some(init) => self.expr(tree, init, Position::Value)?,
                    None => host::default_initializer(var.ty)?.to_string(),
                };
                self.line(&format!(
                    "{} {}{}_{} = {};",
                    host::host_type(var.ty),
                    host::LOCAL_PREFIX,
                    var.declared_in_scope,
                    var.name,
                    value
                ));
            }
            StatementKind::Return(None) => self.line("return;"),
            StatementKind::Return(Some(e)) => {
                let value = self.expr(tree, *e, Position::Value)?;
                self.line(&format!("return {value};"));
            }
            StatementKind::Jump { label, .. } => {
                self.line(&format!("goto {}{};", host::LABEL_PREFIX, label));
            }
            StatementKind::Label { name, jumps } => {
                if !jumps.is_empty() {
                    let text = if self.settings.insert_coop_termination {
                        format!(
                            "{}{}: {};",
                            host::LABEL_PREFIX,
                            name,
                            self.settings.coop_termination_call
                        )
                    } else {
                        format!("{}{}:;", host::LABEL_PREFIX, name)
                    };
                    self.line(&text);
                }
            }
            StatementKind::StateChange { target, .. } => {
                self.line(&format!("this.state(\"{target}\");"));
            }
            StatementKind::Control {
                cond,
                then_scope,
                else_ifs,
                else_scope,
            } => {
                let c = self.condition(tree, *cond)?;
                self.line(&format!("if({c})"));
                self.emit_scope(tree, *then_scope)?;
                for branch in else_ifs {
                    let c = self.condition(tree, branch.cond)?;
                    self.line(&format!("else if({c})"));
                    self.emit_scope(tree, branch.body)?;
                }
                if let Some(else_scope) = else_scope {
                    self.line("else");
                    self.emit_scope(tree, *else_scope)?;
                }
            }
            StatementKind::While { cond, body } => {
                let c = self.condition(tree, *cond)?;
                self.line(&format!("while({c})"));
                self.emit_scope(tree, *body)?;
            }
            StatementKind::DoWhile { body, cond } => {
                self.line("do");
                self.emit_scope(tree, *body)?;
                let c = self.condition(tree, *cond)?;
                self.line(&format!("while({c});"));
            }
            StatementKind::For {
                init,
                cond,
                step,
                body,
            } => {
                let init = self.expr_statement_list(tree, init)?;
                let cond = match cond {
                    Some(c) => self.condition(tree, *c)?,
                    None => String::new(),
                };
                let step = self.expr_statement_list(tree, step)?;
                self.line(&format!("for({init};{cond};{step})"));
                self.emit_scope(tree, *body)?;
            }
            StatementKind::Block(scope) => self.emit_scope(tree, *scope)?,
            StatementKind::Empty => {}
        }
        Ok(())
    }

    fn expr_statement_list(&mut self, tree: &SyntaxTree, exprs: &[NodeId]) -> CodegenResult<String> {
        let mut parts = Vec::with_capacity(exprs.len());
        for &e in exprs {
            parts.push(self.expr_statement(tree, e)?);
        }
        Ok(parts.join(","))
    }

    /// A condition as a host boolean.
    fn condition(&mut self, tree: &SyntaxTree, id: NodeId) -> CodegenResult<String> {
        let text = self.expr(tree, id, Position::Value)?;
        Ok(match tree.expr_type(id) {
            LslType::Integer | LslType::Float => text,
            LslType::Key => format!("UTILITIES.ToBool(new LSL_Types.key({text}))"),
            _ => format!("UTILITIES.ToBool({text})"),
        })
    }
}

/// Whether evaluating `id` can change program state.
fn has_side_effects(tree: &SyntaxTree, id: NodeId) -> bool {
    use lsl_validate::ExpressionKind;
    let direct = tree.expr(id).is_some_and(|e| match &e.kind {
        ExpressionKind::Call { .. } | ExpressionKind::Postfix { .. } => true,
        ExpressionKind::Binary { op, .. } => op.is_assignment(),
        ExpressionKind::Prefix { op, .. } => op.modifies_operand(),
        _ => false,
    });
    direct || tree.children(id).into_iter().any(|c| has_side_effects(tree, c))
}

pub(crate) fn shape(id: NodeId, expected: &str) -> CodegenError {
    CodegenError::Internal(format!("node {} is not {}", id.0, expected))
}
