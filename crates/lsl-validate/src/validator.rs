// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The validator: declaration pre-pass, body resolution and dead-code
//! classification.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use lsl_ast::{Block, ElseIf, EventHandler, Expr, FunctionDecl, LslType, Param, Script, StateDecl, Stmt, StmtKind, VarDecl as AstVarDecl, DEFAULT_STATE};
use lsl_library::LibraryDataProvider;

use crate::dead_code::{ScopeAnalyzer, StatementFacts};
use crate::error::{InternalError, ValidationError, ValidationErrorKind, ValidationWarning, WarningKind};
use crate::listener::{self, Pending, ValidationListener};
use crate::operators;
use crate::prepass::{self, LabelTable};
use crate::scope::ScopeStack;
use crate::tree::{
    CodeScope, ConstantJump, DeadCodeSegment, DeadCodeType, ElseIfBranch, EventNode, FunctionNode, NodeId,
    NodeKind, ScopeKind, ScriptNode, StateNode, Statement, StatementInfo, StatementKind, SyntaxTree, VarDecl,
    VarScope,
};

/// Validator settings.
#[derive(Debug, Clone)]
pub struct ValidatorOptions {
    /// Warn about functions, globals, locals and parameters that are never used.
    pub warn_unused: bool,
    /// Deliver diagnostics ordered by source position.
    pub sort_diagnostics: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            warn_unused: true,
            sort_diagnostics: true,
        }
    }
}

/// The annotated tree of a validated script.
#[derive(Debug, Clone)]
pub struct ValidatedScript {
    pub tree: SyntaxTree,
    pub root: NodeId,
    pub has_errors: bool,
}

impl ValidatedScript {
    pub fn script(&self) -> Option<&ScriptNode> {
        match self.tree.kind(self.root)? {
            NodeKind::Script(s) => Some(s),
            _ => None,
        }
    }
}

/// State of the function or event body being resolved.
struct BodyContext {
    name: String,
    return_type: LslType,
    is_event: bool,
    params: IndexMap<String, NodeId>,
    labels: LabelTable,
    next_scope_id: u32,
}

/// Validates scripts against a library. Reusable: every run starts from a
/// clean state.
pub struct Validator<'lib> {
    pub(crate) library: &'lib (dyn LibraryDataProvider + Sync),
    options: ValidatorOptions,
    pub(crate) tree: SyntaxTree,
    pub(crate) globals: IndexMap<String, NodeId>,
    pub(crate) functions: HashMap<String, NodeId>,
    states: HashMap<String, NodeId>,
    pub(crate) scopes: ScopeStack,
    body: Option<BodyContext>,
    pub(crate) in_static_context: bool,
    pending: Vec<Pending>,
}

impl<'lib> Validator<'lib> {
    pub fn new(library: &'lib (dyn LibraryDataProvider + Sync)) -> Self {
        Self::with_options(library, ValidatorOptions::default())
    }

    pub fn with_options(library: &'lib (dyn LibraryDataProvider + Sync), options: ValidatorOptions) -> Self {
        Self {
            library,
            options,
            tree: SyntaxTree::new(),
            globals: IndexMap::new(),
            functions: HashMap::new(),
            states: HashMap::new(),
            scopes: ScopeStack::new(),
            body: None,
            in_static_context: false,
            pending: Vec::new(),
        }
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Drop all per-run state.
    pub fn reset(&mut self) {
        self.tree = SyntaxTree::new();
        self.globals.clear();
        self.functions.clear();
        self.states.clear();
        self.scopes.clear();
        self.body = None;
        self.in_static_context = false;
        self.pending.clear();
    }

    /// Validate a script, reporting diagnostics to `listener`.
    ///
    /// Semantic problems never fail the call; they are reported and recorded
    /// in [`ValidatedScript::has_errors`]. `Err` means an internal invariant
    /// was violated.
    pub fn validate(
        &mut self,
        script: &Script,
        listener: &mut dyn ValidationListener,
    ) -> Result<ValidatedScript, InternalError> {
        self.reset();

        let functions = self.declare_functions(&script.functions);
        let (default_state, states) = self.declare_states(script);
        tracing::debug!(
            functions = self.functions.len(),
            states = self.states.len(),
            "declaration pre-pass"
        );

        let globals: Vec<NodeId> = script.globals.iter().map(|g| self.define_global(g)).collect();

        for (decl, &id) in script.functions.iter().zip(&functions) {
            self.resolve_function(decl, id)?;
        }
        if let (Some(decl), Some(id)) = (&script.default_state, default_state) {
            self.resolve_state(decl, id)?;
        }
        for (decl, &id) in script.states.iter().zip(&states) {
            self.resolve_state(decl, id)?;
        }

        self.report_unused(&globals, &functions);

        let root = self.tree.alloc(
            NodeKind::Script(ScriptNode {
                globals,
                functions,
                default_state,
                states,
            }),
            script.span,
        );

        let pending = std::mem::take(&mut self.pending);
        let error_count = pending.iter().filter(|p| matches!(p, Pending::Error(_))).count();
        let has_errors = error_count > 0 || self.tree.has_errors(root);
        tracing::debug!(
            nodes = self.tree.len(),
            errors = error_count,
            warnings = pending.len() - error_count,
            "validation finished"
        );
        listener::flush(pending, self.options.sort_diagnostics, listener);

        let tree = std::mem::take(&mut self.tree);
        self.reset();
        Ok(ValidatedScript { tree, root, has_errors })
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn error(&mut self, error: ValidationError) {
        self.pending.push(Pending::Error(error));
    }

    pub(crate) fn error_at(&mut self, node: NodeId, kind: ValidationErrorKind, span: lsl_ast::Span) {
        self.tree.mark_error(node);
        self.error(ValidationError::new(kind, span));
    }

    pub(crate) fn warning(&mut self, kind: WarningKind, span: lsl_ast::Span) {
        self.pending.push(Pending::Warning(ValidationWarning::new(kind, span)));
    }

    // =========================================================================
    // Declaration pre-pass
    // =========================================================================

    fn declare_functions(&mut self, decls: &[FunctionDecl]) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(decls.len());
        for decl in decls {
            let params = self.declare_params(&decl.params);
            let id = self.tree.alloc(
                NodeKind::Function(FunctionNode {
                    name: decl.name.clone(),
                    return_type: decl.return_type,
                    params,
                    body: None,
                    references: Vec::new(),
                }),
                decl.span,
            );

            if self.library.function_exists(&decl.name) {
                // Not registered: calls by this name keep resolving to the library.
                self.error_at(
                    id,
                    ValidationErrorKind::LibraryFunctionRedefined {
                        name: decl.name.clone(),
                    },
                    decl.span,
                );
            } else if let Some(&previous) = self.functions.get(&decl.name) {
                let previous = self.tree.span(previous);
                self.error_at(
                    id,
                    ValidationErrorKind::FunctionRedefined {
                        name: decl.name.clone(),
                        previous,
                    },
                    decl.span,
                );
            } else {
                self.functions.insert(decl.name.clone(), id);
            }
            ids.push(id);
        }
        ids
    }

    fn declare_params(&mut self, params: &[Param]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(params.len());
        for param in params {
            let id = self.tree.alloc(
                NodeKind::Param(VarDecl {
                    name: param.name.clone(),
                    ty: param.ty,
                    scope: VarScope::Parameter,
                    init: None,
                    references: Vec::new(),
                    declared_in_scope: 0,
                }),
                param.span,
            );
            if !seen.insert(param.name.as_str()) {
                self.error_at(
                    id,
                    ValidationErrorKind::ParameterRedefined {
                        name: param.name.clone(),
                    },
                    param.span,
                );
            } else if self.library.constant_exists(&param.name) {
                self.error_at(
                    id,
                    ValidationErrorKind::LibraryConstantRedefined {
                        name: param.name.clone(),
                    },
                    param.span,
                );
            }
            ids.push(id);
        }
        ids
    }

    fn declare_states(&mut self, script: &Script) -> (Option<NodeId>, Vec<NodeId>) {
        let default_state = match &script.default_state {
            Some(decl) => {
                let id = self.declare_state(decl, true);
                self.states.insert(DEFAULT_STATE.to_string(), id);
                Some(id)
            }
            None => {
                self.error(ValidationError::new(
                    ValidationErrorKind::MissingDefaultState,
                    script.span,
                ));
                None
            }
        };

        let mut states = Vec::with_capacity(script.states.len());
        for decl in &script.states {
            let id = self.declare_state(decl, false);
            if decl.name == DEFAULT_STATE {
                self.error_at(id, ValidationErrorKind::DefaultStateRedefined, decl.span);
            } else if let Some(&previous) = self.states.get(&decl.name) {
                let previous = self.tree.span(previous);
                self.error_at(
                    id,
                    ValidationErrorKind::StateRedefined {
                        name: decl.name.clone(),
                        previous,
                    },
                    decl.span,
                );
            } else {
                self.states.insert(decl.name.clone(), id);
            }
            states.push(id);
        }
        (default_state, states)
    }

    fn declare_state(&mut self, decl: &StateDecl, is_default: bool) -> NodeId {
        let id = self.tree.alloc(
            NodeKind::State(StateNode {
                name: decl.name.clone(),
                is_default,
                handlers: Vec::new(),
            }),
            decl.span,
        );
        if decl.handlers.is_empty() {
            self.error_at(
                id,
                ValidationErrorKind::StateHasNoEventHandlers {
                    state: decl.name.clone(),
                },
                decl.span,
            );
        }
        id
    }

    fn define_global(&mut self, decl: &AstVarDecl) -> NodeId {
        self.in_static_context = true;
        let init = decl.init.as_ref().map(|e| self.build_expr(e));
        self.in_static_context = false;

        let id = self.tree.alloc(
            NodeKind::GlobalVar(VarDecl {
                name: decl.name.clone(),
                ty: decl.ty,
                scope: VarScope::Global,
                init,
                references: Vec::new(),
                declared_in_scope: 0,
            }),
            decl.span,
        );

        if self.library.constant_exists(&decl.name) {
            self.error_at(
                id,
                ValidationErrorKind::LibraryConstantRedefined {
                    name: decl.name.clone(),
                },
                decl.span,
            );
        } else if let Some(&previous) = self.globals.get(&decl.name) {
            let previous = self.tree.span(previous);
            self.error_at(
                id,
                ValidationErrorKind::VariableRedefined {
                    name: decl.name.clone(),
                    previous,
                },
                decl.span,
            );
        } else {
            self.globals.insert(decl.name.clone(), id);
        }

        if let Some(init) = init {
            self.check_initializer(id, &decl.name, decl.ty, init);
        }
        id
    }

    fn check_initializer(&mut self, decl: NodeId, name: &str, ty: LslType, init: NodeId) {
        if self.untyped(init) {
            return;
        }
        let found = self.tree.expr_type(init);
        if !operators::assignable(ty, found) {
            self.error_at(
                decl,
                ValidationErrorKind::TypeMismatchInDeclaration {
                    name: name.to_string(),
                    expected: ty,
                    found,
                },
                self.tree.span(init),
            );
        }
    }

    // =========================================================================
    // Bodies
    // =========================================================================

    fn enter_body(&mut self, name: &str, return_type: LslType, is_event: bool, params: &[NodeId], body: &Block) {
        self.scopes.clear();
        let mut map = IndexMap::new();
        for &param in params {
            let Some(decl) = self.tree.var_decl(param) else {
                continue;
            };
            let name = decl.name.clone();
            if self.globals.contains_key(&name) {
                let span = self.tree.span(param);
                self.warning(WarningKind::ParameterHidesGlobal { name: name.clone() }, span);
            }
            map.entry(name).or_insert(param);
        }
        let labels = prepass::collect_labels(&mut self.tree, body, &mut self.pending);
        self.body = Some(BodyContext {
            name: name.to_string(),
            return_type,
            is_event,
            params: map,
            labels,
            next_scope_id: 0,
        });
    }

    fn exit_body(&mut self, params: &[NodeId], warn_params: bool) {
        if self.options.warn_unused && warn_params {
            for &param in params {
                if let Some(decl) = self.tree.var_decl(param) {
                    if decl.references.is_empty() {
                        let name = decl.name.clone();
                        let span = self.tree.span(param);
                        self.warning(WarningKind::ParameterNeverUsed { name }, span);
                    }
                }
            }
        }
        if let Some(body) = &self.body {
            tracing::trace!(body = %body.name, scopes = body.next_scope_id, "resolved body");
        }
        self.scopes.clear();
        self.body = None;
    }

    pub(crate) fn param(&self, name: &str) -> Option<NodeId> {
        self.body.as_ref().and_then(|b| b.params.get(name).copied())
    }

    fn resolve_function(&mut self, decl: &FunctionDecl, id: NodeId) -> Result<(), InternalError> {
        let params = self
            .tree
            .function(id)
            .ok_or(InternalError::UnexpectedNode(id, "function"))?
            .params
            .clone();

        self.enter_body(&decl.name, decl.return_type, false, &params, &decl.body);
        let body = self.build_scope(&decl.body.stmts, false, ScopeKind::FunctionBody, decl.body.span)?;

        let has_return_path = self.tree.scope(body).is_some_and(|s| s.has_return_path);
        if !decl.return_type.is_void() && !has_return_path {
            self.error_at(
                id,
                ValidationErrorKind::NotAllCodePathsReturn {
                    name: decl.name.clone(),
                },
                decl.span,
            );
        }
        self.exit_body(&params, true);

        let mut function = self
            .tree
            .function(id)
            .cloned()
            .ok_or(InternalError::UnexpectedNode(id, "function"))?;
        function.body = Some(body);
        self.tree.fill(id, NodeKind::Function(function));
        Ok(())
    }

    fn resolve_state(&mut self, decl: &StateDecl, id: NodeId) -> Result<(), InternalError> {
        let mut seen = HashSet::new();
        let mut handlers = Vec::with_capacity(decl.handlers.len());
        for handler in &decl.handlers {
            let handler_id = self.resolve_event(handler)?;
            if !seen.insert(handler.name.as_str()) {
                self.error_at(
                    handler_id,
                    ValidationErrorKind::EventHandlerRedefined {
                        name: handler.name.clone(),
                        state: decl.name.clone(),
                    },
                    handler.span,
                );
            }
            handlers.push(handler_id);
        }

        let mut state = match self.tree.kind(id) {
            Some(NodeKind::State(s)) => s.clone(),
            _ => return Err(InternalError::UnexpectedNode(id, "state")),
        };
        state.handlers = handlers;
        self.tree.fill(id, NodeKind::State(state));
        Ok(())
    }

    fn resolve_event(&mut self, decl: &EventHandler) -> Result<NodeId, InternalError> {
        let params = self.declare_params(&decl.params);

        let mut problem = None;
        match self.library.event(&decl.name) {
            None => {
                problem = Some(ValidationErrorKind::UnknownEventHandler {
                    name: decl.name.clone(),
                });
            }
            Some(event) => {
                let matches = event.params.len() == decl.params.len()
                    && event.params.iter().zip(&decl.params).all(|(e, p)| e.ty == p.ty);
                if !matches {
                    let expected = event
                        .params
                        .iter()
                        .map(|p| format!("{} {}", p.ty, p.name))
                        .collect::<Vec<_>>()
                        .join(", ");
                    problem = Some(ValidationErrorKind::IncorrectEventSignature {
                        name: decl.name.clone(),
                        expected: format!("{}({})", event.name, expected),
                    });
                }
                if event.deprecated {
                    self.warning(
                        WarningKind::DeprecatedEvent {
                            name: decl.name.clone(),
                        },
                        decl.span,
                    );
                }
            }
        }

        self.enter_body(&decl.name, LslType::Void, true, &params, &decl.body);
        let body = self.build_scope(&decl.body.stmts, false, ScopeKind::EventBody, decl.body.span)?;
        self.exit_body(&params, false);

        let id = self.tree.alloc(
            NodeKind::EventHandler(EventNode {
                name: decl.name.clone(),
                params,
                body,
            }),
            decl.span,
        );
        if let Some(kind) = problem {
            self.error_at(id, kind, decl.span);
        }
        Ok(id)
    }

    fn report_unused(&mut self, globals: &[NodeId], functions: &[NodeId]) {
        if !self.options.warn_unused {
            return;
        }
        for &id in globals {
            if let Some(decl) = self.tree.var_decl(id) {
                if decl.references.is_empty() {
                    let name = decl.name.clone();
                    self.warning(WarningKind::GlobalNeverUsed { name }, self.tree.span(id));
                }
            }
        }
        for &id in functions {
            if let Some(f) = self.tree.function(id) {
                if f.references.is_empty() {
                    let name = f.name.clone();
                    self.warning(WarningKind::FunctionNeverUsed { name }, self.tree.span(id));
                }
            }
        }
    }

    // =========================================================================
    // Code scopes
    // =========================================================================

    fn next_scope_id(&mut self) -> u32 {
        match &mut self.body {
            Some(body) => {
                body.next_scope_id += 1;
                body.next_scope_id
            }
            None => 0,
        }
    }

    fn build_scope(
        &mut self,
        stmts: &[Stmt],
        single_statement: bool,
        kind: ScopeKind,
        span: lsl_ast::Span,
    ) -> Result<NodeId, InternalError> {
        let scope_id = self.next_scope_id();
        self.scopes.push(scope_id);
        let mut analyzer = ScopeAnalyzer::new(scope_id, single_statement);

        for stmt in stmts {
            let index = analyzer.next_index();
            let (id, facts) = self.build_statement(stmt, scope_id, index, single_statement)?;
            analyzer.add(&mut self.tree, id, facts)?;
        }

        let summary = analyzer.finish();
        if let Some(frame) = self.scopes.pop() {
            if self.options.warn_unused {
                for (name, decl) in frame.locals {
                    let unused = self.tree.var_decl(decl).is_some_and(|v| v.references.is_empty());
                    if unused && !self.tree.is_dead_declaration(decl) {
                        self.warning(WarningKind::LocalNeverUsed { name }, self.tree.span(decl));
                    }
                }
            }
        }
        self.report_dead_segments(&summary.dead_segments);

        Ok(self.tree.alloc(
            NodeKind::Scope(CodeScope {
                scope_id,
                kind,
                single_statement,
                statements: summary.statements,
                dead_segments: summary.dead_segments,
                constant_jumps: summary.constant_jumps,
                has_return_path: summary.has_return_path,
                return_path: summary.return_path,
            }),
            span,
        ))
    }

    /// A branch or loop body: braced bodies are ordinary scopes, anything else
    /// becomes a single-statement scope.
    fn build_body(&mut self, body: &Stmt, kind: ScopeKind) -> Result<NodeId, InternalError> {
        match &body.kind {
            StmtKind::Block(block) => self.build_scope(&block.stmts, false, kind, block.span),
            _ => self.build_scope(std::slice::from_ref(body), true, kind, body.span),
        }
    }

    fn report_dead_segments(&mut self, segments: &[DeadCodeSegment]) {
        let non_void_function = self
            .body
            .as_ref()
            .filter(|b| !b.is_event && !b.return_type.is_void())
            .map(|b| b.name.clone());
        for segment in segments {
            tracing::trace!(reason = ?segment.reason, statements = segment.statements.len(), "dead segment");
            match (&non_void_function, segment.reason) {
                (Some(name), DeadCodeType::AfterReturnPath) => {
                    let first = segment.statements.first().copied();
                    if let Some(first) = first {
                        self.tree.mark_error(first);
                    }
                    self.error(ValidationError::new(
                        ValidationErrorKind::DeadCodeAfterReturnPath { name: name.clone() },
                        segment.span,
                    ));
                }
                _ => self.warning(WarningKind::DeadCode { reason: segment.reason }, segment.span),
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn alloc_stmt(&mut self, kind: StatementKind, span: lsl_ast::Span) -> NodeId {
        self.tree.alloc(
            NodeKind::Stmt(Statement {
                kind,
                info: StatementInfo::default(),
            }),
            span,
        )
    }

    fn build_statement(
        &mut self,
        stmt: &Stmt,
        scope_id: u32,
        index: usize,
        single_statement: bool,
    ) -> Result<(NodeId, StatementFacts), InternalError> {
        let span = stmt.span;
        let plain = |id| (id, StatementFacts::default());
        let built = match &stmt.kind {
            StmtKind::Empty => {
                if !single_statement {
                    self.warning(WarningKind::UselessSemicolon, span);
                }
                plain(self.alloc_stmt(StatementKind::Empty, span))
            }
            StmtKind::Expr(expr) => {
                let e = self.build_expr(expr);
                if !has_effect(expr) {
                    self.warning(WarningKind::NoEffect, expr.span);
                }
                plain(self.alloc_stmt(StatementKind::Expr(e), span))
            }
            StmtKind::Local(decl) => plain(self.build_local(decl, span, scope_id, single_statement)),
            StmtKind::Return(value) => self.build_return(value.as_ref(), span),
            StmtKind::Jump { label } => self.build_jump(label, span, index),
            StmtKind::Label { name } => {
                let id = self
                    .body
                    .as_mut()
                    .and_then(|b| b.labels.next_in_order())
                    .ok_or(InternalError::LabelOutOfSync(span))?;
                match self.tree.stmt(id).map(|s| &s.kind) {
                    Some(StatementKind::Label { name: found, .. }) if found == name => plain(id),
                    _ => return Err(InternalError::LabelOutOfSync(span)),
                }
            }
            StmtKind::StateChange { target } => {
                let state = self.states.get(target).copied();
                let id = self.alloc_stmt(
                    StatementKind::StateChange {
                        target: target.clone(),
                        state,
                    },
                    span,
                );
                if state.is_none() {
                    self.error_at(
                        id,
                        ValidationErrorKind::StateChangeToUndefined { name: target.clone() },
                        span,
                    );
                }
                plain(id)
            }
            StmtKind::If {
                cond,
                then_branch,
                else_ifs,
                else_branch,
            } => self.build_control(cond, then_branch, else_ifs, else_branch.as_deref(), span, index)?,
            StmtKind::While { cond, body } => {
                let cond = self.build_condition(cond);
                let body = self.build_body(body, ScopeKind::WhileBody)?;
                plain(self.alloc_stmt(StatementKind::While { cond, body }, span))
            }
            StmtKind::DoWhile { body, cond } => {
                let body = self.build_body(body, ScopeKind::DoWhileBody)?;
                let cond = self.build_condition(cond);
                plain(self.alloc_stmt(StatementKind::DoWhile { body, cond }, span))
            }
            StmtKind::For { init, cond, step, body } => {
                let init = init.iter().map(|e| self.build_expr(e)).collect();
                let cond = cond.as_ref().map(|c| self.build_condition(c));
                let step = step.iter().map(|e| self.build_expr(e)).collect();
                let body = self.build_body(body, ScopeKind::ForBody)?;
                plain(self.alloc_stmt(StatementKind::For { init, cond, step, body }, span))
            }
            StmtKind::Block(block) => {
                let scope = self.build_scope(&block.stmts, false, ScopeKind::AnonymousBlock, block.span)?;
                let id = self.alloc_stmt(StatementKind::Block(scope), span);
                let inner = self
                    .tree
                    .scope(scope)
                    .ok_or(InternalError::UnexpectedNode(scope, "code scope"))?;
                let facts = StatementFacts {
                    has_return_path: inner.has_return_path,
                    constant_jump: inner
                        .constant_jumps
                        .iter()
                        .find(|j| j.target_scope != inner.scope_id)
                        .map(|j| ConstantJump {
                            jump: id,
                            jump_index: index,
                            ..j.clone()
                        }),
                };
                (id, facts)
            }
        };
        Ok(built)
    }

    fn build_local(&mut self, decl: &AstVarDecl, span: lsl_ast::Span, scope_id: u32, single_statement: bool) -> NodeId {
        let init = decl.init.as_ref().map(|e| self.build_expr(e));
        let id = self.alloc_stmt(
            StatementKind::LocalVar(VarDecl {
                name: decl.name.clone(),
                ty: decl.ty,
                scope: VarScope::Local,
                init,
                references: Vec::new(),
                declared_in_scope: scope_id,
            }),
            span,
        );

        if single_statement {
            self.error_at(
                id,
                ValidationErrorKind::VariableInSingleStatementBlock {
                    name: decl.name.clone(),
                },
                span,
            );
        }

        if self.library.constant_exists(&decl.name) {
            self.error_at(
                id,
                ValidationErrorKind::LibraryConstantRedefined {
                    name: decl.name.clone(),
                },
                span,
            );
        } else if let Err(previous) = self.scopes.define(&decl.name, id) {
            let previous = self.tree.span(previous);
            self.error_at(
                id,
                ValidationErrorKind::VariableRedefined {
                    name: decl.name.clone(),
                    previous,
                },
                span,
            );
        } else if self.param(&decl.name).is_some() {
            self.warning(WarningKind::LocalHidesParameter { name: decl.name.clone() }, span);
        } else if self.globals.contains_key(&decl.name) {
            self.warning(WarningKind::LocalHidesGlobal { name: decl.name.clone() }, span);
        }

        if let Some(init) = init {
            self.check_initializer(id, &decl.name, decl.ty, init);
        }
        id
    }

    fn build_return(&mut self, value: Option<&Expr>, span: lsl_ast::Span) -> (NodeId, StatementFacts) {
        let value_id = value.map(|e| self.build_expr(e));
        let id = self.alloc_stmt(StatementKind::Return(value_id), span);

        let (name, return_type, is_event) = match &self.body {
            Some(b) => (b.name.clone(), b.return_type, b.is_event),
            None => (String::new(), LslType::Void, true),
        };
        let problem = match value_id {
            Some(_) if is_event => Some(ValidationErrorKind::ReturnValueFromEventHandler),
            Some(_) if return_type.is_void() => Some(ValidationErrorKind::ReturnValueFromVoidFunction { name }),
            Some(v) if !self.untyped(v) && !operators::assignable(return_type, self.tree.expr_type(v)) => {
                Some(ValidationErrorKind::ReturnTypeMismatch {
                    name,
                    expected: return_type,
                    found: self.tree.expr_type(v),
                })
            }
            None if !is_event && !return_type.is_void() => Some(ValidationErrorKind::MissingReturnValue {
                name,
                expected: return_type,
            }),
            _ => None,
        };
        if let Some(kind) = problem {
            self.error_at(id, kind, span);
        }

        (
            id,
            StatementFacts {
                has_return_path: true,
                constant_jump: None,
            },
        )
    }

    fn build_jump(&mut self, label: &str, span: lsl_ast::Span, index: usize) -> (NodeId, StatementFacts) {
        let target = self
            .body
            .as_ref()
            .and_then(|b| b.labels.lookup(label))
            .and_then(|t| self.tree.stmt(t).map(|s| (t, s.info)))
            .filter(|(_, info)| self.scopes.is_open(info.scope_id));

        let id = self.alloc_stmt(
            StatementKind::Jump {
                label: label.to_string(),
                target: target.map(|(t, _)| t),
                constant: false,
            },
            span,
        );

        let Some((label_id, info)) = target else {
            self.error_at(
                id,
                ValidationErrorKind::JumpToUndefinedLabel {
                    name: label.to_string(),
                },
                span,
            );
            return (id, StatementFacts::default());
        };

        if let Some(Statement {
            kind: StatementKind::Label { jumps, .. },
            ..
        }) = self.tree.stmt_mut(label_id)
        {
            jumps.push(id);
        }

        let constant_jump = (!info.dead.is_dead()).then_some(ConstantJump {
            jump: id,
            jump_index: index,
            label: label_id,
            target_scope: info.scope_id,
            target_index: info.index,
        });
        (
            id,
            StatementFacts {
                has_return_path: false,
                constant_jump,
            },
        )
    }

    fn build_control(
        &mut self,
        cond: &Expr,
        then_branch: &Stmt,
        else_ifs: &[ElseIf],
        else_branch: Option<&Stmt>,
        span: lsl_ast::Span,
        index: usize,
    ) -> Result<(NodeId, StatementFacts), InternalError> {
        let cond = self.build_condition(cond);
        let then_scope = self.build_body(then_branch, ScopeKind::IfBranch)?;
        let mut branches = Vec::with_capacity(else_ifs.len());
        for branch in else_ifs {
            let cond = self.build_condition(&branch.cond);
            let body = self.build_body(&branch.body, ScopeKind::ElseIfBranch)?;
            branches.push(ElseIfBranch { cond, body });
        }
        let else_scope = else_branch
            .map(|b| self.build_body(b, ScopeKind::ElseBranch))
            .transpose()?;

        let mut scopes = vec![then_scope];
        scopes.extend(branches.iter().map(|b| b.body));
        scopes.extend(else_scope);

        let id = self.alloc_stmt(
            StatementKind::Control {
                cond,
                then_scope,
                else_ifs: branches,
                else_scope,
            },
            span,
        );

        let mut facts = StatementFacts::default();
        if else_scope.is_some() {
            let code_scopes = scopes
                .iter()
                .map(|&s| self.tree.scope(s).ok_or(InternalError::UnexpectedNode(s, "code scope")))
                .collect::<Result<Vec<_>, _>>()?;
            facts.has_return_path = code_scopes.iter().all(|s| s.has_return_path);
            facts.constant_jump = code_scopes[0]
                .constant_jumps
                .iter()
                .find(|jump| {
                    code_scopes[1..]
                        .iter()
                        .all(|s| s.constant_jumps.iter().any(|other| other.label == jump.label))
                })
                .map(|jump| ConstantJump {
                    jump: id,
                    jump_index: index,
                    ..jump.clone()
                });
        }
        Ok((id, facts))
    }

    fn build_condition(&mut self, cond: &Expr) -> NodeId {
        let id = self.build_expr(cond);
        if self.untyped(id) {
            return id;
        }
        let ty = self.tree.expr_type(id);
        if !operators::valid_condition(ty) {
            self.error_at(id, ValidationErrorKind::InvalidConditionType { found: ty }, cond.span);
        } else if self.tree.expr(id).is_some_and(|e| e.constant) {
            self.warning(WarningKind::ConstantCondition, cond.span);
        }
        id
    }
}

/// Whether an expression statement does anything.
fn has_effect(expr: &Expr) -> bool {
    use lsl_ast::ExprKind;
    match &expr.unparen().kind {
        ExprKind::Call { .. } | ExprKind::Postfix { .. } => true,
        ExprKind::Binary { op, .. } => op.is_assignment(),
        ExprKind::Prefix { op, .. } => op.modifies_operand(),
        _ => false,
    }
}
