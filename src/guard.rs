//! Static guard - pre-execution scan for interactive/blocking constructs
//!
//! Parses a snippet with Python's own grammar and walks the full syntax
//! tree, flagging direct calls to deny-listed names and imports of
//! deny-listed modules. Snippets that fail to parse produce no violations;
//! syntax errors are left to the engine, which reports them with the
//! interpreter's own diagnostics.

use rustpython_parser::{ast, Parse};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Identifiers that require live user interaction, with the reason each is
/// disallowed. Mirrors the behavior of a terminal-less host: any of these
/// would block the snippet waiting for input that never arrives.
const DEFAULT_DENY_LIST: &[(&str, &str)] = &[
    ("input", "input() function requires user interaction"),
    ("raw_input", "raw_input() function requires user interaction (Python 2)"),
    ("getpass", "getpass module requires user interaction"),
    ("readline", "readline module requires user interaction"),
    ("msvcrt", "msvcrt module requires user interaction (Windows)"),
    ("tty", "tty module requires user interaction (Unix)"),
    ("termios", "termios module requires user interaction (Unix)"),
    ("select", "select module can be used for user input"),
    ("keyboard", "keyboard module requires user interaction"),
    ("pynput", "pynput module requires user interaction"),
    ("pyautogui", "pyautogui module requires user interaction"),
    ("tkinter", "tkinter can be used for user input dialogs"),
    ("PyQt5", "PyQt5 can be used for user input dialogs"),
    ("PySide2", "PySide2 can be used for user input dialogs"),
    ("wx", "wxPython can be used for user input dialogs"),
];

/// One deny-list hit found in a snippet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// The denied identifier as written in the deny list
    pub name: String,
    /// Why the identifier is disallowed
    pub reason: String,
}

/// Static analyzer that rejects snippets before they run
///
/// Detection is deliberately limited to direct name calls and plain/from
/// imports. Indirection (`f = input; f()`) and attribute chains are not
/// flagged; whatever such a snippet does at runtime is reported by the
/// engine instead.
#[derive(Debug, Clone)]
pub struct StaticGuard {
    deny: HashMap<String, String>,
}

impl Default for StaticGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticGuard {
    /// Create a guard with the built-in deny list
    pub fn new() -> Self {
        StaticGuard {
            deny: DEFAULT_DENY_LIST
                .iter()
                .map(|(name, reason)| (name.to_string(), reason.to_string()))
                .collect(),
        }
    }

    /// Create a guard with an empty deny list
    pub fn empty() -> Self {
        StaticGuard {
            deny: HashMap::new(),
        }
    }

    /// Add an identifier to the deny list
    pub fn deny(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.deny.insert(name.into(), reason.into());
    }

    /// Look up the reason an identifier is denied
    pub fn reason(&self, name: &str) -> Option<&str> {
        self.deny.get(name).map(String::as_str)
    }

    /// Scan a snippet for deny-list hits
    ///
    /// Returns the matched identifiers in first-seen order, deduplicated.
    /// An empty result means the snippet may be evaluated.
    pub fn check(&self, source: &str) -> Vec<Violation> {
        let suite = match ast::Suite::parse(source, "<snippet>") {
            Ok(suite) => suite,
            // Unparseable code cannot be scanned; the engine surfaces the
            // syntax error with full context.
            Err(_) => return Vec::new(),
        };

        let mut scan = Scan {
            deny: &self.deny,
            seen: HashSet::new(),
            found: Vec::new(),
        };
        scan.visit_body(&suite);
        scan.found
    }
}

/// Recursive visitor over the typed AST, collecting deny-list hits
struct Scan<'a> {
    deny: &'a HashMap<String, String>,
    seen: HashSet<String>,
    found: Vec<Violation>,
}

impl Scan<'_> {
    fn flag(&mut self, name: &str) {
        if let Some(reason) = self.deny.get(name) {
            if self.seen.insert(name.to_string()) {
                self.found.push(Violation {
                    name: name.to_string(),
                    reason: reason.clone(),
                });
            }
        }
    }

    fn visit_body(&mut self, body: &[ast::Stmt]) {
        for stmt in body {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &ast::Stmt) {
        match stmt {
            ast::Stmt::FunctionDef(node) => {
                for dec in &node.decorator_list {
                    self.visit_expr(dec);
                }
                self.visit_arguments(&node.args);
                if let Some(returns) = &node.returns {
                    self.visit_expr(returns);
                }
                self.visit_body(&node.body);
            }
            ast::Stmt::AsyncFunctionDef(node) => {
                for dec in &node.decorator_list {
                    self.visit_expr(dec);
                }
                self.visit_arguments(&node.args);
                if let Some(returns) = &node.returns {
                    self.visit_expr(returns);
                }
                self.visit_body(&node.body);
            }
            ast::Stmt::ClassDef(node) => {
                for dec in &node.decorator_list {
                    self.visit_expr(dec);
                }
                for base in &node.bases {
                    self.visit_expr(base);
                }
                for keyword in &node.keywords {
                    self.visit_expr(&keyword.value);
                }
                self.visit_body(&node.body);
            }
            ast::Stmt::Return(node) => {
                if let Some(value) = &node.value {
                    self.visit_expr(value);
                }
            }
            ast::Stmt::Delete(node) => {
                for target in &node.targets {
                    self.visit_expr(target);
                }
            }
            ast::Stmt::Assign(node) => {
                for target in &node.targets {
                    self.visit_expr(target);
                }
                self.visit_expr(&node.value);
            }
            ast::Stmt::AugAssign(node) => {
                self.visit_expr(&node.target);
                self.visit_expr(&node.value);
            }
            ast::Stmt::AnnAssign(node) => {
                self.visit_expr(&node.target);
                self.visit_expr(&node.annotation);
                if let Some(value) = &node.value {
                    self.visit_expr(value);
                }
            }
            ast::Stmt::TypeAlias(node) => {
                self.visit_expr(&node.name);
                self.visit_expr(&node.value);
            }
            ast::Stmt::For(node) => {
                self.visit_expr(&node.target);
                self.visit_expr(&node.iter);
                self.visit_body(&node.body);
                self.visit_body(&node.orelse);
            }
            ast::Stmt::AsyncFor(node) => {
                self.visit_expr(&node.target);
                self.visit_expr(&node.iter);
                self.visit_body(&node.body);
                self.visit_body(&node.orelse);
            }
            ast::Stmt::While(node) => {
                self.visit_expr(&node.test);
                self.visit_body(&node.body);
                self.visit_body(&node.orelse);
            }
            ast::Stmt::If(node) => {
                self.visit_expr(&node.test);
                self.visit_body(&node.body);
                self.visit_body(&node.orelse);
            }
            ast::Stmt::With(node) => {
                for item in &node.items {
                    self.visit_expr(&item.context_expr);
                    if let Some(vars) = &item.optional_vars {
                        self.visit_expr(vars);
                    }
                }
                self.visit_body(&node.body);
            }
            ast::Stmt::AsyncWith(node) => {
                for item in &node.items {
                    self.visit_expr(&item.context_expr);
                    if let Some(vars) = &item.optional_vars {
                        self.visit_expr(vars);
                    }
                }
                self.visit_body(&node.body);
            }
            ast::Stmt::Match(node) => {
                self.visit_expr(&node.subject);
                for case in &node.cases {
                    self.visit_pattern(&case.pattern);
                    if let Some(guard) = &case.guard {
                        self.visit_expr(guard);
                    }
                    self.visit_body(&case.body);
                }
            }
            ast::Stmt::Raise(node) => {
                if let Some(exc) = &node.exc {
                    self.visit_expr(exc);
                }
                if let Some(cause) = &node.cause {
                    self.visit_expr(cause);
                }
            }
            ast::Stmt::Try(node) => {
                self.visit_body(&node.body);
                for handler in &node.handlers {
                    self.visit_handler(handler);
                }
                self.visit_body(&node.orelse);
                self.visit_body(&node.finalbody);
            }
            ast::Stmt::TryStar(node) => {
                self.visit_body(&node.body);
                for handler in &node.handlers {
                    self.visit_handler(handler);
                }
                self.visit_body(&node.orelse);
                self.visit_body(&node.finalbody);
            }
            ast::Stmt::Assert(node) => {
                self.visit_expr(&node.test);
                if let Some(msg) = &node.msg {
                    self.visit_expr(msg);
                }
            }
            // `import tkinter as tk` still imports tkinter; the alias is
            // irrelevant, the canonical module name is what is checked.
            ast::Stmt::Import(node) => {
                for alias in &node.names {
                    self.flag(alias.name.as_str());
                }
            }
            ast::Stmt::ImportFrom(node) => {
                if let Some(module) = &node.module {
                    self.flag(module.as_str());
                }
                for alias in &node.names {
                    self.flag(alias.name.as_str());
                }
            }
            ast::Stmt::Expr(node) => self.visit_expr(&node.value),
            ast::Stmt::Global(_)
            | ast::Stmt::Nonlocal(_)
            | ast::Stmt::Pass(_)
            | ast::Stmt::Break(_)
            | ast::Stmt::Continue(_) => {}
        }
    }

    fn visit_handler(&mut self, handler: &ast::ExceptHandler) {
        let ast::ExceptHandler::ExceptHandler(node) = handler;
        if let Some(type_) = &node.type_ {
            self.visit_expr(type_);
        }
        self.visit_body(&node.body);
    }

    fn visit_arguments(&mut self, args: &ast::Arguments) {
        for arg in args
            .posonlyargs
            .iter()
            .chain(&args.args)
            .chain(&args.kwonlyargs)
        {
            if let Some(annotation) = &arg.def.annotation {
                self.visit_expr(annotation);
            }
            if let Some(default) = &arg.default {
                self.visit_expr(default);
            }
        }
        if let Some(vararg) = &args.vararg {
            if let Some(annotation) = &vararg.annotation {
                self.visit_expr(annotation);
            }
        }
        if let Some(kwarg) = &args.kwarg {
            if let Some(annotation) = &kwarg.annotation {
                self.visit_expr(annotation);
            }
        }
    }

    fn visit_pattern(&mut self, pattern: &ast::Pattern) {
        match pattern {
            ast::Pattern::MatchValue(node) => self.visit_expr(&node.value),
            ast::Pattern::MatchSingleton(_) => {}
            ast::Pattern::MatchSequence(node) => {
                for p in &node.patterns {
                    self.visit_pattern(p);
                }
            }
            ast::Pattern::MatchMapping(node) => {
                for key in &node.keys {
                    self.visit_expr(key);
                }
                for p in &node.patterns {
                    self.visit_pattern(p);
                }
            }
            ast::Pattern::MatchClass(node) => {
                self.visit_expr(&node.cls);
                for p in &node.patterns {
                    self.visit_pattern(p);
                }
                for p in &node.kwd_patterns {
                    self.visit_pattern(p);
                }
            }
            ast::Pattern::MatchStar(_) => {}
            ast::Pattern::MatchAs(node) => {
                if let Some(p) = &node.pattern {
                    self.visit_pattern(p);
                }
            }
            ast::Pattern::MatchOr(node) => {
                for p in &node.patterns {
                    self.visit_pattern(p);
                }
            }
        }
    }

    fn visit_expr(&mut self, expr: &ast::Expr) {
        match expr {
            ast::Expr::Call(node) => {
                // Only bare-name callees are checked; attribute chains and
                // calls through rebound names pass the guard.
                if let ast::Expr::Name(name) = node.func.as_ref() {
                    self.flag(name.id.as_str());
                }
                self.visit_expr(&node.func);
                for arg in &node.args {
                    self.visit_expr(arg);
                }
                for keyword in &node.keywords {
                    self.visit_expr(&keyword.value);
                }
            }
            ast::Expr::BoolOp(node) => {
                for value in &node.values {
                    self.visit_expr(value);
                }
            }
            ast::Expr::NamedExpr(node) => {
                self.visit_expr(&node.target);
                self.visit_expr(&node.value);
            }
            ast::Expr::BinOp(node) => {
                self.visit_expr(&node.left);
                self.visit_expr(&node.right);
            }
            ast::Expr::UnaryOp(node) => self.visit_expr(&node.operand),
            ast::Expr::Lambda(node) => {
                self.visit_arguments(&node.args);
                self.visit_expr(&node.body);
            }
            ast::Expr::IfExp(node) => {
                self.visit_expr(&node.test);
                self.visit_expr(&node.body);
                self.visit_expr(&node.orelse);
            }
            ast::Expr::Dict(node) => {
                for key in node.keys.iter().flatten() {
                    self.visit_expr(key);
                }
                for value in &node.values {
                    self.visit_expr(value);
                }
            }
            ast::Expr::Set(node) => {
                for elt in &node.elts {
                    self.visit_expr(elt);
                }
            }
            ast::Expr::ListComp(node) => {
                self.visit_expr(&node.elt);
                self.visit_comprehensions(&node.generators);
            }
            ast::Expr::SetComp(node) => {
                self.visit_expr(&node.elt);
                self.visit_comprehensions(&node.generators);
            }
            ast::Expr::DictComp(node) => {
                self.visit_expr(&node.key);
                self.visit_expr(&node.value);
                self.visit_comprehensions(&node.generators);
            }
            ast::Expr::GeneratorExp(node) => {
                self.visit_expr(&node.elt);
                self.visit_comprehensions(&node.generators);
            }
            ast::Expr::Await(node) => self.visit_expr(&node.value),
            ast::Expr::Yield(node) => {
                if let Some(value) = &node.value {
                    self.visit_expr(value);
                }
            }
            ast::Expr::YieldFrom(node) => self.visit_expr(&node.value),
            ast::Expr::Compare(node) => {
                self.visit_expr(&node.left);
                for comparator in &node.comparators {
                    self.visit_expr(comparator);
                }
            }
            ast::Expr::FormattedValue(node) => {
                self.visit_expr(&node.value);
                if let Some(spec) = &node.format_spec {
                    self.visit_expr(spec);
                }
            }
            ast::Expr::JoinedStr(node) => {
                for value in &node.values {
                    self.visit_expr(value);
                }
            }
            ast::Expr::Attribute(node) => self.visit_expr(&node.value),
            ast::Expr::Subscript(node) => {
                self.visit_expr(&node.value);
                self.visit_expr(&node.slice);
            }
            ast::Expr::Starred(node) => self.visit_expr(&node.value),
            ast::Expr::List(node) => {
                for elt in &node.elts {
                    self.visit_expr(elt);
                }
            }
            ast::Expr::Tuple(node) => {
                for elt in &node.elts {
                    self.visit_expr(elt);
                }
            }
            ast::Expr::Slice(node) => {
                if let Some(lower) = &node.lower {
                    self.visit_expr(lower);
                }
                if let Some(upper) = &node.upper {
                    self.visit_expr(upper);
                }
                if let Some(step) = &node.step {
                    self.visit_expr(step);
                }
            }
            ast::Expr::Constant(_) | ast::Expr::Name(_) => {}
        }
    }

    fn visit_comprehensions(&mut self, generators: &[ast::Comprehension]) {
        for comp in generators {
            self.visit_expr(&comp.target);
            self.visit_expr(&comp.iter);
            for cond in &comp.ifs {
                self.visit_expr(cond);
            }
        }
    }
}
