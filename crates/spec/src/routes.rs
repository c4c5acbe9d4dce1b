use serde::Serialize;
use syn::{Expr, ExprCall, ExprMethodCall, Lit, visit::Visit};

use crate::SourceUnit;

const METHODS: &[&str] = &[
    "get", "post", "put", "delete", "patch", "head", "options", "trace", "connect", "any",
];

/// A route registered with `Router::route`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSpec {
    /// The HTTP method, upper case. `ANY` for routes accepting every method.
    pub method: String,
    /// The path pattern.
    pub pattern: String,
    /// The handler path, or `{closure}` / `{expr}` for inline handlers.
    pub handler: String,
    /// The module registering the route.
    pub module: String,
    /// The line of the pattern literal.
    pub line: usize,
}

/// Lists the `.route("/path", get(handler).post(other))` calls of a source unit.
#[derive(Debug, Default, Clone, Copy)]
pub struct RouteCollector;

impl RouteCollector {
    /// Collects the routes of one unit, in source order.
    pub fn accept(&self, unit: &SourceUnit) -> Vec<RouteSpec> {
        let mut visitor = RouteVisitor {
            module: unit.module(),
            routes: Vec::new(),
        };

        visitor.visit_file(unit.file());
        visitor.routes
    }
}

struct RouteVisitor<'a> {
    module: &'a str,
    routes: Vec<RouteSpec>,
}

impl<'ast> Visit<'ast> for RouteVisitor<'_> {
    fn visit_expr_method_call(&mut self, call: &'ast ExprMethodCall) {
        // Receivers first, so chained routes come out in source order
        syn::visit::visit_expr_method_call(self, call);

        if call.method != "route" || call.args.len() != 2 {
            return;
        }

        let Some(Expr::Lit(pattern)) = call.args.first() else {
            return;
        };

        let Lit::Str(pattern) = &pattern.lit else {
            return;
        };

        let mut handlers = Vec::new();

        if let Some(method_router) = call.args.last() {
            method_handlers(method_router, &mut handlers);
        }

        if handlers.is_empty() {
            log::debug!("Route {} in {} has no recognizable handler", pattern.value(), self.module);
        }

        for (method, handler) in handlers {
            self.routes.push(RouteSpec {
                method: method.to_uppercase(),
                pattern: pattern.value(),
                handler,
                module: self.module.to_string(),
                line: pattern.span().start().line,
            });
        }
    }
}

/// Walks a method router such as `get(a).post(b)` into (method, handler) pairs.
fn method_handlers(expr: &Expr, handlers: &mut Vec<(String, String)>) {
    match expr {
        Expr::Call(ExprCall { func, args, .. }) => {
            let Expr::Path(func) = func.as_ref() else {
                return;
            };

            let Some(method) = func.path.segments.last().map(|segment| segment.ident.to_string()) else {
                return;
            };

            if let (true, Some(handler)) = (METHODS.contains(&method.as_str()), args.first()) {
                handlers.push((method, handler_name(handler)));
            }
        }
        Expr::MethodCall(call) => {
            method_handlers(&call.receiver, handlers);

            let method = call.method.to_string();

            if let (true, Some(handler)) = (METHODS.contains(&method.as_str()), call.args.first()) {
                handlers.push((method, handler_name(handler)));
            }
        }
        Expr::Paren(inner) => method_handlers(&inner.expr, handlers),
        _ => {}
    }
}

fn handler_name(handler: &Expr) -> String {
    match handler {
        Expr::Path(path) => path
            .path
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect::<Vec<_>>()
            .join("::"),
        Expr::Closure(_) | Expr::Async(_) => "{closure}".to_string(),
        _ => "{expr}".to_string(),
    }
}
