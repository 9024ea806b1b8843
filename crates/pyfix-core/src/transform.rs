//! One post-order traversal threading every rule over each node
//!
//! The walker rebuilds the tree bottom-up. At each dispatch node it clones
//! the node before descending, rewrites the children, then hands the node
//! through every rule's leave hook in registration order: each rule
//! receives the untouched original for matching and the running rewrite
//! for output. Removed statements are spliced out of their list with
//! their comment trivia re-attached to whatever follows.

use pyfix_cst::*;

use crate::report::RunContext;
use crate::rule::{Edit, Rule};

/// Run `rules` over a parsed module and return the rewritten tree.
pub fn transform_module(
    module: Module,
    rules: &mut [Box<dyn Rule>],
    ctx: &mut RunContext,
) -> Module {
    let mut walker = Walker { rules, ctx };
    let Module { body, mut eof } = module;
    let (body, leftover) = walker.statements(body);
    prepend_leading(&mut eof, leftover);
    Module { body, eof }
}

/// Outcome of rewriting one statement.
enum StmtEdit {
    Keep(Statement),
    /// The statement was removed; the string is the part of its leading
    /// trivia that survives (comments and blank lines, not indentation).
    Removed(String),
}

struct Walker<'r> {
    rules: &'r mut [Box<dyn Rule>],
    ctx: &'r mut RunContext,
}

impl Walker<'_> {
    // --- statement lists ---------------------------------------------

    /// Rewrite a statement list. Returns the survivors plus any trivia
    /// from removed statements at the tail, which the caller attaches to
    /// the next token after the list.
    fn statements(&mut self, body: Vec<Statement>) -> (Vec<Statement>, Option<String>) {
        let mut out = Vec::with_capacity(body.len());
        let mut pending = String::new();
        for stmt in body {
            let (edit, trailing) = self.statement(stmt);
            match edit {
                StmtEdit::Keep(mut kept) => {
                    if !pending.is_empty() {
                        let first = kept.first_token_mut();
                        first.leading = format!("{}{}", pending, first.leading);
                        pending.clear();
                    }
                    out.push(kept);
                }
                StmtEdit::Removed(trivia) => pending.push_str(&trivia),
            }
            if let Some(trailing) = trailing {
                pending.push_str(&trailing);
            }
        }
        let leftover = if pending.is_empty() { None } else { Some(pending) };
        (out, leftover)
    }

    fn statement(&mut self, stmt: Statement) -> (StmtEdit, Option<String>) {
        match stmt {
            Statement::Simple(line) => (self.simple_line(line), None),
            Statement::Compound(node) => {
                let (stmt, leftover) = self.compound(node);
                (StmtEdit::Keep(stmt), leftover)
            }
        }
    }

    fn simple_line(&mut self, line: SimpleStatementLine) -> StmtEdit {
        let SimpleStatementLine { body, newline } = line;
        let (kept, removed_leading) = self.splice_smalls(body);
        if kept.is_empty() {
            // The whole line went away. Keep comments and blank lines from
            // its leading trivia; the final indentation run goes with it.
            let leading = removed_leading.unwrap_or_default();
            let keep_to = leading.rfind('\n').map(|i| i + 1).unwrap_or(0);
            return StmtEdit::Removed(leading[..keep_to].to_string());
        }
        StmtEdit::Keep(Statement::Simple(SimpleStatementLine {
            body: kept,
            newline,
        }))
    }

    /// Rewrite a semicolon-separated small statement list, splicing out
    /// removals. When the leading statements are removed, the first
    /// survivor takes over the removed statement's leading trivia; when
    /// the trailing ones are, the last survivor loses its semicolon.
    /// Returns the survivors and, if nothing survived, the first
    /// statement's original leading trivia.
    fn splice_smalls(
        &mut self,
        body: Vec<SmallStatement>,
    ) -> (Vec<SmallStatement>, Option<String>) {
        let last_index = body.len().saturating_sub(1);
        let mut kept: Vec<SmallStatement> = Vec::with_capacity(body.len());
        let mut kept_last = false;
        let mut removed_leading: Option<String> = None;
        for (i, small) in body.into_iter().enumerate() {
            let leading_before = small.first_token().leading.clone();
            match self.small(small) {
                Edit::Node(mut node) => {
                    if kept.is_empty() {
                        if let Some(leading) = removed_leading.take() {
                            node.first_token_mut().leading = leading;
                        }
                    }
                    if i == last_index {
                        kept_last = true;
                    }
                    kept.push(node);
                }
                Edit::Remove => {
                    if kept.is_empty() && removed_leading.is_none() {
                        removed_leading = Some(leading_before);
                    }
                }
            }
        }
        if kept.is_empty() {
            return (kept, removed_leading);
        }
        if !kept_last {
            if let Some(last) = kept.last_mut() {
                last.set_semicolon(None);
            }
        }
        (kept, None)
    }

    fn small(&mut self, small: SmallStatement) -> Edit<SmallStatement> {
        match small {
            SmallStatement::Expr(mut s) => {
                s.value = self.expression(s.value);
                Edit::Node(SmallStatement::Expr(s))
            }
            SmallStatement::Assign(mut s) => {
                s.targets = s
                    .targets
                    .into_iter()
                    .map(|mut t| {
                        t.target = self.expression(t.target);
                        t
                    })
                    .collect();
                s.value = self.expression(s.value);
                Edit::Node(SmallStatement::Assign(s))
            }
            SmallStatement::AugAssign(mut s) => {
                let original = s.clone();
                s.target = self.expression(s.target);
                s.value = self.expression(s.value);
                let updated = SmallStatement::AugAssign(s);
                Edit::Node(self.chain_aug_assign(&original, updated))
            }
            SmallStatement::AnnAssign(mut s) => {
                s.target = self.expression(s.target);
                s.annotation = self.expression(s.annotation);
                s.value = s.value.map(|e| self.expression(e));
                Edit::Node(SmallStatement::AnnAssign(s))
            }
            SmallStatement::Return(mut s) => {
                s.value = s.value.map(|e| self.expression(e));
                Edit::Node(SmallStatement::Return(s))
            }
            SmallStatement::Raise(mut s) => {
                s.exc = s.exc.map(|e| self.expression(e));
                s.cause = s.cause.map(|mut c| {
                    c.value = self.expression(c.value);
                    c
                });
                Edit::Node(SmallStatement::Raise(s))
            }
            SmallStatement::Assert(mut s) => {
                s.test = self.expression(s.test);
                s.msg = s.msg.map(|e| self.expression(e));
                Edit::Node(SmallStatement::Assert(s))
            }
            SmallStatement::Del(mut s) => {
                s.target = self.expression(s.target);
                Edit::Node(SmallStatement::Del(s))
            }
            SmallStatement::Import(s) => {
                let original = s.clone();
                self.chain_import(&original, SmallStatement::Import(s))
            }
            SmallStatement::ImportFrom(s) => {
                let original = s.clone();
                self.chain_import_from(&original, SmallStatement::ImportFrom(s))
            }
            other @ (SmallStatement::Pass(_)
            | SmallStatement::Break(_)
            | SmallStatement::Continue(_)
            | SmallStatement::Global(_)
            | SmallStatement::Nonlocal(_)) => Edit::Node(other),
        }
    }

    // --- compound statements -----------------------------------------

    fn compound(&mut self, node: CompoundStatement) -> (Statement, Option<String>) {
        match node {
            CompoundStatement::FunctionDef(node) => {
                let (node, leftover) = self.function_def(node);
                (
                    Statement::Compound(CompoundStatement::FunctionDef(node)),
                    leftover,
                )
            }
            CompoundStatement::ClassDef(node) => {
                let (node, leftover) = self.class_def(node);
                (
                    Statement::Compound(CompoundStatement::ClassDef(node)),
                    leftover,
                )
            }
            CompoundStatement::If(node) => {
                let (node, leftover) = self.if_statement(node);
                (Statement::Compound(CompoundStatement::If(node)), leftover)
            }
            CompoundStatement::For(node) => self.for_statement(node),
            CompoundStatement::While(node) => {
                let (node, leftover) = self.while_statement(node);
                (Statement::Compound(CompoundStatement::While(node)), leftover)
            }
            CompoundStatement::Try(node) => {
                let (node, leftover) = self.try_statement(node);
                (Statement::Compound(CompoundStatement::Try(node)), leftover)
            }
            CompoundStatement::With(node) => {
                let (node, leftover) = self.with_statement(node);
                (Statement::Compound(CompoundStatement::With(node)), leftover)
            }
        }
    }

    fn function_def(&mut self, mut node: FunctionDef) -> (FunctionDef, Option<String>) {
        node.decorators = self.decorators(node.decorators);
        node.params = self.parameters(node.params);
        node.returns = node.returns.map(|mut r| {
            r.annotation = self.expression(r.annotation);
            r
        });
        let (body, leftover) = self.suite(node.body);
        node.body = body;
        (node, leftover)
    }

    fn class_def(&mut self, mut node: ClassDef) -> (ClassDef, Option<String>) {
        self.enter_class_def(&node);
        let original = node.clone();
        node.decorators = self.decorators(node.decorators);
        node.bases = node.bases.into_iter().map(|arg| self.arg(arg)).collect();
        let (body, leftover) = self.suite(node.body);
        node.body = body;
        (self.chain_class_def(&original, node), leftover)
    }

    fn if_statement(&mut self, mut node: If) -> (If, Option<String>) {
        node.test = self.expression(node.test);
        let (body, mut leftover) = self.suite(node.body);
        node.body = body;
        node.orelse = match node.orelse {
            Some(OrElse::Elif(elif)) => {
                let mut elif = *elif;
                prepend_leading(&mut elif.if_tok, leftover.take());
                let (elif, inner) = self.if_statement(elif);
                leftover = inner;
                Some(OrElse::Elif(Box::new(elif)))
            }
            Some(OrElse::Else(mut els)) => {
                prepend_leading(&mut els.else_tok, leftover.take());
                let (els, inner) = self.else_clause(els);
                leftover = inner;
                Some(OrElse::Else(els))
            }
            None => None,
        };
        (node, leftover)
    }

    fn for_statement(&mut self, mut node: For) -> (Statement, Option<String>) {
        let original = node.clone();
        node.target = self.expression(node.target);
        node.iter = self.expression(node.iter);
        let (body, mut leftover) = self.suite(node.body);
        node.body = body;
        node.orelse = match node.orelse {
            Some(mut els) => {
                prepend_leading(&mut els.else_tok, leftover.take());
                let (els, inner) = self.else_clause(els);
                leftover = inner;
                Some(els)
            }
            None => None,
        };
        let updated = Statement::Compound(CompoundStatement::For(node));
        (self.chain_for(&original, updated), leftover)
    }

    fn while_statement(&mut self, mut node: While) -> (While, Option<String>) {
        node.test = self.expression(node.test);
        let (body, mut leftover) = self.suite(node.body);
        node.body = body;
        node.orelse = match node.orelse {
            Some(mut els) => {
                prepend_leading(&mut els.else_tok, leftover.take());
                let (els, inner) = self.else_clause(els);
                leftover = inner;
                Some(els)
            }
            None => None,
        };
        (node, leftover)
    }

    fn try_statement(&mut self, mut node: Try) -> (Try, Option<String>) {
        let (body, mut leftover) = self.suite(node.body);
        node.body = body;
        let mut handlers = Vec::with_capacity(node.handlers.len());
        for mut handler in node.handlers {
            prepend_leading(&mut handler.except_tok, leftover.take());
            let original = handler.clone();
            handler.etype = handler.etype.map(|e| self.expression(e));
            let (hbody, hleft) = self.suite(handler.body);
            handler.body = hbody;
            leftover = hleft;
            handlers.push(self.chain_except_handler(&original, handler));
        }
        node.handlers = handlers;
        node.orelse = match node.orelse {
            Some(mut els) => {
                prepend_leading(&mut els.else_tok, leftover.take());
                let (els, inner) = self.else_clause(els);
                leftover = inner;
                Some(els)
            }
            None => None,
        };
        node.finalbody = match node.finalbody {
            Some(mut fin) => {
                prepend_leading(&mut fin.finally_tok, leftover.take());
                let (fbody, inner) = self.suite(fin.body);
                fin.body = fbody;
                leftover = inner;
                Some(fin)
            }
            None => None,
        };
        (node, leftover)
    }

    fn with_statement(&mut self, mut node: With) -> (With, Option<String>) {
        node.items = node
            .items
            .into_iter()
            .map(|mut item| {
                item.item = self.expression(item.item);
                item.as_clause = item.as_clause.map(|mut a| {
                    a.target = self.expression(a.target);
                    a
                });
                item
            })
            .collect();
        let (body, leftover) = self.suite(node.body);
        node.body = body;
        (node, leftover)
    }

    fn else_clause(&mut self, mut els: Else) -> (Else, Option<String>) {
        let (body, leftover) = self.suite(els.body);
        els.body = body;
        (els, leftover)
    }

    fn suite(&mut self, suite: Suite) -> (Suite, Option<String>) {
        match suite {
            Suite::Indented(block) => {
                let IndentedBlock { newline, body } = block;
                let (body, leftover) = self.statements(body);
                (Suite::Indented(IndentedBlock { newline, body }), leftover)
            }
            Suite::Simple(simple) => {
                let SimpleStatementSuite { body, newline } = simple;
                let (kept, _) = self.splice_smalls(body);
                (
                    Suite::Simple(SimpleStatementSuite {
                        body: kept,
                        newline,
                    }),
                    None,
                )
            }
        }
    }

    fn decorators(&mut self, decorators: Vec<Decorator>) -> Vec<Decorator> {
        decorators
            .into_iter()
            .map(|mut d| {
                d.expr = self.expression(d.expr);
                d
            })
            .collect()
    }

    fn parameters(&mut self, mut params: Parameters) -> Parameters {
        params.params = params
            .params
            .into_iter()
            .map(|mut param| {
                param.annotation = param.annotation.map(|e| self.expression(e));
                param.default = param.default.map(|e| self.expression(e));
                param
            })
            .collect();
        params
    }

    // --- expressions -------------------------------------------------

    fn expression(&mut self, expr: Expression) -> Expression {
        match expr {
            Expression::Name(_)
            | Expression::Integer(_)
            | Expression::Float(_)
            | Expression::Imaginary(_)
            | Expression::SimpleString(_)
            | Expression::ConcatenatedString(_)
            | Expression::EllipsisLiteral(_) => expr,
            Expression::Attribute(node) => {
                let mut node = *node;
                node.value = self.expression(node.value);
                Expression::Attribute(Box::new(node))
            }
            Expression::Call(node) => {
                let mut call = *node;
                let original = call.clone();
                call.func = self.expression(call.func);
                call.args = call.args.into_iter().map(|arg| self.arg(arg)).collect();
                let updated = Expression::Call(Box::new(call));
                self.chain_call(&original, updated)
            }
            Expression::Subscript(node) => {
                let mut node = *node;
                node.value = self.expression(node.value);
                node.index = match node.index {
                    BaseSlice::Index(expr) => BaseSlice::Index(Box::new(self.expression(*expr))),
                    BaseSlice::Slice(slice) => {
                        let mut slice = *slice;
                        slice.lower = slice.lower.map(|e| self.expression(e));
                        slice.upper = slice.upper.map(|e| self.expression(e));
                        slice.step = slice.step.map(|e| self.expression(e));
                        BaseSlice::Slice(Box::new(slice))
                    }
                };
                Expression::Subscript(Box::new(node))
            }
            Expression::UnaryOperation(node) => {
                let mut unary = *node;
                let original = unary.clone();
                unary.expr = self.expression(unary.expr);
                let updated = Expression::UnaryOperation(Box::new(unary));
                self.chain_unary(&original, updated)
            }
            Expression::BinaryOperation(node) => {
                let mut binary = *node;
                let original = binary.clone();
                binary.left = self.expression(binary.left);
                binary.right = self.expression(binary.right);
                let updated = Expression::BinaryOperation(Box::new(binary));
                self.chain_binary(&original, updated)
            }
            Expression::BooleanOperation(node) => {
                let mut node = *node;
                node.left = self.expression(node.left);
                node.right = self.expression(node.right);
                Expression::BooleanOperation(Box::new(node))
            }
            Expression::Comparison(node) => {
                let mut node = *node;
                node.left = self.expression(node.left);
                node.comparisons = node
                    .comparisons
                    .into_iter()
                    .map(|mut target| {
                        target.comparator = self.expression(target.comparator);
                        target
                    })
                    .collect();
                Expression::Comparison(Box::new(node))
            }
            Expression::IfExp(node) => {
                let mut node = *node;
                node.body = self.expression(node.body);
                node.test = self.expression(node.test);
                node.orelse = self.expression(node.orelse);
                Expression::IfExp(Box::new(node))
            }
            Expression::Lambda(node) => {
                let mut node = *node;
                node.params = self.parameters(node.params);
                node.body = self.expression(node.body);
                Expression::Lambda(Box::new(node))
            }
            Expression::Await(node) => {
                let mut node = *node;
                node.expr = self.expression(node.expr);
                Expression::Await(Box::new(node))
            }
            Expression::Yield(node) => {
                let mut node = *node;
                node.value = match node.value {
                    None => None,
                    Some(YieldValue::Expr(e)) => Some(YieldValue::Expr(self.expression(e))),
                    Some(YieldValue::From(mut from)) => {
                        from.expr = self.expression(from.expr);
                        Some(YieldValue::From(from))
                    }
                };
                Expression::Yield(Box::new(node))
            }
            Expression::Starred(node) => {
                let mut node = *node;
                node.expr = self.expression(node.expr);
                Expression::Starred(Box::new(node))
            }
            Expression::NamedExpr(node) => {
                let mut node = *node;
                node.target = self.expression(node.target);
                node.value = self.expression(node.value);
                Expression::NamedExpr(Box::new(node))
            }
            Expression::Parenthesized(node) => {
                let mut node = *node;
                node.expr = self.expression(node.expr);
                Expression::Parenthesized(Box::new(node))
            }
            Expression::Tuple(mut node) => {
                node.elements = self.elements(node.elements);
                Expression::Tuple(node)
            }
            Expression::List(mut node) => {
                node.elements = self.elements(node.elements);
                Expression::List(node)
            }
            Expression::Set(mut node) => {
                node.elements = self.elements(node.elements);
                Expression::Set(node)
            }
            Expression::Dict(mut node) => {
                node.elements = node
                    .elements
                    .into_iter()
                    .map(|element| self.dict_element(element))
                    .collect();
                Expression::Dict(node)
            }
            Expression::GeneratorExp(node) => {
                let mut node = *node;
                node.elt = self.expression(node.elt);
                node.for_in = self.comp_for(node.for_in);
                Expression::GeneratorExp(Box::new(node))
            }
            Expression::ListComp(node) => {
                let mut node = *node;
                node.elt = self.expression(node.elt);
                node.for_in = self.comp_for(node.for_in);
                Expression::ListComp(Box::new(node))
            }
            Expression::SetComp(node) => {
                let mut node = *node;
                node.elt = self.expression(node.elt);
                node.for_in = self.comp_for(node.for_in);
                Expression::SetComp(Box::new(node))
            }
            Expression::DictComp(node) => {
                let mut node = *node;
                node.key = self.expression(node.key);
                node.value = self.expression(node.value);
                node.for_in = self.comp_for(node.for_in);
                Expression::DictComp(Box::new(node))
            }
        }
    }

    fn arg(&mut self, mut arg: Arg) -> Arg {
        self.enter_arg(&arg);
        arg.value = self.expression(arg.value);
        self.leave_arg(&arg);
        arg
    }

    fn elements(&mut self, elements: Vec<Element>) -> Vec<Element> {
        elements
            .into_iter()
            .map(|mut element| {
                element.value = self.expression(element.value);
                element
            })
            .collect()
    }

    fn dict_element(&mut self, element: DictElement) -> DictElement {
        match element {
            DictElement::Simple {
                key,
                colon,
                value,
                comma,
            } => DictElement::Simple {
                key: self.expression(key),
                colon,
                value: self.expression(value),
                comma,
            },
            DictElement::Starred { star, value, comma } => DictElement::Starred {
                star,
                value: self.expression(value),
                comma,
            },
        }
    }

    fn comp_for(&mut self, mut node: CompFor) -> CompFor {
        node.target = self.expression(node.target);
        node.iter = self.expression(node.iter);
        node.ifs = node
            .ifs
            .into_iter()
            .map(|mut cond| {
                cond.test = self.expression(cond.test);
                cond
            })
            .collect();
        node.inner_for_in = node
            .inner_for_in
            .map(|inner| Box::new(self.comp_for(*inner)));
        node
    }

    // --- rule dispatch -----------------------------------------------

    fn enter_class_def(&mut self, node: &ClassDef) {
        for rule in self.rules.iter_mut() {
            rule.enter_class_def(node);
        }
    }

    fn enter_arg(&mut self, node: &Arg) {
        for rule in self.rules.iter_mut() {
            rule.enter_arg(node);
        }
    }

    fn leave_arg(&mut self, node: &Arg) {
        for rule in self.rules.iter_mut() {
            rule.leave_arg(node);
        }
    }

    fn chain_call(&mut self, original: &Call, mut current: Expression) -> Expression {
        let Walker { rules, ctx } = self;
        for rule in rules.iter_mut() {
            current = rule.leave_call(original, current, ctx);
        }
        current
    }

    fn chain_unary(&mut self, original: &UnaryOperation, mut current: Expression) -> Expression {
        let Walker { rules, ctx } = self;
        for rule in rules.iter_mut() {
            current = rule.leave_unary_operation(original, current, ctx);
        }
        current
    }

    fn chain_binary(&mut self, original: &BinaryOperation, mut current: Expression) -> Expression {
        let Walker { rules, ctx } = self;
        for rule in rules.iter_mut() {
            current = rule.leave_binary_operation(original, current, ctx);
        }
        current
    }

    fn chain_aug_assign(
        &mut self,
        original: &AugAssign,
        mut current: SmallStatement,
    ) -> SmallStatement {
        let Walker { rules, ctx } = self;
        for rule in rules.iter_mut() {
            current = rule.leave_aug_assign(original, current, ctx);
        }
        current
    }

    fn chain_import(&mut self, original: &Import, mut current: SmallStatement) -> Edit<SmallStatement> {
        let Walker { rules, ctx } = self;
        for rule in rules.iter_mut() {
            match rule.leave_import(original, current, ctx) {
                Edit::Node(node) => current = node,
                Edit::Remove => return Edit::Remove,
            }
        }
        Edit::Node(current)
    }

    fn chain_import_from(
        &mut self,
        original: &ImportFrom,
        mut current: SmallStatement,
    ) -> Edit<SmallStatement> {
        let Walker { rules, ctx } = self;
        for rule in rules.iter_mut() {
            match rule.leave_import_from(original, current, ctx) {
                Edit::Node(node) => current = node,
                Edit::Remove => return Edit::Remove,
            }
        }
        Edit::Node(current)
    }

    fn chain_class_def(&mut self, original: &ClassDef, mut current: ClassDef) -> ClassDef {
        let Walker { rules, ctx } = self;
        for rule in rules.iter_mut() {
            current = rule.leave_class_def(original, current, ctx);
        }
        current
    }

    fn chain_for(&mut self, original: &For, mut current: Statement) -> Statement {
        let Walker { rules, ctx } = self;
        for rule in rules.iter_mut() {
            current = rule.leave_for(original, current, ctx);
        }
        current
    }

    fn chain_except_handler(
        &mut self,
        original: &ExceptHandler,
        mut current: ExceptHandler,
    ) -> ExceptHandler {
        let Walker { rules, ctx } = self;
        for rule in rules.iter_mut() {
            current = rule.leave_except_handler(original, current, ctx);
        }
        current
    }
}

fn prepend_leading(tok: &mut Token, trivia: Option<String>) {
    if let Some(trivia) = trivia {
        if !trivia.is_empty() {
            tok.leading = format!("{}{}", trivia, tok.leading);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Renames calls to a bare name.
    struct RenameCall {
        rule: &'static str,
        from: &'static str,
        to: &'static str,
    }

    impl Rule for RenameCall {
        fn name(&self) -> &'static str {
            self.rule
        }

        fn description(&self) -> &'static str {
            "renames calls"
        }

        fn leave_call(
            &mut self,
            original: &Call,
            updated: Expression,
            ctx: &mut RunContext,
        ) -> Expression {
            match updated {
                Expression::Call(mut call) => {
                    let hit = matches!(&call.func, Expression::Name(name) if name.value() == self.from);
                    if hit {
                        if let Expression::Name(name) = &mut call.func {
                            name.tok.text = self.to.to_string();
                        }
                        ctx.mark(self.rule, original.span());
                    }
                    Expression::Call(call)
                }
                other => other,
            }
        }
    }

    /// Removes every plain `import` statement.
    struct DropImports;

    impl Rule for DropImports {
        fn name(&self) -> &'static str {
            "drop_imports"
        }

        fn description(&self) -> &'static str {
            "removes import statements"
        }

        fn leave_import(
            &mut self,
            original: &Import,
            _updated: SmallStatement,
            ctx: &mut RunContext,
        ) -> Edit<SmallStatement> {
            ctx.mark("drop_imports", original.span());
            Edit::Remove
        }
    }

    fn run(source: &str, mut rules: Vec<Box<dyn Rule>>) -> (String, RunContext) {
        let names: Vec<&'static str> = rules.iter().map(|r| r.name()).collect();
        let mut ctx = RunContext::new("test.py", source, &names);
        let module = parse_module(source).unwrap();
        let out = transform_module(module, &mut rules, &mut ctx);
        (out.code(), ctx)
    }

    #[test]
    fn test_no_rules_is_identity() {
        let source = "import os\n\n\ndef f(a, b=2):\n    # comment\n    return a + b\n";
        let (code, _) = run(source, vec![]);
        assert_eq!(code, source);
    }

    #[test]
    fn test_rules_thread_in_registration_order() {
        let a = Box::new(RenameCall {
            rule: "a",
            from: "f",
            to: "g",
        });
        let b = Box::new(RenameCall {
            rule: "b",
            from: "g",
            to: "h",
        });
        let (code, ctx) = run("x = f()\n", vec![a, b]);
        assert_eq!(code, "x = h()\n");
        assert_eq!(ctx.count_for("a"), 1);
        assert_eq!(ctx.count_for("b"), 1);
    }

    #[test]
    fn test_reversed_registration_changes_outcome() {
        let a = Box::new(RenameCall {
            rule: "a",
            from: "f",
            to: "g",
        });
        let b = Box::new(RenameCall {
            rule: "b",
            from: "g",
            to: "h",
        });
        let (code, _) = run("x = f()\n", vec![b, a]);
        assert_eq!(code, "x = g()\n");
    }

    /// Rewrites `wrap(...)` to `wrapped(...)` only when the argument was a
    /// `g(...)` call in the source, proving the hook sees the original
    /// child next to the already rewritten one.
    struct OuterSeesOriginal;

    impl Rule for OuterSeesOriginal {
        fn name(&self) -> &'static str {
            "outer"
        }

        fn description(&self) -> &'static str {
            "checks original children"
        }

        fn leave_call(
            &mut self,
            original: &Call,
            updated: Expression,
            ctx: &mut RunContext,
        ) -> Expression {
            let outer = matches!(&original.func, Expression::Name(name) if name.value() == "wrap");
            let arg_was_g = original.args.first().is_some_and(|arg| {
                matches!(&arg.value, Expression::Call(inner)
                    if matches!(&inner.func, Expression::Name(name) if name.value() == "g"))
            });
            match updated {
                Expression::Call(mut call) if outer && arg_was_g => {
                    let arg_now_h = call.args.first().is_some_and(|arg| {
                        matches!(&arg.value, Expression::Call(inner)
                            if matches!(&inner.func, Expression::Name(name) if name.value() == "h"))
                    });
                    assert!(arg_now_h);
                    if let Expression::Name(name) = &mut call.func {
                        name.tok.text = "wrapped".to_string();
                    }
                    ctx.mark("outer", original.span());
                    Expression::Call(call)
                }
                other => other,
            }
        }
    }

    #[test]
    fn test_leave_hook_pairs_original_with_rewritten() {
        let inner = Box::new(RenameCall {
            rule: "inner",
            from: "g",
            to: "h",
        });
        let (code, ctx) = run("wrap(g(1))\n", vec![inner, Box::new(OuterSeesOriginal)]);
        assert_eq!(code, "wrapped(h(1))\n");
        assert_eq!(ctx.count_for("outer"), 1);
    }

    #[test]
    fn test_removed_statement_keeps_leading_comment() {
        let source = "# keep me\nimport os\nx = 1\n";
        let (code, ctx) = run(source, vec![Box::new(DropImports)]);
        assert_eq!(code, "# keep me\nx = 1\n");
        assert_eq!(ctx.total(), 1);
    }

    #[test]
    fn test_removed_trailing_statement_keeps_comment_before_eof() {
        let source = "x = 1\n\n# about the import\nimport os\n";
        let (code, _) = run(source, vec![Box::new(DropImports)]);
        assert_eq!(code, "x = 1\n\n# about the import\n");
    }

    #[test]
    fn test_removed_indented_statement_drops_its_line() {
        let source = "def f():\n    import os\n    return 1\n";
        let (code, _) = run(source, vec![Box::new(DropImports)]);
        assert_eq!(code, "def f():\n    return 1\n");
    }

    #[test]
    fn test_removed_first_of_semicolon_list() {
        let source = "import os; x = 1\n";
        let (code, _) = run(source, vec![Box::new(DropImports)]);
        assert_eq!(code, "x = 1\n");
    }

    #[test]
    fn test_removed_last_of_semicolon_list_strips_semicolon() {
        let source = "x = 1; import os\n";
        let (code, _) = run(source, vec![Box::new(DropImports)]);
        assert_eq!(code, "x = 1\n");
    }

    #[test]
    fn test_removed_middle_of_semicolon_list() {
        let source = "x = 1; import os; y = 2\n";
        let (code, _) = run(source, vec![Box::new(DropImports)]);
        assert_eq!(code, "x = 1; y = 2\n");
    }

    #[test]
    fn test_consecutive_removals_accumulate_trivia() {
        let source = "# one\nimport os\n# two\nimport sys\nx = 1\n";
        let (code, _) = run(source, vec![Box::new(DropImports)]);
        assert_eq!(code, "# one\n# two\nx = 1\n");
    }

    #[test]
    fn test_removal_at_end_of_block_moves_trivia_past_block() {
        let source = "def f():\n    x = 1\n\n    # why os\n    import os\ny = 2\n";
        let (code, _) = run(source, vec![Box::new(DropImports)]);
        assert_eq!(code, "def f():\n    x = 1\n\n    # why os\ny = 2\n");
    }

    #[test]
    fn test_enter_and_leave_arg_wrap_each_argument() {
        struct CountArgs {
            entered: usize,
            left: usize,
        }

        impl Rule for CountArgs {
            fn name(&self) -> &'static str {
                "count_args"
            }

            fn description(&self) -> &'static str {
                "counts argument visits"
            }

            fn enter_arg(&mut self, _node: &Arg) {
                self.entered += 1;
            }

            fn leave_arg(&mut self, _node: &Arg) {
                self.left += 1;
                assert!(self.entered >= self.left);
            }

            fn leave_call(
                &mut self,
                original: &Call,
                updated: Expression,
                ctx: &mut RunContext,
            ) -> Expression {
                // Record the balance once at the outermost call.
                if matches!(&original.func, Expression::Name(name) if name.value() == "f") {
                    assert_eq!(self.entered, 3);
                    ctx.mark("count_args", original.span());
                }
                updated
            }
        }

        let rule = Box::new(CountArgs {
            entered: 0,
            left: 0,
        });
        let (_, ctx) = run("f(1, g(2))\n", vec![rule]);
        assert_eq!(ctx.count_for("count_args"), 1);
    }
}
