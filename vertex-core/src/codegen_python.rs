//! Python backend for Vertex.
//!
//! Walks the AST in program order and emits one line of Python per
//! statement. Expression types are recovered structurally while
//! emitting, which is also where the only static checks happen:
//! annotation mismatches, operands of `- * /`, undeclared names,
//! redeclarations and constant zero divisors.
//!
//! Parentheses are emitted only where Python's own precedence would
//! regroup the operands, so long left-leaning chains stay flat.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;

use crate::ast::{BinaryOp, Expr, ExprKind, Literal, Program, Stmt, StmtKind, UnaryOp};
use crate::builtins::{self, HelperKind};
use crate::error::CodegenError;
use crate::span::Position;
use crate::types::Type;

/// Knobs for the emitted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Emit a `# Generated by vertexc` comment as the first line.
    pub header: bool,
    /// Name of the source file, mentioned in the header.
    pub source_name: Option<String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            header: true,
            source_name: None,
        }
    }
}

/// A variable declared by the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub position: Position,
}

/// Generate Python source for `program` with default options.
pub fn generate(program: Program) -> Result<String, CodegenError> {
    Generator::new(GeneratorOptions::default()).generate(program)
}

/// Single-use code generator.
///
/// The namespace is flat: every declaration lands in one table and a
/// name may be declared once.
#[derive(Debug)]
pub struct Generator {
    options: GeneratorOptions,
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
    helpers: BTreeSet<HelperKind>,
}

/// Python's tokenizer rejects more brackets open at once than this.
pub const MAX_BRACKET_DEPTH: usize = 200;

/// How tightly emitted Python text binds, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Additive,
    Multiplicative,
    Prefix,
    Atom,
}

impl Precedence {
    fn of(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Add | BinaryOp::Sub => Precedence::Additive,
            BinaryOp::Mul | BinaryOp::Div => Precedence::Multiplicative,
        }
    }

    /// The next tighter level.
    fn tighter(self) -> Self {
        match self {
            Precedence::Additive => Precedence::Multiplicative,
            Precedence::Multiplicative => Precedence::Prefix,
            Precedence::Prefix | Precedence::Atom => Precedence::Atom,
        }
    }
}

/// Python text for an expression plus its Vertex type.
struct Emitted {
    code: String,
    ty: Type,
    precedence: Precedence,
    /// Brackets open at once inside `code`.
    brackets: usize,
}

impl Emitted {
    fn atom(code: String, ty: Type) -> Self {
        Emitted {
            code,
            ty,
            precedence: Precedence::Atom,
            brackets: 0,
        }
    }

    /// Parenthesize unless the text already binds at least as tightly
    /// as `min`.
    fn bound(self, min: Precedence) -> Self {
        if self.precedence >= min {
            return self;
        }
        Emitted {
            code: format!("({})", self.code),
            ty: self.ty,
            precedence: Precedence::Atom,
            brackets: self.brackets + 1,
        }
    }

    /// Operand of a concatenation; numbers are stringified here.
    fn stringified(self) -> Self {
        if !self.ty.is_numeric() {
            return self;
        }
        Emitted {
            code: format!("str({})", self.code),
            ty: Type::Str,
            precedence: Precedence::Atom,
            brackets: self.brackets + 1,
        }
    }
}

/// `lhs op rhs` for a left-associative Python operator.
fn infix(lhs: Emitted, symbol: &str, rhs: Emitted, precedence: Precedence, ty: Type) -> Emitted {
    let lhs = lhs.bound(precedence);
    let rhs = rhs.bound(precedence.tighter());
    Emitted {
        code: format!("{} {symbol} {}", lhs.code, rhs.code),
        ty,
        precedence,
        brackets: lhs.brackets.max(rhs.brackets),
    }
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        Generator {
            options,
            symbols: Vec::new(),
            index: HashMap::new(),
            helpers: BTreeSet::new(),
        }
    }

    /// Emit the whole program. Stops at the first error.
    pub fn generate(&mut self, program: Program) -> Result<String, CodegenError> {
        let mut body = Vec::with_capacity(program.statements.len());
        for stmt in program.statements {
            body.push(self.emit_stmt(stmt)?);
        }

        let mut out = String::new();
        if self.options.header {
            match &self.options.source_name {
                Some(name) => {
                    let _ = writeln!(out, "# Generated by vertexc from {name}");
                }
                None => out.push_str("# Generated by vertexc\n"),
            }
        }
        let used = builtins::HELPERS
            .iter()
            .filter(|helper| self.helpers.contains(&helper.kind));
        for helper in used {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(helper.definition);
        }
        if !self.helpers.is_empty() {
            out.push('\n');
        }
        for line in body {
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    /// Symbols declared so far, in declaration order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn into_symbols(self) -> Vec<Symbol> {
        self.symbols
    }

    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&i| &self.symbols[i])
    }

    fn declare(&mut self, symbol: Symbol) {
        self.index.insert(symbol.name.clone(), self.symbols.len());
        self.symbols.push(symbol);
    }

    fn emit_stmt(&mut self, stmt: Stmt) -> Result<String, CodegenError> {
        match stmt.kind {
            StmtKind::VariableDeclaration {
                name,
                name_position,
                declared_type,
                initializer,
            } => {
                if builtins::is_reserved_name(&name) {
                    return Err(CodegenError::ReservedName {
                        name,
                        position: name_position,
                    });
                }
                if let Some(previous) = self.lookup(&name) {
                    return Err(CodegenError::Redeclaration {
                        previous: previous.position,
                        name,
                        position: name_position,
                    });
                }

                let value = self.emit_expr(&initializer)?;
                check_brackets(value.brackets, initializer.position)?;
                if let Some(expected) = declared_type {
                    if expected != value.ty {
                        return Err(CodegenError::TypeMismatch {
                            expected,
                            found: value.ty,
                            position: initializer.position,
                        });
                    }
                }

                let line = format!("{name} = {}", value.code);
                self.declare(Symbol {
                    name,
                    ty: value.ty,
                    position: name_position,
                });
                Ok(line)
            }
            StmtKind::Print(expr) => {
                let value = self.emit_expr(&expr)?;
                check_brackets(value.brackets + 1, expr.position)?;
                Ok(format!("print({})", value.code))
            }
        }
    }

    fn emit_expr(&mut self, expr: &Expr) -> Result<Emitted, CodegenError> {
        match &expr.kind {
            ExprKind::Literal(literal) => {
                let code = match literal {
                    Literal::Int(value) => value.to_string(),
                    Literal::Str(value) => python_string_literal(value),
                };
                Ok(Emitted::atom(code, literal.ty()))
            }
            ExprKind::Identifier(name) => match self.lookup(name) {
                Some(symbol) => Ok(Emitted::atom(name.clone(), symbol.ty)),
                None => Err(CodegenError::UnknownIdentifier {
                    name: name.clone(),
                    position: expr.position,
                }),
            },
            ExprKind::Unary { op, operand } => {
                let value = self.emit_expr(operand)?;
                expect_numeric(&value, operand.position)?;
                let value = value.bound(Precedence::Prefix);
                Ok(Emitted {
                    code: format!("{}{}", op.symbol(), value.code),
                    ty: Type::Int,
                    precedence: Precedence::Prefix,
                    brackets: value.brackets,
                })
            }
            ExprKind::Binary { op, left, right } => {
                self.emit_binary(*op, left, right, expr.position)
            }
        }
    }

    fn emit_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        position: Position,
    ) -> Result<Emitted, CodegenError> {
        let lhs = self.emit_expr(left)?;
        let rhs = self.emit_expr(right)?;

        if op == BinaryOp::Add && !(lhs.ty.is_numeric() && rhs.ty.is_numeric()) {
            let (lhs, rhs) = (lhs.stringified(), rhs.stringified());
            return Ok(infix(lhs, "+", rhs, Precedence::Additive, Type::Str));
        }

        expect_numeric(&lhs, left.position)?;
        expect_numeric(&rhs, right.position)?;

        match op {
            BinaryOp::Div => {
                if constant_value(right) == Some(0) {
                    return Err(CodegenError::DivisionByZero { position });
                }
                self.helpers.insert(HelperKind::TruncatingDiv);
                let helper = HelperKind::TruncatingDiv.helper();
                Ok(Emitted {
                    code: format!("{}({}, {})", helper.name, lhs.code, rhs.code),
                    ty: Type::Int,
                    precedence: Precedence::Atom,
                    brackets: lhs.brackets.max(rhs.brackets) + 1,
                })
            }
            _ => Ok(infix(lhs, op.symbol(), rhs, Precedence::of(op), Type::Int)),
        }
    }
}

fn check_brackets(brackets: usize, position: Position) -> Result<(), CodegenError> {
    if brackets > MAX_BRACKET_DEPTH {
        return Err(CodegenError::TooManyBrackets {
            limit: MAX_BRACKET_DEPTH,
            position,
        });
    }
    Ok(())
}

fn expect_numeric(value: &Emitted, position: Position) -> Result<(), CodegenError> {
    if value.ty.is_numeric() {
        Ok(())
    } else {
        Err(CodegenError::TypeMismatch {
            expected: Type::Int,
            found: value.ty,
            position,
        })
    }
}

/// Value of an integer expression built only from literals.
///
/// Returns `None` for anything that depends on a variable, involves a
/// string, or overflows.
pub fn constant_value(expr: &Expr) -> Option<i64> {
    match &expr.kind {
        ExprKind::Literal(Literal::Int(value)) => Some(*value),
        ExprKind::Literal(Literal::Str(_)) | ExprKind::Identifier(_) => None,
        ExprKind::Unary { op, operand } => {
            let value = constant_value(operand)?;
            match op {
                UnaryOp::Plus => Some(value),
                UnaryOp::Minus => value.checked_neg(),
            }
        }
        ExprKind::Binary { op, left, right } => {
            let l = constant_value(left)?;
            let r = constant_value(right)?;
            match op {
                BinaryOp::Add => l.checked_add(r),
                BinaryOp::Sub => l.checked_sub(r),
                BinaryOp::Mul => l.checked_mul(r),
                BinaryOp::Div => l.checked_div(r),
            }
        }
    }
}

/// Quote `value` as a Python string literal.
///
/// `value` is the decoded string; every character in it is re-escaped
/// for Python as needed.
pub fn python_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn program(source: &str) -> Program {
        parse(tokenize(source)).expect("parse")
    }

    fn emit(source: &str) -> Result<String, CodegenError> {
        let options = GeneratorOptions {
            header: false,
            source_name: None,
        };
        Generator::new(options).generate(program(source))
    }

    #[test]
    fn emits_declarations_and_prints() {
        let python = emit("let name: string = \"NAME\"\nprint \"Hello, \" + name").unwrap();
        assert_eq!(python, "name = \"NAME\"\nprint(\"Hello, \" + name)\n");
    }

    #[test]
    fn stringifies_numeric_operand_of_concatenation() {
        let python = emit("let year: int = 2025\nprint \"It is currently \" + year").unwrap();
        assert!(python.contains("print(\"It is currently \" + str(year))"));
    }

    #[test]
    fn concatenation_binds_the_computed_sum() {
        let python = emit("let x: int = 10; let y: int = 5; print \"Sum: \" + (x + y)").unwrap();
        assert!(python.ends_with("print(\"Sum: \" + str(x + y))\n"));
    }

    #[test]
    fn unparenthesized_concatenation_stringifies_each_operand() {
        let python = emit("let x = 1\nprint \"a\" + x + x").unwrap();
        assert!(python.contains("print(\"a\" + str(x) + str(x))"));
    }

    #[test]
    fn preserves_precedence_through_parentheses() {
        let python = emit(
            "print 1 + 2 * 3\nprint (1 + 2) * 3\nprint 10 - (4 - 3)\nprint 2 * (3 * 4)\nprint (\"a\" + 1) + (\"b\" + 2)",
        )
        .unwrap();
        let lines: Vec<&str> = python.lines().collect();
        assert_eq!(lines[0], "print(1 + 2 * 3)");
        assert_eq!(lines[1], "print((1 + 2) * 3)");
        assert_eq!(lines[2], "print(10 - (4 - 3))");
        assert_eq!(lines[3], "print(2 * (3 * 4))");
        assert_eq!(lines[4], "print(\"a\" + str(1) + (\"b\" + str(2)))");
    }

    #[test]
    fn left_leaning_chains_stay_flat() {
        let python = emit("print 10 - 4 - 3 + 2 * 5 * 6").unwrap();
        assert_eq!(python, "print(10 - 4 - 3 + 2 * 5 * 6)\n");

        let terms = vec!["\"a\""; 300].join(" + ");
        let python = emit(&format!("print {terms}")).unwrap();
        assert_eq!(python.matches('(').count(), 1);
    }

    #[test]
    fn emits_prefix_operators() {
        let python = emit("let x = 3\nprint -x * 2 - -(x + 1)\nprint \"n\" + -x\nprint +x").unwrap();
        let lines: Vec<&str> = python.lines().collect();
        assert_eq!(lines[1], "print(-x * 2 - -(x + 1))");
        assert_eq!(lines[2], "print(\"n\" + str(-x))");
        assert_eq!(lines[3], "print(+x)");
    }

    #[test]
    fn prefix_operators_require_numbers() {
        let err = emit("print -\"a\"").unwrap_err();
        assert_eq!(
            err,
            CodegenError::TypeMismatch {
                expected: Type::Int,
                found: Type::Str,
                position: Position::new(1, 8),
            }
        );
    }

    #[test]
    fn rejects_output_with_too_many_brackets() {
        let divisions = vec!["1"; MAX_BRACKET_DEPTH + 1].join(" / ");
        let err = emit(&format!("print {divisions}")).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::TooManyBrackets { limit: MAX_BRACKET_DEPTH, .. }
        ));

        // `print(` is one of the brackets
        let divisions = vec!["1"; MAX_BRACKET_DEPTH].join(" / ");
        assert!(emit(&format!("print {divisions}")).is_ok());
        assert!(emit(&format!("let q = {divisions}")).is_ok());
    }

    #[test]
    fn division_uses_truncating_helper() {
        let python = emit("print 7 / 2").unwrap();
        assert!(python.starts_with(builtins::TRUNCATING_DIV.definition));
        assert!(python.ends_with("\nprint(_vx_div(7, 2))\n"));
    }

    #[test]
    fn helper_is_only_emitted_when_used() {
        let python = emit("print 7 * 2").unwrap();
        assert!(!python.contains("def _vx_div"));
    }

    #[test]
    fn header_names_the_source() {
        let options = GeneratorOptions {
            header: true,
            source_name: Some("hello.vx".into()),
        };
        let python = Generator::new(options)
            .generate(program("print 1"))
            .unwrap();
        assert_eq!(python, "# Generated by vertexc from hello.vx\nprint(1)\n");

        let python = generate(program("print 1")).unwrap();
        assert!(python.starts_with("# Generated by vertexc\n"));
    }

    #[test]
    fn records_symbols_with_inferred_types() {
        let mut generator = Generator::new(GeneratorOptions::default());
        generator
            .generate(program("let a = 1 + 2\nlet b = \"x\" + a\nlet c: int = a"))
            .unwrap();
        let symbols: Vec<(&str, Type)> = generator
            .symbols()
            .iter()
            .map(|s| (s.name.as_str(), s.ty))
            .collect();
        assert_eq!(
            symbols,
            vec![("a", Type::Int), ("b", Type::Str), ("c", Type::Int)]
        );
    }

    #[test]
    fn rejects_annotation_mismatch() {
        let err = emit("let x: int = \"five\"").unwrap_err();
        assert_eq!(
            err,
            CodegenError::TypeMismatch {
                expected: Type::Int,
                found: Type::Str,
                position: Position::new(1, 14),
            }
        );

        let err = emit("let n = 1\nlet s: string = n + 2").unwrap_err();
        assert!(matches!(
            err,
            CodegenError::TypeMismatch {
                expected: Type::Str,
                found: Type::Int,
                ..
            }
        ));
    }

    #[test]
    fn annotation_matching_is_exact() {
        let cases = [
            ("let a: int = 1", true),
            ("let a: int = 1 + 2 * 3", true),
            ("let a: string = \"s\"", true),
            ("let a: string = \"s\" + 1", true),
            ("let a: string = 1", false),
            ("let a: int = \"s\" + 1", false),
        ];
        for (source, ok) in cases {
            assert_eq!(emit(source).is_ok(), ok, "{source}");
        }
    }

    #[test]
    fn arithmetic_requires_numbers() {
        for source in ["print \"a\" - 1", "print 2 * \"b\"", "print \"a\" / \"b\""] {
            let err = emit(source).unwrap_err();
            assert!(
                matches!(err, CodegenError::TypeMismatch { expected: Type::Int, .. }),
                "{source}"
            );
        }
    }

    #[test]
    fn rejects_unknown_identifier() {
        let err = emit("print missing").unwrap_err();
        assert_eq!(
            err,
            CodegenError::UnknownIdentifier {
                name: "missing".into(),
                position: Position::new(1, 7),
            }
        );
    }

    #[test]
    fn declaration_is_not_visible_in_its_own_initializer() {
        let err = emit("let x = x + 1").unwrap_err();
        assert!(matches!(err, CodegenError::UnknownIdentifier { .. }));
    }

    #[test]
    fn rejects_redeclaration() {
        let err = emit("let x = 1\nlet x = 2").unwrap_err();
        assert_eq!(
            err,
            CodegenError::Redeclaration {
                name: "x".into(),
                position: Position::new(2, 5),
                previous: Position::new(1, 5),
            }
        );
    }

    #[test]
    fn rejects_constant_zero_divisor() {
        let err = emit("print 10 / 0").unwrap_err();
        assert_eq!(
            err,
            CodegenError::DivisionByZero {
                position: Position::new(1, 10)
            }
        );

        let err = emit("print 10 / (3 - 3)").unwrap_err();
        assert!(matches!(err, CodegenError::DivisionByZero { .. }));

        assert!(emit("let z = 0\nprint 10 / z").is_ok());
    }

    #[test]
    fn rejects_reserved_names() {
        for name in ["class", "str", "None", "_vx_div", "__debug__"] {
            let err = emit(&format!("let {name} = 1")).unwrap_err();
            assert!(
                matches!(err, CodegenError::ReservedName { .. }),
                "{name} gave {err:?}"
            );
        }
    }

    #[test]
    fn first_error_wins() {
        let err = emit("print a\nprint \"x\" - 1").unwrap_err();
        assert!(matches!(err, CodegenError::UnknownIdentifier { .. }));
    }

    #[test]
    fn quotes_strings_for_python() {
        assert_eq!(python_string_literal("plain"), "\"plain\"");
        assert_eq!(python_string_literal(r"C:\temp"), r#""C:\\temp""#);
        assert_eq!(python_string_literal("a\tb"), "\"a\\tb\"");
        assert_eq!(python_string_literal("\u{7}"), "\"\\u0007\"");
        assert_eq!(python_string_literal("héllo"), "\"héllo\"");
    }

    #[test]
    fn evaluates_constant_expressions() {
        let expr = |source: &str| match program(&format!("print {source}"))
            .statements
            .remove(0)
            .kind
        {
            StmtKind::Print(expr) => expr,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(constant_value(&expr("1 + 2 * 3")), Some(7));
        assert_eq!(constant_value(&expr("7 / 2")), Some(3));
        assert_eq!(constant_value(&expr("(1 - 8) / 2")), Some(-3));
        assert_eq!(constant_value(&expr("-(3 - 3) + +2")), Some(2));
        assert_eq!(constant_value(&expr("x + 1")), None);
        assert_eq!(constant_value(&expr("\"a\" + 1")), None);
    }

    #[test]
    fn codegen_errors_convert_into_core_errors() {
        let err: CoreError = emit("print nope").unwrap_err().into();
        assert_eq!(err.kind_name(), "UnknownIdentifier");
        assert_eq!(err.position(), Position::new(1, 7));
    }
}
