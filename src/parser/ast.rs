// AST (Abstract Syntax Tree) definitions for the traced JavaScript subset

/// Source location information for error reporting and trace lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Where a node came from.
///
/// The instrumenter only rewrites [`Origin::Source`] nodes. A node it has
/// already rewritten becomes [`Origin::Instrumented`], and everything it
/// creates is [`Origin::Synthesized`], so a second pass over the output
/// finds nothing to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Parsed from the input, not yet rewritten
    Source(SourceLocation),
    /// Parsed from the input, already rewritten
    Instrumented(SourceLocation),
    /// Created by the instrumenter
    Synthesized,
}

impl Origin {
    /// Location in the original text, if the node came from it
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            Origin::Source(loc) | Origin::Instrumented(loc) => Some(*loc),
            Origin::Synthesized => None,
        }
    }

    pub fn line(&self) -> Option<usize> {
        self.location().map(|loc| loc.line)
    }

    pub fn is_source(&self) -> bool {
        matches!(self, Origin::Source(_))
    }

    pub fn is_synthesized(&self) -> bool {
        matches!(self, Origin::Synthesized)
    }

    /// The origin a source node takes once a rule has rewritten it.
    /// Other origins are returned unchanged.
    pub fn instrumented(self) -> Self {
        match self {
            Origin::Source(loc) => Origin::Instrumented(loc),
            other => other,
        }
    }
}

/// Declaration keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Lt,
    Le,
    Gt,
    Ge,
    // Equality
    Eq,
    Ne,
    StrictEq,
    StrictNe,
}

impl BinOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::StrictEq => "===",
            BinOp::StrictNe => "!==",
        }
    }
}

/// Short-circuiting operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,    // !x
    Neg,    // -x
    Plus,   // +x
    TypeOf, // typeof x
}

impl UnOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnOp::Not => "!",
            UnOp::Neg => "-",
            UnOp::Plus => "+",
            UnOp::TypeOf => "typeof ",
        }
    }
}

/// `++` / `--`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

impl UpdateOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
        }
    }
}

/// Assignment operators. `Assign` is plain `=`, the rest are compound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
        }
    }

    /// The binary operator a compound assignment applies
    pub fn binary_op(&self) -> Option<BinOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinOp::Add),
            AssignOp::SubAssign => Some(BinOp::Sub),
            AssignOp::MulAssign => Some(BinOp::Mul),
            AssignOp::DivAssign => Some(BinOp::Div),
            AssignOp::ModAssign => Some(BinOp::Mod),
        }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub rest: bool, // ...name
}

/// One `name = init` inside a variable declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: String,
    pub init: Option<Expr>,
}

/// Object literal entry
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    KeyValue {
        key: String,
        value: Expr,
        shorthand: bool, // `{ a }` rather than `{ a: a }`
    },
    Spread(Expr),
}

/// The part after `.` or inside `[...]`
#[derive(Debug, Clone, PartialEq)]
pub enum MemberProperty {
    Named(String),
    Computed(Box<Expr>),
}

/// Function body: a block, or a single expression for concise arrows
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Block(Vec<Stmt>),
    Expression(Box<Expr>),
}

/// Function declaration, expression or arrow
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: FunctionBody,
    pub is_arrow: bool,
    /// Origin of the body's opening brace (or of the expression body)
    pub body_origin: Origin,
    pub origin: Origin,
}

impl Function {
    /// Names bound as parameters in the function's top-level scope, in
    /// declaration order
    pub fn param_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(self.params.len());
        for param in &self.params {
            if !names.contains(&param.name) {
                names.push(param.name.clone());
            }
        }
        names
    }

    /// Statements of a block body (empty for concise arrows)
    pub fn statements(&self) -> &[Stmt] {
        match &self.body {
            FunctionBody::Block(stmts) => stmts,
            FunctionBody::Expression(_) => &[],
        }
    }
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl {
        kind: VarKind,
        declarators: Vec<Declarator>,
        origin: Origin,
    },
    FunctionDecl {
        function: Function,
        origin: Origin,
    },
    Expression {
        expr: Expr,
        origin: Origin,
    },
    Return {
        argument: Option<Expr>,
        origin: Origin,
    },
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
        origin: Origin,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
        origin: Origin,
    },
    DoWhile {
        body: Box<Stmt>,
        test: Expr,
        origin: Origin,
    },
    For {
        init: Option<Box<Stmt>>, // VarDecl or Expression
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
        origin: Origin,
    },
    Block {
        body: Vec<Stmt>,
        origin: Origin,
    },
    Break {
        origin: Origin,
    },
    Continue {
        origin: Origin,
    },
    Empty {
        origin: Origin,
    },
}

impl Stmt {
    /// Get the origin of this statement
    pub fn origin(&self) -> &Origin {
        match self {
            Stmt::VarDecl { origin, .. }
            | Stmt::FunctionDecl { origin, .. }
            | Stmt::Expression { origin, .. }
            | Stmt::Return { origin, .. }
            | Stmt::If { origin, .. }
            | Stmt::While { origin, .. }
            | Stmt::DoWhile { origin, .. }
            | Stmt::For { origin, .. }
            | Stmt::Block { origin, .. }
            | Stmt::Break { origin }
            | Stmt::Continue { origin }
            | Stmt::Empty { origin } => origin,
        }
    }

    pub fn location(&self) -> Option<SourceLocation> {
        self.origin().location()
    }
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64, Origin),
    String(String, Origin),
    Bool(bool, Origin),
    Null(Origin),
    Identifier(String, Origin),
    Array {
        elements: Vec<Expr>,
        origin: Origin,
    },
    Object {
        properties: Vec<Property>,
        origin: Origin,
    },
    Function(Box<Function>),
    Unary {
        op: UnOp,
        argument: Box<Expr>,
        origin: Origin,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        argument: Box<Expr>,
        origin: Origin,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        origin: Origin,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
        origin: Origin,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
        origin: Origin,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
        origin: Origin,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        origin: Origin,
    },
    Member {
        object: Box<Expr>,
        property: MemberProperty,
        origin: Origin,
    },
    Sequence {
        expressions: Vec<Expr>,
        origin: Origin,
    },
    /// `...expr`; only valid inside array literals and call arguments
    Spread {
        argument: Box<Expr>,
        origin: Origin,
    },
}

impl Expr {
    /// Get the origin of this expression
    pub fn origin(&self) -> &Origin {
        match self {
            Expr::Number(_, origin)
            | Expr::String(_, origin)
            | Expr::Bool(_, origin)
            | Expr::Null(origin)
            | Expr::Identifier(_, origin) => origin,
            Expr::Function(function) => &function.origin,
            Expr::Array { origin, .. }
            | Expr::Object { origin, .. }
            | Expr::Unary { origin, .. }
            | Expr::Update { origin, .. }
            | Expr::Binary { origin, .. }
            | Expr::Logical { origin, .. }
            | Expr::Assign { origin, .. }
            | Expr::Conditional { origin, .. }
            | Expr::Call { origin, .. }
            | Expr::Member { origin, .. }
            | Expr::Sequence { origin, .. }
            | Expr::Spread { origin, .. } => origin,
        }
    }

    pub fn location(&self) -> Option<SourceLocation> {
        self.origin().location()
    }

    pub fn is_assignment(&self) -> bool {
        matches!(self, Expr::Assign { .. })
    }
}

/// What follows `export default`
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDefault {
    Function(Function),
    Expression(Expr),
}

/// Top-level item of a source unit
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleItem {
    Stmt(Stmt),
    ExportDefault {
        declaration: ExportDefault,
        origin: Origin,
    },
}

/// Top-level program structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub items: Vec<ModuleItem>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    /// All `export default` items, in source order
    pub fn default_exports(&self) -> impl Iterator<Item = (&ExportDefault, &Origin)> {
        self.items.iter().filter_map(|item| match item {
            ModuleItem::ExportDefault {
                declaration,
                origin,
            } => Some((declaration, origin)),
            ModuleItem::Stmt(_) => None,
        })
    }
}
