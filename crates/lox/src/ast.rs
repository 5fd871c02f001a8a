//! Syntax tree produced by the parser

pub mod printer;

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

/// Identity of an expression node.
///
/// The resolver records scope distances keyed by this id. Ids are unique
/// for the lifetime of the process so trees parsed by separate REPL lines
/// never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(usize);

impl ExprId {
    /// Allocate a fresh id.
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A literal appearing in source.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// `nil`
    Nil,
    /// `true` / `false`
    Bool(bool),
    /// Number literal
    Number(f64),
    /// String literal
    String(Rc<str>),
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// Unique node identity
    pub id: ExprId,

    /// What the expression is
    pub kind: ExprKind,
}

impl Expr {
    /// Wrap a kind with a fresh id.
    pub fn new(kind: ExprKind) -> Self {
        Self {
            id: ExprId::fresh(),
            kind,
        }
    }
}

/// The different kinds of expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// `name = value`
    Assign {
        /// Target variable
        name: Token,
        /// Assigned value
        value: Box<Expr>,
    },

    /// Arithmetic, comparison and equality operators
    Binary {
        /// Left operand
        left: Box<Expr>,
        /// Operator token
        operator: Token,
        /// Right operand
        right: Box<Expr>,
    },

    /// `callee(arguments)`
    Call {
        /// The called expression
        callee: Box<Expr>,
        /// Closing paren, for error lines
        paren: Token,
        /// Argument expressions
        arguments: Vec<Expr>,
    },

    /// `object.name`
    Get {
        /// Receiver
        object: Box<Expr>,
        /// Property name
        name: Token,
    },

    /// `( expr )`
    Grouping(Box<Expr>),

    /// A literal value
    Literal(LiteralValue),

    /// `and` / `or`
    Logical {
        /// Left operand
        left: Box<Expr>,
        /// Operator token
        operator: Token,
        /// Right operand
        right: Box<Expr>,
    },

    /// `object.name = value`
    Set {
        /// Receiver
        object: Box<Expr>,
        /// Field name
        name: Token,
        /// Assigned value
        value: Box<Expr>,
    },

    /// `super.method`
    Super {
        /// The `super` keyword
        keyword: Token,
        /// Method name
        method: Token,
    },

    /// `this`
    This(Token),

    /// `!` and unary `-`
    Unary {
        /// Operator token
        operator: Token,
        /// Operand
        right: Box<Expr>,
    },

    /// A variable reference
    Variable(Token),
}

/// A function or method declaration.
///
/// Shared by reference between the tree and every closure created from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    /// Function name
    pub name: Token,

    /// Parameter names
    pub params: Vec<Token>,

    /// Body statements
    pub body: Vec<Stmt>,
}

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `{ ... }`
    Block(Vec<Stmt>),

    /// `class Name < Superclass { methods }`
    Class {
        /// Class name
        name: Token,
        /// Optional superclass, always a `Variable` expression
        superclass: Option<Expr>,
        /// Method declarations
        methods: Vec<Rc<FunctionDecl>>,
    },

    /// An expression evaluated for its side effects
    Expression(Expr),

    /// `fun name(params) { body }`
    Function(Rc<FunctionDecl>),

    /// `if (condition) then else`
    If {
        /// Condition
        condition: Expr,
        /// Taken when the condition is truthy
        then_branch: Box<Stmt>,
        /// Taken otherwise
        else_branch: Option<Box<Stmt>>,
    },

    /// `print expr;`
    Print(Expr),

    /// `return value;`
    Return {
        /// The `return` keyword, for error lines
        keyword: Token,
        /// Returned value, `nil` when absent
        value: Option<Expr>,
    },

    /// `var name = initializer;`
    Var {
        /// Variable name
        name: Token,
        /// Initial value, `nil` when absent
        initializer: Option<Expr>,
    },

    /// `while (condition) body`
    While {
        /// Loop condition
        condition: Expr,
        /// Loop body
        body: Box<Stmt>,
    },
}

impl Stmt {
    /// Line of the first token of the statement, when it can be found
    /// without evaluating anything.
    pub fn line(&self) -> Option<usize> {
        match self {
            Stmt::Block(stmts) => stmts.first().and_then(Stmt::line),
            Stmt::Class { name, .. } => Some(name.line),
            Stmt::Expression(expr) | Stmt::Print(expr) => expr.line(),
            Stmt::Function(decl) => Some(decl.name.line),
            Stmt::If { condition, .. } | Stmt::While { condition, .. } => condition.line(),
            Stmt::Return { keyword, .. } => Some(keyword.line),
            Stmt::Var { name, .. } => Some(name.line),
        }
    }
}

impl Expr {
    /// Line of a token inside the expression.
    pub fn line(&self) -> Option<usize> {
        match &self.kind {
            ExprKind::Assign { name, .. } => Some(name.line),
            ExprKind::Binary { operator, .. } | ExprKind::Logical { operator, .. } => {
                Some(operator.line)
            }
            ExprKind::Call { paren, .. } => Some(paren.line),
            ExprKind::Get { name, .. } | ExprKind::Set { name, .. } => Some(name.line),
            ExprKind::Grouping(inner) => inner.line(),
            ExprKind::Literal(_) => None,
            ExprKind::Super { keyword, .. } | ExprKind::This(keyword) => Some(keyword.line),
            ExprKind::Unary { operator, .. } => Some(operator.line),
            ExprKind::Variable(name) => Some(name.line),
        }
    }
}
