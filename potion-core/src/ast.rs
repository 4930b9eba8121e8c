/// Root of a compilation unit: the top-level statements in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub statements: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    ValBinding(Binding),
    VarBinding(Binding),
    FunctionDef(FunctionDef),
    FunctionCall(Call),
    Identifier(String),
    LiteralInt(i64),
    LiteralString(String),
    LiteralBool(bool),
    NoneLiteral,
    BinaryOp {
        op: BinaryOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
    IfExpr {
        condition: Box<Node>,
        then_body: Vec<Node>,
        else_body: Option<Vec<Node>>,
    },
    ReturnStmt(Box<Node>),
    Print(Box<Node>),
    MapLiteral(Vec<(String, Node)>),
    SendExpr {
        target: Box<Node>,
        message: Box<Node>,
    },
    SpawnExpr(Call),
    MatchExpr {
        value: Box<Node>,
        clauses: Vec<MatchClause>,
    },
    ReceiveBlock {
        binding: String,
        body: Vec<Node>,
    },
}

/// `val name[: annotation] = value` or `var name = value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub annotation: Option<String>,
    pub value: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchClause {
    pub pattern: Node,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
}

impl BinaryOperator {
    /// The operator as written in Potion source.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Eq => "==",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
            BinaryOperator::LessEq => "<=",
            BinaryOperator::GreaterEq => ">=",
        }
    }
}

impl Node {
    /// Short description of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::ValBinding(_) => "val binding",
            Node::VarBinding(_) => "var binding",
            Node::FunctionDef(_) => "function definition",
            Node::FunctionCall(_) => "function call",
            Node::Identifier(_) => "identifier",
            Node::LiteralInt(_) => "integer literal",
            Node::LiteralString(_) => "string literal",
            Node::LiteralBool(_) => "boolean literal",
            Node::NoneLiteral => "none",
            Node::BinaryOp { .. } => "binary operation",
            Node::IfExpr { .. } => "if expression",
            Node::ReturnStmt(_) => "return statement",
            Node::Print(_) => "print call",
            Node::MapLiteral(_) => "map literal",
            Node::SendExpr { .. } => "send expression",
            Node::SpawnExpr(_) => "spawn expression",
            Node::MatchExpr { .. } => "match expression",
            Node::ReceiveBlock { .. } => "receive block",
        }
    }
}
