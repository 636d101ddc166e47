use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::token::Token;

/// The parsed form of a source file: a flat list of statements.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Let {
        token: Token,
        name: Identifier,
        value: Expression,
    },
    Return {
        token: Token,
        value: Expression,
    },
    /// A bare expression. The expression is absent when parsing it failed;
    /// evaluation treats that as Null so a broken statement cannot take the
    /// rest of the program down with it.
    Expression {
        token: Token,
        expression: Option<Expression>,
    },
    Comment {
        token: Token,
        text: String,
    },
    Nac(Arc<NacDefinition>),
}

#[derive(Debug, Clone)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub value: Expression,
    pub block: BlockStatement,
}

#[derive(Debug)]
pub struct FunctionLiteral {
    pub token: Token,
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
}

/// A `notaclass` definition. Fields are always private; methods carry their
/// own `public` flag. Method order is preserved for rendering.
#[derive(Debug)]
pub struct NacDefinition {
    pub token: Token,
    pub name: String,
    pub privacy_acknowledgement: Option<String>,
    pub fields: Vec<NacField>,
    pub methods: IndexMap<String, NacMethod>,
}

#[derive(Debug)]
pub struct NacField {
    pub name: String,
    pub public: bool,
}

#[derive(Debug, Clone)]
pub struct NacMethod {
    pub public: bool,
    pub function: Arc<FunctionLiteral>,
}

#[derive(Debug, Clone)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral {
        token: Token,
        value: i64,
    },
    StringLiteral {
        token: Token,
        value: String,
    },
    BooleanLiteral {
        token: Token,
        value: bool,
    },
    NullLiteral {
        token: Token,
    },
    Prefix {
        token: Token,
        operator: String,
        right: Box<Expression>,
    },
    Infix {
        token: Token,
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        token: Token,
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    Switch {
        token: Token,
        subject: Box<Expression>,
        cases: Vec<SwitchCase>,
        default: Option<BlockStatement>,
    },
    FunctionLiteral(Arc<FunctionLiteral>),
    Call {
        token: Token,
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Index {
        token: Token,
        left: Box<Expression>,
        index: Box<Expression>,
    },
    ArrayLiteral {
        token: Token,
        elements: Vec<Expression>,
    },
    HashLiteral {
        token: Token,
        pairs: Vec<(Expression, Expression)>,
    },
    New {
        token: Token,
        nac_name: String,
        arguments: Vec<Expression>,
    },
    MemberAccess {
        token: Token,
        left: Box<Expression>,
        member: String,
    },
    Lazy {
        token: Token,
        right: Arc<Expression>,
    },
}

impl Expression {
    /// The token the expression originated at, for diagnostics.
    pub fn token(&self) -> &Token {
        match self {
            Expression::Identifier(identifier) => &identifier.token,
            Expression::IntegerLiteral { token, .. } => token,
            Expression::StringLiteral { token, .. } => token,
            Expression::BooleanLiteral { token, .. } => token,
            Expression::NullLiteral { token } => token,
            Expression::Prefix { token, .. } => token,
            Expression::Infix { token, .. } => token,
            Expression::If { token, .. } => token,
            Expression::Switch { token, .. } => token,
            Expression::FunctionLiteral(function) => &function.token,
            Expression::Call { token, .. } => token,
            Expression::Index { token, .. } => token,
            Expression::ArrayLiteral { token, .. } => token,
            Expression::HashLiteral { token, .. } => token,
            Expression::New { token, .. } => token,
            Expression::MemberAccess { token, .. } => token,
            Expression::Lazy { token, .. } => token,
        }
    }
}

fn join<T: fmt::Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value, .. } => write!(f, "let {} = {};", name, value),
            Statement::Return { value, .. } => write!(f, "return {};", value),
            Statement::Expression { expression, .. } => match expression {
                Some(expression) => write!(f, "{}", expression),
                None => Ok(()),
            },
            Statement::Comment { text, .. } => write!(f, "// {}", text),
            Statement::Nac(definition) => write!(f, "{}", definition),
        }
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fn({}) {{ {} }}",
            join(&self.parameters, ", "),
            self.body
        )
    }
}

impl fmt::Display for NacDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut groups: Vec<String> = Vec::new();

        if let Some(acknowledgement) = &self.privacy_acknowledgement {
            groups.push(format!("\tpack \"{}\"", acknowledgement));
        }

        if !self.fields.is_empty() {
            let fields = self
                .fields
                .iter()
                .map(|field| format!("\tfield {}", field.name))
                .collect::<Vec<_>>()
                .join("\n");
            groups.push(fields);
        }

        if !self.methods.is_empty() {
            let methods = self
                .methods
                .iter()
                .map(|(name, method)| {
                    let visibility = if method.public { "public " } else { "" };
                    format!("\t{}{} {}", visibility, name, method.function)
                })
                .collect::<Vec<_>>()
                .join("\n");
            groups.push(methods);
        }

        write!(f, "notaclass {} {{\n{}\n}}", self.name, groups.join("\n\n"))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(identifier) => write!(f, "{}", identifier),
            Expression::IntegerLiteral { value, .. } => write!(f, "{}", value),
            Expression::StringLiteral { value, .. } => f.write_str(value),
            Expression::BooleanLiteral { value, .. } => write!(f, "{}", value),
            Expression::NullLiteral { .. } => f.write_str("NO!"),
            Expression::Prefix {
                operator, right, ..
            } => write!(f, "({}{})", operator, right),
            Expression::Infix {
                operator,
                left,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if{} {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, "else {}", alternative)?;
                }
                Ok(())
            }
            Expression::Switch {
                subject,
                cases,
                default,
                ..
            } => {
                write!(f, "switch {} {{", subject)?;
                for case in cases {
                    write!(f, " case {}: {{ {} }}", case.value, case.block)?;
                }
                if let Some(default) = default {
                    write!(f, " default: {}", default)?;
                }
                f.write_str("}")
            }
            Expression::FunctionLiteral(function) => write!(f, "{}", function),
            Expression::Call {
                function,
                arguments,
                ..
            } => write!(f, "{}({})", function, join(arguments, ", ")),
            Expression::Index { left, index, .. } => write!(f, "({}[{}])", left, index),
            Expression::ArrayLiteral { elements, .. } => {
                write!(f, "[{}]", join(elements, ", "))
            }
            Expression::HashLiteral { pairs, .. } => {
                let rendered = pairs
                    .iter()
                    .map(|(key, value)| format!("{}:{}", key, value))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{}}}", rendered)
            }
            Expression::New {
                nac_name,
                arguments,
                ..
            } => write!(f, "new {}({})", nac_name, join(arguments, ", ")),
            Expression::MemberAccess { left, member, .. } => write!(f, "{}.{}", left, member),
            Expression::Lazy { right, .. } => write!(f, "lazy({})", right),
        }
    }
}
