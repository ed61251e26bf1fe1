//! Type Oracle port: the language frontend boundary.
//!
//! The resolver and extractor never look at source text. They ask a
//! [`TypeOracle`] for declarations, classes and initializers, expressed in
//! the small syntax model defined here. A [`Frontend`] turns a set of
//! source units into an oracle; the live TypeScript frontend lives in
//! `adapters::live::typescript`.

use std::fmt;
use std::path::PathBuf;

use crate::error::Result;
use crate::structure::Literal;

/// Identity of a source unit (the path it was read from).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub String);

impl UnitId {
    /// Builds a unit id from any string-like path.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A source unit handed to a [`Frontend`].
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Unit identity.
    pub id: UnitId,
    /// Full source text.
    pub text: String,
}

impl SourceUnit {
    /// Creates a unit from a path and its text.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path: PathBuf = path.into();
        Self { id: UnitId::new(path.to_string_lossy().into_owned()), text: text.into() }
    }
}

/// A declared type as written at a use site.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// Built-in keyword type (`string`, `number`, `boolean`, `any`, ...).
    Keyword(String),
    /// Named reference with optional type arguments.
    Reference {
        /// Referenced name.
        name: String,
        /// Type arguments in declaration order.
        args: Vec<TypeExpr>,
    },
    /// `T[]`.
    Array(Box<TypeExpr>),
    /// String or numeric literal type.
    Literal(Literal),
    /// Inline object type `{ a: string }`.
    Object(Vec<MemberDecl>),
    /// Anything the model does not capture, as raw source text.
    Other(String),
}

impl TypeExpr {
    /// Shorthand for an argument-less reference.
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference { name: name.into(), args: Vec::new() }
    }

    /// Shorthand for a keyword type.
    pub fn keyword(name: impl Into<String>) -> Self {
        Self::Keyword(name.into())
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(name) | Self::Other(name) => f.write_str(name),
            Self::Reference { name, args } if args.is_empty() => f.write_str(name),
            Self::Reference { name, args } => {
                let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{name}<{}>", args.join(", "))
            }
            Self::Array(elem) => write!(f, "{elem}[]"),
            Self::Literal(Literal::String(s)) => write!(f, "'{s}'"),
            Self::Literal(Literal::Number(n)) => write!(f, "{n}"),
            Self::Object(members) => {
                f.write_str("{ ")?;
                for member in members {
                    match member {
                        MemberDecl::Property { name, ty: Some(ty) } => write!(f, "{name}: {ty}; ")?,
                        MemberDecl::Property { name, ty: None } => write!(f, "{name}; ")?,
                        MemberDecl::Index { ty } => write!(f, "[key: string]: {ty}; ")?,
                    }
                }
                f.write_str("}")
            }
        }
    }
}

/// A member of an interface body or inline object type.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberDecl {
    /// `name: type` (type may be omitted).
    Property {
        /// Property name.
        name: String,
        /// Declared type, if any.
        ty: Option<TypeExpr>,
    },
    /// `[key: K]: type`.
    Index {
        /// Indexed value type.
        ty: TypeExpr,
    },
}

/// An interface declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    /// Declaring unit.
    pub unit: UnitId,
    /// Interface name.
    pub name: String,
    /// Type-parameter names in order.
    pub generics: Vec<String>,
    /// Types listed in the (single) extends clause.
    pub heritage: Vec<TypeExpr>,
    /// Body members in order.
    pub members: Vec<MemberDecl>,
}

/// A type alias declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasDecl {
    /// Declaring unit.
    pub unit: UnitId,
    /// Alias name.
    pub name: String,
    /// Type-parameter names in order.
    pub generics: Vec<String>,
    /// Aliased type.
    pub target: TypeExpr,
}

/// What a name resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// An interface.
    Interface(InterfaceDecl),
    /// A type alias.
    Alias(AliasDecl),
    /// Some other declaration (class, enum, ...) that has no shape.
    Other {
        /// Text to keep in place of the type.
        text: String,
    },
}

/// A type parameter of a method.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    /// Parameter name.
    pub name: String,
    /// Default type, if declared.
    pub default: Option<TypeExpr>,
}

/// A class declaration and its methods.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// Declaring unit.
    pub unit: UnitId,
    /// Class name.
    pub name: String,
    /// Declared methods in order.
    pub methods: Vec<MethodDecl>,
}

/// A method declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    /// Method name.
    pub name: String,
    /// Declared type parameters.
    pub type_params: Vec<TypeParam>,
    /// Body statements in order.
    pub body: Vec<Statement>,
}

impl MethodDecl {
    /// Call expressions reachable through top-level expression statements,
    /// `return` statements and every `if`/`else if`/`else` branch, in
    /// source order. Conditions are not evaluated.
    #[must_use]
    pub fn call_sites(&self) -> Vec<&CallExpr> {
        let mut calls = Vec::new();
        collect_calls(&self.body, &mut calls);
        calls
    }
}

fn collect_calls<'a>(statements: &'a [Statement], out: &mut Vec<&'a CallExpr>) {
    for statement in statements {
        match statement {
            Statement::Expression(Expr::Call(call)) | Statement::Return(Some(Expr::Call(call))) => {
                out.push(call);
            }
            Statement::If { consequence, alternative } => {
                collect_calls(consequence, out);
                if let Some(alternative) = alternative {
                    collect_calls(alternative, out);
                }
            }
            Statement::Expression(_) | Statement::Return(_) | Statement::Other => {}
        }
    }
}

/// A statement inside a method body.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Expression statement.
    Expression(Expr),
    /// `return expr?`.
    Return(Option<Expr>),
    /// `if` with its branches. An `else if` is an alternative holding one `If`.
    If {
        /// Statements of the then-branch.
        consequence: Vec<Statement>,
        /// Statements of the else-branch, if any.
        alternative: Option<Vec<Statement>>,
    },
    /// Anything else (declarations, loops, ...).
    Other,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A call, possibly chained.
    Call(Box<CallExpr>),
    /// Identifier or member chain, e.g. `["this", "api", "normal"]`.
    Path(Vec<String>),
    /// String literal with quotes removed.
    String(String),
    /// Anything else, as raw text.
    Other(String),
}

/// A call expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// What is being called.
    pub callee: Callee,
    /// Explicit type arguments.
    pub type_args: Vec<TypeExpr>,
    /// Value arguments.
    pub args: Vec<Expr>,
}

impl CallExpr {
    /// The innermost call of a chain such as `a.get(url).then(f).then(g)`.
    #[must_use]
    pub fn leaf(&self) -> &CallExpr {
        let mut call = self;
        while let Callee::Member { object, .. } = &call.callee {
            match object.as_ref() {
                Expr::Call(inner) => call = inner.as_ref(),
                _ => break,
            }
        }
        call
    }
}

/// The callee of a call expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    /// `object.property(...)`.
    Member {
        /// Receiver expression (may itself be a call for chains).
        object: Box<Expr>,
        /// Called member name.
        property: String,
    },
    /// `name(...)`.
    Function(String),
}

impl Callee {
    /// The called name, regardless of receiver.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Member { property, .. } => property,
            Self::Function(name) => name,
        }
    }
}

/// The response container a request helper wraps payloads in.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerType {
    /// Unit declaring the helper.
    pub unit: UnitId,
    /// Type-parameter names of the helper, in scope inside `ty`.
    pub scope: Vec<String>,
    /// Default of the helper's second type parameter.
    pub ty: TypeExpr,
}

/// Answers declaration and symbol questions about a parsed source set.
pub trait TypeOracle: Send + Sync {
    /// Every class declared in the source set, in unit order.
    fn classes(&self) -> &[ClassDecl];

    /// Resolves a type name as seen from `from`.
    fn declaration(&self, from: &UnitId, name: &str) -> Option<Declaration>;

    /// Resolves `object.member` to the string literal it was initialized
    /// with (enum members, object-literal properties).
    fn string_initializer(&self, from: &UnitId, object: &[String], member: &str)
        -> Option<String>;

    /// Finds the container default of the request helper that `call`
    /// delegates to.
    fn request_container(&self, from: &UnitId, call: &CallExpr) -> Option<ContainerType>;
}

/// Loads source units into a [`TypeOracle`].
pub trait Frontend: Send + Sync {
    /// Parses all units into an oracle.
    ///
    /// # Errors
    ///
    /// Returns an error if the frontend itself cannot be initialized.
    /// Individual units that fail to parse are skipped.
    fn load(&self, units: Vec<SourceUnit>) -> Result<Box<dyn TypeOracle>>;
}
