//! TypeScript frontend built on tree-sitter.
//!
//! Each unit is parsed once and lowered into the oracle's syntax model:
//! interfaces, aliases, classes with their method bodies, and every string
//! constant reachable through enum members, object literals or class
//! fields. Lookups prefer the requesting unit, then any unit; there is no
//! import graph.

use serde_json::Number;
use tracing::{debug, warn};
use tree_sitter::{Node, Parser};

use crate::error::{Error, Result};
use crate::ports::oracle::{
    AliasDecl, CallExpr, Callee, ClassDecl, ContainerType, Declaration, Expr, Frontend,
    InterfaceDecl, MemberDecl, MethodDecl, SourceUnit, Statement, TypeExpr, TypeOracle, TypeParam,
    UnitId,
};
use crate::structure::Literal;

/// Frontend parsing `.ts` sources with `tree-sitter-typescript`.
pub struct TypeScriptFrontend;

impl Frontend for TypeScriptFrontend {
    fn load(&self, units: Vec<SourceUnit>) -> Result<Box<dyn TypeOracle>> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .map_err(|e| Error::Parse(format!("failed to load TypeScript grammar: {e}")))?;

        let mut oracle = TypeScriptOracle::default();
        for unit in &units {
            let Some(tree) = parser.parse(&unit.text, None) else {
                warn!(unit = %unit.id, "parser produced no tree, skipping unit");
                continue;
            };
            let root = tree.root_node();
            if root.has_error() {
                warn!(unit = %unit.id, "syntax errors in unit, using what parsed");
            }
            Lowering { unit: &unit.id, src: unit.text.as_bytes(), oracle: &mut oracle }.program(root);
        }
        debug!(
            units = units.len(),
            classes = oracle.classes.len(),
            functions = oracle.functions.len(),
            declarations = oracle.declarations.len(),
            constants = oracle.constants.len(),
            "loaded TypeScript sources"
        );
        Ok(Box::new(oracle))
    }
}

struct Constant {
    unit: UnitId,
    path: Vec<String>,
    value: String,
}

/// A top-level function or arrow-function helper.
struct Function {
    unit: UnitId,
    decl: MethodDecl,
}

/// Oracle over a parsed TypeScript source set.
#[derive(Default)]
pub struct TypeScriptOracle {
    classes: Vec<ClassDecl>,
    functions: Vec<Function>,
    declarations: Vec<(UnitId, String, Declaration)>,
    constants: Vec<Constant>,
}

impl TypeScriptOracle {
    fn method<'c>(class: &'c ClassDecl, name: &str) -> Option<&'c MethodDecl> {
        class.methods.iter().find(|m| m.name == name)
    }

    fn function(&self, from: &UnitId, name: &str) -> Option<&Function> {
        let named = || self.functions.iter().filter(move |f| f.decl.name == name);
        named().find(|f| &f.unit == from).or_else(|| named().next())
    }

    /// The helper's own container: the default of its second type parameter.
    fn declared_container(unit: &UnitId, helper: &MethodDecl) -> Option<ContainerType> {
        let ty = helper.type_params.get(1)?.default.clone()?;
        Some(ContainerType {
            unit: unit.clone(),
            scope: helper.type_params.iter().map(|p| p.name.clone()).collect(),
            ty,
        })
    }

    /// Container of `verb`, declared on it or on the first helper it calls,
    /// either `this.helper(...)` within `class` or a top-level `helper(...)`.
    fn container_of(
        &self,
        unit: &UnitId,
        class: Option<&ClassDecl>,
        verb: &MethodDecl,
    ) -> Option<ContainerType> {
        if let Some(container) = Self::declared_container(unit, verb) {
            return Some(container);
        }
        verb.call_sites().into_iter().find_map(|call| match &call.leaf().callee {
            Callee::Member { object, property } if **object == Expr::Path(vec!["this".into()]) => {
                let helper = Self::method(class?, property)?;
                Self::declared_container(unit, helper)
            }
            Callee::Function(name) => {
                let helper = self.function(unit, name)?;
                Self::declared_container(&helper.unit, &helper.decl)
            }
            Callee::Member { .. } => None,
        })
    }
}

impl TypeOracle for TypeScriptOracle {
    fn classes(&self) -> &[ClassDecl] {
        &self.classes
    }

    fn declaration(&self, from: &UnitId, name: &str) -> Option<Declaration> {
        let named = || self.declarations.iter().filter(move |(_, n, _)| n == name);
        named()
            .find(|(unit, _, _)| unit == from)
            .or_else(|| named().next())
            .map(|(_, _, decl)| decl.clone())
    }

    fn string_initializer(&self, from: &UnitId, object: &[String], member: &str) -> Option<String> {
        let matches = |c: &&Constant| {
            c.path.len() == object.len() + 1
                && c.path[..object.len()] == *object
                && c.path[object.len()] == member
        };
        let found = || self.constants.iter().filter(matches);
        found()
            .find(|c| &c.unit == from)
            .or_else(|| found().next())
            .map(|c| c.value.clone())
    }

    fn request_container(&self, from: &UnitId, call: &CallExpr) -> Option<ContainerType> {
        let verb = call.callee.name();
        let receiver = match &call.callee {
            Callee::Member { object, .. } => match object.as_ref() {
                Expr::Path(path) => path.last().map(String::as_str),
                _ => None,
            },
            Callee::Function(_) => None,
        };

        let mut candidates: Vec<&ClassDecl> =
            self.classes.iter().filter(|c| Self::method(c, verb).is_some()).collect();
        // Receiver named like the class first, then the caller's own unit.
        candidates.sort_by_key(|c| {
            let named = receiver.is_some_and(|r| r.eq_ignore_ascii_case(&c.name));
            (!named, &c.unit != from)
        });
        let from_class = candidates.into_iter().find_map(|class| {
            Self::method(class, verb).and_then(|m| self.container_of(&class.unit, Some(class), m))
        });
        // A bare `get<T>(url)` may be a top-level verb function.
        from_class.or_else(|| match &call.callee {
            Callee::Function(name) => {
                let function = self.function(from, name)?;
                self.container_of(&function.unit, None, &function.decl)
            }
            Callee::Member { .. } => None,
        })
    }
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).filter(|child| child.kind() != "comment").collect()
}

fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last))
            if text.len() >= 2 && first == last && matches!(first, b'\'' | b'"' | b'`') =>
        {
            &text[1..text.len() - 1]
        }
        _ => text,
    }
}

fn parse_number(text: &str) -> Option<Number> {
    text.parse::<i64>().ok().map(Number::from).or_else(|| text.parse::<f64>().ok().and_then(Number::from_f64))
}

struct Lowering<'a> {
    unit: &'a UnitId,
    src: &'a [u8],
    oracle: &'a mut TypeScriptOracle,
}

impl Lowering<'_> {
    fn text(&self, node: Node<'_>) -> String {
        node.utf8_text(self.src).unwrap_or_default().to_string()
    }

    fn field_text(&self, node: Node<'_>, field: &str) -> Option<String> {
        node.child_by_field_name(field).map(|n| self.text(n))
    }

    fn program(&mut self, node: Node<'_>) {
        for child in named_children(node) {
            match child.kind() {
                "interface_declaration" => self.interface(child),
                "type_alias_declaration" => self.alias(child),
                "class_declaration" | "abstract_class_declaration" => self.class(child),
                "function_declaration" => {
                    if let Some(name) = self.field_text(child, "name") {
                        self.function(name, child);
                    }
                }
                "enum_declaration" => self.enumeration(child),
                "lexical_declaration" | "variable_declaration" => self.variables(child),
                "export_statement" | "ambient_declaration" => self.program(child),
                _ => {}
            }
        }
    }

    fn declare(&mut self, name: String, declaration: Declaration) {
        self.oracle.declarations.push((self.unit.clone(), name, declaration));
    }

    fn constant(&mut self, path: Vec<String>, value: String) {
        self.oracle.constants.push(Constant { unit: self.unit.clone(), path, value });
    }

    fn interface(&mut self, node: Node<'_>) {
        let Some(name) = self.field_text(node, "name") else { return };
        let heritage = named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "extends_type_clause")
            .flat_map(named_children)
            .map(|ty| self.type_expr(ty))
            .collect();
        let members = node.child_by_field_name("body").map(|body| self.members(body)).unwrap_or_default();
        let decl = InterfaceDecl {
            unit: self.unit.clone(),
            name: name.clone(),
            generics: self.generics(node),
            heritage,
            members,
        };
        self.declare(name, Declaration::Interface(decl));
    }

    fn alias(&mut self, node: Node<'_>) {
        let (Some(name), Some(value)) = (self.field_text(node, "name"), node.child_by_field_name("value"))
        else {
            return;
        };
        let decl = AliasDecl {
            unit: self.unit.clone(),
            name: name.clone(),
            generics: self.generics(node),
            target: self.type_expr(value),
        };
        self.declare(name, Declaration::Alias(decl));
    }

    fn generics(&self, node: Node<'_>) -> Vec<String> {
        self.type_params(node).into_iter().map(|p| p.name).collect()
    }

    fn type_params(&self, node: Node<'_>) -> Vec<TypeParam> {
        let Some(params) = node.child_by_field_name("type_parameters") else {
            return Vec::new();
        };
        named_children(params)
            .into_iter()
            .filter(|p| p.kind() == "type_parameter")
            .filter_map(|p| {
                let name = self.field_text(p, "name")?;
                let default = p
                    .child_by_field_name("value")
                    .and_then(|d| named_children(d).into_iter().next())
                    .map(|ty| self.type_expr(ty));
                Some(TypeParam { name, default })
            })
            .collect()
    }

    fn members(&self, body: Node<'_>) -> Vec<MemberDecl> {
        named_children(body)
            .into_iter()
            .filter_map(|member| match member.kind() {
                "property_signature" => {
                    let name = unquote(&self.field_text(member, "name")?).to_string();
                    let ty = member.child_by_field_name("type").map(|ann| self.annotation(ann));
                    Some(MemberDecl::Property { name, ty })
                }
                "index_signature" => {
                    let annotation = member.child_by_field_name("type").or_else(|| {
                        named_children(member).into_iter().rev().find(|c| c.kind().ends_with("type_annotation"))
                    })?;
                    Some(MemberDecl::Index { ty: self.annotation(annotation) })
                }
                _ => None,
            })
            .collect()
    }

    fn annotation(&self, node: Node<'_>) -> TypeExpr {
        if node.kind().ends_with("type_annotation") {
            match named_children(node).into_iter().next() {
                Some(ty) => self.type_expr(ty),
                None => TypeExpr::Other(self.text(node)),
            }
        } else {
            self.type_expr(node)
        }
    }

    fn type_expr(&self, node: Node<'_>) -> TypeExpr {
        match node.kind() {
            "predefined_type" => TypeExpr::Keyword(self.text(node)),
            "type_identifier" | "nested_type_identifier" | "identifier" => {
                TypeExpr::reference(self.text(node))
            }
            "generic_type" => {
                let name = self.field_text(node, "name").unwrap_or_default();
                let args: Vec<TypeExpr> = node
                    .child_by_field_name("type_arguments")
                    .map(|args| named_children(args).into_iter().map(|a| self.type_expr(a)).collect())
                    .unwrap_or_default();
                match (name.as_str(), args.as_slice()) {
                    ("Array", [elem]) => TypeExpr::Array(Box::new(elem.clone())),
                    _ => TypeExpr::Reference { name, args },
                }
            }
            "array_type" => match named_children(node).into_iter().next() {
                Some(elem) => TypeExpr::Array(Box::new(self.type_expr(elem))),
                None => TypeExpr::Other(self.text(node)),
            },
            "literal_type" => self.literal(node),
            "object_type" => TypeExpr::Object(self.members(node)),
            "parenthesized_type" | "readonly_type" | "type_annotation" => {
                match named_children(node).into_iter().next() {
                    Some(inner) => self.type_expr(inner),
                    None => TypeExpr::Other(self.text(node)),
                }
            }
            _ => TypeExpr::Other(self.text(node)),
        }
    }

    fn literal(&self, node: Node<'_>) -> TypeExpr {
        let Some(value) = named_children(node).into_iter().next() else {
            return TypeExpr::Other(self.text(node));
        };
        let text = self.text(value);
        match value.kind() {
            "string" => TypeExpr::Literal(Literal::String(unquote(&text).to_string())),
            "number" | "unary_expression" => match parse_number(&text.replace(' ', "")) {
                Some(number) => TypeExpr::Literal(Literal::Number(number)),
                None => TypeExpr::Other(text),
            },
            _ => TypeExpr::Other(text),
        }
    }

    fn class(&mut self, node: Node<'_>) {
        let Some(name) = self.field_text(node, "name") else { return };
        let mut methods = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            for member in named_children(body) {
                match member.kind() {
                    "method_definition" => {
                        if let Some(method) = self.method(member) {
                            methods.push(method);
                        }
                    }
                    "public_field_definition" => {
                        if let (Some(field), Some(value)) =
                            (self.field_text(member, "name"), member.child_by_field_name("value"))
                        {
                            self.value_constants(vec!["this".to_string(), field], value);
                        }
                    }
                    _ => {}
                }
            }
        }
        self.declare(name.clone(), Declaration::Other { text: name.clone() });
        self.oracle.classes.push(ClassDecl { unit: self.unit.clone(), name, methods });
    }

    fn method(&self, node: Node<'_>) -> Option<MethodDecl> {
        let name = self.field_text(node, "name")?;
        let body = node.child_by_field_name("body").map(|b| self.block(b)).unwrap_or_default();
        Some(MethodDecl { name, type_params: self.type_params(node), body })
    }

    fn enumeration(&mut self, node: Node<'_>) {
        let Some(name) = self.field_text(node, "name") else { return };
        if let Some(body) = node.child_by_field_name("body") {
            for member in named_children(body) {
                if member.kind() != "enum_assignment" {
                    continue;
                }
                if let (Some(key), Some(value)) =
                    (self.field_text(member, "name"), member.child_by_field_name("value"))
                {
                    self.value_constants(vec![name.clone(), unquote(&key).to_string()], value);
                }
            }
        }
        self.declare(name.clone(), Declaration::Other { text: name });
    }

    fn variables(&mut self, node: Node<'_>) {
        for declarator in named_children(node) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            if let (Some(name), Some(value)) =
                (self.field_text(declarator, "name"), declarator.child_by_field_name("value"))
            {
                if matches!(value.kind(), "arrow_function" | "function_expression" | "function") {
                    self.function(name, value);
                } else {
                    self.value_constants(vec![name], value);
                }
            }
        }
    }

    /// Records a top-level helper. An arrow function's expression body acts
    /// as its return value.
    fn function(&mut self, name: String, node: Node<'_>) {
        let body = match node.child_by_field_name("body") {
            Some(body) if body.kind() == "statement_block" => self.block(body),
            Some(body) => vec![Statement::Return(Some(self.expr(body)))],
            None => Vec::new(),
        };
        let decl = MethodDecl { name, type_params: self.type_params(node), body };
        self.oracle.functions.push(Function { unit: self.unit.clone(), decl });
    }

    /// Records string values found at `path`, descending into object literals.
    fn value_constants(&mut self, path: Vec<String>, value: Node<'_>) {
        match value.kind() {
            "string" => {
                let text = self.text(value);
                self.constant(path, unquote(&text).to_string());
            }
            "template_string" if named_children(value).iter().all(|c| c.kind() == "string_fragment") => {
                let text = self.text(value);
                self.constant(path, unquote(&text).to_string());
            }
            "object" => {
                for pair in named_children(value) {
                    if pair.kind() != "pair" {
                        continue;
                    }
                    if let (Some(key), Some(inner)) =
                        (self.field_text(pair, "key"), pair.child_by_field_name("value"))
                    {
                        let mut nested = path.clone();
                        nested.push(unquote(&key).to_string());
                        self.value_constants(nested, inner);
                    }
                }
            }
            "as_expression" | "satisfies_expression" | "parenthesized_expression" => {
                if let Some(inner) = named_children(value).into_iter().next() {
                    self.value_constants(path, inner);
                }
            }
            _ => {}
        }
    }

    fn block(&self, node: Node<'_>) -> Vec<Statement> {
        if node.kind() == "statement_block" {
            named_children(node).into_iter().map(|s| self.statement(s)).collect()
        } else {
            vec![self.statement(node)]
        }
    }

    fn statement(&self, node: Node<'_>) -> Statement {
        match node.kind() {
            "expression_statement" => match named_children(node).into_iter().next() {
                Some(expr) => Statement::Expression(self.expr(expr)),
                None => Statement::Other,
            },
            "return_statement" => {
                Statement::Return(named_children(node).into_iter().next().map(|e| self.expr(e)))
            }
            "if_statement" => {
                let consequence =
                    node.child_by_field_name("consequence").map(|c| self.block(c)).unwrap_or_default();
                let alternative = node
                    .child_by_field_name("alternative")
                    .and_then(|clause| named_children(clause).into_iter().next())
                    .map(|branch| self.block(branch));
                Statement::If { consequence, alternative }
            }
            _ => Statement::Other,
        }
    }

    fn expr(&self, node: Node<'_>) -> Expr {
        match node.kind() {
            "call_expression" => self.call(node).map_or_else(|| Expr::Other(self.text(node)), |c| Expr::Call(Box::new(c))),
            "string" => Expr::String(unquote(&self.text(node)).to_string()),
            "identifier" | "this" | "member_expression" => {
                self.path(node).map_or_else(|| Expr::Other(self.text(node)), Expr::Path)
            }
            "await_expression" | "parenthesized_expression" | "as_expression" | "non_null_expression" => {
                match named_children(node).into_iter().next() {
                    Some(inner) => self.expr(inner),
                    None => Expr::Other(self.text(node)),
                }
            }
            _ => Expr::Other(self.text(node)),
        }
    }

    fn path(&self, node: Node<'_>) -> Option<Vec<String>> {
        match node.kind() {
            "identifier" | "this" | "property_identifier" => Some(vec![self.text(node)]),
            "member_expression" => {
                let mut segments = self.path(node.child_by_field_name("object")?)?;
                segments.push(self.field_text(node, "property")?);
                Some(segments)
            }
            _ => None,
        }
    }

    fn call(&self, node: Node<'_>) -> Option<CallExpr> {
        let function = node.child_by_field_name("function")?;
        let callee = if function.kind() == "member_expression" {
            Callee::Member {
                object: Box::new(self.expr(function.child_by_field_name("object")?)),
                property: self.field_text(function, "property")?,
            }
        } else {
            Callee::Function(self.text(function))
        };
        let type_args = node
            .child_by_field_name("type_arguments")
            .map(|args| named_children(args).into_iter().map(|a| self.type_expr(a)).collect())
            .unwrap_or_default();
        let args = node
            .child_by_field_name("arguments")
            .map(|args| named_children(args).into_iter().map(|a| self.expr(a)).collect())
            .unwrap_or_default();
        Some(CallExpr { callee, type_args, args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::extract::{extract, ClassFilter};
    use crate::structure::{TypeNode, INDEX_KEY};

    const MODELS: &str = r"
// test for extends
interface MShape {
  color: string;
}
export interface MSquare extends MShape {
  sideLength: number;
  color: number;
}

interface MCustomResponse<T = any> {
  code: number;
  msg: string;
  data: T;
}

interface MLiteralType {
  name: 'JserWang';
  age: 18;
}

interface MTypeArray {
  [index: string]: MShape;
}

interface MEmpty {
  empty;
}

type Point = { x: number; y: number };
";

    const REQUEST: &str = r"
interface ResponseData<T> {
  code: number;
  msg: string;
  data: T;
}

class Request {
  get<T>(url: string, opts?: Record<string, any>) {
    return this.fetch<T>({ method: 'get', url, ...opts });
  }

  post<T>(url: string, opts?: Record<string, any>) {
    return this.fetch<T>({ method: 'post', url, ...opts });
  }

  fetch<T, R = ResponseData<T>>(opts: Record<string, any>) {
    return new Promise<T>((resolve) => resolve({} as T));
  }
}

export default new Request();
";

    const SERVICE: &str = r"
import Request from '../utils/Request';

enum Api {
  Square = '/api/square',
}

class PlayGroundService {
  private api = {
    normal: '/api/normal',
    withIf: '/api/withIf',
    withIfElseIf: '/api/withIfElseIf',
    withIfElse: '/api/withIfElse',
  };

  normal(phone: string) {
    return Request.get<MSquare>(this.api.normal, { phone }).then((res) => res);
  }

  square() {
    return Request.post<MSquare[]>(Api.Square);
  }

  logout() {
    const a = 1;
    Request.get<MTypeArray>('/user/string');
  }

  withIf() {
    if (1 === 1) {
      Request.get<MLiteralType>(this.api.withIf);
    } else if (2 === 2) {
      Request.get<MEmpty>(this.api.withIfElseIf);
    } else {
      Request.get<Point>(this.api.withIfElse);
    }
  }
}

export default new PlayGroundService();
";

    fn load() -> Box<dyn TypeOracle> {
        TypeScriptFrontend
            .load(vec![
                SourceUnit::new("apis/models/test.ts", MODELS),
                SourceUnit::new("utils/Request.ts", REQUEST),
                SourceUnit::new("apis/services/test.ts", SERVICE),
            ])
            .unwrap()
    }

    fn entry(node: &TypeNode) -> &crate::structure::InterfaceEntry {
        match node {
            TypeNode::Reference(entry) => entry,
            other => panic!("expected reference, got {other:?}"),
        }
    }

    #[test]
    fn lowers_interfaces_with_heritage_and_generics() {
        let oracle = load();
        let from = UnitId::new("apis/services/test.ts");

        let Some(Declaration::Interface(square)) = oracle.declaration(&from, "MSquare") else {
            panic!("MSquare not found");
        };
        assert_eq!(square.unit, UnitId::new("apis/models/test.ts"));
        assert_eq!(square.heritage, vec![TypeExpr::reference("MShape")]);
        assert_eq!(square.members.len(), 2);

        let Some(Declaration::Interface(custom)) = oracle.declaration(&from, "MCustomResponse") else {
            panic!("MCustomResponse not found");
        };
        assert_eq!(custom.generics, vec!["T"]);
        assert_eq!(
            custom.members[2],
            MemberDecl::Property { name: "data".into(), ty: Some(TypeExpr::reference("T")) }
        );

        let Some(Declaration::Interface(literal)) = oracle.declaration(&from, "MLiteralType") else {
            panic!("MLiteralType not found");
        };
        assert_eq!(
            literal.members,
            vec![
                MemberDecl::Property {
                    name: "name".into(),
                    ty: Some(TypeExpr::Literal(Literal::String("JserWang".into()))),
                },
                MemberDecl::Property {
                    name: "age".into(),
                    ty: Some(TypeExpr::Literal(Literal::Number(18.into()))),
                },
            ]
        );

        let Some(Declaration::Interface(empty)) = oracle.declaration(&from, "MEmpty") else {
            panic!("MEmpty not found");
        };
        assert_eq!(empty.members, vec![MemberDecl::Property { name: "empty".into(), ty: None }]);

        assert!(matches!(oracle.declaration(&from, "Point"), Some(Declaration::Alias(_))));
        assert!(oracle.declaration(&from, "Missing").is_none());
    }

    #[test]
    fn resolves_string_initializers() {
        let oracle = load();
        let from = UnitId::new("apis/services/test.ts");
        let this_api = ["this".to_string(), "api".to_string()];
        assert_eq!(oracle.string_initializer(&from, &this_api, "normal").as_deref(), Some("/api/normal"));
        assert_eq!(
            oracle.string_initializer(&from, &["Api".to_string()], "Square").as_deref(),
            Some("/api/square")
        );
        assert!(oracle.string_initializer(&from, &this_api, "missing").is_none());
    }

    #[test]
    fn lowers_method_bodies_and_branches() {
        let oracle = load();
        let service = oracle.classes().iter().find(|c| c.name == "PlayGroundService").unwrap();
        let names: Vec<&str> = service.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["normal", "square", "logout", "withIf"]);

        let with_if = &service.methods[3];
        let calls = with_if.call_sites();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|c| c.callee.name() == "get"));

        let normal = service.methods[0].call_sites()[0];
        assert_eq!(normal.callee.name(), "then");
        let leaf = normal.leaf();
        assert_eq!(leaf.callee.name(), "get");
        assert_eq!(leaf.type_args, vec![TypeExpr::reference("MSquare")]);
        assert_eq!(leaf.args[0], Expr::Path(vec!["this".into(), "api".into(), "normal".into()]));
    }

    #[test]
    fn finds_request_container_default() {
        let oracle = load();
        let from = UnitId::new("apis/services/test.ts");
        let service = oracle.classes().iter().find(|c| c.name == "PlayGroundService").unwrap();
        let call = service.methods[1].call_sites()[0];

        let container = oracle.request_container(&from, call).unwrap();
        assert_eq!(container.unit, UnitId::new("utils/Request.ts"));
        assert_eq!(container.scope, vec!["T", "R"]);
        assert_eq!(
            container.ty,
            TypeExpr::Reference { name: "ResponseData".into(), args: vec![TypeExpr::reference("T")] }
        );
    }

    #[test]
    fn extracts_playground_endpoints() {
        let oracle = load();
        let snapshot = extract(oracle.as_ref(), &ClassFilter::new(&["Service"], &[]).unwrap());
        let urls: Vec<&str> = snapshot.endpoints.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "/api/normal",
                "/api/square",
                "/user/string",
                "/api/withIf",
                "/api/withIfElseIf",
                "/api/withIfElse"
            ]
        );

        let bodies = snapshot.by_url();
        let normal = entry(bodies["/api/normal"]);
        assert_eq!(normal.name, "ResponseData");
        let square = entry(&normal.property("data").unwrap().ty);
        let keys: Vec<&str> = square.properties.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["color", "sideLength"]);
        assert_eq!(square.property("color").unwrap().ty, TypeNode::Number);

        let list = entry(bodies["/api/square"]);
        assert!(matches!(list.property("data").unwrap().ty, TypeNode::Array(_)));

        let indexed = entry(&entry(bodies["/user/string"]).property("data").unwrap().ty);
        assert!(matches!(indexed.property(INDEX_KEY).unwrap().ty, TypeNode::Indexable(_)));

        let point = entry(&entry(bodies["/api/withIfElse"]).property("data").unwrap().ty);
        assert_eq!(point.name, "Point");
    }

    const FUNCTION_HELPERS: &str = r"
interface ResponseData<T> {
  code: number;
  msg: string;
  data: T;
}

interface User {
  name: string;
}

export function request<T, R = ResponseData<T>>(url: string): Promise<R> {
  return fetch(url).then((res) => res.json());
}

const send = <T, R = ResponseData<T>>(url: string) => fetch(url);

class Http {
  get<T>(url: string) {
    return request<T>(url);
  }
  post<T>(url: string) {
    return send<T>(url);
  }
}

export class AccountService {
  me() {
    return http.get<User>('/api/me');
  }
  save() {
    return http.post<User>('/api/save');
  }
}
";

    #[test]
    fn top_level_helpers_provide_the_container() {
        let oracle = TypeScriptFrontend.load(vec![SourceUnit::new("http.ts", FUNCTION_HELPERS)]).unwrap();
        let snapshot = extract(oracle.as_ref(), &ClassFilter::new(&["Service"], &[]).unwrap());
        let bodies = snapshot.by_url();

        for url in ["/api/me", "/api/save"] {
            let body = entry(bodies[url]);
            assert_eq!(body.name, "ResponseData", "{url}");
            assert_eq!(body.property("code").unwrap().ty, TypeNode::Number);
            assert_eq!(entry(&body.property("data").unwrap().ty).name, "User");
        }
    }

    #[test]
    fn broken_source_is_tolerated() {
        let oracle = TypeScriptFrontend
            .load(vec![SourceUnit::new("bad.ts", "interface { oops"), SourceUnit::new("ok.ts", MODELS)])
            .unwrap();
        assert!(oracle.declaration(&UnitId::new("ok.ts"), "MShape").is_some());
    }

    #[test]
    fn unquote_strips_matching_quotes_only() {
        assert_eq!(unquote("'a'"), "a");
        assert_eq!(unquote("\"b\""), "b");
        assert_eq!(unquote("`c`"), "c");
        assert_eq!(unquote("'d\""), "'d\"");
        assert_eq!(unquote("'"), "'");
    }
}
