//! In-memory port implementations for unit tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::typescript::TypeScriptFrontend;
use crate::context::ServiceContext;
use crate::ports::oracle::{
    AliasDecl, CallExpr, ClassDecl, ContainerType, Declaration, InterfaceDecl, MemberDecl,
    TypeExpr, TypeOracle, UnitId,
};
use crate::ports::{Faker, FileSystem};

/// In-memory filesystem for testing without touching disk. Clones share
/// the same files.
#[derive(Default, Clone)]
pub struct MemFs {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, path: impl Into<PathBuf>, contents: &str) -> Self {
        self.files.lock().unwrap().insert(path.into(), contents.to_string());
        self
    }
}

impl FileSystem for MemFs {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let files = self.files.lock().unwrap();
        files
            .get(path)
            .cloned()
            .ok_or_else(|| format!("File not found: {}", path.display()).into())
    }

    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut files = self.files.lock().unwrap();
        files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.contains_key(path) || files.keys().any(|k| k.starts_with(path) && k != path)
    }

    fn list_files(
        &self,
        root: &Path,
        extension: &str,
        skip: &Path,
    ) -> Result<Vec<PathBuf>, Box<dyn std::error::Error + Send + Sync>> {
        let files = self.files.lock().unwrap();
        let mut found: Vec<PathBuf> = files
            .keys()
            .filter(|k| k.starts_with(root) && !k.starts_with(skip))
            .filter(|k| k.extension().is_some_and(|ext| ext == extension))
            .cloned()
            .collect();
        found.sort();
        Ok(found)
    }
}

/// Faker returning the same word and number every time.
pub struct FixedFaker;

impl Faker for FixedFaker {
    fn word(&self) -> String {
        "lorem".to_string()
    }

    fn number(&self) -> i64 {
        42
    }
}

/// Context over an in-memory filesystem, a fixed faker and the real
/// TypeScript frontend.
pub fn test_context(fs: MemFs) -> ServiceContext {
    ServiceContext { fs: Box::new(fs), faker: Box::new(FixedFaker), frontend: Box::new(TypeScriptFrontend) }
}

/// Hand-built oracle for resolver and extractor tests.
#[derive(Default)]
pub struct StaticOracle {
    pub classes: Vec<ClassDecl>,
    pub declarations: Vec<(String, Declaration)>,
    pub constants: Vec<(Vec<String>, String, String)>,
    pub container: Option<ContainerType>,
}

fn names(generics: &[&str]) -> Vec<String> {
    generics.iter().map(ToString::to_string).collect()
}

impl StaticOracle {
    pub fn interface(
        mut self,
        name: &str,
        generics: &[&str],
        heritage: Vec<TypeExpr>,
        members: Vec<MemberDecl>,
    ) -> Self {
        let decl = InterfaceDecl {
            unit: UnitId::new("models.ts"),
            name: name.to_string(),
            generics: names(generics),
            heritage,
            members,
        };
        self.declarations.push((name.to_string(), Declaration::Interface(decl)));
        self
    }

    pub fn alias(mut self, name: &str, generics: &[&str], target: TypeExpr) -> Self {
        let decl = AliasDecl {
            unit: UnitId::new("models.ts"),
            name: name.to_string(),
            generics: names(generics),
            target,
        };
        self.declarations.push((name.to_string(), Declaration::Alias(decl)));
        self
    }

    pub fn constant(mut self, object: &[&str], member: &str, value: &str) -> Self {
        self.constants.push((names(object), member.to_string(), value.to_string()));
        self
    }

    pub fn class(mut self, class: ClassDecl) -> Self {
        self.classes.push(class);
        self
    }

    pub fn container(mut self, container: ContainerType) -> Self {
        self.container = Some(container);
        self
    }
}

impl TypeOracle for StaticOracle {
    fn classes(&self) -> &[ClassDecl] {
        &self.classes
    }

    fn declaration(&self, _from: &UnitId, name: &str) -> Option<Declaration> {
        self.declarations.iter().find(|(n, _)| n == name).map(|(_, decl)| decl.clone())
    }

    fn string_initializer(&self, _from: &UnitId, object: &[String], member: &str) -> Option<String> {
        self.constants
            .iter()
            .find(|(o, m, _)| o.as_slice() == object && m == member)
            .map(|(_, _, value)| value.clone())
    }

    fn request_container(&self, _from: &UnitId, _call: &CallExpr) -> Option<ContainerType> {
        self.container.clone()
    }
}
