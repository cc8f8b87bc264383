//! Declaration model shared by every demask stage.
//!
//! A source file is reduced to a [`FileModel`]: its package, imports and
//! the signatures of its classes, interfaces, variables and functions.
//! Names are matched between an obfuscated tree and a reference tree
//! purely on these signatures; the accumulated result lives in the
//! [`RenameTable`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod rename;

pub use rename::{RenameOutcome, RenameTable, DEFAULT_PLACEHOLDER_STEM};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// Access modifier of a declaration. Lines without one default to public.
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
    Internal,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Internal => "internal",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            "protected" => Ok(Visibility::Protected),
            "internal" => Ok(Visibility::Internal),
            other => Err(format!("unknown visibility '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// Property-accessor marker on a function declaration.
pub enum AccessorKind {
    #[default]
    None,
    Get,
    Set,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Site where a declaration or import was referenced: the accessing
/// file's package, file stem and enclosing function (empty for
/// file-level code).
pub struct AccessSite {
    pub package: String,
    pub file: String,
    pub function: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassModel {
    pub name: String,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub extends: String,
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterfaceModel {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A `var` declaration. `initializer` keeps the raw text after `=`,
/// empty when the declaration has none.
pub struct VarModel {
    pub name: String,
    pub ty: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub initializer: String,
    #[serde(default)]
    pub accessed_by: Vec<AccessSite>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A function signature plus the length of its body in lines.
/// `body_lines` counts every line consumed before the one on which the
/// brace depth returned to zero.
pub struct FunctionModel {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub return_type: String,
    #[serde(default)]
    pub param_names: Vec<String>,
    #[serde(default)]
    pub param_types: Vec<String>,
    #[serde(default)]
    pub body_lines: usize,
    #[serde(default)]
    pub accessor: AccessorKind,
    #[serde(default)]
    pub accessed_by: Vec<AccessSite>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One `import` statement. `accessed_by` collects every site where the
/// imported short name was used as a declared type.
pub struct ImportModel {
    pub qualified: String,
    #[serde(default)]
    pub accessed_by: Vec<AccessSite>,
}

impl ImportModel {
    pub fn new(qualified: impl Into<String>) -> Self {
        Self {
            qualified: qualified.into(),
            accessed_by: Vec::new(),
        }
    }

    /// Last dot-separated segment: the name the import is used by.
    ///
    /// # Example
    /// ```
    /// use ir::ImportModel;
    /// assert_eq!(ImportModel::new("a.b.Widget").short_name(), "Widget");
    /// ```
    pub fn short_name(&self) -> &str {
        self.qualified.rsplit('.').next().unwrap_or(&self.qualified)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Pre-resolution record of a dotted expression found inside a function
/// body: `x.a.b` where `x` resolved to `class_qualified`. `path` holds
/// the remaining segments (`[a, b]`). Drained by the cross-reference
/// builder once every file of the tree has been parsed.
pub struct MemberAccess {
    pub class_qualified: String,
    pub function: String,
    pub path: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
/// Everything the extractor learned about one source file.
pub struct FileModel {
    pub package_name: String,
    pub file_stem: String,
    #[serde(default)]
    pub imports: Vec<ImportModel>,
    #[serde(default)]
    pub classes: Vec<ClassModel>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceModel>,
    #[serde(default)]
    pub vars: Vec<VarModel>,
    #[serde(default)]
    pub functions: Vec<FunctionModel>,
    #[serde(default)]
    pub accesses: Vec<MemberAccess>,
}

impl FileModel {
    pub fn new(file_stem: impl Into<String>) -> Self {
        Self {
            file_stem: file_stem.into(),
            ..Self::default()
        }
    }

    /// `package.FirstClassName`, the key the project index files under.
    /// Files with no class declaration have no qualified name.
    pub fn qualified_name(&self) -> Option<String> {
        let first = self.classes.first()?;
        Some(format!("{}.{}", self.package_name, first.name))
    }

    /// Resolves an imported short name to its full import path.
    pub fn import_for_short_name(&self, short: &str) -> Option<&ImportModel> {
        self.imports.iter().find(|i| i.short_name() == short)
    }
}
