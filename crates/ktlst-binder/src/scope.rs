//! File-level name scope: package, imports, and class-name resolution.

use ktlst_parser::parser::node::NodeArena;
use ktlst_parser::syntax_kind_ext::{PROPERTY_ACCESS_EXPRESSION, TYPE_REFERENCE};
use ktlst_parser::NodeIndex;
use ktlst_scanner::SyntaxKind;
use ktlst_types::types::NOTHING;
use ktlst_types::{Nullability, Type, DEFAULT_IMPORTS};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;

pub type Segments<'a> = SmallVec<[&'a str; 4]>;

/// Names of a qualified name chain (`a.b.C`), left to right.
///
/// Returns `None` when the subtree is not a pure identifier chain.
pub fn chain_segments(arena: &NodeArena, index: NodeIndex) -> Option<Segments<'_>> {
    let mut segments = Segments::new();
    collect_segments(arena, index, &mut segments)?;
    Some(segments)
}

fn collect_segments<'a>(
    arena: &'a NodeArena,
    index: NodeIndex,
    out: &mut Segments<'a>,
) -> Option<()> {
    match arena.kind(index) {
        kind if kind == SyntaxKind::Identifier as u16 => {
            out.push(arena.name_text(index));
            Some(())
        }
        PROPERTY_ACCESS_EXPRESSION => {
            let node = arena.get(index)?;
            let access = arena.get_access_expr(node)?;
            if access.question_dot_token {
                return None;
            }
            collect_segments(arena, access.expression, out)?;
            out.push(arena.name_text(access.name));
            Some(())
        }
        _ => None,
    }
}

/// `package` and `import` directives of one compilation unit.
#[derive(Clone, Debug, Default)]
pub struct FileScope {
    pub package: Arc<str>,
    /// Simple name (or alias) to the dotted import path.
    pub explicit_imports: FxHashMap<Arc<str>, Arc<str>>,
    /// Star-imported packages (or classes) in source order.
    pub star_imports: Vec<Arc<str>>,
    /// Implicitly imported packages.
    pub default_imports: Vec<Arc<str>>,
}

/// Where a type name is being resolved.
#[derive(Clone, Copy, Debug, Default)]
pub struct TypeNameContext<'a> {
    /// Enclosing classes, outermost first.
    pub enclosing: &'a [Arc<str>],
    /// Type parameters in scope.
    pub type_parameters: &'a [Arc<str>],
}

impl FileScope {
    /// Read the package and imports of a parsed unit.
    pub fn from_source_file(arena: &NodeArena, root: NodeIndex) -> FileScope {
        let mut scope = FileScope {
            default_imports: DEFAULT_IMPORTS.iter().map(|p| Arc::from(*p)).collect(),
            ..FileScope::default()
        };
        let Some(file) = arena.get(root).and_then(|n| arena.get_source_file(n)) else {
            return scope;
        };
        if let Some(package) = arena.get(file.package).and_then(|n| arena.get_package(n))
            && let Some(segments) = chain_segments(arena, package.name)
        {
            scope.package = Arc::from(segments.join("."));
        }
        for import in &file.imports {
            let Some(data) = arena.get(import).and_then(|n| arena.get_import(n)) else {
                continue;
            };
            let Some(segments) = chain_segments(arena, data.path) else {
                continue;
            };
            let path: Arc<str> = Arc::from(segments.join("."));
            if data.is_star {
                scope.star_imports.push(path);
                continue;
            }
            let local = if data.alias.is_some() {
                arena.name_text(data.alias)
            } else {
                segments.last().copied().unwrap_or_default()
            };
            scope.explicit_imports.insert(Arc::from(local), path);
        }
        scope
    }

    /// Add extra implicitly imported packages.
    pub fn add_default_imports<S: AsRef<str>>(&mut self, packages: &[S]) {
        for package in packages {
            let package: Arc<str> = Arc::from(package.as_ref());
            if !self.default_imports.contains(&package) {
                self.default_imports.push(package);
            }
        }
    }

    /// Qualify a name declared at the top level of this unit.
    pub fn qualify(&self, name: &str) -> String {
        if self.package.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.package, name)
        }
    }

    /// Packages searched for a bare top-level name, in priority order:
    /// own package, star imports, default imports.
    pub fn implicit_packages(&self) -> impl Iterator<Item = &str> {
        std::iter::once(&*self.package)
            .chain(self.star_imports.iter().map(|p| &**p))
            .chain(self.default_imports.iter().map(|p| &**p))
    }

    /// Resolve the first segment of a type name to a class.
    ///
    /// Order: nested classes of enclosing classes (innermost first), explicit
    /// imports, own package, star imports, default imports.
    pub fn resolve_simple_class(
        &self,
        name: &str,
        enclosing: &[Arc<str>],
        exists: &dyn Fn(&str) -> bool,
    ) -> Option<Arc<str>> {
        for outer in enclosing.iter().rev() {
            let nested = format!("{outer}${name}");
            if exists(&nested) {
                return Some(Arc::from(nested));
            }
        }
        if let Some(path) = self.explicit_imports.get(name) {
            if let Some(fqn) = qualified_to_class(path, exists) {
                return Some(fqn);
            }
        }
        self.implicit_packages().find_map(|package| {
            let candidate = if package.is_empty() {
                name.to_string()
            } else {
                format!("{package}.{name}")
            };
            exists(&candidate).then(|| Arc::from(candidate))
        })
    }

    /// Resolve a possibly qualified type name. A first segment that names a
    /// class in scope wins over a package of the same name.
    pub fn resolve_class_name(
        &self,
        segments: &[&str],
        enclosing: &[Arc<str>],
        exists: &dyn Fn(&str) -> bool,
    ) -> Option<Arc<str>> {
        let (first, rest) = segments.split_first()?;
        if let Some(base) = self.resolve_simple_class(first, enclosing, exists) {
            let mut fqn = base.to_string();
            for segment in rest {
                fqn.push('$');
                fqn.push_str(segment);
                if !exists(&fqn) {
                    return None;
                }
            }
            return Some(Arc::from(fqn));
        }
        if rest.is_empty() {
            return None;
        }
        qualified_to_class(&segments.join("."), exists)
    }

    /// Resolve a `TYPE_REFERENCE` node. Unresolvable names give `Type::Unknown`;
    /// type parameters erase to `kotlin.Any?`.
    pub fn resolve_type_ref(
        &self,
        arena: &NodeArena,
        type_ref: NodeIndex,
        context: TypeNameContext<'_>,
        exists: &dyn Fn(&str) -> bool,
    ) -> Type {
        if arena.kind(type_ref) != TYPE_REFERENCE {
            return Type::Unknown;
        }
        let Some(data) = arena.get(type_ref).and_then(|n| arena.get_type_ref(n)) else {
            return Type::Unknown;
        };
        let Some(segments) = chain_segments(arena, data.name) else {
            return Type::Unknown;
        };
        let nullability = if data.is_nullable {
            Nullability::Nullable
        } else {
            Nullability::NotNull
        };
        if segments.len() == 1 && context.type_parameters.iter().any(|p| **p == *segments[0]) {
            return Type::class(ktlst_types::types::ANY).make_nullable();
        }
        match self.resolve_class_name(&segments, context.enclosing, exists) {
            Some(fqn) if &*fqn == NOTHING => Type::Nothing {
                nullable: data.is_nullable,
            },
            Some(fqn) => Type::class_with(fqn, nullability),
            None => Type::Unknown,
        }
    }
}

/// Map a dotted path to a class binary name: the longest package prefix
/// wins, the remaining segments are nested classes.
pub fn qualified_to_class(path: &str, exists: &dyn Fn(&str) -> bool) -> Option<Arc<str>> {
    let segments: Segments<'_> = path.split('.').collect();
    for split in (1..=segments.len()).rev() {
        let mut candidate = segments[..split].join(".");
        for nested in &segments[split..] {
            candidate.push('$');
            candidate.push_str(nested);
        }
        if exists(&candidate) {
            return Some(Arc::from(candidate));
        }
    }
    None
}

/// File facade class of a unit's top-level declarations: `util/Strings.kt`
/// in package `a` is `a.StringsKt`.
pub fn facade_name(package: &str, file_name: &str) -> String {
    let stem = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim_end_matches(".kts")
        .trim_end_matches(".kt");
    let mut facade: String = stem
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if let Some(first) = facade.get(..1) {
        let upper = first.to_uppercase();
        facade.replace_range(..1, &upper);
    }
    facade.push_str("Kt");
    if package.is_empty() {
        facade
    } else {
        format!("{package}.{facade}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ktlst_parser::parse_source;

    fn known(names: &'static [&'static str]) -> impl Fn(&str) -> bool {
        move |fqn| names.contains(&fqn)
    }

    #[test]
    fn test_scope_from_imports() {
        let result = parse_source(
            "a.kt",
            "package com.example\n\nimport java.nio.ByteBuffer\nimport java.util.*\nimport a.B as C\n",
        );
        let scope = FileScope::from_source_file(&result.arena, result.root);
        assert_eq!(&*scope.package, "com.example");
        assert_eq!(
            scope.explicit_imports.get("ByteBuffer").map(|p| &**p),
            Some("java.nio.ByteBuffer")
        );
        assert_eq!(scope.explicit_imports.get("C").map(|p| &**p), Some("a.B"));
        assert_eq!(scope.star_imports, vec![Arc::<str>::from("java.util")]);
        assert!(scope.default_imports.iter().any(|p| &**p == "kotlin"));
    }

    #[test]
    fn test_resolution_order() {
        let exists = known(&["kotlin.Int", "p.Int", "p.Outer", "p.Outer$Int", "q.Thing"]);
        let scope = FileScope {
            package: Arc::from("p"),
            default_imports: vec![Arc::from("kotlin")],
            ..FileScope::default()
        };
        let outer: [Arc<str>; 1] = [Arc::from("p.Outer")];
        assert_eq!(
            scope.resolve_simple_class("Int", &outer, &exists).as_deref(),
            Some("p.Outer$Int")
        );
        assert_eq!(
            scope.resolve_simple_class("Int", &[], &exists).as_deref(),
            Some("p.Int")
        );
        assert_eq!(
            scope.resolve_class_name(&["q", "Thing"], &[], &exists).as_deref(),
            Some("q.Thing")
        );
        assert_eq!(
            scope.resolve_class_name(&["Outer", "Int"], &[], &exists).as_deref(),
            Some("p.Outer$Int")
        );
        assert!(scope.resolve_class_name(&["Outer", "Nope"], &[], &exists).is_none());
    }

    #[test]
    fn test_qualified_to_nested_class() {
        let exists = known(&["java.util.Map", "java.util.Map$Entry"]);
        assert_eq!(
            qualified_to_class("java.util.Map.Entry", &exists).as_deref(),
            Some("java.util.Map$Entry")
        );
        assert!(qualified_to_class("java.util", &exists).is_none());
    }

    #[test]
    fn test_facade_names() {
        assert_eq!(facade_name("", "Test.kt"), "TestKt");
        assert_eq!(facade_name("a.b", "src/util/strings.kt"), "a.b.StringsKt");
        assert_eq!(facade_name("", "my-file.kts"), "My_fileKt");
    }
}
