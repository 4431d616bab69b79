//! Language detection, tree-sitter dispatch, and node classification tables.
//!
//! Classification tables are treated as static input data per §6: sets of
//! tree-sitter node-kind strings that tell the extractor whether a child of the
//! root is an import, a preamble element, a comment, or a declaration. One
//! table per [`Language`], compiled in as `const` slices.

use std::path::Path;

use tree_sitter::Language as TsLanguage;

/// A language supported by the structural merge engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Go,
    Python,
    Rust,
    TypeScript,
    JavaScript,
    C,
    Cpp,
    Java,
}

impl Language {
    /// Map a file path's extension to a [`Language`], per §6's table.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::from_extension(ext)
    }

    /// Map a bare extension string (no leading dot) to a [`Language`].
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "go" => Some(Self::Go),
            "py" => Some(Self::Python),
            "rs" => Some(Self::Rust),
            "ts" | "tsx" => Some(Self::TypeScript),
            "js" | "jsx" => Some(Self::JavaScript),
            "c" | "h" => Some(Self::C),
            "cpp" | "cc" | "cxx" | "hpp" => Some(Self::Cpp),
            "java" => Some(Self::Java),
            _ => None,
        }
    }

    /// The tree-sitter grammar for this language.
    #[must_use]
    pub fn tree_sitter_language(self) -> TsLanguage {
        match self {
            Self::Go => tree_sitter_go::LANGUAGE.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::C => tree_sitter_c::LANGUAGE.into(),
            Self::Cpp => tree_sitter_cpp::LANGUAGE.into(),
            Self::Java => tree_sitter_java::LANGUAGE.into(),
        }
    }

    /// Canonical language name, as consumed by the import-merge router (§4.5)
    /// and the orchestrator's fallback decisions.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::Python => "python",
            Self::Rust => "rust",
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Java => "java",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Node-kind classification tables for one language.
pub struct NodeKinds {
    pub imports: &'static [&'static str],
    pub declarations: &'static [&'static str],
    pub preamble: &'static [&'static str],
    pub comments: &'static [&'static str],
    pub name_identifiers: &'static [&'static str],
}

/// Tree-sitter node kinds treated as container declarations (§6): a
/// Declaration whose node type is in this set may have nested Declaration
/// descendants flattened out during extraction (§4.3 step 4).
pub const CONTAINER_KINDS: &[&str] = &[
    "class_definition",
    "class_declaration",
    "interface_declaration",
    "struct_declaration",
    "struct_item",
    "enum_declaration",
    "enum_item",
    "trait_declaration",
    "trait_item",
    "impl_item",
    "object_declaration",
    "record_declaration",
    "protocol_declaration",
];

impl Language {
    /// Static classification tables for this language (§6 external input).
    #[must_use]
    pub const fn node_kinds(self) -> NodeKinds {
        match self {
            Self::Go => NodeKinds {
                imports: &["import_declaration"],
                declarations: &[
                    "function_declaration",
                    "method_declaration",
                    "type_declaration",
                    "var_declaration",
                    "const_declaration",
                ],
                preamble: &["package_clause"],
                comments: &["comment"],
                name_identifiers: &["identifier", "field_identifier", "type_identifier"],
            },
            Self::Python => NodeKinds {
                imports: &["import_statement", "import_from_statement"],
                declarations: &["function_definition", "class_definition", "decorated_definition"],
                preamble: &[],
                comments: &["comment"],
                name_identifiers: &["identifier"],
            },
            Self::Rust => NodeKinds {
                imports: &["use_declaration"],
                declarations: &[
                    "function_item",
                    "struct_item",
                    "enum_item",
                    "trait_item",
                    "impl_item",
                    "const_item",
                    "static_item",
                    "type_item",
                    "mod_item",
                    "macro_definition",
                ],
                preamble: &["inner_attribute_item"],
                comments: &["line_comment", "block_comment"],
                name_identifiers: &["identifier", "type_identifier", "field_identifier"],
            },
            Self::TypeScript => NodeKinds {
                imports: &["import_statement", "export_statement"],
                declarations: &[
                    "function_declaration",
                    "class_declaration",
                    "interface_declaration",
                    "type_alias_declaration",
                    "enum_declaration",
                    "method_definition",
                ],
                preamble: &[],
                comments: &["comment"],
                name_identifiers: &["identifier", "type_identifier", "property_identifier"],
            },
            Self::JavaScript => NodeKinds {
                imports: &["import_statement"],
                declarations: &["function_declaration", "class_declaration", "method_definition"],
                preamble: &[],
                comments: &["comment"],
                name_identifiers: &["identifier", "property_identifier"],
            },
            Self::C => NodeKinds {
                imports: &["preproc_include"],
                declarations: &["function_definition", "struct_specifier", "enum_specifier", "declaration"],
                preamble: &["preproc_def", "preproc_ifdef"],
                comments: &["comment"],
                name_identifiers: &["identifier", "type_identifier", "field_identifier"],
            },
            Self::Cpp => NodeKinds {
                imports: &["preproc_include"],
                declarations: &[
                    "function_definition",
                    "struct_specifier",
                    "class_specifier",
                    "enum_specifier",
                    "declaration",
                    "namespace_definition",
                ],
                preamble: &["preproc_def", "preproc_ifdef"],
                comments: &["comment"],
                name_identifiers: &["identifier", "type_identifier", "field_identifier"],
            },
            Self::Java => NodeKinds {
                imports: &["import_declaration", "package_declaration"],
                declarations: &[
                    "class_declaration",
                    "interface_declaration",
                    "enum_declaration",
                    "method_declaration",
                    "constructor_declaration",
                    "record_declaration",
                ],
                preamble: &[],
                comments: &["line_comment", "block_comment"],
                name_identifiers: &["identifier", "type_identifier"],
            },
        }
    }

    /// Is this node kind a container declaration for this language?
    #[must_use]
    pub fn is_container_kind(node_kind: &str) -> bool {
        CONTAINER_KINDS.contains(&node_kind)
    }
}
