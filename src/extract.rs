//! Entity extraction (§4.3): walk a parsed concrete syntax tree and flatten its
//! top-level children into an [`EntityList`] satisfying the byte-coverage
//! invariant.

use std::collections::HashMap;
use std::path::Path;

use tree_sitter::{Node, Parser};

use crate::entity::{Entity, EntityKind, EntityList};
use crate::error::ExtractError;
use crate::lang::Language;

/// Extract entities from a source file (§6 `Extract`).
///
/// The parse tree is scoped to this function and dropped on every exit path,
/// satisfying §5's release-on-exit requirement.
#[tracing::instrument(skip(source), fields(path = %path.display(), lang))]
pub fn extract(path: &Path, source: &[u8]) -> Result<EntityList, ExtractError> {
    let lang = Language::from_path(path).ok_or_else(|| ExtractError::UnsupportedFileType {
        path: path.to_path_buf(),
    })?;
    tracing::Span::current().record("lang", lang.name());

    if source.is_empty() {
        return Ok(EntityList::new(lang.name().to_owned(), path_string(path), Vec::new(), Vec::new()));
    }

    let mut parser = Parser::new();
    parser
        .set_language(&lang.tree_sitter_language())
        .map_err(|e| ExtractError::ParseFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    let tree = parser.parse(source, None).ok_or_else(|| ExtractError::ParseFailed {
        path: path.to_path_buf(),
        detail: "tree-sitter returned no tree".to_owned(),
    })?;

    let root = tree.root_node();

    if root.child_count() == 0 {
        tracing::debug!("empty root node, treating whole source as one interstitial");
        let entity = Entity::new(EntityKind::Interstitial, source.to_vec(), 0, source.len(), 1, line_of_byte(source, source.len().saturating_sub(1)));
        return Ok(EntityList::new(lang.name().to_owned(), path_string(path), source.to_vec(), vec![entity]));
    }

    let mut raw = Vec::new();
    let child_count = root.child_count();
    let mut i = 0;
    while i < child_count {
        let child = root.child(i).expect("index within child_count");

        // Special case (§4.3 step 5): a grammar that emits `class` + `identifier`
        // as two bare sibling tokens instead of one class_declaration node.
        if child.kind() == "class" {
            if let Some(next) = root.child(i + 1) {
                if next.kind() == "identifier" {
                    raw.push(RawEntity::declaration(
                        child.start_byte(),
                        next.end_byte(),
                        child.start_position().row + 1,
                        line_for_end(next),
                        "class_declaration".to_owned(),
                        node_text(next, source).to_owned(),
                        String::new(),
                    ));
                    i += 2;
                    continue;
                }
            }
        }

        classify_child(child, lang, source, &mut raw);
        i += 1;
    }

    raw.sort_by_key(|r| (r.start_line, r.start_byte));

    let mut entities = fill_gaps(&raw, source);
    assign_ordinals(&mut entities);
    link_interstitials(&mut entities);

    tracing::debug!(entity_count = entities.len(), "extraction complete");

    Ok(EntityList::new(lang.name().to_owned(), path_string(path), source.to_vec(), entities))
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// A classified child awaiting gap-filling and ordinal assignment.
struct RawEntity {
    kind: EntityKind,
    start_byte: usize,
    end_byte: usize,
    start_line: usize,
    end_line: usize,
    decl_kind: String,
    name: String,
    receiver: String,
}

impl RawEntity {
    fn plain(kind: EntityKind, node: Node<'_>) -> Self {
        Self {
            kind,
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: node.start_position().row + 1,
            end_line: line_for_end(node),
            decl_kind: String::new(),
            name: String::new(),
            receiver: String::new(),
        }
    }

    fn declaration(
        start_byte: usize,
        end_byte: usize,
        start_line: usize,
        end_line: usize,
        decl_kind: String,
        name: String,
        receiver: String,
    ) -> Self {
        Self {
            kind: EntityKind::Declaration,
            start_byte,
            end_byte,
            start_line,
            end_line,
            decl_kind,
            name,
            receiver,
        }
    }
}

fn line_for_end(node: Node<'_>) -> usize {
    let end = node.end_position();
    if end.column == 0 && end.row > node.start_position().row {
        end.row
    } else {
        end.row + 1
    }
}

fn line_of_byte(source: &[u8], byte: usize) -> usize {
    1 + source[..byte.min(source.len())].iter().filter(|&&b| b == b'\n').count()
}

fn node_text<'a>(node: Node<'_>, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.start_byte()..node.end_byte()]).unwrap_or("")
}

/// Classify one root child, flattening containers and hoisting declarations
/// out of otherwise-interstitial wrappers (§4.3 steps 3-4).
fn classify_child(node: Node<'_>, lang: Language, source: &[u8], raw: &mut Vec<RawEntity>) {
    let kinds = lang.node_kinds();
    let kind = node.kind();

    if kinds.preamble.contains(&kind) {
        raw.push(RawEntity::plain(EntityKind::Preamble, node));
        return;
    }
    if kinds.imports.contains(&kind) {
        raw.push(RawEntity::plain(EntityKind::ImportBlock, node));
        return;
    }
    if is_declaration_node(node, lang) {
        push_declaration_flattening_containers(node, lang, source, raw);
        return;
    }
    if kinds.comments.contains(&kind) {
        raw.push(RawEntity::plain(EntityKind::Interstitial, node));
        return;
    }

    // Otherwise: Interstitial, unless nested declarations can be hoisted out
    // (e.g. an export statement wrapping a function declaration).
    let nested = find_nested_declarations(node, lang);
    if nested.is_empty() {
        raw.push(RawEntity::plain(EntityKind::Interstitial, node));
    } else {
        for n in nested {
            push_declaration(n, lang, source, raw);
        }
    }
}

fn push_declaration_flattening_containers(
    node: Node<'_>,
    lang: Language,
    source: &[u8],
    raw: &mut Vec<RawEntity>,
) {
    if Language::is_container_kind(node.kind()) {
        let nested = find_nested_declarations(node, lang);
        if !nested.is_empty() {
            let first_start = nested[0].start_byte();
            let (name, receiver) = extract_name_receiver(node, lang, source);
            raw.push(RawEntity::declaration(
                node.start_byte(),
                first_start,
                node.start_position().row + 1,
                line_of_byte(source, first_start.saturating_sub(1)),
                node.kind().to_owned(),
                name,
                receiver,
            ));
            for n in nested {
                push_declaration(n, lang, source, raw);
            }
            return;
        }
    }
    push_declaration(node, lang, source, raw);
}

fn push_declaration(node: Node<'_>, lang: Language, source: &[u8], raw: &mut Vec<RawEntity>) {
    let (name, receiver) = extract_name_receiver(node, lang, source);
    raw.push(RawEntity::declaration(
        node.start_byte(),
        node.end_byte(),
        node.start_position().row + 1,
        line_for_end(node),
        node.kind().to_owned(),
        name,
        receiver,
    ));
}

/// §4.3 step 3's Declaration criterion.
fn is_declaration_node(node: Node<'_>, lang: Language) -> bool {
    let kinds = lang.node_kinds();
    let kind = node.kind();
    if kinds.declarations.contains(&kind) {
        return true;
    }
    if node.is_named() && (kind.contains("declaration") || kind.contains("definition")) {
        return has_name_identifier_descendant(node, lang);
    }
    false
}

fn has_name_identifier_descendant(node: Node<'_>, lang: Language) -> bool {
    let kinds = lang.node_kinds();
    if kinds.name_identifiers.contains(&node.kind()) {
        return true;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if has_name_identifier_descendant(child, lang) {
            return true;
        }
    }
    false
}

/// Recursively collect nested Declaration descendants (§4.3 step 4), without
/// descending past a declaration once found.
fn find_nested_declarations<'tree>(node: Node<'tree>, lang: Language) -> Vec<Node<'tree>> {
    let mut found = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if is_declaration_node(child, lang) {
            found.push(child);
        } else {
            found.extend(find_nested_declarations(child, lang));
        }
    }
    found
}

/// §4.3.1 name/receiver extraction rules.
fn extract_name_receiver(node: Node<'_>, lang: Language, source: &[u8]) -> (String, String) {
    let kind = node.kind();

    if lang == Language::Go && kind == "method_declaration" {
        let receiver = node
            .child_by_field_name("receiver")
            .map(|n| {
                node_text(n, source)
                    .trim_start_matches('(')
                    .trim_end_matches(')')
                    .trim()
                    .to_owned()
            })
            .unwrap_or_default();
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_owned())
            .unwrap_or_else(|| first_identifier_like(node, lang, source));
        return (name, receiver);
    }

    if lang == Language::Go && kind == "type_declaration" {
        let name = node
            .named_child(0)
            .and_then(|spec| spec.child_by_field_name("name"))
            .map(|n| node_text(n, source).to_owned())
            .unwrap_or_else(|| first_identifier_like(node, lang, source));
        return (name, String::new());
    }

    if lang == Language::Go && (kind == "var_declaration" || kind == "const_declaration") {
        let name = node
            .named_child(0)
            .and_then(|spec| spec.named_child(0))
            .filter(|n| n.kind() == "identifier")
            .map(|n| node_text(n, source).to_owned())
            .unwrap_or_else(|| first_identifier_like(node, lang, source));
        return (name, String::new());
    }

    if kind == "decorated_definition" {
        let inner = node.named_child(node.named_child_count().saturating_sub(1));
        if let Some(inner) = inner {
            return extract_name_receiver(inner, lang, source);
        }
    }

    if kind.starts_with("export_statement") {
        if let Some(inner) = node.child_by_field_name("declaration").or_else(|| node.named_child(0)) {
            return extract_name_receiver(inner, lang, source);
        }
    }

    if let Some(name_node) = node.child_by_field_name("name") {
        return (node_text(name_node, source).to_owned(), String::new());
    }
    if let Some(type_node) = node.child_by_field_name("type") {
        return (node_text(type_node, source).to_owned(), String::new());
    }

    (first_identifier_like(node, lang, source), String::new())
}

fn first_identifier_like(node: Node<'_>, lang: Language, source: &[u8]) -> String {
    let kinds = lang.node_kinds();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if kinds.name_identifiers.contains(&child.kind()) {
            return node_text(child, source).to_owned();
        }
        let nested = first_identifier_like(child, lang, source);
        if !nested.is_empty() {
            return nested;
        }
    }
    String::new()
}

/// §4.3 step 7: gap filling to satisfy the byte-coverage invariant.
fn fill_gaps(raw: &[RawEntity], source: &[u8]) -> Vec<Entity> {
    let mut entities = Vec::with_capacity(raw.len() * 2);
    let mut cursor = 0usize;

    for r in raw {
        if r.start_byte > cursor {
            entities.push(interstitial(source, cursor, r.start_byte));
        }
        let body = source[r.start_byte..r.end_byte].to_vec();
        let mut entity = Entity::new(r.kind, body.clone(), r.start_byte, r.end_byte, r.start_line, r.end_line);
        if matches!(r.kind, EntityKind::Declaration) {
            entity.decl_kind = r.decl_kind.clone();
            entity.name = r.name.clone();
            entity.receiver = r.receiver.clone();
            entity.signature = Entity::derive_signature(&body);
        }
        entities.push(entity);
        cursor = r.end_byte;
    }

    if cursor < source.len() {
        entities.push(interstitial(source, cursor, source.len()));
    }

    entities
}

fn interstitial(source: &[u8], start: usize, end: usize) -> Entity {
    Entity::new(
        EntityKind::Interstitial,
        source[start..end].to_vec(),
        start,
        end,
        line_of_byte(source, start),
        line_of_byte(source, end.saturating_sub(1).max(start)),
    )
}

/// §4.3 step 9: assign document-order ordinals within each identity base.
fn assign_ordinals(entities: &mut [Entity]) {
    let mut counters: HashMap<String, usize> = HashMap::new();
    for entity in entities.iter_mut() {
        if matches!(entity.kind, EntityKind::Interstitial) {
            continue;
        }
        let base = entity.identity_base();
        let counter = counters.entry(base).or_insert(0);
        entity.ordinal = *counter;
        *counter += 1;
    }
}

/// §4.3 step 10: link Interstitials to their nearest non-interstitial neighbors.
fn link_interstitials(entities: &mut [Entity]) {
    let keys: Vec<Option<String>> = entities
        .iter()
        .map(|e| {
            if matches!(e.kind, EntityKind::Interstitial) {
                None
            } else {
                Some(e.identity_key())
            }
        })
        .collect();

    for i in 0..entities.len() {
        if !matches!(entities[i].kind, EntityKind::Interstitial) {
            continue;
        }
        let prev = keys[..i].iter().rev().find_map(|k| k.clone()).unwrap_or_default();
        let next = keys[i + 1..].iter().find_map(|k| k.clone()).unwrap_or_default();
        entities[i].prev_entity_key = prev;
        entities[i].next_entity_key = next;
    }
}
