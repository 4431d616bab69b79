//! The entity model (§3): the structural unit every other module operates on.

use sha2::{Digest, Sha256};

/// The kind of a structural unit of a source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Package/module header, file-top license comments.
    Preamble,
    /// One or more import statements treated as a logical group.
    ImportBlock,
    /// A named top-level declaration.
    Declaration,
    /// Bytes between two other entities.
    Interstitial,
}

/// A single structural unit of a source file (§3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityKind,
    pub body: Vec<u8>,
    pub body_hash: String,
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_line: usize,
    pub end_line: usize,
    /// Concrete tree-sitter node kind for Declarations; empty otherwise.
    pub decl_kind: String,
    /// Declaration identifier text; empty for non-declarations.
    pub name: String,
    /// Receiver text for method-like declarations; empty otherwise.
    pub receiver: String,
    /// Normalized single-line header for Declarations; empty otherwise.
    pub signature: String,
    /// Zero-based disambiguation counter within the file, per identity base.
    pub ordinal: usize,
    /// For Interstitials only: identity key of the nearest preceding
    /// non-interstitial entity. Empty at file start.
    pub prev_entity_key: String,
    /// For Interstitials only: identity key of the nearest following
    /// non-interstitial entity. Empty at file end.
    pub next_entity_key: String,
}

fn sha256_hex(body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

fn normalize_whitespace(s: &str) -> String {
    let collapsed: Vec<&str> = s.split_whitespace().collect();
    collapsed.join(" ")
}

impl Entity {
    /// Build an entity from its byte range and body, computing `body_hash`.
    #[must_use]
    pub fn new(
        kind: EntityKind,
        body: Vec<u8>,
        start_byte: usize,
        end_byte: usize,
        start_line: usize,
        end_line: usize,
    ) -> Self {
        let body_hash = sha256_hex(&body);
        Self {
            kind,
            body,
            body_hash,
            start_byte,
            end_byte,
            start_line,
            end_line,
            decl_kind: String::new(),
            name: String::new(),
            receiver: String::new(),
            signature: String::new(),
            ordinal: 0,
            prev_entity_key: String::new(),
            next_entity_key: String::new(),
        }
    }

    /// Recompute `body_hash` after replacing `body` (§3 lifecycle: hashes are
    /// recomputed only when Body is replaced).
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body_hash = sha256_hex(&body);
        self.body = body;
    }

    /// Derive the normalized, single-line `Signature` from `body` (§3): strip
    /// leading whitespace, truncate at the first `{` or line break, collapse
    /// whitespace runs.
    #[must_use]
    pub fn derive_signature(body: &[u8]) -> String {
        let text = String::from_utf8_lossy(body);
        let trimmed = text.trim_start();
        let cut = trimmed
            .find(['{', '\n'])
            .unwrap_or(trimmed.len());
        normalize_whitespace(&trimmed[..cut])
    }

    /// The identity base this entity groups under for ordinal assignment (§4.3
    /// step 9): `preamble`, `import_block`, or `decl:<DeclKind>:<Receiver>:<Name>:<Signature>`.
    #[must_use]
    pub fn identity_base(&self) -> String {
        match self.kind {
            EntityKind::Preamble => "preamble".to_owned(),
            EntityKind::ImportBlock => "import_block".to_owned(),
            EntityKind::Declaration => {
                let receiver = if self.receiver.is_empty() { "-" } else { &self.receiver };
                let name = if self.name.is_empty() { "-" } else { &self.name };
                let sig = normalize_whitespace(&self.signature);
                let sig = if sig.is_empty() { "-".to_owned() } else { sig };
                format!("decl:{}:{receiver}:{name}:{sig}", self.decl_kind)
            }
            EntityKind::Interstitial => {
                format!("between:{}:{}", self.prev_entity_key, self.next_entity_key)
            }
        }
    }

    /// The stable cross-revision identity key (§3): `<identity-base>:<ordinal>`,
    /// except Interstitials, whose key already has no ordinal component.
    #[must_use]
    pub fn identity_key(&self) -> String {
        match self.kind {
            EntityKind::Interstitial => self.identity_base(),
            _ => format!("{}:{}", self.identity_base(), self.ordinal),
        }
    }
}

/// An ordered sequence of [`Entity`] values plus source metadata (§3).
#[derive(Clone, Debug)]
pub struct EntityList {
    pub language: String,
    pub path: String,
    pub source: Vec<u8>,
    pub entities: Vec<Entity>,
}

impl EntityList {
    #[must_use]
    pub fn new(language: String, path: String, source: Vec<u8>, entities: Vec<Entity>) -> Self {
        Self {
            language,
            path,
            source,
            entities,
        }
    }

    /// Concatenate the byte coverage of all entities. Equal to `source` for
    /// an unmodified extraction (§3 invariant 1, §8 round-trip property).
    #[must_use]
    pub fn covered_bytes(&self) -> Vec<u8> {
        self.entities.iter().flat_map(|e| e.body.clone()).collect()
    }
}
