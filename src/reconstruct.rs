//! Entity reconstruction (§4.7): turn a resolved entity sequence back into
//! file bytes, wrapping unresolved conflicts in standard conflict markers.

use crate::entity::Entity;

/// One entity's resolved content, or an unresolved conflict between two
/// candidate bodies (§4.6 per-disposition resolution output).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedBody {
    Clean(Vec<u8>),
    Conflict { ours: Vec<u8>, theirs: Vec<u8> },
}

/// A single resolved entity, carrying enough of [`Entity`] to preserve
/// document order; reconstruction never re-derives order from identity keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedEntity {
    pub body: ResolvedBody,
}

impl ResolvedEntity {
    #[must_use]
    pub fn clean(body: Vec<u8>) -> Self {
        Self {
            body: ResolvedBody::Clean(body),
        }
    }

    #[must_use]
    pub fn from_entity(entity: &Entity) -> Self {
        Self::clean(entity.body.clone())
    }

    #[must_use]
    pub fn conflict(ours: Vec<u8>, theirs: Vec<u8>) -> Self {
        Self {
            body: ResolvedBody::Conflict { ours, theirs },
        }
    }
}

/// Concatenate resolved entity bodies in order, wrapping conflicts in
/// `<<<<<<< ours` / `=======` / `>>>>>>> theirs` markers (§4.7, §6
/// `Reconstruct`). `Reconstruct([])` yields empty bytes.
#[must_use]
pub fn reconstruct(entities: &[ResolvedEntity]) -> Vec<u8> {
    let mut out = Vec::new();
    for entity in entities {
        match &entity.body {
            ResolvedBody::Clean(body) => out.extend_from_slice(body),
            ResolvedBody::Conflict { ours, theirs } => {
                out.extend_from_slice(b"<<<<<<< ours\n");
                out.extend_from_slice(ours);
                if !ours.ends_with(b"\n") {
                    out.push(b'\n');
                }
                out.extend_from_slice(b"=======\n");
                out.extend_from_slice(theirs);
                if !theirs.ends_with(b"\n") {
                    out.push(b'\n');
                }
                out.extend_from_slice(b">>>>>>> theirs\n");
            }
        }
    }
    out
}
