//! Cross-namespace reference authorization
//!
//! A ReferenceGrant lives in the namespace being referenced *into* and lists
//! which namespaces may refer to which kinds (optionally which names) there.
//! Only the outcome is reported; nothing is enforced.

use crate::resources::ReferenceGrant;

/// Whether a reference from `from_ns` to `kind`/`name` in `to_ns` is permitted.
///
/// Same-namespace references never need a grant. For cross-namespace
/// references a grant in `to_ns` must list a matching `to` entry (same kind,
/// and either no name or the same name) and a `from` entry for `from_ns`.
/// The `from` entry's kind is not consulted.
pub fn grant_allows(
    grants: &[ReferenceGrant],
    from_ns: &str,
    to_ns: &str,
    kind: &str,
    name: &str,
) -> bool {
    if from_ns == to_ns {
        return true;
    }

    grants
        .iter()
        .filter(|g| g.metadata.namespace_or_default() == to_ns)
        .any(|g| {
            let to_matches = g.spec.to.iter().any(|t| {
                t.kind == kind
                    && t.name
                        .as_deref()
                        .filter(|n| !n.is_empty())
                        .map_or(true, |n| n == name)
            });
            to_matches && g.spec.from.iter().any(|f| f.namespace == from_ns)
        })
}
