use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

use super::refs::{SchemaRef, schema_refs};
use crate::error::ClosureError;

/// Schemas reachable from a root, keyed by reference, in discovery order.
pub type Closure<'a> = IndexMap<SchemaRef, &'a Value>;

/// Compute the transitive closure of `initial` over `$ref` edges.
///
/// Breadth-first: every distinct reference is resolved and scanned exactly
/// once, which is what makes cyclic and self-referencing schemas terminate.
/// `root` is reported as the referrer of the initial references.
pub fn expand<'a>(
    document: &'a Value,
    root: &SchemaRef,
    initial: impl IntoIterator<Item = SchemaRef>,
) -> Result<Closure<'a>, ClosureError> {
    let mut visited: HashSet<SchemaRef> = HashSet::new();
    let mut queue: VecDeque<(SchemaRef, SchemaRef)> = VecDeque::new();

    for schema_ref in initial {
        if visited.insert(schema_ref.clone()) {
            queue.push_back((schema_ref, root.clone()));
        }
    }

    // FIFO order means dequeue order equals discovery order.
    let mut closure = Closure::new();
    while let Some((current, referrer)) = queue.pop_front() {
        let node = current
            .resolve(document)
            .map_err(|_| ClosureError::DanglingRef {
                pointer: current.to_string(),
                referenced_by: referrer.name().to_string(),
            })?;
        debug!("expanding {} (referenced by {})", current, referrer.name());

        for child in schema_refs(node, &current)? {
            if visited.insert(child.clone()) {
                queue.push_back((child, current.clone()));
            }
        }
        closure.insert(current, node);
    }

    Ok(closure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(closure: &Closure<'_>) -> Vec<String> {
        closure.keys().map(|r| r.name().to_string()).collect()
    }

    #[test]
    fn expand_empty_initial() {
        let doc = json!({ "components": { "schemas": {} } });
        let closure = expand(&doc, &SchemaRef::new("Root"), Vec::new()).unwrap();
        assert!(closure.is_empty());
    }

    #[test]
    fn expand_follows_chain_breadth_first() {
        let doc = json!({ "components": { "schemas": {
            "A": { "properties": {
                "b": { "$ref": "#/components/schemas/B" },
                "c": { "$ref": "#/components/schemas/C" }
            } },
            "B": { "items": { "$ref": "#/components/schemas/D" } },
            "C": { "type": "string" },
            "D": { "type": "integer" },
            "Unrelated": { "type": "boolean" }
        } } });
        let closure = expand(&doc, &SchemaRef::new("Root"), [SchemaRef::new("A")]).unwrap();
        assert_eq!(names(&closure), ["A", "B", "C", "D"]);
        assert_eq!(closure[&SchemaRef::new("D")]["type"], "integer");
    }

    #[test]
    fn expand_deduplicates_initial() {
        let doc = json!({ "components": { "schemas": { "Tag": { "type": "string" } } } });
        let closure = expand(
            &doc,
            &SchemaRef::new("Root"),
            [SchemaRef::new("Tag"), SchemaRef::new("Tag")],
        )
        .unwrap();
        assert_eq!(names(&closure), ["Tag"]);
    }

    #[test]
    fn expand_terminates_on_cycle() {
        let doc = json!({ "components": { "schemas": {
            "A": { "$ref": "#/components/schemas/B" },
            "B": { "$ref": "#/components/schemas/A" }
        } } });
        let closure = expand(&doc, &SchemaRef::new("A"), [SchemaRef::new("B")]).unwrap();
        assert_eq!(names(&closure), ["B", "A"]);
    }

    #[test]
    fn expand_dangling_names_pointer_and_referrer() {
        let doc = json!({ "components": { "schemas": {
            "A": { "$ref": "#/components/schemas/Ghost" }
        } } });
        let err = expand(&doc, &SchemaRef::new("Root"), [SchemaRef::new("A")]).unwrap_err();
        assert_eq!(
            err,
            ClosureError::DanglingRef {
                pointer: "#/components/schemas/Ghost".into(),
                referenced_by: "A".into(),
            }
        );
    }
}
