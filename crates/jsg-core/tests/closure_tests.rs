use std::collections::BTreeSet;

use jsg_core::closure::{SchemaRef, find_refs};
use jsg_core::error::ClosureError;
use jsg_core::{BuildOptions, Document, SchemaDialect, StandaloneSchema, build_schema, parse};
use serde_json::json;

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");
const BROKEN: &str = include_str!("fixtures/broken.yaml");

fn petstore() -> Document {
    parse::from_yaml(PETSTORE).expect("petstore fixture should parse")
}

fn keys(schema: &StandaloneSchema) -> Vec<&str> {
    schema
        .components
        .schemas
        .keys()
        .map(String::as_str)
        .collect()
}

fn build(doc: &Document, name: &str) -> StandaloneSchema {
    build_schema(doc, name, &BuildOptions::default())
        .unwrap_or_else(|e| panic!("building {name} failed: {e}"))
}

/// Every schema reachable from `name` by following `$ref` edges, computed
/// by a naive depth-first walk independent of the builder.
fn reachable(doc: &Document, name: &str) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut stack = vec![name.to_string()];
    while let Some(current) = stack.pop() {
        if !seen.insert(current.clone()) {
            continue;
        }
        let node = &doc["components"]["schemas"][current.as_str()];
        for site in find_refs(node) {
            let schema_ref = SchemaRef::parse(site.pointer().unwrap()).unwrap();
            stack.push(schema_ref.name().to_string());
        }
    }
    seen
}

#[test]
fn pet_pulls_in_its_references_only() {
    let doc = petstore();
    let schema = build(&doc, "Pet");

    assert_eq!(schema.root_ref, "#/components/schemas/Pet");
    assert_eq!(keys(&schema), ["Pet", "Category", "Tag", "PetStatus"]);
    assert_eq!(
        schema.components.schemas["PetStatus"]["enum"],
        json!(["available", "pending", "sold"])
    );
}

#[test]
fn closure_is_complete_and_minimal_for_every_schema() {
    let doc = petstore();
    for name in jsg_core::schema_names(&doc) {
        let schema = build(&doc, &name);
        let produced: BTreeSet<String> = schema.components.schemas.keys().cloned().collect();
        assert_eq!(produced, reachable(&doc, &name), "closure of {name}");
    }
}

#[test]
fn definitions_are_copied_verbatim() {
    let doc = petstore();
    let schema = build(&doc, "Order");
    for (name, definition) in &schema.components.schemas {
        assert_eq!(definition, &doc["components"]["schemas"][name.as_str()]);
    }
}

#[test]
fn nested_composition_refs_are_followed() {
    let doc = petstore();
    let schema = build(&doc, "Order");
    assert_eq!(
        keys(&schema),
        ["Order", "Pet", "Address", "Category", "Tag", "PetStatus"]
    );

    let shape = build(&doc, "Shape");
    assert_eq!(keys(&shape), ["Shape", "Circle", "Square"]);
}

#[test]
fn mutual_references_terminate() {
    let doc = petstore();
    let schema = build(&doc, "Person");
    assert_eq!(keys(&schema), ["Person", "Company"]);

    let schema = build(&doc, "Company");
    assert_eq!(keys(&schema), ["Company", "Person"]);
}

#[test]
fn self_reference_terminates() {
    let doc = petstore();
    assert_eq!(keys(&build(&doc, "TreeNode")), ["TreeNode"]);
}

#[test]
fn schema_without_refs_contains_only_root() {
    let doc = petstore();
    assert_eq!(keys(&build(&doc, "Error")), ["Error"]);
    assert_eq!(keys(&build(&doc, "Unused")), ["Unused"]);
}

#[test]
fn building_twice_is_byte_identical() {
    let doc = petstore();
    let first = build(&doc, "Order").to_json_pretty().unwrap();
    let second = build(&doc, "Order").to_json_pretty().unwrap();
    assert_eq!(first, second);

    let reparsed = parse::from_yaml(PETSTORE).unwrap();
    assert_eq!(build(&reparsed, "Order").to_json_pretty().unwrap(), first);
}

#[test]
fn unknown_root_is_schema_not_found() {
    let doc = petstore();
    let err = build_schema(&doc, "Dog", &BuildOptions::default()).unwrap_err();
    assert_eq!(err, ClosureError::SchemaNotFound("Dog".into()));
    assert_eq!(
        err.to_string(),
        "schema not found in components.schemas: Dog"
    );
}

#[test]
fn dangling_reference_is_reported_with_referrer() {
    let doc = parse::from_yaml(BROKEN).unwrap();
    let err = build_schema(&doc, "Invoice", &BuildOptions::default()).unwrap_err();
    assert_eq!(
        err,
        ClosureError::DanglingRef {
            pointer: "#/components/schemas/Product".into(),
            referenced_by: "InvoiceLine".into(),
        }
    );
}

#[test]
fn dangling_reference_from_root() {
    let doc = json!({ "components": { "schemas": {
        "Pet": { "properties": { "owner": { "$ref": "#/components/schemas/Owner" } } }
    } } });
    let err = build_schema(&doc, "Pet", &BuildOptions::default()).unwrap_err();
    assert_eq!(
        err,
        ClosureError::DanglingRef {
            pointer: "#/components/schemas/Owner".into(),
            referenced_by: "Pet".into(),
        }
    );
}

#[test]
fn reference_outside_schemas_is_malformed() {
    let doc = parse::from_yaml(BROKEN).unwrap();
    let err = build_schema(&doc, "Receipt", &BuildOptions::default()).unwrap_err();
    assert_eq!(
        err,
        ClosureError::MalformedRef {
            value: "\"#/components/parameters/Amount\"".into(),
            referenced_by: "Receipt".into(),
            location: "#/components/schemas/Receipt/properties/total/$ref".into(),
        }
    );
}

#[test]
fn unaffected_schemas_still_build_in_broken_document() {
    let doc = parse::from_yaml(BROKEN).unwrap();
    assert_eq!(keys(&build(&doc, "Standalone")), ["Standalone"]);
    assert_eq!(keys(&build(&doc, "Customer")), ["Customer"]);
}

#[test]
fn escaped_schema_names_resolve() {
    let doc = json!({ "components": { "schemas": {
        "v1/Pet": { "properties": { "tag": { "$ref": "#/components/schemas/v1~1Tag" } } },
        "v1/Tag": { "type": "string" }
    } } });
    let schema = build(&doc, "v1/Pet");
    assert_eq!(schema.root_ref, "#/components/schemas/v1~1Pet");
    assert_eq!(keys(&schema), ["v1/Pet", "v1/Tag"]);
}

#[test]
fn pet_tag_scenario_output() {
    let doc = json!({
        "openapi": "3.0.0",
        "components": { "schemas": {
            "Pet": { "$ref": "#/components/schemas/Tag" },
            "Tag": { "type": "string" },
            "Other": { "type": "number" }
        } }
    });
    let rendered = build(&doc, "Pet").to_json_pretty().unwrap();
    insta::assert_snapshot!(rendered, @r##"
    {
      "$schema": "http://json-schema.org/draft-04/schema#",
      "$ref": "#/components/schemas/Pet",
      "components": {
        "schemas": {
          "Pet": {
            "$ref": "#/components/schemas/Tag"
          },
          "Tag": {
            "type": "string"
          }
        }
      }
    }
    "##);
}

#[test]
fn draft_07_dialect_output() {
    let doc = petstore();
    let options = BuildOptions {
        dialect: SchemaDialect::Draft07,
    };
    let schema = build_schema(&doc, "Error", &options).unwrap();
    let rendered = schema.to_json_pretty().unwrap();
    insta::assert_snapshot!(rendered, @r##"
    {
      "$schema": "http://json-schema.org/draft-07/schema#",
      "$ref": "#/components/schemas/Error",
      "components": {
        "schemas": {
          "Error": {
            "type": "object",
            "required": [
              "code",
              "message"
            ],
            "properties": {
              "code": {
                "type": "integer",
                "format": "int32"
              },
              "message": {
                "type": "string"
              }
            }
          }
        }
      }
    }
    "##);
}
