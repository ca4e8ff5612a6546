//! CKAN dataset attributes → Tabular Data Format (Data Package) attributes.
//!
//! The conversion is a projection driven by [`RULES`]: each rule names one
//! output key and the dataset keys it is built from. Dataset keys no rule
//! mentions are dropped, and a key whose value is `null` counts as absent.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};

/// A flat JSON object of attributes, dataset-side or TDF-side.
pub type Attributes = Map<String, Value>;

/// How one output key is built from the dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// The value of one dataset key, unchanged.
    Copy(&'static str),
    /// An object of `(dataset key, object key)` pairs.
    Object(&'static [(&'static str, &'static str)]),
    /// Like `Object`, wrapped in a one-element list.
    ObjectList(&'static [(&'static str, &'static str)]),
    /// `key` of every object in the list stored under `from`, in order.
    Pluck {
        from: &'static str,
        key: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub target: &'static str,
    pub projection: Projection,
    pub required: bool,
}

impl Rule {
    const fn optional(target: &'static str, projection: Projection) -> Self {
        Rule {
            target,
            projection,
            required: false,
        }
    }
}

pub const RULES: &[Rule] = &[
    Rule {
        target: "name",
        projection: Projection::Copy("name"),
        required: true,
    },
    Rule::optional("title", Projection::Copy("title")),
    Rule::optional("version", Projection::Copy("version")),
    Rule::optional(
        "license",
        Projection::Object(&[
            ("license_id", "type"),
            ("license_title", "title"),
            ("license_url", "url"),
        ]),
    ),
    Rule::optional(
        "sources",
        Projection::ObjectList(&[
            ("author", "name"),
            ("author_email", "email"),
            ("source", "web"),
        ]),
    ),
    Rule::optional(
        "author",
        Projection::Object(&[("maintainer", "name"), ("maintainer_email", "email")]),
    ),
    Rule::optional(
        "keywords",
        Projection::Pluck {
            from: "tags",
            key: "name",
        },
    ),
];

fn present<'a>(dataset: &'a Attributes, key: &str) -> Option<&'a Value> {
    dataset.get(key).filter(|v| !v.is_null())
}

fn object_of(dataset: &Attributes, pairs: &[(&str, &str)]) -> Option<Attributes> {
    let obj: Attributes = pairs
        .iter()
        .filter_map(|(from, to)| present(dataset, from).map(|v| (to.to_string(), v.clone())))
        .collect();
    (!obj.is_empty()).then_some(obj)
}

impl Projection {
    /// The projected value, or `None` when the dataset has none of the
    /// source keys.
    pub fn apply(&self, dataset: &Attributes) -> Result<Option<Value>> {
        let value = match *self {
            Projection::Copy(key) => present(dataset, key).cloned(),
            Projection::Object(pairs) => object_of(dataset, pairs).map(Value::Object),
            Projection::ObjectList(pairs) => {
                object_of(dataset, pairs).map(|obj| Value::Array(vec![Value::Object(obj)]))
            }
            Projection::Pluck { from, key } => match present(dataset, from) {
                None => None,
                Some(Value::Array(items)) => Some(Value::Array(pluck(from, key, items)?)),
                Some(_) => {
                    return Err(Error::UnexpectedType {
                        key: from.to_string(),
                        expected: "a list of objects",
                    })
                }
            },
        };
        Ok(value)
    }

    /// Dataset keys this projection reads.
    pub fn sources(&self) -> Vec<&'static str> {
        match *self {
            Projection::Copy(key) => vec![key],
            Projection::Object(pairs) | Projection::ObjectList(pairs) => {
                pairs.iter().map(|(from, _)| *from).collect()
            }
            Projection::Pluck { from, .. } => vec![from],
        }
    }
}

fn pluck(from: &str, key: &str, items: &[Value]) -> Result<Vec<Value>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let obj = item.as_object().ok_or_else(|| Error::UnexpectedType {
                key: format!("{}[{}]", from, i),
                expected: "an object",
            })?;
            present(obj, key)
                .cloned()
                .ok_or_else(|| Error::MissingKey(format!("{}[{}].{}", from, i, key)))
        })
        .collect()
}

/// Convert a CKAN dataset attribute mapping into TDF attributes.
///
/// Only `name` is required. The output holds only the keys the dataset has
/// data for.
pub fn convert_dataset_attributes(dataset: &Attributes) -> Result<Attributes> {
    let mut out = Attributes::new();
    for rule in RULES {
        match rule.projection.apply(dataset)? {
            Some(value) => {
                out.insert(rule.target.to_string(), value);
            }
            None if rule.required => {
                return Err(Error::MissingKey(rule.projection.sources().join(", ")));
            }
            None => {}
        }
    }
    debug!(keys = out.len(), "converted dataset attributes");
    Ok(out)
}

/// [`convert_dataset_attributes`] for a JSON document that must be an object.
pub fn convert_json(dataset: &Value) -> Result<Value> {
    let obj = dataset.as_object().ok_or_else(|| Error::UnexpectedType {
        key: "dataset".to_string(),
        expected: "an object",
    })?;
    convert_dataset_attributes(obj).map(Value::Object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(v: Value) -> Attributes {
        v.as_object().cloned().expect("test input is an object")
    }

    fn gdp() -> Attributes {
        attrs(json!({
            "name": "gdp",
            "title": "Countries GDP",
            "version": "1.0",
        }))
    }

    #[test]
    fn test_only_name_is_required() {
        let err = convert_dataset_attributes(&Attributes::new()).unwrap_err();
        assert!(matches!(err, Error::MissingKey(ref k) if k == "name"));

        let out = convert_dataset_attributes(&attrs(json!({"name": "gdp"}))).unwrap();
        assert_eq!(Value::Object(out), json!({"name": "gdp"}));

        let null_name = attrs(json!({"name": null, "title": "x"}));
        assert!(matches!(
            convert_dataset_attributes(&null_name),
            Err(Error::MissingKey(_))
        ));
    }

    #[test]
    fn test_pass_through_attributes() {
        let out = convert_dataset_attributes(&gdp()).unwrap();
        assert_eq!(out, gdp());
    }

    #[test]
    fn test_license() {
        let mut dataset = gdp();
        dataset.extend(attrs(json!({
            "license_id": "cc-zero",
            "license_title": "Creative Commons CC Zero License (cc-zero)",
            "license_url": "http://opendefinition.org/licenses/cc-zero/",
        })));
        let out = convert_dataset_attributes(&dataset).unwrap();
        assert_eq!(
            out["license"],
            json!({
                "type": "cc-zero",
                "title": "Creative Commons CC Zero License (cc-zero)",
                "url": "http://opendefinition.org/licenses/cc-zero/",
            })
        );
    }

    #[test]
    fn test_author_and_source_become_sources() {
        let dataset = attrs(json!({
            "name": "gdp",
            "author": "WB",
            "author_email": "a@b.org",
            "source": "http://x",
        }));
        let out = convert_dataset_attributes(&dataset).unwrap();
        assert_eq!(
            out["sources"],
            json!([{"name": "WB", "email": "a@b.org", "web": "http://x"}])
        );
        assert!(!out.contains_key("author"));
    }

    #[test]
    fn test_maintainer_becomes_author() {
        let mut dataset = gdp();
        dataset.extend(attrs(json!({
            "maintainer": "John Smith",
            "maintainer_email": "jsmith@email.com",
        })));
        let out = convert_dataset_attributes(&dataset).unwrap();
        assert_eq!(
            out["author"],
            json!({"name": "John Smith", "email": "jsmith@email.com"})
        );
        assert!(!out.contains_key("sources"));
    }

    #[test]
    fn test_partial_groups_have_no_placeholders() {
        let dataset = attrs(json!({"name": "gdp", "license_id": "odc-by", "author": null}));
        let out = convert_dataset_attributes(&dataset).unwrap();
        assert_eq!(out["license"], json!({"type": "odc-by"}));
        assert!(!out.contains_key("sources"));
        assert!(!out.contains_key("title"));
    }

    #[test]
    fn test_tags_become_keywords() {
        let mut dataset = gdp();
        dataset.extend(attrs(json!({
            "tags": [
                {
                    "display_name": "economy",
                    "id": "9d602a79-7742-44a7-9029-50b9eca38c90",
                    "name": "economy",
                    "state": "active"
                },
                {
                    "display_name": "worldbank",
                    "id": "3ccc2e3b-f875-49ef-a39d-6601d6c0ef76",
                    "name": "worldbank",
                    "state": "active"
                }
            ]
        })));
        let out = convert_dataset_attributes(&dataset).unwrap();
        assert_eq!(out["keywords"], json!(["economy", "worldbank"]));
    }

    #[test]
    fn test_bad_tags() {
        let no_name = attrs(json!({"name": "gdp", "tags": [{"name": "a"}, {"id": "x"}]}));
        assert!(matches!(
            convert_dataset_attributes(&no_name),
            Err(Error::MissingKey(ref k)) if k == "tags[1].name"
        ));

        let not_list = attrs(json!({"name": "gdp", "tags": "economy"}));
        assert!(matches!(
            convert_dataset_attributes(&not_list),
            Err(Error::UnexpectedType { .. })
        ));
    }

    #[test]
    fn test_other_keys_are_dropped() {
        let dataset = attrs(json!({"name": "gdp", "notes": "x", "resources": []}));
        let out = convert_dataset_attributes(&dataset).unwrap();
        assert_eq!(Value::Object(out), json!({"name": "gdp"}));
    }

    #[test]
    fn test_rule_table() {
        let targets: Vec<&str> = RULES.iter().map(|r| r.target).collect();
        assert_eq!(
            targets,
            vec!["name", "title", "version", "license", "sources", "author", "keywords"]
        );
        assert_eq!(RULES.iter().filter(|r| r.required).count(), 1);

        let read: Vec<&str> = RULES.iter().flat_map(|r| r.projection.sources()).collect();
        assert_eq!(
            read,
            vec![
                "name",
                "title",
                "version",
                "license_id",
                "license_title",
                "license_url",
                "author",
                "author_email",
                "source",
                "maintainer",
                "maintainer_email",
                "tags",
            ]
        );
    }

    #[test]
    fn test_convert_json_requires_object() {
        assert!(convert_json(&json!(["gdp"])).is_err());
        assert_eq!(
            convert_json(&json!({"name": "gdp"})).unwrap(),
            json!({"name": "gdp"})
        );
    }
}
