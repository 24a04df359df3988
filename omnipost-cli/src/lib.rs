use anyhow::anyhow;
pub use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::str::FromStr;

pub mod identifiers;
pub mod pretty;

pub use identifiers::ResourceId;
pub use omnipost::*;

/// Represents fields/content specified on the command line.
///
/// Sort of like HTTPie. Query parameters are '==', body values (JSON) are '='. Only single-level
/// body values are allowed currently, not JSON Pointer assignment.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ArgField {
    Query(String, serde_json::Value),
    Body(String, serde_json::Value),
}

impl FromStr for ArgField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref FIELD_RE: Regex = Regex::new(r"^([a-zA-Z_][a-zA-Z0-9_]*)=(=)?(.*)$").unwrap();
        }
        if let Some(captures) = FIELD_RE.captures(s) {
            let key = captures[1].to_string();
            let val =
                Value::from_str(&captures[3]).unwrap_or(Value::String(captures[3].to_string()));
            let val = match val {
                Value::String(s) if s.is_empty() => Value::Null,
                _ => val,
            };
            if captures.get(2).is_some() {
                Ok(ArgField::Query(key, val))
            } else {
                Ok(ArgField::Body(key, val))
            }
        } else {
            Err(anyhow!("could not parse as a field assignment: {}", s))
        }
    }
}

/// Query parameters from the '==' fields, in command-line order
pub fn query_from_fields(fields: &[ArgField]) -> Vec<(String, String)> {
    fields
        .iter()
        .filter_map(|f| match f {
            ArgField::Query(k, Value::String(s)) => Some((k.to_string(), s.to_string())),
            ArgField::Query(k, v) => Some((k.to_string(), v.to_string())),
            ArgField::Body(..) => None,
        })
        .collect()
}

/// JSON body from the '=' fields; `None` if there are no body fields at all.
///
/// Consumes the entire Vec of fields passed in.
pub fn body_from_fields(fields: Vec<ArgField>) -> Option<Value> {
    let mut map = serde_json::Map::new();
    for f in fields.into_iter() {
        if let ArgField::Body(k, v) = f {
            map.insert(k, v);
        }
    }
    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}

#[test]
fn test_argfield() {
    use serde_json::json;
    assert_eq!(
        ArgField::from_str("limit=3").unwrap(),
        ArgField::Body("limit".to_string(), json!(3)),
    );
    assert_eq!(
        ArgField::from_str("page==3").unwrap(),
        ArgField::Query("page".to_string(), json!(3)),
    );
    assert_eq!(
        ArgField::from_str("platform==\"twitter\"").unwrap(),
        ArgField::Query("platform".to_string(), Value::String("twitter".to_string()))
    );
    assert_eq!(
        ArgField::from_str("platform==twitter").unwrap(),
        ArgField::Query("platform".to_string(), Value::String("twitter".to_string()))
    );
    assert_eq!(
        ArgField::from_str("scheduledFor=").unwrap(),
        ArgField::Body("scheduledFor".to_string(), Value::Null),
    );
    assert_eq!(
        ArgField::from_str("selectedPlatforms=[\"twitter\",\"tiktok\"]").unwrap(),
        ArgField::Body(
            "selectedPlatforms".to_string(),
            json!(["twitter", "tiktok"])
        ),
    );

    assert!(ArgField::from_str("content").is_err());
    assert!(ArgField::from_str("").is_err());
    assert!(ArgField::from_str("post.content=hi").is_err());
    assert!(ArgField::from_str("2fa=1").is_err());

    assert!(ArgField::from_str("content=\"launch day, all hands\"").is_ok());
}

#[test]
fn test_fields_split() {
    use serde_json::json;
    let fields: Vec<ArgField> = ["page==2", "limit==50", "content=hello", "draft=true"]
        .iter()
        .map(|s| ArgField::from_str(s).unwrap())
        .collect();
    assert_eq!(
        query_from_fields(&fields),
        vec![
            ("page".to_string(), "2".to_string()),
            ("limit".to_string(), "50".to_string()),
        ]
    );
    assert_eq!(
        body_from_fields(fields),
        Some(json!({"content": "hello", "draft": true}))
    );
    assert_eq!(
        body_from_fields(vec![ArgField::Query("page".to_string(), json!(1))]),
        None
    );
}
