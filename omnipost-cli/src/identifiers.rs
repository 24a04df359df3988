use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Backend identifier of a post, account, or notification, as typed on the command line.
///
/// Only characters that are safe as a single URL path segment are accepted, so an id can never
/// redirect a request to some other endpoint.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ResourceId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,128}$").unwrap();
        }
        if ID_RE.is_match(s) {
            Ok(ResourceId(s.to_string()))
        } else {
            Err(anyhow!("not a valid resource id: {:?}", s))
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[test]
fn test_resource_id() {
    assert_eq!(ResourceId::from_str("p1").unwrap().as_str(), "p1");
    assert!(ResourceId::from_str("65f1c0a2e4b0a1b2c3d4e5f6").is_ok());
    assert!(ResourceId::from_str("1b4e28ba-2fa1-11d2-883f-0016d3cca427").is_ok());
    assert!(ResourceId::from_str("notif_42").is_ok());

    assert!(ResourceId::from_str("").is_err());
    assert!(ResourceId::from_str(" ").is_err());
    assert!(ResourceId::from_str("..").is_err());
    assert!(ResourceId::from_str("a/b").is_err());
    assert!(ResourceId::from_str("p1?force=true").is_err());
    assert!(ResourceId::from_str(&"x".repeat(129)).is_err());

    let id = ResourceId::from_str("acc-9").unwrap();
    assert_eq!(id.to_string(), "acc-9");
}
