//! Collection path resolution.
//!
//! A collection is either global (`appointments`) or namespaced under the
//! current identity (`users/{id}/appointments`). Every call site passes a
//! [`Scope`] explicitly; nothing is inferred from the collection name.

use std::fmt;
use std::str::FromStr;

use super::StoreError;
use crate::models::Identity;

/// Logical collection names known to the app.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Collection {
    Appointments,
    ServiceProviders,
    Users,
    /// Any other collection, e.g. a per-user sub-collection.
    Named(String),
}

impl Collection {
    pub fn name(&self) -> &str {
        match self {
            Collection::Appointments => "appointments",
            Collection::ServiceProviders => "service-providers",
            Collection::Users => "users",
            Collection::Named(name) => name,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "appointments" => Collection::Appointments,
            "service-providers" => Collection::ServiceProviders,
            "users" => Collection::Users,
            other => Collection::Named(other.to_string()),
        })
    }
}

/// Where a collection lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The collection name is the path.
    Global,
    /// `users/{identity id}/{collection}`.
    OwnedByCurrentUser,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::OwnedByCurrentUser => write!(f, "owned"),
        }
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "global" => Ok(Scope::Global),
            "owned" | "user" => Ok(Scope::OwnedByCurrentUser),
            _ => Err(format!("Invalid scope '{}'. Valid options: global, owned", s)),
        }
    }
}

/// A validated path to a collection (odd number of segments).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    /// Path of a global collection.
    pub fn global(collection: &Collection) -> Result<Self, StoreError> {
        Self::from_segments(vec![collection.name().to_string()])
    }

    /// Resolves a logical collection under a scope.
    pub fn resolve(
        collection: &Collection,
        scope: Scope,
        identity: &Identity,
    ) -> Result<Self, StoreError> {
        match scope {
            Scope::Global => Self::global(collection),
            Scope::OwnedByCurrentUser => Self::from_segments(vec![
                Collection::Users.name().to_string(),
                identity.id.clone(),
                collection.name().to_string(),
            ]),
        }
    }

    /// Parses a slash-separated collection path such as `users/u1/pets`.
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        let segments: Vec<String> = path
            .trim_matches('/')
            .split('/')
            .map(str::to_string)
            .collect();
        Self::from_segments(segments)
    }

    pub fn from_segments(segments: Vec<String>) -> Result<Self, StoreError> {
        if segments.len() % 2 == 0 {
            return Err(StoreError::InvalidPath(format!(
                "'{}' is not a collection path",
                segments.join("/")
            )));
        }
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, i.e. the collection's own name.
    pub fn collection_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Rejects segments that would break path addressing.
pub fn validate_segment(segment: &str) -> Result<(), StoreError> {
    if segment.is_empty()
        || segment.contains('/')
        || segment.contains('\\')
        || segment.contains("..")
        || segment.starts_with('.')
    {
        return Err(StoreError::InvalidPath(format!(
            "invalid path segment '{}'",
            segment
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity::new("u1", "key", "pw")
    }

    #[test]
    fn test_global_scope_uses_collection_name() {
        let path =
            CollectionPath::resolve(&Collection::ServiceProviders, Scope::Global, &identity())
                .unwrap();
        assert_eq!(path.to_string(), "service-providers");
    }

    #[test]
    fn test_owned_scope_nests_under_identity() {
        let path = CollectionPath::resolve(
            &Collection::Appointments,
            Scope::OwnedByCurrentUser,
            &identity(),
        )
        .unwrap();
        assert_eq!(path.to_string(), "users/u1/appointments");
        assert_eq!(path.collection_name(), "appointments");
    }

    #[test]
    fn test_owned_scope_rejects_unsafe_identity() {
        let evil = Identity::new("../u2", "key", "pw");
        let result =
            CollectionPath::resolve(&Collection::Appointments, Scope::OwnedByCurrentUser, &evil);
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));
    }

    #[test]
    fn test_collection_from_str() {
        let parse = |s: &str| s.parse::<Collection>().unwrap();

        assert_eq!(parse("appointments"), Collection::Appointments);
        assert_eq!(parse("service-providers"), Collection::ServiceProviders);
        assert_eq!(parse("users"), Collection::Users);
        assert_eq!(
            parse("favourites"),
            Collection::Named("favourites".to_string())
        );
    }

    #[test]
    fn test_scope_from_str() {
        assert_eq!("global".parse::<Scope>(), Ok(Scope::Global));
        assert_eq!("OWNED".parse::<Scope>(), Ok(Scope::OwnedByCurrentUser));
        assert!("everyone".parse::<Scope>().is_err());
    }

    #[test]
    fn test_parse_requires_odd_segments() {
        assert!(CollectionPath::parse("users/u1/appointments").is_ok());
        assert!(CollectionPath::parse("/appointments/").is_ok());
        assert!(CollectionPath::parse("users/u1").is_err());
        assert!(CollectionPath::parse("").is_err());
        assert!(CollectionPath::parse("users//x").is_err());
    }
}
