use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::{fields_from_value, merge_top_level, Fields, Record};
use super::Entity;

/// The service a provider offers, stored inline on the provider's profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A single failed form rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

impl Service {
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price: Some(price),
            image_url: None,
        }
    }

    /// Checks the service form rules, reporting every failing field.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(ValidationError {
                field: "name",
                message: "Name is required",
            });
        }
        match self.price {
            None => errors.push(ValidationError {
                field: "price",
                message: "Price is required",
            }),
            Some(p) if !p.is_finite() => errors.push(ValidationError {
                field: "price",
                message: "Price must be a number",
            }),
            Some(_) => {}
        }
        if self.description.trim().is_empty() {
            errors.push(ValidationError {
                field: "description",
                message: "Description is required",
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A user or service-provider profile, keyed by the owner's identity id.
///
/// Only `service` is modelled; every other stored key is carried in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl UserProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            service: None,
            extra: Fields::new(),
        }
    }

    pub fn with_service(mut self, service: Service) -> Self {
        self.service = Some(service);
        self
    }

    /// Applies a top-level patch, returning the merged profile.
    ///
    /// Fails if the patch puts a value of the wrong shape into `service`.
    pub fn merged(&self, patch: &Fields) -> Result<Self, serde_json::Error> {
        let mut fields = self.to_fields()?;
        merge_top_level(&mut fields, patch);
        serde_json::from_value(serde_json::Value::Object(fields))
    }

    /// Serializes to document fields (including `id`).
    pub fn to_fields(&self) -> Result<Fields, serde_json::Error> {
        let value = serde_json::to_value(self)?;
        Ok(fields_from_value(value).unwrap_or_default())
    }
}

impl Entity for UserProfile {
    fn id(&self) -> &str {
        &self.id
    }
}

impl TryFrom<Record> for UserProfile {
    type Error = serde_json::Error;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        serde_json::from_value(record.into_value())
    }
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .extra
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or(&self.id);
        writeln!(f, "{}", name)?;
        match &self.service {
            Some(service) => {
                write!(f, "  {}", service.name)?;
                if let Some(price) = service.price {
                    write!(f, " ({:.2})", price)?;
                }
                writeln!(f)?;
                if !service.description.is_empty() {
                    writeln!(f, "  {}", service.description)?;
                }
                if let Some(url) = &service.image_url {
                    writeln!(f, "  image: {}", url)?;
                }
            }
            None => writeln!(f, "  (no service offered)")?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_record_splits_service_and_extra() {
        let record = Record::from_document(
            "u1",
            fields_from_value(json!({
                "name": "Ann",
                "service": {"name": "Haircut", "description": "Short", "price": 20}
            }))
            .unwrap(),
        );

        let profile = UserProfile::try_from(record).unwrap();

        assert_eq!(profile.id, "u1");
        assert_eq!(profile.extra.get("name"), Some(&json!("Ann")));
        let service = profile.service.unwrap();
        assert_eq!(service.name, "Haircut");
        assert_eq!(service.price, Some(20.0));
        assert_eq!(service.image_url, None);
    }

    #[test]
    fn test_merged_replaces_service_wholesale() {
        let profile = UserProfile::new("u1").with_service(Service::new("Haircut", "Short", 20.0));
        let patch = fields_from_value(json!({"service": {"name": "Haircut", "price": 25}})).unwrap();

        let merged = profile.merged(&patch).unwrap();

        let service = merged.service.unwrap();
        assert_eq!(service.name, "Haircut");
        assert_eq!(service.price, Some(25.0));
        assert_eq!(service.description, "");
        assert_eq!(merged.id, "u1");
    }

    #[test]
    fn test_merged_rejects_malformed_service() {
        let profile = UserProfile::new("u1");
        let patch = fields_from_value(json!({"service": "not an object"})).unwrap();

        assert!(profile.merged(&patch).is_err());
    }

    #[test]
    fn test_validate_reports_every_missing_field() {
        let errors = Service::default().validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();

        assert_eq!(fields, vec!["name", "price", "description"]);
        assert_eq!(errors[1].to_string(), "price: Price is required");
    }

    #[test]
    fn test_validate_rejects_non_numeric_price() {
        let mut service = Service::new("Haircut", "Short", 0.0);
        service.price = Some(f64::NAN);

        let errors = service.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Price must be a number");
    }

    #[test]
    fn test_validate_accepts_complete_service() {
        assert!(Service::new("Haircut", "Short", 20.0).validate().is_ok());
    }

    #[test]
    fn test_display_without_service() {
        let output = format!("{}", UserProfile::new("u1"));
        assert!(output.contains("u1"));
        assert!(output.contains("no service offered"));
    }
}
