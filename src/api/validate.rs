use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, FieldErrors};

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Shape and domain checks run on a payload before any handler code
pub trait Validate {
    fn check(&self, errors: &mut FieldErrors);

    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        self.check(&mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid input", Some(errors)))
        }
    }
}

/// JSON body that has been deserialized and validated
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::invalid_json(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

pub fn required(errors: &mut FieldErrors, field: &str, value: &str, max_len: usize) {
    if value.trim().is_empty() {
        errors.insert(field.to_string(), "This field is required".to_string());
    } else if value.chars().count() > max_len {
        errors.insert(field.to_string(), format!("Must be at most {} characters", max_len));
    }
}

/// For partial updates: when supplied, the value must still be non-blank
pub fn required_if_present(errors: &mut FieldErrors, field: &str, value: Option<&str>, max_len: usize) {
    if let Some(value) = value {
        required(errors, field, value, max_len);
    }
}

pub fn max_len(errors: &mut FieldErrors, field: &str, value: Option<&str>, max_len: usize) {
    if let Some(value) = value {
        if value.chars().count() > max_len {
            errors.insert(field.to_string(), format!("Must be at most {} characters", max_len));
        }
    }
}

pub fn email(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if let Some(value) = value {
        if !EMAIL_REGEX.is_match(value.trim()) {
            errors.insert(field.to_string(), "Invalid email address".to_string());
        }
    }
}

/// Upload and link fields hold absolute http(s) URLs
pub fn url(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if let Some(value) = value {
        if value.is_empty() {
            return;
        }
        match url::Url::parse(value) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => {
                errors.insert(field.to_string(), "Must be an http(s) URL".to_string());
            }
        }
    }
}

pub fn one_of(errors: &mut FieldErrors, field: &str, value: Option<&str>, allowed: &[&str]) {
    if let Some(value) = value {
        if !allowed.contains(&value) {
            errors.insert(field.to_string(), format!("Must be one of: {}", allowed.join(", ")));
        }
    }
}

pub fn non_negative(errors: &mut FieldErrors, field: &str, value: Option<i32>) {
    if let Some(value) = value {
        if value < 0 {
            errors.insert(field.to_string(), "Must not be negative".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample {
        name: String,
        email: String,
        link: Option<String>,
    }

    impl Validate for Sample {
        fn check(&self, errors: &mut FieldErrors) {
            required(errors, "name", &self.name, 10);
            email(errors, "email", Some(&self.email));
            url(errors, "link", self.link.as_deref());
        }
    }

    #[test]
    fn valid_payload_passes() {
        let sample = Sample {
            name: "Ada".into(),
            email: "ada@example.org".into(),
            link: Some("https://example.org/brief.pdf".into()),
        };
        assert!(sample.validate().is_ok());
    }

    #[test]
    fn collects_every_field_error() {
        let sample = Sample {
            name: "   ".into(),
            email: "not-an-email".into(),
            link: Some("ftp://example.org".into()),
        };
        match sample.validate() {
            Err(ApiError::ValidationError { field_errors: Some(fields), .. }) => {
                assert_eq!(fields.len(), 3);
                assert_eq!(fields["name"], "This field is required");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn length_and_choice_rules() {
        let mut errors = FieldErrors::new();
        required(&mut errors, "title", "abcdefghijk", 10);
        one_of(&mut errors, "status", Some("archived"), &["draft", "published"]);
        non_negative(&mut errors, "displayOrder", Some(-1));
        required_if_present(&mut errors, "name", None, 10);
        assert_eq!(errors.len(), 3);
        assert!(errors["status"].contains("draft, published"));
    }
}
