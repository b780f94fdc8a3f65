//! Validator for service URLs.

use anyhow::Result;

use crate::{
    config::properties::validate_url,
    interaction::{InputValidator, InputValidatorResult},
};

/// Validates that the input is an absolute http(s) URL.
#[derive(Clone)]
pub struct UrlValidator;

impl InputValidator for UrlValidator {
    fn validate(&self, input: &str) -> Result<InputValidatorResult> {
        Ok(match validate_url(input.trim()) {
            Ok(()) => InputValidatorResult::Valid,
            Err(message) => InputValidatorResult::Invalid(message),
        })
    }
}
