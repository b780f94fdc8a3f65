//! Validator for organization and project IDs.

use anyhow::Result;

use crate::{
    config::properties::validate_optional_object_id,
    interaction::{InputValidator, InputValidatorResult},
};

/// Validates that the input is empty or a 24 character hex ID.
#[derive(Clone)]
pub struct ObjectIdValidator;

impl InputValidator for ObjectIdValidator {
    fn validate(&self, input: &str) -> Result<InputValidatorResult> {
        Ok(match validate_optional_object_id(input.trim()) {
            Ok(()) => InputValidatorResult::Valid,
            Err(message) => InputValidatorResult::Invalid(message),
        })
    }
}
