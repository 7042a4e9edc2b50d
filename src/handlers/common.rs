use validator::{Validate, ValidationErrors};

use crate::errors::ServiceError;

fn describe(errors: &ValidationErrors) -> Vec<String> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", error.code));
                format!("{}: {}", field, message)
            })
        })
        .collect()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input.validate().map_err(|e| {
        ServiceError::ValidationError(format!("Validation failed: {}", describe(&e).join(", ")))
    })
}

/// Validates every batch item, naming the first offending index.
pub fn validate_items<T: Validate>(items: &[T]) -> Result<(), ServiceError> {
    for (index, item) in items.iter().enumerate() {
        if let Err(e) = item.validate() {
            return Err(ServiceError::ValidationError(format!(
                "Validation failed: predictions[{}]: {}",
                index,
                describe(&e).join(", ")
            )));
        }
    }
    Ok(())
}
