use crate::error::{PdbContextError, PdbContextResult};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::{Validate, ValidationErrors};

static PDB_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9][A-Za-z0-9]{3,5}$").expect("PDB id pattern is a valid regex"));

pub fn validate_model<T: Validate>(model: &T) -> PdbContextResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(PdbContextError::validation("model", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match &error.code {
                std::borrow::Cow::Borrowed("length") => {
                    format!("Length validation failed for field '{}'", field)
                }
                std::borrow::Cow::Borrowed("range") => {
                    format!("Value out of range for field '{}'", field)
                }
                std::borrow::Cow::Borrowed("url") => {
                    format!("Field '{}' is not a valid URL", field)
                }
                _ => format!("Validation failed for field '{}': {}", field, error.code),
            };
            messages.push(message);
        }
    }

    messages.sort();
    messages.join(", ")
}

/// Trims and upper-cases a PDB identifier so that `1abc` and ` 1ABC ` share
/// one cache key.
pub fn normalize_pdb_id(pdb_id: &str) -> String {
    pdb_id.trim().to_ascii_uppercase()
}

pub fn validate_pdb_id(pdb_id: &str) -> PdbContextResult<()> {
    if !PDB_ID_REGEX.is_match(pdb_id) {
        return Err(PdbContextError::validation(
            "pdb_id",
            format!(
                "Invalid PDB identifier '{}'. \
                 Expected a digit followed by 3-5 alphanumeric characters",
                pdb_id
            ),
        ));
    }

    Ok(())
}
