// Handlers are split by access tier:
// public (no token) and protected (JWT required, Caller in extensions).
pub mod protected;
pub mod public;

use crate::error::ApiError;

/// Unwrap a required request field, rejecting absent or blank values
pub(crate) fn require<T: Required>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    match value {
        Some(v) if !v.is_blank() => Ok(v),
        _ => Err(ApiError::missing_field(field)),
    }
}

/// Pass an optional update field through, rejecting a present but blank value
pub(crate) fn non_blank<T: Required>(value: Option<T>, field: &str) -> Result<Option<T>, ApiError> {
    match value {
        Some(v) if v.is_blank() => Err(ApiError::blank_field(field)),
        other => Ok(other),
    }
}

pub(crate) trait Required {
    fn is_blank(&self) -> bool {
        false
    }
}

impl Required for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Required for i64 {}
impl Required for i32 {}
impl Required for uuid::Uuid {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_count_as_missing() {
        assert!(require(Some("  ".to_string()), "username").is_err());
        assert!(require::<String>(None, "username").is_err());
        assert_eq!(require(Some("ada".to_string()), "username").unwrap(), "ada");
    }

    #[test]
    fn optional_fields_may_be_absent_but_not_blank() {
        assert_eq!(non_blank::<String>(None, "email").unwrap(), None);
        assert_eq!(non_blank(Some("a@b.edu".to_string()), "email").unwrap().as_deref(), Some("a@b.edu"));

        let err = non_blank(Some(String::new()), "username").unwrap_err();
        assert_eq!(err.message(), "Field cannot be blank: username");
    }

    #[test]
    fn zero_numbers_are_present() {
        // Range checks belong to the ledger, not to presence checks
        assert_eq!(require(Some(0i64), "amount").unwrap(), 0);
    }
}
