//! Conversions from domain errors to GraphQL errors.
//!
//! Coded errors carry their code in the `code` extension so clients can
//! match on it without parsing messages.

use async_graphql::{Error, ErrorExtensions};

use kennel_core::error::{BreedError, PaginationError, ERR_INVALID_ARGUMENT};

/// Convert a loader error; only coded errors get an extension.
pub(crate) fn breed_error(err: BreedError) -> Error {
    let code = err.code();
    let error = Error::new(err.to_string());

    match code {
        Some(code) => error.extend_with(|_, e| e.set("code", code.to_string())),
        None => error,
    }
}

pub(crate) fn pagination_error(err: PaginationError) -> Error {
    Error::new(err.to_string()).extend_with(|_, e| e.set("code", err.code().to_string()))
}

/// A rejected argument outside of pagination.
pub(crate) fn invalid_argument(message: &str) -> Error {
    Error::new(message).extend_with(|_, e| e.set("code", ERR_INVALID_ARGUMENT.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::Value;
    use kennel_core::error::FetchError;

    fn code_of(err: &Error) -> Option<Value> {
        err.extensions.as_ref().and_then(|ext| ext.get("code").cloned())
    }

    #[test]
    fn test_not_found_carries_code() {
        let err = breed_error(BreedError::NotFound("unicorn".into()));
        assert_eq!(code_of(&err), Some(Value::String("ERR_BREED_NOT_FOUND".into())));
    }

    // Les erreurs d'infrastructure ne doivent pas exposer de code
    #[test]
    fn test_fetch_failure_has_no_code() {
        let err = breed_error(BreedError::Fetch(FetchError::Dropped));
        assert_eq!(code_of(&err), None);
    }

    #[test]
    fn test_pagination_error_code() {
        let err = pagination_error(PaginationError::InvalidArgument(
            "Cannot page both forward and backward".into(),
        ));
        assert!(err.message.contains("Cannot page both forward and backward"));
        assert_eq!(code_of(&err), Some(Value::String("INVALID_ARGUMENT".into())));
    }
}
