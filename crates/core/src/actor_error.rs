//! User-facing messages for backend failures.
//!
//! Failures reach the UI in a handful of shapes: a transport or client
//! exception carrying a message, a bare reject/trap string from the
//! canister, or a wrapper object around one of those. [`normalize_actor_error`]
//! turns any of them into one of a fixed set of sentences, falling back to
//! the original message only when it is short enough to show as-is.

/// Shown when the caller lacks vendor or admin rights.
pub const VENDOR_ACCESS_MESSAGE: &str = "You do not have permission to perform this action. Please contact an administrator to grant you vendor access.";
/// Shown for any other authorization failure.
pub const UNAUTHORIZED_MESSAGE: &str = "You are not authorized to perform this action.";
/// Shown when the backend actor does not exist yet.
pub const NOT_READY_MESSAGE: &str =
    "Connection to the backend is not ready. Please wait a moment and try again.";
/// Shown when a price update targets a missing product.
pub const PRODUCT_NOT_FOUND_MESSAGE: &str = "The product you are trying to update does not exist.";
/// Shown when a product id is taken.
pub const DUPLICATE_ID_MESSAGE: &str =
    "A product with this ID already exists. Please use a different ID.";
/// Shown for validation failures reported by the backend.
pub const INVALID_INPUT_MESSAGE: &str =
    "Invalid input provided. Please check your data and try again.";
/// Shown when nothing better is known.
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Messages at or above this length are not shown verbatim.
const MAX_PASSTHROUGH_LEN: usize = 200;

/// Shapes a backend failure can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorFailure {
    /// No error value at all.
    Missing,
    /// An exception with a message.
    Exception(String),
    /// A bare reject or trap string.
    Text(String),
    /// A wrapper that may carry a nested message.
    Object { message: Option<Box<ActorFailure>> },
    /// Anything else.
    Opaque,
}

impl ActorFailure {
    /// Wrap a message in an object, the way some client errors nest them.
    #[must_use]
    pub fn nested(message: Self) -> Self {
        Self::Object {
            message: Some(Box::new(message)),
        }
    }
}

impl From<String> for ActorFailure {
    fn from(message: String) -> Self {
        Self::Text(message)
    }
}

impl From<&str> for ActorFailure {
    fn from(message: &str) -> Self {
        Self::Text(message.to_string())
    }
}

/// Map a failure to the sentence shown to the user.
#[must_use]
pub fn normalize_actor_error(failure: &ActorFailure) -> String {
    match failure {
        ActorFailure::Exception(message) | ActorFailure::Text(message) => {
            classify(message).to_string()
        }
        ActorFailure::Object {
            message: Some(inner),
        } => normalize_actor_error(inner),
        ActorFailure::Object { message: None } | ActorFailure::Missing | ActorFailure::Opaque => {
            FALLBACK_MESSAGE.to_string()
        }
    }
}

fn classify(message: &str) -> &str {
    if message.to_lowercase().contains("unauthorized") {
        if message.contains("vendor") || message.contains("admin") {
            return VENDOR_ACCESS_MESSAGE;
        }
        return UNAUTHORIZED_MESSAGE;
    }

    if message.contains("Actor not initialized") || message.contains("Actor not available") {
        return NOT_READY_MESSAGE;
    }

    if message.contains("Product not found") {
        return PRODUCT_NOT_FOUND_MESSAGE;
    }

    if message.contains("already exists") {
        return DUPLICATE_ID_MESSAGE;
    }

    if message.contains("invalid") || message.contains("Invalid") {
        return INVALID_INPUT_MESSAGE;
    }

    if !message.is_empty() && message.chars().count() < MAX_PASSTHROUGH_LEN {
        return message;
    }

    FALLBACK_MESSAGE
}
