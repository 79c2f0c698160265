//! Field-scoped validation errors.
//!
//! Mirrors the Kubernetes apimachinery field error model: a [`FieldPath`]
//! locates a value inside the object, a [`FieldError`] describes what is wrong
//! with it, and rules append into a [`FieldErrorList`] without short-circuiting.

use std::fmt;

/// Path to a field, rendered as `spec.barbicanAPI.override.service[public]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath {
    rendered: String,
}

impl FieldPath {
    /// Start a new root path.
    pub fn new(root: &str) -> Self {
        Self {
            rendered: root.to_string(),
        }
    }

    /// Path of a named child field.
    pub fn child(&self, name: &str) -> Self {
        let rendered = if self.rendered.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.rendered, name)
        };
        Self { rendered }
    }

    /// Path of a map entry.
    pub fn key(&self, key: &str) -> Self {
        Self {
            rendered: format!("{}[{}]", self.rendered, key),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Category of a field error
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// A required value is missing
    Required,
    /// The value is malformed
    Invalid,
    /// The value is not one of the supported values
    NotSupported,
}

impl ErrorType {
    /// Kubernetes reason string (`FieldValueRequired`, ...)
    pub fn reason(&self) -> &'static str {
        match self {
            ErrorType::Required => "FieldValueRequired",
            ErrorType::Invalid => "FieldValueInvalid",
            ErrorType::NotSupported => "FieldValueNotSupported",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorType::Required => "Required value",
            ErrorType::Invalid => "Invalid value",
            ErrorType::NotSupported => "Unsupported value",
        };
        f.write_str(text)
    }
}

/// A validation problem at one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub error_type: ErrorType,
    pub field: String,
    pub bad_value: Option<String>,
    pub detail: String,
}

impl FieldError {
    pub fn required(path: &FieldPath, detail: &str) -> Self {
        Self {
            error_type: ErrorType::Required,
            field: path.to_string(),
            bad_value: None,
            detail: detail.to_string(),
        }
    }

    pub fn invalid(path: &FieldPath, value: &str, detail: &str) -> Self {
        Self {
            error_type: ErrorType::Invalid,
            field: path.to_string(),
            bad_value: Some(value.to_string()),
            detail: detail.to_string(),
        }
    }

    /// The value is not in `supported`; the detail lists the accepted values.
    pub fn not_supported(path: &FieldPath, value: &str, supported: &[&str]) -> Self {
        let quoted: Vec<String> = supported.iter().map(|s| format!("\"{}\"", s)).collect();
        Self {
            error_type: ErrorType::NotSupported,
            field: path.to_string(),
            bad_value: Some(value.to_string()),
            detail: format!("supported values: {}", quoted.join(", ")),
        }
    }

    /// Field path up to the first map key; map keys are user input.
    pub fn rule_path(&self) -> &str {
        self.field.split('[').next().unwrap_or_default()
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bad_value {
            Some(value) => write!(
                f,
                "{}: {}: \"{}\": {}",
                self.field, self.error_type, value, self.detail
            ),
            None => write!(f, "{}: {}: {}", self.field, self.error_type, self.detail),
        }
    }
}

impl std::error::Error for FieldError {}

/// Ordered list of field errors. Empty means valid.
pub type FieldErrorList = Vec<FieldError>;

/// Render errors the way `kubectl` shows them: `[err1, err2]`, or the lone
/// error without brackets.
pub fn aggregate(errors: &[FieldError]) -> String {
    match errors {
        [] => String::new(),
        [single] => single.to_string(),
        many => {
            let rendered: Vec<String> = many.iter().map(ToString::to_string).collect();
            format!("[{}]", rendered.join(", "))
        }
    }
}
