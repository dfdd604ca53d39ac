//! Success flag coercion.

/// Typed value of a row's `success` field.
///
/// The field is written as a bare integer in some files and as a quoted
/// string in others; after CSV unquoting both read as the same text. Accepted
/// forms (surrounding whitespace ignored):
///
/// | raw            | flag          |
/// |----------------|---------------|
/// | `1`, `1.0`     | `Success`     |
/// | `0`, `0.0`     | `Failure`     |
/// | anything else  | `Unrecognized`|
///
/// `1.0` / `0.0` appear when an upstream writer emitted the column as float.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessFlag {
    Success,
    Failure,
    Unrecognized,
}

impl SuccessFlag {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "1" | "1.0" => SuccessFlag::Success,
            "0" | "0.0" => SuccessFlag::Failure,
            _ => SuccessFlag::Unrecognized,
        }
    }

    pub fn is_success(self) -> bool {
        self == SuccessFlag::Success
    }
}
