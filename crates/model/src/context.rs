//! Decode-time flags.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Flags for one decode call.
///
/// `Context` is immutable while a record is being read. Unknown keys are
/// rejected when loading from JSON; missing keys take their defaults.
///
/// # Example
///
/// ```
/// use rootio_model::Context;
///
/// let context = Context::from_json_str(r#"{"memberwise": true}"#).unwrap();
/// assert!(context.memberwise);
/// assert_eq!(Context::from_json_str("{}").unwrap(), Context::default());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Context {
    /// Decode each logical member independently instead of as one block.
    pub memberwise: bool,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memberwise(mut self, memberwise: bool) -> Self {
        self.memberwise = memberwise;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
