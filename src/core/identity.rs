//! Design identity: the part number / revision pair every artifact and
//! remote call is keyed on.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identity of one assembly design. Part numbers follow the `PCBA<digits>`
/// scheme; anything else is rejected before a run does any work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignIdentity {
    pub part_number: String,
    pub revision: String,
}

impl DesignIdentity {
    pub fn new(part_number: impl Into<String>, revision: impl Into<String>) -> Result<Self> {
        let part_number = part_number.into();
        let revision = revision.into();

        let pattern = Regex::new(r"^PCBA(\d+)$").expect("Invalid regex pattern");
        if !pattern.is_match(&part_number) {
            return Err(Error::identity_invalid(
                &part_number,
                "part number must match PCBA<digits>",
            )
            .with_hint("Example: PCBA1234"));
        }
        if revision.trim().is_empty() {
            return Err(Error::identity_invalid(&part_number, "revision must not be empty"));
        }

        Ok(Self {
            part_number,
            revision,
        })
    }

    /// Digits after the PCBA prefix, the form the asset service keys on.
    pub fn numeric_part(&self) -> i64 {
        self.part_number
            .trim_start_matches("PCBA")
            .parse()
            .unwrap_or(0)
    }

    /// `<part_number>_<revision>`, the stem for artifact and display names.
    pub fn base_name(&self) -> String {
        format!("{}_{}", self.part_number, self.revision)
    }
}

impl std::fmt::Display for DesignIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} rev {}", self.part_number, self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn accepts_pcba_with_digits() {
        let identity = DesignIdentity::new("PCBA1234", "A").unwrap();
        assert_eq!(identity.numeric_part(), 1234);
        assert_eq!(identity.base_name(), "PCBA1234_A");
    }

    #[test]
    fn rejects_part_number_without_digits() {
        let err = DesignIdentity::new("PCBAX", "A").unwrap_err();
        assert_eq!(err.code, ErrorCode::IdentityInvalid);
        assert!(err.code.is_configuration());
    }

    #[test]
    fn rejects_wrong_prefix() {
        assert!(DesignIdentity::new("PCB1234", "A").is_err());
        assert!(DesignIdentity::new("pcba1234", "A").is_err());
        assert!(DesignIdentity::new("PCBA12X4", "A").is_err());
    }

    #[test]
    fn rejects_blank_revision() {
        let err = DesignIdentity::new("PCBA1234", "  ").unwrap_err();
        assert_eq!(err.code, ErrorCode::IdentityInvalid);
    }
}
