//! The FHIR complex datatypes produced by value transformation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A code that is not a member of the expected FHIR code system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} code: {value}")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// `ContactPoint.system` (http://hl7.org/fhir/contact-point-system).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPointSystem {
    Phone,
    Fax,
    Email,
    Pager,
    Url,
    Sms,
    Other,
}

impl ContactPointSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Fax => "fax",
            Self::Email => "email",
            Self::Pager => "pager",
            Self::Url => "url",
            Self::Sms => "sms",
            Self::Other => "other",
        }
    }
}

impl FromStr for ContactPointSystem {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "phone" => Ok(Self::Phone),
            "fax" => Ok(Self::Fax),
            "email" => Ok(Self::Email),
            "pager" => Ok(Self::Pager),
            "url" => Ok(Self::Url),
            "sms" => Ok(Self::Sms),
            "other" => Ok(Self::Other),
            _ => Err(UnknownCode {
                kind: "contact point system",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ContactPointSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `ContactPoint.use` (http://hl7.org/fhir/contact-point-use).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPointUse {
    Home,
    Work,
    Temp,
    Old,
    Mobile,
}

impl ContactPointUse {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Work => "work",
            Self::Temp => "temp",
            Self::Old => "old",
            Self::Mobile => "mobile",
        }
    }
}

impl FromStr for ContactPointUse {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "work" => Ok(Self::Work),
            "temp" => Ok(Self::Temp),
            "old" => Ok(Self::Old),
            "mobile" => Ok(Self::Mobile),
            _ => Err(UnknownCode {
                kind: "contact point use",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ContactPointUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<ContactPointSystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#use: Option<ContactPointUse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_point_codes_parse_ignoring_case() {
        assert_eq!("Phone".parse::<ContactPointSystem>(), Ok(ContactPointSystem::Phone));
        assert_eq!("EMAIL".parse::<ContactPointSystem>(), Ok(ContactPointSystem::Email));
        assert_eq!("mobile".parse::<ContactPointUse>(), Ok(ContactPointUse::Mobile));
        assert!("cellular".parse::<ContactPointUse>().is_err());
        assert!("pigeon".parse::<ContactPointSystem>().is_err());
    }

    #[test]
    fn contact_point_serializes_fhir_json() {
        let point = ContactPoint {
            system: Some(ContactPointSystem::Phone),
            value: Some("555-0100".to_string()),
            r#use: Some(ContactPointUse::Home),
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"system": "phone", "value": "555-0100", "use": "home"})
        );
    }
}
