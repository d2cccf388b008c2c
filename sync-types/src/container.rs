//! Container names and creation outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ContainerNameError;

/// A remote container (bucket) name.
///
/// Follows the provider's bucket naming rules: 3-63 characters of
/// lowercase letters, digits, `.` and `-`, starting and ending with a
/// letter or digit.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContainerName(String);

impl ContainerName {
    /// Validate and wrap a container name.
    pub fn parse(name: &str) -> Result<Self, ContainerNameError> {
        let len = name.len();
        if !(3..=63).contains(&len) {
            return Err(ContainerNameError::Length(len));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '.' || *c == '-'))
        {
            return Err(ContainerNameError::InvalidChar(bad));
        }
        let bytes = name.as_bytes();
        let is_alnum = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
        if !is_alnum(bytes[0]) || !is_alnum(bytes[len - 1]) {
            return Err(ContainerNameError::Boundary);
        }
        if name.contains("..") {
            return Err(ContainerNameError::AdjacentDots);
        }
        Ok(Self(name.to_string()))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContainerName {
    type Err = ContainerNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContainerName {
    type Error = ContainerNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContainerName> for String {
    fn from(name: ContainerName) -> Self {
        name.0
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContainerName({})", self.0)
    }
}

/// Result of an idempotent container create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The container did not exist and was created.
    Created,
    /// The container already exists and belongs to the caller.
    AlreadyOwned,
    /// The name is taken by someone else.
    Denied,
}

impl CreateOutcome {
    /// True when the container is usable by the caller afterwards.
    pub fn is_usable(self) -> bool {
        matches!(self, Self::Created | Self::AlreadyOwned)
    }
}

impl fmt::Display for CreateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Created => "created",
            Self::AlreadyOwned => "already owned",
            Self::Denied => "denied",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_domain_style_names() {
        assert!(ContainerName::parse("www.example.com").is_ok());
        assert!(ContainerName::parse("site-assets-01").is_ok());
        assert!(ContainerName::parse("abc").is_ok());
    }

    #[test]
    fn rejects_bad_names() {
        assert_eq!(
            ContainerName::parse("ab"),
            Err(ContainerNameError::Length(2))
        );
        assert_eq!(
            ContainerName::parse(&"a".repeat(64)),
            Err(ContainerNameError::Length(64))
        );
        assert_eq!(
            ContainerName::parse("My-Bucket"),
            Err(ContainerNameError::InvalidChar('M'))
        );
        assert_eq!(
            ContainerName::parse("-bucket"),
            Err(ContainerNameError::Boundary)
        );
        assert_eq!(
            ContainerName::parse("bucket."),
            Err(ContainerNameError::Boundary)
        );
        assert_eq!(
            ContainerName::parse("a..b"),
            Err(ContainerNameError::AdjacentDots)
        );
    }

    #[test]
    fn from_str_parses() {
        let name: ContainerName = "static-site".parse().unwrap();
        assert_eq!(name.as_str(), "static-site");
        assert_eq!(name.to_string(), "static-site");
    }

    #[test]
    fn create_outcome_usable() {
        assert!(CreateOutcome::Created.is_usable());
        assert!(CreateOutcome::AlreadyOwned.is_usable());
        assert!(!CreateOutcome::Denied.is_usable());
        assert_eq!(CreateOutcome::AlreadyOwned.to_string(), "already owned");
    }
}
