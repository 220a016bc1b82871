//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// Nothing left after trimming whitespace.
    #[error("email cannot be blank")]
    Blank,
    /// The address exceeds the RFC 5321 path limit.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The address does not split into exactly one mailbox and one domain.
    #[error("email must contain exactly one @ symbol")]
    BadSeparator,
    /// The mailbox (before @) is empty or longer than 64 characters.
    #[error("email mailbox must be 1-64 characters")]
    BadMailbox,
    /// The domain is not a dotted name of non-empty labels.
    #[error("email domain is not valid")]
    BadDomain,
    /// The address contains whitespace or control characters.
    #[error("email cannot contain whitespace")]
    Whitespace,
}

/// A syntactically valid email address.
///
/// Parsing trims surrounding whitespace and lowercases the domain, so two
/// spellings of the same address compare equal. The mailbox keeps its case.
///
/// ```
/// use snippetbox_core::Email;
///
/// let email = Email::parse("  Alice@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "Alice@example.com");
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("alice").is_err());
/// assert!(Email::parse("alice@localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Maximum length of the mailbox part.
    pub const MAX_MAILBOX_LENGTH: usize = 64;

    /// Parse an `Email` from user input.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first rule the input breaks.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(EmailError::Blank);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(EmailError::Whitespace);
        }

        let (mailbox, domain) = s.split_once('@').ok_or(EmailError::BadSeparator)?;
        if domain.contains('@') {
            return Err(EmailError::BadSeparator);
        }
        if mailbox.is_empty() || mailbox.len() > Self::MAX_MAILBOX_LENGTH {
            return Err(EmailError::BadMailbox);
        }
        if !is_dotted_domain(domain) {
            return Err(EmailError::BadDomain);
        }

        Ok(Self(format!("{mailbox}@{}", domain.to_ascii_lowercase())))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the domain part of the address.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map_or("", |(_, domain)| domain)
    }
}

/// A domain needs at least two labels; labels are alphanumeric or `-` and
/// never start or end with `-`.
fn is_dotted_domain(domain: &str) -> bool {
    let mut labels = 0;
    for label in domain.split('.') {
        let valid = !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return false;
        }
        labels += 1;
    }
    labels >= 2
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
