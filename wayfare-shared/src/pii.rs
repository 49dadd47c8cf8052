use serde::{Serialize, Deserialize, Serializer};
use std::fmt;

/// Wraps customer contact data (emails, phone numbers) so that it never shows up
/// verbatim in `tracing` output. Serialization is transparent because API
/// responses need the real value.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T: AsRef<str>> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", mask(self.0.as_ref()))
    }
}

impl<T: AsRef<str>> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", mask(self.0.as_ref()))
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Masked<T> {
    fn from(value: T) -> Self {
        Masked(value)
    }
}

/// Keeps the first character and, for emails, the domain.
/// `alice@example.com` -> `a****@example.com`, `+21655123456` -> `+***********`.
fn mask(value: &str) -> String {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    match value.split_once('@') {
        Some((local, domain)) => {
            let hidden = local.chars().count().saturating_sub(1);
            format!("{}{}@{}", first, "*".repeat(hidden), domain)
        }
        None => format!("{}{}", first, "*".repeat(chars.count())),
    }
}
