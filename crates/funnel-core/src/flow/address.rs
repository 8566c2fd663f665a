//! Page address reflection.
//!
//! The current step's slug is mirrored into a query parameter so the address
//! can be bookmarked or shared and the step resumed on load.

use std::fmt;
use url::Url;

use crate::error::Result;

/// Default query parameter carrying the step slug.
pub const DEFAULT_STEP_PARAM: &str = "quizStep";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAddress {
    url: Url,
    param: String,
}

impl PageAddress {
    /// Parses an absolute address.
    ///
    /// # Errors
    ///
    /// Returns a `Serialization` error (format `URL`) when `address` is not an absolute URL.
    pub fn parse(address: &str, param: &str) -> Result<Self> {
        Ok(Self {
            url: Url::parse(address)?,
            param: param.to_string(),
        })
    }

    pub fn param(&self) -> &str {
        &self.param
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// The step slug carried by the address, if any. The last occurrence wins.
    pub fn step_slug(&self) -> Option<String> {
        self.url
            .query_pairs()
            .filter(|(key, _)| key == self.param.as_str())
            .map(|(_, value)| value.into_owned())
            .last()
            .filter(|slug| !slug.is_empty())
    }

    /// A copy of this address with the step parameter set to `slug`.
    ///
    /// Other query parameters are kept in order; any previous step parameter
    /// is replaced.
    pub fn with_step(&self, slug: &str) -> Self {
        let kept: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(key, _)| key != self.param.as_str())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let mut url = self.url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            for (key, value) in &kept {
                query.append_pair(key, value);
            }
            query.append_pair(&self.param, slug);
        }

        Self {
            url,
            param: self.param.clone(),
        }
    }
}

impl fmt::Display for PageAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
