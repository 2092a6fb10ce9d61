use crate::compare::compare;
use crate::error::Error;
use crate::pattern::{Params, Pattern};
use crate::provider::Provider;

use std::fmt;

/// One route: a compiled pattern and the provider behind it.
pub struct Entry<T> {
    pub pattern: Pattern,
    pub provider: Box<dyn Provider<T>>,
}

/// Routes sorted by specificity, scanned in order at match time.
pub struct RouteTable<T> {
    entries: Vec<Entry<T>>,
}

impl<T> RouteTable<T> {
    /// Compiles every pattern and sorts the table. Fails on the first
    /// malformed pattern.
    pub fn new<I>(routes: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, Box<dyn Provider<T>>)>,
    {
        let mut entries = routes
            .into_iter()
            .map(|(pattern, provider)| {
                Ok(Entry {
                    pattern: Pattern::new(&pattern)?,
                    provider,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        // stable, so equally specific routes keep their insertion order
        entries.sort_by(|a, b| compare(a.pattern.as_str(), b.pattern.as_str()));

        Ok(Self { entries })
    }

    /// Returns the first entry whose pattern accepts `path`, with the
    /// captured parameters.
    pub fn find(&self, path: &str) -> Option<(&Entry<T>, Params)> {
        self.entries
            .iter()
            .find_map(|entry| entry.pattern.matches(path).map(|params| (entry, params)))
    }

    /// The patterns in match order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.pattern.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for RouteTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.patterns()).finish()
    }
}
