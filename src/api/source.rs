use indexmap::IndexMap;

use crate::core::Distribution;
use crate::error::{PlotError, PlotResult};

/// Narrow interface to whatever yields named distributions.
///
/// Keys follow the `{channel}_{category}/{process}[_{systematic}]` convention
/// of the analysis file layout; file-format I/O stays behind implementations.
pub trait SeriesSource {
    fn get(
        &self,
        channel: &str,
        category: &str,
        process: &str,
        systematic: Option<&str>,
    ) -> PlotResult<Distribution>;
}

/// In-memory source used by tests and in-process callers.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: IndexMap<String, Distribution>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        channel: &str,
        category: &str,
        process: &str,
        systematic: Option<&str>,
        dist: Distribution,
    ) {
        self.entries
            .insert(source_key(channel, category, process, systematic), dist);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SeriesSource for MemorySource {
    fn get(
        &self,
        channel: &str,
        category: &str,
        process: &str,
        systematic: Option<&str>,
    ) -> PlotResult<Distribution> {
        let key = source_key(channel, category, process, systematic);
        self.entries
            .get(&key)
            .cloned()
            .ok_or(PlotError::NotFound { selector: key })
    }
}

fn source_key(channel: &str, category: &str, process: &str, systematic: Option<&str>) -> String {
    match systematic {
        Some(systematic) => format!("{channel}_{category}/{process}_{systematic}"),
        None => format!("{channel}_{category}/{process}"),
    }
}
