use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::errors::*;

/// Half-open interval `[start, end)` over an amino acid string.
///
/// An end that reaches the end of the amino acid string is stored as `0`; annotation
/// consumers read that as "runs to the end of the sequence".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AaRegion {
    pub start: usize,
    pub end: usize,
}

impl AaRegion {
    pub fn new(start: usize, end: usize, amino_acids: &str) -> Self {
        let end = if end == amino_acids.chars().count() {
            0
        } else {
            end
        };
        Self { start, end }
    }
}

/// Named regions found by [`AaRegions::detect`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AaRegions {
    regions: FxHashMap<String, AaRegion>,
}

impl AaRegions {
    /// Locate every named fragment in `amino_acids` with a single regex match.
    ///
    /// Fragments without a value are skipped. The rest are escaped and chained in the
    /// given order as `.*(frag1).*(frag2).*`, so they must appear in that order and
    /// must not overlap. The match is greedy: each leading wildcard extends as far as
    /// possible before the next fragment is matched.
    pub fn detect<'a, K: AsRef<str>>(
        amino_acids: &str,
        fragments: impl IntoIterator<Item = (K, Option<&'a str>)>,
    ) -> Result<Self> {
        let present = fragments
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name.as_ref().to_owned(), v)))
            .collect::<Vec<_>>();

        let groups = present
            .iter()
            .map(|(_, value)| format!("({})", regex::escape(value)))
            .collect::<Vec<_>>();
        let pattern = format!(".*{}.*", groups.join(".*"));

        let re = Regex::new(&pattern).map_err(|e| Error::RegionPattern {
            pattern: pattern.clone(),
            source: Box::new(e),
        })?;

        let Some(captures) = re.captures(amino_acids) else {
            tracing::error!(
                amino_acids,
                fragments = ?present,
                "Unable to parse amino acids using regex"
            );
            return Err(Error::RegionDetection {
                amino_acids: amino_acids.to_owned(),
                fragments: present.len(),
            });
        };

        let char_offset = |byte_idx: usize| amino_acids[..byte_idx].chars().count();

        let mut regions = FxHashMap::default();
        for (i, (name, _)) in present.into_iter().enumerate() {
            // every group takes part in the match, it is not optional
            if let Some(m) = captures.get(i + 1) {
                regions.insert(
                    name,
                    AaRegion::new(char_offset(m.start()), char_offset(m.end()), amino_acids),
                );
            }
        }

        Ok(Self { regions })
    }

    pub fn get(&self, name: &str) -> Option<AaRegion> {
        self.regions.get(name).copied()
    }
}
