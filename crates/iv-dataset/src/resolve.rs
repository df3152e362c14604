//! Fuzzy column-name resolution.

use tracing::warn;

use crate::error::DatasetWarning;
use crate::roles::Role;

/// Edit distance between two strings, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// A role bound to one candidate name and every header containing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub matched_name: String,
    pub headers: Vec<String>,
}

/// Result of resolving one role against a table's headers.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub binding: Option<Binding>,
    pub warnings: Vec<DatasetWarning>,
}

/// Match candidate names against headers.
///
/// Every candidate is tried as a case-insensitive substring of each header.
/// A candidate with matches forms a group of headers (one per set, in table
/// order). When several candidates produce groups, the group whose first
/// header is closer in edit distance to its candidate wins; a tie goes to the
/// later candidate. Each displaced group is reported as ambiguous.
pub fn find_similar_columns<'a, I, S>(role: Role, candidates: &[S], headers: I) -> Resolution
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
    S: AsRef<str>,
{
    let headers = headers.into_iter();
    let mut best: Option<(Binding, usize)> = None;
    let mut warnings = Vec::new();

    for candidate in candidates {
        let candidate = candidate.as_ref();
        let needle = candidate.to_lowercase();
        if needle.is_empty() {
            continue;
        }
        let group: Vec<String> = headers
            .clone()
            .filter(|h| h.to_lowercase().contains(&needle))
            .map(str::to_string)
            .collect();
        let Some(first) = group.first() else {
            continue;
        };
        let distance = levenshtein(&needle, &first.to_lowercase());
        let binding = Binding {
            matched_name: candidate.to_string(),
            headers: group,
        };

        best = match best {
            None => Some((binding, distance)),
            Some((kept, kept_distance)) => {
                let (chosen, rejected) = if kept_distance < distance {
                    ((kept, kept_distance), binding)
                } else {
                    ((binding, distance), kept)
                };
                let warning = DatasetWarning::AmbiguousColumn {
                    role,
                    chosen: chosen.0.headers[0].clone(),
                    rejected: rejected.headers[0].clone(),
                };
                warn!("{warning}");
                warnings.push(warning);
                Some(chosen)
            }
        };
    }

    Resolution {
        binding: best.map(|(b, _)| b),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("vg", "vg"), 0);
    }

    #[test]
    fn binds_every_header_of_a_group_in_order() {
        let headers = ["Vg 1", "Id 1", "Vg 2", "Id 2"];
        let r = find_similar_columns(Role::GateVoltage, &["vg"], headers.iter().copied());
        let b = r.binding.unwrap();
        assert_eq!(b.matched_name, "vg");
        assert_eq!(b.headers, vec!["Vg 1", "Vg 2"]);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn ambiguity_prefers_closer_header() {
        let headers = ["GateV", "Vg_set"];
        let r = find_similar_columns(
            Role::GateVoltage,
            &["gatev", "vg"],
            headers.iter().copied(),
        );
        let b = r.binding.unwrap();
        assert_eq!(b.headers, vec!["GateV"]);
        assert_eq!(r.warnings.len(), 1);
        assert!(matches!(
            &r.warnings[0],
            DatasetWarning::AmbiguousColumn { chosen, rejected, .. }
                if chosen == "GateV" && rejected == "Vg_set"
        ));
    }

    #[test]
    fn no_match_leaves_role_unbound() {
        let headers = ["Time", "Temp"];
        let r = find_similar_columns(Role::GateCurrent, &["ig", "gatei"], headers.iter().copied());
        assert!(r.binding.is_none());
    }
}
