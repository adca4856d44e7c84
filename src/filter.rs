use smallvec::SmallVec;

use crate::index::DebugTreeItem;
use crate::model::Concept;

/// Parsed filter text: OR-groups of lower-cased AND-terms.
///
/// `"a b, c"` matches items containing both `a` and `b`, or containing `c`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterExpr {
    groups: Vec<SmallVec<[String; 4]>>,
}

impl FilterExpr {
    /// Parses filter text. Returns `None` when there is nothing to filter by,
    /// which is different from a filter that matches nothing.
    pub fn parse(text: &str) -> Option<Self> {
        let groups: Vec<SmallVec<[String; 4]>> = text
            .split(',')
            .map(|group| {
                group
                    .split_whitespace()
                    .map(str::to_lowercase)
                    .collect::<SmallVec<[String; 4]>>()
            })
            .filter(|terms| !terms.is_empty())
            .collect();
        if groups.is_empty() {
            None
        } else {
            Some(Self { groups })
        }
    }

    pub fn groups(&self) -> &[SmallVec<[String; 4]>] {
        &self.groups
    }

    /// Returns `true` if every term of at least one group is found in the item.
    pub fn matches<Id>(&self, item: &DebugTreeItem<Id>) -> bool {
        let tag = item.kind.filter_tag();
        self.groups.iter().any(|terms| {
            terms.iter().all(|term| {
                let term = term.as_str();
                item.search_name.contains(term)
                    || item.search_description.contains(term)
                    || tag.contains(term)
            })
        })
    }
}

/// Filter text together with its parsed form.
///
/// The revision changes only when the parsed expression changes, so edits
/// that only touch whitespace keep derived match sets cached.
#[derive(Clone, Debug, Default)]
pub struct FilterState {
    text: String,
    expr: Option<FilterExpr>,
    revision: u64,
}

impl FilterState {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            expr: FilterExpr::parse(text),
            revision: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn expr(&self) -> Option<&FilterExpr> {
        self.expr.as_ref()
    }

    #[inline]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Stores new text; returns `true` if the parsed filter changed.
    pub fn set(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text = text.to_owned();
        let expr = FilterExpr::parse(text);
        if expr == self.expr {
            return false;
        }
        self.expr = expr;
        self.revision += 1;
        true
    }
}

/// Toggles a bracketed category (`[component]`, ...) as its own OR-group of
/// the filter text and returns the new text.
///
/// With `reset`, every other category group is removed first; the category
/// itself is only flipped if nothing else had to be removed.
pub fn toggle_concept(filter: &str, concept: Concept, reset: bool) -> String {
    let term = concept.term();
    let mut groups: Vec<String> = if filter.is_empty() {
        Vec::new()
    } else {
        filter.split(',').map(str::to_owned).collect()
    };
    let is_term = |group: &str| group.trim().to_lowercase() == term;
    let existing = groups.iter().position(|group| is_term(group));

    if reset {
        let all_terms: SmallVec<[String; 12]> = Concept::ALL.iter().map(|c| c.term()).collect();
        let before = groups.len();
        groups.retain(|group| {
            let lower = group.trim().to_lowercase();
            lower == term || !all_terms.contains(&lower)
        });
        if groups.len() == before {
            flip(&mut groups, existing, &term);
        } else if !groups.iter().any(|group| is_term(group)) {
            push_group(&mut groups, &term);
        }
    } else {
        flip(&mut groups, existing, &term);
    }

    groups.join(",")
}

fn flip(groups: &mut Vec<String>, existing: Option<usize>, term: &str) {
    match existing {
        Some(idx) => {
            groups.remove(idx);
        }
        None => push_group(groups, term),
    }
}

fn push_group(groups: &mut Vec<String>, term: &str) {
    if groups.is_empty() {
        groups.push(term.to_owned());
    } else {
        groups.push(format!(" {term}"));
    }
}
