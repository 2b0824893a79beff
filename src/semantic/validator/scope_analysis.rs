//! Visible columns as the pipeline progresses.

use smol_str::SmolStr;

use crate::semantic::types::ExprType;

/// Result of resolving a column name.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum ColumnLookup {
    Found(ExprType),
    /// The scope is open and the name is not known; it is not reported.
    Unchecked,
    Missing,
}

/// Ordered set of columns visible to the current command.
///
/// An open scope does not know every column (no schema was supplied for
/// `FROM`), so unresolved names are accepted with an unknown type.
#[derive(Debug, Clone, Default)]
pub(super) struct ColumnScope {
    columns: Vec<(SmolStr, ExprType)>,
    open: bool,
}

impl ColumnScope {
    pub(super) fn open() -> Self {
        Self {
            columns: Vec::new(),
            open: true,
        }
    }

    pub(super) fn closed(columns: Vec<(SmolStr, ExprType)>) -> Self {
        Self {
            columns,
            open: false,
        }
    }

    pub(super) fn is_open(&self) -> bool {
        self.open
    }

    /// Column names compare case-sensitively.
    pub(super) fn lookup(&self, name: &str) -> ColumnLookup {
        match self.columns.iter().find(|(column, _)| column == name) {
            Some((_, ty)) => ColumnLookup::Found(ty.clone()),
            None if self.open => ColumnLookup::Unchecked,
            None => ColumnLookup::Missing,
        }
    }

    pub(super) fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|(column, _)| column == name)
    }

    /// Defines a column; a redefinition moves the name to the end.
    pub(super) fn define(&mut self, name: SmolStr, ty: ExprType) {
        self.columns.retain(|(column, _)| *column != name);
        self.columns.push((name, ty));
    }

    /// Keeps only columns matching `patterns`, ordered by the first pattern
    /// each one matches.
    pub(super) fn keep(&mut self, patterns: &[&str]) {
        let mut remaining = std::mem::take(&mut self.columns);
        for pattern in patterns {
            let (matched, rest): (Vec<_>, Vec<_>) = remaining
                .into_iter()
                .partition(|(column, _)| glob_matches(pattern, column));
            self.columns.extend(matched);
            remaining = rest;
        }
    }

    pub(super) fn drop_matching(&mut self, patterns: &[&str]) {
        self.columns
            .retain(|(column, _)| !patterns.iter().any(|pattern| glob_matches(pattern, column)));
    }

    pub(super) fn columns(&self) -> &[(SmolStr, ExprType)] {
        &self.columns
    }
}

/// Matches `name` against a pattern where `*` stands for any run of characters.
pub(super) fn glob_matches(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    let (mut p, mut n) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, n));
            p += 1;
        } else if p < pattern.len() && pattern[p] == name[n] {
            p += 1;
            n += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            n = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '*')
}
