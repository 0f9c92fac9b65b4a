//! Headless UI state: the year selector and the staged country multi-select.
//!
//! The country selection is two-phase: edits accumulate in a staged set and
//! only become part of the committed [`FilterState`] on an explicit
//! [`Controls::apply`]. That defers the pipeline re-run until the user
//! confirms, instead of recomputing on every checkbox toggle.

use crate::models::{FilterState, Record};
use std::collections::{BTreeMap, BTreeSet};

/// Phase of the country multi-select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    /// Staged edits differ from (or have not yet been committed to) the
    /// applied selection.
    Editing,
    /// Staged and applied selections coincide.
    Applied,
}

#[derive(Debug, Clone)]
pub struct Controls {
    /// Distinct years, descending (dropdown order).
    years: Vec<i32>,
    /// Countries present per year, in first-seen order of the feed.
    countries_by_year: BTreeMap<i32, Vec<String>>,
    selected_year: Option<i32>,
    staged: BTreeSet<String>,
    applied: BTreeSet<String>,
    phase: SelectionPhase,
}

impl Controls {
    /// Build controls from a loaded record set; the year selector starts at
    /// the most recent year present.
    pub fn new(records: &[Record]) -> Self {
        let mut years: Vec<i32> = Vec::new();
        let mut countries_by_year: BTreeMap<i32, Vec<String>> = BTreeMap::new();
        for r in records {
            if !years.contains(&r.year) {
                years.push(r.year);
            }
            let list = countries_by_year.entry(r.year).or_default();
            if !list.contains(&r.country) {
                list.push(r.country.clone());
            }
        }
        years.sort_unstable_by(|a, b| b.cmp(a));

        Self {
            selected_year: years.first().copied(),
            years,
            countries_by_year,
            staged: BTreeSet::new(),
            applied: BTreeSet::new(),
            phase: SelectionPhase::Applied,
        }
    }

    pub fn year_options(&self) -> &[i32] {
        &self.years
    }

    /// Countries available under the currently selected year.
    pub fn country_options(&self) -> &[String] {
        self.selected_year
            .and_then(|y| self.countries_by_year.get(&y))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_year(&self) -> Option<i32> {
        self.selected_year
    }

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn staged_countries(&self) -> &BTreeSet<String> {
        &self.staged
    }

    /// Change the year. Resets both staged and applied country selections to
    /// empty (the default set), regardless of what was committed before.
    pub fn set_year(&mut self, year: i32) {
        self.selected_year = Some(year);
        self.staged.clear();
        self.applied.clear();
        self.phase = SelectionPhase::Applied;
    }

    /// Stage a country without committing. Unknown names are staged too;
    /// they simply yield an empty result downstream.
    pub fn stage_country(&mut self, country: impl Into<String>) {
        self.staged.insert(country.into());
        self.phase = SelectionPhase::Editing;
    }

    pub fn unstage_country(&mut self, country: &str) {
        self.staged.remove(country);
        self.phase = SelectionPhase::Editing;
    }

    /// The single `Apply` transition: commit the staged selection.
    pub fn apply(&mut self) {
        self.applied = self.staged.clone();
        self.phase = SelectionPhase::Applied;
    }

    /// The committed selection the pipeline runs on. Staged-but-unapplied
    /// edits are invisible here.
    pub fn filter_state(&self) -> FilterState {
        FilterState {
            selected_year: self.selected_year,
            selected_countries: self.applied.clone(),
        }
    }
}
