use anyhow::{anyhow, Result};
use tracing::debug;

use crate::document::{Document, Entry, ENTRY_SLOTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationState {
    pub section: usize,
    pub entry: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    SectionChanged { from: usize, to: usize },
    EntryChanged { from: usize, to: usize },
}

impl Transition {
    pub fn is_change(self) -> bool {
        !matches!(self, Transition::Unchanged)
    }
}

#[derive(Debug, Clone)]
pub struct Navigator {
    document: &'static Document,
    state: NavigationState,
}

impl Navigator {
    pub fn new(document: &'static Document) -> Result<Self> {
        if document.entry(0, 0).is_none() {
            return Err(anyhow!("document has no entry at (0, 0)"));
        }
        Ok(Self {
            document,
            state: NavigationState::default(),
        })
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn document(&self) -> &'static Document {
        self.document
    }

    pub fn current_entry(&self) -> Option<&'static Entry> {
        self.document.entry(self.state.section, self.state.entry)
    }

    pub fn select_section(&mut self, index: usize) -> Transition {
        if index == self.state.section || self.document.entry(index, 0).is_none() {
            return Transition::Unchanged;
        }
        let from = self.state.section;
        self.state = NavigationState {
            section: index,
            entry: 0,
        };
        debug!(from, to = index, "section selected");
        Transition::SectionChanged { from, to: index }
    }

    pub fn select_entry(&mut self, index: usize) -> Transition {
        if index == self.state.entry || self.document.entry(self.state.section, index).is_none() {
            return Transition::Unchanged;
        }
        let from = self.state.entry;
        self.state.entry = index;
        debug!(section = self.state.section, from, to = index, "entry selected");
        Transition::EntryChanged { from, to: index }
    }

    pub fn next_section(&mut self) -> Transition {
        let count = self.document.sections().len();
        let mut candidate = self.state.section;
        for _ in 1..count {
            candidate = (candidate + 1) % count;
            if self.document.entry(candidate, 0).is_some() {
                return self.select_section(candidate);
            }
        }
        Transition::Unchanged
    }

    pub fn next_entry(&mut self) -> Transition {
        match (self.state.entry + 1..ENTRY_SLOTS)
            .find(|&i| self.document.entry(self.state.section, i).is_some())
        {
            Some(index) => self.select_entry(index),
            None => Transition::Unchanged,
        }
    }

    pub fn previous_entry(&mut self) -> Transition {
        match (0..self.state.entry)
            .rev()
            .find(|&i| self.document.entry(self.state.section, i).is_some())
        {
            Some(index) => self.select_entry(index),
            None => Transition::Unchanged,
        }
    }
}
