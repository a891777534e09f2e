//! Client-side agent directory: search, sort, and incremental paging over a
//! list already held in memory.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Cards shown before the first "load more".
pub const INITIAL_PAGE: usize = 8;
/// Cards added per "load more".
pub const PAGE_STEP: usize = 4;

/// Public profile card for an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCard {
    pub name: String,
    pub role: String,
    pub image: String,
    /// Free text such as "150+ Properties Sold".
    pub sales: String,
    pub rating: f64,
    pub phone: String,
    pub email: String,
    pub specialization: String,
    /// Free text such as "8 years".
    pub experience: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Rating,
    Experience,
    Sales,
    Name,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rating" => Ok(SortKey::Rating),
            "experience" => Ok(SortKey::Experience),
            "sales" => Ok(SortKey::Sales),
            "name" => Ok(SortKey::Name),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

/// Leading integer of a free-text figure ("150+ Properties Sold" -> 150).
/// Text without one sorts as zero.
fn leading_number(text: &str) -> u32 {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

fn matches(card: &AgentCard, needle: &str) -> bool {
    [&card.name, &card.specialization, &card.role]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

fn compare(a: &AgentCard, b: &AgentCard, key: SortKey) -> Ordering {
    match key {
        SortKey::Rating => b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal),
        SortKey::Experience => leading_number(&b.experience).cmp(&leading_number(&a.experience)),
        SortKey::Sales => leading_number(&b.sales).cmp(&leading_number(&a.sales)),
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    }
}

/// Filtered, sorted view over a directory with a growing visible window.
#[derive(Debug, Clone)]
pub struct AgentDirectory {
    agents: Vec<AgentCard>,
    filtered: Vec<usize>,
    visible: usize,
}

impl AgentDirectory {
    pub fn new(agents: Vec<AgentCard>) -> Self {
        let mut directory = Self {
            agents,
            filtered: Vec::new(),
            visible: 0,
        };
        directory.apply("", SortKey::default());
        directory
    }

    /// Re-run the search and sort; the visible window resets to the first page.
    pub fn apply(&mut self, search: &str, sort: SortKey) {
        let needle = search.to_lowercase();
        let mut filtered: Vec<usize> = (0..self.agents.len())
            .filter(|&i| matches(&self.agents[i], &needle))
            .collect();
        filtered.sort_by(|&a, &b| compare(&self.agents[a], &self.agents[b], sort));
        self.filtered = filtered;
        self.visible = INITIAL_PAGE.min(self.filtered.len());
    }

    /// Number of agents matching the current search.
    pub fn total(&self) -> usize {
        self.filtered.len()
    }

    pub fn visible(&self) -> Vec<&AgentCard> {
        self.filtered[..self.visible]
            .iter()
            .map(|&i| &self.agents[i])
            .collect()
    }

    pub fn has_more(&self) -> bool {
        self.visible < self.filtered.len()
    }

    /// Reveal up to `PAGE_STEP` more cards. Returns how many were added.
    pub fn load_more(&mut self) -> usize {
        let before = self.visible;
        self.visible = (self.visible + PAGE_STEP).min(self.filtered.len());
        self.visible - before
    }
}
