//! Resource currencies and per-tick production totals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Raw resources produced by buildings and consumed by construction.
///
/// Credits are a cost currency only; they are never produced per tick and
/// never gate research.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Durastahl,
    Kristallin,
    Tibanna,
    Energie,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Durastahl,
        Resource::Kristallin,
        Resource::Tibanna,
        Resource::Energie,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Durastahl => "durastahl",
            Resource::Kristallin => "kristallin",
            Resource::Tibanna => "tibanna",
            Resource::Energie => "energie",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| format!("unknown resource '{s}'"))
    }
}

/// Per-tick production, one counter per resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub durastahl: u64,
    pub kristallin: u64,
    pub tibanna: u64,
    pub energie: u64,
}

impl Production {
    pub fn get(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Durastahl => self.durastahl,
            Resource::Kristallin => self.kristallin,
            Resource::Tibanna => self.tibanna,
            Resource::Energie => self.energie,
        }
    }

    pub fn add(&mut self, resource: Resource, amount: u64) {
        let slot = match resource {
            Resource::Durastahl => &mut self.durastahl,
            Resource::Kristallin => &mut self.kristallin,
            Resource::Tibanna => &mut self.tibanna,
            Resource::Energie => &mut self.energie,
        };
        *slot = slot.saturating_add(amount);
    }

    /// Builder-style helper for tests and seeding.
    pub fn with(mut self, resource: Resource, amount: u64) -> Self {
        self.add(resource, amount);
        self
    }
}

/// Construction costs. Build time is kept fractional until the blueprint
/// total is rounded up to whole minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Costs {
    pub credits: f64,
    pub durastahl: f64,
    pub kristallin: f64,
    pub tibanna: f64,
    pub build_minutes: f64,
}

impl Costs {
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            credits: self.credits * factor,
            durastahl: self.durastahl * factor,
            kristallin: self.kristallin * factor,
            tibanna: self.tibanna * factor,
            build_minutes: self.build_minutes * factor,
        }
    }

    pub fn accumulate(&mut self, other: &Self) {
        self.credits += other.credits;
        self.durastahl += other.durastahl;
        self.kristallin += other.kristallin;
        self.tibanna += other.tibanna;
        self.build_minutes += other.build_minutes;
    }

    pub(crate) fn fields(&self) -> [(f64, &'static str); 5] {
        [
            (self.credits, "credits"),
            (self.durastahl, "durastahl"),
            (self.kristallin, "kristallin"),
            (self.tibanna, "tibanna"),
            (self.build_minutes, "build_minutes"),
        ]
    }
}
