//! Priority rules for ranking activities.
//!
//! # Rules
//!
//! | Rule | Key | Order |
//! |---|---|---|
//! | `HRPW*` | duration plus the heaviest successor chain | descending |
//! | `LST` | latest start | ascending |
//! | `LFT` | latest finish | ascending |
//! | `EFT` | earliest start + duration | ascending |
//! | `MTS` | number of distinct transitive successors | descending |
//! | `STFD` | slack | ascending |
//! | `HRU1` | total skill headcount | descending |
//! | `HRU2` | headcount × duration | descending |
//! | `TIMRES` | duration × headcount | descending |
//! | `TIMROS` | duration / resources able to cover every demanded skill | descending |
//!
//! Ties are always broken by ascending activity id, so every ranking is a
//! total, deterministic order.

use crate::activity::ActivityId;
use crate::instance::ProjectInstance;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown priority rule '{0}'")]
pub struct UnknownRule(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorityRule {
    #[serde(rename = "HRPW*")]
    Hrpw,
    #[serde(rename = "LST")]
    Lst,
    #[serde(rename = "LFT")]
    Lft,
    #[serde(rename = "MTS")]
    Mts,
    #[serde(rename = "TIMROS")]
    Timros,
    #[serde(rename = "HRU1")]
    Hru1,
    #[serde(rename = "TIMRES")]
    Timres,
    #[serde(rename = "HRU2")]
    Hru2,
    #[serde(rename = "STFD")]
    Stfd,
    #[serde(rename = "EFT")]
    Eft,
}

impl PriorityRule {
    /// Canonical evaluation order.
    pub const ALL: [PriorityRule; 10] = [
        PriorityRule::Hrpw,
        PriorityRule::Lst,
        PriorityRule::Lft,
        PriorityRule::Mts,
        PriorityRule::Timros,
        PriorityRule::Hru1,
        PriorityRule::Timres,
        PriorityRule::Hru2,
        PriorityRule::Stfd,
        PriorityRule::Eft,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PriorityRule::Hrpw => "HRPW*",
            PriorityRule::Lst => "LST",
            PriorityRule::Lft => "LFT",
            PriorityRule::Mts => "MTS",
            PriorityRule::Timros => "TIMROS",
            PriorityRule::Hru1 => "HRU1",
            PriorityRule::Timres => "TIMRES",
            PriorityRule::Hru2 => "HRU2",
            PriorityRule::Stfd => "STFD",
            PriorityRule::Eft => "EFT",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PriorityRule::Hrpw => "Heaviest remaining path weight",
            PriorityRule::Lst => "Latest start time",
            PriorityRule::Lft => "Latest finish time",
            PriorityRule::Mts => "Most total successors",
            PriorityRule::Timros => "Duration over resource availability",
            PriorityRule::Hru1 => "Highest resource usage",
            PriorityRule::Timres => "Duration times resource demand",
            PriorityRule::Hru2 => "Highest resource usage weighted by duration",
            PriorityRule::Stfd => "Smallest total float",
            PriorityRule::Eft => "Earliest finish time",
        }
    }

    pub fn order(self) -> SortOrder {
        match self {
            PriorityRule::Lst | PriorityRule::Lft | PriorityRule::Eft | PriorityRule::Stfd => {
                SortOrder::Ascending
            }
            PriorityRule::Hrpw
            | PriorityRule::Mts
            | PriorityRule::Hru1
            | PriorityRule::Hru2
            | PriorityRule::Timres
            | PriorityRule::Timros => SortOrder::Descending,
        }
    }

    /// Parses a comma-separated list such as `"LFT, HRPW*"`.
    pub fn parse_list(list: &str) -> Result<Vec<PriorityRule>, UnknownRule> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for PriorityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PriorityRule {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        if normalized == "HRPW" {
            return Ok(PriorityRule::Hrpw);
        }
        Self::ALL
            .into_iter()
            .find(|rule| rule.name() == normalized)
            .ok_or_else(|| UnknownRule(s.trim().to_string()))
    }
}

/// Ranking keys for every activity of one instance, computed once.
pub struct PriorityRanker<'a> {
    instance: &'a ProjectInstance,
    hrpw: Vec<i64>,
    transitive_successors: Vec<usize>,
    demand: Vec<u32>,
    availability: Vec<usize>,
}

impl<'a> PriorityRanker<'a> {
    pub fn new(instance: &'a ProjectInstance) -> Self {
        Self {
            instance,
            hrpw: heaviest_path_weights(instance),
            transitive_successors: transitive_successor_counts(instance),
            demand: instance
                .activities()
                .iter()
                .map(|a| a.total_demand())
                .collect(),
            availability: resource_availability(instance),
        }
    }

    pub fn instance(&self) -> &ProjectInstance {
        self.instance
    }

    pub fn hrpw(&self, id: ActivityId) -> i64 {
        self.hrpw[id]
    }

    pub fn transitive_successors(&self, id: ActivityId) -> usize {
        self.transitive_successors[id]
    }

    /// Number of resources holding every skill the activity demands.
    pub fn availability(&self, id: ActivityId) -> usize {
        self.availability[id]
    }

    /// Raw key of `rule` for activity `id`, before applying the rule's order.
    pub fn key(&self, rule: PriorityRule, id: ActivityId) -> f64 {
        let activity = &self.instance.activities()[id];
        let duration = activity.duration as f64;
        let demand = f64::from(self.demand[id]);
        match rule {
            PriorityRule::Hrpw => self.hrpw[id] as f64,
            PriorityRule::Lst => activity.latest_start as f64,
            PriorityRule::Lft => activity.latest_finish as f64,
            PriorityRule::Eft => (activity.earliest_start + activity.duration) as f64,
            PriorityRule::Mts => self.transitive_successors[id] as f64,
            PriorityRule::Stfd => activity.slack as f64,
            PriorityRule::Hru1 => demand,
            PriorityRule::Hru2 => demand * duration,
            PriorityRule::Timres => duration * demand,
            PriorityRule::Timros => match self.availability[id] {
                0 => f64::INFINITY,
                available => duration / available as f64,
            },
        }
    }

    /// `Less` means `a` is preferred over `b`.
    pub fn compare(&self, rule: PriorityRule, a: ActivityId, b: ActivityId) -> Ordering {
        let (ka, kb) = (self.key(rule, a), self.key(rule, b));
        let by_key = match rule.order() {
            SortOrder::Ascending => ka.total_cmp(&kb),
            SortOrder::Descending => kb.total_cmp(&ka),
        };
        by_key.then(a.cmp(&b))
    }

    /// All activities sorted by `rule`, ignoring precedence.
    pub fn ranking(&self, rule: PriorityRule) -> Vec<ActivityId> {
        let mut ids: Vec<ActivityId> = (0..self.instance.num_activities()).collect();
        ids.sort_by(|&a, &b| self.compare(rule, a, b));
        ids
    }

    /// The ranking of `rule` turned into a precedence-feasible sequence.
    pub fn precedence_feasible_order(&self, rule: PriorityRule) -> Vec<ActivityId> {
        reorder_respecting_precedence(self.instance, &self.ranking(rule))
    }
}

/// Turns a ranking into a precedence-respecting sequence: repeatedly emits,
/// among activities whose predecessors are all placed, the one ranked first.
///
/// Activities missing from `ranking` rank after every listed one. If nothing
/// is placeable before the sequence is complete, the remainder is appended in
/// ranking order.
pub fn reorder_respecting_precedence(
    instance: &ProjectInstance,
    ranking: &[ActivityId],
) -> Vec<ActivityId> {
    let n = instance.num_activities();
    let mut priority = vec![usize::MAX; n];
    for (idx, &id) in ranking.iter().enumerate() {
        if id < n && priority[id] == usize::MAX {
            priority[id] = idx;
        }
    }

    let mut pending: Vec<usize> = instance
        .activities()
        .iter()
        .map(|a| a.predecessors.len())
        .collect();
    let mut ready: BinaryHeap<Reverse<(usize, ActivityId)>> = pending
        .iter()
        .enumerate()
        .filter(|(_, count)| **count == 0)
        .map(|(id, _)| Reverse((priority[id], id)))
        .collect();

    let mut placed = vec![false; n];
    let mut order = Vec::with_capacity(n);
    while let Some(Reverse((_, id))) = ready.pop() {
        placed[id] = true;
        order.push(id);
        for &succ in &instance.activities()[id].successors {
            pending[succ] -= 1;
            if pending[succ] == 0 {
                ready.push(Reverse((priority[succ], succ)));
            }
        }
    }

    if order.len() < n {
        warn!(
            placed = order.len(),
            total = n,
            "precedence cycle prevents a feasible order; appending the rest in ranking order"
        );
        let mut rest: Vec<ActivityId> = (0..n).filter(|&id| !placed[id]).collect();
        rest.sort_by_key(|&id| (priority[id], id));
        order.extend(rest);
    }

    order
}

/// `HRPW*[a] = duration[a] + max over successors`, filled in reverse
/// topological order so every successor is final before it is read.
fn heaviest_path_weights(instance: &ProjectInstance) -> Vec<i64> {
    let activities = instance.activities();
    let mut weights = vec![0_i64; activities.len()];
    for &id in instance.topological_order().iter().rev() {
        let tail = activities[id]
            .successors
            .iter()
            .map(|&succ| weights[succ])
            .max()
            .unwrap_or(0);
        weights[id] = activities[id].duration + tail;
    }
    weights
}

fn transitive_successor_counts(instance: &ProjectInstance) -> Vec<usize> {
    let activities = instance.activities();
    let n = activities.len();
    // Visit stamps avoid clearing a visited set per source.
    let mut stamp = vec![usize::MAX; n];
    let mut queue = VecDeque::new();
    let mut counts = vec![0; n];

    for source in 0..n {
        let mut count = 0;
        queue.clear();
        queue.push_back(source);
        stamp[source] = source;
        while let Some(current) = queue.pop_front() {
            for &succ in &activities[current].successors {
                if stamp[succ] != source {
                    stamp[succ] = source;
                    count += 1;
                    queue.push_back(succ);
                }
            }
        }
        counts[source] = count;
    }
    counts
}

fn resource_availability(instance: &ProjectInstance) -> Vec<usize> {
    instance
        .activities()
        .iter()
        .map(|activity| {
            let demanded: Vec<usize> = activity.demanded_skills().collect();
            instance
                .resources()
                .iter()
                .filter(|resource| resource.covers(demanded.iter().copied()) == demanded.len())
                .count()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_names_parse_case_insensitively() {
        assert_eq!("hrpw*".parse::<PriorityRule>(), Ok(PriorityRule::Hrpw));
        assert_eq!("HRPW".parse::<PriorityRule>(), Ok(PriorityRule::Hrpw));
        assert_eq!(" timros ".parse::<PriorityRule>(), Ok(PriorityRule::Timros));
        assert_eq!(
            "SPT".parse::<PriorityRule>(),
            Err(UnknownRule("SPT".to_string()))
        );
    }

    #[test]
    fn every_rule_round_trips_through_its_name() {
        for rule in PriorityRule::ALL {
            assert_eq!(rule.name().parse::<PriorityRule>(), Ok(rule));
        }
    }

    #[test]
    fn parse_list_rejects_unknown_entries() {
        assert_eq!(
            PriorityRule::parse_list("LFT, eft"),
            Ok(vec![PriorityRule::Lft, PriorityRule::Eft])
        );
        assert!(PriorityRule::parse_list("LFT,FIFO").is_err());
    }
}
