//! Transit-group priority.
//!
//! Every trip belongs to exactly one group. A group id is a single bit in a
//! `u32`; a path's `c2` is the OR of the groups of every boarded trip. A path
//! whose group set is a strict subset of another path's set dominates it,
//! while paths touching different groups are both kept.
//!
//! Ids are assigned in two tiers:
//! - global rules get one id each when the resolver is constructed;
//! - by-agency rules give every matched agency its own id, assigned the
//!   first time that agency is looked up.
//!
//! Trips matching no rule fall into the base group ([`BASE_GROUP_ID`]).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dominance::{C2Criterion, DominanceFn};
use crate::error::{Error, Result};
use crate::model::{PatternIndex, RouteInfo, TripPattern};
use crate::network::TransitDataProvider;

/// Group of every trip not matched by any rule.
pub const BASE_GROUP_ID: u32 = 1;

/// Number of distinct groups that fit in the bitset, base group included.
pub const MAX_GROUPS: u32 = u32::BITS;

/// `left` dominates `right` when `right` uses a group `left` does not.
#[inline]
pub fn dominate(left: u32, right: u32) -> bool {
    ((left ^ right) & right) != 0
}

/// Accumulate the group of a newly boarded trip.
#[inline]
pub fn merge_group_ids(current: u32, boarded: u32) -> u32 {
    current | boarded
}

/// Group id for the `index`-th group (0 is the base group).
pub fn group_id(index: u32) -> Result<u32> {
    if index >= MAX_GROUPS {
        return Err(Error::TooManyTransitGroups { limit: MAX_GROUPS });
    }
    Ok(1 << index)
}

/// Match predicate over route attributes.
///
/// Every non-empty list must contain the corresponding attribute. A select
/// with only empty lists matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitGroupSelect {
    pub modes: Vec<String>,
    pub sub_modes: Vec<String>,
    pub agencies: Vec<String>,
    pub routes: Vec<String>,
}

impl TransitGroupSelect {
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
            && self.sub_modes.is_empty()
            && self.agencies.is_empty()
            && self.routes.is_empty()
    }

    pub fn matches(&self, route: &RouteInfo) -> bool {
        fn accepts(list: &[String], value: Option<&str>) -> bool {
            list.is_empty() || value.is_some_and(|v| list.iter().any(|item| item == v))
        }

        !self.is_empty()
            && accepts(&self.modes, Some(&route.mode))
            && accepts(&self.sub_modes, route.sub_mode.as_deref())
            && accepts(&self.agencies, Some(&route.agency))
            && accepts(&self.routes, Some(&route.id))
    }
}

/// Transit-group rules of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitGroupPriorityConfig {
    /// Each agency matched by one of these rules becomes its own group.
    pub by_agency: Vec<TransitGroupSelect>,
    /// Each rule is one group, whatever agencies it matches.
    pub global: Vec<TransitGroupSelect>,
}

impl TransitGroupPriorityConfig {
    pub fn is_empty(&self) -> bool {
        self.by_agency.is_empty() && self.global.is_empty()
    }
}

/// Resolves group ids, assigning a new id the first time an agency is seen.
///
/// Lookups mutate the resolver, so it takes `&mut self`. The resolver is
/// request-scoped and never shared.
#[derive(Debug, Clone)]
pub struct TransitGroupIdResolver {
    by_agency: Vec<TransitGroupSelect>,
    global: Vec<(TransitGroupSelect, u32)>,
    agency_ids: HashMap<(usize, String), u32>,
    next_index: u32,
}

impl TransitGroupIdResolver {
    pub fn new(config: &TransitGroupPriorityConfig) -> Result<Self> {
        let mut next_index = 1;
        let mut global = Vec::with_capacity(config.global.len());
        for select in &config.global {
            global.push((select.clone(), group_id(next_index)?));
            next_index += 1;
        }
        Ok(Self {
            by_agency: config.by_agency.clone(),
            global,
            agency_ids: HashMap::new(),
            next_index,
        })
    }

    /// Group id of trips on `route`.
    pub fn lookup(&mut self, route: &RouteInfo) -> Result<u32> {
        if let Some(rule) = self.by_agency.iter().position(|s| s.matches(route)) {
            let key = (rule, route.agency.clone());
            if let Some(id) = self.agency_ids.get(&key) {
                return Ok(*id);
            }
            let id = group_id(self.next_index)?;
            self.next_index += 1;
            self.agency_ids.insert(key, id);
            return Ok(id);
        }
        Ok(self
            .global
            .iter()
            .find(|(select, _)| select.matches(route))
            .map_or(BASE_GROUP_ID, |(_, id)| *id))
    }

    /// Groups assigned so far, base group included.
    pub fn group_count(&self) -> u32 {
        self.next_index
    }
}

/// Request-scoped, immutable group ids for every pattern of a network.
#[derive(Debug, Clone)]
pub struct TransitGroupPriorityService {
    group_by_pattern: Vec<u32>,
    group_count: u32,
}

impl TransitGroupPriorityService {
    /// Resolve the group of every pattern in `data`.
    ///
    /// Fails when the rules produce more than [`MAX_GROUPS`] groups.
    pub fn build(
        config: &TransitGroupPriorityConfig,
        data: &dyn TransitDataProvider,
    ) -> Result<Self> {
        let mut resolver = TransitGroupIdResolver::new(config)?;
        let num_patterns = data.num_patterns();
        let group_by_pattern = (0..num_patterns)
            .map(|index| resolver.lookup(&data.pattern(index).route))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            groups = resolver.group_count(),
            patterns = num_patterns,
            "resolved transit priority groups"
        );
        Ok(Self {
            group_by_pattern,
            group_count: resolver.group_count(),
        })
    }

    pub fn group_id(&self, pattern: PatternIndex) -> u32 {
        self.group_by_pattern[pattern]
    }

    pub fn group_count(&self) -> u32 {
        self.group_count
    }
}

impl C2Criterion for TransitGroupPriorityService {
    fn initial_c2(&self) -> u32 {
        0
    }

    fn board(&self, c2: u32, pattern: &TripPattern) -> u32 {
        merge_group_ids(c2, self.group_id(pattern.index))
    }

    fn dominance(&self) -> DominanceFn {
        dominate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select_agency(agency: &str) -> TransitGroupSelect {
        TransitGroupSelect {
            agencies: vec![agency.to_string()],
            ..TransitGroupSelect::default()
        }
    }

    fn select_mode(mode: &str) -> TransitGroupSelect {
        TransitGroupSelect {
            modes: vec![mode.to_string()],
            ..TransitGroupSelect::default()
        }
    }

    #[test]
    fn bitset_dominance() {
        assert!(dominate(0b101, 0b111));
        assert!(!dominate(0b111, 0b101));
        assert!(!dominate(0b110, 0b110));
        assert!(dominate(0b001, 0b010));
        assert!(dominate(0b010, 0b001));
    }

    #[test]
    fn unmatched_routes_use_base_group() {
        let mut resolver = TransitGroupIdResolver::new(&TransitGroupPriorityConfig {
            global: vec![select_mode("RAIL")],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(resolver.lookup(&RouteInfo::new("L1", "A", "BUS")).unwrap(), BASE_GROUP_ID);
        assert_eq!(resolver.lookup(&RouteInfo::new("R1", "A", "RAIL")).unwrap(), 0b10);
    }

    #[test]
    fn agencies_get_lazy_ids_before_global_rules() {
        let config = TransitGroupPriorityConfig {
            by_agency: vec![select_mode("BUS")],
            global: vec![select_mode("RAIL"), select_agency("X")],
        };
        let mut resolver = TransitGroupIdResolver::new(&config).unwrap();
        assert_eq!(resolver.group_count(), 3);

        let first = resolver.lookup(&RouteInfo::new("L1", "X", "BUS")).unwrap();
        let second = resolver.lookup(&RouteInfo::new("L2", "Y", "BUS")).unwrap();
        let again = resolver.lookup(&RouteInfo::new("L3", "X", "BUS")).unwrap();
        assert_eq!((first, second, again), (0b1000, 0b1_0000, 0b1000));
        // global rules are tried in order, first match wins
        assert_eq!(resolver.lookup(&RouteInfo::new("R1", "X", "RAIL")).unwrap(), 0b10);
        assert_eq!(resolver.lookup(&RouteInfo::new("F1", "X", "FERRY")).unwrap(), 0b100);
        assert_eq!(resolver.group_count(), 5);
    }

    #[test]
    fn thirty_two_groups_fit_and_thirty_three_fail() {
        let rules = |n: usize| TransitGroupPriorityConfig {
            global: (0..n).map(|i| select_agency(&format!("A{i}"))).collect(),
            ..Default::default()
        };
        let resolver = TransitGroupIdResolver::new(&rules(31)).unwrap();
        assert_eq!(resolver.group_count(), 32);
        assert!(matches!(
            TransitGroupIdResolver::new(&rules(32)),
            Err(Error::TooManyTransitGroups { limit: 32 })
        ));
    }

    #[test]
    fn lazy_assignment_fails_past_the_cap() {
        let mut resolver = TransitGroupIdResolver::new(&TransitGroupPriorityConfig {
            by_agency: vec![select_mode("BUS")],
            ..Default::default()
        })
        .unwrap();
        for i in 0..31 {
            resolver
                .lookup(&RouteInfo::new("L", format!("A{i}"), "BUS"))
                .unwrap();
        }
        let err = resolver
            .lookup(&RouteInfo::new("L", "A31", "BUS"))
            .unwrap_err();
        assert!(matches!(err, Error::TooManyTransitGroups { .. }));
    }

    #[test]
    fn sub_mode_rule_requires_a_sub_mode() {
        let select = TransitGroupSelect {
            sub_modes: vec!["express".to_string()],
            ..Default::default()
        };
        assert!(!select.matches(&RouteInfo::new("L1", "A", "BUS")));
        assert!(select.matches(&RouteInfo::new("L1", "A", "BUS").with_sub_mode("express")));
        assert!(!TransitGroupSelect::default().matches(&RouteInfo::new("L1", "A", "BUS")));
    }
}
