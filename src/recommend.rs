//! Seam to an external rule recommender.
//!
//! A recommender looks at an instance's [`FeatureVector`] and names the rules
//! it expects to do well. The engine never trusts the hint blindly: names are
//! validated and every rule stays reachable through [`search_order`].

use crate::features::FeatureVector;
use crate::priority::{PriorityRule, UnknownRule};

pub trait RuleRecommender: Send + Sync {
    /// Rule names, best first.
    fn recommend(&self, features: &FeatureVector) -> Vec<String>;
}

/// Returns the same hint for every instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticRecommender(pub Vec<String>);

impl StaticRecommender {
    pub fn from_list(list: &str) -> Self {
        Self(
            list.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl RuleRecommender for StaticRecommender {
    fn recommend(&self, _features: &FeatureVector) -> Vec<String> {
        self.0.clone()
    }
}

/// Full evaluation order: hinted rules first (first mention wins), then the
/// remaining rules in canonical order.
pub fn search_order(hint: &[String]) -> Result<Vec<PriorityRule>, UnknownRule> {
    let mut order: Vec<PriorityRule> = Vec::with_capacity(PriorityRule::ALL.len());
    for name in hint {
        let rule: PriorityRule = name.parse()?;
        if !order.contains(&rule) {
            order.push(rule);
        }
    }
    for rule in PriorityRule::ALL {
        if !order.contains(&rule) {
            order.push(rule);
        }
    }
    Ok(order)
}

/// Asks `recommender` about `features` and expands the answer with [`search_order`].
pub fn recommended_order(
    recommender: &dyn RuleRecommender,
    features: &FeatureVector,
) -> Result<Vec<PriorityRule>, UnknownRule> {
    search_order(&recommender.recommend(features))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hinted_rules_come_first_without_duplicates() {
        let hint = vec!["lft".to_string(), "HRPW".to_string(), "LFT".to_string()];
        let order = search_order(&hint).unwrap();
        assert_eq!(order.len(), PriorityRule::ALL.len());
        assert_eq!(order[0], PriorityRule::Lft);
        assert_eq!(order[1], PriorityRule::Hrpw);
        assert_eq!(order[2], PriorityRule::Lst);
    }

    #[test]
    fn empty_hint_is_canonical_order() {
        assert_eq!(search_order(&[]).unwrap(), PriorityRule::ALL.to_vec());
    }

    #[test]
    fn unknown_hint_is_rejected() {
        let err = search_order(&["FIFO".to_string()]).unwrap_err();
        assert_eq!(err, UnknownRule("FIFO".to_string()));
    }

    #[test]
    fn static_recommender_parses_lists() {
        let recommender = StaticRecommender::from_list(" EFT, ,STFD ");
        assert_eq!(recommender.0, vec!["EFT".to_string(), "STFD".to_string()]);
    }
}
