use crate::query::modifier::Modifier;
use crate::query::parser::{ParsedModifier, Query};
use crate::query::registry::ModifierRegistry;
use tracing::debug;

/// Resolved pipeline for one query
#[derive(Debug, Clone, Default)]
pub struct SearchPlan {
    /// Keywords handed to the store for the initial match
    pub keywords: Vec<String>,
    /// Stages in query order
    pub modifiers: Vec<Modifier>,
    /// Modifier tokens whose name matched nothing
    pub dropped: Vec<String>,
}

impl SearchPlan {
    pub fn from_query(query: &Query, registry: &ModifierRegistry) -> Self {
        let mut plan = SearchPlan {
            keywords: query.keywords.clone(),
            ..Default::default()
        };

        for token in &query.modifiers {
            match registry.resolve(ParsedModifier::parse(token)) {
                Some(modifier) => plan.modifiers.push(modifier),
                None => {
                    debug!("dropping unknown modifier {:?}", token);
                    plan.dropped.push(token.clone());
                }
            }
        }

        plan
    }
}
