//! Relevance ranking of catalog entries.
//!
//! [`ToolRanker`] narrows a catalog to a small, safe subset for one request.
//! It is a heuristic pre-filter, not a semantic search. Its contract:
//!
//! - deterministic for identical input (ties break on tool name)
//! - destructive actions never surface unless a deletion was asked for in a
//!   request with a recognized topic
//! - output length never exceeds the configured maximum
//!
//! # Pipeline
//!
//! ```text
//! signals ─▶ admitted namespaces ─▶ filter ─▶ score + sort ─▶ backfill ─▶ dedupe + cap
//! ```

use super::intent::{Intent, IntentSignals};
use crate::tool::entities::ToolDefinition;
use std::collections::HashSet;

/// Namespaces of database engines.
pub const DATABASE_NAMESPACES: &[&str] = &["postgres", "mysql", "mariadb", "mongo", "redis"];

/// Organizational namespaces admitted for every non-query intent so ids can
/// be resolved.
pub const ORGANIZATION_NAMESPACES: &[&str] = &["project", "environment"];

const ROUTING_NAMESPACES: &[&str] = &["traefik", "port", "redirect", "security"];
const DOMAIN_NAMESPACES: &[&str] = &["domain", "certificate"];
const SERVER_NAMESPACES: &[&str] = &["server", "docker"];
const APPLICATION_NAMESPACES: &[&str] = &["application", "compose", "deployment"];

const LIST_VERBS: &[&str] = &["list", "search"];
const GET_VERBS: &[&str] = &["get", "one", "info", "status", "logs"];
const CREATE_VERBS: &[&str] = &["create", "add"];
const DEPLOY_VERBS: &[&str] = &["deploy", "redeploy", "start", "restart"];

const NAMESPACE_MATCH: i32 = 8;
const ACTION_MATCH: i32 = 4;
const LOW_RISK_BONUS: i32 = 2;
const APPROVAL_PENALTY: i32 = 2;
const VERB_ALIGNMENT: i32 = 3;
const SCOPE_HINT_BONUS: i32 = 1;

/// Size bounds for a ranked selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingLimits {
    /// Floor applied to non-query intents
    pub min_tools: usize,
    /// Hard cap on the output
    pub max_tools: usize,
}

impl Default for RankingLimits {
    fn default() -> Self {
        Self {
            min_tools: 5,
            max_tools: 20,
        }
    }
}

/// Which scoping ids the caller already has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeHints {
    pub has_project: bool,
    pub has_server: bool,
}

/// Deterministic relevance ranker.
#[derive(Debug, Clone, Default)]
pub struct ToolRanker;

struct Scored<'a> {
    tool: &'a ToolDefinition,
    score: i32,
}

impl ToolRanker {
    pub fn new() -> Self {
        Self
    }

    /// Namespaces admitted for these signals; `None` admits every namespace.
    pub fn admitted_namespaces(&self, signals: &IntentSignals) -> Option<Vec<&'static str>> {
        let primary: Vec<&'static str> = match signals.intent {
            Intent::Query => return None,
            Intent::Database => match signals.engine.as_deref() {
                Some(engine) => DATABASE_NAMESPACES
                    .iter()
                    .copied()
                    .filter(|ns| *ns == engine)
                    .collect(),
                None => DATABASE_NAMESPACES.to_vec(),
            },
            Intent::Routing => ROUTING_NAMESPACES.to_vec(),
            Intent::Domain => DOMAIN_NAMESPACES.to_vec(),
            Intent::Server => SERVER_NAMESPACES.to_vec(),
            Intent::Application => APPLICATION_NAMESPACES.to_vec(),
        };

        let mut admitted = primary;
        admitted.extend_from_slice(ORGANIZATION_NAMESPACES);
        Some(admitted)
    }

    /// Whether destructive actions may be surfaced at all.
    fn admits_destructive(&self, signals: &IntentSignals) -> bool {
        signals.wants_delete && !signals.intent.is_query()
    }

    /// Ambiguous database requests only see low-risk or read-only actions.
    fn narrows_to_read_only(&self, signals: &IntentSignals) -> bool {
        signals.intent == Intent::Database && signals.engine.is_none() && !signals.is_mutating()
    }

    fn is_safe(&self, tool: &ToolDefinition, signals: &IntentSignals) -> bool {
        if tool.is_destructive() && !self.admits_destructive(signals) {
            return false;
        }
        if self.narrows_to_read_only(signals) && !(tool.is_low_risk() || tool.is_read_only()) {
            return false;
        }
        true
    }

    /// Relevance score of one tool for a lowercased request.
    pub fn score(
        &self,
        tool: &ToolDefinition,
        text: &str,
        signals: &IntentSignals,
        hints: ScopeHints,
    ) -> i32 {
        let mut score = 0;
        let action = tool.action();
        let verb = action.split('_').next().unwrap_or_default();

        if text.contains(tool.namespace()) {
            score += NAMESPACE_MATCH;
        }
        if !action.is_empty()
            && (text.contains(action) || text.contains(&action.replace('_', " ")))
        {
            score += ACTION_MATCH;
        }
        if tool.is_low_risk() {
            score += LOW_RISK_BONUS;
        }
        if tool.requires_approval {
            score -= APPROVAL_PENALTY;
        }

        let aligned = (signals.wants_list && LIST_VERBS.contains(&verb))
            || (signals.wants_get && GET_VERBS.contains(&verb))
            || (signals.wants_create && CREATE_VERBS.contains(&verb))
            || (signals.wants_deploy && DEPLOY_VERBS.contains(&verb));
        if aligned {
            score += VERB_ALIGNMENT;
        }
        if signals.wants_delete && tool.is_destructive() {
            score -= VERB_ALIGNMENT;
        }

        let namespace = tool.namespace();
        if hints.has_project && ORGANIZATION_NAMESPACES.contains(&namespace) {
            score += SCOPE_HINT_BONUS;
        }
        if hints.has_server && namespace == "server" {
            score += SCOPE_HINT_BONUS;
        }

        score
    }

    fn sorted<'a>(
        &self,
        tools: impl Iterator<Item = &'a ToolDefinition>,
        text: &str,
        signals: &IntentSignals,
        hints: ScopeHints,
    ) -> Vec<&'a ToolDefinition> {
        let mut scored: Vec<Scored<'a>> = tools
            .map(|tool| Scored {
                tool,
                score: self.score(tool, text, signals, hints),
            })
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.tool.name.cmp(&b.tool.name))
        });
        scored.into_iter().map(|s| s.tool).collect()
    }

    /// Rank `tools` for `text`, returning at most `limits.max_tools` entries.
    pub fn rank<'a>(
        &self,
        text: &str,
        signals: &IntentSignals,
        hints: ScopeHints,
        limits: RankingLimits,
        tools: &[&'a ToolDefinition],
    ) -> Vec<&'a ToolDefinition> {
        let text = text.to_lowercase();
        let admitted = self.admitted_namespaces(signals);

        let candidates = tools.iter().copied().filter(|tool| {
            let namespace_ok = admitted
                .as_ref()
                .is_none_or(|namespaces| namespaces.contains(&tool.namespace()));
            namespace_ok && self.is_safe(tool, signals)
        });
        let mut selected = self.sorted(candidates, &text, signals, hints);

        let floor = if signals.intent.is_query() {
            0
        } else {
            limits.min_tools
        };

        if selected.len() < floor {
            let taken: HashSet<&str> = selected.iter().map(|t| t.name.as_str()).collect();
            let remaining: Vec<&'a ToolDefinition> = tools
                .iter()
                .copied()
                .filter(|t| !taken.contains(t.name.as_str()) && self.is_safe(t, signals))
                .collect();

            let (preferred, rest): (Vec<_>, Vec<_>) = remaining
                .into_iter()
                .partition(|t| t.is_low_risk() && !t.requires_approval);

            for tool in self
                .sorted(preferred.into_iter(), &text, signals, hints)
                .into_iter()
                .chain(self.sorted(rest.into_iter(), &text, signals, hints))
            {
                if selected.len() >= floor {
                    break;
                }
                selected.push(tool);
            }
        }

        let mut seen = HashSet::new();
        selected.retain(|t| seen.insert(t.name.as_str()));
        selected.truncate(limits.max_tools);
        selected
    }
}
