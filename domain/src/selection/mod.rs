//! Tool selection domain module
//!
//! Narrows a large catalog to the handful of tools relevant to one request.
//!
//! ```text
//! text ──▶ IntentClassifier ──▶ IntentSignals ──▶ ToolRanker ──▶ ranked tools
//! ```
//!
//! | Intent | Admitted namespaces |
//! |--------|---------------------|
//! | database | postgres, mysql, mariadb, mongo, redis |
//! | routing | traefik, port, redirect, security |
//! | domain | domain, certificate |
//! | server | server, docker |
//! | application | application, compose, deployment |
//! | query | all |
//!
//! Every non-query intent also admits `project` and `environment`.

pub mod intent;
pub mod ranker;

pub use intent::{Intent, IntentClassifier, IntentSignals, QueryOnlyClassifier};
pub use ranker::{
    DATABASE_NAMESPACES, ORGANIZATION_NAMESPACES, RankingLimits, ScopeHints, ToolRanker,
};
