//! Keyword intent classifier.
//!
//! Matches lowercased request text against regex keyword families in English
//! and Russian. When several topic families match, the first in this order
//! wins:
//!
//! | Precedence | Intent | Sample keywords |
//! |------------|--------|-----------------|
//! | 1 | database | database, db, postgres, mongo, база данных |
//! | 2 | routing | traefik, proxy, port, redirect, маршрут |
//! | 3 | domain | domain, dns, ssl, certificate, домен |
//! | 4 | server | server, host, docker, container, сервер |
//! | 5 | application | app, service, compose, deploy, приложение |
//!
//! Nothing matched means [`Intent::Query`]. Verb families (list, get, create,
//! delete, deploy) are detected independently of the topic.

use opsgate_domain::selection::{Intent, IntentClassifier, IntentSignals};
use regex::Regex;

const DATABASE: &str = r"\b(databases?|dbs?|sql|postgres(?:ql)?|pg|mysql|mariadb|mongo(?:db)?|redis|баз[аыеу]?\s+данных|бд|постгрес\w*|монго\w*|редис\w*)\b";
const ROUTING: &str = r"\b(traefik|routing|routes?|reverse\s+proxy|proxy|ports?|redirects?|security\s+headers?|маршрут\w*|прокси|порт\w*|редирект\w*|перенаправлен\w*)\b";
const DOMAIN: &str = r"\b(domains?|dns|hostnames?|certificates?|certs?|ssl|tls|https|домен\w*|сертификат\w*)\b";
const SERVER: &str = r"\b(servers?|hosts?|vps|machines?|docker|containers?|nodes?|сервер\w*|хост\w*|контейнер\w*|докер\w*)\b";
const APPLICATION: &str = r"\b(applications?|apps?|services?|compose|deploy\w*|redeploy\w*|deployments?|builds?|releases?|приложени\w*|сервис\w*|деплой\w*|развер\w*|выкат\w*)\b";

const ENGINE: &str =
    r"\b(postgres(?:ql)?|pg|постгрес\w*|mysql|mariadb|maria|mongo(?:db)?|монго\w*|redis|редис\w*)\b";

const LIST: &str = r"\b(list|show|all|which|what|find|search|enumerate|покажи|показать|список|все|какие|найди|найти)\b";
const GET: &str = r"\b(get|status|info|details?|logs?|describe|inspect|check|статус\w*|инфо\w*|логи?|подробн\w*|провер\w*)\b";
const CREATE: &str = r"\b(create|add|new|make|provision|set\s?up|spin\s+up|созда\w*|добав\w*|нов\w*|заведи)\b";
const DELETE: &str = r"\b(delete|remove|drop|destroy|erase|wipe|purge|tear\s+down|удал\w*|снес\w*|уничтож\w*|дропн\w*)\b";
const DEPLOY: &str = r"\b(deploy\w*|redeploy\w*|release|ship|start|restart|rollout|roll\s+out|деплой\w*|задеплой\w*|развер\w*|перезапус\w*|запуст\w*|рестарт\w*)\b";

/// Regex-based [`IntentClassifier`].
#[derive(Debug, Clone)]
pub struct KeywordIntentClassifier {
    /// Topic families in precedence order
    topics: Vec<(Intent, Regex)>,
    engine: Regex,
    list: Regex,
    get: Regex,
    create: Regex,
    delete: Regex,
    deploy: Regex,
}

impl KeywordIntentClassifier {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            topics: vec![
                (Intent::Database, Regex::new(DATABASE)?),
                (Intent::Routing, Regex::new(ROUTING)?),
                (Intent::Domain, Regex::new(DOMAIN)?),
                (Intent::Server, Regex::new(SERVER)?),
                (Intent::Application, Regex::new(APPLICATION)?),
            ],
            engine: Regex::new(ENGINE)?,
            list: Regex::new(LIST)?,
            get: Regex::new(GET)?,
            create: Regex::new(CREATE)?,
            delete: Regex::new(DELETE)?,
            deploy: Regex::new(DEPLOY)?,
        })
    }

    fn detect_engine(&self, text: &str) -> Option<&'static str> {
        self.engine
            .find_iter(text)
            .find_map(|m| canonical_engine(m.as_str()))
    }
}

/// Map an engine mention to its catalog namespace.
fn canonical_engine(word: &str) -> Option<&'static str> {
    match word {
        w if w.starts_with("postgres") || w == "pg" || w.starts_with("постгрес") => {
            Some("postgres")
        }
        "mysql" => Some("mysql"),
        "mariadb" | "maria" => Some("mariadb"),
        w if w.starts_with("mongo") || w.starts_with("монго") => Some("mongo"),
        w if w == "redis" || w.starts_with("редис") => Some("redis"),
        _ => None,
    }
}

impl IntentClassifier for KeywordIntentClassifier {
    fn classify(&self, text: &str) -> IntentSignals {
        let text = text.to_lowercase();

        let intent = self
            .topics
            .iter()
            .find(|(_, family)| family.is_match(&text))
            .map(|(intent, _)| *intent)
            .unwrap_or(Intent::Query);

        let mut signals = IntentSignals::new(intent);
        if intent == Intent::Database
            && let Some(engine) = self.detect_engine(&text)
        {
            signals = signals.with_engine(engine);
        }
        signals.wants_list = self.list.is_match(&text);
        signals.wants_get = self.get.is_match(&text);
        signals.wants_create = self.create.is_match(&text);
        signals.wants_delete = self.delete.is_match(&text);
        signals.wants_deploy = self.deploy.is_match(&text);
        signals
    }
}
