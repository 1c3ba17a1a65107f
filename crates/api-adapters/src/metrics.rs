//! Application counters, rendered in OpenMetrics text at `/metrics`.

use prometheus_client::encoding::{text::encode, EncodeLabelSet};
use prometheus_client::metrics::{counter::Counter, family::Family};
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct VoteLabels {
    pub direction: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct LoginLabels {
    pub outcome: String,
}

pub struct Metrics {
    registry: Registry,
    pub posts_created: Counter,
    pub comments_added: Counter,
    pub votes: Family<VoteLabels, Counter>,
    pub registrations: Counter,
    pub logins: Family<LoginLabels, Counter>,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("linkboard");

        let posts_created = Counter::default();
        registry.register("posts_created", "Posts created", posts_created.clone());

        let comments_added = Counter::default();
        registry.register("comments_added", "Comments added to posts", comments_added.clone());

        let votes = Family::<VoteLabels, Counter>::default();
        registry.register("votes", "Votes cast, by direction", votes.clone());

        let registrations = Counter::default();
        registry.register("registrations", "Accounts registered", registrations.clone());

        let logins = Family::<LoginLabels, Counter>::default();
        registry.register("logins", "Login attempts, by outcome", logins.clone());

        Self {
            registry,
            posts_created,
            comments_added,
            votes,
            registrations,
            logins,
        }
    }

    pub fn record_vote(&self, direction: &str) {
        self.votes
            .get_or_create(&VoteLabels {
                direction: direction.to_owned(),
            })
            .inc();
    }

    pub fn record_login(&self, succeeded: bool) {
        let outcome = if succeeded { "success" } else { "failure" };
        self.logins
            .get_or_create(&LoginLabels {
                outcome: outcome.to_owned(),
            })
            .inc();
    }

    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
