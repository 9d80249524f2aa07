use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::{
    admin::{AdminClient, AdminOptions, NewTopic, TopicReplication},
    client::DefaultClientContext,
    config::ClientConfig,
    producer::{FutureProducer, FutureRecord},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{AccountEvent, ACCOUNT_EVENT_TYPES};

#[derive(Debug, Clone, Deserialize)]
pub struct KafkaConfig {
    /// With `enabled: false` no producer is created and publishes become
    /// logged no-ops, so the service runs without a broker.
    pub enabled: bool,
    pub bootstrap_servers: String,
    /// Groups all account event topics, e.g. `account.account_created`.
    pub topic_prefix: String,
    pub producer_acks: i16,
    pub producer_retries: i32,
    pub publish_timeout_ms: u64,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bootstrap_servers: "localhost:9092".to_string(),
            topic_prefix: "account".to_string(),
            producer_acks: 1,
            producer_retries: 3,
            publish_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("unknown account event '{0}'")]
    UnknownEvent(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
}

/// Fire-and-forget announcement of account domain events. Callers log
/// failures; they never propagate to the request that triggered the event.
#[async_trait]
pub trait AccountEventPublisherTrait: Send + Sync {
    async fn publish(&self, event: &AccountEvent) -> Result<(), PublishError>;
}

/// Kafka-backed publisher. Every event name maps to a topic fixed at
/// construction; publishing anything outside that map fails with
/// `UnknownEvent`, which never happens for the three declared names.
pub struct KafkaEventPublisher {
    producer: Option<FutureProducer>,
    topics: HashMap<&'static str, String>,
    config: KafkaConfig,
}

impl KafkaEventPublisher {
    pub fn new(config: KafkaConfig) -> Result<Self, PublishError> {
        let producer = if config.enabled {
            let producer: FutureProducer = ClientConfig::new()
                .set("bootstrap.servers", &config.bootstrap_servers)
                .set("acks", config.producer_acks.to_string())
                .set("retries", config.producer_retries.to_string())
                .create()?;
            Some(producer)
        } else {
            None
        };

        let topics = ACCOUNT_EVENT_TYPES
            .iter()
            .map(|event| (*event, format!("{}.{}", config.topic_prefix, event)))
            .collect();

        Ok(Self {
            producer,
            topics,
            config,
        })
    }

    /// Creates the destination topic for every declared event name. Runs
    /// once at startup, before any publish is attempted.
    pub async fn declare_topics(&self) -> Result<(), PublishError> {
        if !self.config.enabled {
            debug!("kafka disabled, skipping topic declaration");
            return Ok(());
        }

        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.config.bootstrap_servers)
            .create()?;

        let topics: Vec<NewTopic> = self
            .topics
            .values()
            .map(|topic| NewTopic::new(topic, 1, TopicReplication::Fixed(1)))
            .collect();

        let results = admin_client
            .create_topics(&topics, &AdminOptions::new())
            .await?;

        for result in results {
            match result {
                Ok(topic) => info!(topic = %topic, "declared account event topic"),
                // Re-declaring an existing topic on restart is expected.
                Err((topic, code)) => debug!(topic = %topic, code = ?code, "topic not created"),
            }
        }

        Ok(())
    }
}

#[async_trait]
impl AccountEventPublisherTrait for KafkaEventPublisher {
    async fn publish(&self, event: &AccountEvent) -> Result<(), PublishError> {
        let topic = self
            .topics
            .get(event.event_type())
            .ok_or_else(|| PublishError::UnknownEvent(event.event_type().to_string()))?;

        let Some(producer) = &self.producer else {
            debug!(event = event.event_type(), "kafka disabled, dropping event");
            return Ok(());
        };

        let key = event.account_id().to_string();
        let payload = serde_json::to_string(&event.account_id())?;

        producer
            .send(
                FutureRecord::to(topic).key(&key).payload(&payload),
                Duration::from_millis(self.config.publish_timeout_ms),
            )
            .await
            .map_err(|(e, _)| PublishError::Kafka(e))?;

        debug!(event = event.event_type(), account_id = %key, "published account event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn disabled_publisher() -> KafkaEventPublisher {
        KafkaEventPublisher::new(KafkaConfig {
            enabled: false,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn every_declared_event_maps_to_a_prefixed_topic() {
        let publisher = disabled_publisher();
        for event in ACCOUNT_EVENT_TYPES {
            assert_eq!(
                publisher.topics.get(event),
                Some(&format!("account.{event}"))
            );
        }
    }

    #[tokio::test]
    async fn publishing_an_undeclared_event_fails() {
        let mut publisher = disabled_publisher();
        publisher.topics.remove("account_deleted");

        let err = publisher
            .publish(&AccountEvent::AccountDeleted {
                account_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::UnknownEvent(name) if name == "account_deleted"));
    }

    #[tokio::test]
    async fn disabled_publisher_accepts_all_declared_events() {
        let publisher = disabled_publisher();
        let account_id = Uuid::new_v4();

        for event in [
            AccountEvent::AccountCreated { account_id },
            AccountEvent::AccountModified { account_id },
            AccountEvent::AccountDeleted { account_id },
        ] {
            publisher.publish(&event).await.unwrap();
        }
    }
}
