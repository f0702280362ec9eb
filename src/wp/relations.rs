//! JetEngine relation endpoint client
//!
//! One relation (accommodation -> review) lives at `{wp-json}/jet-rel/{id}`:
//!
//! - `GET  {endpoint}/children/{parent_id}` lists the children of a parent
//! - `POST {endpoint}` with `{parent_id, child_id, context, store_items_type}`
//!   creates a link

use serde_json::Value;

use crate::config::WordPressConfig;
use crate::error::Result;
use crate::models::{BatchReport, ChildRecord, ContentId, Relation, RelationContext};
use crate::wp::WpClient;

/// Reply of the bare relation endpoint, used as a connectivity check
#[derive(Debug, Clone, PartialEq)]
pub struct PingResponse {
    pub status: u16,
    /// JSON when the body parses, otherwise the raw text
    pub body: Value,
}

impl PingResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Client for a single JetEngine relation
#[derive(Clone)]
pub struct RelationClient {
    wp: WpClient,
    endpoint: String,
}

impl RelationClient {
    /// Create a client for the relation configured in `config`
    pub fn new(config: &WordPressConfig) -> Result<Self> {
        Ok(Self::with_client(
            WpClient::new(config)?,
            config.relation_endpoint(),
        ))
    }

    /// Create a client over an existing transport
    pub fn with_client(wp: WpClient, endpoint: impl Into<String>) -> Self {
        Self {
            wp,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Children of `parent_id`
    pub async fn try_fetch_children(&self, parent_id: ContentId) -> Result<Vec<ChildRecord>> {
        let url = format!("{}/children/{parent_id}", self.endpoint);
        self.wp.get_json(&url, &[]).await
    }

    /// Children of `parent_id`, or `None` after logging the failure
    pub async fn fetch_children(&self, parent_id: ContentId) -> Option<Vec<ChildRecord>> {
        match self.try_fetch_children(parent_id).await {
            Ok(children) => {
                tracing::info!(parent_id = %parent_id, count = children.len(), "Fetched children");
                Some(children)
            }
            Err(e) => {
                tracing::error!(parent_id = %parent_id, error = %e, "Failed to fetch children");
                None
            }
        }
    }

    /// Create one relation
    pub async fn try_create_relation(&self, relation: &Relation) -> Result<()> {
        let status = self
            .wp
            .post_for_status(&self.endpoint, &relation.payload())
            .await?;

        tracing::info!(
            parent_id = %relation.parent_id,
            child_id = %relation.child_id,
            context = %relation.context,
            status,
            "Relation stored"
        );
        Ok(())
    }

    /// Create one relation; `true` iff the endpoint answered 2xx
    pub async fn create_relation(
        &self,
        parent_id: ContentId,
        child_id: ContentId,
        context: RelationContext,
    ) -> bool {
        let relation = Relation::new(parent_id, child_id, context);
        match self.try_create_relation(&relation).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    parent_id = %parent_id,
                    child_id = %child_id,
                    error = %e,
                    "Failed to create relation"
                );
                false
            }
        }
    }

    /// Add new children to a parent (`context = child`), one call each
    ///
    /// Calls are independent: a failure does not stop the remaining ones and
    /// nothing already stored is rolled back.
    pub async fn add_children(&self, parent_id: ContentId, child_ids: &[ContentId]) -> BatchReport {
        let mut report = BatchReport::new(parent_id);

        for &child_id in child_ids {
            let relation = Relation::new(parent_id, child_id, RelationContext::Child);
            let result = self
                .try_create_relation(&relation)
                .await
                .map_err(|e| e.user_message());

            if let Err(msg) = &result {
                tracing::error!(parent_id = %parent_id, child_id = %child_id, error = %msg, "Failed to add child");
            }
            report.push(child_id, result);
        }

        report
    }

    /// Attach an existing child to a parent (`context = parent`)
    pub async fn link_to_parent(&self, child_id: ContentId, parent_id: ContentId) -> Result<()> {
        let relation = Relation::new(parent_id, child_id, RelationContext::Parent);
        self.try_create_relation(&relation).await
    }

    /// GET the bare endpoint and report whatever came back
    pub async fn ping(&self) -> Result<PingResponse> {
        let (status, text) = self.wp.get_raw(&self.endpoint).await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok(PingResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_config() {
        let client = RelationClient::new(&WordPressConfig::default()).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://triptoislands.com/wp-json/jet-rel/12"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let wp = WpClient::new(&WordPressConfig::default()).unwrap();
        let client = RelationClient::with_client(wp, "http://localhost/jet-rel/3/");
        assert_eq!(client.endpoint(), "http://localhost/jet-rel/3");
    }

    #[test]
    fn test_ping_success_range() {
        let ok = PingResponse {
            status: 204,
            body: Value::Null,
        };
        let denied = PingResponse {
            status: 401,
            body: Value::String("rest_forbidden".into()),
        };
        assert!(ok.is_success());
        assert!(!denied.is_success());
    }
}
