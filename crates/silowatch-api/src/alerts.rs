// Alert endpoints
//
// Listing, single reads and the two lifecycle mutations (acknowledge,
// resolve) plus hard delete.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::client::BackendClient;
use crate::error::Error;
use crate::models::{AlertRecord, Decoded, ListResponse, TransitionBody};

impl BackendClient {
    /// List all alerts, newest first. Each element is decoded on its own.
    ///
    /// `GET v1/alerts?orderBy=createdAt&direction=desc`
    pub async fn list_alerts(&self) -> Result<Vec<Decoded<AlertRecord>>, Error> {
        let url = self.url(&["v1", "alerts"])?;
        debug!("listing alerts");
        let page: ListResponse = self
            .get_with_params(
                url,
                &[
                    ("orderBy", "createdAt".to_owned()),
                    ("direction", "desc".to_owned()),
                ],
            )
            .await?;
        Ok(page.decode_each())
    }

    /// Fetch a single alert.
    ///
    /// `GET v1/alerts/{id}`
    pub async fn get_alert(&self, id: &str) -> Result<AlertRecord, Error> {
        let url = self.url(&["v1", "alerts", id])?;
        debug!(id, "fetching alert");
        self.get(url).await
    }

    /// Mark an alert acknowledged.
    ///
    /// `POST v1/alerts/{id}/acknowledge` with `{"actor": ..., "at": ...}`
    pub async fn acknowledge_alert(
        &self,
        id: &str,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<AlertRecord, Error> {
        let url = self.url(&["v1", "alerts", id, "acknowledge"])?;
        debug!(id, actor, "acknowledging alert");
        self.post(url, &TransitionBody { actor, at }).await
    }

    /// Mark an alert resolved.
    ///
    /// `POST v1/alerts/{id}/resolve` with `{"actor": ..., "at": ...}`
    pub async fn resolve_alert(
        &self,
        id: &str,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<AlertRecord, Error> {
        let url = self.url(&["v1", "alerts", id, "resolve"])?;
        debug!(id, actor, "resolving alert");
        self.post(url, &TransitionBody { actor, at }).await
    }

    /// Permanently delete an alert.
    ///
    /// `DELETE v1/alerts/{id}`
    pub async fn delete_alert(&self, id: &str) -> Result<(), Error> {
        let url = self.url(&["v1", "alerts", id])?;
        debug!(id, "deleting alert");
        self.delete(url).await
    }
}
