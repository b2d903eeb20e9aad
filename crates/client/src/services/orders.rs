//! Order history.

use shopwise_core::Order;
use shopwise_core::order::sort_newest_first;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::state::ClientState;

/// Order history for the logged-in user.
#[derive(Debug, Clone)]
pub struct Orders {
    state: ClientState,
}

impl Orders {
    #[must_use]
    pub const fn new(state: ClientState) -> Self {
        Self { state }
    }

    /// Fetch every order, newest first. No orders is an empty `Vec`.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, or the gateway error.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Order>> {
        let credential = self
            .state
            .require_credential("Please log in to view your orders.")?;
        let result = self.state.gateway().get_orders(&credential).await;
        let mut orders = self.state.guard(result)?;
        sort_newest_first(&mut orders);
        debug!(count = orders.len(), "Fetched orders");
        Ok(orders)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use shopwise_core::{OrderId, Price};

    use super::*;
    use crate::error::ClientError;
    use crate::testing::TestClient;

    fn order(id: &str, day: u32) -> Order {
        Order {
            id: OrderId::new(id),
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            total: Price::from_cents(1000),
            items: Vec::new(),
            shipping_info: None,
        }
    }

    #[tokio::test]
    async fn test_orders_require_session() {
        let client = TestClient::new();
        let err = Orders::new(client.state.clone()).list().await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated(_)));
    }

    #[tokio::test]
    async fn test_orders_sorted_newest_first() {
        let client = TestClient::new();
        client.login().await;
        client
            .gateway
            .set_orders(vec![order("a", 1), order("c", 20), order("b", 9)]);

        let ids: Vec<String> = Orders::new(client.state.clone())
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id.into_inner())
            .collect();

        assert_eq!(ids, ["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_no_orders_is_empty() {
        let client = TestClient::new();
        client.login().await;
        let orders = Orders::new(client.state.clone()).list().await.unwrap();
        assert!(orders.is_empty());
    }
}
