//! Order endpoints (`/v2/orders`).

use async_trait::async_trait;
use carebridge_core::{CustomerId, OrderId};
use tracing::instrument;

use super::{BigCommerceClient, BigCommerceError, OrderApi};
use crate::types::{Order, OrderAddress, OrderProduct, Shipment};

impl BigCommerceClient {
    async fn get_order_collection<T: serde::de::DeserializeOwned>(
        &self,
        order_id: OrderId,
        collection: &str,
    ) -> Result<Vec<T>, BigCommerceError> {
        let order_id = order_id.to_string();
        self.get_v2_list(self.endpoint_segments(&["v2", "orders", &order_id, collection])?)
            .await
    }
}

#[async_trait]
impl OrderApi for BigCommerceClient {
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    async fn get_orders(&self, customer_id: CustomerId) -> Result<Vec<Order>, BigCommerceError> {
        let mut url = self.endpoint("/v2/orders")?;
        url.query_pairs_mut()
            .append_pair("customer_id", &customer_id.to_string());

        self.get_v2_list(url).await
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    async fn get_order_by_id(&self, order_id: OrderId) -> Result<Order, BigCommerceError> {
        self.get_v2(self.endpoint(&format!("/v2/orders/{order_id}"))?)
            .await
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    async fn get_order_addresses(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<OrderAddress>, BigCommerceError> {
        self.get_order_collection(order_id, "shipping_addresses")
            .await
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    async fn get_order_shipments(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Shipment>, BigCommerceError> {
        self.get_order_collection(order_id, "shipments").await
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    async fn get_order_products(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<OrderProduct>, BigCommerceError> {
        self.get_order_collection(order_id, "products").await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mockito::Matcher;

    use super::super::client::tests::client_for;
    use super::*;

    #[tokio::test]
    async fn test_orders_for_customer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/stores/store1/v2/orders")
            .match_query(Matcher::UrlEncoded("customer_id".into(), "81".into()))
            .with_status(200)
            .with_body(r#"[{"id":100,"status":"Shipped"},{"id":101,"status":"Pending"}]"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let orders = client.get_orders(CustomerId::new(81)).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0]["status"], "Shipped");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_customer_without_orders() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/stores/store1/v2/orders")
            .match_query(Matcher::Any)
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server);
        assert!(client.get_orders(CustomerId::new(5)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_order_detail_and_children() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/stores/store1/v2/orders/100")
            .with_status(200)
            .with_body(r#"{"id":100,"total_inc_tax":"42.0000"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/stores/store1/v2/orders/100/shipping_addresses")
            .with_status(200)
            .with_body(r#"[{"id":1,"city":"Toronto"}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/stores/store1/v2/orders/100/shipments")
            .with_status(204)
            .create_async()
            .await;
        server
            .mock("GET", "/stores/store1/v2/orders/100/products")
            .with_status(200)
            .with_body(r#"[{"id":9,"name":"Bandages"},{"id":10,"name":"Gauze"}]"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let order_id = OrderId::new(100);
        let order = client.get_order_by_id(order_id).await.unwrap();
        assert_eq!(order["total_inc_tax"], "42.0000");
        assert_eq!(client.get_order_addresses(order_id).await.unwrap().len(), 1);
        assert!(client.get_order_shipments(order_id).await.unwrap().is_empty());
        assert_eq!(client.get_order_products(order_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/stores/store1/v2/orders/404")
            .with_status(404)
            .with_body(r#"[{"status":404,"message":"The requested resource was not found."}]"#)
            .create_async()
            .await;

        let client = client_for(&server);
        assert!(matches!(
            client.get_order_by_id(OrderId::new(404)).await,
            Err(BigCommerceError::NotFound(_))
        ));
    }
}
