//! Order operations of the commerce facade.

use carebridge_core::{OrderId, ProfileId};
use tracing::instrument;

use super::CommerceService;
use crate::error::CommerceError;
use crate::types::{Order, OrderAddress, OrderProduct, Shipment};

impl CommerceService {
    /// All orders placed by the profile's BigCommerce customer.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::MissingCustomerId` if the profile is missing or
    /// not yet linked to a customer, or the BigCommerce error if the call fails.
    #[instrument(skip(self), fields(profile_id = %profile_id))]
    pub async fn get_orders(&self, profile_id: &ProfileId) -> Result<Vec<Order>, CommerceError> {
        let customer_id = self.linked_customer_id(profile_id).await?;
        Ok(self.orders.get_orders(customer_id).await?)
    }

    /// # Errors
    ///
    /// Returns the BigCommerce error if the call fails.
    pub async fn get_order_by_id(&self, order_id: OrderId) -> Result<Order, CommerceError> {
        Ok(self.orders.get_order_by_id(order_id).await?)
    }

    /// # Errors
    ///
    /// Returns the BigCommerce error if the call fails.
    pub async fn get_order_shipping_addresses(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<OrderAddress>, CommerceError> {
        Ok(self.orders.get_order_addresses(order_id).await?)
    }

    /// # Errors
    ///
    /// Returns the BigCommerce error if the call fails.
    pub async fn get_order_shipments(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Shipment>, CommerceError> {
        Ok(self.orders.get_order_shipments(order_id).await?)
    }

    /// # Errors
    ///
    /// Returns the BigCommerce error if the call fails.
    pub async fn get_order_products(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<OrderProduct>, CommerceError> {
        Ok(self.orders.get_order_products(order_id).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use carebridge_core::{CustomerId, Email};
    use serde_json::json;

    use super::super::fakes::{Call, TestHarness};
    use super::*;
    use crate::types::Profile;

    #[tokio::test]
    async fn test_orders_require_linked_customer() {
        let unlinked = Profile::new("p-1".into(), Email::parse("a@example.com").unwrap());
        let harness = TestHarness::with_profiles([unlinked]);
        let service = harness.service();

        assert!(matches!(
            service.get_orders(&"p-1".into()).await,
            Err(CommerceError::MissingCustomerId)
        ));
        assert!(matches!(
            service.get_orders(&"nobody".into()).await,
            Err(CommerceError::MissingCustomerId)
        ));
        assert!(harness.bigcommerce.calls().is_empty());
    }

    #[tokio::test]
    async fn test_orders_for_linked_customer() {
        let mut linked = Profile::new("p-1".into(), Email::parse("a@example.com").unwrap());
        linked.big_commerce_customer_id = Some(CustomerId::new(12));
        let harness = TestHarness::with_profiles([linked]);
        harness
            .bigcommerce
            .add_orders(CustomerId::new(12), vec![json!({ "id": 100 })]);

        let orders = harness.service().get_orders(&"p-1".into()).await.unwrap();
        assert_eq!(orders, vec![json!({ "id": 100 })]);
        assert_eq!(
            harness.bigcommerce.calls(),
            vec![Call::GetOrders(CustomerId::new(12))]
        );
    }

    #[tokio::test]
    async fn test_order_detail_passthrough() {
        let harness = TestHarness::default();
        let service = harness.service();
        let id = OrderId::new(100);

        assert_eq!(service.get_order_by_id(id).await.unwrap()["id"], 100);
        assert_eq!(service.get_order_shipping_addresses(id).await.unwrap().len(), 1);
        assert!(service.get_order_shipments(id).await.unwrap().is_empty());
        assert_eq!(service.get_order_products(id).await.unwrap().len(), 1);
        assert_eq!(
            harness.bigcommerce.calls(),
            vec![
                Call::GetOrder(id),
                Call::GetOrderAddresses(id),
                Call::GetOrderShipments(id),
                Call::GetOrderProducts(id),
            ]
        );
    }
}
