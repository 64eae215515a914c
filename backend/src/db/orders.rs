//! Order operations.

use super::repository::{new_id, now, optional, required};
use super::Repository;
use crate::errors::AppError;
use crate::models::{
    CreateOrderRequest, Order, OrderStatus, UpdateOrderRequest, MAX_ORDER_QUANTITY,
};

fn check_quantity(quantity: u32) -> Result<(), AppError> {
    if quantity == 0 || quantity > MAX_ORDER_QUANTITY {
        return Err(AppError::Validation(format!(
            "Quantity must be between 1 and {}",
            MAX_ORDER_QUANTITY
        )));
    }
    Ok(())
}

impl Repository {
    /// List orders, newest first, optionally restricted to one status.
    pub async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, AppError> {
        let mut orders: Vec<Order> = self
            .orders
            .load()
            .await?
            .into_iter()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    pub async fn get_order(&self, id: &str) -> Result<Option<Order>, AppError> {
        let orders = self.orders.load().await?;
        Ok(orders.into_iter().find(|o| o.id == id))
    }

    /// Place an order. When the product tracks stock for the size, stock is
    /// checked and decremented in the same locked cycle.
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, AppError> {
        let name = required(&request.name, "Name")?;
        let email = required(&request.email, "Email")?;
        let color = required(&request.color, "Color")?;
        check_quantity(request.quantity)?;

        let mut products = self.products.lock().await?;
        let mut product_name = None;
        let mut stock_changed = false;

        if let Some(product_id) = &request.product_id {
            let product = products
                .iter_mut()
                .find(|p| &p.id == product_id)
                .ok_or_else(|| AppError::Validation(format!("Unknown product {}", product_id)))?;

            if !product.active {
                return Err(AppError::Validation(format!(
                    "{} is no longer available",
                    product.name
                )));
            }

            if let Some(available) = product.stock.get_mut(&request.size) {
                if *available < request.quantity {
                    return Err(AppError::Validation(format!(
                        "Only {} left of {} in size {}",
                        available,
                        product.name,
                        request.size.as_str()
                    )));
                }
                *available -= request.quantity;
                product.updated_at = now();
                stock_changed = true;
            }
            product_name = Some(product.name.clone());
        }

        let now = now();
        let order = Order {
            id: new_id(),
            name,
            email,
            phone: optional(request.phone.as_ref()),
            product_id: request.product_id.clone(),
            product_name,
            color,
            size: request.size,
            quantity: request.quantity,
            is_crew: request.is_crew,
            status: OrderStatus::Nieuw,
            notes: optional(request.notes.as_ref()),
            created_at: now.clone(),
            updated_at: now,
        };

        let mut orders = self.orders.lock().await?;
        orders.push(order.clone());
        if stock_changed {
            products.commit().await?;
        }
        orders.commit().await?;

        tracing::info!(
            "Created order {} ({} x {} {})",
            order.id,
            order.quantity,
            order.color,
            order.size.as_str()
        );
        Ok(order)
    }

    pub async fn update_order(&self, id: &str, request: &UpdateOrderRequest) -> Result<Order, AppError> {
        let mut orders = self.orders.lock().await?;
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;

        if let Some(quantity) = request.quantity {
            check_quantity(quantity)?;
            order.quantity = quantity;
        }
        if let Some(color) = &request.color {
            order.color = required(color, "Color")?;
        }
        if let Some(size) = request.size {
            order.size = size;
        }
        if let Some(status) = request.status {
            order.status = status;
        }
        if let Some(is_crew) = request.is_crew {
            order.is_crew = is_crew;
        }
        if request.notes.is_some() {
            order.notes = optional(request.notes.as_ref());
        }
        order.updated_at = now();

        let updated = order.clone();
        orders.commit().await?;

        tracing::info!("Updated order {} (status {})", updated.id, updated.status.as_str());
        Ok(updated)
    }

    pub async fn delete_order(&self, id: &str) -> Result<(), AppError> {
        let mut orders = self.orders.lock().await?;
        let before = orders.len();
        orders.retain(|o| o.id != id);
        if orders.len() == before {
            return Err(AppError::NotFound(format!("Order {} not found", id)));
        }
        orders.commit().await?;

        tracing::info!("Deleted order {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::{CreateProductRequest, Size};
    use tempfile::TempDir;

    fn order_request(product_id: Option<String>, size: Size, quantity: u32) -> CreateOrderRequest {
        CreateOrderRequest {
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            phone: None,
            product_id,
            color: "black".to_string(),
            size,
            quantity,
            is_crew: false,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_order_decrements_tracked_stock() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);
        let product = repo
            .create_product(&CreateProductRequest {
                name: "Club Hoodie".to_string(),
                slug: None,
                description: None,
                price: 4500,
                category_id: None,
                images: vec![],
                colors: vec!["black".to_string()],
                stock: BTreeMap::from([(Size::L, 3)]),
                active: true,
            })
            .await
            .unwrap();

        let order = repo
            .create_order(&order_request(Some(product.id.clone()), Size::L, 2))
            .await
            .unwrap();
        assert_eq!(order.product_name.as_deref(), Some("Club Hoodie"));
        assert_eq!(order.status, OrderStatus::Nieuw);

        let too_many = repo
            .create_order(&order_request(Some(product.id.clone()), Size::L, 2))
            .await;
        assert!(matches!(too_many, Err(AppError::Validation(_))));

        // untracked size
        repo.create_order(&order_request(Some(product.id.clone()), Size::XXL, 5))
            .await
            .unwrap();

        let product = repo.get_product(&product.id).await.unwrap().unwrap();
        assert_eq!(product.stock.get(&Size::L), Some(&1));
        assert_eq!(repo.list_orders(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_order_write_keeps_stock_reserved() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);
        let product = repo
            .create_product(&CreateProductRequest {
                name: "Club Tee".to_string(),
                slug: None,
                description: None,
                price: 2000,
                category_id: None,
                images: vec![],
                colors: vec![],
                stock: BTreeMap::from([(Size::M, 1)]),
                active: true,
            })
            .await
            .unwrap();

        std::fs::create_dir(dir.path().join("orders.json.tmp")).unwrap();

        let result = repo
            .create_order(&order_request(Some(product.id.clone()), Size::M, 1))
            .await;
        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(repo.list_orders(None).await.unwrap().is_empty());

        let product = repo.get_product(&product.id).await.unwrap().unwrap();
        assert_eq!(product.stock.get(&Size::M), Some(&0));
    }

    #[tokio::test]
    async fn test_status_filter_and_update() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);
        let first = repo
            .create_order(&order_request(None, Size::M, 1))
            .await
            .unwrap();
        repo.create_order(&order_request(None, Size::S, 1))
            .await
            .unwrap();

        repo.update_order(
            &first.id,
            &UpdateOrderRequest {
                status: Some(OrderStatus::Betaald),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let paid = repo.list_orders(Some(OrderStatus::Betaald)).await.unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].id, first.id);
        assert_eq!(
            repo.list_orders(Some(OrderStatus::Nieuw)).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);
        let result = repo.create_order(&order_request(None, Size::M, 0)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_oversized_quantity_rejected() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::new(dir.path(), 4);

        let result = repo
            .create_order(&order_request(None, Size::M, MAX_ORDER_QUANTITY + 1))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(repo.list_orders(None).await.unwrap().is_empty());

        let order = repo
            .create_order(&order_request(None, Size::M, MAX_ORDER_QUANTITY))
            .await
            .unwrap();
        let result = repo
            .update_order(
                &order.id,
                &UpdateOrderRequest {
                    quantity: Some(3_000_000_000),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(
            repo.get_order(&order.id).await.unwrap().unwrap().quantity,
            MAX_ORDER_QUANTITY
        );
    }
}
