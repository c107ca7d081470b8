//! OrdersManager - 订单生命周期
//!
//! # 职责
//!
//! - 创建订单 (位置校验 + 菜品解析 + 订单号去重)
//! - 司机签到 (`pending → picked_up`) 与确认送达 (`picked_up → delivered`)
//! - 批量归档 / 删除
//! - 超时自动送达
//!
//! # 并发
//!
//! 所有写操作经过同一把 `tokio::sync::Mutex`，读-校验-写 在锁内完成，
//! 两个并发签到只会有一个成功，另一个得到状态转换错误。

use shared::models::{
    CheckInRequest, DriverCompany, LocationSnapshot, Order, OrderCreate, OrderItem, OrderQuery,
    OrderStats, OrderStatus, OrderWithQr, VerificationResult,
};
use shared::error::AppError;
use shared::util::{new_id, now_millis};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use validator::Validate;

use super::error::{ManagerError, ManagerResult};
use super::qr::order_url;
use crate::catalog::CatalogService;
use crate::location::LocationVerifier;
use crate::store::{Collection, DataStore};
use crate::utils::validation::{MAX_NAME_LEN, MAX_ORDER_NUMBER_LEN, validate_required_text};

pub const LOCATION_REQUIRED_MESSAGE: &str = "Device location is required to create an order";

/// A lifecycle step requested on an order
#[derive(Debug, Clone, PartialEq)]
pub enum OrderAction {
    CheckIn {
        driver_name: String,
        driver_company: DriverCompany,
    },
    Deliver,
}

impl OrderAction {
    pub fn target(&self) -> OrderStatus {
        match self {
            OrderAction::CheckIn { .. } => OrderStatus::PickedUp,
            OrderAction::Deliver => OrderStatus::Delivered,
        }
    }

    /// Validate a driver check-in form
    pub fn check_in(req: &CheckInRequest) -> ManagerResult<Self> {
        let driver_name = req.driver_name.trim();
        if driver_name.is_empty() {
            return Err(ManagerError::DriverNameRequired);
        }
        validate_required_text(driver_name, "driverName", MAX_NAME_LEN)?;
        let raw_company = req.driver_company.as_deref().unwrap_or_default().trim();
        let driver_company = DriverCompany::parse(raw_company)
            .ok_or_else(|| ManagerError::DriverCompanyInvalid(raw_company.to_string()))?;
        Ok(OrderAction::CheckIn {
            driver_name: driver_name.to_string(),
            driver_company,
        })
    }
}

/// Apply `action` to `order` in place
///
/// The order is left untouched when the step is not allowed.
pub fn apply_action(order: &mut Order, action: OrderAction, now: i64) -> ManagerResult<()> {
    if order.archived {
        return Err(ManagerError::OrderArchived(order.id.clone()));
    }
    let target = action.target();
    if !order.status.can_transition_to(target) {
        return Err(ManagerError::InvalidTransition {
            from: order.status,
            to: target,
        });
    }

    match action {
        OrderAction::CheckIn {
            driver_name,
            driver_company,
        } => {
            order.driver_name = Some(driver_name);
            order.driver_company = Some(driver_company);
            order.picked_up_at = Some(now);
        }
        OrderAction::Deliver => {
            order.delivered_at = Some(now);
        }
    }
    order.status = target;
    order.updated_at = now;
    Ok(())
}

/// `2x Jerk Chicken, 1x Rice and Peas`, free text on the next line
pub fn render_details(items: &[OrderItem], free_text: &str) -> String {
    let lines = items
        .iter()
        .map(|i| format!("{}x {}", i.quantity, i.name))
        .collect::<Vec<_>>()
        .join(", ");
    match (lines.is_empty(), free_text.is_empty()) {
        (true, _) => free_text.to_string(),
        (false, true) => lines,
        (false, false) => format!("{lines}\n{free_text}"),
    }
}

/// Newest first, order number as tie-breaker
fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.order_number.cmp(&b.order_number))
    });
}

#[derive(Debug, Clone)]
pub struct OrdersManager {
    store: DataStore,
    catalog: CatalogService,
    verifier: LocationVerifier,
    write_lock: Arc<Mutex<()>>,
    location_verification: bool,
    public_origin: String,
}

impl OrdersManager {
    pub fn new(
        store: DataStore,
        catalog: CatalogService,
        verifier: LocationVerifier,
        location_verification: bool,
        public_origin: impl Into<String>,
    ) -> Self {
        Self {
            store,
            catalog,
            verifier,
            write_lock: Arc::new(Mutex::new(())),
            location_verification,
            public_origin: public_origin.into(),
        }
    }

    pub fn location_verification_enabled(&self) -> bool {
        self.location_verification
    }

    /// QR link for an order
    pub fn qr_url(&self, order_id: &str) -> ManagerResult<String> {
        Ok(order_url(&self.public_origin, order_id)?)
    }

    async fn all_orders(&self) -> ManagerResult<Vec<Order>> {
        Ok(self.store.list(Collection::Orders).await?)
    }

    async fn load(&self, id: &str) -> ManagerResult<Order> {
        self.store
            .get::<Order>(Collection::Orders, id)
            .await?
            .ok_or_else(|| ManagerError::OrderNotFound(id.to_string()))
    }

    async fn save(&self, order: &Order) -> ManagerResult<()> {
        self.store.put(Collection::Orders, &order.id, order).await?;
        Ok(())
    }

    // ========== Queries ==========

    pub async fn get(&self, id: &str) -> ManagerResult<Order> {
        self.load(id).await
    }

    pub async fn list(&self, query: &OrderQuery) -> ManagerResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .all_orders()
            .await?
            .into_iter()
            .filter(|o| query.matches(o))
            .collect();
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    /// Status counters over non-archived orders, plus the archived count
    pub async fn stats(&self) -> ManagerResult<OrderStats> {
        let mut stats = OrderStats::default();
        for order in self.all_orders().await? {
            if order.archived {
                stats.archived += 1;
                continue;
            }
            stats.total += 1;
            match order.status {
                OrderStatus::Pending => stats.pending += 1,
                OrderStatus::PickedUp => stats.picked_up += 1,
                OrderStatus::Delivered => stats.delivered += 1,
            }
        }
        Ok(stats)
    }

    // ========== Creation ==========

    async fn verify_location(&self, req: &OrderCreate) -> ManagerResult<Option<VerificationResult>> {
        if !self.location_verification {
            return Ok(None);
        }
        let Some(position) = req.location else {
            return Err(ManagerError::VerificationFailed(VerificationResult {
                is_valid: false,
                distance_meters: None,
                location_id: None,
                location_name: None,
                delivery_zone_id: None,
                message: LOCATION_REQUIRED_MESSAGE.to_string(),
            }));
        };

        let result = self.verifier.verify(&position).await?;
        if !result.is_valid {
            tracing::warn!(
                order_number = %req.order_number,
                distance_meters = ?result.distance_meters,
                "Order rejected by location verification"
            );
            return Err(ManagerError::VerificationFailed(result));
        }
        Ok(Some(result))
    }

    async fn resolve_items(&self, req: &OrderCreate) -> ManagerResult<Vec<OrderItem>> {
        let mut items = Vec::with_capacity(req.items.len());
        for input in &req.items {
            let food = self
                .catalog
                .get(&input.food_item_id)
                .await?
                .ok_or_else(|| ManagerError::FoodItemNotFound(input.food_item_id.clone()))?;
            if !food.available {
                return Err(ManagerError::FoodItemUnavailable(food.id));
            }
            items.push(OrderItem {
                food_item_id: food.id,
                name: food.name,
                quantity: input.quantity,
            });
        }
        Ok(items)
    }

    /// Create an order from the order form
    ///
    /// Nothing is stored when any check fails.
    pub async fn create_order(&self, req: OrderCreate) -> ManagerResult<OrderWithQr> {
        req.validate().map_err(AppError::from)?;

        let order_number = req.order_number.trim().to_string();
        let customer_name = req.customer_name.trim().to_string();
        validate_required_text(&order_number, "orderNumber", MAX_ORDER_NUMBER_LEN)?;
        validate_required_text(&customer_name, "customerName", MAX_NAME_LEN)?;
        let free_text = req.order_details.as_deref().unwrap_or_default().trim().to_string();
        if req.items.is_empty() && free_text.is_empty() {
            return Err(ManagerError::OrderDetailsRequired);
        }

        let _guard = self.write_lock.lock().await;

        if self
            .all_orders()
            .await?
            .iter()
            .any(|o| o.order_number == order_number)
        {
            return Err(ManagerError::OrderNumberExists(order_number));
        }

        let verification = self.verify_location(&req).await?;
        let items = self.resolve_items(&req).await?;

        let now = now_millis();
        let location = match (verification, req.location) {
            (Some(result), Some(position)) => {
                Some(LocationSnapshot::from_result(&position, &result, now))
            }
            _ => None,
        };

        let order = Order {
            id: new_id(),
            order_number,
            customer_name,
            customer_email: req.customer_email.trim().to_string(),
            order_details: render_details(&items, &free_text),
            items,
            status: OrderStatus::Pending,
            created_at: now,
            driver_name: None,
            driver_company: None,
            picked_up_at: None,
            delivered_at: None,
            location,
            archived: false,
            updated_at: now,
        };
        self.save(&order).await?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            "Order created"
        );

        let qr_url = self.qr_url(&order.id)?;
        Ok(OrderWithQr { order, qr_url })
    }

    // ========== Lifecycle ==========

    async fn transition(&self, id: &str, action: OrderAction) -> ManagerResult<Order> {
        let _guard = self.write_lock.lock().await;
        let mut order = self.load(id).await?;
        let from = order.status;
        apply_action(&mut order, action, now_millis())?;
        self.save(&order).await?;
        tracing::info!(order_id = %id, from = %from, to = %order.status, "Order status changed");
        Ok(order)
    }

    /// Driver check-in (`pending → picked_up`)
    pub async fn check_in(&self, id: &str, req: &CheckInRequest) -> ManagerResult<Order> {
        let action = OrderAction::check_in(req)?;
        self.transition(id, action).await
    }

    /// Delivery confirmation (`picked_up → delivered`)
    pub async fn deliver(&self, id: &str) -> ManagerResult<Order> {
        self.transition(id, OrderAction::Deliver).await
    }

    /// Mark picked-up orders older than `after` as delivered
    ///
    /// Returns the number of orders completed.
    pub async fn auto_complete(&self, now: i64, after: Duration) -> ManagerResult<usize> {
        let threshold = now.saturating_sub(i64::try_from(after.as_millis()).unwrap_or(i64::MAX));
        let _guard = self.write_lock.lock().await;

        let mut completed = 0;
        for mut order in self.all_orders().await? {
            let due = !order.archived
                && order.status == OrderStatus::PickedUp
                && order.picked_up_at.is_some_and(|t| t <= threshold);
            if !due {
                continue;
            }
            apply_action(&mut order, OrderAction::Deliver, now)?;
            self.save(&order).await?;
            tracing::info!(order_id = %order.id, "Order auto-completed");
            completed += 1;
        }
        Ok(completed)
    }

    // ========== Bulk ==========

    /// Hide orders from the default list; unknown or already archived ids are skipped
    pub async fn archive_many(&self, ids: &[String]) -> ManagerResult<usize> {
        let _guard = self.write_lock.lock().await;
        let now = now_millis();
        let mut affected = 0;
        for id in ids {
            let Some(mut order) = self.store.get::<Order>(Collection::Orders, id).await? else {
                continue;
            };
            if order.archived {
                continue;
            }
            order.archived = true;
            order.updated_at = now;
            self.save(&order).await?;
            affected += 1;
        }
        tracing::info!(requested = ids.len(), affected, "Orders archived");
        Ok(affected)
    }

    /// Remove orders permanently; unknown ids are skipped
    pub async fn delete_many(&self, ids: &[String]) -> ManagerResult<usize> {
        let _guard = self.write_lock.lock().await;
        let mut affected = 0;
        for id in ids {
            if self.store.delete(Collection::Orders, id).await? {
                affected += 1;
            }
        }
        tracing::info!(requested = ids.len(), affected, "Orders deleted");
        Ok(affected)
    }
}
