//! API 路由模块
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单 (创建、签到、送达、导出、批量操作)
//! - [`locations`] - 门店与位置校验
//! - [`delivery_zones`] - 配送区域
//! - [`food_items`] - 菜品目录
//! - [`settings`] - 用户设置

pub mod delivery_zones;
pub mod food_items;
pub mod health;
pub mod locations;
pub mod orders;
pub mod settings;

pub use crate::utils::{AppError, AppResult};
