//! 订单模块
//!
//! - [`OrdersManager`] - 创建、签到、送达、归档
//! - [`AutoCompleteWorker`] - 超时自动送达
//! - [`qr`] - 订单页链接
//! - [`export`] - CSV 导出

pub mod auto_complete;
pub mod error;
pub mod export;
pub mod manager;
pub mod qr;

pub use auto_complete::AutoCompleteWorker;
pub use error::{ManagerError, ManagerResult};
pub use manager::{OrderAction, OrdersManager, apply_action};
