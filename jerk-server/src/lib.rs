//! JERK Tracker Server - 餐厅取餐追踪后端
//!
//! # 架构概述
//!
//! 餐厅员工创建订单并生成二维码，司机扫码后签到取餐，餐厅确认送达。
//!
//! - **订单** (`orders`): 状态机 `pending → picked_up → delivered`，创建时做位置校验
//! - **位置** (`location`): 门店半径校验 (haversine)、配送区域
//! - **存储** (`store`): 本地 redb + 可选远端文档存储，远端失败时排队重放
//! - **HTTP API** (`api`): RESTful JSON 接口
//!
//! # 模块结构
//!
//! ```text
//! jerk-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── api/           # HTTP 路由和处理器
//! ├── orders/        # 订单生命周期、二维码、CSV 导出
//! ├── location/      # 门店、配送区域、位置校验
//! ├── catalog/       # 菜品目录
//! ├── settings/      # 用户设置
//! ├── store/         # 持久化门面与同步
//! └── utils/         # 日志、校验
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod location;
pub mod orders;
pub mod settings;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState, build_app};
pub use orders::OrdersManager;
pub use store::DataStore;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
     _ _____ ____  _  __
    | | ____|  _ \| |/ /
 _  | |  _| | |_) | ' /
| |_| | |___|  _ <| . \
 \___/|_____|_| \_\_|\_\
      pickup tracker
    "#
    );
}
