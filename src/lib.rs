//! 信号分类与功能块代码生成流水线
//!
//! 从I/O信号清单出发：按命名约定分类信号、绑定功能块槽位、
//! 解析物理地址、打包批量通信块，并生成ST声明/调用、工程
//! 导出XML与中间件绑定XML。

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod models;
pub mod utils;

pub use application::SyncService;
pub use infrastructure::FunctionBlockRepository;
pub use utils::config::GenConfig;
pub use utils::error::{AppError, AppResult};
