/// 应用层
///
/// 编排领域组件与持久化的服务集合。
pub mod services;

pub use services::SyncService;
