/// 应用服务实现
pub mod sync_service;

pub use sync_service::SyncService;
