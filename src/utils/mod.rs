/// 通用工具模块
///
/// 包含统一错误类型与流水线配置结构
pub mod config;
pub mod error;

pub use config::{DeclarationStyle, FbTypeConfig, GenConfig, OmxConfig, OpcConfig, OpcItemTemplate};
pub use error::{AppError, AppResult};
