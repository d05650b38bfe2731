/// 领域层
///
/// 流水线的纯计算部分：位号分类、槽位绑定、地址解析、
/// 通道打包与各类产物生成，不触碰持久化。
pub mod address_resolver;
pub mod channel_packer;
pub mod emitters;
pub mod slot_binder;
pub mod tag_classifier;

pub use address_resolver::resolve_address;
pub use channel_packer::{pack, PackResult};
pub use slot_binder::{bind, direction_for};
pub use tag_classifier::{classify, TagParts};
