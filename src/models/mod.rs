/// 数据模型模块
///
/// `enums` 与 `structs` 是业务层使用的纯数据结构，
/// `entities` 为对应的SeaORM持久化实体。
pub mod entities;
pub mod enums;
pub mod structs;

pub use enums::{Direction, SignalCategory};
pub use structs::{
    default_id, FbCallParams, FbVariable, FunctionBlock, InterfaceRecord, IoPair, OuterChannel,
    PackedVariable, Signal, SyncIssue, SyncSummary,
};
