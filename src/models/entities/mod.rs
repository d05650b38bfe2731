/// SeaORM实体模块
///
/// 功能块与其变量的持久化定义，表结构在仓储启动时
/// 通过 `Schema::create_table_from_entity` 创建。
pub mod fb_variable;
pub mod function_block;
