// 功能块变量实体的SeaORM定义
// (fb_id, signal_tag) 的唯一性由仓储的查找后更新逻辑保证

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

use crate::models::enums::Direction;
use crate::models::structs::{default_id, FbVariable};

/// 功能块变量实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fb_variables")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(default = "default_id")]
    pub id: String,

    /// 所属功能块主键
    pub fb_id: String,
    /// 方向："input" 或 "output"
    pub direction: String,
    /// 绑定信号的位号
    pub signal_tag: String,
    /// 位号末段的功能属性
    pub func_attr: String,
    /// 信号数据类型（引用表达式前缀）
    pub cds_type: String,
    pub address: String,

    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::function_block::Entity",
        from = "Column::FbId",
        to = "super::function_block::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    FunctionBlock,
}

impl Related<super::function_block::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FunctionBlock.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&FbVariable> for ActiveModel {
    fn from(var: &FbVariable) -> Self {
        let now = Utc::now();
        Self {
            id: Set(var.id.clone()),
            fb_id: Set(var.fb_id.clone()),
            direction: Set(var.direction.to_string()),
            signal_tag: Set(var.signal_tag.clone()),
            func_attr: Set(var.func_attr.clone()),
            cds_type: Set(var.cds_type.clone()),
            address: Set(var.address.clone()),
            created_time: Set(now),
            updated_time: Set(now),
        }
    }
}

impl From<&Model> for FbVariable {
    fn from(model: &Model) -> Self {
        FbVariable {
            id: model.id.clone(),
            fb_id: model.fb_id.clone(),
            // 数据库中的方向字符串非法时按输入处理，不中断加载
            direction: model.direction.parse().unwrap_or(Direction::Input),
            signal_tag: model.signal_tag.clone(),
            func_attr: model.func_attr.clone(),
            cds_type: model.cds_type.clone(),
            address: model.address.clone(),
        }
    }
}
