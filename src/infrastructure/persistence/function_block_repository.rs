/// 功能块仓储
///
/// 封装SQLite连接与功能块/变量两张表的查找后写入逻辑。
/// 写方法对连接类型泛型化，同步服务把整次运行放进一个事务，
/// 单独调用时也可直接传连接。
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::info;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DatabaseTransaction, EntityTrait, Order, QueryFilter, QueryOrder, Schema, TransactionTrait,
};

use crate::models::entities::{fb_variable, function_block};
use crate::models::structs::{FbVariable, FunctionBlock};
use crate::utils::error::{AppError, AppResult};

#[derive(Clone)]
pub struct FunctionBlockRepository {
    db: Arc<DatabaseConnection>,
}

impl FunctionBlockRepository {
    /// 打开（必要时创建）文件数据库并初始化表结构
    pub async fn connect(database_path: &str) -> AppResult<Self> {
        let url = format!("sqlite://{}?mode=rwc", database_path);
        let mut options = ConnectOptions::new(url);
        options
            .max_connections(20)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(30))
            .sqlx_logging(false);

        let db = Database::connect(options)
            .await
            .map_err(|e| AppError::persistence_error(format!("连接数据库失败: {}", e)))?;
        let repo = Self { db: Arc::new(db) };
        repo.setup_schema().await?;
        info!("数据库已就绪: {}", database_path);
        Ok(repo)
    }

    /// 打开内存数据库，测试专用
    pub async fn new_in_memory() -> AppResult<Self> {
        let db = Database::connect("sqlite::memory:")
            .await
            .map_err(|e| AppError::persistence_error(format!("连接内存数据库失败: {}", e)))?;
        let repo = Self { db: Arc::new(db) };
        repo.setup_schema().await?;
        Ok(repo)
    }

    /// 按实体定义建表（已存在则跳过）
    async fn setup_schema(&self) -> AppResult<()> {
        let builder = self.db.get_database_backend();
        let schema = Schema::new(builder);

        let mut fb_table = schema.create_table_from_entity(function_block::Entity);
        self.db
            .execute(builder.build(fb_table.if_not_exists()))
            .await?;

        let mut var_table = schema.create_table_from_entity(fb_variable::Entity);
        self.db
            .execute(builder.build(var_table.if_not_exists()))
            .await?;
        Ok(())
    }

    /// 开启事务
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        Ok(self.db.begin().await?)
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// 按位号插入或更新功能块，返回持久化后的主键
    ///
    /// 已存在时只更新类型与归属字段；地址为空串表示"未解析"，
    /// 不覆盖已有值。名称、注释与主块标志归主块同步流程所有：
    /// 普通同步（`primary == false`）碰到同位号记录时不得抹掉
    /// 已有主块的这些字段。生成产物由 `update_artifacts` 单独写入。
    pub async fn upsert_function_block<C: ConnectionTrait>(
        &self,
        conn: &C,
        fb: &FunctionBlock,
    ) -> AppResult<String> {
        let existing = function_block::Entity::find()
            .filter(function_block::Column::Tag.eq(fb.tag.as_str()))
            .one(conn)
            .await?;

        match existing {
            Some(model) => {
                let id = model.id.clone();
                let mut active: function_block::ActiveModel = model.into();
                active.system = Set(fb.system.clone());
                active.node_ref = Set(fb.node_ref.clone());
                active.cds_type = Set(fb.cds_type.clone());
                active.equipment = Set(fb.equipment.clone());
                if fb.primary {
                    active.is_primary = Set(true);
                    active.name = Set(fb.name.clone());
                    active.comment = Set(fb.comment.clone());
                }
                if !fb.address.is_empty() {
                    active.address = Set(fb.address.clone());
                }
                active.updated_time = Set(Utc::now());
                active.update(conn).await?;
                Ok(id)
            }
            None => {
                let active = function_block::ActiveModel::from(fb);
                let model = active.insert(conn).await?;
                Ok(model.id)
            }
        }
    }

    /// 按 (功能块, 信号位号) 插入或更新变量，返回持久化后的主键
    pub async fn upsert_variable<C: ConnectionTrait>(
        &self,
        conn: &C,
        var: &FbVariable,
    ) -> AppResult<String> {
        let existing = fb_variable::Entity::find()
            .filter(fb_variable::Column::FbId.eq(var.fb_id.as_str()))
            .filter(fb_variable::Column::SignalTag.eq(var.signal_tag.as_str()))
            .one(conn)
            .await?;

        match existing {
            Some(model) => {
                let id = model.id.clone();
                let mut active: fb_variable::ActiveModel = model.into();
                active.direction = Set(var.direction.to_string());
                active.func_attr = Set(var.func_attr.clone());
                active.cds_type = Set(var.cds_type.clone());
                active.address = Set(var.address.clone());
                active.updated_time = Set(Utc::now());
                active.update(conn).await?;
                Ok(id)
            }
            None => {
                let active = fb_variable::ActiveModel::from(var);
                let model = active.insert(conn).await?;
                Ok(model.id)
            }
        }
    }

    /// 按位号加载功能块及其全部变量
    ///
    /// 变量按方向倒序、功能属性正序排列，保证生成时遍历顺序稳定。
    pub async fn load_with_variables<C: ConnectionTrait>(
        &self,
        conn: &C,
        tag: &str,
    ) -> AppResult<Option<FunctionBlock>> {
        let model = function_block::Entity::find()
            .filter(function_block::Column::Tag.eq(tag))
            .one(conn)
            .await?;
        let Some(model) = model else {
            return Ok(None);
        };

        let variables = fb_variable::Entity::find()
            .filter(fb_variable::Column::FbId.eq(model.id.as_str()))
            .order_by(fb_variable::Column::Direction, Order::Desc)
            .order_by(fb_variable::Column::FuncAttr, Order::Asc)
            .all(conn)
            .await?;

        let mut fb = FunctionBlock::from(&model);
        fb.variables = variables.iter().map(FbVariable::from).collect();
        Ok(Some(fb))
    }

    /// 加载全部功能块及变量，位号正序
    pub async fn list_all_with_variables(&self) -> AppResult<Vec<FunctionBlock>> {
        let rows = function_block::Entity::find()
            .find_with_related(fb_variable::Entity)
            .order_by(function_block::Column::Tag, Order::Asc)
            .all(self.db.as_ref())
            .await?;

        Ok(rows
            .iter()
            .map(|(model, variables)| {
                let mut fb = FunctionBlock::from(model);
                fb.variables = variables.iter().map(FbVariable::from).collect();
                fb
            })
            .collect())
    }

    /// 写回功能块的四种生成产物
    pub async fn update_artifacts<C: ConnectionTrait>(
        &self,
        conn: &C,
        tag: &str,
        declaration: &str,
        call: &str,
        omx: &str,
        opc: &str,
    ) -> AppResult<()> {
        let model = function_block::Entity::find()
            .filter(function_block::Column::Tag.eq(tag))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found_error("功能块", format!("位号 {} 不存在", tag)))?;

        let mut active: function_block::ActiveModel = model.into();
        active.declaration = Set(declaration.to_string());
        active.call = Set(call.to_string());
        active.omx = Set(omx.to_string());
        active.opc = Set(opc.to_string());
        active.updated_time = Set(Utc::now());
        active.update(conn).await?;
        Ok(())
    }
}
