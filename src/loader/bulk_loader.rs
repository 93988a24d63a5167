// ==========================================
// 表格数据装载 - 批量装载器
// ==========================================
// 职责: 事务化全量替换目标表
// 流程: 开启事务 → 删除全部旧记录 → 行转换 → 物化实体 → 批量插入 → 提交
// 红线: 任一步骤失败整体回滚，目标表不会出现部分替换状态
// ==========================================

use crate::config::DatabaseConfig;
use crate::db::{configure_sqlite_connection, open_sqlite_connection, open_sqlite_connection_with};
use crate::domain::{Entity, EntitySchema, LoadSummary, RawRow, TransformedRecord};
use crate::loader::error::{LoadError, LoadResult};
use crate::loader::field_resolver::FieldResolver;
use crate::loader::row_transformer::RowTransformer;
use crate::repository::entity_repo;
use chrono::Utc;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn, Span};
use uuid::Uuid;

// ==========================================
// BulkLoader - 批量装载器
// ==========================================
pub struct BulkLoader {
    conn: Arc<Mutex<Connection>>,
}

impl BulkLoader {
    /// 打开数据库并创建装载器
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> LoadResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 按数据库配置打开连接并创建装载器
    pub fn open(db_path: &str, config: &DatabaseConfig) -> LoadResult<Self> {
        let conn = open_sqlite_connection_with(db_path, config)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建装载器
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> LoadResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| LoadError::Lock(format!("锁获取失败: {}", e)))?;
            configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// 全量替换目标表（不做预处理）
    pub fn load<I>(&self, schema: &EntitySchema, rows: I) -> LoadResult<LoadSummary>
    where
        I: IntoIterator<Item = RawRow>,
    {
        self.load_with(schema, rows, |_: &mut TransformedRecord| {})
    }

    /// 全量替换目标表
    ///
    /// # 参数
    /// - schema: 目标实体类型（携带映射表）
    /// - rows: 原始行序列（第 0 行为表头）
    /// - preprocess: 预处理钩子，每条记录在物化前调用一次
    ///
    /// # 返回
    /// - Ok(LoadSummary): 删除/插入统计
    /// - Err: 配置错误、自然键错误、约束违反、输入格式错误等；此时事务已回滚
    #[instrument(skip_all, fields(table = %schema.table, load_id))]
    pub fn load_with<I, P>(
        &self,
        schema: &EntitySchema,
        rows: I,
        preprocess: P,
    ) -> LoadResult<LoadSummary>
    where
        I: IntoIterator<Item = RawRow>,
        P: FnMut(&mut TransformedRecord),
    {
        let start_time = Instant::now();
        let started_at = Utc::now();
        let load_id = Uuid::new_v4().to_string();
        Span::current().record("load_id", load_id.as_str());

        schema.validate()?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| LoadError::Lock(format!("锁获取失败: {}", e)))?;

        // IMMEDIATE: 事务开始即取得写锁，同表并发装载由存储层串行化
        let tx = Transaction::new_unchecked(&conn, TransactionBehavior::Immediate)?;
        debug!("事务已开启");

        match Self::replace_all_tx(&tx, schema, rows, preprocess) {
            Ok((deleted, inserted)) => {
                tx.commit()?;
                let elapsed_ms = start_time.elapsed().as_millis() as i64;
                info!(deleted, inserted, elapsed_ms, "装载完成");

                Ok(LoadSummary {
                    load_id,
                    table: schema.table.clone(),
                    deleted,
                    inserted,
                    started_at,
                    elapsed_ms,
                })
            }
            Err(e) => {
                warn!(error = %e, "装载失败，回滚事务");
                if let Err(rollback_err) = tx.rollback() {
                    error!(error = %rollback_err, "事务回滚失败");
                }
                Err(e)
            }
        }
    }

    /// 在事务中执行删除 + 转换 + 插入
    ///
    /// # 返回
    /// - (删除数, 插入数)
    fn replace_all_tx<I, P>(
        tx: &Transaction,
        schema: &EntitySchema,
        rows: I,
        preprocess: P,
    ) -> LoadResult<(usize, usize)>
    where
        I: IntoIterator<Item = RawRow>,
        P: FnMut(&mut TransformedRecord),
    {
        // === 步骤 1: 删除旧记录 ===
        let deleted = entity_repo::delete_all(tx, schema)?;
        debug!(deleted, "旧记录已删除");

        // === 步骤 2: 行转换 + 物化实体 ===
        let resolver = FieldResolver::new(schema, &**tx);
        let mut records = RowTransformer::new(schema).transform(rows, &resolver, preprocess)?;
        debug!(
            columns = records.column_map().width(),
            mapped = records.column_map().mapped_count(),
            "表头映射完成"
        );

        let mut entities = Vec::new();
        while let Some(record) = records.next() {
            let record = record?;
            entities.push(Entity::from_record(schema, record, records.row_number())?);
        }
        debug!(count = entities.len(), "实体物化完成");

        // === 步骤 3: 批量插入 ===
        let inserted = entity_repo::bulk_insert(tx, schema, &entities)?;

        Ok((deleted, inserted))
    }
}
