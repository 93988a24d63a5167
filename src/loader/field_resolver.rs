// ==========================================
// 表格数据装载 - 字段解析器
// ==========================================
// 职责: (字段描述符, 原始值) → (属性名, 解析值)
// Direct:     属性名 = 字段存储名，值原样保留
// NaturalKey: 空值 → NULL（不查找）；否则按自然键查找关联主键
// ==========================================

use crate::domain::{CellValue, EntitySchema, FieldDescriptor};
use crate::loader::error::{LoadError, LoadResult};
use crate::repository::entity_repo;
use rusqlite::Connection;
use tracing::trace;

// ==========================================
// KeyLookup Trait
// ==========================================
// 用途: 自然键查找接口
// 实现者: rusqlite::Connection（事务内通过解引用使用）
pub trait KeyLookup {
    /// 在关联表中按自然键查找唯一记录的主键
    ///
    /// # 返回
    /// - Err(NotFound): 无匹配
    /// - Err(AmbiguousKey): 多条匹配
    fn find_one_by(
        &self,
        table: &str,
        key_column: &str,
        lookup_column: &str,
        value: &CellValue,
    ) -> LoadResult<CellValue>;
}

impl KeyLookup for Connection {
    fn find_one_by(
        &self,
        table: &str,
        key_column: &str,
        lookup_column: &str,
        value: &CellValue,
    ) -> LoadResult<CellValue> {
        entity_repo::find_one_by(self, table, key_column, lookup_column, value)
    }
}

// ==========================================
// FieldResolve Trait
// ==========================================
// 用途: 行转换器使用的单元格解析接口
// 实现者: FieldResolver；测试中可直接使用闭包
pub trait FieldResolve {
    fn resolve(&self, descriptor: &FieldDescriptor, raw: CellValue) -> LoadResult<(String, CellValue)>;
}

impl<F> FieldResolve for F
where
    F: Fn(&FieldDescriptor, CellValue) -> LoadResult<(String, CellValue)>,
{
    fn resolve(&self, descriptor: &FieldDescriptor, raw: CellValue) -> LoadResult<(String, CellValue)> {
        self(descriptor, raw)
    }
}

// ==========================================
// FieldResolver - 字段解析器实现
// ==========================================
pub struct FieldResolver<'a, L: KeyLookup + ?Sized> {
    schema: &'a EntitySchema,
    lookup: &'a L,
}

impl<'a, L: KeyLookup + ?Sized> FieldResolver<'a, L> {
    pub fn new(schema: &'a EntitySchema, lookup: &'a L) -> Self {
        Self { schema, lookup }
    }

    fn config_error(&self, message: String) -> LoadError {
        LoadError::Configuration {
            table: self.schema.table.clone(),
            message,
        }
    }
}

impl<L: KeyLookup + ?Sized> FieldResolve for FieldResolver<'_, L> {
    fn resolve(&self, descriptor: &FieldDescriptor, raw: CellValue) -> LoadResult<(String, CellValue)> {
        match descriptor {
            FieldDescriptor::Direct { field } => {
                let attname = self
                    .schema
                    .direct_attname(field)
                    .ok_or_else(|| self.config_error(format!("未知字段: {}", field)))?;
                Ok((attname, raw))
            }
            FieldDescriptor::NaturalKey { field, lookup } => {
                let column = self
                    .schema
                    .column(field)
                    .ok_or_else(|| self.config_error(format!("未知字段: {}", field)))?;
                let target = column.references.as_ref().ok_or_else(|| {
                    self.config_error(format!("自然键字段 {} 不是外键列", column.name))
                })?;

                // NULL 与纯空白文本均视为空关联，不做查找
                if raw.is_blank() {
                    return Ok((column.attname(), CellValue::Null));
                }

                let key = self
                    .lookup
                    .find_one_by(&target.table, &target.column, lookup, &raw)?;
                trace!(
                    table = %target.table,
                    lookup = %lookup,
                    value = %raw,
                    key = %key,
                    "自然键解析完成"
                );
                Ok((column.attname(), key))
            }
        }
    }
}
