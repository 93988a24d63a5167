// ==========================================
// 表格数据装载 - 转换记录与实体
// ==========================================
// 生命周期: TransformedRecord 每行创建一次 → 预处理钩子修改 → 物化为 Entity → 丢弃
// ==========================================

use crate::domain::cell::CellValue;
use crate::domain::schema::EntitySchema;
use crate::loader::error::{LoadError, LoadResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

// ==========================================
// TransformedRecord - 单行转换结果
// ==========================================
// 属性名 → 解析后的值；预处理钩子可任意增删改
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformedRecord {
    values: BTreeMap<String, CellValue>,
}

impl TransformedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入属性，返回被覆盖的旧值
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<CellValue>) -> Option<CellValue> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.values.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut CellValue> {
        self.values.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<CellValue> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, CellValue> {
        self.values.iter()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for TransformedRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for TransformedRecord {
    type Item = (String, CellValue);
    type IntoIter = btree_map::IntoIter<String, CellValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

// ==========================================
// Entity - 待落库实体
// ==========================================
// 只包含记录中出现的属性，缺省列交由表定义的 DEFAULT 处理
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub table: String,
    pub values: Vec<(String, CellValue)>,
}

impl Entity {
    /// 由转换记录物化实体
    ///
    /// # 参数
    /// - schema: 目标实体类型
    /// - record: 预处理后的转换记录
    /// - row_number: 源数据行号（用于错误信息）
    ///
    /// # 返回
    /// - Err(MalformedInput): 记录含有实体类型未声明的属性
    pub fn from_record(
        schema: &EntitySchema,
        record: TransformedRecord,
        row_number: usize,
    ) -> LoadResult<Self> {
        let mut values = Vec::with_capacity(record.len());
        for (name, value) in record {
            if !schema.is_attribute(&name) {
                return Err(LoadError::MalformedInput {
                    row: row_number,
                    message: format!("未知属性: {}.{}", schema.table, name),
                });
            }
            values.push((name, value));
        }

        Ok(Self {
            table: schema.table.clone(),
            values,
        })
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

// ==========================================
// LoadSummary - 装载结果汇总
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSummary {
    pub load_id: String,
    pub table: String,
    pub deleted: usize,  // 删除的旧记录数
    pub inserted: usize, // 插入的新记录数
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::FieldDescriptor;

    fn schema() -> EntitySchema {
        EntitySchema::new("sample_detail")
            .with_column("name")
            .with_foreign_key("master", "sample_master", "id")
            .with_mapping("NAME", FieldDescriptor::direct("name"))
    }

    #[test]
    fn test_record_mutation() {
        let mut record: TransformedRecord = vec![("name", CellValue::from("N1"))].into_iter().collect();
        let old = record.insert("name", "N1_5");
        assert_eq!(old, Some(CellValue::from("N1")));
        record.insert("master_id", 5_i64);
        assert_eq!(record.len(), 2);
        assert_eq!(record.remove("master_id"), Some(CellValue::Integer(5)));
        assert!(!record.contains("master_id"));
    }

    #[test]
    fn test_entity_from_record() {
        let mut record = TransformedRecord::new();
        record.insert("name", "N1");
        record.insert("master_id", 7_i64);

        let entity = Entity::from_record(&schema(), record, 2).unwrap();
        assert_eq!(entity.table, "sample_detail");
        assert_eq!(entity.get("master_id"), Some(&CellValue::Integer(7)));
        assert_eq!(entity.columns().count(), 2);
    }

    #[test]
    fn test_entity_rejects_unknown_attribute() {
        let mut record = TransformedRecord::new();
        record.insert("unknown", "x");

        let err = Entity::from_record(&schema(), record, 3).unwrap_err();
        match err {
            LoadError::MalformedInput { row, .. } => assert_eq!(row, 3),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
