// ==========================================
// 表格数据装载 - 实体类型与映射表
// ==========================================
// 职责: 描述目标表结构 + 表头 → 字段描述符的静态映射
// 红线: 映射表在构造后不可变，装载过程中只读
// ==========================================

use crate::loader::error::{LoadError, LoadResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// 外键属性名后缀（关系名 + 后缀 = 存储列名）
pub const FOREIGN_KEY_SUFFIX: &str = "_id";

fn default_primary_key() -> String {
    "id".to_string()
}

// ==========================================
// FieldDescriptor - 字段描述符
// ==========================================
// Direct:     值原样写入字段
// NaturalKey: 值作为关联表的自然键，解析为关联主键后写入外键列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDescriptor {
    Direct { field: String },
    NaturalKey { field: String, lookup: String },
}

impl FieldDescriptor {
    pub fn direct(field: impl Into<String>) -> Self {
        FieldDescriptor::Direct {
            field: field.into(),
        }
    }

    pub fn natural_key(field: impl Into<String>, lookup: impl Into<String>) -> Self {
        FieldDescriptor::NaturalKey {
            field: field.into(),
            lookup: lookup.into(),
        }
    }

    /// 描述符指向的字段名（关系名或普通列名）
    pub fn field(&self) -> &str {
        match self {
            FieldDescriptor::Direct { field } | FieldDescriptor::NaturalKey { field, .. } => field,
        }
    }
}

// ==========================================
// ColumnDef - 列定义
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    pub table: String,
    #[serde(default = "default_primary_key")]
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<ForeignKeyRef>,
}

impl ColumnDef {
    pub fn is_foreign_key(&self) -> bool {
        self.references.is_some()
    }

    /// 存储列名
    ///
    /// - 普通列: 与字段名相同
    /// - 外键列: 关系名 + "_id"
    pub fn attname(&self) -> String {
        if self.is_foreign_key() {
            format!("{}{}", self.name, FOREIGN_KEY_SUFFIX)
        } else {
            self.name.clone()
        }
    }
}

// ==========================================
// EntitySchema - 实体类型
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub table: String,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub mapping: BTreeMap<String, FieldDescriptor>,
}

impl EntitySchema {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            primary_key: default_primary_key(),
            columns: Vec::new(),
            mapping: BTreeMap::new(),
        }
    }

    // ===== 构造器 =====

    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    pub fn with_column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            references: None,
        });
        self
    }

    pub fn with_foreign_key(
        mut self,
        name: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            references: Some(ForeignKeyRef {
                table: table.into(),
                column: column.into(),
            }),
        });
        self
    }

    pub fn with_mapping(mut self, label: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.mapping.insert(label.into(), descriptor);
        self
    }

    // ===== 查询 =====

    pub fn column(&self, field: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == field)
    }

    /// 按表头标签查找描述符
    pub fn descriptor_for(&self, label: &str) -> Option<&FieldDescriptor> {
        self.mapping.get(label)
    }

    /// 直接写入时的存储列名
    ///
    /// - 已声明的列: 列存储名
    /// - 主键: 主键列名（无需在 columns 中声明）
    pub fn direct_attname(&self, field: &str) -> Option<String> {
        match self.column(field) {
            Some(column) => Some(column.attname()),
            None if field == self.primary_key => Some(self.primary_key.clone()),
            None => None,
        }
    }

    /// 可写入的属性名（主键 + 各列存储名）
    pub fn attribute_names(&self) -> Vec<String> {
        std::iter::once(self.primary_key.clone())
            .chain(
                self.columns
                    .iter()
                    .map(ColumnDef::attname)
                    .filter(|name| *name != self.primary_key),
            )
            .collect()
    }

    pub fn is_attribute(&self, name: &str) -> bool {
        name == self.primary_key || self.columns.iter().any(|c| c.attname() == name)
    }

    /// 校验实体类型是否可用于装载
    ///
    /// # 规则
    /// - 表名/主键非空
    /// - 映射表非空
    /// - 存储列名不重复
    /// - 描述符引用的字段存在；自然键字段必须是外键列且指定查找列
    pub fn validate(&self) -> LoadResult<()> {
        let config_error = |message: String| LoadError::Configuration {
            table: self.table.clone(),
            message,
        };

        if self.table.trim().is_empty() {
            return Err(config_error("表名为空".to_string()));
        }
        if self.primary_key.trim().is_empty() {
            return Err(config_error("主键列名为空".to_string()));
        }
        if self.mapping.is_empty() {
            return Err(config_error("缺少映射表".to_string()));
        }

        // 主键可以显式声明为普通列
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.attname()) {
                return Err(config_error(format!("列名重复: {}", column.attname())));
            }
            if column.is_foreign_key() && column.attname() == self.primary_key {
                return Err(config_error(format!("外键列与主键同名: {}", column.attname())));
            }
        }

        for (label, descriptor) in &self.mapping {
            if self.column(descriptor.field()).is_none() && descriptor.field() == self.primary_key {
                if matches!(descriptor, FieldDescriptor::NaturalKey { .. }) {
                    return Err(config_error(format!(
                        "表头 {} 的自然键字段 {} 不是外键列",
                        label, self.primary_key
                    )));
                }
                continue;
            }

            let column = self.column(descriptor.field()).ok_or_else(|| {
                config_error(format!(
                    "表头 {} 映射到未知字段: {}",
                    label,
                    descriptor.field()
                ))
            })?;

            if let FieldDescriptor::NaturalKey { lookup, .. } = descriptor {
                if !column.is_foreign_key() {
                    return Err(config_error(format!(
                        "表头 {} 的自然键字段 {} 不是外键列",
                        label, column.name
                    )));
                }
                if lookup.trim().is_empty() {
                    return Err(config_error(format!("表头 {} 的自然键查找列为空", label)));
                }
            }
        }

        Ok(())
    }
}
