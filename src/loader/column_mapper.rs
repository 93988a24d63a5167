// ==========================================
// 表格数据装载 - 表头映射器
// ==========================================
// 职责: 表头行 → 列位置 → 字段描述符
// 约束: 每次装载只计算一次，所有数据行复用
// ==========================================

use crate::domain::{column_letter, EntitySchema, FieldDescriptor, RawRow};
use std::collections::BTreeMap;
use tracing::debug;

// ==========================================
// ColumnSlot - 单列映射结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSlot<'s> {
    /// 表头命中映射表
    Mapped {
        label: String,
        descriptor: &'s FieldDescriptor,
    },
    /// 表头为空或未在映射表中声明，该列所有单元格被忽略
    Unmapped,
}

// ==========================================
// ColumnMap - 列位置 → 映射结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ColumnMap<'s> {
    slots: BTreeMap<usize, ColumnSlot<'s>>,
}

impl<'s> ColumnMap<'s> {
    /// 查询列位置的映射结果
    ///
    /// # 返回
    /// - None: 表头中不存在该列位置
    pub fn slot(&self, column: usize) -> Option<&ColumnSlot<'s>> {
        self.slots.get(&column)
    }

    /// 命中映射表的列数
    pub fn mapped_count(&self) -> usize {
        self.slots
            .values()
            .filter(|s| matches!(s, ColumnSlot::Mapped { .. }))
            .count()
    }

    /// 表头列数
    pub fn width(&self) -> usize {
        self.slots.len()
    }
}

pub struct ColumnMapper;

impl ColumnMapper {
    /// 根据表头行构建列映射
    ///
    /// # 参数
    /// - header: 第 0 行（表头）
    /// - schema: 实体类型（携带映射表）
    ///
    /// # 说明
    /// - 映射表未命中不是错误，记为 Unmapped
    pub fn build<'s>(header: &RawRow, schema: &'s EntitySchema) -> ColumnMap<'s> {
        let mut slots = BTreeMap::new();

        for cell in &header.cells {
            let slot = match cell
                .value
                .as_label()
                .and_then(|label| schema.descriptor_for(&label).map(|d| (label, d)))
            {
                Some((label, descriptor)) => ColumnSlot::Mapped { label, descriptor },
                None => {
                    debug!(
                        table = %schema.table,
                        column = %column_letter(cell.column),
                        header = %cell.value,
                        "表头未命中映射表，忽略该列"
                    );
                    ColumnSlot::Unmapped
                }
            };
            slots.insert(cell.column, slot);
        }

        ColumnMap { slots }
    }
}
