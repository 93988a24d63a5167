// ==========================================
// 表格数据装载 - 行转换器
// ==========================================
// 职责: 原始行序列 → 惰性的 TransformedRecord 序列
// 流程: 表头映射（一次）→ 逐行字段解析 → 预处理钩子 → 产出
// 约束: 单次遍历，不可重启（迭代器按值持有行序列，不实现 Clone）
// ==========================================

use crate::domain::{column_letter, EntitySchema, RawRow, TransformedRecord};
use crate::loader::column_mapper::{ColumnMap, ColumnMapper, ColumnSlot};
use crate::loader::error::{LoadError, LoadResult};
use crate::loader::field_resolver::FieldResolve;

pub struct RowTransformer<'s> {
    schema: &'s EntitySchema,
}

impl<'s> RowTransformer<'s> {
    pub fn new(schema: &'s EntitySchema) -> Self {
        Self { schema }
    }

    /// 开始转换
    ///
    /// 立即消费表头行并构建列映射；数据行在迭代时才逐行处理。
    ///
    /// # 参数
    /// - rows: 原始行序列（第 0 行为表头）
    /// - resolver: 字段解析器
    /// - preprocess: 预处理钩子，每行恰好调用一次，位于字段解析之后、实体物化之前
    ///
    /// # 返回
    /// - Err(MalformedInput): 行序列为空（缺少表头）
    pub fn transform<'r, I, R, P>(
        &self,
        rows: I,
        resolver: &'r R,
        preprocess: P,
    ) -> LoadResult<TransformedRows<'s, 'r, I::IntoIter, R, P>>
    where
        I: IntoIterator<Item = RawRow>,
        R: FieldResolve + ?Sized,
        P: FnMut(&mut TransformedRecord),
    {
        let mut rows = rows.into_iter();
        let header = rows.next().ok_or_else(|| LoadError::MalformedInput {
            row: 1,
            message: "缺少表头行".to_string(),
        })?;
        let column_map = ColumnMapper::build(&header, self.schema);

        Ok(TransformedRows {
            rows,
            column_map,
            resolver,
            preprocess,
            row_number: 1,
            done: false,
        })
    }
}

// ==========================================
// TransformedRows - 惰性转换序列
// ==========================================
// 出错后不再产出（fused）
pub struct TransformedRows<'s, 'r, I, R: ?Sized, P> {
    rows: I,
    column_map: ColumnMap<'s>,
    resolver: &'r R,
    preprocess: P,
    row_number: usize,
    done: bool,
}

impl<'s, 'r, I, R: ?Sized, P> TransformedRows<'s, 'r, I, R, P> {
    /// 最近一次产出对应的源行号（表头为第 1 行）
    pub fn row_number(&self) -> usize {
        self.row_number
    }

    pub fn column_map(&self) -> &ColumnMap<'s> {
        &self.column_map
    }
}

impl<'s, 'r, I, R, P> TransformedRows<'s, 'r, I, R, P>
where
    R: FieldResolve + ?Sized,
    P: FnMut(&mut TransformedRecord),
{
    fn transform_row(&mut self, row: RawRow) -> LoadResult<TransformedRecord> {
        let mut record = TransformedRecord::new();

        for cell in row.cells {
            match self.column_map.slot(cell.column) {
                Some(ColumnSlot::Mapped { descriptor, .. }) => {
                    let (name, value) = self.resolver.resolve(descriptor, cell.value)?;
                    record.insert(name, value);
                }
                Some(ColumnSlot::Unmapped) => {}
                None => {
                    return Err(LoadError::MalformedInput {
                        row: self.row_number,
                        message: format!("列 {} 不在表头范围内", column_letter(cell.column)),
                    })
                }
            }
        }

        (self.preprocess)(&mut record);
        Ok(record)
    }
}

impl<'s, 'r, I, R, P> Iterator for TransformedRows<'s, 'r, I, R, P>
where
    I: Iterator<Item = RawRow>,
    R: FieldResolve + ?Sized,
    P: FnMut(&mut TransformedRecord),
{
    type Item = LoadResult<TransformedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let row = self.rows.next()?;
        self.row_number += 1;

        let result = self.transform_row(row);
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}
