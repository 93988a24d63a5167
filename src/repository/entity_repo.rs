// ==========================================
// 表格数据装载 - 实体 Repository
// ==========================================
// 职责: 目标表的全量删除 / 批量插入 / 自然键查找（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// 约定: 所有函数接收 &Connection，事务由调用方持有（Transaction 可解引用为 Connection）
// ==========================================

use crate::domain::{CellValue, Entity, EntitySchema};
use crate::loader::error::{LoadError, LoadResult};
use rusqlite::{params, params_from_iter, Connection};

/// SQL 标识符加引号（内部双引号转义）
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// 删除目标表全部记录
///
/// # 返回
/// - 删除的记录数
pub fn delete_all(conn: &Connection, schema: &EntitySchema) -> LoadResult<usize> {
    let sql = format!("DELETE FROM {}", quote_ident(&schema.table));
    Ok(conn.execute(&sql, [])?)
}

/// 统计目标表记录数
pub fn count_all(conn: &Connection, schema: &EntitySchema) -> LoadResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(&schema.table));
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}

/// 批量插入实体
///
/// 每个实体只写入自身携带的列；列集合相同的实体复用同一条预编译语句。
///
/// # 返回
/// - 插入的记录数
pub fn bulk_insert(conn: &Connection, schema: &EntitySchema, entities: &[Entity]) -> LoadResult<usize> {
    let table = quote_ident(&schema.table);
    let mut count = 0;

    for entity in entities {
        let sql = if entity.values.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", table)
        } else {
            let columns: Vec<String> = entity.columns().map(quote_ident).collect();
            let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                columns.join(", "),
                placeholders.join(", ")
            )
        };

        let mut stmt = conn.prepare_cached(&sql)?;
        stmt.execute(params_from_iter(entity.values.iter().map(|(_, v)| v)))?;
        count += 1;
    }

    Ok(count)
}

/// 按自然键查找关联记录主键
///
/// # 参数
/// - table: 关联表
/// - key_column: 关联表主键列
/// - lookup_column: 自然键列
/// - value: 自然键值
///
/// # 返回
/// - Ok(CellValue): 唯一匹配记录的主键
/// - Err(NotFound): 无匹配
/// - Err(AmbiguousKey): 多条匹配
pub fn find_one_by(
    conn: &Connection,
    table: &str,
    key_column: &str,
    lookup_column: &str,
    value: &CellValue,
) -> LoadResult<CellValue> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = ?1 LIMIT 2",
        quote_ident(key_column),
        quote_ident(table),
        quote_ident(lookup_column)
    );

    let mut stmt = conn.prepare_cached(&sql)?;
    let keys = stmt
        .query_map(params![value], |row| row.get::<_, CellValue>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    match keys.len() {
        0 => Err(LoadError::NotFound {
            table: table.to_string(),
            column: lookup_column.to_string(),
            value: value.to_string(),
        }),
        1 => Ok(keys.into_iter().next().unwrap_or_default()),
        _ => Err(LoadError::AmbiguousKey {
            table: table.to_string(),
            column: lookup_column.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldDescriptor, TransformedRecord};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE tag (id INTEGER PRIMARY KEY, code TEXT, label TEXT NOT NULL DEFAULT '');
            INSERT INTO tag (id, code) VALUES (1, 'A'), (2, 'B'), (3, 'B');
            "#,
        )
        .unwrap();
        conn
    }

    fn tag_schema() -> EntitySchema {
        EntitySchema::new("tag")
            .with_column("code")
            .with_column("label")
            .with_mapping("CODE", FieldDescriptor::direct("code"))
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("name"), "\"name\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_find_one_by() {
        let conn = setup();
        let pk = find_one_by(&conn, "tag", "id", "code", &CellValue::from("A")).unwrap();
        assert_eq!(pk, CellValue::Integer(1));
    }

    #[test]
    fn test_find_one_by_not_found() {
        let conn = setup();
        let err = find_one_by(&conn, "tag", "id", "code", &CellValue::from("Z")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }), "{:?}", err);
    }

    #[test]
    fn test_find_one_by_ambiguous() {
        let conn = setup();
        let err = find_one_by(&conn, "tag", "id", "code", &CellValue::from("B")).unwrap_err();
        assert!(matches!(err, LoadError::AmbiguousKey { .. }), "{:?}", err);
    }

    #[test]
    fn test_delete_and_bulk_insert() {
        let conn = setup();
        let schema = tag_schema();

        assert_eq!(delete_all(&conn, &schema).unwrap(), 3);

        let mut with_label = TransformedRecord::new();
        with_label.insert("code", "X");
        with_label.insert("label", "labelled");
        let mut without_label = TransformedRecord::new();
        without_label.insert("code", "Y");

        let entities = vec![
            Entity::from_record(&schema, with_label, 2).unwrap(),
            Entity::from_record(&schema, without_label, 3).unwrap(),
            Entity::from_record(&schema, TransformedRecord::new(), 4).unwrap(),
        ];
        assert_eq!(bulk_insert(&conn, &schema, &entities).unwrap(), 3);
        assert_eq!(count_all(&conn, &schema).unwrap(), 3);

        // 未写入的列取表定义默认值
        let label: String = conn
            .query_row("SELECT label FROM tag WHERE code = 'Y'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(label, "");
    }
}
