// ==========================================
// 配方成本管理系统 - 行字段编解码
// ==========================================
// 职责: TEXT 列 ↔ Decimal / DateTime<Utc> / 枚举
// ==========================================

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use rust_decimal::Decimal;
use std::str::FromStr;

fn conversion_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

/// 读取 Decimal（TEXT 存储）
pub fn get_decimal(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(raw.trim()).map_err(|e| conversion_error(idx, e))
}

/// 读取 RFC3339 时间戳
pub fn get_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

/// 读取可空 RFC3339 时间戳
pub fn get_opt_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| conversion_error(idx, e))
    })
    .transpose()
}

/// 读取以 SCREAMING_SNAKE_CASE 文本存储的枚举
pub fn get_enum<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| conversion_error(idx, e))
}

/// Decimal → 规范化 TEXT
pub fn decimal_text(value: Decimal) -> String {
    value.normalize().to_string()
}

/// DateTime → RFC3339 TEXT
pub fn timestamp_text(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}
