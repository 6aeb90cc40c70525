// ==========================================
// 配方成本管理系统 - 动态过滤 SQL 构建
// ==========================================
// 职责: 拼接 WHERE / ORDER BY / LIMIT 子句与位置参数
// 红线: 只拼接占位符,值一律走参数绑定
// ==========================================

use crate::domain::query::PageRequest;
use rusqlite::types::Value;

/// 动态过滤条件构建器
///
/// # 示例
/// ```
/// use recipe_costing::repository::filter_sql::FilterSql;
///
/// let mut filter = FilterSql::new("SELECT id FROM materials m");
/// filter.push_eq("m.category", "CHEMICAL".to_string());
/// filter.push_search(&["m.name", "m.supplier"], Some("Flour"));
/// let (sql, values) = filter.finish("m.name ASC, m.id ASC", None);
/// assert!(sql.contains("WHERE m.category = ?1 AND (LOWER(m.name) LIKE ?2"));
/// assert_eq!(values.len(), 2);
/// ```
#[derive(Debug)]
pub struct FilterSql {
    sql: String,
    conditions: Vec<String>,
    values: Vec<Value>,
}

impl FilterSql {
    pub fn new(base_query: &str) -> Self {
        Self {
            sql: base_query.to_string(),
            conditions: Vec::new(),
            values: Vec::new(),
        }
    }

    fn next_placeholder(&mut self, value: Value) -> String {
        self.values.push(value);
        format!("?{}", self.values.len())
    }

    /// 追加 `column = ?`
    pub fn push_eq(&mut self, column: &str, value: impl Into<Value>) {
        let placeholder = self.next_placeholder(value.into());
        self.conditions.push(format!("{} = {}", column, placeholder));
    }

    /// 追加不区分大小写的子串搜索（多列 OR）
    ///
    /// 空白搜索词不产生条件; `%` / `_` 按字面匹配
    pub fn push_search(&mut self, columns: &[&str], term: Option<&str>) {
        let term = match term.map(str::trim).filter(|s| !s.is_empty()) {
            Some(t) => t,
            None => return,
        };
        if columns.is_empty() {
            return;
        }

        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        let placeholder = self.next_placeholder(Value::from(pattern));
        let clauses: Vec<String> = columns
            .iter()
            .map(|c| format!("LOWER({}) LIKE {} ESCAPE '\\'", c, placeholder))
            .collect();
        self.conditions.push(format!("({})", clauses.join(" OR ")));
    }

    /// 追加不带参数的条件
    pub fn push_raw(&mut self, condition: &str) {
        self.conditions.push(condition.to_string());
    }

    /// 生成完整 SQL 与参数
    pub fn finish(mut self, order_by: &str, page: Option<PageRequest>) -> (String, Vec<Value>) {
        if !self.conditions.is_empty() {
            self.sql.push_str(" WHERE ");
            self.sql.push_str(&self.conditions.join(" AND "));
        }
        self.sql.push_str(" ORDER BY ");
        self.sql.push_str(order_by);

        if let Some(page) = page {
            let limit = self.next_placeholder(Value::from(page.limit()));
            let offset = self.next_placeholder(Value::from(page.offset()));
            self.sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
        }

        (self.sql, self.values)
    }
}

/// 转义 LIKE 通配符（ESCAPE '\'）
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
