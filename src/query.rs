use crate::error::{Error, Result};
use crate::expand::expand_in;
use crate::value::{SqlStringer as _, SqlValuer as _, Value};
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;
use sqlx::{mysql::MySqlQueryResult, Executor, MySql};

/// Type alias for SQLx Query with MySQL arguments
pub type Q<'q> = Query<'q, MySql, MySqlArguments>;

/// A query with its list arguments expanded, ready for execution.
///
/// `ExpandedQuery` runs [`expand_in`](crate::expand_in) at construction time
/// and stores the rewritten SQL together with the flattened argument list. A
/// fresh SQLx `Query` is constructed on each execution, with every stored
/// [`Value`] bound in order.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::MySqlPool;
/// use sqlx_params::{params, ExpandedQuery};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = MySqlPool::connect("mysql://localhost/test").await?;
///
/// let query = ExpandedQuery::new(
///     "DELETE FROM users WHERE id IN (?) AND active = ?",
///     params![vec![1, 2, 3], false],
/// )?;
///
/// let result = query.execute(&pool).await?;
/// println!("Deleted {} rows", result.rows_affected());
/// # Ok(())
/// # }
/// ```
pub struct ExpandedQuery {
    sql: String,
    args: Vec<Value>,
}

impl ExpandedQuery {
    /// Expands `query` and stores the result for execution.
    ///
    /// # Errors
    ///
    /// Returns an error when the placeholder and argument counts disagree,
    /// when a list argument is empty, or when a self-describing value fails
    /// to resolve; see [`expand_in`](crate::expand_in).
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlx_params::{params, ExpandedQuery};
    ///
    /// let query = ExpandedQuery::new(
    ///     "SELECT id FROM t WHERE id IN (?)",
    ///     params![vec![1, 2, 3]],
    /// )?;
    /// assert_eq!(query.sql(), "SELECT id FROM t WHERE id IN (?, ?, ?)");
    /// # Ok::<(), sqlx_params::Error>(())
    /// ```
    pub fn new<T>(query: T, args: Vec<Value>) -> Result<Self>
    where
        T: Into<String>,
    {
        let query = query.into();
        let (sql, args) = expand_in(&query, args)?;
        Ok(Self { sql, args })
    }

    /// The expanded SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The flattened argument list.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    fn build(&self) -> Result<Q<'_>> {
        let mut q = sqlx::query::<MySql>(&self.sql);
        for arg in &self.args {
            q = bind_value(q, arg)?;
        }
        Ok(q)
    }

    /// Executes the expanded query using the provided executor.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument has no parameter representation or if
    /// the database query fails.
    pub async fn execute<'e, E>(&self, executor: E) -> Result<MySqlQueryResult>
    where
        E: Executor<'e, Database = MySql>,
    {
        Ok(self.build()?.execute(executor).await?)
    }
}

/// Binds one value to its MySQL parameter. Self-describing values resolve
/// here when the expansion fast path left them untouched; aggregate kinds
/// have no single parameter form and are rejected.
fn bind_value<'q>(query: Q<'q>, value: &Value) -> Result<Q<'q>> {
    let mut value = value.clone();
    loop {
        value = match value {
            Value::Valuer(v) => v.sql_value()?,
            Value::Null => return Ok(query.bind(None::<String>)),
            Value::Bool(v) => return Ok(query.bind(v)),
            Value::Int8(v) => return Ok(query.bind(v)),
            Value::Int16(v) => return Ok(query.bind(v)),
            Value::Int32(v) => return Ok(query.bind(v)),
            Value::Int64(v) => return Ok(query.bind(v)),
            Value::UInt8(v) => return Ok(query.bind(v)),
            Value::UInt16(v) => return Ok(query.bind(v)),
            Value::UInt32(v) => return Ok(query.bind(v)),
            Value::UInt64(v) => return Ok(query.bind(v)),
            Value::Float32(v) => return Ok(query.bind(v)),
            Value::Float64(v) => return Ok(query.bind(v)),
            Value::Text(v) => return Ok(query.bind(v)),
            Value::Bytes(v) => return Ok(query.bind(v)),
            Value::Timestamp(v) => return Ok(query.bind(v)),
            Value::Stringer(v) => return Ok(query.bind(v.sql_string())),
            other => return Err(Error::Unbindable(other.kind())),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[test]
    fn test_expanded_query_new() {
        let query = ExpandedQuery::new(
            "SELECT id FROM t WHERE id IN (?) AND pid = ?",
            params![vec![1, 2, 3], 5],
        )
        .unwrap();

        assert_eq!(query.sql(), "SELECT id FROM t WHERE id IN (?, ?, ?) AND pid = ?");
        assert_eq!(query.args(), params![1, 2, 3, 5]);
    }

    #[test]
    fn test_expanded_query_rejects_empty_list() {
        let result = ExpandedQuery::new("id IN (?)", params![Vec::<i64>::new()]);
        assert!(matches!(result, Err(Error::EmptyList)));
    }

    #[test]
    fn test_expanded_query_binds_scalars() {
        let query = ExpandedQuery::new(
            "INSERT INTO t VALUES (?, ?, ?, ?)",
            params![1, "text", 2.5, None::<String>],
        )
        .unwrap();
        assert!(query.build().is_ok());
    }

    #[test]
    fn test_expanded_query_rejects_aggregate_binds() {
        let record = Value::Record(vec![("id".into(), Value::from(1))]);
        let query = ExpandedQuery::new("id = ?", vec![record]).unwrap();
        assert!(matches!(query.build(), Err(Error::Unbindable("record"))));
    }
}
