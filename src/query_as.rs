use crate::error::{Error, Result};
use crate::expand::expand_in;
use crate::value::{SqlStringer as _, SqlValuer as _, Value};
use sqlx::{
    mysql::{MySqlArguments, MySqlRow},
    query::QueryAs,
    Executor, MySql,
};

/// Type alias for SQLx QueryAs with MySQL arguments
pub type QA<'q, R> = QueryAs<'q, MySql, R, MySqlArguments>;

/// An expanded query that returns typed results.
///
/// `ExpandedQueryAs` is [`ExpandedQuery`](crate::ExpandedQuery) with
/// strongly-typed rows via SQLx's `FromRow`. It supports `fetch_all`,
/// `fetch_one`, and `fetch_optional`.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::{FromRow, MySqlPool};
/// use sqlx_params::{params, ExpandedQueryAs};
///
/// #[derive(FromRow)]
/// struct User {
///     id: i32,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = MySqlPool::connect("mysql://localhost/test").await?;
///
/// let query = ExpandedQueryAs::<User>::new(
///     "SELECT id, name FROM users WHERE id IN (?)",
///     params![vec![1, 2, 3]],
/// )?;
///
/// let users: Vec<User> = query.fetch_all(&pool).await?;
/// for user in users {
///     println!("{}: {}", user.id, user.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ExpandedQueryAs<R> {
    sql: String,
    args: Vec<Value>,
    _pd: std::marker::PhantomData<R>,
}

impl<R> ExpandedQueryAs<R>
where
    for<'row> R: sqlx::FromRow<'row, MySqlRow> + Send + Unpin,
{
    /// Expands `query` and stores the result for typed fetching.
    ///
    /// # Errors
    ///
    /// Returns an error when the placeholder and argument counts disagree,
    /// when a list argument is empty, or when a self-describing value fails
    /// to resolve; see [`expand_in`](crate::expand_in).
    pub fn new<T>(query: T, args: Vec<Value>) -> Result<Self>
    where
        T: Into<String>,
    {
        let query = query.into();
        let (sql, args) = expand_in(&query, args)?;
        Ok(Self {
            sql,
            args,
            _pd: std::marker::PhantomData,
        })
    }

    /// The expanded SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The flattened argument list.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    fn build(&self) -> Result<QA<'_, R>> {
        let mut q = sqlx::query_as::<MySql, R>(&self.sql);
        for arg in &self.args {
            q = bind_value_as(q, arg)?;
        }
        Ok(q)
    }

    /// Executes the query and returns all matching rows.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument has no parameter representation, if
    /// the query fails, or if a row cannot be converted to type `R`.
    pub async fn fetch_all<'e, E>(&self, executor: E) -> Result<Vec<R>>
    where
        E: Executor<'e, Database = MySql>,
    {
        Ok(self.build()?.fetch_all(executor).await?)
    }

    /// Executes the query and returns exactly one row.
    ///
    /// # Errors
    ///
    /// Returns an error if no row matches, if the query fails, or if the row
    /// cannot be converted to type `R`.
    pub async fn fetch_one<'e, E>(&self, executor: E) -> Result<R>
    where
        E: Executor<'e, Database = MySql>,
    {
        Ok(self.build()?.fetch_one(executor).await?)
    }

    /// Executes the query and returns at most one row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or if the row cannot be converted
    /// to type `R`.
    pub async fn fetch_optional<'e, E>(&self, executor: E) -> Result<Option<R>>
    where
        E: Executor<'e, Database = MySql>,
    {
        Ok(self.build()?.fetch_optional(executor).await?)
    }
}

/// QueryAs twin of the binder in `query.rs`; the two bind the same variants
/// to the same parameter types.
fn bind_value_as<'q, R>(query: QA<'q, R>, value: &Value) -> Result<QA<'q, R>> {
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
    fn test_expanded_query_as_new() {
        #[derive(sqlx::FromRow)]
        struct TestRow {
            #[allow(dead_code)]
            id: i32,
        }

        let query = ExpandedQueryAs::<TestRow>::new(
            "SELECT id FROM users WHERE id IN (?)",
            params![vec![1, 2, 3]],
        )
        .unwrap();

        assert_eq!(query.sql(), "SELECT id FROM users WHERE id IN (?, ?, ?)");
        assert_eq!(query.args(), params![1, 2, 3]);
    }

    #[test]
    fn test_expanded_query_as_binds() {
        #[derive(sqlx::FromRow)]
        struct TestRow {
            #[allow(dead_code)]
            id: i32,
        }

        let query = ExpandedQueryAs::<TestRow>::new(
            "SELECT id FROM users WHERE id IN (?) AND name = ?",
            params![vec![1, 2], "a"],
        )
        .unwrap();
        assert!(query.build().is_ok());
    }
}
