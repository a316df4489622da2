use crate::error::{Error, Result};
use crate::value::{SqlValuer as _, Value};

/// Expands list values in `args`, returning the rewritten query and a
/// flattened argument list ready for driver execution. The query should use
/// the `?` placeholder; the returned query does too.
///
/// Each `?` consumes one argument, left to right. A [`Value::List`] argument
/// replaces its placeholder with one `?` per element and splices the
/// elements into the output; every other argument passes through unchanged.
/// Self-describing values resolve before inspection, so a valuer producing a
/// list expands like one.
///
/// The number of `?` placeholders must match the number of arguments
/// exactly, and a list argument must be non-empty: `IN ()` has no defined
/// meaning. When no list argument is present the input is returned
/// unchanged without validating placeholder counts.
///
/// # Examples
///
/// ```
/// use sqlx_params::{expand_in, params};
///
/// let (query, args) = expand_in(
///     "SELECT id FROM t WHERE id IN (?) AND pid = ?",
///     params![vec![1, 2, 3], 5],
/// )?;
/// assert_eq!(query, "SELECT id FROM t WHERE id IN (?, ?, ?) AND pid = ?");
/// assert_eq!(args, params![1, 2, 3, 5]);
/// # Ok::<(), sqlx_params::Error>(())
/// ```
pub fn expand_in(query: &str, args: Vec<Value>) -> Result<(String, Vec<Value>)> {
    let mut any_lists = false;
    let mut flat_count = 0;
    let mut resolved = Vec::with_capacity(args.len());

    for arg in &args {
        let arg = match arg {
            Value::Valuer(v) => v.sql_value()?,
            other => other.clone(),
        };
        if let Value::List(items) = &arg {
            if items.is_empty() {
                return Err(Error::EmptyList);
            }
            any_lists = true;
            flat_count += items.len();
        } else {
            flat_count += 1;
        }
        resolved.push(arg);
    }

    // Nothing to expand: hand back the input as-is. Count mismatches that
    // would have been caught below go undetected here, the driver will
    // reject them instead.
    if !any_lists {
        return Ok((query.to_owned(), args));
    }

    let mut out = String::with_capacity(query.len() + ", ?".len() * flat_count);
    let mut new_args = Vec::with_capacity(flat_count);
    let mut next = resolved.into_iter();
    let mut rest = query;

    while let Some(i) = rest.find('?') {
        let Some(arg) = next.next() else {
            return Err(Error::NotEnoughArguments);
        };

        // copy everything up to and including the `?`
        out.push_str(&rest[..=i]);
        rest = &rest[i + 1..];

        match arg {
            Value::List(items) => {
                for _ in 1..items.len() {
                    out.push_str(", ?");
                }
                new_args.extend(items);
            }
            other => new_args.push(other),
        }
    }
    out.push_str(rest);

    if next.next().is_some() {
        return Err(Error::TooManyArguments);
    }

    Ok((out, new_args))
}

/// Rewrites every `?` placeholder into sequential `$1, $2, ...` numbered
/// placeholders, for dialects that require them. Pure text transform with no
/// error cases; a query without `?` comes back unchanged.
///
/// # Examples
///
/// ```
/// use sqlx_params::rebind;
///
/// assert_eq!(
///     rebind("SELECT id FROM t WHERE id IN (?, ?, ?) AND pid = ?"),
///     "SELECT id FROM t WHERE id IN ($1, $2, $3) AND pid = $4"
/// );
/// ```
pub fn rebind(query: &str) -> String {
    let mut out = String::with_capacity(query.len() + 10);
    let mut buffer = itoa::Buffer::new();
    let mut count = 0usize;
    let mut rest = query;

    while let Some(i) = rest.find('?') {
        out.push_str(&rest[..i]);
        count += 1;
        out.push('$');
        out.push_str(buffer.format(count));
        rest = &rest[i + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use crate::value::{SqlValuer, ValuerError};

    #[derive(Debug)]
    struct LateList(Vec<i64>);

    impl SqlValuer for LateList {
        fn sql_value(&self) -> std::result::Result<Value, ValuerError> {
            Ok(Value::list(self.0.clone()))
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl SqlValuer for Failing {
        fn sql_value(&self) -> std::result::Result<Value, ValuerError> {
            Err(ValuerError("broken".into()))
        }
    }

    #[test]
    fn test_expand_in_splices_list_values() {
        let (query, args) = expand_in(
            "SELECT id FROM t WHERE id IN (?) AND pid = ?",
            params![vec![1, 2, 3], 5],
        )
        .unwrap();
        assert_eq!(query, "SELECT id FROM t WHERE id IN (?, ?, ?) AND pid = ?");
        assert_eq!(args, params![1, 2, 3, 5]);
    }

    #[test]
    fn test_expand_in_preserves_argument_order_around_lists() {
        let (query, args) = expand_in(
            "UPDATE t SET a = ? WHERE id IN (?) AND b = ?",
            params![10, vec!["x", "y"], 20],
        )
        .unwrap();
        assert_eq!(query, "UPDATE t SET a = ? WHERE id IN (?, ?) AND b = ?");
        assert_eq!(args, params![10, "x", "y", 20]);
    }

    #[test]
    fn test_expand_in_without_lists_is_a_no_op() {
        let (query, args) =
            expand_in("SELECT 1 WHERE a = ? AND b = ?", params![1, "two"]).unwrap();
        assert_eq!(query, "SELECT 1 WHERE a = ? AND b = ?");
        assert_eq!(args, params![1, "two"]);
    }

    #[test]
    fn test_expand_in_without_lists_skips_count_validation() {
        let (query, args) = expand_in("? ? ?", params![1]).unwrap();
        assert_eq!(query, "? ? ?");
        assert_eq!(args, params![1]);
    }

    #[test]
    fn test_expand_in_rejects_empty_list() {
        let err = expand_in("id IN (?)", params![Vec::<i64>::new()]).unwrap_err();
        assert!(matches!(err, Error::EmptyList));
    }

    #[test]
    fn test_expand_in_rejects_too_few_arguments() {
        let err = expand_in("? AND ? AND ?", params![vec![1, 2]]).unwrap_err();
        assert!(matches!(err, Error::NotEnoughArguments));
    }

    #[test]
    fn test_expand_in_rejects_too_many_arguments() {
        let err = expand_in("id IN (?)", params![vec![1, 2], 5]).unwrap_err();
        assert!(matches!(err, Error::TooManyArguments));
    }

    #[test]
    fn test_expand_in_resolves_valuers_before_inspection() {
        let (query, args) = expand_in(
            "id IN (?) AND pid = ?",
            vec![Value::valuer(LateList(vec![1, 2])), Value::from(5)],
        )
        .unwrap();
        assert_eq!(query, "id IN (?, ?) AND pid = ?");
        assert_eq!(args, params![1i64, 2i64, 5]);
    }

    #[test]
    fn test_expand_in_propagates_valuer_failure() {
        let err = expand_in("id = ?", vec![Value::valuer(Failing)]).unwrap_err();
        assert!(matches!(err, Error::Valuer(_)));
    }

    #[test]
    fn test_rebind_numbers_placeholders() {
        assert_eq!(
            rebind("SELECT id FROM t WHERE id IN (?, ?, ?) AND pid = ?"),
            "SELECT id FROM t WHERE id IN ($1, $2, $3) AND pid = $4"
        );
    }

    #[test]
    fn test_rebind_without_placeholders_is_identity() {
        assert_eq!(rebind("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_rebind_after_expansion() {
        let (query, _) = expand_in("id IN (?)", params![vec![7, 8]]).unwrap();
        assert_eq!(rebind(&query), "id IN ($1, $2)");
    }
}
