use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::value::Value;

/// Prefix returned when no placeholder style can be detected.
const UNDEFINED_PLACEHOLDER: &str = "placeholder is undefined: ";

/// Numbered placeholders, `$1`, `$2`, ... (postgres style).
static NUMBERED_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+)").expect("valid numbered placeholder pattern"));

/// Named placeholders, `:identifier`, required to follow a non-colon
/// character so `::type` casts never match.
static NAMED_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^:])(:[a-z0-9_]+)").expect("valid named placeholder pattern"));

/// The placeholder style of a query, detected once per call. Exactly one
/// style is active; mixed queries resolve to the first match in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaceholderStyle {
    QuestionMark,
    Numbered,
    Named,
}

fn detect(sql: &str) -> Option<PlaceholderStyle> {
    if sql.contains('?') {
        Some(PlaceholderStyle::QuestionMark)
    } else if NUMBERED_PLACEHOLDER.is_match(sql) {
        Some(PlaceholderStyle::Numbered)
    } else if NAMED_PLACEHOLDER.is_match(sql) {
        Some(PlaceholderStyle::Named)
    } else {
        None
    }
}

/// Encoded literals keyed the way the renderer looks them up: positional and
/// numbered placeholders by 0-based index, named placeholders by identifier.
#[derive(Debug, Default)]
struct LiteralMap {
    by_index: BTreeMap<usize, String>,
    by_name: BTreeMap<String, String>,
}

impl LiteralMap {
    fn push(&mut self, value: &Value) {
        let index = self.by_index.len();
        self.by_index.insert(index, encode(value));
    }

    fn insert_named(&mut self, key: &str, value: &Value) {
        self.by_name.insert(key.to_owned(), encode(value));
    }
}

/// The literal path never fails: a valuer error renders as `NULL`.
fn encode(value: &Value) -> String {
    value
        .to_literal()
        .unwrap_or_else(|_| String::from("NULL"))
}

/// Decides how the argument list maps onto placeholder keys.
///
/// A single record argument expands field by field, keyed by name for the
/// named style and by field order otherwise. A single map argument always
/// expands by key name. Anything else is an independent positional argument.
fn classify(params: &[Value], style: PlaceholderStyle) -> LiteralMap {
    let mut vars = LiteralMap::default();
    match params {
        [Value::Record(fields)] => {
            for (name, value) in fields {
                if style == PlaceholderStyle::Named {
                    vars.insert_named(name, value);
                } else {
                    vars.push(value);
                }
            }
        }
        [Value::Map(entries)] => {
            for (name, value) in entries {
                vars.insert_named(name, value);
            }
        }
        _ => {
            for value in params {
                vars.push(value);
            }
        }
    }
    vars
}

fn render(sql: &str, style: PlaceholderStyle, vars: &LiteralMap) -> String {
    match style {
        PlaceholderStyle::QuestionMark => {
            let mut out = String::with_capacity(sql.len());
            let mut index = 0;
            for c in sql.chars() {
                if c == '?' {
                    if let Some(literal) = vars.by_index.get(&index) {
                        out.push_str(literal);
                        index += 1;
                        continue;
                    }
                }
                out.push(c);
            }
            out
        }
        PlaceholderStyle::Numbered => NUMBERED_PLACEHOLDER
            .replace_all(sql, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|index| vars.by_index.get(&index))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_owned())
            })
            .into_owned(),
        PlaceholderStyle::Named => NAMED_PLACEHOLDER
            .replace_all(sql, |caps: &Captures| {
                match vars.by_name.get(&caps[2][1..]) {
                    Some(literal) => format!("{}{}", &caps[1], literal),
                    None => caps[0].to_owned(),
                }
            })
            .into_owned(),
    }
}

/// Renders a query with every placeholder replaced by its argument as an
/// escaped SQL literal. Intended for logging and debugging, not for
/// execution; see [`expand_in`](crate::expand_in) for the binding path.
///
/// Three placeholder styles are recognized, in priority order: positional
/// `?`, numbered `$1`, and named `:identifier`. When none is present the
/// query comes back prefixed with `placeholder is undefined: ` instead of
/// being substituted, so logging call sites never fail.
///
/// Placeholders with no matching argument are left untouched, and
/// substituted text is never re-scanned, even when a literal itself contains
/// placeholder-like text.
///
/// # Examples
///
/// ```
/// use sqlx_params::{inline, params};
///
/// let sql = inline("$1, $2", &params![123, "test string"]);
/// assert_eq!(sql, "123, 'test string'");
/// ```
///
/// A single record or map argument binds by field name:
///
/// ```
/// use sqlx_params::{inline, Value};
///
/// let user = Value::Record(vec![
///     ("name".into(), Value::from("a")),
///     ("digit".into(), Value::from(7)),
/// ]);
/// assert_eq!(inline("(:name, :digit)", &[user]), "('a', 7)");
/// ```
pub fn inline(sql: &str, params: &[Value]) -> String {
    let Some(style) = detect(sql) else {
        return format!("{UNDEFINED_PLACEHOLDER}{sql}");
    };
    let vars = classify(params, style);
    render(sql, style, &vars)
}
