use sea_orm::{
    Condition,
    sea_query::{Alias, Expr, Func, LikeExpr, SimpleExpr},
};

use crate::core::{FieldDescriptor, FieldKind, GridRecord, Predicate};

// Basic safety limits
const MAX_SEARCH_QUERY_LENGTH: usize = 10_000;

/// Escape LIKE wildcards to prevent wildcard injection attacks
/// Escapes: % (match any) and _ (match single char)
pub(crate) fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\") // Escape backslash first
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Truncate on a char boundary
fn bounded(term: &str) -> &str {
    if term.len() <= MAX_SEARCH_QUERY_LENGTH {
        return term;
    }
    let mut end = MAX_SEARCH_QUERY_LENGTH;
    while !term.is_char_boundary(end) {
        end -= 1;
    }
    tracing::debug!(
        length = term.len(),
        kept = end,
        "Truncating over-long search term"
    );
    &term[..end]
}

/// Stores render these kinds as text differently from one another, so they
/// take no part in free-text search.
const fn is_searchable(kind: FieldKind) -> bool {
    !matches!(kind, FieldKind::Uuid)
}

/// The field as the text free-text search looks at. Nulls become `''`.
fn search_text(field: &FieldDescriptor) -> SimpleExpr {
    let col = || Expr::col(Alias::new(field.column()));
    match field.kind() {
        FieldKind::Bool => Expr::case(col().is_null(), "")
            .case(col().eq(true), "true")
            .finally("false")
            .into(),
        _ => {
            let as_text = Func::cast_as(col(), Alias::new("TEXT"));
            Func::coalesce([SimpleExpr::from(as_text), Expr::val("").into()]).into()
        }
    }
}

/// `UPPER(<text of col>) LIKE '%TERM%' ESCAPE '\'`
fn contains_condition(field: &FieldDescriptor, escaped_term: &str) -> SimpleExpr {
    Expr::expr(Func::upper(search_text(field)))
        .like(LikeExpr::new(format!("%{escaped_term}%")).escape('\\'))
}

/// Compile a free-text search over `fields`.
///
/// A record matches when any listed field, rendered as text (nulls as the
/// empty string), contains the term. Letters are compared ignoring ASCII
/// case only, which is what `UPPER` does on every supported store. Names that
/// do not resolve on `R` are skipped, as are UUID fields. A blank term, or no
/// searchable field, yields a predicate that accepts everything.
pub fn compile_search<R, S>(fields: &[S], term: &str) -> Predicate<R>
where
    R: GridRecord + 'static,
    S: AsRef<str>,
{
    let term = bounded(term.trim());
    if term.is_empty() {
        return Predicate::always();
    }

    let resolver = R::resolver();
    let resolved: Vec<FieldDescriptor> = fields
        .iter()
        .filter_map(|name| {
            let name = name.as_ref();
            let Some(field) = resolver.find(name) else {
                tracing::debug!(
                    record = resolver.record(),
                    field = name,
                    "Skipping unknown search field"
                );
                return None;
            };
            if !is_searchable(field.kind()) {
                tracing::debug!(
                    record = resolver.record(),
                    field = name,
                    kind = field.kind().name(),
                    "Skipping search field that has no portable text form"
                );
                return None;
            }
            Some(field.clone())
        })
        .collect();
    if resolved.is_empty() {
        return Predicate::always();
    }

    let needle = term.to_ascii_uppercase();
    let escaped = escape_like_wildcards(&needle);
    let condition = resolved.iter().fold(Condition::any(), |any, field| {
        any.add(contains_condition(field, &escaped))
    });

    Predicate::new(
        move |record: &R| {
            resolved.iter().any(|field| {
                field
                    .read(record)
                    .to_search_text()
                    .to_ascii_uppercase()
                    .contains(&needle)
            })
        },
        condition,
    )
}
