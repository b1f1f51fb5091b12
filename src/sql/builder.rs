//! Builds parameterized SELECT, COUNT, INSERT, UPDATE, DELETE for the pokemon table.

use crate::model::{NewPokemon, PokemonChanges, PokemonId};
use crate::service::query::{Filters, ListQuery};
use crate::sql::PgBindValue;

pub const POKEMON_TABLE: &str = "pokemon";

/// Column list shared across queries; matches `model::Pokemon`.
pub const POKEMON_COLUMNS: &str = "id, name, height, weight, image, owner_id, created_at, updated_at";

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Bind a value and return its cast placeholder (e.g. `$2::int4`).
    fn push_param(&mut self, v: impl Into<PgBindValue>, pg_type: &str) -> String {
        self.params.push(v.into());
        format!("${}::{}", self.params.len(), pg_type)
    }
}

/// Escape LIKE wildcards so user input only ever matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn where_clause(filters: &Filters, q: &mut QueryBuf) -> String {
    let mut parts = Vec::new();
    if let Some(name) = &filters.name {
        let ph = q.push_param(format!("%{}%", escape_like(name)), "text");
        parts.push(format!("name ILIKE {} ESCAPE '\\'", ph));
    }
    let bounds = [
        ("height", ">=", filters.min_height),
        ("height", "<=", filters.max_height),
        ("weight", ">=", filters.min_weight),
        ("weight", "<=", filters.max_weight),
    ];
    for (col, op, bound) in bounds {
        if let Some(v) = bound {
            let ph = q.push_param(v, "int4");
            parts.push(format!("{} {} {}", col, op, ph));
        }
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// One page of records. Sorted by the requested field with `id` as tie-breaker, else by `id`.
pub fn select_page(query: &ListQuery) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&query.filters, &mut q);
    let order_sql = match query.sort {
        Some(sort) => format!(" ORDER BY {} {}, id ASC", sort.field.column(), sort.order.keyword()),
        None => " ORDER BY id ASC".to_string(),
    };
    let limit_ph = q.push_param(i64::from(query.limit), "int8");
    let offset_ph = q.push_param(query.offset() as i64, "int8");
    q.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT {} OFFSET {}",
        POKEMON_COLUMNS, POKEMON_TABLE, where_sql, order_sql, limit_ph, offset_ph
    );
    q
}

/// COUNT over the same predicate as [`select_page`].
pub fn count(filters: &Filters) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(filters, &mut q);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", POKEMON_TABLE, where_sql);
    q
}

pub fn select_by_id(id: PokemonId) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_param(id, "int8");
    q.sql = format!("SELECT {} FROM {} WHERE id = {}", POKEMON_COLUMNS, POKEMON_TABLE, ph);
    q
}

pub fn select_nav_index() -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT id, name FROM {} ORDER BY id ASC", POKEMON_TABLE);
    q
}

/// INSERT one record. With `skip_duplicates` a name collision inserts nothing instead of failing.
pub fn insert(input: &NewPokemon, skip_duplicates: bool) -> QueryBuf {
    let mut q = QueryBuf::new();
    let values = [
        q.push_param(input.name.clone(), "text"),
        q.push_param(input.height, "int4"),
        q.push_param(input.weight, "int4"),
        q.push_param(input.image.clone(), "text"),
        q.push_param(input.owner_id.clone(), "text"),
    ];
    let conflict = if skip_duplicates {
        " ON CONFLICT (name) DO NOTHING"
    } else {
        ""
    };
    q.sql = format!(
        "INSERT INTO {} (name, height, weight, image, owner_id) VALUES ({}){} RETURNING {}",
        POKEMON_TABLE,
        values.join(", "),
        conflict,
        POKEMON_COLUMNS
    );
    q
}

/// UPDATE by id: SET only fields present in `changes`, always touching `updated_at`.
pub fn update(id: PokemonId, changes: &PokemonChanges) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    if let Some(name) = &changes.name {
        let ph = q.push_param(name.clone(), "text");
        sets.push(format!("name = {}", ph));
    }
    if let Some(height) = changes.height {
        let ph = q.push_param(height, "int4");
        sets.push(format!("height = {}", ph));
    }
    if let Some(weight) = changes.weight {
        let ph = q.push_param(weight, "int4");
        sets.push(format!("weight = {}", ph));
    }
    if let Some(image) = &changes.image {
        let ph = q.push_param(image.clone(), "text");
        sets.push(format!("image = {}", ph));
    }
    sets.push("updated_at = NOW()".to_string());
    let id_ph = q.push_param(id, "int8");
    q.sql = format!(
        "UPDATE {} SET {} WHERE id = {} RETURNING {}",
        POKEMON_TABLE,
        sets.join(", "),
        id_ph,
        POKEMON_COLUMNS
    );
    q
}

pub fn delete(id: PokemonId) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_param(id, "int8");
    q.sql = format!("DELETE FROM {} WHERE id = {} RETURNING {}", POKEMON_TABLE, ph, POKEMON_COLUMNS);
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::query::{Sort, SortField, SortOrder};

    fn list_query(filters: Filters, sort: Option<Sort>, page: u32, limit: u32) -> ListQuery {
        ListQuery {
            filters,
            sort,
            page,
            limit,
        }
    }

    #[test]
    fn page_without_filters_orders_by_id() {
        let q = select_page(&list_query(Filters::default(), None, 2, 20));
        assert_eq!(
            q.sql,
            format!(
                "SELECT {} FROM pokemon ORDER BY id ASC LIMIT $1::int8 OFFSET $2::int8",
                POKEMON_COLUMNS
            )
        );
        assert_eq!(q.params, vec![PgBindValue::I64(20), PgBindValue::I64(20)]);
    }

    #[test]
    fn page_and_count_share_predicate() {
        let filters = Filters {
            name: Some("a_b%".into()),
            min_height: Some(3),
            max_weight: Some(90),
            ..Default::default()
        };
        let sort = Some(Sort {
            field: SortField::Height,
            order: SortOrder::Desc,
        });
        let page = select_page(&list_query(filters.clone(), sort, 1, 10));
        let total = count(&filters);
        let expected_where = " WHERE name ILIKE $1::text ESCAPE '\\' AND height >= $2::int4 AND weight <= $3::int4";
        assert!(page.sql.contains(expected_where), "{}", page.sql);
        assert!(page.sql.contains("ORDER BY height DESC, id ASC"));
        assert_eq!(total.sql, format!("SELECT COUNT(*) FROM pokemon{}", expected_where));
        assert_eq!(page.params[..3], total.params[..]);
        assert_eq!(total.params[0], PgBindValue::Text("%a\\_b\\%%".into()));
    }

    #[test]
    fn update_sets_only_present_fields() {
        let q = update(
            4,
            &PokemonChanges {
                weight: Some(12),
                image: Some(None),
                ..Default::default()
            },
        );
        assert_eq!(
            q.sql,
            format!(
                "UPDATE pokemon SET weight = $1::int4, image = $2::text, updated_at = NOW() WHERE id = $3::int8 RETURNING {}",
                POKEMON_COLUMNS
            )
        );
        assert_eq!(q.params, vec![PgBindValue::I32(12), PgBindValue::Null, PgBindValue::I64(4)]);
    }

    #[test]
    fn seed_insert_skips_duplicates() {
        let input = NewPokemon {
            name: "bulbasaur".into(),
            height: 7,
            weight: 69,
            image: None,
            owner_id: None,
        };
        assert!(insert(&input, true).sql.contains("ON CONFLICT (name) DO NOTHING"));
        assert!(!insert(&input, false).sql.contains("ON CONFLICT"));
        assert_eq!(insert(&input, false).params.len(), 5);
    }
}
