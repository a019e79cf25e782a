use crate::{
    error::{ApiError, QueryError},
    schema::{ShoplistRow, Uuid},
};

use sqlx::{Pool, Postgres};

/// Sums ingredient amounts over every recipe in the user's shopping
/// list, grouped by (name, measurement unit) and sorted by name so the
/// rendered list is reproducible.
pub async fn aggregate_shopping_list(
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<ShoplistRow>, ApiError> {
    let rows: Vec<ShoplistRow> = sqlx::query_as(
        "
        SELECT i.name AS name, i.measurement_unit AS measurement_unit, SUM(ri.amount)::BIGINT AS amount
        FROM shopping_list s
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = s.recipe_id
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE s.user_id = $1
        GROUP BY i.name, i.measurement_unit
        ORDER BY i.name
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| QueryError::from(e).into())?;

    Ok(rows)
}

/// One line per aggregated group: `<name> (<unit>) — <amount>`.
pub fn format_shopping_list(rows: &[ShoplistRow]) -> String {
    rows.iter()
        .map(|row| format!("{} ({}) — {}", row.name, row.measurement_unit, row.amount))
        .collect::<Vec<String>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, unit: &str, amount: i64) -> ShoplistRow {
        ShoplistRow {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn summed_group_renders_single_line() {
        // Flour 200 g + Flour 300 g arrives pre-summed from the query.
        let lines = format_shopping_list(&[row("Flour", "g", 500)]);
        assert_eq!(lines, "Flour (g) — 500");
    }

    #[test]
    fn groups_render_one_line_each() {
        let rendered = format_shopping_list(&[
            row("Flour", "g", 500),
            row("Milk", "ml", 250),
            row("Salt", "g", 5),
        ]);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.contains(&"Flour (g) — 500"));
        assert!(lines.contains(&"Milk (ml) — 250"));
        assert!(lines.contains(&"Salt (g) — 5"));
    }

    #[test]
    fn empty_list_renders_empty_string() {
        assert_eq!(format_shopping_list(&[]), "");
    }
}
