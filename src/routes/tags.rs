use crate::error::AppError;
use axum::{Json, extract::State};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};

pub const POPULAR_TAG_LIMIT: usize = 10;

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

/// Rank tags by the number of posts carrying them, descending, ties kept in
/// first-appearance order, truncated to the top ten. A tag repeated within
/// one post counts once.
pub fn rank_tags(tag_lists: &[Vec<String>]) -> Vec<TagCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, i64> = HashMap::new();

    for tags in tag_lists {
        let mut seen = HashSet::new();
        for tag in tags {
            if !seen.insert(tag.as_str()) {
                continue;
            }
            let count = counts.entry(tag.clone()).or_insert_with(|| {
                order.push(tag.clone());
                0
            });
            *count += 1;
        }
    }

    let mut ranked: Vec<TagCount> = order
        .into_iter()
        .map(|tag| TagCount {
            count: counts[&tag],
            tag,
        })
        .collect();
    // Stable sort, so equal counts keep their first-appearance order.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(POPULAR_TAG_LIMIT);

    ranked
}

pub async fn fetch_popular_tags(pool: &PgPool) -> Result<Vec<TagCount>, AppError> {
    let rows = sqlx::query_scalar::<_, serde_json::Value>("SELECT tags FROM posts")
        .fetch_all(pool)
        .await?;

    let tag_lists: Vec<Vec<String>> = rows
        .into_iter()
        .map(|value| serde_json::from_value(value).unwrap_or_default())
        .collect();

    Ok(rank_tags(&tag_lists))
}

pub async fn popular_tags(State(pool): State<PgPool>) -> Result<Json<Vec<TagCount>>, AppError> {
    Ok(Json(fetch_popular_tags(&pool).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists(input: &[&[&str]]) -> Vec<Vec<String>> {
        input
            .iter()
            .map(|tags| tags.iter().map(|t| t.to_string()).collect())
            .collect()
    }

    #[test]
    fn counts_each_tag_once_per_post() {
        let ranked = rank_tags(&lists(&[&["a", "a", "b"], &["a", "c"]]));
        assert_eq!(ranked[0].tag, "a");
        assert_eq!(ranked[0].count, 2);
        assert_eq!(ranked[1].tag, "b");
        assert_eq!(ranked[1].count, 1);
        assert_eq!(ranked[2].tag, "c");
        assert_eq!(ranked[2].count, 1);
    }

    #[test]
    fn ties_keep_first_appearance_order() {
        let ranked = rank_tags(&lists(&[&["z", "m"], &["m", "a"], &["z"]]));
        assert_eq!(ranked[0].tag, "z");
        assert_eq!(ranked[1].tag, "m");
        assert_eq!(ranked[2].tag, "a");
    }

    #[test]
    fn no_tags_yields_empty() {
        assert!(rank_tags(&[]).is_empty());
        assert!(rank_tags(&lists(&[&[], &[]])).is_empty());
    }

    #[test]
    fn truncates_to_top_ten() {
        let many: Vec<Vec<String>> = (0..15).map(|i| vec![format!("tag{i}")]).collect();
        assert_eq!(rank_tags(&many).len(), POPULAR_TAG_LIMIT);
    }
}
