//! Demo catalog loaded into an empty database on request.

use tracing::info;

use crate::{
    models::{ValidCategory, ValidMovie},
    store::Catalog,
};

pub const CATEGORY_TITLES: [&str; 15] = [
    "Action",
    "Adventure",
    "Comedy",
    "Crime",
    "Mystery",
    "Fantasy",
    "Historical",
    "Horror",
    "Romance",
    "Satire",
    "Science fiction",
    "Speculative",
    "Thriller",
    "Western",
    "Other",
];

pub const MOVIE_COUNT: usize = 30;

/// Category positions linked to the `n`th movie, at most three and no repeats.
fn categories_for(n: usize) -> Vec<usize> {
    let mut picked = Vec::new();
    for step in 0..n % 4 {
        let idx = (n * 7 + step * 5) % CATEGORY_TITLES.len();
        if !picked.contains(&idx) {
            picked.push(idx);
        }
    }
    picked
}

/// Loads the demo catalog. Returns `false` without writing when data already exists.
pub async fn seed(catalog: &Catalog) -> anyhow::Result<bool> {
    if !catalog.is_empty().await? {
        info!("catalog already has data, skipping fixtures");
        return Ok(false);
    }

    let mut category_ids = Vec::with_capacity(CATEGORY_TITLES.len());
    for title in CATEGORY_TITLES {
        let category = catalog.insert_category(ValidCategory { title: title.to_string() }).await?;
        category_ids.push(category.id);
    }

    let released_at = jiff::Zoned::now().datetime().with().subsec_nanosecond(0).build()?;

    for n in 1..=MOVIE_COUNT {
        let movie = catalog
            .insert_movie(ValidMovie {
                title: format!("Movie : {n}"),
                description: format!("Movie description : {n}"),
                released_at,
                rating: Some((n % 6) as i32),
            })
            .await?;

        for idx in categories_for(n) {
            catalog.attach_category(movie.id, category_ids[idx]).await?;
        }
    }

    info!(categories = CATEGORY_TITLES.len(), movies = MOVIE_COUNT, "fixtures loaded");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_movie_gets_at_most_three_distinct_categories() {
        for n in 1..=MOVIE_COUNT {
            let picked = categories_for(n);
            assert!(picked.len() <= 3);
            let mut deduped = picked.clone();
            deduped.sort_unstable();
            deduped.dedup();
            assert_eq!(deduped.len(), picked.len());
            assert!(picked.iter().all(|&idx| idx < CATEGORY_TITLES.len()));
        }
    }

    #[test]
    fn assignment_is_deterministic() {
        assert_eq!(categories_for(3), categories_for(3));
        assert!(categories_for(4).is_empty());
    }
}
