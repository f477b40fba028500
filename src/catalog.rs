use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set, SqlErr, TransactionTrait, sea_query::Expr,
};
use tracing::{debug, info};

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    ranking,
    tmdb::{MovieLookup, SearchResult},
};

/// The movie list: storage plus the movie database new entries come from.
pub struct Catalog<L> {
    db: DatabaseConnection,
    lookup: L,
    image_base_url: String,
}

impl<L: MovieLookup> Catalog<L> {
    pub fn new(db: DatabaseConnection, lookup: L, image_base_url: String) -> Self {
        Self { db, lookup, image_base_url }
    }

    /// Every movie, best rated first, with `ranking` recomputed and saved.
    pub async fn list_ranked(&self) -> AppResult<Vec<movie::Model>> {
        let movies = movie::Entity::find().all(&self.db).await?;
        let previous: HashMap<i32, Option<i32>> =
            movies.iter().map(|m| (m.id, m.ranking)).collect();

        let ranked = ranking::rank(movies);
        let stale: Vec<&movie::Model> =
            ranked.iter().filter(|m| previous.get(&m.id) != Some(&m.ranking)).collect();

        if !stale.is_empty() {
            let txn = self.db.begin().await?;
            for m in &stale {
                movie::Entity::update_many()
                    .col_expr(movie::Column::Ranking, Expr::value(m.ranking))
                    .filter(movie::Column::Id.eq(m.id))
                    .exec(&txn)
                    .await?;
            }
            txn.commit().await?;
        }

        debug!(total = ranked.len(), rewritten = stale.len(), "ranked movie list");
        Ok(ranked)
    }

    pub async fn begin_edit(&self, id: i32) -> AppResult<movie::Model> {
        self.find(id).await
    }

    /// Both inputs must be non-blank; the rating is stored exactly as given,
    /// numeric or not.
    pub async fn apply_edit(&self, id: i32, rating: &str, review: &str) -> AppResult<()> {
        if rating.trim().is_empty() {
            return Err(AppError::Validation("rating is required".into()));
        }
        if review.trim().is_empty() {
            return Err(AppError::Validation("review is required".into()));
        }

        let mut active = self.find(id).await?.into_active_model();
        active.rating = Set(Some(rating.to_string()));
        active.review = Set(Some(review.to_string()));
        active.update(&self.db).await?;

        info!(id, rating, "movie rating updated");
        Ok(())
    }

    pub async fn delete_by_id(&self, id: i32) -> AppResult<()> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound(id));
        }
        info!(id, "movie deleted");
        Ok(())
    }

    /// Adds the TMDB movie `tmdb_id` and returns the new local id. Only the part
    /// of `release_date` before the first `-` is read, as the year.
    pub async fn create_from_external_lookup(
        &self,
        tmdb_id: i32,
        release_date: &str,
    ) -> AppResult<i32> {
        let year = parse_year(release_date)?;
        let details = self.lookup.details(tmdb_id).await?;

        let title = details.original_title;
        let model = movie::ActiveModel {
            title: Set(title.clone()),
            year: Set(year),
            description: Set(Some(details.overview)),
            img_url: Set(Some(format!(
                "{}{}",
                self.image_base_url,
                details.poster_path.as_deref().unwrap_or_default()
            ))),
            ..Default::default()
        };

        let res = movie::Entity::insert(model).exec(&self.db).await.map_err(|err| {
            if is_unique_violation(&err) { AppError::DuplicateTitle(title.clone()) } else { err.into() }
        })?;

        info!(id = res.last_insert_id, tmdb_id, title = %title, year, "movie added");
        Ok(res.last_insert_id)
    }

    pub async fn search_external(&self, query: &str) -> AppResult<Vec<SearchResult>> {
        self.lookup.search(query).await
    }

    async fn find(&self, id: i32) -> AppResult<movie::Model> {
        movie::Entity::find_by_id(id).one(&self.db).await?.ok_or(AppError::NotFound(id))
    }
}

fn parse_year(release_date: &str) -> AppResult<i32> {
    let head = release_date.split('-').next().unwrap_or_default();
    head.trim().parse().map_err(|_| {
        AppError::Validation(format!("release date {release_date:?} does not start with a year"))
    })
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, tmdb::MovieDetails};

    struct FakeLookup {
        movies: Vec<MovieDetails>,
    }

    impl FakeLookup {
        fn new() -> Self {
            let details = |id: i32, title: &str, poster: Option<&str>| MovieDetails {
                id,
                original_title: title.to_string(),
                overview: format!("About {title}"),
                poster_path: poster.map(str::to_string),
            };
            Self {
                movies: vec![
                    details(1, "The Matrix", Some("/matrix.jpg")),
                    details(2, "Heat", Some("/heat.jpg")),
                    details(3, "Alien", Some("/alien.jpg")),
                    details(4, "Posterless", None),
                    // A second TMDB entry carrying an already-used title.
                    details(5, "The Matrix", Some("/other.jpg")),
                ],
            }
        }
    }

    impl MovieLookup for FakeLookup {
        async fn search(&self, query: &str) -> AppResult<Vec<SearchResult>> {
            Ok(self
                .movies
                .iter()
                .filter(|m| m.original_title.contains(query))
                .map(|m| SearchResult {
                    id: m.id,
                    title: m.original_title.clone(),
                    original_title: m.original_title.clone(),
                    release_date: "2000-01-01".to_string(),
                    overview: m.overview.clone(),
                    poster_path: m.poster_path.clone(),
                })
                .collect())
        }

        async fn details(&self, tmdb_id: i32) -> AppResult<MovieDetails> {
            self.movies
                .iter()
                .find(|m| m.id == tmdb_id)
                .cloned()
                .ok_or_else(|| AppError::External(anyhow::anyhow!("404 from fake lookup")))
        }
    }

    async fn catalog() -> Catalog<FakeLookup> {
        let db = db::connect_and_migrate("sqlite::memory:").await.unwrap();
        Catalog::new(db, FakeLookup::new(), "https://img.test/w500".to_string())
    }

    async fn all(catalog: &Catalog<FakeLookup>) -> Vec<movie::Model> {
        let mut movies = movie::Entity::find().all(&catalog.db).await.unwrap();
        movies.sort_by_key(|m| m.id);
        movies
    }

    #[tokio::test]
    async fn create_reads_year_and_builds_poster_url() {
        let catalog = catalog().await;
        let id = catalog.create_from_external_lookup(1, "1999-03-05").await.unwrap();

        let movie = catalog.begin_edit(id).await.unwrap();
        assert_eq!(movie.title, "The Matrix");
        assert_eq!(movie.year, 1999);
        assert_eq!(movie.description.as_deref(), Some("About The Matrix"));
        assert_eq!(movie.img_url.as_deref(), Some("https://img.test/w500/matrix.jpg"));
        assert_eq!(movie.rating, None);
        assert_eq!(movie.review, None);
        assert_eq!(movie.ranking, None);
    }

    #[tokio::test]
    async fn create_without_poster_keeps_bare_base_url() {
        let catalog = catalog().await;
        let id = catalog.create_from_external_lookup(4, "2010").await.unwrap();
        let movie = catalog.begin_edit(id).await.unwrap();
        assert_eq!(movie.year, 2010);
        assert_eq!(movie.img_url.as_deref(), Some("https://img.test/w500"));
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected_and_not_stored() {
        let catalog = catalog().await;
        catalog.create_from_external_lookup(1, "1999-03-31").await.unwrap();

        let err = catalog.create_from_external_lookup(5, "2021-12-22").await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateTitle(ref t) if t == "The Matrix"), "{err:?}");
        assert_eq!(all(&catalog).await.len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_release_date_without_year() {
        let catalog = catalog().await;
        let err = catalog.create_from_external_lookup(1, "").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(all(&catalog).await.is_empty());
    }

    #[tokio::test]
    async fn create_propagates_lookup_failure() {
        let catalog = catalog().await;
        let err = catalog.create_from_external_lookup(99, "2001-01-01").await.unwrap_err();
        assert!(matches!(err, AppError::External(_)));
        assert!(all(&catalog).await.is_empty());
    }

    #[tokio::test]
    async fn list_ranks_by_rating_and_persists() {
        let catalog = catalog().await;
        let a = catalog.create_from_external_lookup(2, "1995-12-15").await.unwrap();
        let b = catalog.create_from_external_lookup(1, "1999-03-31").await.unwrap();
        let c = catalog.create_from_external_lookup(3, "1979-05-25").await.unwrap();
        catalog.apply_edit(a, "8.5", "Tense").await.unwrap();
        catalog.apply_edit(b, "9.0", "Whoa").await.unwrap();

        let ranked = catalog.list_ranked().await.unwrap();
        let order: Vec<(i32, Option<i32>)> = ranked.iter().map(|m| (m.id, m.ranking)).collect();
        assert_eq!(order, vec![(b, Some(1)), (a, Some(2)), (c, Some(3))]);

        let stored: Vec<Option<i32>> = all(&catalog).await.iter().map(|m| m.ranking).collect();
        assert_eq!(stored, vec![Some(2), Some(1), Some(3)]);
    }

    #[tokio::test]
    async fn listing_twice_gives_same_ranks() {
        let catalog = catalog().await;
        for (tmdb_id, rating) in [(1, "6"), (2, "6"), (3, "7")] {
            let id = catalog.create_from_external_lookup(tmdb_id, "2000-01-01").await.unwrap();
            catalog.apply_edit(id, rating, "ok").await.unwrap();
        }

        let first = catalog.list_ranked().await.unwrap();
        let second = catalog.list_ranked().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn edit_stores_input_verbatim_and_reorders() {
        let catalog = catalog().await;
        let a = catalog.create_from_external_lookup(2, "1995-12-15").await.unwrap();
        let b = catalog.create_from_external_lookup(1, "1999-03-31").await.unwrap();
        catalog.apply_edit(a, "8.5", "Tense").await.unwrap();
        catalog.apply_edit(b, "9.0", "Whoa").await.unwrap();
        assert_eq!(catalog.list_ranked().await.unwrap()[0].id, b);

        catalog.apply_edit(a, "9.5", "Great").await.unwrap();
        let movie = catalog.begin_edit(a).await.unwrap();
        assert_eq!(movie.rating.as_deref(), Some("9.5"));
        assert_eq!(movie.review.as_deref(), Some("Great"));

        let ranked = catalog.list_ranked().await.unwrap();
        assert_eq!(ranked[0].id, a);
        assert_eq!(ranked[0].ranking, Some(1));
    }

    #[tokio::test]
    async fn edit_accepts_non_numeric_rating() {
        let catalog = catalog().await;
        let id = catalog.create_from_external_lookup(3, "1979-05-25").await.unwrap();
        catalog.apply_edit(id, "ten out of ten", "Scary").await.unwrap();
        let movie = catalog.begin_edit(id).await.unwrap();
        assert_eq!(movie.rating.as_deref(), Some("ten out of ten"));
    }

    #[tokio::test]
    async fn edit_requires_both_fields() {
        let catalog = catalog().await;
        let id = catalog.create_from_external_lookup(3, "1979-05-25").await.unwrap();

        assert!(matches!(catalog.apply_edit(id, "  ", "fine").await, Err(AppError::Validation(_))));
        assert!(matches!(catalog.apply_edit(id, "7", "").await, Err(AppError::Validation(_))));
        assert_eq!(catalog.begin_edit(id).await.unwrap().rating, None);
    }

    #[tokio::test]
    async fn edit_of_unknown_id_is_not_found_and_changes_nothing() {
        let catalog = catalog().await;
        let id = catalog.create_from_external_lookup(2, "1995-12-15").await.unwrap();
        let before = all(&catalog).await;

        let err = catalog.apply_edit(id + 100, "7.5", "Great").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(missing) if missing == id + 100));
        assert_eq!(all(&catalog).await, before);
        assert!(matches!(catalog.begin_edit(id + 100).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_only_target() {
        let catalog = catalog().await;
        let a = catalog.create_from_external_lookup(1, "1999-03-31").await.unwrap();
        let b = catalog.create_from_external_lookup(2, "1995-12-15").await.unwrap();
        let c = catalog.create_from_external_lookup(3, "1979-05-25").await.unwrap();
        catalog.apply_edit(c, "8", "Classic").await.unwrap();
        catalog.list_ranked().await.unwrap();

        let before = all(&catalog).await;
        catalog.delete_by_id(b).await.unwrap();
        let after = all(&catalog).await;

        let expected: Vec<movie::Model> = before.into_iter().filter(|m| m.id != b).collect();
        assert_eq!(after, expected);
        assert_eq!(after.iter().map(|m| m.id).collect::<Vec<_>>(), vec![a, c]);
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_not_found() {
        let catalog = catalog().await;
        assert!(matches!(catalog.delete_by_id(7).await, Err(AppError::NotFound(7))));
    }

    #[tokio::test]
    async fn search_returns_lookup_results_untouched() {
        let catalog = catalog().await;
        let results = catalog.search_external("The Matrix").await.unwrap();
        assert_eq!(results.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 5]);
        assert!(catalog.search_external("Nothing").await.unwrap().is_empty());
    }

    #[test]
    fn year_is_text_before_first_dash() {
        assert_eq!(parse_year("1999-03-05").unwrap(), 1999);
        assert_eq!(parse_year("2024").unwrap(), 2024);
        assert_eq!(parse_year("1999-whatever").unwrap(), 1999);
        assert!(parse_year("March 1999").is_err());
    }
}
