use std::cmp::Ordering;

use crate::entities::movie;

/// Sort key for a stored rating, ordered the way SQLite orders mixed storage
/// classes: unset below every number, numbers below every text value.
#[derive(Clone, Debug, PartialEq)]
pub enum RatingKey<'a> {
    Unset,
    Number(f64),
    Text(&'a str),
}

impl Eq for RatingKey<'_> {}

impl Ord for RatingKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        use RatingKey::*;
        match (self, other) {
            (Unset, Unset) => Ordering::Equal,
            (Unset, _) => Ordering::Less,
            (_, Unset) => Ordering::Greater,
            (Number(a), Number(b)) => a.total_cmp(b),
            (Number(_), Text(_)) => Ordering::Less,
            (Text(_), Number(_)) => Ordering::Greater,
            (Text(a), Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for RatingKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn rating_key(rating: &Option<String>) -> RatingKey<'_> {
    let Some(raw) = rating.as_deref() else {
        return RatingKey::Unset;
    };
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => RatingKey::Number(n),
        _ => RatingKey::Text(raw),
    }
}

/// Orders movies best-first and stamps `ranking` 1..=n. Equal ratings keep
/// the older (lower id) movie first.
pub fn rank(mut movies: Vec<movie::Model>) -> Vec<movie::Model> {
    movies.sort_by(|a, b| {
        rating_key(&b.rating).cmp(&rating_key(&a.rating)).then_with(|| a.id.cmp(&b.id))
    });
    for (idx, movie) in movies.iter_mut().enumerate() {
        movie.ranking = Some(idx as i32 + 1);
    }
    movies
}
