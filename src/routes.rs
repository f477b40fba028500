use axum::{
    Router,
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::{WithRejection, cookie::SignedCookieJar};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::{
    AppState, csrf,
    error::{AppError, AppResult},
    templates,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/edit", get(edit_form).post(edit))
        .route("/delete", post(delete))
        .route("/add", get(add_form).post(add))
        .route("/add/select", get(select))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn index(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> AppResult<(SignedCookieJar, Html<String>)> {
    let movies = state.catalog.list_ranked().await?;
    let (jar, token) = csrf::issue(jar);
    Ok((jar, Html(templates::index_page(&movies, &token))))
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    id: i32,
}

pub async fn edit_form(
    State(state): State<AppState>,
    WithRejection(Query(q), _): WithRejection<Query<IdQuery>, AppError>,
    jar: SignedCookieJar,
) -> AppResult<(SignedCookieJar, Html<String>)> {
    let movie = state.catalog.begin_edit(q.id).await?;
    let rating = movie.rating.clone().unwrap_or_default();
    let review = movie.review.clone().unwrap_or_default();
    let (jar, token) = csrf::issue(jar);
    Ok((jar, Html(templates::edit_page(&movie, &rating, &review, None, &token))))
}

#[derive(Debug, Deserialize)]
pub struct EditForm {
    id: i32,
    #[serde(default)]
    rating: String,
    #[serde(default)]
    review: String,
    #[serde(default)]
    csrf_token: String,
}

pub async fn edit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    WithRejection(Form(form), _): WithRejection<Form<EditForm>, AppError>,
) -> AppResult<Response> {
    csrf::verify(&jar, &form.csrf_token)?;

    match state.catalog.apply_edit(form.id, &form.rating, &form.review).await {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(AppError::Validation(message)) => {
            let movie = state.catalog.begin_edit(form.id).await?;
            let (jar, token) = csrf::issue(jar);
            let body =
                templates::edit_page(&movie, &form.rating, &form.review, Some(&message), &token);
            Ok((jar, Html(body)).into_response())
        },
        Err(err) => Err(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    id: i32,
    #[serde(default)]
    csrf_token: String,
}

pub async fn delete(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    WithRejection(Form(form), _): WithRejection<Form<DeleteForm>, AppError>,
) -> AppResult<Redirect> {
    csrf::verify(&jar, &form.csrf_token)?;
    state.catalog.delete_by_id(form.id).await?;
    Ok(Redirect::to("/"))
}

pub async fn add_form(jar: SignedCookieJar) -> (SignedCookieJar, Html<String>) {
    let (jar, token) = csrf::issue(jar);
    (jar, Html(templates::add_page("", None, &token)))
}

#[derive(Debug, Deserialize)]
pub struct AddForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    csrf_token: String,
}

pub async fn add(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    WithRejection(Form(form), _): WithRejection<Form<AddForm>, AppError>,
) -> AppResult<Response> {
    csrf::verify(&jar, &form.csrf_token)?;

    let title = form.title.trim();
    if title.is_empty() {
        let (jar, token) = csrf::issue(jar);
        let body = templates::add_page("", Some("movie title is required"), &token);
        return Ok((jar, Html(body)).into_response());
    }

    let results = state.catalog.search_external(title).await?;
    Ok(Html(templates::select_page(title, &results)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct SelectQuery {
    movie_id: i32,
    #[serde(default)]
    release_date: String,
}

pub async fn select(
    State(state): State<AppState>,
    WithRejection(Query(q), _): WithRejection<Query<SelectQuery>, AppError>,
) -> AppResult<Redirect> {
    let id = state.catalog.create_from_external_lookup(q.movie_id, &q.release_date).await?;
    Ok(Redirect::to(&format!("/edit?id={id}")))
}
