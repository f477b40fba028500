use maud::{DOCTYPE, Markup, html};

use crate::{entities::movie, tmdb::SearchResult};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON_CLASS: &str =
    "w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";

pub fn index_page(movies: &[movie::Model], token: &str) -> String {
    page(
        "My Top Movies",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-4xl mx-auto px-6 py-12" {
                    div class="flex items-start justify-between gap-6" {
                        div {
                            h1 class="text-3xl font-bold text-gray-900" { "My Top Movies" }
                            p class="mt-2 text-gray-600" { "These are my all-time favourite movies." }
                        }
                        a class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" href="/add" { "Add Movie" }
                    }

                    @if movies.is_empty() {
                        div class="mt-10 bg-white shadow rounded-lg p-8" {
                            p class="text-gray-600" { "No movies yet. Add one to get started." }
                        }
                    } @else {
                        div class="mt-10 space-y-4" {
                            @for movie in movies {
                                (movie_card(movie, token))
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn edit_page(
    movie: &movie::Model,
    rating: &str,
    review: &str,
    error: Option<&str>,
    token: &str,
) -> String {
    page(
        "Edit Movie",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-2xl mx-auto px-6 py-12" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-3xl font-bold text-gray-900" { (movie.title) }
                        p class="mt-2 text-gray-600" { "Edit movie rating" }

                        (error_banner(error))

                        form class="mt-8 space-y-6" method="post" action="/edit" {
                            input type="hidden" name="id" value=(movie.id);
                            input type="hidden" name="csrf_token" value=(token);

                            div {
                                label class="block text-sm font-medium text-gray-700" for="rating" { "Your rating out of 10, e.g. 7.5" }
                                input class=(INPUT_CLASS) name="rating" id="rating" value=(rating) required;
                            }

                            div {
                                label class="block text-sm font-medium text-gray-700" for="review" { "Your review" }
                                input class=(INPUT_CLASS) name="review" id="review" value=(review) required;
                            }

                            button class=(BUTTON_CLASS) type="submit" { "Save" }
                        }
                        a class="mt-6 inline-block text-sm text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

pub fn add_page(title: &str, error: Option<&str>, token: &str) -> String {
    page(
        "Add Movie",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-2xl mx-auto px-6 py-12" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-3xl font-bold text-gray-900" { "Add a Movie" }

                        (error_banner(error))

                        form class="mt-8 space-y-6" method="post" action="/add" {
                            input type="hidden" name="csrf_token" value=(token);
                            div {
                                label class="block text-sm font-medium text-gray-700" for="title" { "Movie title" }
                                input class=(INPUT_CLASS) name="title" id="title" value=(title) required;
                            }
                            button class=(BUTTON_CLASS) type="submit" { "Add Movie" }
                        }
                        a class="mt-6 inline-block text-sm text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

pub fn select_page(query: &str, results: &[SearchResult]) -> String {
    page(
        "Select Movie",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-2xl mx-auto px-6 py-12" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-3xl font-bold text-gray-900" { "Select Movie" }
                        p class="mt-2 text-gray-600" { "Results for \"" (query) "\"" }

                        @if results.is_empty() {
                            p class="mt-6 text-gray-600" { "Nothing matched that title." }
                        } @else {
                            ul class="mt-6 divide-y divide-gray-200" {
                                @for result in results {
                                    li class="py-3" {
                                        a class="text-blue-600 hover:text-blue-800" href=(select_href(result)) {
                                            (result.title)
                                            @if !result.release_date.is_empty() {
                                                span class="ml-2 text-gray-500" { "- " (result.release_date) }
                                            }
                                        }
                                        @if !result.overview.is_empty() {
                                            p class="mt-1 text-sm text-gray-500 line-clamp-2" { (result.overview) }
                                        }
                                    }
                                }
                            }
                        }
                        a class="mt-6 inline-block text-sm text-blue-600 hover:text-blue-800" href="/add" { "Search again" }
                    }
                }
            }
        },
    )
}

pub fn error_page(message: String) -> String {
    page(
        "Error",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Error" }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}

fn error_banner(error: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = error {
            div class="mt-6 rounded-md border border-red-200 bg-red-50 px-4 py-3 text-sm text-red-700" { (message) }
        }
    }
}

fn movie_card(movie: &movie::Model, token: &str) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6 flex gap-6" {
            @if let Some(img) = &movie.img_url {
                img class="w-24 rounded" src=(img) alt=(movie.title);
            }
            div class="flex-1" {
                div class="flex items-start justify-between gap-4" {
                    h2 class="text-xl font-semibold text-gray-900" {
                        @if let Some(rank) = movie.ranking {
                            span class="mr-2 text-gray-400" { "#" (rank) }
                        }
                        (movie.title)
                        span class="ml-2 font-normal text-gray-500" { "(" (movie.year) ")" }
                    }
                    span class="text-lg font-semibold text-blue-600" {
                        (movie.rating.as_deref().unwrap_or("unrated"))
                    }
                }
                @if let Some(review) = &movie.review {
                    p class="mt-2 italic text-gray-700" { "\"" (review) "\"" }
                }
                @if let Some(description) = &movie.description {
                    p class="mt-2 text-sm text-gray-600" { (description) }
                }
                div class="mt-4 flex gap-4 text-sm" {
                    a class="text-blue-600 hover:text-blue-800" href=(format!("/edit?id={}", movie.id)) { "Update" }
                    form method="post" action="/delete" {
                        input type="hidden" name="id" value=(movie.id);
                        input type="hidden" name="csrf_token" value=(token);
                        button class="text-red-600 hover:text-red-800" type="submit" { "Delete" }
                    }
                }
            }
        }
    }
}

fn select_href(result: &SearchResult) -> String {
    format!(
        "/add/select?movie_id={}&release_date={}",
        result.id,
        urlencoding::encode(&result.release_date)
    )
}
