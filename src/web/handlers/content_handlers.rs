// src/web/handlers/content_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::core::Database;
use crate::models::{BlogPost, Resource};
use crate::repository::ContentRepository;
use crate::web::types::*;

pub async fn list_blog_posts_handler(
    category: Option<&str>,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<BlogPost>>> {
    let posts = ContentRepository::new(db.pool())
        .get_blog_posts(category)
        .await
        .map_err(|e| internal_error("Failed to load blog posts", &e))?;

    Ok(Json(DataResponse::success(
        format!("{} posts", posts.len()),
        posts,
        None,
    )))
}

pub async fn get_blog_post_handler(slug: &str, db: &State<Database>) -> ApiResult<DataResponse<BlogPost>> {
    let post = ContentRepository::new(db.pool())
        .get_blog_post(slug)
        .await
        .map_err(|e| internal_error("Failed to load blog post", &e))?
        .ok_or_else(|| not_found("Blog post"))?;

    Ok(Json(DataResponse::success(post.title.clone(), post, None)))
}

pub async fn list_resources_handler(
    category: Option<&str>,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<Resource>>> {
    let resources = ContentRepository::new(db.pool())
        .get_resources(category)
        .await
        .map_err(|e| internal_error("Failed to load resources", &e))?;

    Ok(Json(DataResponse::success(
        format!("{} resources", resources.len()),
        resources,
        None,
    )))
}
