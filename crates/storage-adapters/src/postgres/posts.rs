use async_trait::async_trait;
use chrono::Utc;
use domains::{Comment, DomainResult, Post, PostRepository, Reaction};
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use uuid::Uuid;

use super::db_error;

macro_rules! post_columns {
    () => {
        "id, title, content, likes, dislikes, comments, author_id, created_at, updated_at"
    };
}

const LIKE_SQL: &str = concat!(
    "UPDATE posts SET likes = likes + 1 WHERE id = $1 RETURNING ",
    post_columns!()
);
const DISLIKE_SQL: &str = concat!(
    "UPDATE posts SET dislikes = dislikes + 1 WHERE id = $1 RETURNING ",
    post_columns!()
);

pub struct PgPostRepo {
    pool: PgPool,
}

impl PgPostRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn post_from_row(row: &PgRow) -> Result<Post, sqlx::Error> {
    let Json(comments): Json<Vec<Comment>> = row.try_get("comments")?;
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        likes: row.try_get("likes")?,
        dislikes: row.try_get("dislikes")?,
        comments,
        author_id: row.try_get("author_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn optional_post(row: Option<PgRow>) -> DomainResult<Option<Post>> {
    row.as_ref().map(post_from_row).transpose().map_err(db_error)
}

#[async_trait]
impl PostRepository for PgPostRepo {
    async fn insert(&self, post: Post) -> DomainResult<Post> {
        sqlx::query(concat!(
            "INSERT INTO posts (",
            post_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.likes)
        .bind(post.dislikes)
        .bind(Json(&post.comments))
        .bind(post.author_id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(post)
    }

    async fn list(&self) -> DomainResult<Vec<Post>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            post_columns!(),
            " FROM posts ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter()
            .map(post_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Post>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            post_columns!(),
            " FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        optional_post(row)
    }

    async fn update_content(
        &self,
        id: Uuid,
        title: String,
        content: String,
    ) -> DomainResult<Option<Post>> {
        let row = sqlx::query(concat!(
            "UPDATE posts SET title = $2, content = $3, updated_at = $4 WHERE id = $1 RETURNING ",
            post_columns!()
        ))
        .bind(id)
        .bind(title)
        .bind(content)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        optional_post(row)
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn increment(&self, id: Uuid, reaction: Reaction) -> DomainResult<Option<Post>> {
        let sql = match reaction {
            Reaction::Like => LIKE_SQL,
            Reaction::Dislike => DISLIKE_SQL,
        };

        let row = sqlx::query(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        optional_post(row)
    }

    /// `jsonb || jsonb` on two arrays appends, so the new comment always
    /// lands after every comment committed before it.
    async fn push_comment(&self, id: Uuid, comment: Comment) -> DomainResult<Option<Post>> {
        let row = sqlx::query(concat!(
            "UPDATE posts SET comments = comments || $2 WHERE id = $1 RETURNING ",
            post_columns!()
        ))
        .bind(id)
        .bind(Json([comment]))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        optional_post(row)
    }
}
