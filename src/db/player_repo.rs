//! Player directory: CRUD, typeahead search and roster lookups.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{
    category_repo,
    models::{tag_strings, Availability, Gender, Player, Skill},
};
use crate::error::{AppError, AppResult};

const PLAYER_COLUMNS: &str = "id, name, email, avatar_url, skills, rating, gender, availability, \
                              bio, team_id, base_price, sold_price, created_at, updated_at";

const DUPLICATE_EMAIL: &str = "A player with this email already exists. Please use a different email.";

#[derive(Debug, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
    pub rating: String,
    pub gender: Gender,
    #[serde(default)]
    pub availability: Vec<Availability>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Partial update; `None` keeps the stored value. Email is immutable.
#[derive(Debug, Default, Deserialize)]
pub struct PlayerPatch {
    pub name: Option<String>,
    pub skills: Option<Vec<Skill>>,
    pub rating: Option<String>,
    pub gender: Option<Gender>,
    pub availability: Option<Vec<Availability>>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Everyone, newest first. This is also the auction running order.
pub async fn list_all(db: &PgPool) -> AppResult<Vec<Player>> {
    Ok(sqlx::query_as::<_, Player>(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await?)
}

pub async fn get(db: &PgPool, id: Uuid) -> AppResult<Option<Player>> {
    Ok(sqlx::query_as::<_, Player>(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?)
}

pub async fn list_by_team(db: &PgPool, team_id: Uuid) -> AppResult<Vec<Player>> {
    Ok(sqlx::query_as::<_, Player>(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players WHERE team_id = $1 ORDER BY name ASC"
    ))
    .bind(team_id)
    .fetch_all(db)
    .await?)
}

/// Case-insensitive substring match on the name, capped at `limit` rows.
pub async fn search(db: &PgPool, query: &str, limit: i64) -> AppResult<Vec<Player>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    Ok(sqlx::query_as::<_, Player>(&format!(
        "SELECT {PLAYER_COLUMNS}
           FROM players
          WHERE name ILIKE $1 ESCAPE '\\'
          ORDER BY name ASC
          LIMIT $2"
    ))
    .bind(format!("%{}%", escape_like(query)))
    .bind(limit)
    .fetch_all(db)
    .await?)
}

/// Insert a player; the unique index on `email` is what rejects duplicates.
pub async fn create(db: &PgPool, new: &NewPlayer) -> AppResult<Player> {
    let base_price = category_repo::get_by_name(db, &new.rating)
        .await?
        .map(|c| c.base_price);

    sqlx::query_as::<_, Player>(&format!(
        "INSERT INTO players
             (name, email, avatar_url, skills, rating, gender, availability, bio, base_price)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {PLAYER_COLUMNS}"
    ))
    .bind(new.name.trim())
    .bind(new.email.trim())
    .bind(new.avatar_url.as_deref())
    .bind(tag_strings(&new.skills, Skill::as_str))
    .bind(&new.rating)
    .bind(new.gender.as_str())
    .bind(tag_strings(&new.availability, Availability::as_str))
    .bind(new.bio.as_deref().unwrap_or(""))
    .bind(base_price)
    .fetch_one(db)
    .await
    .map_err(|e| AppError::from_constraint(e, DUPLICATE_EMAIL))
}

/// Merge `patch` into the stored row. A new rating re-derives `base_price`
/// from the category with that name (NULL when no such category exists).
pub async fn update(db: &PgPool, id: Uuid, patch: &PlayerPatch) -> AppResult<Player> {
    let derived_price = match &patch.rating {
        Some(rating) => category_repo::get_by_name(db, rating)
            .await?
            .map(|c| c.base_price),
        None => None,
    };

    sqlx::query_as::<_, Player>(&format!(
        "UPDATE players
            SET name         = COALESCE($2, name),
                skills       = COALESCE($3, skills),
                rating       = COALESCE($4, rating),
                gender       = COALESCE($5, gender),
                availability = COALESCE($6, availability),
                bio          = COALESCE($7, bio),
                avatar_url   = COALESCE($8, avatar_url),
                base_price   = CASE WHEN $4::TEXT IS NULL THEN base_price ELSE $9 END,
                updated_at   = NOW()
          WHERE id = $1
      RETURNING {PLAYER_COLUMNS}"
    ))
    .bind(id)
    .bind(patch.name.as_deref().map(str::trim))
    .bind(patch.skills.as_deref().map(|s| tag_strings(s, Skill::as_str)))
    .bind(patch.rating.as_deref())
    .bind(patch.gender.map(Gender::as_str))
    .bind(
        patch
            .availability
            .as_deref()
            .map(|a| tag_strings(a, Availability::as_str)),
    )
    .bind(patch.bio.as_deref())
    .bind(patch.avatar_url.as_deref())
    .bind(derived_price)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::NotFound("player"))
}

pub async fn set_avatar(db: &PgPool, id: Uuid, url: &str) -> AppResult<Player> {
    sqlx::query_as::<_, Player>(&format!(
        "UPDATE players SET avatar_url = $2, updated_at = NOW()
          WHERE id = $1
      RETURNING {PLAYER_COLUMNS}"
    ))
    .bind(id)
    .bind(url)
    .fetch_optional(db)
    .await?
    .ok_or(AppError::NotFound("player"))
}

/// Hard delete; there is no archive.
pub async fn delete(db: &PgPool, id: Uuid) -> AppResult<()> {
    let rows = sqlx::query("DELETE FROM players WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    if rows == 0 {
        Err(AppError::NotFound("player"))
    } else {
        Ok(())
    }
}

/// Escape LIKE wildcards so user input only ever matches literally.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl NewPlayer {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name is required".into()));
        }
        if !self.email.contains('@') {
            return Err(AppError::Validation("a valid email is required".into()));
        }
        if self.rating.trim().is_empty() {
            return Err(AppError::Validation("rating is required".into()));
        }
        if self.bio.as_deref().map_or(0, |b| b.chars().count()) > 500 {
            return Err(AppError::Validation("bio is limited to 500 characters".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
        assert_eq!(escape_like("virat"), "virat");
    }

    #[test]
    fn new_player_requires_email_shape() {
        let p = NewPlayer {
            name: "Rohit".into(),
            email: "rohit.example.com".into(),
            skills: vec![Skill::Batting],
            rating: "A".into(),
            gender: Gender::Male,
            availability: vec![],
            bio: None,
            avatar_url: None,
        };
        assert!(matches!(p.validate(), Err(AppError::Validation(_))));
    }
}
