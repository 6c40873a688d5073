use crate::database::{is_unique_violation, Database, FromRow};
use anyhow::Result;
use larder::{FavoriteEntry, SaveOutcome};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

pub fn sqlite_current_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Our own record of a recipe, deduplicated by display name.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct InternalRecipe {
    pub recipe_id: i64,
    pub recipe_name: String,
    pub mealdb_id: Option<String>,
    pub created_on: String,
}

impl FromRow for InternalRecipe {
    /// Create a new recipe from an sql row, provided by rusqlite, using named columns.
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            recipe_id: row.get("recipe_id")?,
            recipe_name: row.get("recipe_name")?,
            mealdb_id: row.get("mealdb_id")?,
            created_on: row.get("created_on")?,
        })
    }
}

impl InternalRecipe {
    /// Find a recipe by its exact display name.
    pub fn find_by_name(db: &Database, recipe_name: &str) -> Result<Option<Self>> {
        Ok(db
            .collect_rows(
                "SELECT * FROM RecipeList WHERE recipe_name = ?",
                params![recipe_name],
            )?
            .pop())
    }

    pub fn get_by_id(db: &Database, recipe_id: i64) -> Result<Option<Self>> {
        Ok(db
            .collect_rows(
                "SELECT * FROM RecipeList WHERE recipe_id = ?",
                params![recipe_id],
            )?
            .pop())
    }

    /// Create the record for `recipe_name`, or return the one that already exists.
    ///
    /// Someone else may insert the same name between our lookup and our insert; the
    /// UNIQUE constraint on the name makes that harmless.
    pub fn find_or_create(
        db: &Database,
        recipe_name: &str,
        mealdb_id: Option<&str>,
    ) -> Result<Self> {
        {
            let conn = db.pool.get()?;
            conn.execute(
                "INSERT OR IGNORE INTO RecipeList (recipe_name, mealdb_id, created_on) VALUES (?, ?, ?)",
                params![recipe_name, mealdb_id, sqlite_current_timestamp()],
            )?;
        }
        Self::find_by_name(db, recipe_name)?
            .ok_or_else(|| anyhow::anyhow!("Recipe {recipe_name:?} vanished after insert"))
    }

    /// Record the catalog id on a recipe that was saved without one.
    pub fn backfill_mealdb_id(db: &Database, recipe_id: i64, mealdb_id: &str) -> Result<()> {
        let conn = db.pool.get()?;
        conn.execute(
            "UPDATE RecipeList SET mealdb_id = ? WHERE recipe_id = ? AND mealdb_id IS NULL",
            params![mealdb_id, recipe_id],
        )?;
        Ok(())
    }
}

/// The link between a user and one of their saved recipes.
pub struct Favorite;

impl FromRow for FavoriteEntry {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            recipe_id: row.get("recipe_id")?,
            recipe_name: row.get("recipe_name")?,
            mealdb_id: row.get("mealdb_id")?,
        })
    }
}

impl Favorite {
    /// Link a recipe to a user. A link that already exists is reported, not treated as an error.
    pub fn link(db: &Database, user_id: &str, recipe_id: i64) -> Result<SaveOutcome> {
        let conn = db.pool.get()?;
        match conn.execute(
            "INSERT INTO FavoritesList (user_id, recipe_id, created_on) VALUES (?, ?, ?)",
            params![user_id, recipe_id, sqlite_current_timestamp()],
        ) {
            Ok(_) => Ok(SaveOutcome::Saved),
            Err(e) if is_unique_violation(&e) => Ok(SaveOutcome::AlreadySaved),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a link. The recipe record itself stays, since other users may share it.
    pub fn unlink(db: &Database, user_id: &str, recipe_id: i64) -> Result<bool> {
        let conn = db.pool.get()?;
        let removed = conn.execute(
            "DELETE FROM FavoritesList WHERE user_id = ? AND recipe_id = ?",
            params![user_id, recipe_id],
        )?;
        Ok(removed > 0)
    }

    pub fn exists(db: &Database, user_id: &str, recipe_id: i64) -> Result<bool> {
        let conn = db.pool.get()?;
        Ok(conn
            .query_row(
                "SELECT 1 FROM FavoritesList WHERE user_id = ? AND recipe_id = ?",
                params![user_id, recipe_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some())
    }

    /// All of a user's favorites, oldest first.
    pub fn list_for_user(db: &Database, user_id: &str) -> Result<Vec<FavoriteEntry>> {
        db.collect_rows(
            "SELECT RecipeList.recipe_id, RecipeList.recipe_name, RecipeList.mealdb_id
            FROM FavoritesList
            JOIN RecipeList ON RecipeList.recipe_id = FavoritesList.recipe_id
            WHERE FavoritesList.user_id = ?
            ORDER BY FavoritesList.rowid",
            params![user_id],
        )
    }
}

/// A user's complaint about a catalog recipe.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Report {
    pub report_id: i64,
    pub user_id: String,
    pub mealdb_id: String,
    pub recipe_name: String,
    pub comment: Option<String>,
    pub created_on: String,
}

impl FromRow for Report {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            report_id: row.get("report_id")?,
            user_id: row.get("user_id")?,
            mealdb_id: row.get("mealdb_id")?,
            recipe_name: row.get("recipe_name")?,
            comment: row.get("comment")?,
            created_on: row.get("created_on")?,
        })
    }
}

impl Report {
    pub fn push(
        db: &Database,
        user_id: &str,
        mealdb_id: &str,
        recipe_name: &str,
        comment: Option<&str>,
    ) -> Result<i64> {
        let conn = db.pool.get()?;
        let comment = comment.map(str::trim).filter(|c| !c.is_empty());
        conn.execute(
            "INSERT INTO ReportList (user_id, mealdb_id, recipe_name, comment, created_on)
            VALUES (?, ?, ?, ?, ?)",
            params![user_id, mealdb_id, recipe_name, comment, sqlite_current_timestamp()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_for_recipe(db: &Database, mealdb_id: &str) -> Result<Vec<Report>> {
        db.collect_rows(
            "SELECT * FROM ReportList WHERE mealdb_id = ? ORDER BY report_id",
            params![mealdb_id],
        )
    }
}
