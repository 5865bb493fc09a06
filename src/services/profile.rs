// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profiles, skill associations and user search.

use crate::db::{SqliteDb, UserSearch};
use crate::error::AppError;
use crate::models::skill::split_by_direction;
use crate::models::{RatingSummary, Role, Skill, SkillDirection, SkillRef, User, UserSkill};
use crate::time_utils::format_utc_rfc3339;
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use validator::Validate;

/// Default search page size.
pub const DEFAULT_PAGE_SIZE: u32 = 12;
/// Largest page a client may ask for.
pub const MAX_PAGE_SIZE: u32 = 100;

const MAX_SKILL_NAME_LENGTH: usize = 100;

// ─── Request Types ───────────────────────────────────────────

/// Reference to a catalog skill, by id or by name.
///
/// Unknown names are added to the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillInput {
    #[serde(default, alias = "skill_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of `POST /users/skills`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddSkillRequest {
    #[serde(flatten)]
    pub skill: SkillInput,
    #[serde(rename = "type")]
    pub direction: SkillDirection,
}

/// Present-but-null JSON fields become `Some(None)`; absent ones stay `None`
/// through `#[serde(default)]`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial profile update. Absent fields are left unchanged, `null` clears
/// the nullable ones, and present skill lists replace the whole set for
/// that direction.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters long."))]
    pub name: Option<String>,
    /// `Some(None)` clears the stored value.
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(max = 200))]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(url(message = "Profile photo must be a URL."))]
    pub profile_photo: Option<Option<String>>,
    pub is_public: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(max = 100))]
    pub availability: Option<Option<String>>,
    pub skills_offered: Option<Vec<SkillInput>>,
    pub skills_wanted: Option<Vec<SkillInput>>,
}

/// Query string of `GET /users/search`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SearchQuery {
    /// Case-insensitive substring of a skill name
    #[validate(length(max = 100))]
    pub skill: Option<String>,
    #[serde(rename = "type")]
    pub direction: Option<SkillDirection>,
    pub availability: Option<String>,
    #[validate(range(min = 1, message = "Page numbers start at 1."))]
    pub page: Option<u32>,
    #[serde(alias = "size")]
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

// ─── Response Types ──────────────────────────────────────────

/// A user's own full profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub location: Option<String>,
    pub profile_photo: Option<String>,
    pub is_public: bool,
    pub availability: Option<String>,
    pub role: Role,
    pub skills_offered: Vec<SkillRef>,
    pub skills_wanted: Vec<SkillRef>,
    pub rating: RatingSummary,
    pub created_at: String,
    pub updated_at: String,
}

/// What other users see: search results and `GET /users/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCard {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub profile_photo: Option<String>,
    pub availability: Option<String>,
    pub skills_offered: Vec<SkillRef>,
    pub skills_wanted: Vec<SkillRef>,
    pub rating: RatingSummary,
}

/// One page of search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub users: Vec<UserCard>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub pages: i64,
}

/// Profile, skill and search operations.
#[derive(Clone)]
pub struct ProfileService {
    db: SqliteDb,
    max_skills_per_direction: usize,
}

impl ProfileService {
    pub fn new(db: SqliteDb, max_skills_per_direction: usize) -> Self {
        Self {
            db,
            max_skills_per_direction,
        }
    }

    async fn load_user(&self, user_id: &str) -> Result<User, AppError> {
        self.db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
    }

    async fn profile_view(&self, user: User) -> Result<ProfileView, AppError> {
        let skills = self.db.get_user_skills(&user.id).await?;
        let (skills_offered, skills_wanted) = split_by_direction(&skills);
        let rating = self.db.rating_summary(&user.id).await?;

        Ok(ProfileView {
            created_at: format_utc_rfc3339(user.created_at),
            updated_at: format_utc_rfc3339(user.updated_at),
            id: user.id,
            name: user.name,
            email: user.email,
            location: user.location,
            profile_photo: user.profile_photo,
            is_public: user.is_public,
            availability: user.availability,
            role: user.role,
            skills_offered,
            skills_wanted,
            rating,
        })
    }

    async fn user_card(&self, user: User) -> Result<UserCard, AppError> {
        let skills = self.db.get_user_skills(&user.id).await?;
        let (skills_offered, skills_wanted) = split_by_direction(&skills);
        let rating = self.db.rating_summary(&user.id).await?;

        Ok(UserCard {
            id: user.id,
            name: user.name,
            location: user.location,
            profile_photo: user.profile_photo,
            availability: user.availability,
            skills_offered,
            skills_wanted,
            rating,
        })
    }

    /// The caller's own profile with resolved skills.
    pub async fn get_profile(&self, user_id: &str) -> Result<ProfileView, AppError> {
        let user = self.load_user(user_id).await?;
        self.profile_view(user).await
    }

    /// Another user's public card.
    ///
    /// Banned users look missing; private profiles are refused. Admins and
    /// the user themselves bypass both checks.
    pub async fn get_public_profile(
        &self,
        viewer_id: &str,
        viewer_is_admin: bool,
        user_id: &str,
    ) -> Result<UserCard, AppError> {
        let privileged = viewer_is_admin || viewer_id == user_id;

        let user = match self.db.get_user(user_id).await? {
            Some(user) if privileged || !user.is_banned => user,
            _ => return Err(AppError::NotFound(format!("User {user_id} not found"))),
        };

        if !user.is_public && !privileged {
            return Err(AppError::Forbidden("Profile is private".to_string()));
        }

        self.user_card(user).await
    }

    /// Apply a partial update and return the new profile.
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<ProfileView, AppError> {
        let mut user = self.load_user(user_id).await?;

        let offered = match &update.skills_offered {
            Some(inputs) => Some(self.resolve_skill_set(inputs, SkillDirection::Offered).await?),
            None => None,
        };
        let wanted = match &update.skills_wanted {
            Some(inputs) => Some(self.resolve_skill_set(inputs, SkillDirection::Wanted).await?),
            None => None,
        };

        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(location) = update.location {
            user.location = location;
        }
        if let Some(profile_photo) = update.profile_photo {
            user.profile_photo = profile_photo;
        }
        if let Some(is_public) = update.is_public {
            user.is_public = is_public;
        }
        if let Some(availability) = update.availability {
            user.availability = availability;
        }
        user.updated_at = Utc::now();

        self.db
            .save_profile(&user, offered.as_deref(), wanted.as_deref())
            .await?;

        tracing::info!(user_id, "Profile updated");
        self.profile_view(user).await
    }

    /// Resolve a full replacement skill set, rejecting duplicates and
    /// sets over the per-direction cap.
    ///
    /// Every input is checked before any unknown name is added to the
    /// catalog, so a rejected set leaves the catalog untouched.
    async fn resolve_skill_set(
        &self,
        inputs: &[SkillInput],
        direction: SkillDirection,
    ) -> Result<Vec<String>, AppError> {
        if inputs.len() > self.max_skills_per_direction {
            return Err(AppError::BadRequest(format!(
                "At most {} {direction} skills are allowed",
                self.max_skills_per_direction
            )));
        }

        let duplicate =
            |name: &str| AppError::BadRequest(format!("Duplicate {direction} skill: {name}"));

        let mut seen_ids = HashSet::new();
        let mut seen_names = HashSet::new();
        let mut resolved = Vec::with_capacity(inputs.len());
        for input in inputs {
            let entry = match self.find_skill(input).await? {
                Ok(skill) => {
                    if !seen_ids.insert(skill.id.clone())
                        || !seen_names.insert(skill.name.to_lowercase())
                    {
                        return Err(duplicate(&skill.name));
                    }
                    Ok(skill)
                }
                Err(name) => {
                    if !seen_names.insert(name.to_lowercase()) {
                        return Err(duplicate(&name));
                    }
                    Err(name)
                }
            };
            resolved.push(entry);
        }

        let mut ids = Vec::with_capacity(resolved.len());
        for entry in resolved {
            let skill = match entry {
                Ok(skill) => skill,
                Err(name) => self.db.get_or_create_skill(&name).await?,
            };
            ids.push(skill.id);
        }
        Ok(ids)
    }

    /// Look up the catalog entry an input refers to without creating it.
    ///
    /// `Ok(Err(name))` is a valid name that is not in the catalog yet.
    async fn find_skill(&self, input: &SkillInput) -> Result<Result<Skill, String>, AppError> {
        if let Some(id) = &input.id {
            return self
                .db
                .get_skill(id)
                .await?
                .map(Ok)
                .ok_or_else(|| AppError::NotFound(format!("Skill {id} not found")));
        }

        let name = skill_name(input)?;
        Ok(self
            .db
            .find_skill_by_name(name)
            .await?
            .ok_or_else(|| name.to_string()))
    }

    async fn resolve_skill(&self, input: &SkillInput) -> Result<Skill, AppError> {
        match self.find_skill(input).await? {
            Ok(skill) => Ok(skill),
            Err(name) => self.db.get_or_create_skill(&name).await,
        }
    }

    /// The caller's skill associations, in the order they were added.
    pub async fn list_user_skills(&self, user_id: &str) -> Result<Vec<UserSkill>, AppError> {
        self.db.get_user_skills(user_id).await
    }

    /// Add one skill to the caller's offered or wanted set.
    pub async fn add_skill(
        &self,
        user_id: &str,
        request: AddSkillRequest,
    ) -> Result<UserSkill, AppError> {
        let skill = self.resolve_skill(&request.skill).await?;
        let direction = request.direction;
        let now = Utc::now();

        let added = self
            .db
            .add_user_skill(
                user_id,
                &skill.id,
                direction,
                self.max_skills_per_direction,
                now,
            )
            .await?;

        if !added {
            return Err(AppError::BadRequest(format!(
                "At most {} {direction} skills are allowed",
                self.max_skills_per_direction
            )));
        }

        tracing::debug!(user_id, skill = %skill.name, %direction, "Skill added");

        Ok(UserSkill {
            skill_id: skill.id,
            name: skill.name,
            direction,
            created_at: now,
        })
    }

    /// Remove one skill association.
    pub async fn remove_skill(
        &self,
        user_id: &str,
        skill_id: &str,
        direction: SkillDirection,
    ) -> Result<(), AppError> {
        if self
            .db
            .remove_user_skill(user_id, skill_id, direction)
            .await?
        {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Skill {skill_id} is not in your {direction} skills"
            )))
        }
    }

    /// Search public, non-banned users other than the caller.
    pub async fn search_users(
        &self,
        viewer_id: &str,
        query: SearchQuery,
    ) -> Result<SearchPage, AppError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1).saturating_mul(limit);

        let filter = UserSearch {
            skill: non_blank(query.skill),
            direction: query.direction,
            availability: non_blank(query.availability),
        };

        let (users, total) = self
            .db
            .search_users(&filter, viewer_id, offset, limit)
            .await?;

        let mut cards = Vec::with_capacity(users.len());
        for user in users {
            cards.push(self.user_card(user).await?);
        }

        let limit_i64 = i64::from(limit);
        Ok(SearchPage {
            users: cards,
            total,
            page,
            limit,
            pages: (total + limit_i64 - 1) / limit_i64,
        })
    }

    /// The full skill catalog.
    pub async fn list_available_skills(&self) -> Result<Vec<Skill>, AppError> {
        self.db.list_skills().await
    }
}

/// The trimmed, length-checked name of a by-name skill input.
fn skill_name(input: &SkillInput) -> Result<&str, AppError> {
    let name = input.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(AppError::BadRequest(
            "Skill id or name is required".to_string(),
        ));
    }
    if name.chars().count() > MAX_SKILL_NAME_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Skill names are limited to {MAX_SKILL_NAME_LENGTH} characters"
        )));
    }
    Ok(name)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
