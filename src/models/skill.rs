// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Skill catalog and per-user skill associations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog seeded into an empty database.
pub const DEFAULT_SKILLS: [&str; 20] = [
    "Python Programming",
    "JavaScript",
    "React",
    "Node.js",
    "FastAPI",
    "SQL",
    "Machine Learning",
    "Data Analysis",
    "Web Design",
    "Graphic Design",
    "Photography",
    "Cooking",
    "Guitar",
    "Spanish",
    "French",
    "German",
    "Yoga",
    "Fitness Training",
    "Writing",
    "Public Speaking",
];

/// A catalog entry. Names are unique (case-insensitive) and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Whether a user lists a skill as something they teach or want to learn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillDirection {
    Offered,
    Wanted,
}

impl SkillDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SkillDirection::Offered => "offered",
            SkillDirection::Wanted => "wanted",
        }
    }
}

impl fmt::Display for SkillDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offered" => Ok(SkillDirection::Offered),
            "wanted" => Ok(SkillDirection::Wanted),
            other => Err(format!("unknown skill type: {other}")),
        }
    }
}

/// A (user, skill, direction) association with the skill name resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSkill {
    pub skill_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub direction: SkillDirection,
    pub created_at: DateTime<Utc>,
}

/// Id + display name pair used in profile and swap responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRef {
    pub id: String,
    pub name: String,
}

impl From<&UserSkill> for SkillRef {
    fn from(skill: &UserSkill) -> Self {
        Self {
            id: skill.skill_id.clone(),
            name: skill.name.clone(),
        }
    }
}

/// Split a user's skills into (offered, wanted), preserving order.
pub fn split_by_direction(skills: &[UserSkill]) -> (Vec<SkillRef>, Vec<SkillRef>) {
    let mut offered = Vec::new();
    let mut wanted = Vec::new();
    for skill in skills {
        match skill.direction {
            SkillDirection::Offered => offered.push(SkillRef::from(skill)),
            SkillDirection::Wanted => wanted.push(SkillRef::from(skill)),
        }
    }
    (offered, wanted)
}
