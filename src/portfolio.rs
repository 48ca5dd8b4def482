//! Static portfolio content
//!
//! The owner's bio, skills, experience, and projects. Loaded once at startup,
//! either from the copy compiled into the binary or from a JSON file of the
//! same shape. Read-only after that.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Content compiled into the binary
const BUNDLED_CONTENT: &str = include_str!("../content/portfolio.json");

/// Highest allowed skill proficiency
const MAX_SKILL_LEVEL: u8 = 100;

/// Errors loading portfolio content
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed portfolio content: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid portfolio content: {0}")]
    Invalid(String),
}

/// Skill grouping shown on the skills chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillCategory {
    Frontend,
    Backend,
    Tools,
    Design,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    /// Proficiency, 0-100
    pub level: u8,
    pub category: SkillCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub id: String,
    pub role: String,
    pub company: String,
    pub period: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Everything the site and the chat assistant know about the owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub owner: String,
    pub role: String,
    pub about: String,
    /// Opening line of the chat widget; derived from `owner` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Portfolio {
    /// Load the content compiled into the binary
    pub fn bundled() -> Result<Self, ContentError> {
        Self::from_json(BUNDLED_CONTENT)
    }

    /// Load content from a JSON file
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ContentError> {
        let portfolio: Portfolio = serde_json::from_str(raw)?;
        portfolio.validate()?;
        Ok(portfolio)
    }

    /// Seed message shown before the visitor says anything
    pub fn greeting(&self) -> String {
        self.greeting.clone().unwrap_or_else(|| {
            format!(
                "Hi! I'm {}'s AI assistant. Ask me anything about their projects, skills, or experience.",
                self.owner
            )
        })
    }

    fn validate(&self) -> Result<(), ContentError> {
        if self.owner.trim().is_empty() {
            return Err(ContentError::Invalid("owner must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for skill in &self.skills {
            if skill.level > MAX_SKILL_LEVEL {
                return Err(ContentError::Invalid(format!(
                    "skill {} has level {} (max {MAX_SKILL_LEVEL})",
                    skill.name, skill.level
                )));
            }
            if !seen.insert(skill.name.as_str()) {
                return Err(ContentError::Invalid(format!(
                    "duplicate skill {}",
                    skill.name
                )));
            }
        }

        if let Some(project) = self.projects.iter().find(|p| p.title.trim().is_empty()) {
            return Err(ContentError::Invalid(format!(
                "project {} has an empty title",
                project.id
            )));
        }

        Ok(())
    }
}
