//! Knowledge profile: persona texts, canned replies and retrievable chunks.
//!
//! A profile is a YAML document. The built-in profile is compiled into the
//! binary; [`KnowledgeConfig::profile_path`] points at a replacement with the
//! same schema. Profiles are read once and never mutated afterwards.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::KnowledgeConfig;
use crate::errors::JuneError;

/// The built-in profile document.
pub const BUILTIN_PROFILE: &str = include_str!("../assets/profile.yaml");

// ============================================================================
// Category
// ============================================================================

/// Label grouping chunks by topic.
///
/// Each category carries trigger words; a query containing one boosts every
/// chunk of that category during retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Personal,
    Contact,
    Summary,
    Skills,
    Experience,
    Projects,
    Education,
    Certifications,
    Achievements,
}

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Category; 9] = [
        Category::Personal,
        Category::Contact,
        Category::Summary,
        Category::Skills,
        Category::Experience,
        Category::Projects,
        Category::Education,
        Category::Certifications,
        Category::Achievements,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Contact => "contact",
            Self::Summary => "summary",
            Self::Skills => "skills",
            Self::Experience => "experience",
            Self::Projects => "projects",
            Self::Education => "education",
            Self::Certifications => "certifications",
            Self::Achievements => "achievements",
        }
    }

    /// Words that boost this category when the query contains them.
    pub fn triggers(&self) -> &'static [&'static str] {
        match self {
            Self::Personal => &["who", "about", "daniel", "introduction"],
            Self::Contact => &["contact", "email", "reach", "hire", "connect"],
            Self::Skills => &[
                "skill",
                "know",
                "can",
                "technology",
                "tech",
                "language",
                "framework",
            ],
            Self::Experience => &["experience", "work", "job", "intern", "company"],
            Self::Projects => &["project", "build", "built", "create", "made", "portfolio"],
            Self::Education => &[
                "education",
                "study",
                "college",
                "degree",
                "school",
                "university",
            ],
            Self::Certifications => &["certificate", "certification", "certified", "credential"],
            Self::Achievements => &["achievement", "accomplish", "best", "impressive", "special"],
            Self::Summary => &[],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(Category::as_str).collect();
                format!("unknown category `{}` (expected one of: {})", s, names.join(", "))
            })
    }
}

// ============================================================================
// KnowledgeChunk
// ============================================================================

/// One retrievable unit of portfolio knowledge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    pub id: String,
    pub category: Category,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

// ============================================================================
// Profile
// ============================================================================

/// Persona texts and fixed replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantPersona {
    /// Name the assistant answers to.
    pub name: String,
    /// Instructions sent with every model request.
    pub system_prompt: String,
    /// Reply to greetings when no model is available.
    pub greeting: String,
    /// Reply when nothing in the knowledge base matches.
    pub default_reply: String,
    /// Reply after the provider reports quota exhaustion.
    pub rate_limited_reply: String,
    /// Reply after the provider's safety filters reject a query.
    pub content_rejected_reply: String,
    /// Starter questions offered to visitors.
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// A complete knowledge profile as stored in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Short name of the person the profile describes.
    pub owner: String,
    pub assistant: AssistantPersona,
    /// Canned reply per category.
    #[serde(default)]
    pub fallback: BTreeMap<Category, String>,
    pub chunks: Vec<KnowledgeChunk>,
}

// ============================================================================
// KnowledgeBase
// ============================================================================

/// A validated, read-only knowledge profile.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    profile: Profile,
}

impl KnowledgeBase {
    /// Load the profile compiled into the binary.
    pub fn builtin() -> Result<Self, JuneError> {
        Self::from_yaml(BUILTIN_PROFILE, "built-in profile")
    }

    /// Load the profile named by `config`, or the built-in one.
    pub fn load(config: &KnowledgeConfig) -> Result<Self, JuneError> {
        match &config.profile_path {
            Some(path) => Self::from_path(path),
            None => Self::builtin(),
        }
    }

    /// Load a profile from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`JuneError::ProfileIo`] if the file cannot be read, or a
    /// profile error if it fails to parse or validate.
    pub fn from_path(path: &Path) -> Result<Self, JuneError> {
        let content = fs::read_to_string(path).map_err(|e| JuneError::ProfileIo {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content, &path.display().to_string())
    }

    /// Parse and validate a profile document. `origin` names it in errors.
    pub fn from_yaml(content: &str, origin: &str) -> Result<Self, JuneError> {
        let profile: Profile = serde_yaml::from_str(content)
            .map_err(|e| JuneError::InvalidProfile(format!("Failed to parse {origin}: {e}")))?;
        let kb = Self::new(profile)?;
        tracing::debug!(
            "Loaded {} with {} chunks",
            origin,
            kb.profile.chunks.len()
        );
        Ok(kb)
    }

    /// Validate and normalise `profile`.
    ///
    /// Keywords are trimmed and lower-cased; empty keywords are dropped.
    pub fn new(mut profile: Profile) -> Result<Self, JuneError> {
        if profile.chunks.is_empty() {
            return Err(JuneError::InvalidProfile(
                "profile must contain at least one chunk".to_string(),
            ));
        }
        if profile.assistant.name.trim().is_empty() {
            return Err(JuneError::InvalidProfile(
                "assistant.name must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for chunk in &mut profile.chunks {
            if chunk.id.trim().is_empty() {
                return Err(JuneError::InvalidProfile(format!(
                    "chunk titled `{}` has an empty id",
                    chunk.title
                )));
            }
            if !seen.insert(chunk.id.clone()) {
                return Err(JuneError::DuplicateChunkId(chunk.id.clone()));
            }
            chunk.keywords = chunk
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
        }

        let kb = Self { profile };
        for warning in kb.warnings() {
            tracing::warn!("Profile warning: {}", warning);
        }
        Ok(kb)
    }

    /// Non-fatal profile issues.
    pub fn warnings(&self) -> Vec<String> {
        let mut missing: Vec<Category> = self
            .profile
            .chunks
            .iter()
            .map(|c| c.category)
            .filter(|c| !self.profile.fallback.contains_key(c))
            .collect();
        missing.sort();
        missing.dedup();

        missing
            .into_iter()
            .map(|c| format!("category `{c}` has chunks but no fallback reply"))
            .collect()
    }

    pub fn owner(&self) -> &str {
        &self.profile.owner
    }

    pub fn persona(&self) -> &AssistantPersona {
        &self.profile.assistant
    }

    /// All chunks in profile order.
    pub fn chunks(&self) -> &[KnowledgeChunk] {
        &self.profile.chunks
    }

    pub fn len(&self) -> usize {
        self.profile.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profile.chunks.is_empty()
    }

    /// Look up a chunk by id.
    pub fn chunk(&self, id: &str) -> Option<&KnowledgeChunk> {
        self.profile.chunks.iter().find(|c| c.id == id)
    }

    /// Chunks of one category, in profile order.
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &KnowledgeChunk> {
        self.profile
            .chunks
            .iter()
            .filter(move |c| c.category == category)
    }

    /// Canned reply for `category`, if the profile defines one.
    pub fn fallback_reply(&self, category: Category) -> Option<&str> {
        self.profile.fallback.get(&category).map(String::as_str)
    }

    pub fn suggestions(&self) -> &[String] {
        &self.profile.assistant.suggestions
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }
}
