//! # Static Catalog
//!
//! Stages and characters, parsed once from the JSON embedded at build time.
//! Nothing here is mutated after loading.

use crate::entities::{Character, CharacterId, Stage, StageId};
use crate::errors::CatalogError;
use std::collections::HashMap;

const STAGES_JSON: &str = include_str!("../data/stages.json");
const CHARACTERS_JSON: &str = include_str!("../data/characters.json");

/// Immutable lookup tables for reference data.
#[derive(Debug, Clone)]
pub struct Catalog {
    stages: Vec<Stage>,
    characters: Vec<Character>,
    stage_index: HashMap<StageId, usize>,
    character_index: HashMap<CharacterId, usize>,
}

impl Catalog {
    /// Load the embedded catalog.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(STAGES_JSON, CHARACTERS_JSON)
    }

    /// Load a catalog from JSON arrays of stages and characters.
    pub fn from_json(stages: &str, characters: &str) -> Result<Self, CatalogError> {
        let stages: Vec<Stage> = serde_json::from_str(stages)?;
        let characters: Vec<Character> = serde_json::from_str(characters)?;
        Self::new(stages, characters)
    }

    /// Build a catalog, rejecting duplicate ids.
    pub fn new(stages: Vec<Stage>, characters: Vec<Character>) -> Result<Self, CatalogError> {
        let mut stage_index = HashMap::with_capacity(stages.len());
        for (i, stage) in stages.iter().enumerate() {
            if stage_index.insert(stage.id, i).is_some() {
                return Err(CatalogError::DuplicateId {
                    kind: "stage",
                    id: stage.id.0,
                });
            }
        }

        let mut character_index = HashMap::with_capacity(characters.len());
        for (i, character) in characters.iter().enumerate() {
            if character_index.insert(character.id, i).is_some() {
                return Err(CatalogError::DuplicateId {
                    kind: "character",
                    id: character.id.0,
                });
            }
        }

        Ok(Self {
            stages,
            characters,
            stage_index,
            character_index,
        })
    }

    /// All stages in catalog order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// All characters in catalog order.
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// Stage by id.
    pub fn stage(&self, id: StageId) -> Option<&Stage> {
        self.stage_index.get(&id).map(|&i| &self.stages[i])
    }

    /// Stage by id, as a catalog error when missing.
    pub fn require_stage(&self, id: StageId) -> Result<&Stage, CatalogError> {
        self.stage(id).ok_or(CatalogError::UnknownId {
            kind: "stage",
            id: id.0,
        })
    }

    /// Character by id.
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.character_index.get(&id).map(|&i| &self.characters[i])
    }

    /// Character by display name or alias (case-insensitive).
    pub fn find_character(&self, query: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.matches(query))
    }
}
