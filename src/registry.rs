//! Component Registry - loads and stores modeling components
//!
//! The registry is the persistence seam of the engine: the publisher writes
//! fragments back through it and the generator reads through it. Durable
//! storage transactions belong to the embedding application.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{Component, ComponentId, Concept};

/// One registry file on disk: either a component or a concept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RegistryEntry {
    Concept(Concept),
    Component(Component),
}

pub struct ComponentRegistry {
    components: HashMap<ComponentId, Component>,
    concepts: HashMap<ComponentId, Concept>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
            concepts: HashMap::new(),
        }
    }

    /// Load every `*.json` file in a directory. Files that do not parse as
    /// a component or concept are skipped.
    pub fn load_from_dir(dir: &Path) -> Result<Self, std::io::Error> {
        let mut registry = Self::new();
        if dir.exists() {
            for entry in fs::read_dir(dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.extension().map_or(false, |e| e == "json") {
                    if let Ok(content) = fs::read_to_string(&path) {
                        match serde_json::from_str::<RegistryEntry>(&content) {
                            Ok(RegistryEntry::Component(c)) => {
                                registry.components.insert(c.meta.id, c);
                            }
                            Ok(RegistryEntry::Concept(c)) => {
                                registry.concepts.insert(c.id, c);
                            }
                            Err(_) => {}
                        }
                    }
                }
            }
        }
        Ok(registry)
    }

    /// Write every entry back as `{id}.json`, persisting fragments and
    /// publication state set by the publisher and generator.
    pub fn save_to_dir(&self, dir: &Path) -> Result<(), std::io::Error> {
        fs::create_dir_all(dir)?;
        for component in self.components.values() {
            let path = dir.join(format!("{}.json", component.meta.id));
            fs::write(&path, serde_json::to_string_pretty(component)?)?;
        }
        for concept in self.concepts.values() {
            let path = dir.join(format!("{}.json", concept.id));
            fs::write(&path, serde_json::to_string_pretty(concept)?)?;
        }
        Ok(())
    }

    pub fn register(&mut self, component: Component) -> ComponentId {
        let id = component.meta.id;
        self.components.insert(id, component);
        id
    }

    pub fn register_concept(&mut self, concept: Concept) -> ComponentId {
        let id = concept.id;
        self.concepts.insert(id, concept);
        id
    }

    pub fn get(&self, id: &ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    pub fn get_mut(&mut self, id: &ComponentId) -> Option<&mut Component> {
        self.components.get_mut(id)
    }

    pub fn concept(&self, id: &ComponentId) -> Option<&Concept> {
        self.concepts.get(id)
    }

    pub fn concept_mut(&mut self, id: &ComponentId) -> Option<&mut Concept> {
        self.concepts.get_mut(id)
    }

    pub fn list(&self) -> Vec<&Component> {
        self.components.values().collect()
    }

    pub fn list_concepts(&self) -> Vec<&Concept> {
        self.concepts.values().collect()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Body, TextDef};

    #[test]
    fn round_trips_through_a_directory() {
        let dir = tempfile::tempdir().unwrap();

        let mut registry = ComponentRegistry::new();
        let id = registry.register(Component::new("Sample Text", Body::Text(TextDef::default())));
        registry.save_to_dir(dir.path()).unwrap();

        let reloaded = ComponentRegistry::load_from_dir(dir.path()).unwrap();
        let component = reloaded.get(&id).expect("component survives the round trip");
        assert_eq!(component.meta.label, "Sample Text");
        assert!(!component.meta.published);
    }
}
