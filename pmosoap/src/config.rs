//! Options de rendu du XML produit

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Options de rendu de l'enveloppe
///
/// Par défaut : pas de déclaration XML, sortie compacte sur une ligne.
///
/// ```yaml
/// xml_declaration: true
/// indent: 2
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    /// Préfixe `<?xml version="1.0" encoding="UTF-8"?>`
    pub xml_declaration: bool,

    /// Indentation (en espaces par niveau), `None` pour une sortie compacte
    pub indent: Option<usize>,
}

impl EncoderConfig {
    /// Charge la configuration depuis un document YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn with_declaration(mut self, enabled: bool) -> Self {
        self.xml_declaration = enabled;
        self
    }

    pub fn with_indent(mut self, spaces: usize) -> Self {
        self.indent = Some(spaces);
        self
    }
}
