//! Erreurs d'encodage d'enveloppes SOAP

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SoapEncodeError {
    /// Aucune définition de service (ou pas de namespace cible) disponible
    #[error("Missing service definitions: {0}")]
    Configuration(String),

    /// Le corps ne peut pas être adressé sans méthode et namespace
    #[error("Cannot address SOAP body: method={method:?} namespace={namespace:?}")]
    Addressing { method: String, namespace: String },

    /// Scalaire sans entrée de mapping englobante (pas de nom d'élément)
    #[error("Scalar parameter has no enclosing element name")]
    UntaggedScalar,

    #[error("Record serialization error: {0}")]
    Marshal(#[from] quick_xml::SeError),

    #[error("Record reparse error: {0}")]
    Reparse(#[from] quick_xml::Error),

    /// Nom d'élément ou d'attribut vide ou hors de la grammaire XML
    #[error("Invalid XML name: {0:?}")]
    InvalidName(String),

    #[error("XML write error: {0}")]
    Write(#[from] std::io::Error),

    #[error("Encoded envelope is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid encoder configuration: {0}")]
    InvalidConfig(#[from] serde_yaml::Error),
}

impl SoapEncodeError {
    pub fn addressing(method: &str, namespace: &str) -> Self {
        SoapEncodeError::Addressing {
            method: method.to_string(),
            namespace: namespace.to_string(),
        }
    }

    pub fn configuration(message: &str) -> Self {
        SoapEncodeError::Configuration(message.to_string())
    }

    pub fn invalid_name(name: &str) -> Self {
        SoapEncodeError::InvalidName(name.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SoapEncodeError>;
