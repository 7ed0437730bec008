//! Appel SOAP : contexte d'encodage et point d'entrée

use std::io::Write;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EncoderConfig;
use crate::envelope;
use crate::errors::{Result, SoapEncodeError};
use crate::params::{Param, encode_param};
use crate::record::{Record, encode_record};
use crate::token::TokenStream;
use crate::writer;

/// Partie de la description de service consommée par l'encodeur
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Definitions {
    /// Namespace cible du schéma (ex: "urn:example")
    #[serde(rename = "@targetNamespace", default)]
    pub target_namespace: String,
}

impl Definitions {
    pub fn new(target_namespace: impl Into<String>) -> Self {
        Self {
            target_namespace: target_namespace.into(),
        }
    }
}

/// Contenu placé sous la racine de méthode du corps SOAP
pub trait BodyContent {
    fn encode_body(&self, stream: &mut TokenStream) -> Result<()>;
}

impl BodyContent for Param {
    fn encode_body(&self, stream: &mut TokenStream) -> Result<()> {
        if self.has_untagged_scalar() {
            return Err(SoapEncodeError::UntaggedScalar);
        }
        encode_param(stream, self);
        Ok(())
    }
}

impl<T: Serialize + ?Sized> BodyContent for Record<'_, T> {
    fn encode_body(&self, stream: &mut TokenStream) -> Result<()> {
        encode_record(stream, self.0)
    }
}

/// Requête SOAP à encoder
///
/// # Example
///
/// ```
/// use pmosoap::{Definitions, Param, SoapCall};
///
/// # fn main() -> pmosoap::Result<()> {
/// let call = SoapCall::new("GetPrice").with_definitions(Definitions::new("urn:example"));
/// let xml = call.to_xml(&Param::mapping([("id", "42")]))?;
///
/// assert!(xml.ends_with("<soap:Body><GetPrice xmlns=\"urn:example\"><id>42</id></GetPrice></soap:Body></soap:Envelope>"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SoapCall {
    definitions: Option<Definitions>,
    method: String,
    header_name: String,
    header_params: IndexMap<String, String>,
    config: EncoderConfig,
}

impl SoapCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    pub fn with_definitions(mut self, definitions: Definitions) -> Self {
        self.definitions = Some(definitions);
        self
    }

    /// Raccourci pour des définitions réduites au seul namespace cible
    pub fn with_namespace(self, namespace: impl Into<String>) -> Self {
        self.with_definitions(Definitions::new(namespace))
    }

    /// Nom de l'élément racine de l'en-tête
    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    pub fn with_header_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.header_params.insert(key.into(), value.into());
        self
    }

    pub fn with_header_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.header_params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_config(mut self, config: EncoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    fn namespace(&self) -> Result<&str> {
        match &self.definitions {
            Some(defs) => Ok(defs.target_namespace.as_str()),
            None => {
                warn!("SOAP call {} has no service definitions", self.method);
                Err(SoapEncodeError::configuration("definitions is nil"))
            }
        }
    }

    /// Construit le flux complet de l'enveloppe
    ///
    /// Le flux est propre à cet appel ; rien n'est écrit nulle part.
    pub fn tokens<B: BodyContent + ?Sized>(&self, body: &B) -> Result<TokenStream> {
        let namespace = self.namespace()?;
        let mut stream = TokenStream::new();

        envelope::open_envelope(&mut stream);

        if !self.header_params.is_empty() {
            // La racine n'est ouverte (donc refermée) que si le namespace existe
            let header_root = if namespace.is_empty() {
                ""
            } else {
                self.header_name.as_str()
            };
            envelope::open_header(&mut stream, header_root, namespace);
            envelope::write_header_fields(&mut stream, &self.header_params);
            envelope::close_header(&mut stream, header_root);
        }

        envelope::open_body(&mut stream, &self.method, namespace)?;
        body.encode_body(&mut stream)?;
        envelope::close_body(&mut stream, &self.method);
        envelope::close_envelope(&mut stream);

        debug!(
            "Encoded SOAP envelope for {} ({}): {} tokens",
            self.method,
            namespace,
            stream.len()
        );

        Ok(stream)
    }

    /// Encode l'enveloppe et l'écrit dans `writer`
    ///
    /// Les erreurs de configuration, d'adressage, de sérialisation et de
    /// nommage sont levées avant toute écriture.
    pub fn write<B, W>(&self, body: &B, writer: &mut W) -> Result<()>
    where
        B: BodyContent + ?Sized,
        W: Write,
    {
        let stream = self.tokens(body)?;
        writer::flush(&stream, writer, &self.config)
    }

    pub fn to_xml<B: BodyContent + ?Sized>(&self, body: &B) -> Result<String> {
        let mut buf = Vec::new();
        self.write(body, &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}
