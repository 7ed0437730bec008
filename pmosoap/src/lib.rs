//! # pmosoap - Encodage d'enveloppes SOAP 1.1
//!
//! Ce crate construit des requêtes SOAP 1.1 à partir de paramètres
//! génériques ([`Param`]) ou d'enregistrements typés `serde` ([`Record`]).
//!
//! ## Fonctionnement
//!
//! Chaque appel construit son propre [`TokenStream`] :
//!
//! 1. ouverture de `soap:Envelope` (déclarations xsi, xsd, soap)
//! 2. `soap:Header` optionnel, avec une racine nommée si un namespace existe
//! 3. `soap:Body` et la racine de méthode portant `xmlns`
//! 4. les paramètres encodés
//! 5. fermeture dans l'ordre inverse, puis écriture vers un `std::io::Write`
//!
//! ## Example
//!
//! ```
//! use pmosoap::{Param, SoapCall};
//!
//! # fn main() -> pmosoap::Result<()> {
//! let call = SoapCall::new("GetPrice").with_namespace("urn:example");
//! let xml = call.to_xml(&Param::mapping([("id", "42")]))?;
//!
//! assert!(xml.contains(r#"<GetPrice xmlns="urn:example"><id>42</id></GetPrice>"#));
//! # Ok(())
//! # }
//! ```

mod call;
mod config;
pub mod envelope;
mod errors;
mod params;
mod record;
mod token;
mod writer;

pub use call::{BodyContent, Definitions, SoapCall};
pub use config::EncoderConfig;
pub use errors::{Result, SoapEncodeError};
pub use params::{Param, encode_param};
pub use record::{Record, encode_record};
pub use token::{Token, TokenStream};
pub use writer::flush;
