//! Encodage d'enregistrements typés (structures `serde`)
//!
//! L'enregistrement est sérialisé par `quick_xml::se`, relu événement par
//! événement avec un `NsReader`, puis réécrit dans le flux partagé :
//!
//! - la racine synthétique produite par le sérialiseur est retirée, la
//!   racine de méthode du corps SOAP la remplace ;
//! - seul le premier élément qui introduit un namespace le porte (avec
//!   sa balise fermante), tous ses descendants restent non qualifiés ;
//! - les attributs gardent leur nom qualifié (`xsi:type`) et le texte est
//!   conservé tel quel, espaces compris.

use quick_xml::encoding::Decoder;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::name::{QName, ResolveResult};
use quick_xml::reader::NsReader;
use serde::Serialize;
use tracing::trace;

use crate::envelope::{SOAP_ENV_NS, XSD_NS, XSI_NS};
use crate::errors::Result;
use crate::token::{Token, TokenStream};

/// Déclarations déjà portées par `soap:Envelope`
const ENVELOPE_PREFIXES: [(&str, &str); 3] = [
    ("xmlns:xsi", XSI_NS),
    ("xmlns:xsd", XSD_NS),
    ("xmlns:soap", SOAP_ENV_NS),
];

/// Enregistrement typé à placer dans le corps SOAP
///
/// Le namespace est déclaré par l'enregistrement lui-même via un champ
/// renommé `@xmlns` :
///
/// ```
/// use pmosoap::{Record, SoapCall};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Order {
///     #[serde(rename = "@xmlns")]
///     xmlns: &'static str,
///     id: u32,
/// }
///
/// #[derive(Serialize)]
/// struct PlaceOrder {
///     order: Order,
/// }
///
/// # fn main() -> pmosoap::Result<()> {
/// let record = PlaceOrder {
///     order: Order { xmlns: "urn:orders", id: 7 },
/// };
/// let xml = SoapCall::new("PlaceOrder")
///     .with_namespace("urn:shop")
///     .to_xml(&Record(&record))?;
///
/// assert!(xml.contains(r#"<order xmlns="urn:orders"><id>7</id></order>"#));
/// # Ok(())
/// # }
/// ```
pub struct Record<'a, T: Serialize + ?Sized>(pub &'a T);

impl<'a, T: Serialize + ?Sized> Record<'a, T> {
    pub fn new(record: &'a T) -> Self {
        Record(record)
    }
}

/// Sérialise `record` et ajoute ses champs au flux
///
/// En cas d'erreur de sérialisation ou de relecture, le flux n'est pas
/// modifié.
pub fn encode_record<T: Serialize + ?Sized>(stream: &mut TokenStream, record: &T) -> Result<()> {
    let xml = quick_xml::se::to_string(record)?;
    trace!("Serialized record: {}", xml);

    let tokens = tokenize(&xml)?;

    // Racine synthétique : premier début et dernière fin
    let mut scratch = TokenStream::new();
    scratch.extend(tokens.into_iter().skip(1));
    scratch.drop_last(1);

    stream.extend(scratch);
    Ok(())
}

/// Relit la sortie du sérialiseur en jetons, racine comprise
fn tokenize(xml: &str) -> Result<Vec<Token>> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(false);
    reader.config_mut().expand_empty_elements = true;
    let decoder = reader.decoder();

    let mut stream = Vec::new();
    let mut text = String::new();
    let mut depth = 0usize;
    // Profondeur et namespace de l'élément origine ouvert
    let mut origin: Option<(usize, String)> = None;

    loop {
        match reader.read_resolved_event()? {
            (resolved, Event::Start(e)) => {
                flush_text(&mut stream, &mut text);
                depth += 1;

                let namespace = match &resolved {
                    // La racine synthétique n'est jamais origine
                    ResolveResult::Bound(ns) if depth > 1 && origin.is_none() && !ns.0.is_empty() => {
                        let ns = String::from_utf8_lossy(ns.0).into_owned();
                        origin = Some((depth, ns.clone()));
                        Some(ns)
                    }
                    _ => None,
                };

                stream.push(Token::Start {
                    name: tag_name(e.name(), &resolved),
                    namespace,
                    attributes: attributes(decoder, &e)?,
                });
            }
            (resolved, Event::End(e)) => {
                flush_text(&mut stream, &mut text);

                let namespace = match origin.take() {
                    Some((at, ns)) if at == depth => Some(ns),
                    other => {
                        origin = other;
                        None
                    }
                };
                stream.push(Token::End {
                    name: tag_name(e.name(), &resolved),
                    namespace,
                });
                depth = depth.saturating_sub(1);
            }
            (_, Event::Text(e)) => {
                text.push_str(&e.decode().map_err(quick_xml::Error::Encoding)?);
            }
            (_, Event::CData(e)) => {
                text.push_str(&e.decode().map_err(quick_xml::Error::Encoding)?);
            }
            (_, Event::GeneralRef(e)) => push_reference(&mut text, &e)?,
            (_, Event::Eof) => break,
            // Déclaration, commentaires, instructions de traitement
            _ => {}
        }
    }

    flush_text(&mut stream, &mut text);
    Ok(stream)
}

fn flush_text(stream: &mut Vec<Token>, text: &mut String) {
    if !text.is_empty() {
        stream.push(Token::Text(std::mem::take(text)));
    }
}

fn push_reference(text: &mut String, reference: &BytesRef<'_>) -> Result<()> {
    if let Some(ch) = reference.resolve_char_ref()? {
        text.push(ch);
        return Ok(());
    }

    let name = reference.decode().map_err(quick_xml::Error::Encoding)?;
    match resolve_predefined_entity(&name) {
        Some(value) => text.push_str(value),
        // Entité inconnue : recopiée telle quelle
        None => {
            text.push('&');
            text.push_str(&name);
            text.push(';');
        }
    }
    Ok(())
}

/// Nom local si le préfixe est résolu, nom qualifié sinon
fn tag_name(name: QName<'_>, resolved: &ResolveResult<'_>) -> String {
    let bytes = match resolved {
        ResolveResult::Unknown(_) => name.into_inner(),
        _ => name.local_name().into_inner(),
    };
    String::from_utf8_lossy(bytes).into_owned()
}

/// Attributs de l'élément, dans l'ordre du document
///
/// Le namespace par défaut est porté par le jeton lui-même ; les préfixes
/// déjà déclarés sur l'enveloppe ne sont pas répétés.
fn attributes(decoder: Decoder, e: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();

    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.decode_and_unescape_value(decoder)?.into_owned();

        if key == "xmlns" || ENVELOPE_PREFIXES.contains(&(key.as_str(), value.as_str())) {
            continue;
        }
        attributes.push((key, value));
    }

    Ok(attributes)
}
