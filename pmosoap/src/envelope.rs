//! Cadrage de l'enveloppe SOAP 1.1 (Envelope, Header, Body)

use indexmap::IndexMap;

use crate::errors::{Result, SoapEncodeError};
use crate::token::{Token, TokenStream};

pub const SOAP_ENVELOPE: &str = "soap:Envelope";
pub const SOAP_HEADER: &str = "soap:Header";
pub const SOAP_BODY: &str = "soap:Body";

pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Ouvre `soap:Envelope` avec les déclarations xsi, xsd et soap
pub fn open_envelope(stream: &mut TokenStream) {
    stream.push(Token::start_with_attributes(
        SOAP_ENVELOPE,
        [
            ("xmlns:xsi", XSI_NS),
            ("xmlns:xsd", XSD_NS),
            ("xmlns:soap", SOAP_ENV_NS),
        ],
    ));
}

pub fn close_envelope(stream: &mut TokenStream) {
    stream.push(Token::end(SOAP_ENVELOPE));
}

/// Ouvre `soap:Header`
///
/// La racine nommée `root_name` (avec `xmlns=namespace`) n'est ouverte que
/// si le nom et le namespace sont tous deux non vides.
pub fn open_header(stream: &mut TokenStream, root_name: &str, namespace: &str) {
    stream.push(Token::start(SOAP_HEADER));

    if root_name.is_empty() || namespace.is_empty() {
        return;
    }

    stream.push(Token::start_with_attributes(
        root_name,
        [("xmlns", namespace)],
    ));
}

/// Ferme `soap:Header`, précédé de la racine si `root_name` est non vide
pub fn close_header(stream: &mut TokenStream, root_name: &str) {
    if !root_name.is_empty() {
        stream.push(Token::end(root_name));
    }
    stream.push(Token::end(SOAP_HEADER));
}

/// Champs d'en-tête : `<clé>valeur</clé>` dans l'ordre d'insertion
pub fn write_header_fields(stream: &mut TokenStream, fields: &IndexMap<String, String>) {
    for (key, value) in fields {
        stream.push(Token::start(key.as_str()));
        stream.push(Token::text(value.as_str()));
        stream.push(Token::end(key.as_str()));
    }
}

/// Ouvre `soap:Body` puis la racine de méthode portant le namespace
///
/// Échoue sans rien ajouter au flux si la méthode ou le namespace est vide.
pub fn open_body(stream: &mut TokenStream, method: &str, namespace: &str) -> Result<()> {
    if method.is_empty() || namespace.is_empty() {
        return Err(SoapEncodeError::addressing(method, namespace));
    }

    stream.push(Token::start(SOAP_BODY));
    stream.push(Token::start_with_attributes(method, [("xmlns", namespace)]));

    Ok(())
}

pub fn close_body(stream: &mut TokenStream, method: &str) {
    stream.push(Token::end(method));
    stream.push(Token::end(SOAP_BODY));
}
