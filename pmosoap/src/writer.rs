//! Écriture du flux de jetons vers un `std::io::Write`
//!
//! Les jetons sont rejoués comme événements `quick_xml` ; l'échappement du
//! texte et des valeurs d'attributs est fait par `quick_xml::Writer`.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::config::EncoderConfig;
use crate::errors::{Result, SoapEncodeError};
use crate::token::{Token, TokenStream};

/// Rejoue tous les jetons dans l'ordre puis vide le writer
///
/// Les noms d'éléments et d'attributs sont vérifiés avant la première
/// écriture : un nom invalide laisse le writer intact. La première erreur
/// d'écriture est renvoyée telle quelle ; une partie des jetons peut déjà
/// avoir atteint le writer.
pub fn flush<W: Write>(stream: &TokenStream, writer: &mut W, config: &EncoderConfig) -> Result<()> {
    check_names(stream)?;

    let mut xml = match config.indent {
        Some(width) => Writer::new_with_indent(&mut *writer, b' ', width),
        None => Writer::new(&mut *writer),
    };

    if config.xml_declaration {
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    }

    for token in stream {
        xml.write_event(to_event(token))?;
    }

    xml.into_inner().flush()?;
    Ok(())
}

fn to_event(token: &Token) -> Event<'_> {
    match token {
        Token::Start {
            name,
            namespace,
            attributes,
        } => {
            let mut start = BytesStart::new(name.as_str());
            if let Some(ns) = namespace {
                start.push_attribute(("xmlns", ns.as_str()));
            }
            for (key, value) in attributes {
                start.push_attribute((key.as_str(), value.as_str()));
            }
            Event::Start(start)
        }
        Token::End { name, .. } => Event::End(BytesEnd::new(name.as_str())),
        Token::Text(content) => Event::Text(BytesText::new(content.as_str())),
    }
}

fn check_names(stream: &TokenStream) -> Result<()> {
    for token in stream {
        match token {
            Token::Start {
                name, attributes, ..
            } => {
                if !is_xml_name(name) {
                    return Err(SoapEncodeError::invalid_name(name));
                }
                if let Some((key, _)) = attributes.iter().find(|(key, _)| !is_xml_name(key)) {
                    return Err(SoapEncodeError::invalid_name(key));
                }
            }
            Token::End { name, .. } if !is_xml_name(name) => {
                return Err(SoapEncodeError::invalid_name(name));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Production `Name` de XML 1.1, préfixe éventuel compris
///
/// Mêmes plages que celles appliquées par `quick_xml::se` aux noms qu'il
/// produit.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

fn is_name_start_char(ch: char) -> bool {
    matches!(ch,
        ':'
        | 'A'..='Z'
        | '_'
        | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}'
        | '\u{037F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(ch: char) -> bool {
    matches!(ch, '-' | '.' | '0'..='9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
        || is_name_start_char(ch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SoapEncodeError;

    fn sample() -> TokenStream {
        let mut stream = TokenStream::new();
        stream.extend([
            Token::start_with_attributes("root", [("xmlns", "urn:x")]),
            Token::start("a"),
            Token::text("1 < 2"),
            Token::end("a"),
            Token::start("b"),
            Token::end("b"),
            Token::end("root"),
        ]);
        stream
    }

    fn render(stream: &TokenStream, config: &EncoderConfig) -> String {
        let mut buf = Vec::new();
        flush(stream, &mut buf, config).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_compact_output() {
        let xml = render(&sample(), &EncoderConfig::default());
        assert_eq!(
            xml,
            r#"<root xmlns="urn:x"><a>1 &lt; 2</a><b></b></root>"#
        );
    }

    #[test]
    fn test_namespace_is_declared() {
        let mut stream = TokenStream::new();
        stream.push(Token::Start {
            name: "quote".to_string(),
            namespace: Some("urn:quotes".to_string()),
            attributes: vec![("kind".to_string(), "a&b".to_string())],
        });
        stream.push(Token::End {
            name: "quote".to_string(),
            namespace: Some("urn:quotes".to_string()),
        });

        let xml = render(&stream, &EncoderConfig::default());
        assert_eq!(xml, r#"<quote xmlns="urn:quotes" kind="a&amp;b"></quote>"#);
    }

    #[test]
    fn test_indented_output() {
        let config = EncoderConfig::default().with_declaration(true).with_indent(2);
        let xml = render(&sample(), &config);

        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <root xmlns=\"urn:x\">\n  <a>1 &lt; 2</a>\n  <b>\n  </b>\n</root>"
        );
    }

    #[test]
    fn test_declaration_without_indent() {
        let config = EncoderConfig::default().with_declaration(true);
        let xml = render(&sample(), &config);

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><root xmlns="urn:x">"#));
    }

    #[test]
    fn test_whitespace_text_is_kept() {
        let mut stream = TokenStream::new();
        stream.extend([Token::start("label"), Token::text("   "), Token::end("label")]);

        let xml = render(&stream, &EncoderConfig::default().with_indent(2));
        assert_eq!(xml, "<label>   </label>");
    }

    #[test]
    fn test_prefixed_attribute_is_written() {
        let mut stream = TokenStream::new();
        stream.extend([
            Token::start_with_attributes("item", [("xsi:type", "xsd:string")]),
            Token::text("v"),
            Token::end("item"),
        ]);

        let xml = render(&stream, &EncoderConfig::default());
        assert_eq!(xml, r#"<item xsi:type="xsd:string">v</item>"#);
    }

    #[test]
    fn test_empty_element_name_is_rejected() {
        let mut stream = TokenStream::new();
        stream.extend([Token::start(""), Token::text("42"), Token::end("")]);

        let mut buf = Vec::new();
        let err = flush(&stream, &mut buf, &EncoderConfig::default().with_declaration(true))
            .unwrap_err();

        assert!(matches!(err, SoapEncodeError::InvalidName(ref name) if name.is_empty()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        for bad in ["1st", "a b", "<a>", "-x", "a&b"] {
            let mut stream = TokenStream::new();
            stream.extend([Token::start(bad), Token::end(bad)]);

            let mut buf = Vec::new();
            let err = flush(&stream, &mut buf, &EncoderConfig::default()).unwrap_err();
            assert!(matches!(err, SoapEncodeError::InvalidName(ref name) if name == bad));
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn test_invalid_attribute_name_is_rejected() {
        let mut stream = TokenStream::new();
        stream.extend([
            Token::start_with_attributes("item", [("bad key", "v")]),
            Token::end("item"),
        ]);

        let mut buf = Vec::new();
        let err = flush(&stream, &mut buf, &EncoderConfig::default()).unwrap_err();
        assert!(matches!(err, SoapEncodeError::InvalidName(ref name) if name == "bad key"));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_valid_names() {
        for good in ["soap:Envelope", "_id", "x-y.z", "élément", "a1"] {
            assert!(is_xml_name(good), "{good}");
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_error_is_propagated() {
        let err = flush(&sample(), &mut FailingWriter, &EncoderConfig::default()).unwrap_err();
        match err {
            SoapEncodeError::Write(e) => assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
