//! Arbre de paramètres générique et son encodage en jetons

use indexmap::IndexMap;
use serde_json::Value;

use crate::token::{Token, TokenStream};

/// Paramètre générique : mapping ordonné, séquence ou scalaire
///
/// L'ordre d'un [`Param::Mapping`] est l'ordre d'insertion, qui fixe
/// l'ordre des éléments dans le XML produit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Mapping(IndexMap<String, Param>),
    Sequence(Vec<Param>),
    Scalar(String),
}

impl Param {
    /// Construit un mapping à partir de paires (clé, valeur)
    ///
    /// Une clé répétée remplace la valeur précédente à sa position d'origine.
    pub fn mapping<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Param>,
    {
        Param::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn sequence<V: Into<Param>>(items: impl IntoIterator<Item = V>) -> Self {
        Param::Sequence(items.into_iter().map(Into::into).collect())
    }

    pub fn scalar(value: impl Into<String>) -> Self {
        Param::Scalar(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Param::Mapping(m) => m.is_empty(),
            Param::Sequence(s) => s.is_empty(),
            Param::Scalar(_) => false,
        }
    }

    /// Vrai si un scalaire est atteignable sans passer par un mapping
    ///
    /// Un tel scalaire n'a pas de nom d'élément et ne peut pas être placé
    /// directement sous la racine de méthode.
    pub fn has_untagged_scalar(&self) -> bool {
        match self {
            Param::Scalar(_) => true,
            Param::Sequence(items) => items.iter().any(Param::has_untagged_scalar),
            Param::Mapping(_) => false,
        }
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Scalar(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Scalar(value)
    }
}

impl From<Vec<Param>> for Param {
    fn from(items: Vec<Param>) -> Self {
        Param::Sequence(items)
    }
}

impl From<IndexMap<String, Param>> for Param {
    fn from(map: IndexMap<String, Param>) -> Self {
        Param::Mapping(map)
    }
}

impl<K: Into<String>, V: Into<Param>> FromIterator<(K, V)> for Param {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Param::mapping(iter)
    }
}

/// Conversion depuis une valeur JSON
///
/// `null` donne un scalaire vide, booléens et nombres leur forme textuelle.
/// Les objets suivent l'ordre d'itération de la map `serde_json`.
impl From<Value> for Param {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Param::Scalar(String::new()),
            Value::Bool(b) => Param::Scalar(b.to_string()),
            Value::Number(n) => Param::Scalar(n.to_string()),
            Value::String(s) => Param::Scalar(s),
            Value::Array(items) => Param::Sequence(items.into_iter().map(Param::from).collect()),
            Value::Object(map) => Param::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, Param::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Projette récursivement un paramètre dans le flux
///
/// - mapping : `<clé>` … `</clé>` pour chaque entrée, dans l'ordre
/// - séquence : chaque élément à la suite, sans élément englobant
/// - scalaire : un seul jeton texte
pub fn encode_param(stream: &mut TokenStream, param: &Param) {
    match param {
        Param::Mapping(entries) => {
            for (key, value) in entries {
                stream.push(Token::start(key.as_str()));
                encode_param(stream, value);
                stream.push(Token::end(key.as_str()));
            }
        }
        Param::Sequence(items) => {
            for item in items {
                encode_param(stream, item);
            }
        }
        Param::Scalar(text) => stream.push(Token::text(text.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode(param: &Param) -> Vec<Token> {
        let mut stream = TokenStream::new();
        encode_param(&mut stream, param);
        stream.into_tokens()
    }

    #[test]
    fn test_nested_mapping_order() {
        let param = Param::mapping([
            ("a", Param::scalar("1")),
            ("b", Param::mapping([("c", "2")])),
        ]);

        assert_eq!(
            encode(&param),
            vec![
                Token::start("a"),
                Token::text("1"),
                Token::end("a"),
                Token::start("b"),
                Token::start("c"),
                Token::text("2"),
                Token::end("c"),
                Token::end("b"),
            ]
        );
    }

    #[test]
    fn test_sequence_has_no_wrapper() {
        let param = Param::mapping([(
            "items",
            Param::sequence([
                Param::mapping([("item", "x")]),
                Param::mapping([("item", "y")]),
                Param::mapping([("item", "z")]),
            ]),
        )]);

        let tokens = encode(&param);
        let starts: Vec<&str> = tokens
            .iter()
            .filter(|t| matches!(t, Token::Start { .. }))
            .filter_map(Token::name)
            .collect();

        assert_eq!(starts, vec!["items", "item", "item", "item"]);
    }

    #[test]
    fn test_empty_containers_produce_nothing() {
        assert!(encode(&Param::Mapping(IndexMap::new())).is_empty());
        assert!(encode(&Param::Sequence(Vec::new())).is_empty());

        let param = Param::mapping([("empty", Param::Sequence(Vec::new()))]);
        assert_eq!(
            encode(&param),
            vec![Token::start("empty"), Token::end("empty")]
        );
    }

    #[test]
    fn test_untagged_scalar_detection() {
        assert!(Param::scalar("x").has_untagged_scalar());
        assert!(Param::sequence([Param::Sequence(vec!["x".into()])]).has_untagged_scalar());
        assert!(!Param::mapping([("k", "v")]).has_untagged_scalar());
        assert!(!Param::sequence([Param::mapping([("k", "v")])]).has_untagged_scalar());
    }

    #[test]
    fn test_from_json() {
        let param = Param::from(json!({
            "count": 3,
            "enabled": true,
            "tags": ["a", "b"],
            "note": null
        }));

        let Param::Mapping(map) = param else {
            panic!("expected a mapping");
        };
        assert_eq!(map["count"], Param::scalar("3"));
        assert_eq!(map["enabled"], Param::scalar("true"));
        assert_eq!(map["tags"], Param::sequence(["a", "b"]));
        assert_eq!(map["note"], Param::scalar(""));
    }

    #[test]
    fn test_repeated_key_keeps_first_position() {
        let param: Param = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        let Param::Mapping(map) = param else {
            panic!("expected a mapping");
        };

        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map["a"], Param::scalar("3"));
    }
}
