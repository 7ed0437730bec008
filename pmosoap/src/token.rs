//! Jetons XML et flux de jetons propre à un appel d'encodage

/// Unité atomique du flux de sortie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Balise ouvrante
    Start {
        name: String,
        /// Namespace porté par l'élément (rendu en `xmlns="..."`)
        namespace: Option<String>,
        attributes: Vec<(String, String)>,
    },

    /// Balise fermante
    End {
        name: String,
        namespace: Option<String>,
    },

    /// Contenu textuel (non échappé)
    Text(String),
}

impl Token {
    /// Balise ouvrante non qualifiée, sans attribut
    pub fn start(name: impl Into<String>) -> Self {
        Token::Start {
            name: name.into(),
            namespace: None,
            attributes: Vec::new(),
        }
    }

    /// Balise ouvrante non qualifiée avec attributs
    pub fn start_with_attributes<K, V>(
        name: impl Into<String>,
        attributes: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Token::Start {
            name: name.into(),
            namespace: None,
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn end(name: impl Into<String>) -> Self {
        Token::End {
            name: name.into(),
            namespace: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Token::Text(content.into())
    }

    /// Nom local de la balise, `None` pour un texte
    pub fn name(&self) -> Option<&str> {
        match self {
            Token::Start { name, .. } | Token::End { name, .. } => Some(name),
            Token::Text(_) => None,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            Token::Start { namespace, .. } | Token::End { namespace, .. } => namespace.as_deref(),
            Token::Text(_) => None,
        }
    }
}

/// Flux ordonné de jetons, possédé par un seul appel d'encodage
///
/// Le flux n'est jamais partagé : chaque encodage crée le sien et le passe
/// par référence mutable aux fonctions de cadrage et d'encodage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute un jeton en fin de flux
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) {
        self.tokens.extend(tokens);
    }

    /// Supprime jusqu'à `n` jetons en fin de flux
    pub fn drop_last(&mut self, n: usize) {
        let keep = self.tokens.len().saturating_sub(n);
        self.tokens.truncate(keep);
    }

    /// Jetons dans l'ordre d'insertion
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Vérifie que le flux est une suite de balises bien parenthésée
    ///
    /// Chaque `Start` doit être fermé par un `End` de même nom et de même
    /// namespace, dans l'ordre d'une pile, et aucun texte ne peut apparaître
    /// hors d'un élément.
    pub fn is_balanced(&self) -> bool {
        let mut open: Vec<(&str, Option<&str>)> = Vec::new();

        for token in &self.tokens {
            match token {
                Token::Start {
                    name, namespace, ..
                } => open.push((name.as_str(), namespace.as_deref())),
                Token::End { name, namespace } => match open.pop() {
                    Some((n, ns)) if n == name.as_str() && ns == namespace.as_deref() => {}
                    _ => return false,
                },
                Token::Text(_) => {
                    if open.is_empty() {
                        return false;
                    }
                }
            }
        }

        open.is_empty()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl IntoIterator for TokenStream {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}
