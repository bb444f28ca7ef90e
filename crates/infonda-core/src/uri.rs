//! NDO URI segment parsing
//!
//! NDO URIs have the shape `scheme://authority/algorithm;hash`. The
//! authority may be empty; algorithm and hash never are. Each parse
//! function extracts exactly one segment and names that segment on
//! failure, so callers can report which part of a URI was unusable.

use crate::error::{CoreError, Result};

/// Extract the authority segment (between `://` and the next `/`).
pub fn parse_authority(uri: &str) -> Result<&str> {
    let rest = uri
        .split_once("://")
        .ok_or_else(|| CoreError::NoAuthority(uri.to_string()))?
        .1;
    match rest.find('/') {
        Some(end) => Ok(&rest[..end]),
        None => Err(CoreError::NoAuthority(uri.to_string())),
    }
}

/// Extract the algorithm segment (between the last `/` that is followed
/// by a `;` and that `;`).
pub fn parse_algorithm(uri: &str) -> Result<&str> {
    let slash = uri
        .match_indices('/')
        .map(|(i, _)| i)
        .filter(|&i| uri[i + 1..].contains(';'))
        .last()
        .ok_or_else(|| CoreError::NoAlgorithm(uri.to_string()))?;
    let rest = &uri[slash + 1..];
    match rest.find(';') {
        Some(semi) => Ok(&rest[..semi]),
        None => Err(CoreError::NoAlgorithm(uri.to_string())),
    }
}

/// Extract the hash segment (after the last `;`, which must itself be
/// preceded by a `/` somewhere in the URI).
pub fn parse_hash(uri: &str) -> Result<&str> {
    let semi = uri
        .rfind(';')
        .ok_or_else(|| CoreError::NoHash(uri.to_string()))?;
    if !uri[..semi].contains('/') {
        return Err(CoreError::NoHash(uri.to_string()));
    }
    Ok(&uri[semi + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_uri() {
        let uri = "ni://example.org/sha-256;abc123";
        assert_eq!(parse_authority(uri).unwrap(), "example.org");
        assert_eq!(parse_algorithm(uri).unwrap(), "sha-256");
        assert_eq!(parse_hash(uri).unwrap(), "abc123");
    }

    #[test]
    fn test_parse_empty_authority() {
        let uri = "ni:///sha-256;abc123";
        assert_eq!(parse_authority(uri).unwrap(), "");
        assert_eq!(parse_algorithm(uri).unwrap(), "sha-256");
        assert_eq!(parse_hash(uri).unwrap(), "abc123");
    }

    #[test]
    fn test_parse_missing_scheme() {
        let uri = "example.org/sha-256;abc123";
        assert_eq!(
            parse_authority(uri),
            Err(CoreError::NoAuthority(uri.to_string()))
        );
    }

    #[test]
    fn test_parse_missing_semicolon() {
        let uri = "ni://example.org/sha-256abc123";
        assert_eq!(
            parse_algorithm(uri),
            Err(CoreError::NoAlgorithm(uri.to_string()))
        );
        assert_eq!(parse_hash(uri), Err(CoreError::NoHash(uri.to_string())));
    }

    #[test]
    fn test_parse_hash_requires_slash_before_semicolon() {
        let uri = "ni;abc123";
        assert_eq!(parse_hash(uri), Err(CoreError::NoHash(uri.to_string())));
    }

    #[test]
    fn test_parse_authority_with_port() {
        let uri = "ni://node.local:8080/sha-256;xyz";
        assert_eq!(parse_authority(uri).unwrap(), "node.local:8080");
    }
}
