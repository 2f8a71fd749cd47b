//! Opaque Ansible vault scalars.
//!
//! A vault value is written as `!vault |` followed by the encrypted payload.
//! invgen never interprets the payload: it is loaded as a tagged string and
//! dumped back with the same tag. Because the payload spans several lines,
//! the emitter writes it in literal block style, which reproduces the
//! original text exactly.

use serde_yaml::Value;
use serde_yaml::value::{Tag, TaggedValue};

/// The YAML tag that marks a vault-encrypted string.
pub const VAULT_TAG: &str = "!vault";

/// Wrap ciphertext as a vault value.
pub fn vault(text: impl Into<String>) -> Value {
    Value::Tagged(Box::new(TaggedValue {
        tag: Tag::new(VAULT_TAG),
        value: Value::String(text.into()),
    }))
}

/// The ciphertext of a vault scalar, or `None` for any other value.
pub fn vault_text(value: &Value) -> Option<&str> {
    match value {
        Value::Tagged(tagged) if tagged.tag == VAULT_TAG => tagged.value.as_str(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_vault_tag_is_loaded_as_opaque_string() {
        let doc = parse("password: !vault |\n  $ANSIBLE_VAULT;1.1;AES256\n  336366\n").unwrap();
        let password = doc.get("password").unwrap();

        assert!(vault_text(password).is_some());
        assert_eq!(
            vault_text(password),
            Some("$ANSIBLE_VAULT;1.1;AES256\n336366\n")
        );
    }

    #[test]
    fn test_plain_string_is_not_vault() {
        assert_eq!(vault_text(&Value::String("secret".into())), None);
    }

    #[test]
    fn test_other_tags_are_not_vault() {
        let doc = parse("value: !other text").unwrap();
        assert_eq!(vault_text(doc.get("value").unwrap()), None);
    }

    #[test]
    fn test_vault_constructor() {
        let value = vault("$ANSIBLE_VAULT;1.1;AES256\nabc\n");
        assert_eq!(vault_text(&value), Some("$ANSIBLE_VAULT;1.1;AES256\nabc\n"));
    }
}
