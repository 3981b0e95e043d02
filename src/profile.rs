//! Display helpers for the caller's profile

use crate::types::UserProfile;

/// Characters of the identity shown when there is no profile name
const IDENTITY_PREFIX_CHARS: usize = 12;

/// Profile name, or a shortened identity key when there is none
pub fn display_name(profile: Option<&UserProfile>, identity: &str) -> String {
    match profile.map(|p| p.name.trim()).filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => {
            let prefix: String = identity.chars().take(IDENTITY_PREFIX_CHARS).collect();
            format!("{prefix}…")
        }
    }
}

/// Up to two upper-cased initials from the profile name; `U` without one
pub fn initials(profile: Option<&UserProfile>) -> String {
    let initials: String = profile
        .map(|p| p.name.as_str())
        .unwrap_or_default()
        .split(' ')
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect();

    if initials.is_empty() {
        "U".to_string()
    } else {
        initials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            name: name.to_string(),
            ..UserProfile::default()
        }
    }

    #[test]
    fn test_display_name_prefers_profile() {
        assert_eq!(display_name(Some(&profile("Ada Lovelace")), "aaaa-bbbb"), "Ada Lovelace");
    }

    #[test]
    fn test_display_name_falls_back_to_identity() {
        assert_eq!(
            display_name(None, "2vxsx-fae-rdmqg-oaaaa"),
            "2vxsx-fae-rd…"
        );
        assert_eq!(display_name(Some(&profile("  ")), "abc"), "abc…");
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials(Some(&profile("ada lovelace byron"))), "AL");
        assert_eq!(initials(Some(&profile("Grace"))), "G");
        assert_eq!(initials(Some(&profile("jean  paul"))), "JP");
        assert_eq!(initials(None), "U");
        assert_eq!(initials(Some(&profile(""))), "U");
    }
}
