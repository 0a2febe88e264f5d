//! Search filter templates

use dirsearch_core::SearchMode;
use ldap3::ldap_escape;

/// Excludes accounts with the ACCOUNTDISABLE bit (0x2) of userAccountControl set
pub const DISABLED_ACCOUNT_CLAUSE: &str = "(!(userAccountControl:1.2.840.113556.1.4.803:=2))";

/// Escaped search term, with a trailing wildcard unless `strict`
pub fn search_value(term: &str, strict: bool) -> String {
    let escaped = ldap_escape(term);
    if strict {
        escaped.into_owned()
    } else {
        format!("{}*", escaped)
    }
}

/// Build the LDAP filter for `mode`
pub fn build_filter(term: &str, strict: bool, mode: SearchMode) -> String {
    let value = search_value(term, strict);

    match mode {
        SearchMode::UserByNameOrLogin => {
            user_filter(&["cn", "sAMAccountName", "displayname"], &value)
        }
        SearchMode::UserByLogin => user_filter(&["cn", "sAMAccountName"], &value),
        SearchMode::UserByName => user_filter(&["cn", "displayname"], &value),
        SearchMode::GroupByName => format!("(&(objectCategory=group)(name={}))", value),
    }
}

fn user_filter(attrs: &[&str], value: &str) -> String {
    let alternatives: String = attrs
        .iter()
        .map(|attr| format!("({}={})", attr, value))
        .collect();

    format!(
        "(&(objectClass=user)(|{}){})",
        alternatives, DISABLED_ACCOUNT_CLAUSE
    )
}
