//! Entry to record mapping

use base64::{engine::general_purpose::STANDARD, Engine as _};
use dirsearch_core::{DirectoryRecord, GroupRecord, SearchMode, SearchRequest, UserRecord};
use ldap3::SearchEntry;
use std::borrow::Cow;

/// Values of one attribute as returned by the server
#[derive(Clone, Copy)]
enum Values<'a> {
    Text(&'a [String]),
    Binary(&'a [Vec<u8>]),
}

impl<'a> Values<'a> {
    fn first_text(&self) -> Option<Cow<'a, str>> {
        match self {
            Values::Text(values) => values.first().map(|v| Cow::Borrowed(v.as_str())),
            Values::Binary(values) => values.first().map(|v| String::from_utf8_lossy(v)),
        }
    }

    fn first_bytes(&self) -> Option<&'a [u8]> {
        match self {
            Values::Text(values) => values.first().map(|v| v.as_bytes()),
            Values::Binary(values) => values.first().map(|v| v.as_slice()),
        }
    }
}

/// Turns search entries into user or group records, one entry at a time
#[derive(Debug, Clone)]
pub struct EntryMapper {
    mode: SearchMode,
    domain: String,
    load_photo: bool,
}

impl EntryMapper {
    pub fn new(mode: SearchMode, domain: impl AsRef<str>, load_photo: bool) -> Self {
        Self {
            mode,
            domain: domain.as_ref().to_lowercase(),
            load_photo,
        }
    }

    pub fn for_request(request: &SearchRequest) -> Self {
        Self::new(request.mode, &request.domain, request.load_photo)
    }

    pub fn map(&self, entry: &SearchEntry) -> DirectoryRecord {
        if self.mode.is_group_search() {
            self.map_group(entry).into()
        } else {
            self.map_user(entry).into()
        }
    }

    fn map_user(&self, entry: &SearchEntry) -> UserRecord {
        let mut user = UserRecord::new();
        let mut examined = false;

        for (name, values) in attributes(entry) {
            examined = true;
            match name.to_lowercase().as_str() {
                "samaccountname" => {
                    user.logon_name = Some(
                        values
                            .first_text()
                            .map(|v| self.qualify(&v))
                            .unwrap_or_default(),
                    )
                }
                "displayname" => user.display_name = Some(first_or_empty(values)),
                "mail" => user.email = Some(first_or_empty(values)),
                "thumbnailphoto" => {
                    if self.load_photo {
                        user.photo = Some(
                            values
                                .first_bytes()
                                .map(|photo| STANDARD.encode(photo))
                                .unwrap_or_default(),
                        );
                    }
                }
                "telephonenumber" => user.work_phone = Some(first_or_empty(values)),
                "mobile" => user.mobile_phone = Some(first_or_empty(values)),
                "title" => user.position = Some(first_or_empty(values)),
                _ => {}
            }
        }

        if examined {
            for field in [
                &mut user.logon_name,
                &mut user.display_name,
                &mut user.email,
                &mut user.work_phone,
                &mut user.mobile_phone,
                &mut user.position,
            ] {
                field.get_or_insert_with(String::new);
            }
            if self.load_photo {
                user.photo.get_or_insert_with(String::new);
            }
        }

        user
    }

    fn map_group(&self, entry: &SearchEntry) -> GroupRecord {
        let mut group = GroupRecord::new();
        let mut examined = false;

        for (name, values) in attributes(entry) {
            examined = true;
            if name.eq_ignore_ascii_case("cn") {
                group.name = Some(
                    values
                        .first_text()
                        .map(|v| self.qualify(&v))
                        .unwrap_or_default(),
                );
            }
        }

        if examined {
            group.name.get_or_insert_with(String::new);
        }

        group
    }

    fn qualify(&self, name: &str) -> String {
        format!("{}\\{}", self.domain, name.to_lowercase())
    }
}

fn first_or_empty(values: Values<'_>) -> String {
    values
        .first_text()
        .map(Cow::into_owned)
        .unwrap_or_default()
}

fn attributes(entry: &SearchEntry) -> impl Iterator<Item = (&str, Values<'_>)> {
    let text = entry
        .attrs
        .iter()
        .map(|(name, values)| (name.as_str(), Values::Text(values.as_slice())));
    let binary = entry
        .bin_attrs
        .iter()
        .map(|(name, values)| (name.as_str(), Values::Binary(values.as_slice())));

    text.chain(binary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct EntryBuilder(SearchEntry);

    fn entry() -> EntryBuilder {
        EntryBuilder(SearchEntry {
            dn: "CN=Test,DC=example,DC=local".to_string(),
            attrs: HashMap::new(),
            bin_attrs: HashMap::new(),
        })
    }

    impl EntryBuilder {
        fn attr(mut self, name: &str, values: &[&str]) -> Self {
            self.0.attrs.insert(
                name.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            );
            self
        }

        fn bin(mut self, name: &str, value: &[u8]) -> Self {
            self.0.bin_attrs.insert(name.to_string(), vec![value.to_vec()]);
            self
        }

        fn build(self) -> SearchEntry {
            self.0
        }
    }

    #[test]
    fn test_logon_name_is_qualified_and_lowercased() {
        let mapper = EntryMapper::new(SearchMode::UserByLogin, "EXAMPLE", false);
        let record = mapper.map(&entry().attr("sAMAccountName", &["JDoe"]).build());

        let user = record.as_user().unwrap();
        assert!(user.is_user);
        assert_eq!(user.logon_name.as_deref(), Some("example\\jdoe"));
    }

    #[test]
    fn test_user_fields_use_first_value() {
        let mapper = EntryMapper::new(SearchMode::UserByNameOrLogin, "example", false);
        let record = mapper.map(
            &entry()
                .attr("sAMAccountName", &["jdoe"])
                .attr("displayName", &["John Doe", "Johnny"])
                .attr("mail", &["jdoe@example.local", "john@example.local"])
                .attr("telephoneNumber", &["100"])
                .attr("mobile", &["+1 555 0100"])
                .attr("title", &["Engineer"])
                .build(),
        );

        let user = record.as_user().unwrap();
        assert_eq!(user.display_name.as_deref(), Some("John Doe"));
        assert_eq!(user.email.as_deref(), Some("jdoe@example.local"));
        assert_eq!(user.work_phone.as_deref(), Some("100"));
        assert_eq!(user.mobile_phone.as_deref(), Some("+1 555 0100"));
        assert_eq!(user.position.as_deref(), Some("Engineer"));
    }

    #[test]
    fn test_attribute_names_ignore_case() {
        let mapper = EntryMapper::new(SearchMode::UserByName, "example", false);
        let record = mapper.map(
            &entry()
                .attr("samaccountname", &["JDOE"])
                .attr("DISPLAYNAME", &["John"])
                .build(),
        );

        let user = record.as_user().unwrap();
        assert_eq!(user.logon_name.as_deref(), Some("example\\jdoe"));
        assert_eq!(user.display_name.as_deref(), Some("John"));
    }

    #[test]
    fn test_missing_and_empty_attributes_become_empty_strings() {
        let mapper = EntryMapper::new(SearchMode::UserByNameOrLogin, "example", false);
        let record = mapper.map(
            &entry()
                .attr("sAMAccountName", &[])
                .attr("mail", &["a@b"])
                .build(),
        );

        let user = record.as_user().unwrap();
        assert_eq!(user.logon_name.as_deref(), Some(""));
        assert_eq!(user.email.as_deref(), Some("a@b"));
        assert_eq!(user.display_name.as_deref(), Some(""));
        assert_eq!(user.work_phone.as_deref(), Some(""));
        assert_eq!(user.mobile_phone.as_deref(), Some(""));
        assert_eq!(user.position.as_deref(), Some(""));
        assert_eq!(user.photo, None);
    }

    #[test]
    fn test_entry_without_attributes_keeps_nulls() {
        let mapper = EntryMapper::new(SearchMode::UserByLogin, "example", true);
        let record = mapper.map(&entry().build());

        assert_eq!(record, DirectoryRecord::User(UserRecord::new()));
    }

    #[test]
    fn test_photo_only_when_requested() {
        let photo: &[u8] = &[0xff, 0xd8, 0xff, 0xe0];
        let raw = entry()
            .attr("sAMAccountName", &["jdoe"])
            .bin("thumbnailPhoto", photo)
            .build();

        let without = EntryMapper::new(SearchMode::UserByLogin, "example", false).map(&raw);
        assert_eq!(without.as_user().unwrap().photo, None);

        let with = EntryMapper::new(SearchMode::UserByLogin, "example", true).map(&raw);
        assert_eq!(with.as_user().unwrap().photo.as_deref(), Some("/9j/4A=="));
    }

    #[test]
    fn test_requested_photo_missing_is_empty() {
        let mapper = EntryMapper::new(SearchMode::UserByLogin, "example", true);
        let record = mapper.map(&entry().attr("sAMAccountName", &["jdoe"]).build());
        assert_eq!(record.as_user().unwrap().photo.as_deref(), Some(""));
    }

    #[test]
    fn test_group_record() {
        let mapper = EntryMapper::new(SearchMode::GroupByName, "Example", false);
        let record = mapper.map(
            &entry()
                .attr("cn", &["Admins"])
                .attr("sAMAccountName", &["Admins"])
                .build(),
        );

        assert_eq!(
            record,
            DirectoryRecord::Group(GroupRecord {
                is_group: true,
                name: Some("example\\admins".to_string()),
            })
        );
        assert!(record.as_user().is_none());
    }

    #[test]
    fn test_group_without_cn_is_empty_name() {
        let mapper = EntryMapper::new(SearchMode::GroupByName, "example", false);
        let record = mapper.map(&entry().attr("mail", &["admins@example.local"]).build());
        assert_eq!(record.as_group().unwrap().name.as_deref(), Some(""));
    }

    #[test]
    fn test_binary_text_attribute_is_decoded_lossily() {
        let mapper = EntryMapper::new(SearchMode::UserByLogin, "example", false);
        let record = mapper.map(&entry().bin("displayName", b"Jos\xe9").build());
        assert_eq!(
            record.as_user().unwrap().display_name.as_deref(),
            Some("Jos\u{fffd}")
        );
    }
}
