//! Result rendering

use clap::ValueEnum;
use dirsearch_core::DirectoryRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON array
    Json,
    /// One tab-separated line per record
    Text,
}

pub fn render(records: &[DirectoryRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Text => Ok(records.iter().map(text_line).collect::<Vec<_>>().join("\n")),
    }
}

fn text_line(record: &DirectoryRecord) -> String {
    match record {
        DirectoryRecord::User(user) => [
            &user.logon_name,
            &user.display_name,
            &user.email,
            &user.work_phone,
            &user.mobile_phone,
            &user.position,
        ]
        .iter()
        .map(|field| field.as_deref().unwrap_or("-"))
        .collect::<Vec<_>>()
        .join("\t"),
        DirectoryRecord::Group(group) => group.name.clone().unwrap_or_else(|| "-".to_string()),
    }
}
