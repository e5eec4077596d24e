use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::{DatabaseError, WordRepository};

#[derive(Subcommand)]
pub enum WordCommands {
    #[command(about = "Import homophone groups from a CSV file, one group per line")]
    Import {
        #[arg(help = "Path to the CSV file")]
        file: PathBuf,
    },

    #[command(about = "List words starting with a letter")]
    Letter {
        #[arg(help = "First letter")]
        letter: char,
    },

    #[command(about = "List the homophones of a word")]
    Homophones {
        #[arg(help = "Word to look up")]
        word: String,
    },

    #[command(about = "Resolve words to their IDs")]
    Ids {
        #[arg(required = true, help = "Words to resolve")]
        words: Vec<String>,
    },
}

pub async fn handle(cmd: WordCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let words = WordRepository::new(connect().await?);

    match cmd {
        WordCommands::Import { file } => {
            let reader = std::fs::File::open(&file)
                .with_context(|| format!("failed to open {}", file.display()))?;
            let groups = read_groups(reader)?;

            let mut inserted = 0;
            for group in &groups {
                let result = words.insert_group(group.as_slice()).await?;
                inserted += result.inserted;
            }

            output_success(
                &output_format,
                &format!("Imported {} groups ({} new words)", groups.len(), inserted),
                Some(json!({ "groups": groups.len(), "inserted": inserted })),
            )
        }
        WordCommands::Letter { letter } => match words.query_alph(letter).await {
            Ok(rows) => {
                let rows = rows.iter().map(|r| json!(r)).collect();
                output_words(&output_format, "words", rows, |w| {
                    format!("{:>6}  {}", w["word_id"], w["word"].as_str().unwrap_or_default())
                })
            }
            Err(DatabaseError::NotFound(_)) => output_empty_collection(
                &output_format,
                "words",
                &format!("No words start with '{}'", letter),
            ),
            Err(e) => Err(e.into()),
        },
        WordCommands::Homophones { word } => match words.query_homophones(&word).await {
            Ok(rows) => {
                let rows = rows.iter().map(|r| json!(r)).collect();
                output_words(&output_format, "homophones", rows, |w| {
                    w["word"].as_str().unwrap_or_default().to_string()
                })
            }
            Err(DatabaseError::NotFound(_)) => output_empty_collection(
                &output_format,
                "homophones",
                &format!("No homophones for '{}'", word),
            ),
            Err(e) => Err(e.into()),
        },
        WordCommands::Ids { words: list } => match words.get_word_id_list(list.as_slice()).await {
            Ok(ids) => {
                let ids = ids.into_iter().map(|id| json!(id)).collect();
                output_words(&output_format, "ids", ids, |id| id.to_string())
            }
            Err(DatabaseError::NotFound(_)) => {
                output_empty_collection(&output_format, "ids", "None of those words are known")
            }
            Err(e) => Err(e.into()),
        },
    }
}

/// Parse a homophone CSV. Lines may have any number of fields; blank
/// fields and blank lines are dropped.
pub fn read_groups<R: Read>(reader: R) -> anyhow::Result<Vec<Vec<String>>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut groups = Vec::new();
    for (line, record) in csv.records().enumerate() {
        let record = record.with_context(|| format!("bad CSV record {}", line + 1))?;
        let group: Vec<String> = record
            .iter()
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect();
        if !group.is_empty() {
            groups.push(group);
        }
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_one_group_per_line() {
        let data = "pair, pear ,pare\n# comment\n\nflour,flower\nsolo,\n";
        let groups = read_groups(data.as_bytes()).unwrap();
        assert_eq!(
            groups,
            vec![
                vec!["pair".to_string(), "pear".to_string(), "pare".to_string()],
                vec!["flour".to_string(), "flower".to_string()],
                vec!["solo".to_string()],
            ]
        );
    }
}
