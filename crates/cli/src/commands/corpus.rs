//! Corpus commands

use std::path::PathBuf;

use clap::Subcommand;
use transcheck_common::Corpus;

use crate::output::{self, Field, OutputFormat};
use crate::Outcome;

#[derive(Subcommand)]
pub enum CorpusCommands {
    /// Validate a corpus and show its composition
    Check {
        /// Corpus file or directory
        #[arg(default_value = "corpus")]
        path: PathBuf,
    },
}

pub async fn execute(cmd: CorpusCommands, format: OutputFormat) -> anyhow::Result<Outcome> {
    match cmd {
        CorpusCommands::Check { path } => {
            let corpus = Corpus::load(&path)?;
            let counts = corpus.counts();

            if matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
                output::print_serialized(&counts, format);
            } else {
                output::print_list(&count_fields(&corpus), format);
                output::print_success(&format!(
                    "{} cases in {} are valid",
                    counts.total,
                    path.display()
                ));
            }
            Ok(Outcome::Passed)
        }
    }
}

fn count_fields(corpus: &Corpus) -> Vec<Field> {
    let counts = corpus.counts();
    let mut fields = vec![Field::new("total", counts.total)];
    fields.extend(
        counts
            .by_category
            .iter()
            .map(|(category, n)| Field::new(category.to_string(), n)),
    );
    fields.extend(
        counts
            .by_length
            .iter()
            .map(|(class, n)| Field::new(format!("length {}", class), n)),
    );
    fields
}
