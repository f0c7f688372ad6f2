//! # ListMachines: show provider instances of an environment.

use std::fmt::Write;

use crate::core::Provisor;
use crate::error::CommandError;
use crate::model::ProviderInstance;

const NAME_WIDTH: usize = 18;

/// Lists the instances of this environment, or every instance of the project.
#[derive(Clone, Copy, Debug, Default)]
pub struct ListMachines {
    /// Include instances of other environments.
    pub all: bool,
}

impl ListMachines {
    /// Runs the command and returns the selected instances ordered by name.
    pub async fn run(&self, p: &Provisor) -> Result<Vec<ProviderInstance>, CommandError> {
        let mut instances: Vec<_> = p
            .provider()
            .list_instances()
            .await?
            .into_iter()
            .filter(|i| self.all || i.belongs_to(p.environment()))
            .collect();
        instances.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(instances)
    }
}

/// Renders instances as a fixed-width table.
///
/// Names longer than 18 characters are cut to 15 followed by `...`. Nothing, not even
/// the header, is rendered for an empty list.
pub fn render_table(instances: &[ProviderInstance]) -> String {
    if instances.is_empty() {
        return String::new();
    }
    let mut out = format!(
        "{:<12} {:<NAME_WIDTH$} {:<10} {}\n",
        "ID", "NAME", "STATUS", "ADDRESS"
    );
    for i in instances {
        let _ = writeln!(
            out,
            "{:<12} {:<NAME_WIDTH$} {:<10} {}",
            i.id,
            truncate(&i.name),
            i.status.to_string(),
            i.ip_address
        );
    }
    out
}

fn truncate(name: &str) -> String {
    if name.chars().count() <= NAME_WIDTH {
        return name.to_string();
    }
    let head: String = name.chars().take(NAME_WIDTH - 3).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::Config;
    use crate::core::ProvisorBuilder;
    use crate::testing::{FakeOrchestrator, FakeProvider, Journal, instance};

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("lab-0"), "lab-0");
        assert_eq!(truncate("exactly-eighteen-c"), "exactly-eighteen-c");
        assert_eq!(
            truncate("lab-3f2a9c0d7e8b41a6"),
            "lab-3f2a9c0d7e8..."
        );
    }

    #[test]
    fn table_has_one_row_per_instance() {
        let table = render_table(&[instance("i1", "lab-0", "10.0.0.1")]);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].contains("lab-0"));
        assert!(lines[1].contains("active"));
        assert!(lines[1].ends_with("10.0.0.1"));
    }

    #[test]
    fn empty_list_renders_nothing() {
        assert_eq!(render_table(&[]), "");
    }

    #[tokio::test]
    async fn filters_by_environment_unless_all() {
        let journal = Journal::default();
        let provider = Arc::new(FakeProvider::new(
            journal.clone(),
            vec![
                instance("i2", "lab-b", "10.0.0.2"),
                instance("x1", "other-0", "10.0.9.1"),
                instance("i1", "lab-a", "10.0.0.1"),
            ],
        ));
        let p = ProvisorBuilder::new(
            Config::default(),
            "lab",
            provider,
            Arc::new(FakeOrchestrator::new(journal, vec![])),
        )
        .build()
        .unwrap();

        let mine = ListMachines::default().run(&p).await.unwrap();
        let names: Vec<_> = mine.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["lab-a", "lab-b"]);

        let all = ListMachines { all: true }.run(&p).await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
