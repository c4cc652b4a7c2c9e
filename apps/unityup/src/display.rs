//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use console::Style;
use serde::Serialize;
use std::io;
use unityup_ops::RunOutcome;
use unityup_types::{ElevationMethod, Installation};

/// What a command produced
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandResult {
    Installed { installation: Installation },
    List { installations: Vec<Installation> },
    Moved { installation: Installation },
    Uninstalled { installation: Installation },
    Privileges {
        privileged: bool,
        elevation: ElevationMethod,
    },
    Run { outcome: RunOutcome },
}

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    json_output: bool,
    colors_enabled: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool, colors_enabled: bool) -> Self {
        Self {
            json_output,
            colors_enabled,
        }
    }

    /// Render command result
    pub fn render_result(&self, result: &CommandResult) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match result {
            CommandResult::Installed { installation } => {
                self.success(&format!(
                    "Installed {} at {}",
                    installation.version,
                    installation.root.display()
                ));
            }
            CommandResult::List { installations } => self.render_list(installations),
            CommandResult::Moved { installation } => {
                self.success(&format!(
                    "Moved {} to {}",
                    installation.version,
                    installation.root.display()
                ));
            }
            CommandResult::Uninstalled { installation } => {
                self.success(&format!(
                    "Removed {} from {}",
                    installation.version,
                    installation.root.display()
                ));
            }
            CommandResult::Privileges {
                privileged,
                elevation,
            } => {
                if *privileged {
                    self.success("Running with administrative rights");
                } else {
                    println!("Not running with administrative rights (elevation: {elevation})");
                }
            }
            // Editor output has already been streamed
            CommandResult::Run { .. } => {}
        }
        Ok(())
    }

    fn render_list(&self, installations: &[Installation]) {
        if installations.is_empty() {
            println!("No editors installed.");
            return;
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("Path").add_attribute(Attribute::Bold),
        ]);
        for installation in installations {
            table.add_row(vec![
                Cell::new(installation.version.to_string()),
                Cell::new(installation.root.display()),
            ]);
        }
        println!("{table}");
    }

    fn success(&self, message: &str) {
        if self.colors_enabled {
            println!("{}", Style::new().green().apply_to(message));
        } else {
            println!("{message}");
        }
    }
}

/// Newest editors first
pub fn sort_installations(installations: &mut [Installation]) {
    installations.sort_by(|a, b| {
        let key = |i: &Installation| {
            (
                i.version.major,
                i.version.minor,
                i.version.patch,
                i.version.release_type,
                i.version.build,
            )
        };
        key(b).cmp(&key(a)).then_with(|| a.root.cmp(&b.root))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use unityup_types::VersionMetadata;

    fn installation(version: &str, root: &str) -> Installation {
        Installation::new(
            version.parse::<VersionMetadata>().unwrap(),
            PathBuf::from(root),
            PathBuf::from(root).join("Editor/Unity"),
        )
    }

    #[test]
    fn newest_first() {
        let mut list = vec![
            installation("2020.3.1f1", "/opt/a"),
            installation("2022.1.0b3", "/opt/b"),
            installation("2022.1.0f1", "/opt/c"),
        ];
        sort_installations(&mut list);
        let versions: Vec<String> = list.iter().map(|i| i.version.to_string()).collect();
        assert_eq!(versions, ["2022.1.0f1", "2022.1.0b3", "2020.3.1f1"]);
    }

    #[test]
    fn json_result_is_tagged() {
        let result = CommandResult::Privileges {
            privileged: false,
            elevation: ElevationMethod::Sudo,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["result"], "privileges");
        assert_eq!(json["privileged"], false);
    }
}
