//! Translation projects: a CSV sheet (`key,<lang>,<lang>...`) turned into one
//! JSON dictionary per language.

use crate::args::unquote;
use crate::error::{ToolError, ToolInitError};
use crate::session::Session;
use crate::tool::{require, ArgSpec, Descriptor, Handler, Invocation, ToolImpl};
use crate::workspace::{list_dirs, sanitize_name, Workspace};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use fs_err as fs;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

const MANIFEST: &str = "project.json";
const SOURCE: &str = "source.csv";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub name: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub source: Option<String>,
}

impl Project {
    fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST);
        let data = fs::read_to_string(&path)?;
        serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
    }

    fn save(&self, dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(MANIFEST), json)?;
        Ok(())
    }
}

/// Split CSV text into records. Quoted fields may hold commas, newlines and
/// doubled quotes.
pub fn parse_csv(text: &str) -> Result<Vec<Vec<String>>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }
    if in_quotes {
        bail!("unterminated quoted field in csv");
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records.retain(|r| !(r.len() == 1 && r[0].trim().is_empty()));
    Ok(records)
}

/// One `(language, dictionary)` per column after the key column, keys in
/// sheet order.
pub fn build_translations(records: &[Vec<String>]) -> Result<Vec<(String, Map<String, Value>)>> {
    let Some((header, rows)) = records.split_first() else {
        bail!("the csv sheet is empty");
    };
    if header.len() < 2 {
        bail!("the csv header needs a key column followed by at least one language");
    }
    let mut out: Vec<(String, Map<String, Value>)> = header[1..]
        .iter()
        .map(|lang| (lang.trim().to_string(), Map::new()))
        .collect();
    for row in rows {
        let Some(key) = row.first().map(|k| k.trim()).filter(|k| !k.is_empty()) else {
            continue;
        };
        for (col, (_, dict)) in out.iter_mut().enumerate() {
            let value = row.get(col + 1).cloned().unwrap_or_default();
            dict.insert(key.to_string(), Value::String(value));
        }
    }
    Ok(out)
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

pub struct Translator {
    descriptor: Descriptor<Translator>,
    dir: PathBuf,
}

impl Translator {
    pub const NAME: &'static str = "Translator";

    pub fn new(workspace: &Workspace) -> Result<Self, ToolInitError> {
        let descriptor = Descriptor::new(
            Self::NAME,
            "0.2",
            Invocation::new("translator", "tr", "(tr)anslator"),
            vec![
                ArgSpec::new("-c", "--create", "<project>", "Create a translation project"),
                ArgSpec::new("-d", "--delete", "<project>", "Delete a translation project"),
                ArgSpec::new("-l", "--list", "", "List translation projects"),
                ArgSpec::detailed(
                    "-i",
                    "--import",
                    "<project> <csv>",
                    "Import the csv sheet of a project",
                    &["<csv> is a local path or an http(s) url", "header: key,<lang>,<lang>..."],
                ),
                ArgSpec::new("-g", "--generate", "<project>", "Generate one json file per language"),
            ],
            vec![
                Translator::create as Handler<Translator>,
                Translator::delete as Handler<Translator>,
                Translator::list as Handler<Translator>,
                Translator::import as Handler<Translator>,
                Translator::generate as Handler<Translator>,
            ],
        )?;
        Ok(Self {
            descriptor,
            dir: workspace.tool_dir(Self::NAME),
        })
    }

    fn project_dir(&self, raw: &str) -> PathBuf {
        self.dir.join(sanitize_name(unquote(raw)))
    }

    fn existing(&self, raw: &str) -> Result<PathBuf, ToolError> {
        let dir = self.project_dir(raw);
        if dir.join(MANIFEST).is_file() {
            Ok(dir)
        } else {
            Err(ToolError::NotFound {
                what: "project",
                name: unquote(raw).to_string(),
                location: self.dir.clone(),
            })
        }
    }

    fn create(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 1, "-c <project>")?;
        let dir = self.project_dir(&args[0]);
        if dir.exists() {
            session.console.warn(format!("Project \"{}\" already exist", unquote(&args[0])));
            return Ok(());
        }
        fs::create_dir_all(&dir)?;
        let project = Project {
            name: unquote(&args[0]).to_string(),
            created: Utc::now(),
            source: None,
        };
        project.save(&dir)?;
        session
            .console
            .info(format!("Project \"{}\" created at {}", project.name, dir.display()));
        Ok(())
    }

    fn delete(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 1, "-d <project>")?;
        let dir = self.existing(&args[0])?;
        if session.console.confirm(&format!("Confirm the deletion of {} ?", unquote(&args[0]))) {
            fs::remove_dir_all(&dir)?;
            session.console.info(format!("Project \"{}\" deleted", unquote(&args[0])));
        }
        Ok(())
    }

    fn list(&self, session: &mut Session<'_>, _args: &[String]) -> Result<()> {
        let mut projects = Vec::new();
        for name in list_dirs(&self.dir)? {
            match Project::load(&self.dir.join(&name)) {
                Ok(p) => projects.push(p),
                Err(e) => log::warn!("skipping {name}: {e:#}"),
            }
        }
        if projects.is_empty() {
            session.console.info("No translation project yet");
            return Ok(());
        }
        session
            .console
            .line(format!("   *  {:<20}{:<22}Source", "Name", "Created"));
        for (i, p) in projects.iter().enumerate() {
            session.console.line(format!(
                "  {:>2}. {:<20}{:<22}{}",
                i + 1,
                p.name,
                p.created.format("%Y-%m-%d %H:%M:%S").to_string(),
                p.source.as_deref().unwrap_or("-")
            ));
        }
        Ok(())
    }

    fn import(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 2, "-i <project> <csv>")?;
        let dir = self.existing(&args[0])?;
        let source = unquote(&args[1]);
        let target = dir.join(SOURCE);
        if is_remote(source) {
            let body = download(source)?;
            fs::write(&target, body)?;
        } else {
            fs::copy(source, &target)?;
        }
        let mut project = Project::load(&dir)?;
        project.source = Some(source.to_string());
        project.save(&dir)?;
        session
            .console
            .info(format!("Sheet imported into \"{}\"", project.name));
        Ok(())
    }

    fn generate(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 1, "-g <project>")?;
        let dir = self.existing(&args[0])?;
        let sheet = dir.join(SOURCE);
        if !sheet.is_file() {
            session.console.tips("Import a sheet first with -i <project> <csv>");
            bail!("project \"{}\" has no sheet", unquote(&args[0]));
        }
        let records = parse_csv(&fs::read_to_string(&sheet)?)?;
        let encoding = session.config.encoding();
        for (lang, dict) in build_translations(&records)? {
            let file = dir.join(format!("{}.json", sanitize_name(&lang)));
            let json = serde_json::to_string_pretty(&Value::Object(dict))?;
            let bytes = encoding
                .encode(&json)
                .with_context(|| format!("encoding {lang} translations"))?;
            fs::write(&file, bytes)?;
            session.console.info(format!("{} written ({encoding})", file.display()));
        }
        Ok(())
    }
}

fn download(url: &str) -> Result<String> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template(" {spinner} {msg}")?);
    pb.set_message(format!("Downloading {url}"));
    pb.enable_steady_tick(Duration::from_millis(120));
    let result = reqwest::blocking::Client::new()
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text())
        .with_context(|| format!("downloading {url}"));
    match &result {
        Ok(_) => pb.finish_and_clear(),
        Err(_) => pb.abandon_with_message(format!("Download of {url} failed")),
    }
    result
}

impl ToolImpl for Translator {
    fn descriptor(&self) -> &Descriptor<Self> {
        &self.descriptor
    }

    fn workspace(&self) -> Option<&Path> {
        Some(&self.dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Property;
    use crate::testing::Harness;
    use crate::tool::Outcome;

    #[test]
    fn csv_handles_quotes_commas_and_crlf() {
        let records = parse_csv("key,en,fr\r\ngreet,\"Hello, you\",\"Salut \"\"toi\"\"\"\r\nbye,Bye,\"Au\nrevoir\"\r\n").unwrap();
        assert_eq!(
            records,
            vec![
                vec!["key", "en", "fr"],
                vec!["greet", "Hello, you", "Salut \"toi\""],
                vec!["bye", "Bye", "Au\nrevoir"],
            ]
        );
    }

    #[test]
    fn csv_without_trailing_newline_and_blank_lines() {
        let records = parse_csv("\u{feff}key,en\n\nok,Ok").unwrap();
        assert_eq!(records, vec![vec!["key", "en"], vec!["ok", "Ok"]]);
    }

    #[test]
    fn csv_unterminated_quote_fails() {
        assert!(parse_csv("key,en\nx,\"open").is_err());
    }

    #[test]
    fn translations_keep_sheet_order_and_fill_gaps() {
        let records = parse_csv("key,en,fr\nzeta,Z,ZZ\nalpha,A\n,skipped,x\n").unwrap();
        let out = build_translations(&records).unwrap();
        assert_eq!(out.len(), 2);
        let (lang, en) = &out[0];
        assert_eq!(lang, "en");
        assert_eq!(en.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        let (_, fr) = &out[1];
        assert_eq!(fr["alpha"], Value::String(String::new()));
    }

    #[test]
    fn header_needs_a_language() {
        let records = parse_csv("key\nx\n").unwrap();
        assert!(build_translations(&records).is_err());
        assert!(build_translations(&[]).is_err());
    }

    #[test]
    fn project_lifecycle() {
        let mut h = Harness::new();
        let sheet = h.dir.path().join("sheet.csv");
        std::fs::write(&sheet, "key,en,fr\nhello,Hello,Bonjour\n").unwrap();
        let tr = Translator::new(&h.workspace()).unwrap();

        let (outcome, _) = h.dispatch(&tr, &["tr", "-c", "\"My App\""], "");
        assert_eq!(outcome, Outcome::Handled);
        let project = h.dir.path().join("Translator").join("My-App");
        assert!(project.join(MANIFEST).is_file());

        let (outcome, out) = h.dispatch(&tr, &["tr", "-i", "My App", sheet.to_str().unwrap()], "");
        assert_eq!(outcome, Outcome::Handled, "{out}");

        let (outcome, out) = h.dispatch(&tr, &["tr", "-g", "My App"], "");
        assert_eq!(outcome, Outcome::Handled, "{out}");
        let fr: Value = serde_json::from_str(&std::fs::read_to_string(project.join("fr.json")).unwrap()).unwrap();
        assert_eq!(fr["hello"], "Bonjour");

        let (_, listing) = h.dispatch(&tr, &["tr", "-l"], "");
        assert!(listing.contains("My App"));
        assert!(listing.contains("sheet.csv"));

        h.dispatch(&tr, &["tr", "-d", "My App"], "yes\n");
        assert!(!project.exists());
    }

    #[test]
    fn generate_uses_configured_encoding() {
        let mut h = Harness::new();
        h.config.set(Property::Encoding, "utf-16").unwrap();
        let tr = Translator::new(&h.workspace()).unwrap();
        h.dispatch(&tr, &["tr", "-c", "app"], "");
        let project = h.dir.path().join("Translator").join("app");
        std::fs::write(project.join(SOURCE), "key,en\nk,v\n").unwrap();
        let (outcome, out) = h.dispatch(&tr, &["tr", "-g", "app"], "");
        assert_eq!(outcome, Outcome::Handled, "{out}");
        let bytes = std::fs::read(project.join("en.json")).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xFE]);
    }

    #[test]
    fn generate_without_sheet_fails() {
        let mut h = Harness::new();
        let tr = Translator::new(&h.workspace()).unwrap();
        h.dispatch(&tr, &["tr", "-c", "empty"], "");
        let (outcome, out) = h.dispatch(&tr, &["tr", "-g", "empty"], "");
        assert_eq!(outcome, Outcome::Failed);
        assert!(out.contains("Import a sheet first"));
    }

    #[test]
    fn unknown_project_is_reported() {
        let mut h = Harness::new();
        let tr = Translator::new(&h.workspace()).unwrap();
        let (outcome, out) = h.dispatch(&tr, &["tr", "-g", "ghost"], "");
        assert_eq!(outcome, Outcome::Failed);
        assert!(out.contains("project \"ghost\" doesn't exist"));
    }
}
