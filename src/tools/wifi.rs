use crate::args::unquote;
use crate::console::color;
use crate::error::{ToolError, ToolInitError};
use crate::ops;
use crate::session::Session;
use crate::tool::{require, ArgSpec, Descriptor, Handler, Invocation, ToolImpl};
use anyhow::Result;
use std::process::Command;

const NETSH_HINT: &str = "saved wifi profiles are read through netsh on Windows";

/// Saved wireless profiles and their keys, read through `netsh wlan`.
pub struct Wifi {
    descriptor: Descriptor<Wifi>,
}

impl Wifi {
    pub fn new() -> Result<Self, ToolInitError> {
        let descriptor = Descriptor::new(
            "Wifi",
            "0.2",
            Invocation::new("wifi", "wi", "(wi)fi"),
            vec![
                ArgSpec::new("-l", "--list", "", "List saved wifi profiles"),
                ArgSpec::new("-s", "--show", "<profile>", "Show the key of a profile"),
                ArgSpec::detailed(
                    "-a",
                    "--all",
                    "",
                    "Show every profile with its key",
                    &["keys are only readable from an elevated prompt"],
                ),
            ],
            vec![
                Wifi::list as Handler<Wifi>,
                Wifi::show as Handler<Wifi>,
                Wifi::all as Handler<Wifi>,
            ],
        )?;
        Ok(Self { descriptor })
    }

    fn profiles() -> Result<Vec<String>> {
        let netsh = ops::require_program("netsh", NETSH_HINT)?;
        let out = ops::capture(Command::new(netsh).args(["wlan", "show", "profiles"]))?;
        Ok(parse_profiles(&out))
    }

    fn key_of(profile: &str) -> Result<Option<String>> {
        let netsh = ops::require_program("netsh", NETSH_HINT)?;
        let name = format!("name={profile}");
        let out = ops::capture(Command::new(netsh).args(["wlan", "show", "profile", name.as_str(), "key=clear"]))?;
        Ok(parse_key(&out))
    }

    fn list(&self, session: &mut Session<'_>, _args: &[String]) -> Result<()> {
        let profiles = Self::profiles()?;
        if profiles.is_empty() {
            session.console.info("No wifi profile saved");
            return Ok(());
        }
        session.console.line("   *  Profile");
        for (i, name) in profiles.iter().enumerate() {
            session.console.line(format!("  {:>2}. {name}", i + 1));
        }
        Ok(())
    }

    fn show(&self, session: &mut Session<'_>, args: &[String]) -> Result<()> {
        let args = require(args, 1, "-s <profile>")?;
        let profile = unquote(&args[0]);
        if !Self::profiles()?.iter().any(|p| p == profile) {
            return Err(ToolError::NotFound {
                what: "profile",
                name: profile.to_string(),
                location: "saved wifi profiles".into(),
            }
            .into());
        }
        let key = Self::key_of(profile)?;
        let line = render_entry(session, profile, key.as_deref());
        session.console.line(line);
        Ok(())
    }

    fn all(&self, session: &mut Session<'_>, _args: &[String]) -> Result<()> {
        let profiles = Self::profiles()?;
        if profiles.is_empty() {
            session.console.info("No wifi profile saved");
            return Ok(());
        }
        for profile in &profiles {
            let key = Self::key_of(profile)?;
            let line = render_entry(session, profile, key.as_deref());
            session.console.line(line);
        }
        Ok(())
    }
}

fn render_entry(session: &Session<'_>, profile: &str, key: Option<&str>) -> String {
    let key = match key {
        Some(k) => session.console.paint(color::GREEN, k),
        None => session.console.paint(color::YELLOW, "<none>"),
    };
    format!(" {:<24}: {key}", profile)
}

impl ToolImpl for Wifi {
    fn descriptor(&self) -> &Descriptor<Self> {
        &self.descriptor
    }
}

fn field_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let (name, value) = line.split_once(':')?;
    (name.trim() == label).then(|| value.trim())
}

/// Profile names from `netsh wlan show profiles`.
pub fn parse_profiles(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|l| field_value(l, "All User Profile"))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Clear-text key from `netsh wlan show profile name=<p> key=clear`.
pub fn parse_key(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|l| field_value(l, "Key Content"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use crate::tool::Outcome;

    const PROFILES: &str = "\
Profiles on interface Wi-Fi:

Group policy profiles (read only)
---------------------------------
    <None>

User profiles
-------------
    All User Profile     : Home
    All User Profile     : Cafe: Guest
    All User Profile     :
";

    const DETAIL: &str = "\
Security settings
-----------------
    Authentication         : WPA2-Personal
    Security key           : Present
    Key Content            : hunter2:42
";

    #[test]
    fn profiles_are_read_in_order() {
        assert_eq!(parse_profiles(PROFILES), vec!["Home", "Cafe: Guest"]);
    }

    #[test]
    fn key_keeps_colons() {
        assert_eq!(parse_key(DETAIL).as_deref(), Some("hunter2:42"));
        assert_eq!(parse_key("Security key : Absent"), None);
    }

    #[test]
    fn no_argument_prints_guidance() {
        let mut h = Harness::new();
        let wifi = Wifi::new().unwrap();
        let (outcome, out) = h.dispatch(&wifi, &["wi"], "");
        assert_eq!(outcome, Outcome::NoArgument);
        assert!(out.contains("\"-h\" or \"--help\""));
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let mut h = Harness::new();
        let wifi = Wifi::new().unwrap();
        let (outcome, out) = h.dispatch(&wifi, &["wi", "--bogus"], "");
        assert_eq!(outcome, Outcome::UnknownArgument("--bogus".into()));
        assert!(out.contains("Unknown argument \"--bogus\""));
        assert!(!out.contains("--show <profile>"));
    }

    #[cfg(unix)]
    #[test]
    fn missing_netsh_is_reported() {
        if which::which("netsh").is_ok() {
            return;
        }
        let mut h = Harness::new();
        let wifi = Wifi::new().unwrap();
        let (outcome, out) = h.dispatch(&wifi, &["wifi", "-l"], "");
        assert_eq!(outcome, Outcome::Failed);
        assert!(out.contains("`netsh` is not available"));
    }
}
